//! MCP server over stdio
//!
//! One JSON-RPC message per line on stdin, one response per line on stdout.
//! Notifications get no response.

use std::sync::Arc;

use eosbridge_control::EosClient;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::protocol::{
    CallToolParams, CallToolResult, JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS,
    INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, SERVER_NAME,
};
use crate::tools::{all_tools, ToolSpec};

pub struct McpServer {
    client: Arc<EosClient>,
    tools: Vec<ToolSpec>,
}

impl McpServer {
    pub fn new(client: Arc<EosClient>) -> Self {
        Self {
            client,
            tools: all_tools(),
        }
    }

    pub fn client(&self) -> &Arc<EosClient> {
        &self.client
    }

    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    /// Serve stdin/stdout until stdin closes
    pub async fn run_stdio(&self) -> anyhow::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve any line-oriented reader/writer pair
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line) {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }
        tracing::info!("stdin closed, MCP server stopping");
        Ok(())
    }

    /// Parse and handle one line
    pub fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Unparseable request: {}", e);
                let message = format!("Parse error: {}", e);
                return Some(JsonRpcResponse::error(Value::Null, PARSE_ERROR, message));
            }
        };
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request),
            Err(e) => Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Invalid request: {}", e),
            )),
        }
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return request.id.map(|id| {
                JsonRpcResponse::error(id, INVALID_REQUEST, "Unsupported JSON-RPC version")
            });
        }
        let Some(id) = request.id else {
            tracing::debug!("Notification: {}", request.method);
            return None;
        };
        tracing::debug!("Request {}: {}", id, request.method);

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize_result()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => {
                let tools: Vec<_> = self.tools.iter().map(ToolSpec::definition).collect();
                JsonRpcResponse::success(id, json!({ "tools": tools }))
            }
            "tools/call" => self.call_tool(id, request.params),
            other => {
                let message = format!("Method not found: {}", other);
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, message)
            }
        };
        Some(response)
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    fn call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params = match parse_call_params(params) {
            Ok(params) => params,
            Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, message),
        };
        let Some(tool) = self.tools.iter().find(|t| t.name == params.name) else {
            let message = format!("Unknown tool: {}", params.name);
            return JsonRpcResponse::error(id, INVALID_PARAMS, message);
        };

        tracing::info!("Tool call: {}", tool.name);
        let payload = tool.call(&self.client, params.arguments.unwrap_or(Value::Null));
        match serde_json::to_value(CallToolResult::from_payload(&payload)) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
        }
    }
}

fn parse_call_params(params: Option<Value>) -> Result<CallToolParams, String> {
    let params = params.ok_or("Missing tool call parameters")?;
    serde_json::from_value(params).map_err(|e| format!("Invalid tool call: {}", e))
}
