//! Feedback router
//!
//! Classifies inbound console messages through a [`PatternTable`] and keeps
//! two bounded FIFO logs: every retained message, and the operator-action
//! subset used for behaviour analysis. The router is shared between the
//! receiver worker (appends) and callers (queries, clear); both logs sit
//! behind one lock so a clear is never observed half-done.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use rosc::OscMessage;
use serde::{Deserialize, Serialize};

use crate::insights::{derive_insights, OperatorInsights, INSIGHT_SAMPLE_LIMIT};
use crate::osc::pattern::{FeedbackCategory, PatternTable, TraceLevel};
use crate::osc::types::{osc_to_feedback_arg, FeedbackArg};

/// Default capacity of each log
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Seconds since the Unix epoch
pub fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// A classified inbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub timestamp: f64,
    pub category: FeedbackCategory,
    pub address: String,
    pub args: Vec<FeedbackArg>,
}

/// An operator action reported by the console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorAction {
    pub timestamp: f64,
    pub address: String,
    pub action: Vec<FeedbackArg>,
}

impl OperatorAction {
    /// Last address segment, e.g. `action` or a key name
    pub fn action_type(&self) -> &str {
        self.address.rsplit('/').next().unwrap_or(&self.address)
    }
}

/// FIFO that drops from the front once it exceeds its capacity
#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> BoundedLog<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// The newest `limit` items matching `filter`, oldest first
    pub fn recent_where<F>(&self, limit: usize, filter: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        let mut out: Vec<T> = self
            .items
            .iter()
            .rev()
            .filter(|item| filter(item))
            .take(limit)
            .cloned()
            .collect();
        out.reverse();
        out
    }

    /// The newest `limit` items, oldest first
    pub fn recent(&self, limit: usize) -> Vec<T> {
        self.recent_where(limit, |_| true)
    }
}

/// Entry counts of the two logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LogSizes {
    pub feedback: usize,
    pub actions: usize,
}

#[derive(Debug)]
struct FeedbackLogs {
    feedback: BoundedLog<FeedbackEntry>,
    actions: BoundedLog<OperatorAction>,
}

/// Classifies and stores console feedback
#[derive(Debug)]
pub struct FeedbackRouter {
    table: PatternTable,
    logs: RwLock<FeedbackLogs>,
}

impl Default for FeedbackRouter {
    fn default() -> Self {
        Self::new(PatternTable::eos_default(), DEFAULT_LOG_CAPACITY)
    }
}

impl FeedbackRouter {
    pub fn new(table: PatternTable, capacity: usize) -> Self {
        Self {
            table,
            logs: RwLock::new(FeedbackLogs {
                feedback: BoundedLog::new(capacity),
                actions: BoundedLog::new(capacity),
            }),
        }
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// Classify and store a decoded OSC message
    pub fn ingest_message(&self, message: &OscMessage) -> FeedbackCategory {
        let args = message.args.iter().map(osc_to_feedback_arg).collect();
        self.ingest(&message.addr, args)
    }

    /// Classify and store a message received now
    pub fn ingest(&self, address: &str, args: Vec<FeedbackArg>) -> FeedbackCategory {
        self.ingest_at(address, args, now_seconds())
    }

    /// Classify and store a message with an explicit timestamp
    pub fn ingest_at(
        &self,
        address: &str,
        args: Vec<FeedbackArg>,
        timestamp: f64,
    ) -> FeedbackCategory {
        let (category, policy) = match self.table.classify(address) {
            Some(entry) => (entry.category, entry.policy),
            // Outside the registered space: still kept, as "other"
            None => (
                FeedbackCategory::Other,
                crate::osc::pattern::CategoryPolicy::logged(TraceLevel::Debug),
            ),
        };

        match policy.level {
            TraceLevel::Trace => tracing::trace!("Eos {}: {} = {:?}", category, address, args),
            TraceLevel::Debug => tracing::debug!("Eos {}: {} = {:?}", category, address, args),
            TraceLevel::Info => tracing::info!("Eos {}: {} = {:?}", category, address, args),
            TraceLevel::Warn => tracing::warn!("Eos {}: {} = {:?}", category, address, args),
        }

        if !policy.retain {
            return category;
        }

        let mut logs = self.logs.write();
        if policy.operator_action {
            logs.actions.push(OperatorAction {
                timestamp,
                address: address.to_string(),
                action: args.clone(),
            });
        }
        logs.feedback.push(FeedbackEntry {
            timestamp,
            category,
            address: address.to_string(),
            args,
        });

        category
    }

    /// Most recent entries, optionally filtered by category, oldest first
    pub fn feedback_log(
        &self,
        category: Option<FeedbackCategory>,
        limit: usize,
    ) -> Vec<FeedbackEntry> {
        let logs = self.logs.read();
        match category {
            Some(category) => logs.feedback.recent_where(limit, |e| e.category == category),
            None => logs.feedback.recent(limit),
        }
    }

    pub fn operator_actions(&self, limit: usize) -> Vec<OperatorAction> {
        self.logs.read().actions.recent(limit)
    }

    pub fn recent_errors(&self, limit: usize) -> Vec<FeedbackEntry> {
        self.feedback_log(Some(FeedbackCategory::Error), limit)
    }

    /// Empties both logs under a single write lock
    pub fn clear(&self) {
        let mut logs = self.logs.write();
        logs.feedback.clear();
        logs.actions.clear();
        tracing::info!("Feedback logs cleared");
    }

    /// Both log sizes, read under one lock
    pub fn sizes(&self) -> LogSizes {
        let logs = self.logs.read();
        LogSizes {
            feedback: logs.feedback.len(),
            actions: logs.actions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sizes() == LogSizes::default()
    }

    /// Behaviour summary over the last `window_minutes`
    pub fn operator_insights(&self, window_minutes: u32) -> OperatorInsights {
        self.operator_insights_at(window_minutes, now_seconds())
    }

    pub fn operator_insights_at(&self, window_minutes: u32, now: f64) -> OperatorInsights {
        let (actions, feedback) = {
            let logs = self.logs.read();
            (
                logs.actions.recent(INSIGHT_SAMPLE_LIMIT),
                logs.feedback.recent(INSIGHT_SAMPLE_LIMIT),
            )
        };
        derive_insights(&actions, &feedback, window_minutes, now)
    }
}
