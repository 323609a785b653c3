//! Wildcard address matching for console feedback
//!
//! Eos emits unsolicited messages under `/eos/out/...`. Each registered
//! pattern maps an address shape to a [`FeedbackCategory`] plus a policy
//! describing what the router does with matching messages.
//!
//! Pattern syntax: `*` matches exactly one path segment, so
//! `/eos/out/cue/*/*` only matches five-segment addresses. A catch-all
//! pattern (`/eos/out/*`, registered with [`AddressPattern::catch_all`])
//! matches any address below its literal prefix, whatever the depth, and is
//! only consulted after every specific pattern has failed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Feedback classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Notify,
    Error,
    Event,
    UserAction,
    Selection,
    Cue,
    Patch,
    Dmx,
    Playback,
    Other,
}

impl FeedbackCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackCategory::Notify => "notify",
            FeedbackCategory::Error => "error",
            FeedbackCategory::Event => "event",
            FeedbackCategory::UserAction => "user_action",
            FeedbackCategory::Selection => "selection",
            FeedbackCategory::Cue => "cue",
            FeedbackCategory::Patch => "patch",
            FeedbackCategory::Dmx => "dmx",
            FeedbackCategory::Playback => "playback",
            FeedbackCategory::Other => "other",
        }
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "notify" => Ok(FeedbackCategory::Notify),
            "error" => Ok(FeedbackCategory::Error),
            "event" => Ok(FeedbackCategory::Event),
            "user_action" => Ok(FeedbackCategory::UserAction),
            "selection" => Ok(FeedbackCategory::Selection),
            "cue" => Ok(FeedbackCategory::Cue),
            "patch" => Ok(FeedbackCategory::Patch),
            "dmx" => Ok(FeedbackCategory::Dmx),
            "playback" => Ok(FeedbackCategory::Playback),
            "other" => Ok(FeedbackCategory::Other),
            _ => Err(format!("Unknown feedback category: {}", s)),
        }
    }
}

/// Level a classified message is traced at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceLevel {
    Trace,
    Debug,
    Info,
    Warn,
}

/// What the router does with a matching message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryPolicy {
    /// Append to the bounded feedback log
    pub retain: bool,
    /// Also append to the operator-action log
    pub operator_action: bool,
    pub level: TraceLevel,
}

impl CategoryPolicy {
    pub const fn logged(level: TraceLevel) -> Self {
        Self {
            retain: true,
            operator_action: false,
            level,
        }
    }

    /// Too chatty to keep; traced only
    pub const fn transient(level: TraceLevel) -> Self {
        Self {
            retain: false,
            operator_action: false,
            level,
        }
    }

    pub const fn operator(level: TraceLevel) -> Self {
        Self {
            retain: true,
            operator_action: true,
            level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard,
}

/// A parsed address pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressPattern {
    source: String,
    segments: Vec<Segment>,
    catch_all: bool,
}

fn split_segments(address: &str) -> impl Iterator<Item = &str> {
    address.trim_start_matches('/').split('/')
}

impl AddressPattern {
    /// Segment-exact pattern; `*` stands for one segment
    pub fn new(pattern: &str) -> Self {
        let segments = split_segments(pattern)
            .map(|s| {
                if s == "*" {
                    Segment::Wildcard
                } else {
                    Segment::Literal(s.to_string())
                }
            })
            .collect();
        Self {
            source: pattern.to_string(),
            segments,
            catch_all: false,
        }
    }

    /// Prefix pattern: a trailing `*` swallows one or more segments
    pub fn catch_all(pattern: &str) -> Self {
        let mut parsed = Self::new(pattern);
        if parsed.segments.last() == Some(&Segment::Wildcard) {
            parsed.segments.pop();
        }
        parsed.catch_all = true;
        parsed
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_catch_all(&self) -> bool {
        self.catch_all
    }

    /// Structural match against a concrete address
    pub fn matches(&self, address: &str) -> bool {
        if !address.starts_with('/') {
            return false;
        }
        let parts: Vec<&str> = split_segments(address).collect();

        if self.catch_all {
            if parts.len() <= self.segments.len() {
                return false;
            }
        } else if parts.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(parts.iter())
            .all(|(segment, part)| match segment {
                Segment::Wildcard => !part.is_empty(),
                Segment::Literal(lit) => lit == part,
            })
    }
}

impl fmt::Display for AddressPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// One registered pattern
#[derive(Debug, Clone)]
pub struct PatternEntry {
    pub pattern: AddressPattern,
    pub category: FeedbackCategory,
    pub policy: CategoryPolicy,
}

/// Ordered pattern table; registration order is match order
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    entries: Vec<PatternEntry>,
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The console's feedback address space, most specific first
    pub fn eos_default() -> Self {
        use FeedbackCategory::*;
        use TraceLevel::*;

        let mut table = Self::new();
        table.register(
            AddressPattern::new("/eos/out/notify"),
            Notify,
            CategoryPolicy::logged(Info),
        );
        table.register(
            AddressPattern::new("/eos/out/error"),
            Error,
            CategoryPolicy::logged(Warn),
        );
        table.register(
            AddressPattern::new("/eos/out/event"),
            Event,
            CategoryPolicy::logged(Info),
        );
        table.register(
            AddressPattern::new("/eos/out/user/*/action"),
            UserAction,
            CategoryPolicy::operator(Info),
        );
        table.register(
            AddressPattern::new("/eos/out/user/*/selection"),
            Selection,
            CategoryPolicy::logged(Debug),
        );
        table.register(
            AddressPattern::new("/eos/out/cue/*/*"),
            Cue,
            CategoryPolicy::logged(Debug),
        );
        table.register(
            AddressPattern::new("/eos/out/patch/*"),
            Patch,
            CategoryPolicy::logged(Debug),
        );
        table.register(
            AddressPattern::new("/eos/out/dmx/*"),
            Dmx,
            CategoryPolicy::transient(Trace),
        );
        table.register(
            AddressPattern::new("/eos/out/playback/*"),
            Playback,
            CategoryPolicy::logged(Info),
        );
        table.register(
            AddressPattern::catch_all("/eos/out/*"),
            Other,
            CategoryPolicy::logged(Debug),
        );
        table
    }

    pub fn register(
        &mut self,
        pattern: AddressPattern,
        category: FeedbackCategory,
        policy: CategoryPolicy,
    ) {
        self.entries.push(PatternEntry {
            pattern,
            category,
            policy,
        });
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    /// First specific match in registration order, then the catch-alls
    pub fn classify(&self, address: &str) -> Option<&PatternEntry> {
        self.entries
            .iter()
            .filter(|e| !e.pattern.is_catch_all())
            .chain(self.entries.iter().filter(|e| e.pattern.is_catch_all()))
            .find(|e| e.pattern.matches(address))
    }
}
