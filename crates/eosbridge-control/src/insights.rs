//! Operator behaviour insights derived from the feedback logs

use std::collections::BTreeMap;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::feedback::{FeedbackEntry, OperatorAction};
use crate::osc::pattern::FeedbackCategory;

/// Newest entries of each log considered by an analysis
pub const INSIGHT_SAMPLE_LIMIT: usize = 500;
pub const TOP_ACTIONS: usize = 10;
pub const RECENT_ERRORS_SHOWN: usize = 5;

pub const HIGH_ERROR_THRESHOLD: usize = 5;
pub const RAPID_INTERVAL_SECONDS: f64 = 2.0;
pub const RAPID_MIN_ACTIONS: usize = 10;

pub const HIGH_ERROR_ADVICE: &str =
    "High error rate detected. Review recent_errors to learn what syntax the operator struggled with.";
pub const RAPID_WORK_ADVICE: &str =
    "Operator is working rapidly. They may be using keyboard shortcuts or efficient workflows worth learning.";
pub const CUE_FOCUS_ADVICE: &str =
    "Operator focused on cue programming. They may have established workflows for building cues efficiently.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionCount {
    pub action: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub time: String,
    pub error: String,
}

/// Summary of operator activity within a time window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorInsights {
    pub time_window_minutes: u32,
    pub total_actions: usize,
    pub total_feedback_messages: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub most_common_actions: Vec<ActionCount>,
    pub error_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recent_errors: Vec<ErrorSummary>,
    pub feedback_by_category: BTreeMap<FeedbackCategory, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_seconds_between_actions: Option<f64>,
    pub recommendations: Vec<String>,
}

/// Render a Unix timestamp in local time
pub fn format_timestamp(timestamp: f64, format: &str) -> String {
    let secs = timestamp.floor() as i64;
    let nanos = ((timestamp - timestamp.floor()) * 1e9) as u32;
    match DateTime::<Utc>::from_timestamp(secs, nanos) {
        Some(utc) => utc.with_timezone(&Local).format(format).to_string(),
        None => timestamp.to_string(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derive insights from log snapshots; entries older than the window are ignored
pub fn derive_insights(
    actions: &[OperatorAction],
    feedback: &[FeedbackEntry],
    window_minutes: u32,
    now: f64,
) -> OperatorInsights {
    let cutoff = now - f64::from(window_minutes) * 60.0;
    let recent_actions: Vec<&OperatorAction> =
        actions.iter().filter(|a| a.timestamp >= cutoff).collect();
    let recent_feedback: Vec<&FeedbackEntry> =
        feedback.iter().filter(|f| f.timestamp >= cutoff).collect();

    // Counted in first-seen order so the stable sort breaks ties by it
    let mut action_counts: Vec<ActionCount> = Vec::new();
    for action in &recent_actions {
        let kind = action.action_type();
        match action_counts.iter_mut().find(|c| c.action == kind) {
            Some(existing) => existing.count += 1,
            None => action_counts.push(ActionCount {
                action: kind.to_string(),
                count: 1,
            }),
        }
    }
    action_counts.sort_by(|a, b| b.count.cmp(&a.count));
    action_counts.truncate(TOP_ACTIONS);

    let errors: Vec<&FeedbackEntry> = recent_feedback
        .iter()
        .copied()
        .filter(|f| f.category == FeedbackCategory::Error)
        .collect();
    let recent_errors = errors
        .iter()
        .skip(errors.len().saturating_sub(RECENT_ERRORS_SHOWN))
        .map(|e| ErrorSummary {
            time: format_timestamp(e.timestamp, "%H:%M:%S"),
            error: e
                .args
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    let mut feedback_by_category = BTreeMap::new();
    for entry in &recent_feedback {
        *feedback_by_category.entry(entry.category).or_insert(0) += 1;
    }

    let mean_interval = if recent_actions.len() >= 2 {
        let mut timestamps: Vec<f64> = recent_actions.iter().map(|a| a.timestamp).collect();
        timestamps.sort_by(|a, b| a.total_cmp(b));
        let total: f64 = timestamps.windows(2).map(|w| w[1] - w[0]).sum();
        Some(total / (timestamps.len() - 1) as f64)
    } else {
        None
    };

    let mut recommendations = Vec::new();
    if errors.len() > HIGH_ERROR_THRESHOLD {
        recommendations.push(HIGH_ERROR_ADVICE.to_string());
    }
    if let Some(interval) = mean_interval {
        if interval < RAPID_INTERVAL_SECONDS && recent_actions.len() > RAPID_MIN_ACTIONS {
            recommendations.push(RAPID_WORK_ADVICE.to_string());
        }
    }
    let count_of = |c: FeedbackCategory| feedback_by_category.get(&c).copied().unwrap_or(0);
    if count_of(FeedbackCategory::Cue) > count_of(FeedbackCategory::Patch) {
        recommendations.push(CUE_FOCUS_ADVICE.to_string());
    }

    OperatorInsights {
        time_window_minutes: window_minutes,
        total_actions: recent_actions.len(),
        total_feedback_messages: recent_feedback.len(),
        most_common_actions: action_counts,
        error_count: errors.len(),
        recent_errors,
        feedback_by_category,
        average_seconds_between_actions: mean_interval.map(round2),
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osc::types::FeedbackArg;

    const NOW: f64 = 1_700_000_000.0;

    fn action(address: &str, timestamp: f64) -> OperatorAction {
        OperatorAction {
            timestamp,
            address: address.to_string(),
            action: vec![],
        }
    }

    fn advises(insights: &OperatorInsights, advice: &str) -> bool {
        insights.recommendations.iter().any(|r| r == advice)
    }

    fn entry(category: FeedbackCategory, timestamp: f64) -> FeedbackEntry {
        FeedbackEntry {
            timestamp,
            category,
            address: format!("/eos/out/{}", category),
            args: vec![FeedbackArg::from("x")],
        }
    }

    #[test]
    fn test_empty_logs() {
        let insights = derive_insights(&[], &[], 60, NOW);
        assert_eq!(insights.total_actions, 0);
        assert_eq!(insights.error_count, 0);
        assert!(insights.average_seconds_between_actions.is_none());
        assert!(insights.recommendations.is_empty());

        let json = serde_json::to_value(&insights).unwrap();
        assert!(json.get("average_seconds_between_actions").is_none());
        assert!(json.get("most_common_actions").is_none());
    }

    #[test]
    fn test_single_action_has_no_interval() {
        let insights = derive_insights(&[action("/eos/out/user/1/action", NOW)], &[], 60, NOW);
        assert_eq!(insights.total_actions, 1);
        assert!(insights.average_seconds_between_actions.is_none());
    }

    #[test]
    fn test_rapid_work_advisory() {
        let actions: Vec<_> = (0..12)
            .map(|i| action("/eos/out/user/1/action", NOW - 30.0 + i as f64))
            .collect();
        let insights = derive_insights(&actions, &[], 60, NOW);
        assert_eq!(insights.average_seconds_between_actions, Some(1.0));
        assert!(advises(&insights, RAPID_WORK_ADVICE));
    }

    #[test]
    fn test_rapid_requires_more_than_ten_actions() {
        let actions: Vec<_> = (0..10)
            .map(|i| action("/eos/out/user/1/action", NOW - 30.0 + i as f64))
            .collect();
        let insights = derive_insights(&actions, &[], 60, NOW);
        assert!(!advises(&insights, RAPID_WORK_ADVICE));
    }

    #[test]
    fn test_window_excludes_old_entries() {
        let actions = vec![
            action("/eos/out/user/1/action", NOW - 7200.0),
            action("/eos/out/user/1/action", NOW - 10.0),
        ];
        let feedback = vec![
            entry(FeedbackCategory::Error, NOW - 7200.0),
            entry(FeedbackCategory::Error, NOW - 5.0),
        ];
        let insights = derive_insights(&actions, &feedback, 60, NOW);
        assert_eq!(insights.total_actions, 1);
        assert_eq!(insights.total_feedback_messages, 1);
        assert_eq!(insights.error_count, 1);
    }

    #[test]
    fn test_high_error_advisory() {
        let feedback: Vec<_> = (0..6)
            .map(|i| entry(FeedbackCategory::Error, NOW - i as f64))
            .collect();
        let insights = derive_insights(&[], &feedback, 60, NOW);
        assert_eq!(insights.error_count, 6);
        assert_eq!(insights.recent_errors.len(), RECENT_ERRORS_SHOWN);
        assert!(advises(&insights, HIGH_ERROR_ADVICE));

        let five = &feedback[..5];
        let insights = derive_insights(&[], five, 60, NOW);
        assert!(insights.recommendations.is_empty());
    }

    #[test]
    fn test_cue_focus_advisory() {
        let feedback = vec![
            entry(FeedbackCategory::Cue, NOW),
            entry(FeedbackCategory::Cue, NOW),
            entry(FeedbackCategory::Patch, NOW),
        ];
        let insights = derive_insights(&[], &feedback, 60, NOW);
        assert_eq!(
            insights.feedback_by_category.get(&FeedbackCategory::Cue),
            Some(&2)
        );
        assert_eq!(insights.recommendations, vec![CUE_FOCUS_ADVICE.to_string()]);
    }

    #[test]
    fn test_action_frequency_ties_keep_first_seen_order() {
        let actions = vec![
            action("/eos/out/user/1/go", NOW - 5.0),
            action("/eos/out/user/1/record", NOW - 4.0),
            action("/eos/out/user/1/record", NOW - 3.0),
            action("/eos/out/user/1/go", NOW - 2.0),
            action("/eos/out/user/1/clear", NOW - 1.0),
            action("/eos/out/user/1/clear", NOW - 0.5),
            action("/eos/out/user/1/clear", NOW),
        ];
        let insights = derive_insights(&actions, &[], 60, NOW);
        let names: Vec<_> = insights
            .most_common_actions
            .iter()
            .map(|c| (c.action.as_str(), c.count))
            .collect();
        assert_eq!(names, vec![("clear", 3), ("go", 2), ("record", 2)]);
    }

    #[test]
    fn test_top_ten_only() {
        let actions: Vec<_> = (0..15)
            .map(|i| action(&format!("/eos/out/user/1/key{}", i), NOW))
            .collect();
        let insights = derive_insights(&actions, &[], 60, NOW);
        assert_eq!(insights.most_common_actions.len(), TOP_ACTIONS);
        assert_eq!(insights.most_common_actions[0].action, "key0");
    }

    #[test]
    fn test_interval_rounding() {
        let actions = vec![
            action("/eos/out/user/1/action", NOW - 10.0),
            action("/eos/out/user/1/action", NOW - 6.667),
            action("/eos/out/user/1/action", NOW),
        ];
        let insights = derive_insights(&actions, &[], 60, NOW);
        assert_eq!(insights.average_seconds_between_actions, Some(5.0));
    }
}
