//! Task domain model.
//!
//! A task's progress is a single three-state lifecycle. The `status` enum
//! and `completed` boolean that clients send and receive are both derived
//! from it at the API boundary, so the two can never disagree in storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Todo,
    Doing,
    Done,
}

impl Lifecycle {
    /// Resolve a possibly-conflicting raw (`status`, `completed`) pair into
    /// the canonical lifecycle state. Total over all inputs and idempotent:
    /// unrecognized or missing statuses fall through to `Todo`.
    ///
    /// `completed: true` (or `status: "done"`) always wins, so a caller that
    /// only flips the checkbox still lands on `Done`.
    pub fn reconcile(status: Option<&str>, completed: Option<bool>) -> Self {
        if completed == Some(true) || status == Some("done") {
            Lifecycle::Done
        } else if status == Some("doing") {
            Lifecycle::Doing
        } else {
            Lifecycle::Todo
        }
    }

    /// Wire value of the derived `status` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Lifecycle::Todo => "todo",
            Lifecycle::Doing => "doing",
            Lifecycle::Done => "done",
        }
    }

    /// Wire value of the derived `completed` field.
    pub fn is_completed(self) -> bool {
        self == Lifecycle::Done
    }
}

/// Task priority. Anything outside the three literals coerces to `Medium`,
/// both on input and when reading legacy rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn parse_lossy(value: &str) -> Self {
        match value {
            "High" => Priority::High,
            "Low" => Priority::Low,
            _ => Priority::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// A persisted task. Holds only the canonical lifecycle; the dual
/// status/completed shape is produced by the API layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub lifecycle: Lifecycle,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_yields_only_the_three_canonical_pairs() {
        let statuses = [None, Some("todo"), Some("doing"), Some("done"), Some("bogus")];
        let completeds = [None, Some(false), Some(true)];
        for status in statuses {
            for completed in completeds {
                let state = Lifecycle::reconcile(status, completed);
                // completed is derived, so the pair is one of exactly three.
                match state {
                    Lifecycle::Done => assert!(state.is_completed()),
                    Lifecycle::Todo | Lifecycle::Doing => assert!(!state.is_completed()),
                }
            }
        }
    }

    #[test]
    fn reconcile_is_idempotent() {
        let inputs = [
            (None, None),
            (Some("todo"), Some(true)),
            (Some("doing"), Some(false)),
            (Some("done"), None),
            (Some("garbage"), Some(true)),
        ];
        for (status, completed) in inputs {
            let once = Lifecycle::reconcile(status, completed);
            let twice = Lifecycle::reconcile(Some(once.as_str()), Some(once.is_completed()));
            assert_eq!(once, twice, "not idempotent for {:?}/{:?}", status, completed);
        }
    }

    #[test]
    fn completed_flag_forces_done_regardless_of_status() {
        assert_eq!(Lifecycle::reconcile(Some("todo"), Some(true)), Lifecycle::Done);
        assert_eq!(Lifecycle::reconcile(Some("doing"), Some(true)), Lifecycle::Done);
        assert_eq!(Lifecycle::reconcile(None, Some(true)), Lifecycle::Done);
    }

    #[test]
    fn unrecognized_status_falls_back_to_todo() {
        assert_eq!(Lifecycle::reconcile(Some("DONE"), None), Lifecycle::Todo);
        assert_eq!(Lifecycle::reconcile(Some("in-progress"), Some(false)), Lifecycle::Todo);
    }

    #[test]
    fn invalid_priority_coerces_to_medium() {
        assert_eq!(Priority::parse_lossy("urgent"), Priority::Medium);
        assert_eq!(Priority::parse_lossy(""), Priority::Medium);
        assert_eq!(Priority::parse_lossy("high"), Priority::Medium);
        assert_eq!(Priority::parse_lossy("High"), Priority::High);
        assert_eq!(Priority::parse_lossy("Low"), Priority::Low);
    }
}
