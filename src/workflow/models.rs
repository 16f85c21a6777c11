//! Tracker status-change requests and their state machine

use crate::map::models::{StatusType, TaskType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Window within which an identical pending submission is treated as a
/// client double-submit rather than a new request.
pub const DEDUP_WINDOW_SECS: i64 = 30;

/// Recorded when an administrator rejects without giving a reason.
pub const DEFAULT_REJECTION_REASON: &str = "Rejected without a stated reason";

/// Lifecycle of a status request. Terminal once non-pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An administrator's decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Approve,
    Reject,
}

/// A proposed status change for a set of trackers, awaiting review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerStatusRequest {
    pub id: Uuid,
    pub requester: Uuid,
    /// Sorted and deduplicated at construction; equality is set equality.
    pub tracker_ids: Vec<String>,
    pub task_type: TaskType,
    pub status_type: StatusType,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub reviewer: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TrackerStatusRequest {
    /// A new pending request. Tracker ids are normalized to a sorted,
    /// deduplicated list so that the dedup key is order-independent.
    pub fn new(
        requester: Uuid,
        tracker_ids: Vec<String>,
        task_type: TaskType,
        status_type: StatusType,
        message: Option<String>,
    ) -> Self {
        let normalized: BTreeSet<String> = tracker_ids.into_iter().collect();
        Self {
            id: Uuid::new_v4(),
            requester,
            tracker_ids: normalized.into_iter().collect(),
            task_type,
            status_type,
            message,
            status: RequestStatus::Pending,
            reviewer: None,
            reviewed_at: None,
            rejection_reason: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Stable key identifying a duplicate submission: same requester, same
    /// tracker-id set, same task type, same status type.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.requester,
            self.task_type,
            self.status_type,
            self.tracker_ids.join(",")
        )
    }
}

/// Submission payload accepted by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitStatusRequest {
    pub tracker_ids: Vec<String>,
    pub task_type: TaskType,
    pub status_type: StatusType,
    #[serde(default)]
    pub message: Option<String>,
}
