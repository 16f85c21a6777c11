//! Maintenance-cycle models and progress/statistics types

use crate::map::models::TaskType;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One maintenance round for a task type, from start to 100% completion or
/// explicit reset. Cycles are never deleted; history feeds reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    pub id: Uuid,
    pub task_type: TaskType,
    /// Sequence per task type, starting at 1. Never reused.
    pub cycle_number: i64,
    pub started_at: DateTime<Utc>,
    /// None while the cycle is active. At most one cycle per task type is
    /// active at any time.
    pub completed_at: Option<DateTime<Utc>>,
    pub reset_by: Option<Uuid>,
    pub reset_at: Option<DateTime<Utc>>,
    /// Denormalized from the completion/reset time, for reporting filters.
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl Cycle {
    /// Start a fresh cycle now.
    pub fn start(task_type: TaskType, cycle_number: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_type,
            cycle_number,
            started_at: Utc::now(),
            completed_at: None,
            reset_by: None,
            reset_at: None,
            year: None,
            month: None,
        }
    }

    /// Start a cycle created by an explicit reset.
    pub fn start_from_reset(task_type: TaskType, cycle_number: i64, reset_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            task_type,
            cycle_number,
            started_at: now,
            completed_at: None,
            reset_by: Some(reset_by),
            reset_at: Some(now),
            year: None,
            month: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.completed_at.is_none()
    }

    /// Mark complete at `at`, denormalizing year/month. Idempotent: a
    /// completed cycle is left untouched.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        if self.completed_at.is_none() {
            self.completed_at = Some(at);
            self.year = Some(at.year());
            self.month = Some(at.month());
        }
    }
}

/// Aggregate progress derived from the map's color state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleProgress {
    /// Percentage in [0, 100].
    pub progress: f64,
    pub done_count: usize,
    pub halfway_count: usize,
    pub total_count: usize,
}

impl CycleProgress {
    pub fn zero() -> Self {
        Self {
            progress: 0.0,
            done_count: 0,
            halfway_count: 0,
            total_count: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0
    }
}

/// Yearly statistics over persisted cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleStats {
    pub total_cycles: usize,
    /// Mean of (completed_at - started_at) in days, over completed cycles
    /// only. None when no cycle completed in the period.
    pub average_duration_days: Option<f64>,
    /// Completed-cycle count per month (1-12).
    pub by_month: BTreeMap<u32, usize>,
    pub peak_month: Option<u32>,
}
