//! `OpsStore` trait definition
//!
//! Abstract interface over the system-of-record database (map version log,
//! status requests, maintenance cycles, notifications, users). Mirrors the
//! public async surface of `Neo4jClient`, enabling mock-backed tests and
//! future backend swaps.

use crate::cycle::models::Cycle;
use crate::map::models::{TaskType, Tracker};
use crate::notify::types::Notification;
use crate::store::models::UserNode;
use crate::tenant::OrgRef;
use crate::workflow::models::{RequestStatus, TrackerStatusRequest};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Abstract interface for the durable relational store.
#[async_trait]
pub trait OpsStore: Send + Sync {
    /// Connectivity probe for the health endpoint.
    async fn health_check(&self) -> Result<bool>;

    // ========================================================================
    // Map version log (Snapshot Store)
    // ========================================================================

    /// Append one immutable map version row. Fails if the (tenant, version)
    /// key already exists — the backstop against concurrent lost updates.
    async fn append_map_version(
        &self,
        org: &OrgRef,
        trackers: &[Tracker],
        version: i64,
    ) -> Result<()>;

    /// The latest persisted map row for a tenant, if any.
    async fn latest_map_version(&self, org_id: Uuid) -> Result<Option<(Vec<Tracker>, i64)>>;

    /// Every tenant that has at least one persisted map version.
    async fn list_map_tenants(&self) -> Result<Vec<OrgRef>>;

    // ========================================================================
    // Status requests
    // ========================================================================

    async fn create_status_request(
        &self,
        org_id: Uuid,
        request: &TrackerStatusRequest,
    ) -> Result<()>;

    async fn get_status_request(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TrackerStatusRequest>>;

    async fn list_status_requests(
        &self,
        org_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<TrackerStatusRequest>>;

    /// Most recent pending request with the given dedup key created at or
    /// after `since`.
    async fn find_pending_duplicate(
        &self,
        org_id: Uuid,
        dedup_key: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<TrackerStatusRequest>>;

    /// Record the terminal decision on a request.
    async fn record_decision(
        &self,
        org_id: Uuid,
        id: Uuid,
        status: RequestStatus,
        reviewer: Uuid,
        reviewed_at: DateTime<Utc>,
        rejection_reason: Option<&str>,
    ) -> Result<()>;

    // ========================================================================
    // Maintenance cycles
    // ========================================================================

    async fn create_cycle(&self, org_id: Uuid, cycle: &Cycle) -> Result<()>;

    /// The cycle with `completed_at = null` for a task type, if any.
    async fn active_cycle(&self, org_id: Uuid, task_type: TaskType) -> Result<Option<Cycle>>;

    /// The highest cycle number ever issued for a task type.
    async fn latest_cycle_number(&self, org_id: Uuid, task_type: TaskType) -> Result<Option<i64>>;

    /// The most recent cycle for a task type (active or completed).
    async fn latest_cycle(&self, org_id: Uuid, task_type: TaskType) -> Result<Option<Cycle>>;

    /// Set `completed_at` (and denormalized year/month) on a cycle.
    async fn complete_cycle(
        &self,
        org_id: Uuid,
        cycle_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Cycles for a task type, optionally filtered by denormalized
    /// year/month, ordered by cycle number.
    async fn list_cycles(
        &self,
        org_id: Uuid,
        task_type: TaskType,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<Vec<Cycle>>;

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Persist a notification unless one already exists for the same
    /// (kind, request, recipient). Returns whether a row was created.
    async fn create_notification(&self, org_id: Uuid, notification: &Notification)
        -> Result<bool>;

    /// Mark the administrators' submission notifications for a request as
    /// acknowledged. Returns the number of rows updated.
    async fn acknowledge_request_notifications(
        &self,
        org_id: Uuid,
        request_id: Uuid,
    ) -> Result<u64>;

    async fn list_notifications(
        &self,
        org_id: Uuid,
        recipient: Uuid,
    ) -> Result<Vec<Notification>>;

    // ========================================================================
    // Users (admin fan-out only)
    // ========================================================================

    async fn create_user(&self, user: &UserNode) -> Result<()>;

    /// Ids of every administrator in an organization.
    async fn list_administrators(&self, org_id: Uuid) -> Result<Vec<Uuid>>;
}
