//! `OpsStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on
//! `Neo4jClient`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::client::Neo4jClient;
use super::models::UserNode;
use super::traits::OpsStore;
use crate::cycle::models::Cycle;
use crate::map::models::{TaskType, Tracker};
use crate::notify::types::Notification;
use crate::tenant::OrgRef;
use crate::workflow::models::{RequestStatus, TrackerStatusRequest};

#[async_trait]
impl OpsStore for Neo4jClient {
    async fn health_check(&self) -> anyhow::Result<bool> {
        self.health_check().await
    }

    // ========================================================================
    // Map version log
    // ========================================================================

    async fn append_map_version(
        &self,
        org: &OrgRef,
        trackers: &[Tracker],
        version: i64,
    ) -> anyhow::Result<()> {
        self.append_map_version(org, trackers, version).await
    }

    async fn latest_map_version(
        &self,
        org_id: Uuid,
    ) -> anyhow::Result<Option<(Vec<Tracker>, i64)>> {
        self.latest_map_version(org_id).await
    }

    async fn list_map_tenants(&self) -> anyhow::Result<Vec<OrgRef>> {
        self.list_map_tenants().await
    }

    // ========================================================================
    // Status requests
    // ========================================================================

    async fn create_status_request(
        &self,
        org_id: Uuid,
        request: &TrackerStatusRequest,
    ) -> anyhow::Result<()> {
        self.create_status_request(org_id, request).await
    }

    async fn get_status_request(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> anyhow::Result<Option<TrackerStatusRequest>> {
        self.get_status_request(org_id, id).await
    }

    async fn list_status_requests(
        &self,
        org_id: Uuid,
        status: Option<RequestStatus>,
    ) -> anyhow::Result<Vec<TrackerStatusRequest>> {
        self.list_status_requests(org_id, status).await
    }

    async fn find_pending_duplicate(
        &self,
        org_id: Uuid,
        dedup_key: &str,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Option<TrackerStatusRequest>> {
        self.find_pending_duplicate(org_id, dedup_key, since).await
    }

    async fn record_decision(
        &self,
        org_id: Uuid,
        id: Uuid,
        status: RequestStatus,
        reviewer: Uuid,
        reviewed_at: DateTime<Utc>,
        rejection_reason: Option<&str>,
    ) -> anyhow::Result<()> {
        self.record_decision(org_id, id, status, reviewer, reviewed_at, rejection_reason)
            .await
    }

    // ========================================================================
    // Maintenance cycles
    // ========================================================================

    async fn create_cycle(&self, org_id: Uuid, cycle: &Cycle) -> anyhow::Result<()> {
        self.create_cycle(org_id, cycle).await
    }

    async fn active_cycle(
        &self,
        org_id: Uuid,
        task_type: TaskType,
    ) -> anyhow::Result<Option<Cycle>> {
        self.active_cycle(org_id, task_type).await
    }

    async fn latest_cycle_number(
        &self,
        org_id: Uuid,
        task_type: TaskType,
    ) -> anyhow::Result<Option<i64>> {
        self.latest_cycle_number(org_id, task_type).await
    }

    async fn latest_cycle(
        &self,
        org_id: Uuid,
        task_type: TaskType,
    ) -> anyhow::Result<Option<Cycle>> {
        self.latest_cycle(org_id, task_type).await
    }

    async fn complete_cycle(
        &self,
        org_id: Uuid,
        cycle_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.complete_cycle(org_id, cycle_id, completed_at).await
    }

    async fn list_cycles(
        &self,
        org_id: Uuid,
        task_type: TaskType,
        year: Option<i32>,
        month: Option<u32>,
    ) -> anyhow::Result<Vec<Cycle>> {
        self.list_cycles(org_id, task_type, year, month).await
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    async fn create_notification(
        &self,
        org_id: Uuid,
        notification: &Notification,
    ) -> anyhow::Result<bool> {
        self.create_notification(org_id, notification).await
    }

    async fn acknowledge_request_notifications(
        &self,
        org_id: Uuid,
        request_id: Uuid,
    ) -> anyhow::Result<u64> {
        self.acknowledge_request_notifications(org_id, request_id)
            .await
    }

    async fn list_notifications(
        &self,
        org_id: Uuid,
        recipient: Uuid,
    ) -> anyhow::Result<Vec<Notification>> {
        self.list_notifications(org_id, recipient).await
    }

    // ========================================================================
    // Users
    // ========================================================================

    async fn create_user(&self, user: &UserNode) -> anyhow::Result<()> {
        self.create_user(user).await
    }

    async fn list_administrators(&self, org_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        self.list_administrators(org_id).await
    }
}
