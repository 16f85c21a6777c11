//! In-memory mock implementation of OpsStore for testing.
//!
//! Backed by `tokio::sync::RwLock<HashMap<K, V>>` collections. The map
//! version log rejects duplicate versions like the real unique constraint.
//! Conditionally compiled with `#[cfg(test)]`.

use super::models::{UserNode, UserRole};
use super::traits::OpsStore;
use crate::cycle::models::Cycle;
use crate::map::models::{TaskType, Tracker};
use crate::notify::types::Notification;
use crate::tenant::OrgRef;
use crate::workflow::models::{RequestStatus, TrackerStatusRequest};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory mock implementation of OpsStore for testing.
#[derive(Default)]
pub struct MockOpsStore {
    /// org_id -> append-only list of (trackers, version)
    pub map_versions: RwLock<HashMap<Uuid, Vec<(Vec<Tracker>, i64)>>>,
    /// org_id -> slug (learned from appends)
    pub tenants: RwLock<HashMap<Uuid, String>>,
    /// request id -> (org_id, request)
    pub requests: RwLock<HashMap<Uuid, (Uuid, TrackerStatusRequest)>>,
    /// cycle id -> (org_id, cycle)
    pub cycles: RwLock<HashMap<Uuid, (Uuid, Cycle)>>,
    /// dedup_key -> (org_id, notification)
    pub notifications: RwLock<HashMap<String, (Uuid, Notification)>>,
    pub users: RwLock<Vec<UserNode>>,
    /// When set, `append_map_version` fails — simulates a Snapshot Store
    /// outage during the authoritative write.
    pub fail_appends: AtomicBool,
}

impl MockOpsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl OpsStore for MockOpsStore {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn append_map_version(
        &self,
        org: &OrgRef,
        trackers: &[Tracker],
        version: i64,
    ) -> Result<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated snapshot store outage"));
        }

        let mut versions = self.map_versions.write().await;
        let rows = versions.entry(org.id).or_default();
        if rows.iter().any(|(_, v)| *v == version) {
            return Err(anyhow!(
                "version {} already exists for tenant {}",
                version,
                org.slug
            ));
        }
        rows.push((trackers.to_vec(), version));

        self.tenants.write().await.insert(org.id, org.slug.clone());
        Ok(())
    }

    async fn latest_map_version(&self, org_id: Uuid) -> Result<Option<(Vec<Tracker>, i64)>> {
        let versions = self.map_versions.read().await;
        Ok(versions
            .get(&org_id)
            .and_then(|rows| rows.iter().max_by_key(|(_, v)| *v).cloned()))
    }

    async fn list_map_tenants(&self) -> Result<Vec<OrgRef>> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .iter()
            .map(|(id, slug)| OrgRef {
                id: *id,
                slug: slug.clone(),
            })
            .collect())
    }

    async fn create_status_request(
        &self,
        org_id: Uuid,
        request: &TrackerStatusRequest,
    ) -> Result<()> {
        self.requests
            .write()
            .await
            .insert(request.id, (org_id, request.clone()));
        Ok(())
    }

    async fn get_status_request(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TrackerStatusRequest>> {
        let requests = self.requests.read().await;
        Ok(requests
            .get(&id)
            .filter(|(org, _)| *org == org_id)
            .map(|(_, r)| r.clone()))
    }

    async fn list_status_requests(
        &self,
        org_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<TrackerStatusRequest>> {
        let requests = self.requests.read().await;
        let mut out: Vec<TrackerStatusRequest> = requests
            .values()
            .filter(|(org, r)| *org == org_id && status.is_none_or(|s| r.status == s))
            .map(|(_, r)| r.clone())
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn find_pending_duplicate(
        &self,
        org_id: Uuid,
        dedup_key: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<TrackerStatusRequest>> {
        let requests = self.requests.read().await;
        Ok(requests
            .values()
            .filter(|(org, r)| {
                *org == org_id
                    && r.is_pending()
                    && r.dedup_key() == dedup_key
                    && r.created_at >= since
            })
            .max_by_key(|(_, r)| r.created_at)
            .map(|(_, r)| r.clone()))
    }

    async fn record_decision(
        &self,
        org_id: Uuid,
        id: Uuid,
        status: RequestStatus,
        reviewer: Uuid,
        reviewed_at: DateTime<Utc>,
        rejection_reason: Option<&str>,
    ) -> Result<()> {
        let mut requests = self.requests.write().await;
        let (org, request) = requests
            .get_mut(&id)
            .ok_or_else(|| anyhow!("Status request {} not found", id))?;
        if *org != org_id {
            return Err(anyhow!("Status request {} not found", id));
        }
        request.status = status;
        request.reviewer = Some(reviewer);
        request.reviewed_at = Some(reviewed_at);
        request.rejection_reason = rejection_reason.map(|s| s.to_string());
        Ok(())
    }

    async fn create_cycle(&self, org_id: Uuid, cycle: &Cycle) -> Result<()> {
        let mut cycles = self.cycles.write().await;
        if cycles.values().any(|(org, c)| {
            *org == org_id
                && c.task_type == cycle.task_type
                && c.cycle_number == cycle.cycle_number
        }) {
            return Err(anyhow!(
                "cycle number {} already exists for {}",
                cycle.cycle_number,
                cycle.task_type
            ));
        }
        cycles.insert(cycle.id, (org_id, cycle.clone()));
        Ok(())
    }

    async fn active_cycle(&self, org_id: Uuid, task_type: TaskType) -> Result<Option<Cycle>> {
        let cycles = self.cycles.read().await;
        Ok(cycles
            .values()
            .filter(|(org, c)| *org == org_id && c.task_type == task_type && c.is_active())
            .max_by_key(|(_, c)| c.cycle_number)
            .map(|(_, c)| c.clone()))
    }

    async fn latest_cycle_number(&self, org_id: Uuid, task_type: TaskType) -> Result<Option<i64>> {
        let cycles = self.cycles.read().await;
        Ok(cycles
            .values()
            .filter(|(org, c)| *org == org_id && c.task_type == task_type)
            .map(|(_, c)| c.cycle_number)
            .max())
    }

    async fn latest_cycle(&self, org_id: Uuid, task_type: TaskType) -> Result<Option<Cycle>> {
        let cycles = self.cycles.read().await;
        Ok(cycles
            .values()
            .filter(|(org, c)| *org == org_id && c.task_type == task_type)
            .max_by_key(|(_, c)| c.cycle_number)
            .map(|(_, c)| c.clone()))
    }

    async fn complete_cycle(
        &self,
        org_id: Uuid,
        cycle_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut cycles = self.cycles.write().await;
        let (org, cycle) = cycles
            .get_mut(&cycle_id)
            .ok_or_else(|| anyhow!("Cycle {} not found", cycle_id))?;
        if *org != org_id {
            return Err(anyhow!("Cycle {} not found", cycle_id));
        }
        cycle.complete(completed_at);
        Ok(())
    }

    async fn list_cycles(
        &self,
        org_id: Uuid,
        task_type: TaskType,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<Vec<Cycle>> {
        let cycles = self.cycles.read().await;
        let mut out: Vec<Cycle> = cycles
            .values()
            .filter(|(org, c)| {
                *org == org_id
                    && c.task_type == task_type
                    && year.is_none_or(|y| c.year == Some(y))
                    && month.is_none_or(|m| c.month == Some(m))
            })
            .map(|(_, c)| c.clone())
            .collect();
        out.sort_by_key(|c| c.cycle_number);
        Ok(out)
    }

    async fn create_notification(
        &self,
        org_id: Uuid,
        notification: &Notification,
    ) -> Result<bool> {
        let mut notifications = self.notifications.write().await;
        let key = notification.dedup_key();
        if notifications.contains_key(&key) {
            return Ok(false);
        }
        notifications.insert(key, (org_id, notification.clone()));
        Ok(true)
    }

    async fn acknowledge_request_notifications(
        &self,
        org_id: Uuid,
        request_id: Uuid,
    ) -> Result<u64> {
        let mut notifications = self.notifications.write().await;
        let mut updated = 0;
        for (org, n) in notifications.values_mut() {
            if *org == org_id
                && n.request_id == request_id
                && n.kind == crate::notify::types::NotificationKind::StatusRequestSubmitted
                && !n.acknowledged
            {
                n.acknowledged = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn list_notifications(&self, org_id: Uuid, recipient: Uuid) -> Result<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        let mut out: Vec<Notification> = notifications
            .values()
            .filter(|(org, n)| *org == org_id && n.recipient == recipient)
            .map(|(_, n)| n.clone())
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn create_user(&self, user: &UserNode) -> Result<()> {
        self.users.write().await.push(user.clone());
        Ok(())
    }

    async fn list_administrators(&self, org_id: Uuid) -> Result<Vec<Uuid>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| u.org_id == org_id && u.role == UserRole::Admin)
            .map(|u| u.id)
            .collect())
    }
}
