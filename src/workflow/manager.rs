//! Request Workflow — the state machine for tracker status requests
//!
//! Submissions are validated, deduplicated against a 30-second window of
//! identical pending requests, persisted, and fanned out to tenant
//! administrators. Decisions recolor the map first and only then mark the
//! request terminal: a failure during the map write leaves the request
//! pending, never approved-but-unapplied.

use super::models::{
    DecisionAction, RequestStatus, SubmitStatusRequest, TrackerStatusRequest, DEDUP_WINDOW_SECS,
    DEFAULT_REJECTION_REASON,
};
use crate::cycle::CycleTracker;
use crate::error::{OpsError, OpsResult};
use crate::map::MapService;
use crate::notify::{Notification, NotificationKind, NotificationSink};
use crate::store::OpsStore;
use crate::tenant::{OrgRef, RequestContext};
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Manager for tracker status requests.
pub struct RequestWorkflow {
    store: Arc<dyn OpsStore>,
    map: Arc<MapService>,
    cycles: Arc<CycleTracker>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl RequestWorkflow {
    pub fn new(
        store: Arc<dyn OpsStore>,
        map: Arc<MapService>,
        cycles: Arc<CycleTracker>,
    ) -> Self {
        Self {
            store,
            map,
            cycles,
            sink: None,
        }
    }

    /// Attach an outbound notification sink (builder pattern).
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Submit a status-change proposal. Persisted as pending, then tenant
    /// administrators are notified asynchronously.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        input: SubmitStatusRequest,
    ) -> OpsResult<TrackerStatusRequest> {
        let org = ctx.tenant.as_org().ok_or_else(|| {
            OpsError::Validation("status requests require an organization scope".to_string())
        })?;

        if input.tracker_ids.iter().all(|id| id.trim().is_empty()) {
            return Err(OpsError::Validation(
                "at least one tracker id is required".to_string(),
            ));
        }

        let request = TrackerStatusRequest::new(
            ctx.user_id,
            input.tracker_ids,
            input.task_type,
            input.status_type,
            input.message,
        );

        // Absorb client double-submits: an identical pending request from
        // the same requester inside the window is a conflict, not a new
        // request. This is not a general idempotency key.
        let since = request.created_at - Duration::seconds(DEDUP_WINDOW_SECS);
        let duplicate = self
            .store
            .find_pending_duplicate(org.id, &request.dedup_key(), since)
            .await
            .map_err(|e| OpsError::storage(format!("tenant={} requests", org.slug), e))?;
        if let Some(existing) = duplicate {
            return Err(OpsError::conflict_with(
                format!(
                    "an identical request from this user is already pending (within {}s)",
                    DEDUP_WINDOW_SECS
                ),
                existing,
            ));
        }

        self.store
            .create_status_request(org.id, &request)
            .await
            .map_err(|e| OpsError::storage(format!("tenant={} requests", org.slug), e))?;

        info!(
            tenant = %org.slug,
            request = %request.id,
            task_type = %request.task_type,
            trackers = request.tracker_ids.len(),
            "Status request submitted"
        );

        self.spawn_admin_fanout(org.clone(), request.clone());
        Ok(request)
    }

    /// Decide a pending request. Approval recolors exactly the requested
    /// trackers and drives the cycle tracker; rejection records a reason
    /// and touches nothing on the map.
    pub async fn decide(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
        action: DecisionAction,
        rejection_reason: Option<String>,
    ) -> OpsResult<TrackerStatusRequest> {
        let org = ctx.tenant.as_org().ok_or_else(|| {
            OpsError::Validation("status requests require an organization scope".to_string())
        })?;
        if !ctx.is_admin {
            return Err(OpsError::Forbidden(
                "only administrators can decide status requests".to_string(),
            ));
        }
        let storage = |e| OpsError::storage(format!("tenant={} requests", org.slug), e);

        let request = self
            .store
            .get_status_request(org.id, request_id)
            .await
            .map_err(storage)?
            .ok_or_else(|| OpsError::NotFound(format!("status request {} not found", request_id)))?;

        if !request.is_pending() {
            return Err(OpsError::conflict_with(
                format!("request was already {}", request.status),
                request,
            ));
        }

        let now = Utc::now();
        let mut decided = request.clone();

        match action {
            DecisionAction::Approve => {
                // Recolor first: if the map write fails the request stays
                // pending and the decision can be retried
                let ids: HashSet<String> = request.tracker_ids.iter().cloned().collect();
                let task_type = request.task_type;
                let target = request.status_type.target_color();
                let snapshot = self
                    .map
                    .mutate(&ctx.tenant, move |trackers| {
                        for tracker in trackers.iter_mut() {
                            if ids.contains(&tracker.id) {
                                tracker.set_color_for(task_type, target);
                            }
                        }
                    })
                    .await?;

                self.store
                    .record_decision(
                        org.id,
                        request.id,
                        RequestStatus::Approved,
                        ctx.user_id,
                        now,
                        None,
                    )
                    .await
                    .map_err(storage)?;
                decided.status = RequestStatus::Approved;

                self.cycles.ensure_active(&ctx.tenant, task_type).await?;
                self.cycles
                    .recompute_and_maybe_complete(&ctx.tenant, task_type, &snapshot)
                    .await?;

                info!(
                    tenant = %org.slug,
                    request = %request.id,
                    version = snapshot.version,
                    "Status request approved"
                );
            }
            DecisionAction::Reject => {
                let reason = rejection_reason
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());
                self.store
                    .record_decision(
                        org.id,
                        request.id,
                        RequestStatus::Rejected,
                        ctx.user_id,
                        now,
                        Some(&reason),
                    )
                    .await
                    .map_err(storage)?;
                decided.status = RequestStatus::Rejected;
                decided.rejection_reason = Some(reason);

                info!(tenant = %org.slug, request = %request.id, "Status request rejected");
            }
        }

        decided.reviewer = Some(ctx.user_id);
        decided.reviewed_at = Some(now);

        self.spawn_decision_notices(org.clone(), decided.clone());
        Ok(decided)
    }

    /// Fetch one request.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
    ) -> OpsResult<TrackerStatusRequest> {
        let org = ctx.tenant.as_org().ok_or_else(|| {
            OpsError::Validation("status requests require an organization scope".to_string())
        })?;
        self.store
            .get_status_request(org.id, request_id)
            .await
            .map_err(|e| OpsError::storage(format!("tenant={} requests", org.slug), e))?
            .ok_or_else(|| OpsError::NotFound(format!("status request {} not found", request_id)))
    }

    /// List requests, optionally filtered by status.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        status: Option<RequestStatus>,
    ) -> OpsResult<Vec<TrackerStatusRequest>> {
        let org = ctx.tenant.as_org().ok_or_else(|| {
            OpsError::Validation("status requests require an organization scope".to_string())
        })?;
        self.store
            .list_status_requests(org.id, status)
            .await
            .map_err(|e| OpsError::storage(format!("tenant={} requests", org.slug), e))
    }

    /// Notify every tenant administrator about a new submission.
    /// Best-effort and idempotent per (request, recipient): a retried
    /// attempt never creates a duplicate, per-recipient failures only log.
    fn spawn_admin_fanout(&self, org: OrgRef, request: TrackerStatusRequest) {
        let store = self.store.clone();
        let sink = self.sink.clone();

        tokio::spawn(async move {
            let admins = match store.list_administrators(org.id).await {
                Ok(admins) => admins,
                Err(e) => {
                    warn!(
                        tenant = %org.slug,
                        request = %request.id,
                        "Failed to list administrators for fan-out: {:#}",
                        e
                    );
                    return;
                }
            };

            let message = format!(
                "{} tracker(s) proposed {} for {}",
                request.tracker_ids.len(),
                request.status_type,
                request.task_type
            );

            for admin in admins {
                let notification = Notification::new(
                    admin,
                    NotificationKind::StatusRequestSubmitted,
                    "Tracker status update requested",
                    message.clone(),
                    request.id,
                );
                match store.create_notification(org.id, &notification).await {
                    Ok(true) => {
                        if let Some(sink) = &sink {
                            sink.deliver(&notification);
                        }
                    }
                    Ok(false) => {
                        // Already notified for this request — retried fan-out
                    }
                    Err(e) => {
                        warn!(
                            tenant = %org.slug,
                            recipient = %admin,
                            request = %request.id,
                            "Failed to persist admin notification: {:#}",
                            e
                        );
                    }
                }
            }
        });
    }

    /// Tell the requester about the outcome and acknowledge the admins'
    /// originating notifications so they stop appearing as actionable.
    /// Runs after the decision is durably recorded; failures never roll it
    /// back.
    fn spawn_decision_notices(&self, org: OrgRef, request: TrackerStatusRequest) {
        let store = self.store.clone();
        let sink = self.sink.clone();

        tokio::spawn(async move {
            let message = match request.status {
                RequestStatus::Approved => format!(
                    "Your {} request for {} tracker(s) was approved",
                    request.task_type,
                    request.tracker_ids.len()
                ),
                RequestStatus::Rejected => format!(
                    "Your {} request was rejected: {}",
                    request.task_type,
                    request
                        .rejection_reason
                        .as_deref()
                        .unwrap_or(DEFAULT_REJECTION_REASON)
                ),
                RequestStatus::Pending => return,
            };

            let notification = Notification::new(
                request.requester,
                NotificationKind::StatusRequestDecided,
                "Status request decided",
                message,
                request.id,
            );
            match store.create_notification(org.id, &notification).await {
                Ok(true) => {
                    if let Some(sink) = &sink {
                        sink.deliver(&notification);
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        tenant = %org.slug,
                        recipient = %request.requester,
                        request = %request.id,
                        "Failed to persist requester notification: {:#}",
                        e
                    );
                }
            }

            if let Err(e) = store
                .acknowledge_request_notifications(org.id, request.id)
                .await
            {
                warn!(
                    tenant = %org.slug,
                    request = %request.id,
                    "Failed to acknowledge admin notifications: {:#}",
                    e
                );
            }
        });
    }
}
