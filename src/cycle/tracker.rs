//! Cycle Tracker — derives maintenance-cycle lifecycle from the map's
//! color state
//!
//! Progress is a pure function over an immutable snapshot; the tracker
//! invokes it after every mutation and owns cycle creation, completion,
//! reset, and reporting.

use super::models::{Cycle, CycleProgress, CycleStats};
use crate::error::{OpsError, OpsResult};
use crate::map::models::{color, MapSnapshot, TaskType};
use crate::map::MapService;
use crate::store::OpsStore;
use crate::tenant::{OrgRef, RequestContext, TenantScope};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Aggregate progress for one task type over a snapshot.
///
/// Only cycle-eligible trackers count; a done tracker contributes 1, a
/// halfway tracker 0.5. An empty map is 0%, not an error.
pub fn compute_progress(snapshot: &MapSnapshot, task_type: TaskType) -> CycleProgress {
    let eligible: Vec<_> = snapshot
        .trackers
        .iter()
        .filter(|t| t.is_cycle_eligible())
        .collect();

    let total_count = eligible.len();
    if total_count == 0 {
        return CycleProgress::zero();
    }

    let done_count = eligible
        .iter()
        .filter(|t| t.color_for(task_type) == color::DONE)
        .count();
    let halfway_count = eligible
        .iter()
        .filter(|t| t.color_for(task_type) == color::HALFWAY)
        .count();

    let raw = (done_count as f64 + 0.5 * halfway_count as f64) / total_count as f64 * 100.0;

    CycleProgress {
        progress: raw.clamp(0.0, 100.0),
        done_count,
        halfway_count,
        total_count,
    }
}

/// Manager for the maintenance-cycle lifecycle.
pub struct CycleTracker {
    store: Arc<dyn OpsStore>,
    map: Arc<MapService>,
}

impl CycleTracker {
    pub fn new(store: Arc<dyn OpsStore>, map: Arc<MapService>) -> Self {
        Self { store, map }
    }

    fn require_org<'a>(&self, tenant: &'a TenantScope) -> OpsResult<&'a OrgRef> {
        tenant.as_org().ok_or_else(|| {
            OpsError::Validation("maintenance cycles require an organization scope".to_string())
        })
    }

    /// The active cycle, creating cycle 1 lazily when no cycle has ever
    /// existed. When every cycle is complete, the latest is returned
    /// unchanged — only a reset starts a successor. Safe to call on every
    /// approval.
    pub async fn ensure_active(
        &self,
        tenant: &TenantScope,
        task_type: TaskType,
    ) -> OpsResult<Cycle> {
        let org = self.require_org(tenant)?;
        let storage = |e| OpsError::storage(format!("tenant={} cycles", org.slug), e);

        if let Some(active) = self
            .store
            .active_cycle(org.id, task_type)
            .await
            .map_err(storage)?
        {
            return Ok(active);
        }

        if let Some(latest) = self
            .store
            .latest_cycle(org.id, task_type)
            .await
            .map_err(storage)?
        {
            return Ok(latest);
        }

        let cycle = Cycle::start(task_type, 1);
        if let Err(e) = self.store.create_cycle(org.id, &cycle).await {
            // Lost a concurrent lazy-creation race: the sequence key is
            // unique, so re-read the winner instead of failing
            if let Some(active) = self
                .store
                .active_cycle(org.id, task_type)
                .await
                .map_err(storage)?
            {
                return Ok(active);
            }
            return Err(storage(e));
        }
        info!(tenant = %org.slug, task_type = %task_type, "Started maintenance cycle 1");
        Ok(cycle)
    }

    /// Recompute progress from a snapshot; at 100% the active cycle is
    /// completed exactly once. Returns the cycle completed by this call,
    /// if any — repeat calls after completion are no-ops.
    pub async fn recompute_and_maybe_complete(
        &self,
        tenant: &TenantScope,
        task_type: TaskType,
        snapshot: &MapSnapshot,
    ) -> OpsResult<Option<Cycle>> {
        let org = self.require_org(tenant)?;
        let storage = |e| OpsError::storage(format!("tenant={} cycles", org.slug), e);

        let progress = compute_progress(snapshot, task_type);
        if !progress.is_complete() {
            return Ok(None);
        }

        let Some(mut active) = self
            .store
            .active_cycle(org.id, task_type)
            .await
            .map_err(storage)?
        else {
            return Ok(None);
        };

        let now = Utc::now();
        self.store
            .complete_cycle(org.id, active.id, now)
            .await
            .map_err(storage)?;
        active.complete(now);
        info!(
            tenant = %org.slug,
            task_type = %task_type,
            cycle = active.cycle_number,
            "Maintenance cycle completed at 100%"
        );
        Ok(Some(active))
    }

    /// Administrator reset: force-close the active cycle, start the next
    /// one, and clear every eligible tracker's colors for **both** task
    /// types (full clean-slate semantics). Verifies the cleared state
    /// against the version log and issues one corrective write if needed.
    pub async fn reset(&self, ctx: &RequestContext, task_type: TaskType) -> OpsResult<Cycle> {
        if !ctx.is_admin {
            return Err(OpsError::Forbidden(
                "only administrators can reset a maintenance cycle".to_string(),
            ));
        }
        let org = self.require_org(&ctx.tenant)?.clone();
        let storage = |e| OpsError::storage(format!("tenant={} cycles", org.slug), e);

        let now = Utc::now();
        if let Some(active) = self
            .store
            .active_cycle(org.id, task_type)
            .await
            .map_err(storage)?
        {
            // Explicit reset closes the cycle even below 100%
            self.store
                .complete_cycle(org.id, active.id, now)
                .await
                .map_err(storage)?;
        }

        let next_number = self
            .store
            .latest_cycle_number(org.id, task_type)
            .await
            .map_err(storage)?
            .unwrap_or(0)
            + 1;

        let cycle = Cycle::start_from_reset(task_type, next_number, ctx.user_id);
        self.store
            .create_cycle(org.id, &cycle)
            .await
            .map_err(storage)?;

        self.map
            .mutate(&ctx.tenant, |trackers| {
                for tracker in trackers.iter_mut() {
                    if tracker.is_cycle_eligible() {
                        tracker.clear_colors();
                    }
                }
            })
            .await?;

        if !self.verify_cleared(&org).await? {
            warn!(tenant = %org.slug, "Reset verification found stale colors, forcing corrective write");
            self.map
                .mutate(&ctx.tenant, |trackers| {
                    for tracker in trackers.iter_mut() {
                        if tracker.is_cycle_eligible() {
                            tracker.clear_colors();
                        }
                    }
                })
                .await?;
        }

        info!(
            tenant = %org.slug,
            task_type = %task_type,
            cycle = cycle.cycle_number,
            "Maintenance cycle reset"
        );
        Ok(cycle)
    }

    /// Post-reset check against the authoritative log: every eligible
    /// tracker must be at baseline for both task types.
    async fn verify_cleared(&self, org: &OrgRef) -> OpsResult<bool> {
        let latest = self
            .store
            .latest_map_version(org.id)
            .await
            .map_err(|e| OpsError::storage(format!("tenant={} latest", org.slug), e))?;

        let Some((trackers, _)) = latest else {
            return Ok(true);
        };

        Ok(trackers
            .iter()
            .filter(|t| t.is_cycle_eligible())
            .all(|t| {
                t.grass_cutting_color == color::BASELINE && t.panel_wash_color == color::BASELINE
            }))
    }

    /// Current progress over the hot read path.
    pub async fn current_progress(
        &self,
        tenant: &TenantScope,
        task_type: TaskType,
    ) -> CycleProgress {
        let snapshot = self.map.read(tenant).await;
        compute_progress(&snapshot, task_type)
    }

    /// The active cycle, if one exists.
    pub async fn active(
        &self,
        tenant: &TenantScope,
        task_type: TaskType,
    ) -> OpsResult<Option<Cycle>> {
        let org = self.require_org(tenant)?;
        self.store
            .active_cycle(org.id, task_type)
            .await
            .map_err(|e| OpsError::storage(format!("tenant={} cycles", org.slug), e))
    }

    /// Cycle history, optionally filtered by denormalized year/month.
    pub async fn history(
        &self,
        tenant: &TenantScope,
        task_type: TaskType,
        year: Option<i32>,
        month: Option<u32>,
    ) -> OpsResult<Vec<Cycle>> {
        let org = self.require_org(tenant)?;
        self.store
            .list_cycles(org.id, task_type, year, month)
            .await
            .map_err(|e| OpsError::storage(format!("tenant={} cycles", org.slug), e))
    }

    /// Yearly statistics over persisted cycles.
    pub async fn stats(
        &self,
        tenant: &TenantScope,
        task_type: TaskType,
        year: i32,
    ) -> OpsResult<CycleStats> {
        let cycles = self.history(tenant, task_type, Some(year), None).await?;

        let durations: Vec<f64> = cycles
            .iter()
            .filter_map(|c| {
                c.completed_at
                    .map(|done| (done - c.started_at).num_seconds() as f64 / 86_400.0)
            })
            .collect();
        let average_duration_days = if durations.is_empty() {
            None
        } else {
            Some(durations.iter().sum::<f64>() / durations.len() as f64)
        };

        let mut by_month: BTreeMap<u32, usize> = BTreeMap::new();
        for cycle in cycles.iter().filter(|c| c.completed_at.is_some()) {
            if let Some(month) = cycle.month {
                *by_month.entry(month).or_default() += 1;
            }
        }
        let peak_month = by_month
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(month, _)| *month);

        Ok(CycleStats {
            total_cycles: cycles.len(),
            average_duration_days,
            by_month,
            peak_month,
        })
    }
}
