//! Test helper factories and mock state builders
//!
//! Convenience constructors for mock-backed managers and test data with
//! sensible defaults, plus the end-to-end maintenance-cycle scenario.
#![allow(dead_code)]

use crate::cycle::CycleTracker;
use crate::map::models::{StatusType, TaskType, Tracker};
use crate::map::MapService;
use crate::mirror::mock::MockMirrorStore;
use crate::store::mock::MockOpsStore;
use crate::tenant::{RequestContext, TenantScope};
use crate::workflow::models::SubmitStatusRequest;
use crate::workflow::RequestWorkflow;
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// Mock state builders
// ============================================================================

/// All managers wired to shared in-memory mock backends.
pub struct TestHarness {
    pub store: Arc<MockOpsStore>,
    pub mirror: Arc<MockMirrorStore>,
    pub map: Arc<MapService>,
    pub cycles: Arc<CycleTracker>,
    pub workflow: Arc<RequestWorkflow>,
}

/// Create a harness with empty in-memory backends
pub fn mock_harness() -> TestHarness {
    let store = Arc::new(MockOpsStore::new());
    let mirror = Arc::new(MockMirrorStore::new());
    let map = Arc::new(MapService::new(store.clone(), mirror.clone()));
    let cycles = Arc::new(CycleTracker::new(store.clone(), map.clone()));
    let workflow = Arc::new(RequestWorkflow::new(
        store.clone(),
        map.clone(),
        cycles.clone(),
    ));
    TestHarness {
        store,
        mirror,
        map,
        cycles,
        workflow,
    }
}

// ============================================================================
// Test data factories
// ============================================================================

/// An organization scope with a fresh id and a fixed slug
pub fn test_org_scope() -> TenantScope {
    TenantScope::org(Uuid::new_v4(), "alpha-plant")
}

/// A non-admin context in the given scope
pub fn worker_ctx(tenant: &TenantScope) -> RequestContext {
    RequestContext::worker(Uuid::new_v4(), tenant.clone())
}

/// An administrator context in the given scope
pub fn admin_ctx(tenant: &TenantScope) -> RequestContext {
    RequestContext::admin(Uuid::new_v4(), tenant.clone())
}

/// A baseline tracker with the given id
pub fn test_tracker(id: &str) -> Tracker {
    Tracker::new(id)
}

/// `n` baseline cycle-eligible trackers: TR-01 .. TR-nn
pub fn eligible_trackers(n: usize) -> Vec<Tracker> {
    (1..=n)
        .map(|i| Tracker::new(format!("TR-{:02}", i)))
        .collect()
}

/// Seed the map for a tenant at version 1
pub async fn seed_map(harness: &TestHarness, tenant: &TenantScope, trackers: Vec<Tracker>) {
    harness
        .map
        .write(tenant, &trackers, 0)
        .await
        .expect("seed map write");
}

/// A submission payload
pub fn submit_input(ids: &[&str], task_type: TaskType, status_type: StatusType) -> SubmitStatusRequest {
    SubmitStatusRequest {
        tracker_ids: ids.iter().map(|s| s.to_string()).collect(),
        task_type,
        status_type,
        message: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::models::color;
    use crate::workflow::models::DecisionAction;

    #[tokio::test]
    async fn test_mock_harness_creation() {
        let harness = mock_harness();
        let tenant = test_org_scope();
        let snapshot = harness.map.read(&tenant).await;
        assert_eq!(snapshot.version, 0);
    }

    /// The full maintenance-cycle lifecycle over four eligible trackers:
    /// 50% → 75% → 100% (cycle completes) → reset (clean slate, cycle 2).
    #[tokio::test]
    async fn test_four_tracker_cycle_lifecycle() {
        let h = mock_harness();
        let tenant = test_org_scope();
        let worker = worker_ctx(&tenant);
        let admin = admin_ctx(&tenant);
        seed_map(&h, &tenant, eligible_trackers(4)).await;

        let task = TaskType::GrassCutting;

        // Stage 1: two trackers done → 50%, cycle 1 starts
        let request = h
            .workflow
            .submit(&worker, submit_input(&["TR-01", "TR-02"], task, StatusType::Done))
            .await
            .unwrap();
        h.workflow
            .decide(&admin, request.id, DecisionAction::Approve, None)
            .await
            .unwrap();

        let progress = h.cycles.current_progress(&tenant, task).await;
        assert_eq!(progress.progress, 50.0);
        let cycle = h.cycles.active(&tenant, task).await.unwrap().unwrap();
        assert_eq!(cycle.cycle_number, 1);

        // Stage 2: remaining two halfway → 75% ((2 + 2*0.5) / 4 * 100)
        let request = h
            .workflow
            .submit(
                &worker,
                submit_input(&["TR-03", "TR-04"], task, StatusType::Halfway),
            )
            .await
            .unwrap();
        h.workflow
            .decide(&admin, request.id, DecisionAction::Approve, None)
            .await
            .unwrap();

        let progress = h.cycles.current_progress(&tenant, task).await;
        assert_eq!(progress.progress, 75.0);
        assert!(h.cycles.active(&tenant, task).await.unwrap().is_some());

        // Stage 3: remaining two done → 100%, cycle 1 completes
        let request = h
            .workflow
            .submit(&worker, submit_input(&["TR-03", "TR-04"], task, StatusType::Done))
            .await
            .unwrap();
        h.workflow
            .decide(&admin, request.id, DecisionAction::Approve, None)
            .await
            .unwrap();

        let progress = h.cycles.current_progress(&tenant, task).await;
        assert_eq!(progress.progress, 100.0);
        assert!(h.cycles.active(&tenant, task).await.unwrap().is_none());
        let history = h.cycles.history(&tenant, task, None, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].completed_at.is_some());

        // Stage 4: reset → cycle 2, every tracker baseline on both fields
        let new_cycle = h.cycles.reset(&admin, task).await.unwrap();
        assert_eq!(new_cycle.cycle_number, 2);

        let snapshot = h.map.read(&tenant).await;
        assert_eq!(snapshot.trackers.len(), 4);
        for tracker in &snapshot.trackers {
            assert_eq!(tracker.grass_cutting_color, color::BASELINE);
            assert_eq!(tracker.panel_wash_color, color::BASELINE);
        }
        let progress = h.cycles.current_progress(&tenant, task).await;
        assert_eq!(progress.progress, 0.0);
    }

    /// Approvals for one task type never disturb the other's colors or
    /// cycle.
    #[tokio::test]
    async fn test_task_types_are_independent_until_reset() {
        let h = mock_harness();
        let tenant = test_org_scope();
        let worker = worker_ctx(&tenant);
        let admin = admin_ctx(&tenant);
        seed_map(&h, &tenant, eligible_trackers(2)).await;

        let request = h
            .workflow
            .submit(
                &worker,
                submit_input(&["TR-01", "TR-02"], TaskType::PanelWash, StatusType::Done),
            )
            .await
            .unwrap();
        h.workflow
            .decide(&admin, request.id, DecisionAction::Approve, None)
            .await
            .unwrap();

        assert_eq!(
            h.cycles
                .current_progress(&tenant, TaskType::PanelWash)
                .await
                .progress,
            100.0
        );
        assert_eq!(
            h.cycles
                .current_progress(&tenant, TaskType::GrassCutting)
                .await
                .progress,
            0.0
        );
        // Only the panel-wash cycle exists
        assert!(h
            .cycles
            .active(&tenant, TaskType::GrassCutting)
            .await
            .unwrap()
            .is_none());

        // A reset scoped to grass cutting still clears panel-wash colors
        h.cycles.reset(&admin, TaskType::GrassCutting).await.unwrap();
        assert_eq!(
            h.cycles
                .current_progress(&tenant, TaskType::PanelWash)
                .await
                .progress,
            0.0
        );
    }
}
