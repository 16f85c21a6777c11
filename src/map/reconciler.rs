//! Mirror reconciliation — repairs drift between the version log and the
//! per-tenant mirror
//!
//! Mirror writes are best-effort, so a mirror outage can leave a tenant
//! serving a stale (or empty) map on the hot read path. The reconciler
//! walks every tenant with durable history and rewrites the mirror wherever
//! its version differs from the latest version log row.

use crate::mirror::MirrorStore;
use crate::store::OpsStore;
use crate::tenant::OrgRef;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Outcome of one reconciliation sweep.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReconcileReport {
    pub tenants: usize,
    pub repaired: usize,
    pub failed: usize,
}

pub struct MirrorReconciler {
    store: Arc<dyn OpsStore>,
    mirror: Arc<dyn MirrorStore>,
}

impl MirrorReconciler {
    pub fn new(store: Arc<dyn OpsStore>, mirror: Arc<dyn MirrorStore>) -> Self {
        Self { store, mirror }
    }

    /// Reconcile one tenant. Returns whether the mirror was rewritten.
    pub async fn reconcile_tenant(&self, org: &OrgRef) -> Result<bool> {
        let Some((trackers, version)) = self.store.latest_map_version(org.id).await? else {
            return Ok(false);
        };

        let mirrored_version = match self.mirror.get(&org.slug).await {
            Ok(Some((_, v))) => Some(v),
            Ok(None) => None,
            Err(e) => {
                warn!(tenant = %org.slug, "Mirror read failed during reconcile: {:#}", e);
                None
            }
        };

        if mirrored_version == Some(version) {
            return Ok(false);
        }

        self.mirror.put(&org.slug, &trackers, version).await?;
        info!(
            tenant = %org.slug,
            from = ?mirrored_version,
            to = version,
            "Repaired map mirror drift"
        );
        Ok(true)
    }

    /// Sweep every tenant with durable map history.
    pub async fn reconcile_all(&self) -> Result<ReconcileReport> {
        let tenants = self.store.list_map_tenants().await?;
        let mut report = ReconcileReport {
            tenants: tenants.len(),
            ..Default::default()
        };

        for org in &tenants {
            match self.reconcile_tenant(org).await {
                Ok(true) => report.repaired += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    warn!(tenant = %org.slug, "Mirror reconcile failed: {:#}", e);
                }
            }
        }

        debug!(
            tenants = report.tenants,
            repaired = report.repaired,
            failed = report.failed,
            "Mirror reconcile sweep finished"
        );
        Ok(report)
    }

    /// Spawn a periodic reconcile loop.
    pub fn spawn_periodic(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick fires immediately; skip it so startup isn't
            // serialized behind a full sweep
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = self.reconcile_all().await {
                    warn!("Mirror reconcile sweep failed: {:#}", e);
                }
            }
        })
    }
}
