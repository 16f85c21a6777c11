//! Map Service — single authority for reading and mutating the plant map
//!
//! Dual-store policy: the mirror wins on the hot read path (no fallback to
//! the version log when it misses — the reconciler repairs drift instead),
//! the version log wins inside mutation flows. All fallback logic lives
//! here; no call site re-implements it.
//!
//! The read-modify-write path is serialized per tenant with a named lock;
//! the version log's unique (tenant, version) key turns any remaining race
//! into a storage conflict instead of a silent lost update.

use super::models::{MapSnapshot, Tracker};
use crate::error::{OpsError, OpsResult};
use crate::mirror::MirrorStore;
use crate::store::OpsStore;
use crate::tenant::TenantScope;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Single authority for map document access.
pub struct MapService {
    store: Arc<dyn OpsStore>,
    mirror: Arc<dyn MirrorStore>,
    /// Per-tenant mutation locks, created on first use.
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl MapService {
    pub fn new(store: Arc<dyn OpsStore>, mirror: Arc<dyn MirrorStore>) -> Self {
        Self {
            store,
            mirror,
            locks: DashMap::new(),
        }
    }

    fn tenant_lock(&self, org_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry(org_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// The mirror's copy if present and well-formed. Errors and corrupt
    /// payloads are logged and treated as a miss — this is the one place
    /// mirror fallback semantics are decided.
    async fn mirror_snapshot(&self, slug: &str) -> Option<(Vec<Tracker>, i64)> {
        match self.mirror.get(slug).await {
            Ok(found) => found,
            Err(e) => {
                warn!(tenant = slug, "Map mirror read failed: {:#}", e);
                None
            }
        }
    }

    /// Hot read path: the mirror's copy, or an empty snapshot (version 0).
    ///
    /// Deliberately no fallback to the version log here, even when durable
    /// history exists — the mirror is the presentation source of truth and
    /// the reconciler bounds the drift window.
    pub async fn read(&self, tenant: &TenantScope) -> MapSnapshot {
        let Some(slug) = tenant.mirror_slug() else {
            return MapSnapshot::empty(None);
        };

        match self.mirror_snapshot(slug).await {
            Some((trackers, version)) => MapSnapshot {
                tenant: Some(slug.to_string()),
                version,
                updated_at: Utc::now(),
                trackers,
            },
            None => MapSnapshot::empty(Some(slug.to_string())),
        }
    }

    /// Mutation-time read: mirror first, then the latest version log row,
    /// so a mutation never starts from empty state when history exists.
    pub async fn read_for_mutation(&self, tenant: &TenantScope) -> OpsResult<MapSnapshot> {
        let Some(org) = tenant.as_org() else {
            return Ok(MapSnapshot::empty(None));
        };

        if let Some((trackers, version)) = self.mirror_snapshot(&org.slug).await {
            return Ok(MapSnapshot {
                tenant: Some(org.slug.clone()),
                version,
                updated_at: Utc::now(),
                trackers,
            });
        }

        match self
            .store
            .latest_map_version(org.id)
            .await
            .map_err(|e| OpsError::storage(format!("tenant={} latest", org.slug), e))?
        {
            Some((trackers, version)) => Ok(MapSnapshot {
                tenant: Some(org.slug.clone()),
                version,
                updated_at: Utc::now(),
                trackers,
            }),
            None => Ok(MapSnapshot::empty(Some(org.slug.clone()))),
        }
    }

    /// Persist a new map version: append to the version log (fatal on
    /// failure), then refresh the mirror (logged on failure, never fatal).
    /// Returns the new version. A tenant-less scope is a no-op success.
    pub async fn write(
        &self,
        tenant: &TenantScope,
        trackers: &[Tracker],
        base_version: i64,
    ) -> OpsResult<i64> {
        let Some(org) = tenant.as_org() else {
            debug!("No storage scope for platform actor, skipping map write");
            return Ok(base_version);
        };

        let new_version = base_version + 1;

        self.store
            .append_map_version(org, trackers, new_version)
            .await
            .map_err(|e| {
                OpsError::storage(format!("tenant={} version={}", org.slug, new_version), e)
            })?;

        if let Err(e) = self.mirror.put(&org.slug, trackers, new_version).await {
            warn!(
                tenant = %org.slug,
                version = new_version,
                "Map mirror write failed (snapshot store holds version): {:#}",
                e
            );
        }

        Ok(new_version)
    }

    /// The serialized read-modify-write path every mutation flow goes
    /// through. Holds the tenant lock from read to append.
    pub async fn mutate<F>(&self, tenant: &TenantScope, f: F) -> OpsResult<MapSnapshot>
    where
        F: FnOnce(&mut Vec<Tracker>),
    {
        let _guard = match tenant.as_org() {
            Some(org) => Some(self.tenant_lock(org.id).lock_owned().await),
            None => None,
        };

        let mut snapshot = self.read_for_mutation(tenant).await?;
        f(&mut snapshot.trackers);

        let new_version = self
            .write(tenant, &snapshot.trackers, snapshot.version)
            .await?;
        snapshot.version = new_version;
        snapshot.updated_at = Utc::now();
        Ok(snapshot)
    }
}
