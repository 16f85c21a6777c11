//! `MirrorStore` trait definition
//!
//! The mirror is the read-optimized copy of the latest map snapshot, one
//! document per tenant slug, independent of the relational scope used by
//! the system of record. Best-effort: callers treat failures as a miss.

use crate::map::models::Tracker;
use anyhow::Result;
use async_trait::async_trait;

/// Abstract interface for the per-tenant snapshot mirror.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    /// Connectivity probe for the health endpoint.
    async fn health_check(&self) -> Result<bool>;

    /// The mirrored snapshot for a tenant slug, if one exists and parses.
    async fn get(&self, slug: &str) -> Result<Option<(Vec<Tracker>, i64)>>;

    /// Overwrite the mirrored snapshot for a tenant slug.
    async fn put(&self, slug: &str, trackers: &[Tracker], version: i64) -> Result<()>;
}
