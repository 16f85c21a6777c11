//! In-memory mock implementation of MirrorStore for testing.
//!
//! Conditionally compiled with `#[cfg(test)]`. Failure toggles simulate a
//! mirror outage on either path.

use super::traits::MirrorStore;
use crate::map::models::Tracker;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// In-memory mock implementation of MirrorStore for testing.
#[derive(Default)]
pub struct MockMirrorStore {
    /// slug -> (trackers, version)
    pub docs: RwLock<HashMap<String, (Vec<Tracker>, i64)>>,
    pub fail_gets: AtomicBool,
    pub fail_puts: AtomicBool,
}

impl MockMirrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MirrorStore for MockMirrorStore {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn get(&self, slug: &str) -> Result<Option<(Vec<Tracker>, i64)>> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated mirror outage"));
        }
        let docs = self.docs.read().await;
        Ok(docs.get(slug).cloned())
    }

    async fn put(&self, slug: &str, trackers: &[Tracker], version: i64) -> Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated mirror outage"));
        }
        let mut docs = self.docs.write().await;
        docs.insert(slug.to_string(), (trackers.to_vec(), version));
        Ok(())
    }
}
