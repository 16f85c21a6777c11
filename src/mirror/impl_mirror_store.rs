//! `MirrorStore` implementation for `MeiliClient`.

use async_trait::async_trait;

use super::client::MeiliClient;
use super::traits::MirrorStore;
use crate::map::models::Tracker;

#[async_trait]
impl MirrorStore for MeiliClient {
    async fn health_check(&self) -> anyhow::Result<bool> {
        self.health_check().await
    }

    async fn get(&self, slug: &str) -> anyhow::Result<Option<(Vec<Tracker>, i64)>> {
        self.get_snapshot(slug).await
    }

    async fn put(&self, slug: &str, trackers: &[Tracker], version: i64) -> anyhow::Result<()> {
        self.put_snapshot(slug, trackers, version).await
    }
}
