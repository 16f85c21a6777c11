//! Meilisearch client for the map snapshot mirror
//!
//! One document per tenant slug in the `map_mirror` index. The document id
//! is the slug itself, which keeps reads a single primary-key lookup.

use crate::map::models::Tracker;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use meilisearch_sdk::client::Client;
use meilisearch_sdk::errors::{Error as MeiliError, ErrorCode};
use serde::{Deserialize, Serialize};

/// Index holding one mirrored snapshot per tenant.
pub const MAP_MIRROR_INDEX: &str = "map_mirror";

/// The mirrored snapshot document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapMirrorDocument {
    /// Tenant slug — doubles as the document primary key.
    pub id: String,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
    pub trackers: Vec<Tracker>,
}

/// Client for mirror operations
pub struct MeiliClient {
    client: Client,
}

impl MeiliClient {
    /// Create a new Meilisearch client
    pub async fn new(url: &str, api_key: &str) -> Result<Self> {
        let client =
            Client::new(url, Some(api_key)).context("Failed to create Meilisearch client")?;

        let meili = Self { client };
        meili.init_indexes().await?;

        Ok(meili)
    }

    /// Initialize the mirror index
    async fn init_indexes(&self) -> Result<()> {
        let task = self
            .client
            .create_index(MAP_MIRROR_INDEX, Some("id"))
            .await
            .context(format!("Failed to create index {}", MAP_MIRROR_INDEX))?;
        task.wait_for_completion(&self.client, None, None).await?;
        Ok(())
    }

    /// Connectivity probe
    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.client.health().await.is_ok())
    }

    /// The mirrored snapshot for a tenant slug, if present
    pub async fn get_snapshot(&self, slug: &str) -> Result<Option<(Vec<Tracker>, i64)>> {
        let index = self.client.index(MAP_MIRROR_INDEX);
        match index.get_document::<MapMirrorDocument>(slug).await {
            Ok(doc) => Ok(Some((doc.trackers, doc.version))),
            Err(MeiliError::Meilisearch(e)) if e.error_code == ErrorCode::DocumentNotFound => {
                Ok(None)
            }
            Err(e) => Err(e).context(format!("Failed to read map mirror for {}", slug)),
        }
    }

    /// Overwrite the mirrored snapshot for a tenant slug
    pub async fn put_snapshot(&self, slug: &str, trackers: &[Tracker], version: i64) -> Result<()> {
        let doc = MapMirrorDocument {
            id: slug.to_string(),
            version,
            updated_at: Utc::now(),
            trackers: trackers.to_vec(),
        };

        let index = self.client.index(MAP_MIRROR_INDEX);
        let task = index
            .add_documents(&[doc], Some("id"))
            .await
            .context(format!("Failed to write map mirror for {}", slug))?;
        task.wait_for_completion(&self.client, None, None).await?;
        Ok(())
    }
}
