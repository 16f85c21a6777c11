//! PlantOps
//!
//! A maintenance-operations server for solar plants:
//! - Plant-map tracker approvals (worker proposals, admin decisions)
//! - Maintenance-cycle tracking derived from the map's color state
//! - Neo4j system of record with a Meilisearch fast-read mirror
//! - Notification fan-out to tenant administrators

pub mod api;
pub mod cycle;
pub mod error;
pub mod map;
pub mod mirror;
pub mod notify;
pub mod store;
pub mod tenant;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    pub meilisearch: MeilisearchYamlConfig,
    pub notify: NotifyYamlConfig,
    pub mirror: MirrorYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
    pub public_url: Option<String>,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            public_url: None,
        }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "plantops123".into(),
        }
    }
}

/// Meilisearch configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeilisearchYamlConfig {
    pub url: String,
    pub key: String,
}

impl Default for MeilisearchYamlConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:7700".into(),
            key: "plantops-meili-key-change-me".into(),
        }
    }
}

/// Notification configuration section
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NotifyYamlConfig {
    /// Outbound webhook endpoint for notification delivery. None disables
    /// the outbound sink; in-app notifications are always persisted.
    pub webhook_url: Option<String>,
}

/// Mirror maintenance configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorYamlConfig {
    /// Background mirror-reconcile period in seconds. 0 disables the loop.
    pub reconcile_secs: u64,
}

impl Default for MirrorYamlConfig {
    fn default() -> Self {
        Self {
            reconcile_secs: 300,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub meilisearch_url: String,
    pub meilisearch_key: String,
    pub server_port: u16,
    pub public_url: Option<String>,
    pub notify_webhook_url: Option<String>,
    pub mirror_reconcile_secs: u64,
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with
    /// env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file
    /// doesn't exist, falls back to pure env vars / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            meilisearch_url: std::env::var("MEILISEARCH_URL").unwrap_or(yaml.meilisearch.url),
            meilisearch_key: std::env::var("MEILISEARCH_KEY").unwrap_or(yaml.meilisearch.key),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.port),
            public_url: std::env::var("PUBLIC_URL").ok().or(yaml.server.public_url),
            notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL")
                .ok()
                .or(yaml.notify.webhook_url),
            mirror_reconcile_secs: std::env::var("MIRROR_RECONCILE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.mirror.reconcile_secs),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any
    /// failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn store::OpsStore>,
    pub mirror: Arc<dyn mirror::MirrorStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state with both stores connected
    pub async fn new(config: Config) -> Result<Self> {
        let store = Arc::new(
            store::Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
            )
            .await?,
        );

        let mirror = Arc::new(
            mirror::MeiliClient::new(&config.meilisearch_url, &config.meilisearch_key).await?,
        );

        Ok(Self {
            store,
            mirror,
            config: Arc::new(config),
        })
    }
}

/// Start the HTTP server, including the background mirror reconciler.
pub async fn start_server(config: Config) -> Result<()> {
    let state = AppState::new(config).await?;
    tracing::info!("Connected to Neo4j and Meilisearch");

    let map = Arc::new(map::MapService::new(
        state.store.clone(),
        state.mirror.clone(),
    ));
    let cycles = Arc::new(cycle::CycleTracker::new(state.store.clone(), map.clone()));

    let mut workflow =
        workflow::RequestWorkflow::new(state.store.clone(), map.clone(), cycles.clone());
    if let Some(url) = &state.config.notify_webhook_url {
        workflow = workflow.with_sink(Arc::new(notify::WebhookSink::new(url)));
        tracing::info!(url = %url, "Outbound notification webhook enabled");
    }

    if state.config.mirror_reconcile_secs > 0 {
        let reconciler = Arc::new(map::MirrorReconciler::new(
            state.store.clone(),
            state.mirror.clone(),
        ));
        reconciler.spawn_periodic(Duration::from_secs(state.config.mirror_reconcile_secs));
        tracing::info!(
            period_secs = state.config.mirror_reconcile_secs,
            "Mirror reconciler started"
        );
    }

    let server_state = Arc::new(api::ServerState {
        store: state.store.clone(),
        mirror: state.mirror.clone(),
        map,
        cycles,
        workflow: Arc::new(workflow),
        config: state.config.clone(),
    });

    let router = api::create_router(server_state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], state.config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("PlantOps listening on {}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
server:
  port: 9090
  public_url: https://ops.plant.example

neo4j:
  uri: bolt://db:7687
  user: admin
  password: secret

meilisearch:
  url: http://search:7700
  key: test-key

notify:
  webhook_url: https://hooks.plant.example/notify

mirror:
  reconcile_secs: 60
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.server.public_url.as_deref(),
            Some("https://ops.plant.example")
        );
        assert_eq!(config.neo4j.uri, "bolt://db:7687");
        assert_eq!(config.meilisearch.key, "test-key");
        assert_eq!(
            config.notify.webhook_url.as_deref(),
            Some("https://hooks.plant.example/notify")
        );
        assert_eq!(config.mirror.reconcile_secs, 60);
    }

    #[test]
    fn test_yaml_defaults() {
        let config = YamlConfig::default();
        assert_eq!(config.server.port, 8080);
        assert!(config.server.public_url.is_none());
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(config.neo4j.user, "neo4j");
        assert_eq!(config.meilisearch.url, "http://localhost:7700");
        assert!(config.notify.webhook_url.is_none());
        assert_eq!(config.mirror.reconcile_secs, 300);
    }

    /// Combined test for YAML file loading, env var overrides, and missing
    /// file fallback. Runs as a single test to avoid parallel env var race
    /// conditions.
    #[test]
    fn test_yaml_and_env_lifecycle() {
        fn clear_env() {
            for var in &[
                "NEO4J_URI",
                "NEO4J_USER",
                "NEO4J_PASSWORD",
                "MEILISEARCH_URL",
                "MEILISEARCH_KEY",
                "SERVER_PORT",
                "PUBLIC_URL",
                "NOTIFY_WEBHOOK_URL",
                "MIRROR_RECONCILE_SECS",
            ] {
                std::env::remove_var(var);
            }
        }

        // --- Phase 1: YAML values loaded correctly ---
        let yaml = r#"
server:
  port: 9999
neo4j:
  uri: bolt://yaml-host:7687
  user: yaml-user
  password: yaml-pass
meilisearch:
  url: http://yaml-search:7700
  key: yaml-key
"#;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        clear_env();

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.server_port, 9999);
        assert_eq!(config.neo4j_uri, "bolt://yaml-host:7687");
        assert_eq!(config.neo4j_user, "yaml-user");
        assert_eq!(config.meilisearch_key, "yaml-key");
        assert!(config.notify_webhook_url.is_none());
        assert_eq!(config.mirror_reconcile_secs, 300);

        // --- Phase 2: Env vars override YAML ---
        std::env::set_var("NEO4J_URI", "bolt://env-host:7687");
        std::env::set_var("SERVER_PORT", "7777");
        std::env::set_var("NOTIFY_WEBHOOK_URL", "https://hooks.env.example/n");

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.neo4j_uri, "bolt://env-host:7687");
        assert_eq!(config.server_port, 7777);
        assert_eq!(
            config.notify_webhook_url.as_deref(),
            Some("https://hooks.env.example/n")
        );
        // YAML value still used where no env override
        assert_eq!(config.neo4j_user, "yaml-user");

        clear_env();

        // --- Phase 3: No YAML file → defaults ---
        let nonexistent = Path::new("/tmp/nonexistent-config-12345.yaml");
        let config = Config::from_yaml_and_env(Some(nonexistent)).unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.neo4j_uri, "bolt://localhost:7687");
        assert!(config.public_url.is_none());
    }
}
