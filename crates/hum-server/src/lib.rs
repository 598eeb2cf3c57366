//! Hum server: configuration and the top-level HTTP router.
//!
//! The binary in `main.rs` wires these together with a [`SqliteStore`]; the
//! pieces live here so they can be exercised without a socket.
//!
//! [`SqliteStore`]: hum_store_sqlite::SqliteStore

pub mod seed;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::Router;
use hum_core::store::CommunityStore;
use hum_store_sqlite::StoreOptions;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered with
/// `HUM_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// How long a connection waits on a locked database, in milliseconds.
  pub busy_timeout_ms: u64,
  /// Extra attempts for a vote that keeps finding the database locked.
  pub vote_retries:    u32,
  /// Insert example posts and articles into empty feeds at startup.
  pub seed_examples:   bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_string(),
      port:            8080,
      store_path:      PathBuf::from("hum.db"),
      busy_timeout_ms: 5_000,
      vote_retries:    3,
      seed_examples:   false,
    }
  }
}

impl ServerConfig {
  /// Read `path` (optional) and `HUM_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("HUM"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn store_options(&self) -> StoreOptions {
    StoreOptions {
      busy_timeout: Duration::from_millis(self.busy_timeout_ms),
      vote_retries: self.vote_retries,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server's [`Router`]: the JSON API under `/api`, with request
/// tracing.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: CommunityStore + 'static,
{
  Router::new()
    .nest("/api", hum_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use hum_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  #[test]
  fn missing_config_file_yields_defaults() {
    let path = std::env::temp_dir().join("hum-no-such-config.toml");
    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.store_path, PathBuf::from("hum.db"));
    assert_eq!(cfg.vote_retries, 3);
    assert!(!cfg.seed_examples);
  }

  #[test]
  fn config_file_overrides_defaults() {
    let path = std::env::temp_dir().join(format!("hum-config-{}.toml", std::process::id()));
    std::fs::write(&path, "port = 9999\nvote_retries = 7\nseed_examples = true\n").unwrap();
    let cfg = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.port, 9999);
    assert_eq!(cfg.host, "127.0.0.1");
    assert!(cfg.seed_examples);
    assert_eq!(cfg.store_options().vote_retries, 7);
    assert_eq!(cfg.store_options().busy_timeout, Duration::from_secs(5));
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    seed::seed_examples(store.as_ref()).await.unwrap();

    let req = Request::builder()
      .uri("/api/articles?sort=oldest")
      .body(Body::empty())
      .unwrap();
    let resp = router(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let list: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(list.as_array().unwrap().len(), seed::EXAMPLE_ARTICLES.len());
  }
}
