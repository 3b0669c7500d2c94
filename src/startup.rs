//! Application startup and bootstrap logic.
//!
//! Extracted from `main.rs` so it can run under `cargo test --lib` with the
//! in-memory store backend.

use std::sync::Arc;

use axum::Router;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{Result, RolodexError};
use crate::server::routes::build_router;
use crate::server::AppState;
use crate::store::PersonStore;

/// Resolve the configuration file path.
///
/// Priority:
/// 1. `ROLODEX_CONFIG` environment variable
/// 2. `./rolodex.toml` if it exists
/// 3. None (use defaults)
pub fn resolve_config_path() -> Option<String> {
    std::env::var("ROLODEX_CONFIG").ok().or_else(|| {
        let default = "rolodex.toml";
        std::path::Path::new(default)
            .exists()
            .then(|| default.to_string())
    })
}

/// Initialize tracing subscriber from logging config.
///
/// Supports JSON and plain text formats. Uses `RUST_LOG` env var if set,
/// otherwise falls back to `config.logging.level`.
pub fn init_logging(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

/// Ensure the person search index exists: list the store's index names and
/// create the declared schema's index when absent. Idempotent; runs once
/// before the listener binds. Any failure aborts startup.
pub async fn ensure_index(store: &PersonStore) -> Result<()> {
    let names = store
        .list_index_names()
        .await
        .map_err(|e| RolodexError::IndexBootstrap(format!("listing indexes failed: {e}")))?;

    if names.iter().any(|n| n == store.index_name()) {
        tracing::info!(index = %store.index_name(), "search index already exists");
        return Ok(());
    }

    store
        .create_index()
        .await
        .map_err(|e| RolodexError::IndexBootstrap(format!("index creation failed: {e}")))?;
    tracing::info!(index = %store.index_name(), "search index created");
    Ok(())
}

/// Build the application router: connect the store, run the index
/// bootstrap, and wire up the HTTP surface.
pub async fn build_app(config: Config) -> Result<Router> {
    tracing::info!("rolodex starting");
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        backend = %config.store.backend,
        index = %config.store.index_name,
        key_prefix = %config.store.key_prefix,
        max_results = config.server.max_results,
        "configuration loaded"
    );

    let store = PersonStore::connect(&config.store).await?;
    ensure_index(&store).await?;

    let state = AppState {
        store,
        config: Arc::new(config),
    };
    Ok(build_router(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> Config {
        let mut config = Config::default();
        config.store.backend = "memory".into();
        config
    }

    #[test]
    fn test_resolve_config_path_from_env() {
        let original = std::env::var("ROLODEX_CONFIG").ok();

        std::env::set_var("ROLODEX_CONFIG", "foo.toml");
        let path = resolve_config_path();

        match original {
            Some(v) => std::env::set_var("ROLODEX_CONFIG", v),
            None => std::env::remove_var("ROLODEX_CONFIG"),
        }

        assert_eq!(path, Some("foo.toml".to_string()));
    }

    #[tokio::test]
    async fn test_ensure_index_creates_then_skips() {
        let store = PersonStore::in_memory();
        assert!(store.list_index_names().await.unwrap().is_empty());

        ensure_index(&store).await.unwrap();
        assert_eq!(
            store.list_index_names().await.unwrap(),
            vec!["person-idx".to_string()]
        );

        // second run sees the existing index and does not recreate it
        ensure_index(&store).await.unwrap();
        assert_eq!(store.list_index_names().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_build_app_memory_backend() {
        let router = build_app(memory_config()).await;
        assert!(router.is_ok());
    }

    #[tokio::test]
    async fn test_build_app_rejects_bad_backend() {
        let mut config = memory_config();
        config.store.backend = "postgres".into();
        let err = build_app(config).await.unwrap_err();
        assert!(err.to_string().contains("postgres"));
    }
}
