//! # Polity Server
//!
//! Async serving edge over the effectiveness engine.
//!
//! Reads JSON-lines requests, drives a shared
//! [`UnifiedStateManager`](polity_core::manager::UnifiedStateManager) and
//! persists every accepted mutation in order on a background worker.
//! The engine itself stays synchronous and IO-free.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod persist;
pub mod protocol;
pub mod service;
pub mod store;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

use polity_core::config::EngineConfig;
use polity_core::manager::UnifiedStateManager;
use polity_core::registry::ComponentRegistry;

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::service::PolityService;
use crate::store::{FileStore, InMemoryStore, SelectionStore};

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        ServerError::Config(format!("cannot read '{}': {e}", path.display()))
    })
}

/// Build the manager described by a server configuration.
///
/// # Errors
///
/// Returns an error if a configured file cannot be read or is invalid.
pub async fn build_manager(config: &ServerConfig) -> Result<UnifiedStateManager> {
    let registry = match &config.catalog_path {
        Some(path) => {
            let contents = read_text(path).await?;
            Arc::new(ComponentRegistry::from_ron_str(
                &contents,
                &path.display().to_string(),
            )?)
        }
        None => ComponentRegistry::builtin()?,
    };

    let engine_config = match &config.engine_config_path {
        Some(path) => {
            let contents = read_text(path).await?;
            EngineConfig::from_ron_str(&contents, &path.display().to_string())?
        }
        None => EngineConfig::default(),
    };

    tracing::info!(
        components = registry.len(),
        rules = registry.rule_count(),
        "Loaded component catalog"
    );
    Ok(UnifiedStateManager::new(registry, engine_config)?)
}

/// Open the store described by a server configuration.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created.
pub async fn open_store(config: &ServerConfig) -> Result<Arc<dyn SelectionStore>> {
    let store: Arc<dyn SelectionStore> = match &config.data_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), format = ?config.record_format, "Using file store");
            Arc::new(FileStore::open(dir.clone(), config.record_format).await?)
        }
        None => {
            tracing::info!("No data directory configured, records kept in memory");
            Arc::new(InMemoryStore::new())
        }
    };
    Ok(store)
}

/// Serve JSON-lines requests until the reader is exhausted.
///
/// Blank lines are skipped. Every other line gets exactly one response
/// line, including lines that fail to parse.
///
/// # Errors
///
/// Returns [`ServerError::Io`] if reading or writing fails.
pub async fn serve<R, W>(service: &PolityService, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = service.handle_line(line).await;
        writer.write_all(response.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    tracing::info!("Input closed, stopping");
    Ok(())
}

/// Log the service counters every `interval_secs`.
///
/// Returns `None` when the interval is zero.
pub fn spawn_stats_logger(service: &PolityService, interval_secs: u64) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        return None;
    }
    let stats = Arc::clone(service.stats());
    let manager = Arc::clone(service.manager());
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let snapshot = stats.snapshot();
            tracing::info!(
                countries = manager.countries().len(),
                requests = snapshot.requests,
                rejected = snapshot.rejected,
                persisted = snapshot.persisted,
                persist_failures = snapshot.persist_failures,
                "Service stats"
            );
        }
    }))
}
