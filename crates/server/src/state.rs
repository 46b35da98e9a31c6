//! Application State
//!
//! Shared state across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use std::sync::Arc;

use order_engine_agent::OrderEngine;
use order_engine_config::{CatalogConfig, Settings};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Settings as loaded at startup; read by handlers that need limits or paths
    pub config: Arc<RwLock<Settings>>,
    pub engine: Arc<OrderEngine>,
    /// Absent when metrics are disabled or no recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Settings, engine: Arc<OrderEngine>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            engine,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }

    /// Re-read the catalog file and swap it into the engine
    ///
    /// In-flight turns finish against the catalog they started with.
    pub fn reload_catalog(&self) -> Result<usize, ServerError> {
        let path = self.config.read().domain.catalog_path.clone();
        let catalog = CatalogConfig::load_or_builtin(path.as_deref())
            .and_then(CatalogConfig::into_index)
            .map_err(|e| ServerError::InvalidRequest(format!("Failed to reload catalog: {}", e)))?;

        let items = catalog.len();
        self.engine.replace_catalog(catalog);
        Ok(items)
    }
}
