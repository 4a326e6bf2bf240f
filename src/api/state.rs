//! Application state - Dependency injection container.
//!
//! Holds the service container, the server-wide shutdown token every
//! request scope is derived from, and the metrics handle.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::services::{AccountService, ServiceContainer, Services};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Service container
    pub services: Arc<dyn ServiceContainer>,
    /// Fires when the server begins shutting down
    pub shutdown: CancellationToken,
    /// Installed Prometheus recorder, if any
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create application state with an injected service container.
    pub fn new(services: Arc<dyn ServiceContainer>, shutdown: CancellationToken) -> Self {
        Self {
            services,
            shutdown,
            metrics: None,
        }
    }

    /// Expose the given recorder on `GET /metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Create application state backed by the database.
    pub fn from_config(database: Arc<Database>, config: &Config, shutdown: CancellationToken) -> Self {
        Self::new(Arc::new(Services::from_config(database, config)), shutdown)
    }

    /// Open an account service scoped to one request.
    ///
    /// The scope is cancelled with the server, never the other way around.
    pub async fn accounts(&self) -> AppResult<Arc<dyn AccountService>> {
        self.services.accounts(self.shutdown.child_token()).await
    }
}
