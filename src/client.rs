//! High level client.
//!
//! Wires configuration, the HTTP transport, the polling engine and the
//! observability handlers together behind [`CapMonsterClient`].

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ClientConfig, ConfigError, client_key_from_env};
use crate::modules::events::{EventDispatcher, EventHandler, LoggingHandler, MetricsHandler};
use crate::modules::metrics::MetricsCollector;
use crate::solving::{SolveError, SolveOptions, Solver};
use crate::tasks::Task;
use crate::transport::{ReqwestTransport, SolverTransport, TransportError};

/// Result alias used across the client surface.
pub type CapMonsterResult<T> = Result<T, CapMonsterError>;

/// Error surfaced by [`CapMonsterClient`].
#[derive(Debug, Error)]
pub enum CapMonsterError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("transport initialisation failed: {0}")]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Fluent builder for [`CapMonsterClient`].
pub struct CapMonsterClientBuilder {
    client_key: String,
    config: ClientConfig,
    transport: Option<Arc<dyn SolverTransport>>,
    enable_metrics: bool,
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl CapMonsterClientBuilder {
    pub fn new(client_key: impl Into<String>) -> Self {
        Self {
            client_key: client_key.into(),
            config: ClientConfig::default(),
            transport: None,
            enable_metrics: true,
            handlers: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the reqwest transport. Endpoint and pool settings from the
    /// configuration are not applied to a custom transport.
    pub fn with_transport(mut self, transport: Arc<dyn SolverTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn disable_metrics(mut self) -> Self {
        self.enable_metrics = false;
        self
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn build(self) -> CapMonsterResult<CapMonsterClient> {
        let transport: Arc<dyn SolverTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.client_key, &self.config)?),
        };

        let metrics = self.enable_metrics.then(MetricsCollector::new);

        let mut events = EventDispatcher::new();
        events.register_handler(Arc::new(LoggingHandler));
        if let Some(ref collector) = metrics {
            events.register_handler(Arc::new(MetricsHandler::new(collector.clone())));
        }
        for handler in self.handlers {
            events.register_handler(handler);
        }

        Ok(CapMonsterClient {
            config: self.config,
            solver: Solver::new(transport, Arc::new(events)),
            metrics,
        })
    }
}

/// Client for the CapMonster Cloud API.
///
/// Cheap to clone; clones share one connection pool and one metrics
/// collector, so a single client can drive many concurrent solves.
#[derive(Clone, Debug)]
pub struct CapMonsterClient {
    config: ClientConfig,
    solver: Solver,
    metrics: Option<MetricsCollector>,
}

impl CapMonsterClient {
    /// Client with default configuration.
    pub fn new(client_key: impl Into<String>) -> CapMonsterResult<Self> {
        Self::builder(client_key).build()
    }

    /// Key from `CAPMONSTERCLOUD_CLIENTKEY`, base URL from
    /// `CAPMONSTERCLOUD_BASE_URL` when set.
    pub fn from_env() -> CapMonsterResult<Self> {
        let client_key = client_key_from_env()?;
        let config = ClientConfig::from_env()?;
        Self::builder(client_key).with_config(config).build()
    }

    pub fn builder(client_key: impl Into<String>) -> CapMonsterClientBuilder {
        CapMonsterClientBuilder::new(client_key)
    }

    /// Solve `task` with default options.
    pub async fn solve<T: Task>(&self, task: &T) -> CapMonsterResult<T::Solution> {
        self.solve_with(task, &SolveOptions::default()).await
    }

    pub async fn solve_with<T: Task>(
        &self,
        task: &T,
        options: &SolveOptions,
    ) -> CapMonsterResult<T::Solution> {
        Ok(self.solver.solve(task, options).await?)
    }

    pub async fn get_balance(&self) -> CapMonsterResult<f64> {
        Ok(self.solver.get_balance().await?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Metrics collected so far, unless disabled on the builder.
    pub fn metrics(&self) -> Option<&MetricsCollector> {
        self.metrics.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_client_builds_with_metrics() {
        let client = CapMonsterClient::new("0123456789abcdef").unwrap();
        assert!(client.metrics().is_some());
        assert_eq!(client.config().soft_id, Some(58));
    }

    #[test]
    fn metrics_can_be_disabled() {
        let client = CapMonsterClient::builder("key")
            .disable_metrics()
            .build()
            .unwrap();
        assert!(client.metrics().is_none());
    }
}
