use std::future::Future;
use std::sync::Arc;

use super::sample::lifecycle_event;
use super::sampler::HealthSampler;
use super::shutdown::{RunState, ShutdownController};
use super::status::{MonitorPhase, StatusBoard};
use crate::config::{ConfigError, MonitorConfig};
use crate::services::chain::{ChainClient, ChainError};
use crate::services::events::{EventSink, Severity};
use crate::services::metrics::WitnessMetricsCollector;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Chain client failure: {0}")]
    Chain(#[from] ChainError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level orchestrator: one supervised run of the health sampler
pub struct Monitor {
    config: Arc<MonitorConfig>,
    sink: Arc<dyn EventSink>,
    shutdown: ShutdownController,
    status: StatusBoard,
    metrics: Option<Arc<WitnessMetricsCollector>>,
}

impl Monitor {
    /// Fails fast on an invalid config, before anything is emitted
    pub fn new(config: MonitorConfig, sink: Arc<dyn EventSink>) -> Result<Self, MonitorError> {
        config.check()?;

        let config = Arc::new(config);
        let status = StatusBoard::new();
        let shutdown = ShutdownController::new(RunState::new(), sink.clone(), config.clone())
            .with_status(status.clone());

        Ok(Self {
            config,
            sink,
            shutdown,
            status,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<WitnessMetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn shutdown(&self) -> ShutdownController {
        self.shutdown.clone()
    }

    pub fn status(&self) -> StatusBoard {
        self.status.clone()
    }

    /// Connect through `connect`, then sample until stopped or failed.
    ///
    /// `Ok(())` means a graceful stop; any error has already been reported to
    /// the sink at error severity.
    pub async fn run<C, Fut>(&self, connect: C) -> Result<(), MonitorError>
    where
        C: FnOnce(Arc<MonitorConfig>) -> Fut,
        Fut: Future<Output = Result<Arc<dyn ChainClient>, ChainError>>,
    {
        self.status.set_phase(MonitorPhase::Starting).await;
        self.emit(Severity::Warning, "Starting...").await;

        let client = match connect(self.config.clone()).await {
            Ok(client) => client,
            Err(err) => return Err(self.fail(err).await),
        };

        self.status.mark_running().await;
        self.emit(Severity::Warning, "Started...").await;

        let mut sampler = HealthSampler::new(client, self.sink.clone(), self.config.clone())
            .with_status(self.status.clone());
        if let Some(metrics) = &self.metrics {
            sampler = sampler.with_metrics(metrics.clone());
        }

        match sampler.run(self.shutdown.run_state()).await {
            Ok(cycles) => {
                self.shutdown.settled().await;
                self.status.mark_stopping().await;
                tracing::debug!("Sampler stopped after {} cycles", cycles);
                self.sink
                    .emit(
                        lifecycle_event(&self.config, Severity::Warning, "Stopped...")
                            .with_field("cycles", cycles),
                    )
                    .await;
                self.status.set_phase(MonitorPhase::Stopped).await;
                Ok(())
            }
            Err(err) => Err(self.fail(err).await),
        }
    }

    async fn fail(&self, err: ChainError) -> MonitorError {
        self.status.set_phase(MonitorPhase::Failed).await;
        self.sink
            .emit(
                lifecycle_event(&self.config, Severity::Error, "Exception. Application has stopped!!!")
                    .with_field("error", err.to_string())
                    .with_field("transient", err.is_transient()),
            )
            .await;
        MonitorError::Chain(err)
    }

    async fn emit(&self, severity: Severity, label: &str) {
        self.sink.emit(lifecycle_event(&self.config, severity, label)).await;
    }
}
