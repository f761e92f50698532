pub mod config;
pub mod modules;
pub mod services;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use config::{MonitorConfig, Settings};
use modules::status::{status_routes, StatusState};
use services::chain::{ChainClient, GrapheneClient};
use services::events::{EventSink, FanoutSink, LogstashSink, TracingSink};
use services::metrics::{MetricsRegistry, WitnessMetricsCollector};
use services::monitor::{Monitor, MonitorError, StatusBoard};

pub fn create_status_app(status: StatusBoard, metrics: Arc<MetricsRegistry>) -> Router {
    status_routes(Arc::new(StatusState { status, metrics }))
        .layer(TraceLayer::new_for_http())
}

/// Stdout (through tracing) plus logstash when a host is configured
pub fn build_sink(settings: &Settings) -> Arc<dyn EventSink> {
    let mut sinks: Vec<Arc<dyn EventSink>> = vec![Arc::new(TracingSink::new())];

    if settings.logstash_enabled() {
        sinks.push(Arc::new(LogstashSink::new(
            &settings.logstash_host,
            settings.logstash_port,
            &settings.app_name,
            settings.logging_version,
        )));
    }

    Arc::new(FanoutSink::new(sinks))
}

/// Run the monitor against a Graphene node until a termination signal or a
/// fatal error.
pub async fn start(settings: &Settings, config: MonitorConfig) -> Result<(), MonitorError> {
    let sink = build_sink(settings);
    let mut monitor = Monitor::new(config, sink)?;

    let registry = match MetricsRegistry::new() {
        Ok(registry) => {
            monitor = monitor.with_metrics(Arc::new(WitnessMetricsCollector::new(registry.clone())));
            Some(registry)
        }
        Err(e) => {
            tracing::warn!("Metrics disabled: {}", e);
            None
        }
    };

    let signals = monitor.shutdown().listen_for_signals()?;

    let server = match (settings.status_addr, registry) {
        (Some(addr), Some(registry)) => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!("Status server listening on http://{}", addr);

            let app = create_status_app(monitor.status(), registry);
            let run_state = monitor.shutdown().run_state().clone();
            Some(tokio::spawn(async move {
                let shutdown = async move { run_state.stopped().await };
                if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
                    tracing::error!("Status server error: {}", e);
                }
            }))
        }
        _ => None,
    };

    let timeout = std::time::Duration::from_secs(settings.rpc_timeout_secs);
    let result = monitor
        .run(|config| async move {
            GrapheneClient::connect(&config.node_address, config.chain_identity.clone(), timeout)
                .await
                .map(|client| Arc::new(client) as Arc<dyn ChainClient>)
        })
        .await;

    signals.abort();
    if let Some(server) = server {
        server.abort();
    }

    result
}
