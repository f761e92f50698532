// =============================================================================
// INTEGRATION TESTS - HEALTH SAMPLER
// Poll cadence, retry policy and missed-block tracking
// =============================================================================

use crate::common::{events_with, network_error, retrying_config, test_config, ScriptedClient};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use witness_health_monitor::services::chain::{ChainError, WitnessStatus};
use witness_health_monitor::services::events::{MemorySink, Severity};
use witness_health_monitor::services::metrics::{MetricsRegistry, WitnessMetricsCollector};
use witness_health_monitor::services::monitor::{HealthSampler, RunState, StatusBoard};

fn status(total_missed: u64, last_confirmed_block_num: u64) -> WitnessStatus {
    WitnessStatus { total_missed, last_confirmed_block_num }
}

#[tokio::test(start_paused = true)]
async fn test_one_info_event_per_cycle() {
    let sink = MemorySink::new();
    let client = Arc::new(ScriptedClient::steady(3, 1000, 1002));
    let mut sampler = HealthSampler::new(client.clone(), Arc::new(sink.clone()), Arc::new(test_config(10)));

    let state = RunState::new();
    let stopper = state.clone();
    let (result, _) = tokio::join!(sampler.run(&state), async {
        // Cycles at t=0, 10, 20; stop during the third sleep
        tokio::time::sleep(Duration::from_secs(25)).await;
        stopper.request_stop();
    });

    assert_eq!(result.unwrap(), 3);
    assert_eq!(client.witness_calls(), 3);
    assert_eq!(sink.count(Severity::Info), 3);

    for event in sink.events() {
        for key in ["total_missed", "last_node_block", "last_blockchain_block"] {
            assert!(event.field(key).and_then(Value::as_u64).is_some(), "missing {}", key);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_missed_blocks_increase_warns() {
    let sink = MemorySink::new();
    let client = Arc::new(
        ScriptedClient::steady(5, 1020, 1020)
            .then_witness(Ok(status(3, 1000)))
            .then_witness(Ok(status(5, 1010))),
    );
    let mut sampler = HealthSampler::new(client, Arc::new(sink.clone()), Arc::new(test_config(30)));

    let state = RunState::new();
    let stopper = state.clone();
    let (result, _) = tokio::join!(sampler.run(&state), async {
        tokio::time::sleep(Duration::from_secs(75)).await;
        stopper.request_stop();
    });

    assert_eq!(result.unwrap(), 3);
    assert_eq!(sink.count(Severity::Info), 3);

    let warnings = events_with(&sink, Severity::Warning, "Missed blocks increased by 2");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field("missed_since_last").and_then(Value::as_u64), Some(2));

    let infos: Vec<_> = sink.events().into_iter().filter(|e| e.severity == Severity::Info).collect();
    assert!(infos[0].field("missed_since_last").is_none());
    assert_eq!(infos[1].field("missed_since_last").and_then(Value::as_u64), Some(2));
    assert_eq!(infos[2].field("missed_since_last").and_then(Value::as_u64), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_transient_errors_are_retried_within_budget() {
    let sink = MemorySink::new();
    let client = Arc::new(
        ScriptedClient::steady(0, 100, 101)
            .then_witness(Ok(status(0, 100)))
            .then_witness(Err(network_error()))
            .then_witness(Err(network_error()))
            .then_witness(Ok(status(0, 110)))
            .then_witness(Err(network_error()))
            .then_witness(Err(network_error()))
            .then_witness(Err(network_error())),
    );
    let mut sampler = HealthSampler::new(client.clone(), Arc::new(sink.clone()), Arc::new(retrying_config(30, 2)));

    let result = sampler.run(&RunState::new()).await;

    assert!(matches!(result, Err(ChainError::Network(_))));
    assert_eq!(client.witness_calls(), 7);
    assert_eq!(sink.count(Severity::Info), 2);

    // Two retries after each success, the third consecutive failure is fatal
    let retries = events_with(&sink, Severity::Warning, "Node unavailable, retry");
    assert_eq!(retries.len(), 4);
    assert_eq!(retries[0].field("attempt").and_then(Value::as_u64), Some(1));
    assert_eq!(retries[1].field("attempt").and_then(Value::as_u64), Some(2));
    assert_eq!(retries[2].field("attempt").and_then(Value::as_u64), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_non_transient_error_ignores_retry_budget() {
    let sink = MemorySink::new();
    let client = Arc::new(
        ScriptedClient::steady(0, 100, 101)
            .then_witness(Err(ChainError::WitnessNotFound("abetterbid".to_string()))),
    );
    let mut sampler = HealthSampler::new(client.clone(), Arc::new(sink.clone()), Arc::new(retrying_config(30, 5)));

    let result = sampler.run(&RunState::new()).await;

    assert!(matches!(result, Err(ChainError::WitnessNotFound(_))));
    assert_eq!(client.witness_calls(), 1);
    assert!(sink.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_head_fetch_failure_is_fatal_without_retries() {
    let sink = MemorySink::new();
    let client = Arc::new(ScriptedClient::steady(0, 100, 101).then_head(Err(network_error())));
    let mut sampler = HealthSampler::new(client.clone(), Arc::new(sink.clone()), Arc::new(test_config(30)));

    let result = sampler.run(&RunState::new()).await;

    assert!(matches!(result, Err(ChainError::Network(_))));
    assert_eq!(client.witness_calls(), 1);
    assert_eq!(client.head_calls(), 1);
    assert_eq!(sink.count(Severity::Info), 0);
}

#[tokio::test(start_paused = true)]
async fn test_retry_backoff_is_interruptible() {
    let sink = MemorySink::new();
    let client = Arc::new(ScriptedClient::steady(0, 100, 101).then_witness(Err(network_error())));

    let mut config = retrying_config(30, 3);
    config.retry.base_delay_secs = 600;
    config.retry.max_delay_secs = 600;
    let mut sampler = HealthSampler::new(client.clone(), Arc::new(sink.clone()), Arc::new(config));

    let state = RunState::new();
    let stopper = state.clone();
    let started = tokio::time::Instant::now();
    let (result, _) = tokio::join!(sampler.run(&state), async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        stopper.request_stop();
    });

    assert_eq!(result.unwrap(), 0);
    assert!(started.elapsed() < Duration::from_secs(6));
    assert_eq!(client.witness_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sampler_feeds_metrics_and_status() {
    let registry = MetricsRegistry::new().unwrap();
    let collector = Arc::new(WitnessMetricsCollector::new(registry.clone()));
    let board = StatusBoard::new();
    let client = Arc::new(ScriptedClient::steady(3, 1000, 1002));

    let mut sampler = HealthSampler::new(client, Arc::new(MemorySink::new()), Arc::new(test_config(30)))
        .with_metrics(collector)
        .with_status(board.clone());

    let state = RunState::new();
    let stopper = state.clone();
    let (result, _) = tokio::join!(sampler.run(&state), async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        stopper.request_stop();
    });
    assert_eq!(result.unwrap(), 1);

    let output = registry.export().unwrap();
    assert!(output.contains("witness_total_missed{account=\"abetterbid\"} 3"));
    assert!(output.contains("witness_block_lag{account=\"abetterbid\"} 2"));
    assert!(output.contains("witness_poll_cycles_total{outcome=\"success\"} 1"));

    let snapshot = board.snapshot().await;
    assert_eq!(snapshot.successful_cycles, 1);
    assert_eq!(snapshot.last_sample.map(|s| s.head_block_num), Some(1002));
}
