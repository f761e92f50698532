use prometheus::{
    CounterVec, Encoder, GaugeVec, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Prometheus metrics of the witness monitor
pub struct MetricsRegistry {
    registry: Registry,

    // Witness Metrics
    pub witness_total_missed: GaugeVec,
    pub witness_last_confirmed_block: GaugeVec,
    pub witness_block_lag: GaugeVec,

    // Chain Metrics
    pub head_block: GaugeVec,

    // Polling Metrics
    pub poll_cycles_total: CounterVec,
    pub poll_duration_seconds: Histogram,
}

impl MetricsRegistry {
    pub fn new() -> Result<Arc<Self>, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let witness_total_missed = GaugeVec::new(
            Opts::new("total_missed", "Blocks the witness failed to produce")
                .namespace("witness"),
            &["account"],
        )?;
        registry.register(Box::new(witness_total_missed.clone()))?;

        let witness_last_confirmed_block = GaugeVec::new(
            Opts::new("last_confirmed_block", "Last block confirmed by the witness")
                .namespace("witness"),
            &["account"],
        )?;
        registry.register(Box::new(witness_last_confirmed_block.clone()))?;

        let witness_block_lag = GaugeVec::new(
            Opts::new("block_lag", "Head block minus the witness's last confirmed block")
                .namespace("witness"),
            &["account"],
        )?;
        registry.register(Box::new(witness_block_lag.clone()))?;

        let head_block = GaugeVec::new(
            Opts::new("head_block", "Head block number reported by the node")
                .namespace("witness"),
            &["node"],
        )?;
        registry.register(Box::new(head_block.clone()))?;

        let poll_cycles_total = CounterVec::new(
            Opts::new("poll_cycles_total", "Poll cycles by outcome")
                .namespace("witness"),
            &["outcome"],
        )?;
        registry.register(Box::new(poll_cycles_total.clone()))?;

        let poll_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("poll_duration_seconds", "Time spent fetching witness and head block")
                .namespace("witness")
                .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(poll_duration_seconds.clone()))?;

        Ok(Arc::new(Self {
            registry,
            witness_total_missed,
            witness_last_confirmed_block,
            witness_block_lag,
            head_block,
            poll_cycles_total,
            poll_duration_seconds,
        }))
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
