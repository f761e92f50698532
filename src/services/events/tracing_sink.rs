use async_trait::async_trait;
use serde_json::Value;

use super::sink::{EventSink, HealthEvent, Severity};

/// Forwards health events to the process `tracing` subscriber
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSink for TracingSink {
    async fn emit(&self, event: HealthEvent) {
        let node = event.field("node").and_then(Value::as_str).unwrap_or("-");
        let account = event.field("account").and_then(Value::as_str).unwrap_or("-");
        let fields = Value::Object(event.fields.clone());

        match event.severity {
            Severity::Info => tracing::info!(node, account, %fields, "{}", event.message),
            Severity::Warning => tracing::warn!(node, account, %fields, "{}", event.message),
            Severity::Error => tracing::error!(node, account, %fields, "{}", event.message),
        }
    }
}
