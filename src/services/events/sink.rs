use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Level name as the python logging module spells it
    pub fn level_name(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

/// A structured health event
#[derive(Debug, Clone, Serialize)]
pub struct HealthEvent {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
    pub fields: Map<String, Value>,
}

impl HealthEvent {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            message: message.into(),
            fields: Map::new(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Destination for health events.
/// Delivery problems are the sink's own business and never reach the caller.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: HealthEvent);
}

/// Delivers every event to each inner sink, in order
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl EventSink for FanoutSink {
    async fn emit(&self, event: HealthEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// Keeps events in memory, mostly useful for tests and dry runs
#[derive(Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<HealthEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HealthEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.events().iter().filter(|e| e.severity == severity).count()
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn emit(&self, event: HealthEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
