pub mod logstash;
pub mod sink;
pub mod tracing_sink;

pub use logstash::LogstashSink;
pub use sink::{EventSink, FanoutSink, HealthEvent, MemorySink, Severity};
pub use tracing_sink::TracingSink;
