pub mod engine;
pub mod retry;
pub mod sample;
pub mod sampler;
pub mod shutdown;
pub mod status;

pub use engine::{Monitor, MonitorError};
pub use retry::RetryPolicy;
pub use sample::HealthSample;
pub use sampler::HealthSampler;
pub use shutdown::{RunState, ShutdownController};
pub use status::{MonitorPhase, MonitorStatus, StatusBoard};
