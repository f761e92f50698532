pub mod chain;
pub mod events;
pub mod metrics;
pub mod monitor;
