use std::time::Duration;
use rand::Rng;

/// Bounded retry for transient fetch errors.
///
/// `max_attempts == 0` keeps the fail-fast behaviour: the first error of any
/// kind stops the monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            base_delay_secs: 5,
            max_delay_secs: 60,
            jitter_factor: 0.1, // ±10%
        }
    }
}

impl RetryPolicy {
    /// Fail on the first error
    pub fn fail_fast() -> Self {
        Self::default()
    }

    /// Delay before retry number `attempt` (0-based).
    /// Formula: delay = min(base_delay × 2^attempt × (1 ± jitter), max_delay)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay_secs as f64;
        let exponential = base * 2_f64.powi(attempt.min(30) as i32);

        let jitter = if self.jitter_factor > 0.0 {
            let mut rng = rand::rng();
            1.0 + (rng.random::<f64>() * 2.0 - 1.0) * self.jitter_factor
        } else {
            1.0
        };

        let capped = (exponential * jitter).min(self.max_delay_secs as f64);
        Duration::try_from_secs_f64(capped.max(0.0)).unwrap_or(Duration::from_secs(self.max_delay_secs))
    }

    /// `attempt` is the number of consecutive failures already retried
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
