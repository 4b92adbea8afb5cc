//! Exponential backoff for the producer's connect retries
//!
//! A failed connection attempt is transient: the producer logs it and
//! tries again later. The backoff keeps those retries from turning
//! into a busy loop against a dead endpoint.

use std::time::Duration;

/// Exponential backoff schedule for repeated connection failures.
///
/// Delays grow by a fixed multiplier per attempt up to a cap, with
/// optional jitter of up to ±25% to avoid synchronized retry storms.
#[derive(Debug, Clone)]
pub struct BackoffStrategy {
    /// Delay before the first retry
    initial: Duration,
    /// Cap for exponential growth
    max: Duration,
    /// Growth factor per attempt
    multiplier: f64,
    /// Whether to randomize delays
    jitter: bool,
}

impl BackoffStrategy {
    /// Create a backoff schedule with the given initial delay and cap.
    pub fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.max(Duration::from_millis(1));
        Self {
            initial,
            max: max.max(initial),
            multiplier: 2.0,
            jitter: false,
        }
    }

    /// Set the growth factor per attempt. Clamped to at least 1.0.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    /// Enable jitter, randomizing each delay by up to ±25%.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay to wait before retry number `attempt` (zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let ms = self.initial.as_millis() as f64 * self.multiplier.powi(attempt.min(63) as i32);
        let capped = Duration::from_millis(ms.min(self.max.as_millis() as f64) as u64);

        if !self.jitter {
            return capped;
        }
        let range = capped / 4;
        let offset = range.mul_f64(subsec_fraction() * 2.0);
        capped - range + offset
    }
}

impl Default for BackoffStrategy {
    /// Default schedule: 100ms initial, 30 second cap, doubling
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(30))
    }
}

/// Cheap jitter source, a value in `[0.0, 1.0)` derived from the clock.
fn subsec_fraction() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    f64::from(nanos % 1000) / 1000.0
}
