//! Bounded random pauses between navigation actions.
//!
//! Shops throttle or challenge clients that click at machine speed, so
//! every wait between actions is drawn uniformly from a configured range.
//! A scale of `0.0` turns every pause into a no-op, which is what tests use.

use std::time::Duration;

use fruver_core::DelayRange;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    min: Duration,
    max: Duration,
}

impl DelayPolicy {
    pub const NONE: Self = Self {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    /// Build a policy from a configured range, multiplied by `scale`.
    #[must_use]
    pub fn from_range(range: DelayRange, scale: f64) -> Self {
        let min = scaled(range.min_secs, scale);
        let max = scaled(range.max_secs, scale).max(min);
        Self { min, max }
    }

    /// A pause of exactly `secs` seconds, multiplied by `scale`.
    #[must_use]
    pub fn fixed(secs: f64, scale: f64) -> Self {
        Self::from_range(DelayRange::fixed(secs), scale)
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.max.is_zero()
    }

    /// Draw one delay from the range.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min_ms = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }

    /// Sleep for one sampled delay.
    pub async fn pause(&self) {
        if self.is_none() {
            return;
        }
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn scaled(secs: f64, scale: f64) -> Duration {
    let value = secs * scale;
    if value > 0.0 {
        Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
