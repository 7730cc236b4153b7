use std::time::Duration;

/// Static delay inserted between Discord writes.
///
/// The delay does not adapt to observed congestion; it only spreads a burst of writes over
/// time so a large index does not exhaust the per-channel rate-limit bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Throttle that never sleeps, used by tests.
    pub fn none() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    /// Sleeps for the configured delay.
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
