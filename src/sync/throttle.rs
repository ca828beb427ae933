use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Minimum-interval limiter for the carrier API. The bulk sweep calls
/// `wait` before each lookup; the first call passes immediately and
/// every later call is held until the interval has elapsed.
pub struct Throttle {
    interval: Duration,
    earliest_next: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            earliest_next: None,
        }
    }

    pub async fn wait(&mut self) {
        if self.interval.is_zero() {
            return;
        }

        if let Some(earliest) = self.earliest_next {
            sleep_until(earliest).await;
        }
        self.earliest_next = Some(Instant::now() + self.interval);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::Throttle;

    #[tokio::test(start_paused = true)]
    async fn first_call_passes_immediately_then_spaces_calls() {
        let mut throttle = Throttle::new(Duration::from_secs(1));

        let start = Instant::now();
        throttle.wait().await;
        assert_eq!(Instant::now(), start);

        throttle.wait().await;
        assert!(Instant::now() - start >= Duration::from_secs(1));

        throttle.wait().await;
        assert!(Instant::now() - start >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_never_waits() {
        let mut throttle = Throttle::new(Duration::ZERO);
        let start = Instant::now();
        throttle.wait().await;
        throttle.wait().await;
        assert_eq!(Instant::now(), start);
    }
}
