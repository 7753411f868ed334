//! Rate limiting for percentage updates.

use std::time::Duration;

use tokio::time::Instant;

/// Default spacing between two forwarded updates.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Decides which percentage updates are forwarded.
///
/// An update is forwarded when the value changed and either the interval
/// elapsed since the last forwarded one or the value reached 100.
#[derive(Debug)]
pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    last_percent: Option<u8>,
    min_interval: Duration,
}

impl ProgressThrottle {
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            last_percent: None,
            min_interval,
        }
    }

    /// Whether `percent` should be forwarded now. Records it if so.
    pub fn should_emit(&mut self, percent: u8) -> bool {
        if self.last_percent == Some(percent) {
            return false;
        }
        let now = Instant::now();
        let due = match self.last_emit {
            Some(last) => percent >= 100 || now.duration_since(last) >= self.min_interval,
            None => true,
        };
        if due {
            self.last_emit = Some(now);
            self.last_percent = Some(percent);
        }
        due
    }

    /// Forget the last forwarded value, e.g. when a new file starts.
    pub const fn reset(&mut self) {
        self.last_emit = None;
        self.last_percent = None;
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_update_passes() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(100));
        assert!(throttle.should_emit(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_respects_interval() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(50));
        assert!(throttle.should_emit(1));
        assert!(!throttle.should_emit(2));

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(throttle.should_emit(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_always_passes_once() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(10));
        assert!(throttle.should_emit(5));
        assert!(throttle.should_emit(100));
        assert!(!throttle.should_emit(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(10));
        assert!(throttle.should_emit(40));
        assert!(!throttle.should_emit(41));

        throttle.reset();
        assert!(throttle.should_emit(41));
    }
}
