//! Per-input debounce timer

use std::time::{Duration, Instant};

pub const DEFAULT_QUIET: Duration = Duration::from_millis(500);

/// Holds the latest input until it has been quiet for the configured interval.
/// Every new input replaces the pending one and restarts the clock.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: None }
    }

    pub fn input(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.quiet, value));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the pending value fires
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(deadline, _)| deadline.saturating_duration_since(now))
    }

    /// The pending value once its deadline has passed; fires at most once
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_interval_only_once() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.input("rick", start);

        assert_eq!(debouncer.poll(start + Duration::from_millis(499)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), Some("rick"));
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_each_keystroke_restarts_the_clock() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.input("r", start);
        debouncer.input("ri", start + Duration::from_millis(400));
        debouncer.input("ric", start + Duration::from_millis(800));

        assert_eq!(debouncer.poll(start + Duration::from_millis(1000)), None);
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(1000)),
            Some(Duration::from_millis(300))
        );
        assert_eq!(debouncer.poll(start + Duration::from_millis(1300)), Some("ric"));
    }

    #[test]
    fn test_cancel_drops_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.input(1, start);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }
}
