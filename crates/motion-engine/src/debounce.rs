//! Toggle key debouncing.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use mousekeys_common::config::ToggleSettings;

/// Accepts at most one toggle per interval.
///
/// Platforms report one physical toggle press in different ways (a press, a
/// release, a modifier change, sometimes several), so the first edge wins and
/// everything within the interval after it is dropped.
#[derive(Debug)]
pub struct ToggleDebouncer {
    interval: Duration,
    last_accepted: Mutex<Option<Instant>>,
}

impl ToggleDebouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: Mutex::new(None),
        }
    }

    pub fn from_settings(settings: &ToggleSettings) -> Self {
        Self::new(Duration::from_millis(settings.debounce_ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a toggle signal at `now` should be acted on. Accepting it
    /// starts a new interval.
    pub fn should_toggle(&self, now: Instant) -> bool {
        let mut last = self.last_accepted.lock();
        match *last {
            Some(previous) if now.saturating_duration_since(previous) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Forget the last accepted toggle.
    pub fn reset(&self) {
        *self.last_accepted.lock() = None;
    }
}

impl Default for ToggleDebouncer {
    fn default() -> Self {
        Self::from_settings(&ToggleSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_toggle_is_accepted() {
        let debouncer = ToggleDebouncer::default();
        assert!(debouncer.should_toggle(Instant::now()));
    }

    #[test]
    fn test_duplicate_within_interval_is_dropped() {
        let debouncer = ToggleDebouncer::new(Duration::from_millis(300));
        let t0 = Instant::now();
        assert!(debouncer.should_toggle(t0));
        assert!(!debouncer.should_toggle(t0 + Duration::from_millis(10)));
        assert!(!debouncer.should_toggle(t0 + Duration::from_millis(299)));
        assert!(debouncer.should_toggle(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_rejected_signals_do_not_extend_the_interval() {
        let debouncer = ToggleDebouncer::new(Duration::from_millis(300));
        let t0 = Instant::now();
        assert!(debouncer.should_toggle(t0));
        assert!(!debouncer.should_toggle(t0 + Duration::from_millis(200)));
        assert!(debouncer.should_toggle(t0 + Duration::from_millis(350)));
    }

    #[test]
    fn test_earlier_instant_from_another_thread_is_dropped() {
        let debouncer = ToggleDebouncer::new(Duration::from_millis(300));
        let t0 = Instant::now() + Duration::from_secs(1);
        assert!(debouncer.should_toggle(t0));
        assert!(!debouncer.should_toggle(t0 - Duration::from_millis(5)));
    }

    #[test]
    fn test_reset_forgets_last_toggle() {
        let debouncer = ToggleDebouncer::new(Duration::from_millis(300));
        let t0 = Instant::now();
        assert!(debouncer.should_toggle(t0));
        debouncer.reset();
        assert!(debouncer.should_toggle(t0 + Duration::from_millis(1)));
    }

    #[test]
    fn test_concurrent_callers_accept_exactly_one() {
        let debouncer = std::sync::Arc::new(ToggleDebouncer::new(Duration::from_secs(60)));
        let now = Instant::now();
        let accepted: usize = (0..8)
            .map(|_| {
                let d = debouncer.clone();
                std::thread::spawn(move || d.should_toggle(now) as usize)
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .sum();
        assert_eq!(accepted, 1);
    }
}
