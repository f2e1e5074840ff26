//! Cooperative deadline.
//!
//! Expiry is polled, never signalled: the search checks the deadline before
//! expanding each frame and the drivers check it between solutions. An
//! optional shared flag allows external cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A polled time limit with optional external cancellation.
#[derive(Debug, Clone)]
pub struct Deadline {
    start: Instant,
    limit: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Deadline {
    /// Expires `limit` after now.
    pub fn after(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit: Some(limit),
            cancel: None,
        }
    }

    /// Never expires (unless cancelled).
    pub fn never() -> Self {
        Self {
            start: Instant::now(),
            limit: None,
            cancel: None,
        }
    }

    /// Also expires once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Whether the cancellation flag is set.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Whether the deadline has passed or was cancelled.
    pub fn is_expired(&self) -> bool {
        self.is_cancelled() || self.limit.is_some_and(|limit| self.start.elapsed() >= limit)
    }

    /// Time since the deadline was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time left. `Duration::MAX` for an unbounded deadline, zero once expired.
    pub fn remaining(&self) -> Duration {
        if self.is_cancelled() {
            return Duration::ZERO;
        }
        match self.limit {
            Some(limit) => limit.saturating_sub(self.start.elapsed()),
            None => Duration::MAX,
        }
    }

    /// The configured limit, if any.
    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never() {
        let d = Deadline::never();
        assert!(!d.is_expired());
        assert_eq!(d.remaining(), Duration::MAX);
        assert!(d.limit().is_none());
    }

    #[test]
    fn test_zero_limit_is_expired() {
        let d = Deadline::after(Duration::ZERO);
        assert!(d.is_expired());
        assert_eq!(d.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_expires_after_limit() {
        let d = Deadline::after(Duration::from_millis(20));
        assert!(!d.is_expired());
        assert!(d.remaining() <= Duration::from_millis(20));
        std::thread::sleep(Duration::from_millis(30));
        assert!(d.is_expired());
    }

    #[test]
    fn test_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let d = Deadline::never().with_cancel(flag.clone());
        assert!(!d.is_expired());

        flag.store(true, Ordering::Relaxed);
        assert!(d.is_cancelled());
        assert!(d.is_expired());
        assert_eq!(d.remaining(), Duration::ZERO);
    }
}
