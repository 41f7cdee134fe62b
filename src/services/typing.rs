use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

/// The pending stop-typing timer. At most one deadline is ever outstanding;
/// every keystroke cancels it and schedules a fresh one.
#[derive(Debug, Clone)]
pub struct TypingDebouncer {
    quiet_period: Duration,
    pending_stop: Option<Instant>,
}

impl TypingDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending_stop: None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending_stop
    }

    /// Returns whether a timer was actually cancelled.
    pub fn cancel(&mut self) -> bool {
        self.pending_stop.take().is_some()
    }

    pub fn reschedule(&mut self, now: Instant) -> Instant {
        let deadline = now + self.quiet_period;
        self.pending_stop = Some(deadline);
        deadline
    }

    /// Consumes the timer if it has elapsed by `now`.
    pub fn take_expired(&mut self, now: Instant) -> bool {
        match self.pending_stop {
            Some(deadline) if deadline <= now => {
                self.pending_stop = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for TypingDebouncer {
    fn default() -> Self {
        TypingDebouncer::new(DEFAULT_QUIET_PERIOD)
    }
}
