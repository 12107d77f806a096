//! Rate limiting primitives for frame and event handling.
//!
//! All three work on host timestamps (a [`Duration`] since the host's time
//! origin) and hold no clock of their own, so they can be driven by hand.
//!
//! | Type | Answers |
//! |------|---------|
//! | [`FrameThrottle`] | should this animation frame be rendered? |
//! | [`RateLimiter`] | may this event be acted on yet? |
//! | [`Debouncer`] | has the burst of triggers gone quiet long enough? |

use std::time::Duration;

/// Caps the rendered frame rate of a loop driven by a faster scheduler.
///
/// Skipped frames keep the loop registered; only rendering is skipped. After
/// a rendered frame the reference time is snapped back by the overshoot
/// (`elapsed mod interval`) so the cadence does not drift.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: Duration,
    last: Duration,
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` if a frame at `now` should be rendered.
    pub fn ready(&mut self, now: Duration) -> bool {
        let elapsed = now.saturating_sub(self.last);
        if elapsed < self.interval {
            return false;
        }

        let interval_nanos = self.interval.as_nanos();
        let overshoot = if interval_nanos == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos((elapsed.as_nanos() % interval_nanos) as u64)
        };
        self.last = now - overshoot;
        true
    }
}

/// Allows an action at most once per interval.
///
/// An action is allowed when `now - last_allowed >= interval`; the first
/// call is always allowed.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last: Option<Duration>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Consume the slot if it is available. Returns whether the action may run.
    pub fn try_acquire(&mut self, now: Duration) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Fires once after a quiet period following the last trigger.
///
/// Every [`trigger`](Debouncer::trigger) pushes the deadline out; the first
/// [`poll`](Debouncer::poll) at or past the deadline fires and disarms.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn trigger(&mut self, now: Duration) {
        self.deadline = Some(now + self.quiet);
    }

    /// Returns `true` exactly once per quiet burst.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
