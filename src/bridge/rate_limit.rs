use std::time::Duration;

use chrono::{DateTime, Utc};

/// Minimum time between two announcements.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5 * 60);

/// Point in time as seen by the rate limiter.
pub type Timestamp = DateTime<Utc>;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Debounce policy: at most one announcement per cooldown window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cooldown: Duration,
    last_sent: Option<Timestamp>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl RateLimiter {
    /// Create a limiter that has never allowed anything.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_sent: None,
        }
    }

    /// Configured cooldown window.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Time of the last allowed announcement.
    pub fn last_sent(&self) -> Option<Timestamp> {
        self.last_sent
    }

    /// Decide whether an announcement at `now` may go out.
    ///
    /// The first call is always allowed. Later calls are allowed once at
    /// least `cooldown` has elapsed since the last allowed one, the boundary
    /// included. Allowed calls record `now`; refused calls change nothing.
    /// A `now` earlier than the last allowed call is refused.
    pub fn allow(&mut self, now: Timestamp) -> bool {
        let allowed = match self.last_sent {
            None => true,
            Some(last) => (now - last)
                .to_std()
                .is_ok_and(|elapsed| elapsed >= self.cooldown),
        };

        if allowed {
            self.last_sent = Some(now);
        }

        allowed
    }
}
