use std::time::{Duration, Instant};

/// Minimum time between two reloads.
pub const RELOAD_INTERVAL: Duration = Duration::from_secs(60);

/// A reload was requested before the interval elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("reload available again in {} second(s)", .remaining.as_secs().max(1))]
pub struct ReloadTooSoon {
    pub remaining: Duration,
}

/// Decides whether a reload may run. Every accepted attempt starts a new
/// interval, whether the reload then succeeds or not.
#[derive(Debug, Clone)]
pub struct ReloadGuard {
    interval: Duration,
    last_attempt: Option<Instant>,
}

impl Default for ReloadGuard {
    fn default() -> Self {
        Self::new(RELOAD_INTERVAL)
    }
}

impl ReloadGuard {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_attempt: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left before the next reload is allowed; zero when allowed now.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_attempt {
            Some(last) => self.interval.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Claims a reload slot at `now`, or reports how long to wait.
    pub fn try_acquire(&mut self, now: Instant) -> Result<(), ReloadTooSoon> {
        let remaining = self.remaining(now);
        if !remaining.is_zero() {
            return Err(ReloadTooSoon { remaining });
        }
        self.last_attempt = Some(now);
        Ok(())
    }
}
