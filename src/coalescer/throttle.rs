//! Leading-edge rate limiting.

use std::time::Duration;

use tokio::time::Instant;

/// Outcome of asking the throttle whether a call may go out now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    DispatchNow,
    /// The window is still open; the earliest permitted dispatch is at this instant.
    DeferUntil(Instant),
}

/// Longest spacing the throttle honours; larger intervals are capped to it.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Pure throttle decision.
///
/// A call dispatches immediately when nothing has gone out yet or when at
/// least `min_interval` (capped at [`MAX_INTERVAL`]) has elapsed since the
/// last dispatch.
#[must_use]
pub fn decide(last_dispatch: Option<Instant>, now: Instant, min_interval: Duration) -> Decision {
    match last_dispatch {
        None => Decision::DispatchNow,
        Some(last) => {
            let next = last + min_interval.min(MAX_INTERVAL);
            if now >= next {
                Decision::DispatchNow
            } else {
                Decision::DeferUntil(next)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last_dispatch: Option<Instant>,
}

impl Throttle {
    #[must_use]
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: None,
        }
    }

    #[must_use]
    pub fn decide(&self, now: Instant) -> Decision {
        decide(self.last_dispatch, now, self.min_interval)
    }

    pub fn mark_dispatched(&mut self, at: Instant) {
        self.last_dispatch = Some(at);
    }

    #[must_use]
    pub const fn last_dispatch(&self) -> Option<Instant> {
        self.last_dispatch
    }
}
