//! Trailing-edge debounce.
//!
//! A [`Debouncer`] holds at most one pending deadline. Every
//! [`Debouncer::schedule`] replaces the previous deadline (last write wins),
//! and [`Debouncer::fire_if_due`] reports the trailing edge exactly once after
//! the quiet window has elapsed with no further schedules. There is no
//! leading-edge invocation.
//!
//! The debouncer owns no thread or timer; the owner polls it from its event
//! loop, the same way the list view polls its refresh interval on `tick`.

use std::time::{Duration, Instant};

/// Quiet window applied to name/city filter changes.
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Schedule the trailing edge `window` after `now`, cancelling any
    /// deadline that has not fired yet.
    ///
    /// Returns `true` if a pending deadline was replaced.
    pub fn schedule(&mut self, now: Instant) -> bool {
        let deadline = now.checked_add(self.window).unwrap_or(now);
        self.deadline.replace(deadline).is_some()
    }

    /// Drop the pending deadline without firing. Returns `true` if one existed.
    pub const fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the pending deadline, zero if already due.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Consume the pending deadline if it has passed.
    ///
    /// Returns `true` exactly once per scheduled burst.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_WINDOW)
    }
}
