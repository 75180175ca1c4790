//! Pacing of code output around the end of a TOTP window.
//!
//! A code that is about to expire is of little use to someone who still has to
//! type it somewhere. When fewer than `holdoff` seconds remain in the current
//! window the caller sleeps until the next window starts and emits that code
//! instead.

use std::{
    io::{self, Write},
    thread,
    time::{Duration, SystemTime},
};

use crate::totp::DEFAULT_PERIOD;

/// Seconds of validity a code must have left to be printed right away.
pub const DEFAULT_HOLDOFF: u64 = 5;

/// Seconds left in the window containing `now`, in `1..=interval`.
///
/// `interval` must be non-zero.
pub fn remaining_seconds(now: u64, interval: u64) -> u64 {
    interval - (now % interval)
}

/// Source of wall-clock time, and the means to wait on it.
pub trait Clock {
    /// Seconds since the UNIX epoch.
    fn now(&self) -> u64;

    fn sleep(&self, seconds: u64);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }

    fn sleep(&self, seconds: u64) {
        thread::sleep(Duration::from_secs(seconds));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holdoff {
    /// The current code is good enough.
    Emit,
    /// Wait this many seconds for the next window.
    Pause(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldoffScheduler {
    holdoff: u64,
    interval: u64,
    force: bool,
}

impl HoldoffScheduler {
    pub fn new(holdoff: u64) -> Self {
        Self {
            holdoff,
            interval: DEFAULT_PERIOD,
            force: false,
        }
    }

    /// Never pause, whatever is left of the window.
    pub fn with_force(&mut self, force: bool) -> &mut Self {
        self.force = force;

        self
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn decide(&self, now: u64) -> Holdoff {
        let remaining = remaining_seconds(now, self.interval);

        // `remaining == holdoff` is still emitted
        if !self.force && remaining < self.holdoff {
            Holdoff::Pause(remaining)
        } else {
            Holdoff::Emit
        }
    }

    /// Sleeps on `clock` when needed, announcing the pause on `notice` first.
    /// Returns the decision that was taken.
    pub fn wait(&self, clock: &dyn Clock, notice: &mut dyn Write) -> io::Result<Holdoff> {
        let decision = self.decide(clock.now());

        match decision {
            Holdoff::Pause(seconds) => {
                tracing::debug!(seconds, holdoff = self.holdoff, "holding off for the next window");
                writeln!(notice, "{}", pause_notice(seconds))?;
                clock.sleep(seconds);
            }
            Holdoff::Emit => tracing::debug!(holdoff = self.holdoff, "emitting the current code"),
        }

        Ok(decision)
    }
}

/// The line shown while waiting for the next window.
pub fn pause_notice(seconds: u64) -> String {
    format!(
        "Short lived OTP. Holding off for {} second{}...",
        seconds,
        if seconds == 1 { "" } else { "s" }
    )
}
