//! The time window that defines which posts are new.

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

/// Rejected window parameters.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WindowError {
    #[error("window start {start} is after its end {end}")]
    Inverted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("window step must be positive, got {0}")]
    NonPositiveStep(TimeDelta),

    #[error("window bound {base} shifted by {delta} is out of range")]
    OutOfRange {
        base: DateTime<Utc>,
        delta: TimeDelta,
    },
}

/// Inclusive `[start, end]` range of post times considered unseen.
///
/// Only the poll cycle owner mutates it, through [`TimeWindow::advance`],
/// once per completed cycle. Readers take a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: TimeDelta,
}

impl TimeWindow {
    /// Create a window, checking `start <= end` and `step > 0`.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: TimeDelta,
    ) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::Inverted { start, end });
        }
        if step <= TimeDelta::zero() {
            return Err(WindowError::NonPositiveStep(step));
        }
        Ok(Self { start, end, step })
    }

    /// The startup window: `[now - look_back, now]`.
    pub fn looking_back(
        now: DateTime<Utc>,
        look_back: TimeDelta,
        step: TimeDelta,
    ) -> Result<Self, WindowError> {
        let start = now
            .checked_sub_signed(look_back)
            .ok_or(WindowError::OutOfRange {
                base: now,
                delta: -look_back,
            })?;
        Self::new(start, now, step)
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub const fn step(&self) -> TimeDelta {
        self.step
    }

    /// Whether `t` lies within `[start, end]`.
    #[must_use]
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    /// Whether `t` is at or before the start, i.e. already covered by an
    /// earlier cycle.
    #[must_use]
    pub fn is_seen(&self, t: DateTime<Utc>) -> bool {
        t <= self.start
    }

    /// Move to the next window: `[end, end + step]`.
    ///
    /// On overflow the window is left unchanged.
    pub fn advance(&mut self) -> Result<(), WindowError> {
        let next_end = self
            .end
            .checked_add_signed(self.step)
            .ok_or(WindowError::OutOfRange {
                base: self.end,
                delta: self.step,
            })?;
        self.start = self.end;
        self.end = next_end;
        Ok(())
    }
}
