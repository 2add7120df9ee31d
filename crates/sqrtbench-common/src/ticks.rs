//! Timer tick values and interval arithmetic.
//!
//! The interval timer exposes every 32-bit quantity as two 16-bit halves.
//! [`compose_halves`] is the single place where the halves are put back together,
//! so the period and snapshot reads stay bit-identical.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Combine a high and low register read into one 32-bit value.
///
/// Only the low half is masked; the high half is shifted as read.
#[inline]
#[must_use]
pub const fn compose_halves(high: u32, low: u32) -> u32 {
    (high << 16) | (low & 0xFFFF)
}

/// A single snapshot of the free-running counter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TickCount(pub u32);

impl TickCount {
    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TickCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TickCount {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Full-scale period of the counter, captured once after the timer is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerPeriod(pub u32);

impl TimerPeriod {
    /// Raw period in ticks.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TimerPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ticks between two snapshots of a down-counting timer.
///
/// `before` is the earlier snapshot. When `before < after` the counter is assumed to
/// have reloaded exactly once; two or more reloads inside the interval are not
/// detected and yield a short reading.
#[inline]
#[must_use]
pub const fn elapsed_ticks(before: TickCount, after: TickCount, period: TimerPeriod) -> TickCount {
    if before.0 >= after.0 {
        TickCount(before.0 - after.0)
    } else {
        TickCount(before.0.wrapping_add(period.0).wrapping_sub(after.0))
    }
}

/// Convert a tick count into wall-clock time for a timer clocked at `clock_hz`.
///
/// Returns `None` when the clock frequency is unknown (zero).
#[must_use]
pub fn ticks_to_duration(ticks: TickCount, clock_hz: u64) -> Option<Duration> {
    if clock_hz == 0 {
        return None;
    }
    let nanos = u128::from(ticks.0) * 1_000_000_000 / u128::from(clock_hz);
    Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
}
