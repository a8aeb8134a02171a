use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::foundation::error::{StrataError, StrataResult};

/// Ticks per second for [`MediaTime`].
pub const TIMESCALE: i64 = 600;

/// A timeline instant in integer ticks (1/600 s).
///
/// Integer ticks keep breakpoint dedupe and range matching exact. On the wire a
/// `MediaTime` is a number of seconds, rounded to the nearest tick when read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaTime(pub i64);

impl MediaTime {
    /// Time zero.
    pub const ZERO: Self = Self(0);

    /// Convert seconds to ticks, rounding to the nearest tick.
    ///
    /// Non-finite input maps to zero; use [`MediaTime::try_from_secs`] to reject it.
    pub fn from_secs(secs: f64) -> Self {
        Self::try_from_secs(secs).unwrap_or(Self::ZERO)
    }

    /// Convert seconds to ticks, rejecting non-finite input.
    pub fn try_from_secs(secs: f64) -> StrataResult<Self> {
        if !secs.is_finite() {
            return Err(StrataError::validation(format!(
                "time value must be finite, got {secs}"
            )));
        }
        Ok(Self((secs * TIMESCALE as f64).round() as i64))
    }

    /// Construct from raw ticks.
    pub fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Raw tick count.
    pub fn ticks(self) -> i64 {
        self.0
    }

    /// Value in seconds.
    pub fn as_secs(self) -> f64 {
        self.0 as f64 / TIMESCALE as f64
    }

    /// `true` when strictly greater than zero.
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Add for MediaTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for MediaTime {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for MediaTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for MediaTime {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for MediaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.as_secs())
    }
}

impl serde::Serialize for MediaTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_secs())
    }
}

impl<'de> serde::Deserialize<'de> for MediaTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Self::try_from_secs(secs).map_err(serde::de::Error::custom)
    }
}

/// Half-open time range `[start, end)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TimeRange {
    pub start: MediaTime,
    pub end: MediaTime, // exclusive
}

impl TimeRange {
    pub fn new(start: MediaTime, end: MediaTime) -> StrataResult<Self> {
        if start > end {
            return Err(StrataError::validation("TimeRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Range starting at `start` lasting `duration` (negative durations collapse to empty).
    pub fn from_duration(start: MediaTime, duration: MediaTime) -> Self {
        let end = start + duration;
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Range from seconds; convenience for builders and tests.
    pub fn from_secs(start: f64, end: f64) -> StrataResult<Self> {
        Self::new(
            MediaTime::try_from_secs(start)?,
            MediaTime::try_from_secs(end)?,
        )
    }

    pub fn duration(self) -> MediaTime {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }

    pub fn contains(self, t: MediaTime) -> bool {
        self.start <= t && t < self.end
    }

    /// `true` when `other` lies entirely within `self`.
    pub fn contains_range(self, other: TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Non-empty overlap of two ranges.
    pub fn intersection(self, other: TimeRange) -> Option<TimeRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(TimeRange { start, end })
    }

    pub fn intersects(self, other: TimeRange) -> bool {
        self.intersection(other).is_some()
    }

    /// Smallest range covering both inputs.
    pub fn hull(self, other: TimeRange) -> TimeRange {
        TimeRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn shift(self, delta: MediaTime) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}  ({})", self.start, self.end, self.duration())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/time.rs"]
mod tests;
