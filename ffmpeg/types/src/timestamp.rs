/*!
    Timestamp types for media timing.
*/

use std::time::Duration;

use crate::Rational;

/**
    The raw value FFmpeg uses for "no timestamp" (`AV_NOPTS_VALUE`).
*/
pub const NOPTS_VALUE: i64 = i64::MIN;

/**
    Presentation timestamp in time_base units.

    This is the raw timestamp value from the media stream. To convert to
    a meaningful duration, you need the stream's time base.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub i64);

impl Pts {
    /**
        Wrap a raw FFmpeg timestamp, mapping `AV_NOPTS_VALUE` to `None`.
    */
    #[inline]
    pub const fn from_raw(raw: i64) -> Option<Self> {
        if raw == NOPTS_VALUE {
            None
        } else {
            Some(Self(raw))
        }
    }

    /**
        Unwrap an optional timestamp into the raw FFmpeg representation.
    */
    #[inline]
    pub const fn into_raw(pts: Option<Self>) -> i64 {
        match pts {
            Some(pts) => pts.0,
            None => NOPTS_VALUE,
        }
    }

    /**
        Convert this PTS to a Duration using the given time base.

        Negative PTS values are clamped to zero.
    */
    #[inline]
    pub fn to_duration(self, time_base: Rational) -> Duration {
        if self.0 <= 0 {
            return Duration::ZERO;
        }
        let seconds = self.0 as f64 * time_base.to_f64();
        Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX)
    }

    /**
        Create a PTS from a Duration using the given time base.
    */
    #[inline]
    pub fn from_duration(duration: Duration, time_base: Rational) -> Self {
        let tb = time_base.to_f64();
        if tb == 0.0 {
            return Self(0);
        }
        let pts = (duration.as_secs_f64() / tb).round() as i64;
        Self(pts)
    }
}

impl From<i64> for Pts {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Pts> for i64 {
    fn from(pts: Pts) -> Self {
        pts.0
    }
}

/**
    Duration in time_base units.

    Similar to Pts but semantically represents a duration rather than a point in time.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MediaDuration(pub i64);

impl MediaDuration {
    /**
        Convert this duration to a std Duration using the given time base.

        Negative values are clamped to zero.
    */
    #[inline]
    pub fn to_duration(self, time_base: Rational) -> Duration {
        if self.0 <= 0 {
            return Duration::ZERO;
        }
        let seconds = self.0 as f64 * time_base.to_f64();
        Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX)
    }
}

impl From<i64> for MediaDuration {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MediaDuration> for i64 {
    fn from(duration: MediaDuration) -> Self {
        duration.0
    }
}
