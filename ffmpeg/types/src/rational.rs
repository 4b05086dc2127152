/*!
    Rational number type for time bases and frame rates.
*/

use std::fmt;

/**
    A rational number represented as a numerator and denominator.

    Used for time bases (e.g., 1/90000 for MPEG-TS) and frame rates
    (e.g., 24000/1001 for 23.976 fps).

    A zero denominator is allowed, since FFmpeg reports unknown frame
    rates as `0/0`. Such values convert to `0.0` instead of faulting.
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    /**
        The internal FFmpeg time base, one microsecond (`AV_TIME_BASE_Q`).
    */
    pub const TIME_BASE: Self = Self::new(1, 1_000_000);

    /**
        Create a new rational number.
    */
    #[inline]
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /**
        Convert to f64.

        Returns `0.0` when the denominator is zero.
    */
    #[inline]
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            return 0.0;
        }
        self.num as f64 / self.den as f64
    }

    /**
        Returns true if both parts are non-zero.
    */
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.num != 0 && self.den != 0
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl From<(i32, i32)> for Rational {
    fn from((num, den): (i32, i32)) -> Self {
        Self::new(num, den)
    }
}

impl From<i32> for Rational {
    fn from(num: i32) -> Self {
        Self::new(num, 1)
    }
}
