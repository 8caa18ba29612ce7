//! Rational frame rates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{FrameError, FrameResult};

/// Microseconds per second.
pub const MICROS_PER_SECOND: u64 = 1_000_000;

/// A rate of `num / den` entries per second; one entry lasts `den / num`
/// seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rate {
    pub num: u64,
    pub den: u64,
}

impl Rate {
    /// Create a rate, rejecting zero terms.
    pub fn new(num: u64, den: u64) -> FrameResult<Self> {
        if num == 0 || den == 0 {
            return Err(FrameError::InvalidRate { num, den });
        }
        Ok(Self { num, den })
    }

    /// Integer rate `num:1`.
    pub const fn integer(num: u64) -> Self {
        Self { num, den: 1 }
    }

    /// A rate whose single entry lasts exactly `micros` microseconds.
    pub fn from_micros(micros: u64) -> FrameResult<Self> {
        Self::new(MICROS_PER_SECOND, micros)
    }

    /// Stretch one entry at this rate by `extra_micros`.
    ///
    /// `num:den` becomes `num*1e6 : den*1e6 + num*extra`, which lasts
    /// `den/num` seconds plus `extra_micros` microseconds.
    pub fn extended_by_micros(&self, extra_micros: u64) -> Self {
        Self {
            num: self.num * MICROS_PER_SECOND,
            den: self.den * MICROS_PER_SECOND + self.num * extra_micros,
        }
    }

    /// Whether the denominator is 1.
    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    /// Entry duration in microseconds, when it is a whole number.
    pub fn exact_duration_micros(&self) -> Option<u64> {
        let scaled = self.den.checked_mul(MICROS_PER_SECOND)?;
        (scaled % self.num == 0).then(|| scaled / self.num)
    }

    /// Entry duration in microseconds (for display).
    pub fn duration_micros(&self) -> f64 {
        self.den as f64 * MICROS_PER_SECOND as f64 / self.num as f64
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.num, self.den)
    }
}

impl FromStr for Rate {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (num, den) = s
            .split_once(':')
            .ok_or_else(|| FrameError::InvalidRateToken(s.to_string()))?;
        let num = parse_digits(num).ok_or_else(|| FrameError::InvalidRateToken(s.to_string()))?;
        let den = parse_digits(den).ok_or_else(|| FrameError::InvalidRateToken(s.to_string()))?;
        Rate::new(num, den)
    }
}

/// Parse a non-empty run of ASCII digits (no sign, no whitespace).
pub(crate) fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_terms() {
        assert!(Rate::new(0, 1).is_err());
        assert!(Rate::new(60, 0).is_err());
        assert!(Rate::from_micros(0).is_err());
    }

    #[test]
    fn from_micros_lasts_exactly() {
        let rate = Rate::from_micros(34_471).unwrap();
        assert_eq!(rate, Rate { num: 1_000_000, den: 34_471 });
        assert_eq!(rate.exact_duration_micros(), Some(34_471));
    }

    #[test]
    fn extension_adds_micros_to_frame() {
        // 60 fps stretched by 128us: 16666.67us + 128us
        let rate = Rate::integer(60).extended_by_micros(128);
        assert_eq!(rate, Rate { num: 60_000_000, den: 1_000_000 + 60 * 128 });

        let base = Rate::integer(50);
        assert_eq!(base.exact_duration_micros(), Some(20_000));
        assert_eq!(base.extended_by_micros(1_000).exact_duration_micros(), Some(21_000));
    }

    #[test]
    fn zero_extension_keeps_duration() {
        let rate = Rate::integer(30).extended_by_micros(0);
        assert!((rate.duration_micros() - Rate::integer(30).duration_micros()).abs() < 1e-9);
    }

    #[test]
    fn parses_and_displays() {
        let rate: Rate = "60:1".parse().unwrap();
        assert_eq!(rate, Rate::integer(60));
        assert_eq!(rate.to_string(), "60:1");

        assert!("60".parse::<Rate>().is_err());
        assert!("-60:1".parse::<Rate>().is_err());
        assert!("60: 1".parse::<Rate>().is_err());
    }
}
