use std::{
    fmt,
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, util};

/// Money amount represented as **integer minor units** (kopecks).
///
/// Every price, booking amount, ledger entry and withdrawal goes through this
/// type to avoid floating-point drift.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(900_00);
/// assert_eq!(amount.cents(), 90000);
/// assert_eq!(amount.to_string(), "900.00₽");
/// ```
///
/// Parsing from operator input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("500".parse::<MoneyCents>().unwrap().cents(), 50000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Multiplies by a ratio `num / den`, rounding half away from zero.
    ///
    /// Used for per-minute pricing and multiplier adjustments, where the
    /// intermediate product may not fit in `i64`.
    pub fn mul_ratio(self, num: i64, den: i64) -> ResultEngine<MoneyCents> {
        if den <= 0 {
            return Err(EngineError::InvalidAmount(
                "ratio denominator must be > 0".to_string(),
            ));
        }
        let scaled = util::div_round(i128::from(self.0) * i128::from(num), i128::from(den));
        util::to_minor(scaled).map(MoneyCents)
    }

    /// Subtraction clamped at zero.
    #[must_use]
    pub fn saturating_sub_to_zero(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents((self.0 - rhs.0).max(0))
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}₽", abs / 100, abs % 100)
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a non-negative decimal string into minor units.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        util::parse_hundredths(s).map(MoneyCents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_rub() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00₽");
        assert_eq!(MoneyCents::new(5).to_string(), "0.05₽");
        assert_eq!(MoneyCents::new(90000).to_string(), "900.00₽");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50₽");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
        assert!("-1".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn mul_ratio_rounds_half_away_from_zero() {
        let price = MoneyCents::new(333);
        assert_eq!(price.mul_ratio(1, 2).unwrap().cents(), 167);
        assert_eq!(price.mul_ratio(90, 60).unwrap().cents(), 500);
        assert!(price.mul_ratio(1, 0).is_err());
    }

    #[test]
    fn saturating_sub_never_goes_negative() {
        let a = MoneyCents::new(100);
        assert_eq!(a.saturating_sub_to_zero(MoneyCents::new(250)), MoneyCents::ZERO);
        assert_eq!(a.saturating_sub_to_zero(MoneyCents::new(40)).cents(), 60);
    }
}
