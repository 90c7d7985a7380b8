use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine};

const FULL_BPS: u32 = 10_000;

/// A percentage stored as basis points (`10%` = `1000`).
///
/// Commissions and percent coupons are expressed with this type so that the
/// share computation stays in integer arithmetic.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Percent(u32);

impl Percent {
    pub const ZERO: Percent = Percent(0);

    /// Builds a percent from basis points, rejecting values above 100%.
    pub fn from_bps(bps: u32) -> ResultEngine<Self> {
        if bps > FULL_BPS {
            return Err(EngineError::InvalidAmount(format!(
                "percent must be <= 100, got {}",
                Percent(bps)
            )));
        }
        Ok(Self(bps))
    }

    /// Builds a percent from a whole number (`10` = 10%).
    pub fn whole(percent: u32) -> ResultEngine<Self> {
        Self::from_bps(percent.saturating_mul(100))
    }

    #[must_use]
    pub const fn bps(self) -> u32 {
        self.0
    }

    /// `amount × self`, rounded to the minor unit.
    pub fn share_of(self, amount: MoneyCents) -> ResultEngine<MoneyCents> {
        amount.mul_ratio(i64::from(self.0), i64::from(FULL_BPS))
    }

    /// `amount × (1 − self)`, rounded to the minor unit.
    pub fn complement_of(self, amount: MoneyCents) -> ResultEngine<MoneyCents> {
        amount.mul_ratio(i64::from(FULL_BPS - self.0), i64::from(FULL_BPS))
    }
}

impl TryFrom<i32> for Percent {
    type Error = EngineError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let bps = u32::try_from(value)
            .map_err(|_| EngineError::InvalidAmount(format!("invalid percent: {value}")))?;
        Percent::from_bps(bps)
    }
}

impl From<Percent> for i32 {
    fn from(value: Percent) -> Self {
        // bounded by FULL_BPS
        value.0 as i32
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        match self.0 % 100 {
            0 => write!(f, "{whole}%"),
            frac if frac % 10 == 0 => write!(f, "{whole}.{}%", frac / 10),
            frac => write!(f, "{whole}.{frac:02}%"),
        }
    }
}

impl FromStr for Percent {
    type Err = EngineError;

    /// Parses `"10"`, `"12.5"` or `"7,25"` (an optional trailing `%` is accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%');
        let bps = crate::util::parse_hundredths(trimmed)?;
        let bps = u32::try_from(bps)
            .map_err(|_| EngineError::InvalidAmount(format!("invalid percent: {s}")))?;
        Percent::from_bps(bps)
    }
}
