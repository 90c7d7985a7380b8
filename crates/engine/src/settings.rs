//! Marketplace policy knobs the engine is built with.

use chrono::Duration;
use chrono_tz::Tz;

use crate::{Currency, EngineError, MoneyCents, Percent, ResultEngine};

#[derive(Clone, Debug)]
pub struct EngineSettings {
    /// First bookable hour of the day (inclusive).
    pub work_hours_start: u32,
    /// Hour by which every hourly booking must end.
    pub work_hours_end: u32,
    /// Zone in which booking dates and times are expressed.
    pub timezone: Tz,
    pub currency: Currency,
    /// Used when neither the partner nor the platform settings table override it.
    pub platform_commission: Percent,
    /// Commission assigned to newly added staff when none is given.
    pub staff_commission: Percent,
    /// Online bookings left unpaid this long are canceled by the reconciler.
    pub payment_timeout: Option<Duration>,
    pub min_withdrawal: MoneyCents,
    pub withdrawal_cooldown: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            work_hours_start: 8,
            work_hours_end: 22,
            timezone: chrono_tz::Europe::Moscow,
            currency: Currency::Rub,
            platform_commission: Percent::from_bps(1_000).unwrap_or_default(),
            staff_commission: Percent::from_bps(3_000).unwrap_or_default(),
            payment_timeout: Some(Duration::minutes(30)),
            min_withdrawal: MoneyCents::new(500_00),
            withdrawal_cooldown: Duration::hours(24),
        }
    }
}

impl EngineSettings {
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.work_hours_start >= self.work_hours_end || self.work_hours_end > 24 {
            return Err(EngineError::OutsideHours(format!(
                "invalid work hours {}..{}",
                self.work_hours_start, self.work_hours_end
            )));
        }
        if self.payment_timeout.is_some_and(|t| t <= Duration::zero()) {
            return Err(EngineError::InvalidAmount(
                "payment timeout must be positive".to_string(),
            ));
        }
        if !self.min_withdrawal.is_positive() {
            return Err(EngineError::InvalidAmount(
                "minimum withdrawal must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
