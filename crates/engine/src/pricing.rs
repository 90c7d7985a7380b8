//! Deterministic price computation.
//!
//! Prices depend only on the unit's base rate, the requested window, the
//! quantity and the occupancy already reserved for that window. Coupons are
//! applied afterwards by the engine.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine, Window};

const UNIT_BPS: i64 = 10_000;
const PEAK_BPS: i64 = 11_500;
const OFF_PEAK_BPS: i64 = 9_000;
const CONGESTION_BPS: i64 = 11_000;

/// Occupancy strictly above this share of capacity triggers the congestion surcharge.
const CONGESTION_NUM: i64 = 6;
const CONGESTION_DEN: i64 = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Amount after dynamic pricing, before any coupon.
    pub base_amount: MoneyCents,
    /// Amount the customer pays.
    pub amount: MoneyCents,
    /// Coupon code that was actually applied.
    pub coupon: Option<String>,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekend late-afternoon/evening is peak, weekday early morning is off-peak.
pub(crate) fn time_multiplier_bps(date: NaiveDate, start_hour: u32) -> i64 {
    if is_weekend(date) {
        if (16..=21).contains(&start_hour) {
            return PEAK_BPS;
        }
    } else if (7..=10).contains(&start_hour) {
        return OFF_PEAK_BPS;
    }
    UNIT_BPS
}

pub(crate) fn occupancy_multiplier_bps(used: i64, capacity: i64) -> i64 {
    let capacity = capacity.max(1);
    let used = used.clamp(0, capacity);
    if used * CONGESTION_DEN > capacity * CONGESTION_NUM {
        CONGESTION_BPS
    } else {
        UNIT_BPS
    }
}

/// Dynamic amount for a window before coupons.
///
/// Hourly: the hourly rate is adjusted and rounded to the minor unit, then
/// multiplied by `minutes / 60 × quantity`. Daily: `rate × days × quantity`.
pub fn window_amount(
    rate: MoneyCents,
    window: &Window,
    used: i64,
    capacity: i64,
    quantity: i64,
) -> ResultEngine<MoneyCents> {
    if quantity <= 0 {
        return Err(EngineError::InvalidQuantity(format!(
            "quantity must be > 0, got {quantity}"
        )));
    }
    match window {
        Window::Hourly { date, minutes, .. } => {
            let multiplier =
                time_multiplier_bps(*date, window.start_hour()) * occupancy_multiplier_bps(used, capacity);
            let hourly = rate.mul_ratio(multiplier, UNIT_BPS * UNIT_BPS)?;
            let units = minutes
                .checked_mul(quantity)
                .ok_or_else(|| EngineError::InvalidAmount("duration too large".to_string()))?;
            hourly.mul_ratio(units, 60)
        }
        Window::Daily { days, .. } => {
            let units = days
                .checked_mul(quantity)
                .ok_or_else(|| EngineError::InvalidAmount("duration too large".to_string()))?;
            rate.mul_ratio(units, 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;

    // 2026-10-17 is a Saturday, 2026-10-19 a Monday.
    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn hourly(date: NaiveDate, hour: u32, minutes: i64) -> Window {
        Window::hourly(date, NaiveTime::from_hms_opt(hour, 0, 0).unwrap(), minutes)
    }

    const RATE: MoneyCents = MoneyCents::new(1000_00);

    #[test]
    fn flat_rate_outside_adjusted_slots() {
        let amount = window_amount(RATE, &hourly(monday(), 12, 120), 0, 5, 2).unwrap();
        assert_eq!(amount, MoneyCents::new(4000_00));
    }

    #[test]
    fn weekend_evening_is_peak() {
        let amount = window_amount(RATE, &hourly(saturday(), 18, 60), 0, 5, 1).unwrap();
        assert_eq!(amount, MoneyCents::new(1150_00));
        // morning on a weekend is not discounted
        let amount = window_amount(RATE, &hourly(saturday(), 8, 60), 0, 5, 1).unwrap();
        assert_eq!(amount, RATE);
    }

    #[test]
    fn weekday_morning_is_off_peak() {
        let amount = window_amount(RATE, &hourly(monday(), 9, 60), 0, 5, 1).unwrap();
        assert_eq!(amount, MoneyCents::new(900_00));
    }

    #[test]
    fn congestion_surcharge_above_sixty_percent() {
        // 3 of 5 is exactly 60%: no surcharge
        let amount = window_amount(RATE, &hourly(monday(), 12, 60), 3, 5, 1).unwrap();
        assert_eq!(amount, RATE);
        let amount = window_amount(RATE, &hourly(monday(), 12, 60), 4, 5, 1).unwrap();
        assert_eq!(amount, MoneyCents::new(1100_00));
        let amount = window_amount(RATE, &hourly(saturday(), 17, 60), 4, 5, 1).unwrap();
        assert_eq!(amount, MoneyCents::new(1265_00));
    }

    #[test]
    fn partial_hours_are_prorated() {
        let amount = window_amount(RATE, &hourly(monday(), 12, 90), 0, 5, 1).unwrap();
        assert_eq!(amount, MoneyCents::new(1500_00));
    }

    #[test]
    fn daily_ignores_dynamic_rules() {
        let amount =
            window_amount(MoneyCents::new(2500_00), &Window::daily(saturday(), 3), 4, 5, 1).unwrap();
        assert_eq!(amount, MoneyCents::new(7500_00));
    }

    #[test]
    fn rejects_non_positive_quantity() {
        assert!(matches!(
            window_amount(RATE, &hourly(monday(), 12, 60), 0, 5, 0),
            Err(EngineError::InvalidQuantity(_))
        ));
    }
}
