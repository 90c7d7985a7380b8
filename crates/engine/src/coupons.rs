//! Discount coupons.
//!
//! A coupon is applied after dynamic pricing. Its `used` counter only moves
//! when a booking carrying it is actually paid.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, Percent, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Discount {
    Percent(Percent),
    Fixed(MoneyCents),
}

impl Discount {
    fn kind_str(self) -> &'static str {
        match self {
            Self::Percent(_) => "percent",
            Self::Fixed(_) => "fixed",
        }
    }

    fn raw_value(self) -> i64 {
        match self {
            Self::Percent(pct) => i64::from(pct.bps()),
            Self::Fixed(amount) => amount.cents(),
        }
    }

    fn from_parts(kind: &str, value: i64) -> ResultEngine<Self> {
        match kind {
            "percent" => {
                let bps = u32::try_from(value).map_err(|_| {
                    EngineError::InvalidAmount(format!("invalid percent coupon value: {value}"))
                })?;
                Ok(Self::Percent(Percent::from_bps(bps)?))
            }
            "fixed" => Ok(Self::Fixed(MoneyCents::new(value))),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid coupon kind: {other}"
            ))),
        }
    }

    /// Applies the discount, never going below zero.
    pub fn apply(self, amount: MoneyCents) -> ResultEngine<MoneyCents> {
        match self {
            Self::Percent(pct) => Ok(pct.complement_of(amount)?.max(MoneyCents::ZERO)),
            Self::Fixed(off) => Ok(amount.saturating_sub_to_zero(off)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub discount: Discount,
    pub max_uses: Option<i64>,
    pub used: i64,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// Whether the coupon can discount a quote made on `today` (local date).
    #[must_use]
    pub fn is_applicable(&self, today: NaiveDate) -> bool {
        if !self.active {
            return false;
        }
        if self.valid_from.is_some_and(|from| today < from) {
            return false;
        }
        if self.valid_to.is_some_and(|to| today > to) {
            return false;
        }
        !self.max_uses.is_some_and(|cap| cap > 0 && self.used >= cap)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub kind: String,
    pub value: i64,
    pub max_uses: Option<i32>,
    pub used: i32,
    pub valid_from: Option<Date>,
    pub valid_to: Option<Date>,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Coupon> for ActiveModel {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: ActiveValue::Set(coupon.id.to_string()),
            code: ActiveValue::Set(coupon.code.clone()),
            kind: ActiveValue::Set(coupon.discount.kind_str().to_string()),
            value: ActiveValue::Set(coupon.discount.raw_value()),
            max_uses: ActiveValue::Set(coupon.max_uses.and_then(|v| i32::try_from(v).ok())),
            used: ActiveValue::Set(i32::try_from(coupon.used).unwrap_or(i32::MAX)),
            valid_from: ActiveValue::Set(coupon.valid_from),
            valid_to: ActiveValue::Set(coupon.valid_to),
            active: ActiveValue::Set(coupon.active),
            created_at: ActiveValue::Set(coupon.created_at),
        }
    }
}

impl TryFrom<Model> for Coupon {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "coupon")?,
            code: model.code,
            discount: Discount::from_parts(&model.kind, model.value)?,
            max_uses: model.max_uses.map(i64::from),
            used: i64::from(model.used),
            valid_from: model.valid_from,
            valid_to: model.valid_to,
            active: model.active,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn coupon(discount: Discount) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "SUMMER".to_string(),
            discount,
            max_uses: Some(2),
            used: 0,
            valid_from: NaiveDate::from_ymd_opt(2026, 6, 1),
            valid_to: NaiveDate::from_ymd_opt(2026, 8, 31),
            active: true,
            created_at: Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn percent_and_fixed_never_go_negative() {
        let pct = Discount::Percent(Percent::whole(20).unwrap());
        assert_eq!(pct.apply(MoneyCents::new(1000_00)).unwrap().cents(), 800_00);

        let fixed = Discount::Fixed(MoneyCents::new(300_00));
        assert_eq!(fixed.apply(MoneyCents::new(1000_00)).unwrap().cents(), 700_00);
        assert_eq!(fixed.apply(MoneyCents::new(100_00)).unwrap(), MoneyCents::ZERO);
    }

    #[test]
    fn applicability_window_and_cap() {
        let mut c = coupon(Discount::Fixed(MoneyCents::new(100)));
        let july = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        assert!(c.is_applicable(july));
        assert!(!c.is_applicable(NaiveDate::from_ymd_opt(2026, 5, 31).unwrap()));
        assert!(!c.is_applicable(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()));

        c.used = 2;
        assert!(!c.is_applicable(july));

        c.used = 0;
        c.active = false;
        assert!(!c.is_applicable(july));
    }
}
