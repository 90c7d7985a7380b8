//! Booking records.
//!
//! A booking is created by the reservation path, mutated by the lifecycle
//! operations and the reconciler, and never deleted.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BookingStatus, Currency, EngineError, MoneyCents, PaymentMethod, PaymentStatus, UnitRef,
    util::{model_currency, parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: i64,
    pub unit: UnitRef,
    /// Staff member who handled the booking, if any.
    pub staff_id: Option<Uuid>,
    pub date: NaiveDate,
    /// `None` for daily bookings.
    pub start_time: Option<NaiveTime>,
    /// Minutes for hourly bookings, days for daily ones.
    pub duration: i64,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub quantity: i64,
    pub amount: MoneyCents,
    pub currency: Currency,
    pub status: BookingStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub coupon_code: Option<String>,
    pub partner_credited: bool,
    pub staff_credited: bool,
    pub payment_deadline: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: i64,
    pub board_id: Option<String>,
    pub daily_offer_id: Option<String>,
    pub staff_id: Option<String>,
    pub date: Date,
    pub start_time: Option<Time>,
    pub duration: i32,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub quantity: i32,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub coupon_code: Option<String>,
    pub partner_credited: bool,
    pub staff_credited: bool,
    pub payment_deadline: Option<NaiveDateTime>,
    pub created_at: DateTimeUtc,
    pub started_at: Option<DateTimeUtc>,
    pub ended_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn unit_from_model(model: &Model) -> Result<UnitRef, EngineError> {
    match (model.board_id.as_deref(), model.daily_offer_id.as_deref()) {
        (Some(board), None) => Ok(UnitRef::Board {
            board_id: parse_uuid(board, "board")?,
        }),
        (None, Some(offer)) => Ok(UnitRef::Daily {
            offer_id: parse_uuid(offer, "daily offer")?,
        }),
        _ => Err(EngineError::InvalidId(format!(
            "booking {} must reference exactly one unit",
            model.id
        ))),
    }
}

impl TryFrom<Model> for Booking {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let unit = unit_from_model(&model)?;
        Ok(Self {
            id: parse_uuid(&model.id, "booking")?,
            user_id: model.user_id,
            unit,
            staff_id: parse_optional_uuid(model.staff_id.as_deref(), "staff")?,
            date: model.date,
            start_time: model.start_time,
            duration: i64::from(model.duration),
            window_start: model.window_start,
            window_end: model.window_end,
            quantity: i64::from(model.quantity),
            amount: MoneyCents::new(model.amount_minor),
            currency: model_currency(&model.currency)?,
            status: BookingStatus::try_from(model.status.as_str())?,
            payment_method: PaymentMethod::try_from(model.payment_method.as_str())?,
            payment_status: PaymentStatus::try_from(model.payment_status.as_str())?,
            coupon_code: model.coupon_code,
            partner_credited: model.partner_credited,
            staff_credited: model.staff_credited,
            payment_deadline: model.payment_deadline,
            created_at: model.created_at,
            started_at: model.started_at,
            ended_at: model.ended_at,
        })
    }
}
