//! Provider notifications recorded against bookings.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, MoneyCents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Succeeded,
    Failed,
}

impl PaymentOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PaymentRecord {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub provider_ref: String,
    pub amount: MoneyCents,
    pub currency: Currency,
    pub outcome: PaymentOutcome,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub booking_id: String,
    pub provider_ref: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id"
    )]
    Bookings,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PaymentRecord> for ActiveModel {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            id: ActiveValue::Set(record.id.to_string()),
            booking_id: ActiveValue::Set(record.booking_id.to_string()),
            provider_ref: ActiveValue::Set(record.provider_ref.clone()),
            amount_minor: ActiveValue::Set(record.amount.cents()),
            currency: ActiveValue::Set(record.currency.code().to_string()),
            status: ActiveValue::Set(record.outcome.as_str().to_string()),
            created_at: ActiveValue::Set(record.created_at),
        }
    }
}
