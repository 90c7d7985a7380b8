//! Partner payout requests.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawStatus {
    Pending,
    Approved,
    Rejected,
}

impl WithdrawStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for WithdrawStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidId(format!(
                "invalid withdraw status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub amount: MoneyCents,
    pub status: WithdrawStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl WithdrawRequest {
    pub fn new(partner_id: Uuid, amount: MoneyCents, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            partner_id,
            amount,
            status: WithdrawStatus::Pending,
            created_at,
            resolved_at: None,
        }
    }
}

/// Narrows [`Engine::withdrawals`](crate::Engine::withdrawals).
#[derive(Clone, Debug, Default)]
pub struct WithdrawFilter {
    pub partner_id: Option<Uuid>,
    pub status: Option<WithdrawStatus>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "withdraw_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub partner_id: String,
    pub amount_minor: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub resolved_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::partners::Entity",
        from = "Column::PartnerId",
        to = "super::partners::Column::Id"
    )]
    Partners,
}

impl Related<super::partners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partners.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&WithdrawRequest> for ActiveModel {
    fn from(request: &WithdrawRequest) -> Self {
        Self {
            id: ActiveValue::Set(request.id.to_string()),
            partner_id: ActiveValue::Set(request.partner_id.to_string()),
            amount_minor: ActiveValue::Set(request.amount.cents()),
            status: ActiveValue::Set(request.status.as_str().to_string()),
            created_at: ActiveValue::Set(request.created_at),
            resolved_at: ActiveValue::Set(request.resolved_at),
        }
    }
}

impl TryFrom<Model> for WithdrawRequest {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "withdraw request")?,
            partner_id: parse_uuid(&model.partner_id, "partner")?,
            amount: MoneyCents::new(model.amount_minor),
            status: WithdrawStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            resolved_at: model.resolved_at,
        })
    }
}
