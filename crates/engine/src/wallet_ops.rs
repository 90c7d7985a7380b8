//! Ledger entries.
//!
//! A [`WalletOp`] is a single credit or debit in the append-only journal of a
//! partner or a staff member. Balances are never stored: they are the sum of
//! credits minus the sum of debits for one [`WalletOwner`].

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine,
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum OwnerKind {
    Partner,
    Staff,
}

impl OwnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Partner => "partner",
            Self::Staff => "staff",
        }
    }
}

impl TryFrom<&str> for OwnerKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "partner" => Ok(Self::Partner),
            "staff" => Ok(Self::Staff),
            other => Err(EngineError::InvalidId(format!(
                "invalid wallet owner kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "owner", rename_all = "snake_case")]
pub enum WalletOwner {
    Partner { partner_id: Uuid },
    Staff { staff_id: Uuid },
}

impl WalletOwner {
    #[must_use]
    pub fn partner(partner_id: Uuid) -> Self {
        Self::Partner { partner_id }
    }

    #[must_use]
    pub fn staff(staff_id: Uuid) -> Self {
        Self::Staff { staff_id }
    }

    pub(crate) fn kind(self) -> OwnerKind {
        match self {
            Self::Partner { .. } => OwnerKind::Partner,
            Self::Staff { .. } => OwnerKind::Staff,
        }
    }

    pub(crate) fn id(self) -> Uuid {
        match self {
            Self::Partner { partner_id } => partner_id,
            Self::Staff { staff_id } => staff_id,
        }
    }

    fn from_parts(kind: &str, id: &str) -> ResultEngine<Self> {
        match OwnerKind::try_from(kind)? {
            OwnerKind::Partner => Ok(Self::partner(parse_uuid(id, "partner")?)),
            OwnerKind::Staff => Ok(Self::staff(parse_uuid(id, "staff")?)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Credit,
    Debit,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl TryFrom<&str> for OpKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(EngineError::InvalidId(format!(
                "invalid wallet op kind: {other}"
            ))),
        }
    }
}

/// Source tag of a ledger entry.
pub mod source {
    pub const BOOKING_COMPLETED: &str = "booking_completed";
    pub const STAFF_COMMISSION: &str = "staff_commission";
    pub const WITHDRAW: &str = "withdraw";
    pub const MANUAL: &str = "manual";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletOp {
    pub id: Uuid,
    pub owner: WalletOwner,
    pub booking_id: Option<Uuid>,
    pub kind: OpKind,
    /// Always positive; the direction is carried by `kind`.
    pub amount: MoneyCents,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl WalletOp {
    pub fn new(
        owner: WalletOwner,
        kind: OpKind,
        amount: MoneyCents,
        source: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "ledger amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner,
            booking_id: None,
            kind,
            amount,
            source: source.into(),
            created_at,
        })
    }

    #[must_use]
    pub fn for_booking(mut self, booking_id: Uuid) -> Self {
        self.booking_id = Some(booking_id);
        self
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "wallet_ops")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_kind: String,
    pub owner_id: String,
    pub booking_id: Option<String>,
    pub kind: String,
    pub amount_minor: i64,
    pub source: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&WalletOp> for ActiveModel {
    fn from(op: &WalletOp) -> Self {
        Self {
            id: ActiveValue::Set(op.id.to_string()),
            owner_kind: ActiveValue::Set(op.owner.kind().as_str().to_string()),
            owner_id: ActiveValue::Set(op.owner.id().to_string()),
            booking_id: ActiveValue::Set(op.booking_id.map(|id| id.to_string())),
            kind: ActiveValue::Set(op.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(op.amount.cents()),
            source: ActiveValue::Set(op.source.clone()),
            created_at: ActiveValue::Set(op.created_at),
        }
    }
}

impl TryFrom<Model> for WalletOp {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "wallet op")?,
            owner: WalletOwner::from_parts(&model.owner_kind, &model.owner_id)?,
            booking_id: parse_optional_uuid(model.booking_id.as_deref(), "booking")?,
            kind: OpKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            source: model.source,
            created_at: model.created_at,
        })
    }
}
