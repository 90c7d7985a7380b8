//! Partners own units and receive a revenue share on paid bookings.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Percent, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    /// Overrides the platform commission when set.
    pub commission: Option<Percent>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Partner {
    pub fn new(name: String, commission: Option<Percent>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            commission,
            active: true,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "partners")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub commission_bps: Option<i32>,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::boards::Entity")]
    Boards,
    #[sea_orm(has_many = "super::daily_offers::Entity")]
    DailyOffers,
    #[sea_orm(has_many = "super::staff::Entity")]
    Staff,
}

impl Related<super::boards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Boards.def()
    }
}

impl Related<super::daily_offers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyOffers.def()
    }
}

impl Related<super::staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Partner> for ActiveModel {
    fn from(partner: &Partner) -> Self {
        Self {
            id: ActiveValue::Set(partner.id.to_string()),
            name: ActiveValue::Set(partner.name.clone()),
            commission_bps: ActiveValue::Set(partner.commission.map(i32::from)),
            active: ActiveValue::Set(partner.active),
            created_at: ActiveValue::Set(partner.created_at),
        }
    }
}

impl TryFrom<Model> for Partner {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "partner")?,
            name: model.name,
            commission: model.commission_bps.map(Percent::try_from).transpose()?,
            active: model.active,
            created_at: model.created_at,
        })
    }
}
