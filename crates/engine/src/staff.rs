//! Staff members act on a partner's behalf and earn their own commission.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Percent, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub name: String,
    pub commission: Percent,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl StaffMember {
    pub fn new(
        partner_id: Uuid,
        name: String,
        commission: Percent,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            partner_id,
            name,
            commission,
            active: true,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub partner_id: String,
    pub name: String,
    pub commission_bps: i32,
    pub active: bool,
    pub created_at: DateTimeUtc,
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

impl From<&StaffMember> for ActiveModel {
    fn from(member: &StaffMember) -> Self {
        Self {
            id: ActiveValue::Set(member.id.to_string()),
            partner_id: ActiveValue::Set(member.partner_id.to_string()),
            name: ActiveValue::Set(member.name.clone()),
            commission_bps: ActiveValue::Set(i32::from(member.commission)),
            active: ActiveValue::Set(member.active),
            created_at: ActiveValue::Set(member.created_at),
        }
    }
}

impl TryFrom<Model> for StaffMember {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "staff")?,
            partner_id: parse_uuid(&model.partner_id, "partner")?,
            name: model.name,
            commission: Percent::try_from(model.commission_bps)?,
            active: model.active,
            created_at: model.created_at,
        })
    }
}
