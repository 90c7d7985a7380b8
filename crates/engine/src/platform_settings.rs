//! Runtime-tunable platform values stored as key/value rows.

use sea_orm::entity::prelude::*;

pub(crate) const PLATFORM_COMMISSION_BPS: &str = "platform_commission_bps";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "platform_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
