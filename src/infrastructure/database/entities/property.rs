//! Property entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub owner_id: Uuid,

    pub title: String,
    pub address: String,

    /// Decimal string, minor-unit exact
    pub rent_amount: String,
    /// Decimal string, minor-unit exact
    pub deposit_amount: String,
    /// Currency code (ISO 4217)
    pub currency: String,

    pub is_active: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::rent_request::Entity")]
    RentRequests,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::rent_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RentRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
