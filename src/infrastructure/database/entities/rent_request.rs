//! Rent request entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rent_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub property_id: Uuid,
    pub renter_id: Uuid,
    /// Denormalized from the property at creation
    pub owner_id: Uuid,

    pub check_in: Date,
    pub check_out: Date,

    /// Status: pending, confirmed, paid, completed, rejected, cancelled,
    /// cancelled_by_owner
    pub status: String,

    /// Decimal string, minor-unit exact
    pub rent_amount: String,
    /// Decimal string, minor-unit exact
    pub deposit_amount: String,
    /// Currency code (ISO 4217)
    pub currency: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id"
    )]
    Property,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RenterId",
        to = "super::user::Column::Id"
    )]
    Renter,
    #[sea_orm(has_many = "super::checkout::Entity")]
    Checkouts,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::checkout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Checkouts.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
