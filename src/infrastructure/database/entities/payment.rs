//! Payment entity
//!
//! The idempotency ledger: `(rent_request_id, idempotency_key)` is unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub rent_request_id: Uuid,

    pub idempotency_key: String,

    /// Decimal string, minor-unit exact
    pub amount: String,
    /// Currency code (ISO 4217)
    pub currency: String,

    /// External gateway reference
    pub transaction_ref: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rent_request::Entity",
        from = "Column::RentRequestId",
        to = "super::rent_request::Column::Id"
    )]
    RentRequest,
}

impl Related<super::rent_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RentRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
