//! Checkout entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "checkouts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// 1:1 with the active rental (unique index)
    #[sea_orm(unique)]
    pub rent_request_id: Uuid,

    /// Kind: normal, early_release
    pub kind: String,

    /// Status: pending, confirmed, auto_confirmed, completed
    pub status: String,

    /// Owner confirmation: not_required, pending, confirmed, rejected,
    /// auto_confirmed
    pub owner_confirmation: String,

    #[sea_orm(nullable)]
    pub reason: Option<String>,

    #[sea_orm(nullable)]
    pub owner_notes: Option<String>,

    /// Decimal string in [0,100], set when resolved
    #[sea_orm(nullable)]
    pub deposit_return_percent: Option<String>,

    /// Decimal string, set when resolved
    #[sea_orm(nullable)]
    pub final_refund_amount: Option<String>,

    /// Decimal string, set when resolved
    #[sea_orm(nullable)]
    pub final_payout_amount: Option<String>,

    #[sea_orm(nullable)]
    pub refund_purchase_id: Option<Uuid>,

    #[sea_orm(nullable)]
    pub payout_purchase_id: Option<Uuid>,

    #[sea_orm(nullable)]
    pub transaction_ref: Option<String>,

    pub requested_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub resolved_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rent_request::Entity",
        from = "Column::RentRequestId",
        to = "super::rent_request::Column::Id"
    )]
    RentRequest,
    #[sea_orm(has_many = "super::agent_decision::Entity")]
    AgentDecisions,
}

impl Related<super::rent_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RentRequest.def()
    }
}

impl Related<super::agent_decision::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AgentDecisions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
