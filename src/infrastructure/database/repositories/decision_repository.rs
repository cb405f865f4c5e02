//! SeaORM implementation of AgentDecisionRepository
//!
//! Decisions are inserted inside the settlement transaction (see the
//! checkout repository); this repository only reads them.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use super::{db_err, parse_amount};
use crate::domain::checkout::{AgentDecision, AgentDecisionRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::agent_decision;

pub struct SeaOrmAgentDecisionRepository {
    db: DatabaseConnection,
}

impl SeaOrmAgentDecisionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: agent_decision::Model) -> AgentDecision {
    AgentDecision {
        id: m.id,
        checkout_id: m.checkout_id,
        decided_by: m.decided_by,
        decided_at: m.decided_at,
        deposit_return_percent: parse_amount(&m.deposit_return_percent),
        rent_returned: m.rent_returned,
        notes: m.notes,
    }
}

#[async_trait]
impl AgentDecisionRepository for SeaOrmAgentDecisionRepository {
    async fn find_by_checkout(&self, checkout_id: Uuid) -> DomainResult<Option<AgentDecision>> {
        let model = agent_decision::Entity::find()
            .filter(agent_decision::Column::CheckoutId.eq(checkout_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }
}
