//! SeaORM implementation of PaymentRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use super::{db_err, parse_amount};
use crate::domain::payment::{PaymentRecord, PaymentRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::payment;

pub struct SeaOrmPaymentRepository {
    db: DatabaseConnection,
}

impl SeaOrmPaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: payment::Model) -> PaymentRecord {
    PaymentRecord {
        id: m.id,
        rent_request_id: m.rent_request_id,
        idempotency_key: m.idempotency_key,
        amount: parse_amount(&m.amount),
        currency: m.currency,
        transaction_ref: m.transaction_ref,
        created_at: m.created_at,
    }
}

#[async_trait]
impl PaymentRepository for SeaOrmPaymentRepository {
    async fn save(&self, p: PaymentRecord) -> DomainResult<()> {
        debug!(
            "Saving payment {} for rent request {}",
            p.id, p.rent_request_id
        );

        let key = p.idempotency_key.clone();
        let rent_request_id = p.rent_request_id;
        let model = payment::ActiveModel {
            id: Set(p.id),
            rent_request_id: Set(p.rent_request_id),
            idempotency_key: Set(p.idempotency_key),
            amount: Set(p.amount.to_string()),
            currency: Set(p.currency),
            transaction_ref: Set(p.transaction_ref),
            created_at: Set(p.created_at),
        };
        model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            // the unique (rent_request_id, idempotency_key) index fires on retries
            Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict(format!(
                "payment with idempotency key '{}' already exists for rent request {}",
                key, rent_request_id
            )),
            _ => db_err(e),
        })?;
        Ok(())
    }

    async fn find_by_key(
        &self,
        rent_request_id: Uuid,
        idempotency_key: &str,
    ) -> DomainResult<Option<PaymentRecord>> {
        let model = payment::Entity::find()
            .filter(payment::Column::RentRequestId.eq(rent_request_id))
            .filter(payment::Column::IdempotencyKey.eq(idempotency_key))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_rent_request(
        &self,
        rent_request_id: Uuid,
    ) -> DomainResult<Vec<PaymentRecord>> {
        let models = payment::Entity::find()
            .filter(payment::Column::RentRequestId.eq(rent_request_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
