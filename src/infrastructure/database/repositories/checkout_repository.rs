//! SeaORM implementation of CheckoutRepository
//!
//! The `owner_confirmation` column is the optimistic-concurrency check for
//! every resolution: owner actions, the timeout sweep and agent decisions
//! all write through conditional updates, and a settlement lands inside one
//! database transaction together with the decision record and the rental's
//! completion.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use super::{db_err, parse_amount_opt};
use crate::domain::checkout::{
    Checkout, CheckoutKind, CheckoutRepository, CheckoutStatus, OwnerConfirmation,
    SettlementWrite,
};
use crate::domain::rent_request::RentRequestStatus;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{agent_decision, checkout, rent_request};

pub struct SeaOrmCheckoutRepository {
    db: DatabaseConnection,
}

impl SeaOrmCheckoutRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn model_to_domain(m: checkout::Model) -> Checkout {
    Checkout {
        id: m.id,
        rent_request_id: m.rent_request_id,
        kind: CheckoutKind::from_str(&m.kind).unwrap_or(CheckoutKind::Normal),
        status: CheckoutStatus::from_str(&m.status),
        owner_confirmation: OwnerConfirmation::from_str(&m.owner_confirmation),
        reason: m.reason,
        owner_notes: m.owner_notes,
        deposit_return_percent: parse_amount_opt(&m.deposit_return_percent),
        final_refund_amount: parse_amount_opt(&m.final_refund_amount),
        final_payout_amount: parse_amount_opt(&m.final_payout_amount),
        refund_purchase_id: m.refund_purchase_id,
        payout_purchase_id: m.payout_purchase_id,
        transaction_ref: m.transaction_ref,
        requested_at: m.requested_at,
        resolved_at: m.resolved_at,
    }
}

/// AlreadyResolved/NotFound error for a conditional update that matched no
/// row, built from the row's canonical current state.
async fn stale_state_error(
    db: &DatabaseTransaction,
    id: Uuid,
) -> DomainError {
    match checkout::Entity::find_by_id(id).one(db).await {
        Ok(Some(m)) => DomainError::AlreadyResolved(format!(
            "checkout {} is '{}' with owner confirmation '{}'",
            id, m.status, m.owner_confirmation
        )),
        Ok(None) => DomainError::NotFound {
            entity: "Checkout",
            field: "id",
            value: id.to_string(),
        },
        Err(e) => db_err(e),
    }
}

#[async_trait]
impl CheckoutRepository for SeaOrmCheckoutRepository {
    async fn save(&self, c: Checkout) -> DomainResult<()> {
        debug!("Saving checkout: {}", c.id);

        let rent_request_id = c.rent_request_id;
        let model = checkout::ActiveModel {
            id: Set(c.id),
            rent_request_id: Set(c.rent_request_id),
            kind: Set(c.kind.as_str().to_string()),
            status: Set(c.status.as_str().to_string()),
            owner_confirmation: Set(c.owner_confirmation.as_str().to_string()),
            reason: Set(c.reason),
            owner_notes: Set(c.owner_notes),
            deposit_return_percent: Set(c.deposit_return_percent.map(|d| d.to_string())),
            final_refund_amount: Set(c.final_refund_amount.map(|d| d.to_string())),
            final_payout_amount: Set(c.final_payout_amount.map(|d| d.to_string())),
            refund_purchase_id: Set(c.refund_purchase_id),
            payout_purchase_id: Set(c.payout_purchase_id),
            transaction_ref: Set(c.transaction_ref),
            requested_at: Set(c.requested_at),
            resolved_at: Set(c.resolved_at),
        };
        model.insert(&self.db).await.map_err(|e| {
            // the unique index on rent_request_id enforces one checkout per rental
            match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    DomainError::CheckoutExists(rent_request_id)
                }
                _ => db_err(e),
            }
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Checkout>> {
        let model = checkout::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_rent_request(
        &self,
        rent_request_id: Uuid,
    ) -> DomainResult<Option<Checkout>> {
        let model = checkout::Entity::find()
            .filter(checkout::Column::RentRequestId.eq(rent_request_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_overdue(&self, cutoff: DateTime<Utc>) -> DomainResult<Vec<Checkout>> {
        let models = checkout::Entity::find()
            .filter(checkout::Column::OwnerConfirmation.eq(OwnerConfirmation::Pending.as_str()))
            .filter(checkout::Column::Status.ne(CheckoutStatus::Completed.as_str()))
            .filter(checkout::Column::RequestedAt.lte(cutoff))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_awaiting_decision(&self) -> DomainResult<Vec<Checkout>> {
        let models = checkout::Entity::find()
            .filter(checkout::Column::OwnerConfirmation.is_in([
                OwnerConfirmation::Rejected.as_str(),
                OwnerConfirmation::NotRequired.as_str(),
            ]))
            .filter(checkout::Column::Status.ne(CheckoutStatus::Completed.as_str()))
            .order_by_asc(checkout::Column::RequestedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn resolve_owner_confirmation(
        &self,
        id: Uuid,
        to: OwnerConfirmation,
        owner_notes: Option<String>,
    ) -> DomainResult<Checkout> {
        debug!("Checkout {} owner confirmation -> {}", id, to);

        let status = match to {
            OwnerConfirmation::Confirmed => Some(CheckoutStatus::Confirmed),
            OwnerConfirmation::AutoConfirmed => Some(CheckoutStatus::AutoConfirmed),
            _ => None,
        };

        let mut update = checkout::Entity::update_many()
            .col_expr(
                checkout::Column::OwnerConfirmation,
                Expr::value(to.as_str()),
            )
            .filter(checkout::Column::Id.eq(id))
            .filter(checkout::Column::OwnerConfirmation.eq(OwnerConfirmation::Pending.as_str()))
            .filter(checkout::Column::Status.ne(CheckoutStatus::Completed.as_str()));
        if let Some(status) = status {
            update = update.col_expr(checkout::Column::Status, Expr::value(status.as_str()));
        }
        if let Some(notes) = owner_notes {
            update = update.col_expr(checkout::Column::OwnerNotes, Expr::value(notes));
        }

        let result = update.exec(&self.db).await.map_err(db_err)?;
        if result.rows_affected == 0 {
            let current = checkout::Entity::find_by_id(id)
                .one(&self.db)
                .await
                .map_err(db_err)?;
            return match current {
                Some(m) => Err(DomainError::AlreadyResolved(format!(
                    "checkout {} owner confirmation is '{}'",
                    id, m.owner_confirmation
                ))),
                None => Err(DomainError::NotFound {
                    entity: "Checkout",
                    field: "id",
                    value: id.to_string(),
                }),
            };
        }

        let updated = checkout::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::NotFound {
                entity: "Checkout",
                field: "id",
                value: id.to_string(),
            })?;
        Ok(model_to_domain(updated))
    }

    async fn settle(&self, write: SettlementWrite) -> DomainResult<Checkout> {
        debug!("Settling checkout: {}", write.checkout_id);

        let result = self
            .db
            .transaction::<_, checkout::Model, DomainError>(move |txn| {
                Box::pin(async move {
                    let mut update = checkout::Entity::update_many()
                        .col_expr(
                            checkout::Column::Status,
                            Expr::value(CheckoutStatus::Completed.as_str()),
                        )
                        .col_expr(
                            checkout::Column::OwnerConfirmation,
                            Expr::value(write.confirmation.as_str()),
                        )
                        .col_expr(
                            checkout::Column::DepositReturnPercent,
                            Expr::value(Some(write.breakdown.deposit_return_percent.to_string())),
                        )
                        .col_expr(
                            checkout::Column::FinalRefundAmount,
                            Expr::value(Some(write.breakdown.total_refund().to_string())),
                        )
                        .col_expr(
                            checkout::Column::FinalPayoutAmount,
                            Expr::value(Some(write.breakdown.total_payout().to_string())),
                        )
                        .col_expr(
                            checkout::Column::RefundPurchaseId,
                            Expr::value(Some(write.refund_purchase_id)),
                        )
                        .col_expr(
                            checkout::Column::PayoutPurchaseId,
                            Expr::value(Some(write.payout_purchase_id)),
                        )
                        .col_expr(
                            checkout::Column::ResolvedAt,
                            Expr::value(Some(write.resolved_at)),
                        )
                        .filter(checkout::Column::Id.eq(write.checkout_id))
                        .filter(
                            checkout::Column::OwnerConfirmation
                                .eq(write.expected_confirmation.as_str()),
                        )
                        .filter(
                            checkout::Column::Status.ne(CheckoutStatus::Completed.as_str()),
                        );
                    if let Some(notes) = write.owner_notes.clone() {
                        update = update.col_expr(checkout::Column::OwnerNotes, Expr::value(notes));
                    }

                    let outcome = update.exec(txn).await.map_err(db_err)?;
                    if outcome.rows_affected == 0 {
                        return Err(stale_state_error(txn, write.checkout_id).await);
                    }

                    if let Some(decision) = write.decision {
                        let model = agent_decision::ActiveModel {
                            id: Set(decision.id),
                            checkout_id: Set(decision.checkout_id),
                            decided_by: Set(decision.decided_by),
                            decided_at: Set(decision.decided_at),
                            deposit_return_percent: Set(decision
                                .deposit_return_percent
                                .to_string()),
                            rent_returned: Set(decision.rent_returned),
                            notes: Set(decision.notes),
                        };
                        model.insert(txn).await.map_err(db_err)?;
                    }

                    let settled = checkout::Entity::find_by_id(write.checkout_id)
                        .one(txn)
                        .await
                        .map_err(db_err)?
                        .ok_or(DomainError::NotFound {
                            entity: "Checkout",
                            field: "id",
                            value: write.checkout_id.to_string(),
                        })?;

                    // the settled checkout also completes its rental
                    rent_request::Entity::update_many()
                        .col_expr(
                            rent_request::Column::Status,
                            Expr::value(RentRequestStatus::Completed.as_str()),
                        )
                        .col_expr(rent_request::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(rent_request::Column::Id.eq(settled.rent_request_id))
                        .filter(
                            rent_request::Column::Status.eq(RentRequestStatus::Paid.as_str()),
                        )
                        .exec(txn)
                        .await
                        .map_err(db_err)?;

                    Ok(settled)
                })
            })
            .await;

        match result {
            Ok(model) => Ok(model_to_domain(model)),
            Err(TransactionError::Connection(e)) => Err(db_err(e)),
            Err(TransactionError::Transaction(e)) => Err(e),
        }
    }
}
