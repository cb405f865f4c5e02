//! SeaORM implementation of RentRequestRepository
//!
//! Status transitions are conditional updates (`WHERE status = from`), so a
//! racing actor or sweep cannot apply a second transition to the same row.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::{db_err, parse_amount};
use crate::domain::rent_request::{RentRequest, RentRequestRepository, RentRequestStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::rent_request;
use crate::shared::pagination::PaginatedResult;

pub struct SeaOrmRentRequestRepository {
    db: DatabaseConnection,
}

impl SeaOrmRentRequestRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn list_filtered(
        &self,
        column: rent_request::Column,
        actor_id: Uuid,
        page: u64,
        limit: u64,
    ) -> DomainResult<PaginatedResult<RentRequest>> {
        let paginator = rent_request::Entity::find()
            .filter(column.eq(actor_id))
            .order_by_desc(rent_request::Column::CreatedAt)
            .paginate(&self.db, limit);

        let total = paginator.num_items().await.map_err(db_err)?;
        let models = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(db_err)?;

        Ok(PaginatedResult::new(
            models.into_iter().map(model_to_domain).collect(),
            total,
            page,
            limit,
        ))
    }
}

fn model_to_domain(m: rent_request::Model) -> RentRequest {
    RentRequest {
        id: m.id,
        property_id: m.property_id,
        renter_id: m.renter_id,
        owner_id: m.owner_id,
        check_in: m.check_in,
        check_out: m.check_out,
        status: RentRequestStatus::from_str(&m.status),
        rent_amount: parse_amount(&m.rent_amount),
        deposit_amount: parse_amount(&m.deposit_amount),
        currency: m.currency,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl RentRequestRepository for SeaOrmRentRequestRepository {
    async fn save(&self, r: RentRequest) -> DomainResult<()> {
        debug!("Saving rent request: {}", r.id);

        let model = rent_request::ActiveModel {
            id: Set(r.id),
            property_id: Set(r.property_id),
            renter_id: Set(r.renter_id),
            owner_id: Set(r.owner_id),
            check_in: Set(r.check_in),
            check_out: Set(r.check_out),
            status: Set(r.status.as_str().to_string()),
            rent_amount: Set(r.rent_amount.to_string()),
            deposit_amount: Set(r.deposit_amount.to_string()),
            currency: Set(r.currency),
            created_at: Set(r.created_at),
            updated_at: Set(r.updated_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<RentRequest>> {
        let model = rent_request::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list_for_renter(
        &self,
        renter_id: Uuid,
        page: u64,
        limit: u64,
    ) -> DomainResult<PaginatedResult<RentRequest>> {
        self.list_filtered(rent_request::Column::RenterId, renter_id, page, limit)
            .await
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        page: u64,
        limit: u64,
    ) -> DomainResult<PaginatedResult<RentRequest>> {
        self.list_filtered(rent_request::Column::OwnerId, owner_id, page, limit)
            .await
    }

    async fn transition(
        &self,
        id: Uuid,
        from: RentRequestStatus,
        to: RentRequestStatus,
        action: &'static str,
    ) -> DomainResult<RentRequest> {
        debug!("Rent request {} transition {} -> {}", id, from, to);

        let result = rent_request::Entity::update_many()
            .col_expr(rent_request::Column::Status, Expr::value(to.as_str()))
            .col_expr(rent_request::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(rent_request::Column::Id.eq(id))
            .filter(rent_request::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            // report the canonical current state so the caller can refresh
            let current = rent_request::Entity::find_by_id(id)
                .one(&self.db)
                .await
                .map_err(db_err)?;
            return match current {
                None => Err(DomainError::NotFound {
                    entity: "RentRequest",
                    field: "id",
                    value: id.to_string(),
                }),
                Some(m) => Err(DomainError::InvalidTransition {
                    entity: "rent request",
                    from: m.status,
                    action,
                }),
            };
        }

        let updated = rent_request::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::NotFound {
                entity: "RentRequest",
                field: "id",
                value: id.to_string(),
            })?;
        Ok(model_to_domain(updated))
    }
}
