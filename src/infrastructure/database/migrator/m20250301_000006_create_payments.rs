//! Create payments table
//!
//! The unique `(rent_request_id, idempotency_key)` index is what makes a
//! retried pay call return the original charge instead of creating a new
//! one.

use sea_orm_migration::prelude::*;

use super::m20250301_000003_create_rent_requests::RentRequests;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::RentRequestId).uuid().not_null())
                    .col(ColumnDef::new(Payments::IdempotencyKey).string().not_null())
                    .col(ColumnDef::new(Payments::Amount).string().not_null())
                    .col(ColumnDef::new(Payments::Currency).string().not_null())
                    .col(ColumnDef::new(Payments::TransactionRef).string().not_null())
                    .col(
                        ColumnDef::new(Payments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_rent_request")
                            .from(Payments::Table, Payments::RentRequestId)
                            .to(RentRequests::Table, RentRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_idempotency")
                    .table(Payments::Table)
                    .col(Payments::RentRequestId)
                    .col(Payments::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Payments {
    Table,
    Id,
    RentRequestId,
    IdempotencyKey,
    Amount,
    Currency,
    TransactionRef,
    CreatedAt,
}
