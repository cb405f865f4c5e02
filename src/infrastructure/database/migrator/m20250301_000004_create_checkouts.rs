//! Create checkouts table
//!
//! One checkout per rental (unique `rent_request_id`). The owner
//! confirmation column is the serialization point for racing resolutions;
//! the timeout sweep scans `owner_confirmation = pending` by `requested_at`.

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
                    .table(Checkouts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Checkouts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Checkouts::RentRequestId).uuid().not_null())
                    .col(
                        ColumnDef::new(Checkouts::Kind)
                            .string()
                            .not_null()
                            .default("normal"),
                    )
                    .col(
                        ColumnDef::new(Checkouts::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Checkouts::OwnerConfirmation)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Checkouts::Reason).string())
                    .col(ColumnDef::new(Checkouts::OwnerNotes).string())
                    .col(ColumnDef::new(Checkouts::DepositReturnPercent).string())
                    .col(ColumnDef::new(Checkouts::FinalRefundAmount).string())
                    .col(ColumnDef::new(Checkouts::FinalPayoutAmount).string())
                    .col(ColumnDef::new(Checkouts::RefundPurchaseId).uuid())
                    .col(ColumnDef::new(Checkouts::PayoutPurchaseId).uuid())
                    .col(ColumnDef::new(Checkouts::TransactionRef).string())
                    .col(
                        ColumnDef::new(Checkouts::RequestedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Checkouts::ResolvedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checkouts_rent_request")
                            .from(Checkouts::Table, Checkouts::RentRequestId)
                            .to(RentRequests::Table, RentRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_checkouts_rent_request")
                    .table(Checkouts::Table)
                    .col(Checkouts::RentRequestId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_checkouts_owner_confirmation")
                    .table(Checkouts::Table)
                    .col(Checkouts::OwnerConfirmation)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_checkouts_requested_at")
                    .table(Checkouts::Table)
                    .col(Checkouts::RequestedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Checkouts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Checkouts {
    Table,
    Id,
    RentRequestId,
    Kind,
    Status,
    OwnerConfirmation,
    Reason,
    OwnerNotes,
    DepositReturnPercent,
    FinalRefundAmount,
    FinalPayoutAmount,
    RefundPurchaseId,
    PayoutPurchaseId,
    TransactionRef,
    RequestedAt,
    ResolvedAt,
}
