//! Create rent_requests table
//!
//! `owner_id` is denormalized from the property so status transitions and
//! access checks never join. Status transitions are applied as conditional
//! updates on the `status` column.

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users::Users;
use super::m20250301_000002_create_properties::Properties;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RentRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RentRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RentRequests::PropertyId).uuid().not_null())
                    .col(ColumnDef::new(RentRequests::RenterId).uuid().not_null())
                    .col(ColumnDef::new(RentRequests::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(RentRequests::CheckIn).date().not_null())
                    .col(ColumnDef::new(RentRequests::CheckOut).date().not_null())
                    .col(
                        ColumnDef::new(RentRequests::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(RentRequests::RentAmount).string().not_null())
                    .col(
                        ColumnDef::new(RentRequests::DepositAmount)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RentRequests::Currency).string().not_null())
                    .col(
                        ColumnDef::new(RentRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RentRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rent_requests_property")
                            .from(RentRequests::Table, RentRequests::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rent_requests_renter")
                            .from(RentRequests::Table, RentRequests::RenterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rent_requests_renter")
                    .table(RentRequests::Table)
                    .col(RentRequests::RenterId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rent_requests_owner")
                    .table(RentRequests::Table)
                    .col(RentRequests::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rent_requests_status")
                    .table(RentRequests::Table)
                    .col(RentRequests::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RentRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum RentRequests {
    Table,
    Id,
    PropertyId,
    RenterId,
    OwnerId,
    CheckIn,
    CheckOut,
    Status,
    RentAmount,
    DepositAmount,
    Currency,
    CreatedAt,
    UpdatedAt,
}
