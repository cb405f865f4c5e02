//! Create agent_decisions table
//!
//! Append-only: one decision per checkout, never edited in place.

use sea_orm_migration::prelude::*;

use super::m20250301_000004_create_checkouts::Checkouts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AgentDecisions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AgentDecisions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AgentDecisions::CheckoutId).uuid().not_null())
                    .col(ColumnDef::new(AgentDecisions::DecidedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(AgentDecisions::DecidedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AgentDecisions::DepositReturnPercent)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AgentDecisions::RentReturned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(AgentDecisions::Notes).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_agent_decisions_checkout")
                            .from(AgentDecisions::Table, AgentDecisions::CheckoutId)
                            .to(Checkouts::Table, Checkouts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_agent_decisions_checkout")
                    .table(AgentDecisions::Table)
                    .col(AgentDecisions::CheckoutId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AgentDecisions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum AgentDecisions {
    Table,
    Id,
    CheckoutId,
    DecidedBy,
    DecidedAt,
    DepositReturnPercent,
    RentReturned,
    Notes,
}
