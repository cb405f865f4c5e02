//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_properties;
mod m20250301_000003_create_rent_requests;
mod m20250301_000004_create_checkouts;
mod m20250301_000005_create_agent_decisions;
mod m20250301_000006_create_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_properties::Migration),
            Box::new(m20250301_000003_create_rent_requests::Migration),
            Box::new(m20250301_000004_create_checkouts::Migration),
            Box::new(m20250301_000005_create_agent_decisions::Migration),
            Box::new(m20250301_000006_create_payments::Migration),
        ]
    }
}
