//! Database infrastructure
//!
//! - `entities`: SeaORM entity models
//! - `migrator`: Schema migrations
//! - `repositories`: SeaORM implementations of the domain repositories

pub mod entities;
pub mod migrator;
pub mod repositories;

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Initialize the database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    Database::connect(&config.url).await
}
