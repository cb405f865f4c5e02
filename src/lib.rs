//! # Stayvia Rent Lifecycle Service
//!
//! Server-side implementation of the rent lifecycle and checkout settlement
//! workflow for the Stayvia property-rental marketplace.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities, state transitions, settlement arithmetic and traits
//! - **application**: Services orchestrating transitions, the timeout sweep and the event bus
//! - **infrastructure**: External concerns (database, in-memory storage, JWT validation)
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: Pagination, validation helpers and shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::database::{init_database, DatabaseConfig};
pub use infrastructure::database::repositories::SeaOrmRepositoryProvider;
pub use infrastructure::memory::InMemoryRepositoryProvider;

// Re-export API router
pub use interfaces::http::create_api_router;

// Re-export events
pub use application::events::{create_event_bus, EventBus, SharedEventBus};
pub use domain::events::Event;
