//! Shared helpers used across layers
//!
//! - `pagination`: Page/limit parameters and the paginated result wrapper
//! - `shutdown`: Coordinated graceful shutdown signal
//! - `validations`: Small input normalization helpers

pub mod pagination;
pub mod shutdown;
pub mod validations;
