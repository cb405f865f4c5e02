//! HTTP REST API interfaces
//!
//! - `common`: Response envelope, error mapping, validated JSON extractor
//! - `middleware`: Bearer-token authentication middleware
//! - `modules`: Per-resource DTOs and handlers
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::create_api_router;
