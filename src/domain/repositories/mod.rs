//! Repository traits for the domain layer
//!
//! `RepositoryProvider` gives unified access to all per-aggregate
//! repositories; consumers request only the repository they need:
//!
//! ```ignore
//! async fn handle(repos: &dyn RepositoryProvider) {
//!     let request = repos.rent_requests().find_by_id(id).await?;
//!     let checkout = repos.checkouts().find_by_rent_request(id).await?;
//! }
//! ```

use super::checkout::{AgentDecisionRepository, CheckoutRepository};
use super::payment::PaymentRepository;
use super::property::PropertyRepository;
use super::rent_request::RentRequestRepository;
use super::user::UserRepository;

/// Provides access to all domain repositories
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn properties(&self) -> &dyn PropertyRepository;
    fn rent_requests(&self) -> &dyn RentRequestRepository;
    fn payments(&self) -> &dyn PaymentRepository;
    fn checkouts(&self) -> &dyn CheckoutRepository;
    fn decisions(&self) -> &dyn AgentDecisionRepository;
}
