pub mod access;
pub mod checkout;
pub mod error;
pub mod events;
pub mod payment;
pub mod property;
pub mod rent_request;
pub mod repositories;
pub mod settlement;
pub mod user;

// Re-export commonly used types
pub use checkout::{AgentDecision, Checkout, CheckoutKind, CheckoutStatus, OwnerConfirmation};
pub use error::{DomainError, DomainResult};
pub use payment::PaymentRecord;
pub use property::Property;
pub use rent_request::{RentRequest, RentRequestStatus};
pub use repositories::RepositoryProvider;
pub use settlement::{SettlementBreakdown, SettlementError};
pub use user::{User, UserRole};
