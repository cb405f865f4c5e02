pub mod model;
pub mod repository;

pub use model::{
    AgentDecision, Checkout, CheckoutKind, CheckoutStatus, OwnerConfirmation, SettlementWrite,
};
pub use repository::{AgentDecisionRepository, CheckoutRepository};
