pub mod agent_decision;
pub mod checkout;
pub mod payment;
pub mod property;
pub mod rent_request;
pub mod user;
