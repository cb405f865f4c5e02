pub mod types;

pub use types::{CheckoutEventData, Event, EventMessage, RentRequestEventData, SettlementEventData};
