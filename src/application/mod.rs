pub mod events;
pub mod services;

pub use events::{create_event_bus, EventBus, SharedEventBus};
pub use services::{
    start_checkout_timeout_task, CheckoutService, RentRequestService,
};
