pub mod checkout;
pub mod checkout_timeout;
pub mod rent_request;

pub use checkout::{CheckoutService, CheckoutStatusView};
pub use checkout_timeout::start_checkout_timeout_task;
pub use rent_request::{PaymentOutcome, RentRequestDetails, RentRequestService};
