pub mod model;
pub mod repository;

pub use model::{RentRequest, RentRequestStatus};
pub use repository::RentRequestRepository;
