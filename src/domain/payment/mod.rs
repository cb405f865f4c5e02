pub mod model;
pub mod repository;

pub use model::PaymentRecord;
pub use repository::PaymentRepository;
