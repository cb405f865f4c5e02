pub mod handlers;

pub use handlers::AdminAppState;
