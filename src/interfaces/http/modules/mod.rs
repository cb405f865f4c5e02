pub mod admin;
pub mod checkouts;
pub mod health;
pub mod rent_requests;
