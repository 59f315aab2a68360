pub mod auth;
pub mod envelope;
pub mod users;
