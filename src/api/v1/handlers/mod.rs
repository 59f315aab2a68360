pub mod auth;
pub mod health;
pub mod html;
pub mod users;
