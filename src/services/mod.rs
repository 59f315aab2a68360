pub mod auth;
pub mod html;
pub mod mail;
pub mod upload;
