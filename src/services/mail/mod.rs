pub mod client;
pub mod templates;
pub mod transport;

pub use client::{MailError, Mailer, OutgoingMail};
pub use transport::LettreMailer;
