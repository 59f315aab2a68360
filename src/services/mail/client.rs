//! Mail delivery interface used by the account handlers (OTP, password reset).
use async_trait::async_trait;
use thiserror::Error;

pub type MailResult<T> = Result<T, MailError>;

/// Mail-layer errors (address / message building / transport).
///
/// Kept separate from `AppError` so each caller decides whether a failed
/// delivery fails the request (password reset) or only gets logged (register).
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("failed to build message: {0}")]
    Message(String),
    #[error("mail transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    // Transport name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn send(&self, mail: OutgoingMail) -> MailResult<()>;
}
