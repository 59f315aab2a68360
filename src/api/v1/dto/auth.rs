/*
 * Responsibility
 * - request/response DTOs of /auth (register, login, OTP, password reset)
 * - validate() returns the message key to answer with
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::i18n::MessageKey;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Shape check only: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

pub fn check_password(password: &str) -> Result<(), MessageKey> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(MessageKey::PasswordTooShort);
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), MessageKey> {
        if self.user_name.trim().is_empty() {
            return Err(MessageKey::UserNameRequired);
        }
        if !is_plausible_email(self.email.trim()) {
            return Err(MessageKey::InvalidEmail);
        }
        check_password(&self.password)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Body of `/resend-otp` and `/forgot-password`.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

impl ResetPasswordRequest {
    pub fn validate(&self) -> Result<(), MessageKey> {
        check_password(&self.new_password)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(user_name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            user_name: user_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_plausible_email("a@example.com"));
        assert!(is_plausible_email("first.last@mail.example.org"));
        assert!(!is_plausible_email("example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("a@localhost"));
        assert!(!is_plausible_email("a@example."));
        assert!(!is_plausible_email("a@b@example.com"));
        assert!(!is_plausible_email("a b@example.com"));
    }

    #[test]
    fn register_validation_order() {
        assert_eq!(
            register(" ", "bad", "short").validate(),
            Err(MessageKey::UserNameRequired)
        );
        assert_eq!(
            register("ana", "bad", "short").validate(),
            Err(MessageKey::InvalidEmail)
        );
        assert_eq!(
            register("ana", "ana@example.com", "short").validate(),
            Err(MessageKey::PasswordTooShort)
        );
        assert_eq!(
            register("ana", "ana@example.com", "long enough").validate(),
            Ok(())
        );
    }

    #[test]
    fn password_length_counts_characters() {
        assert_eq!(check_password("éééééééé"), Ok(()));
        assert_eq!(check_password("ééééééé"), Err(MessageKey::PasswordTooShort));
    }
}
