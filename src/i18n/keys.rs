/*
 * Responsibility
 * - every message the service can emit, as a closed set
 * - the string form is the key used in messages/<locale>.json
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    // auth gate
    TokenNotFound,
    TokenExpired,
    InvalidToken,
    ServerErr,

    // request validation
    InvalidRequest,
    InvalidEmail,
    UserNameRequired,
    PasswordTooShort,

    // account
    RegisterSuccess,
    EmailAlreadyExists,
    LoginSuccess,
    InvalidCredentials,
    AccountNotVerified,
    OtpSent,
    OtpVerified,
    InvalidOtp,
    OtpExpired,
    OtpAttemptsExceeded,
    PasswordResetSuccess,
    PasswordChangeSuccess,
    InvalidOrMatchPassword,

    // users
    UserListSuccess,
    UserNotFound,
    UserDeleted,
    ValidationSuccess,
    ValueAlreadyExists,
    InvalidValidationKey,
    HtmlConverted,
    HtmlRequired,
    ImageUploaded,
    ImageNotSelected,
    InvalidImageType,
    FileTooLarge,

    // mail templates
    OtpEmailSubject,
    OtpEmailBody,
    ResetEmailSubject,
    ResetEmailBody,
}

impl MessageKey {
    pub const ALL: &'static [MessageKey] = &[
        MessageKey::TokenNotFound,
        MessageKey::TokenExpired,
        MessageKey::InvalidToken,
        MessageKey::ServerErr,
        MessageKey::InvalidRequest,
        MessageKey::InvalidEmail,
        MessageKey::UserNameRequired,
        MessageKey::PasswordTooShort,
        MessageKey::RegisterSuccess,
        MessageKey::EmailAlreadyExists,
        MessageKey::LoginSuccess,
        MessageKey::InvalidCredentials,
        MessageKey::AccountNotVerified,
        MessageKey::OtpSent,
        MessageKey::OtpVerified,
        MessageKey::InvalidOtp,
        MessageKey::OtpExpired,
        MessageKey::OtpAttemptsExceeded,
        MessageKey::PasswordResetSuccess,
        MessageKey::PasswordChangeSuccess,
        MessageKey::InvalidOrMatchPassword,
        MessageKey::UserListSuccess,
        MessageKey::UserNotFound,
        MessageKey::UserDeleted,
        MessageKey::ValidationSuccess,
        MessageKey::ValueAlreadyExists,
        MessageKey::InvalidValidationKey,
        MessageKey::HtmlConverted,
        MessageKey::HtmlRequired,
        MessageKey::ImageUploaded,
        MessageKey::ImageNotSelected,
        MessageKey::InvalidImageType,
        MessageKey::FileTooLarge,
        MessageKey::OtpEmailSubject,
        MessageKey::OtpEmailBody,
        MessageKey::ResetEmailSubject,
        MessageKey::ResetEmailBody,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::TokenNotFound => "TOKEN_NOT_FOUND",
            MessageKey::TokenExpired => "TOKEN_EXPIRED",
            MessageKey::InvalidToken => "INVALID_TOKEN",
            MessageKey::ServerErr => "SERVER_ERR",
            MessageKey::InvalidRequest => "INVALID_REQUEST",
            MessageKey::InvalidEmail => "INVALID_EMAIL",
            MessageKey::UserNameRequired => "USER_NAME_REQUIRED",
            MessageKey::PasswordTooShort => "PASSWORD_TOO_SHORT",
            MessageKey::RegisterSuccess => "REGISTER_SUCCESS",
            MessageKey::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            MessageKey::LoginSuccess => "LOGIN_SUCCESS",
            MessageKey::InvalidCredentials => "INVALID_CREDENTIALS",
            MessageKey::AccountNotVerified => "ACCOUNT_NOT_VERIFIED",
            MessageKey::OtpSent => "OTP_SENT",
            MessageKey::OtpVerified => "OTP_VERIFIED",
            MessageKey::InvalidOtp => "INVALID_OTP",
            MessageKey::OtpExpired => "OTP_EXPIRED",
            MessageKey::OtpAttemptsExceeded => "OTP_ATTEMPTS_EXCEEDED",
            MessageKey::PasswordResetSuccess => "PASSWORD_RESET_SUCCESS",
            MessageKey::PasswordChangeSuccess => "PASSWORD_CHANGE_SUCCESS",
            MessageKey::InvalidOrMatchPassword => "INVALID_OR_MATCH_PASSWORD",
            MessageKey::UserListSuccess => "USER_LIST_SUCCESS",
            MessageKey::UserNotFound => "USER_NOT_FOUND",
            MessageKey::UserDeleted => "USER_DELETED",
            MessageKey::ValidationSuccess => "VALIDATION_SUCCESS",
            MessageKey::ValueAlreadyExists => "VALUE_ALREADY_EXISTS",
            MessageKey::InvalidValidationKey => "INVALID_VALIDATION_KEY",
            MessageKey::HtmlConverted => "HTML_CONVERTED",
            MessageKey::HtmlRequired => "HTML_REQUIRED",
            MessageKey::ImageUploaded => "IMAGE_UPLOADED",
            MessageKey::ImageNotSelected => "IMAGE_NOT_SELECTED",
            MessageKey::InvalidImageType => "INVALID_IMAGE_TYPE",
            MessageKey::FileTooLarge => "FILE_TOO_LARGE",
            MessageKey::OtpEmailSubject => "OTP_EMAIL_SUBJECT",
            MessageKey::OtpEmailBody => "OTP_EMAIL_BODY",
            MessageKey::ResetEmailSubject => "RESET_EMAIL_SUBJECT",
            MessageKey::ResetEmailBody => "RESET_EMAIL_BODY",
        }
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn key_strings_are_unique() {
        let keys: HashSet<&str> = MessageKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), MessageKey::ALL.len());
    }
}
