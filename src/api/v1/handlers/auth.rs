/*
 * Responsibility
 * - public /auth handlers: register, login, OTP verification, password reset
 * - DTO validation -> repo/service calls -> localized envelope
 */
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::{
    api::v1::{
        dto::{
            auth::{
                EmailRequest, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest,
                VerifyOtpRequest,
            },
            envelope::Envelope,
            users::UserResponse,
        },
        extractors::LocalizedJson,
    },
    error::AppError,
    i18n::{Lang, MessageKey},
    repos::{
        error::RepoError,
        user_repo::{self, NewUser, UserRow},
    },
    services::{
        auth::OtpFailure,
        mail::{OutgoingMail, templates},
    },
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    lang: Lang,
    LocalizedJson(req): LocalizedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<UserResponse>>), AppError> {
    req.validate()
        .map_err(|key| AppError::bad_request(&lang, key))?;

    let email = req.email.trim().to_lowercase();
    if user_repo::find_by_email(&state.db, &email)
        .await
        .map_err(|e| AppError::internal(&lang, e))?
        .is_some()
    {
        return Err(AppError::conflict(&lang, MessageKey::EmailAlreadyExists));
    }

    let password_hash = state
        .hasher
        .hash(&req.password)
        .await
        .map_err(|e| AppError::internal(&lang, e))?;
    let otp = state
        .otp
        .issue(Utc::now())
        .map_err(|e| AppError::internal(&lang, e))?;

    let row = user_repo::create(
        &state.db,
        NewUser {
            user_name: req.user_name.trim(),
            email: &email,
            password_hash: &password_hash,
            otp_hash: &otp.hash,
            otp_expires_at: otp.expires_at,
        },
    )
    .await
    .map_err(|e| match e {
        // lost a race with a concurrent registration
        RepoError::Conflict => AppError::conflict(&lang, MessageKey::EmailAlreadyExists),
        e => AppError::internal(&lang, e),
    })?;

    // the account stays; /resend-otp recovers a lost code
    let mail = templates::verification_mail(&lang, &row.email, &otp.code, state.otp.ttl_minutes());
    if let Err(err) = state.mailer.send(mail).await {
        tracing::warn!(
            error = %err,
            user_id = %row.id,
            backend = state.mailer.backend_name(),
            "verification mail not sent"
        );
    }

    tracing::info!(user_id = %row.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Envelope::ok(&lang, MessageKey::RegisterSuccess, UserResponse::from(row)),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    lang: Lang,
    LocalizedJson(req): LocalizedJson<LoginRequest>,
) -> Result<Json<Envelope<LoginResponse>>, AppError> {
    let invalid = || AppError::unauthorized(&lang, MessageKey::InvalidCredentials);

    let user = find_user(&state, &lang, &req.email)
        .await?
        .ok_or_else(invalid)?;

    let matches = state
        .hasher
        .verify(&req.password, &user.password_hash)
        .await
        .map_err(|e| AppError::internal(&lang, e))?;
    if !matches {
        return Err(invalid());
    }
    if !user.is_verified {
        return Err(AppError::unauthorized(&lang, MessageKey::AccountNotVerified));
    }

    let issued = state
        .issuer
        .issue(user.id, &user.email)
        .map_err(|e| AppError::internal(&lang, e))?;

    Ok(Envelope::ok(
        &lang,
        MessageKey::LoginSuccess,
        LoginResponse {
            user_id: user.id,
            email: user.email,
            token: issued.token,
            token_type: "Bearer",
            expires_in: issued.expires_in,
        },
    ))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    lang: Lang,
    LocalizedJson(req): LocalizedJson<VerifyOtpRequest>,
) -> Result<Json<Envelope<()>>, AppError> {
    let user = require_user(&state, &lang, &req.email).await?;
    check_otp(&state, &lang, &user, &req.otp).await?;

    user_repo::mark_verified(&state.db, user.id)
        .await
        .map_err(|e| AppError::internal(&lang, e))?;

    Ok(Envelope::message(&lang, MessageKey::OtpVerified))
}

pub async fn resend_otp(
    State(state): State<AppState>,
    lang: Lang,
    LocalizedJson(req): LocalizedJson<EmailRequest>,
) -> Result<Json<Envelope<()>>, AppError> {
    let user = require_user(&state, &lang, &req.email).await?;
    send_new_otp(&state, &lang, &user, templates::verification_mail).await?;

    Ok(Envelope::message(&lang, MessageKey::OtpSent))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    lang: Lang,
    LocalizedJson(req): LocalizedJson<EmailRequest>,
) -> Result<Json<Envelope<()>>, AppError> {
    let user = require_user(&state, &lang, &req.email).await?;
    send_new_otp(&state, &lang, &user, templates::password_reset_mail).await?;

    Ok(Envelope::message(&lang, MessageKey::OtpSent))
}

pub async fn reset_password(
    State(state): State<AppState>,
    lang: Lang,
    LocalizedJson(req): LocalizedJson<ResetPasswordRequest>,
) -> Result<Json<Envelope<()>>, AppError> {
    req.validate()
        .map_err(|key| AppError::bad_request(&lang, key))?;

    let user = require_user(&state, &lang, &req.email).await?;
    check_otp(&state, &lang, &user, &req.otp).await?;

    let password_hash = state
        .hasher
        .hash(&req.new_password)
        .await
        .map_err(|e| AppError::internal(&lang, e))?;

    // the code arrived by mail, so the address is proven too
    user_repo::update_password(&state.db, user.id, &password_hash, true)
        .await
        .map_err(|e| AppError::internal(&lang, e))?;

    tracing::info!(user_id = %user.id, "password reset");

    Ok(Envelope::message(&lang, MessageKey::PasswordResetSuccess))
}

async fn find_user(state: &AppState, lang: &Lang, email: &str) -> Result<Option<UserRow>, AppError> {
    user_repo::find_by_email(&state.db, email.trim())
        .await
        .map_err(|e| AppError::internal(lang, e))
}

async fn require_user(state: &AppState, lang: &Lang, email: &str) -> Result<UserRow, AppError> {
    find_user(state, lang, email)
        .await?
        .ok_or_else(|| AppError::not_found(lang, MessageKey::UserNotFound))
}

/// Counts the guess before comparing, so a flood of wrong codes locks the pending OTP.
async fn check_otp(
    state: &AppState,
    lang: &Lang,
    user: &UserRow,
    presented: &str,
) -> Result<(), AppError> {
    let attempt = user_repo::record_otp_attempt(&state.db, user.id)
        .await
        .map_err(|e| AppError::internal(lang, e))?
        .ok_or_else(|| AppError::not_found(lang, MessageKey::UserNotFound))?;

    state
        .otp
        .check(
            user.otp_hash.as_deref(),
            user.otp_expires_at,
            presented,
            u32::try_from(attempt).unwrap_or(u32::MAX),
            Utc::now(),
        )
        .map_err(|failure| match failure {
            OtpFailure::Invalid => AppError::bad_request(lang, MessageKey::InvalidOtp),
            OtpFailure::Expired => AppError::bad_request(lang, MessageKey::OtpExpired),
            OtpFailure::TooManyAttempts => {
                tracing::warn!(user_id = %user.id, attempt, "otp attempts exceeded");
                AppError::too_many_requests(lang, MessageKey::OtpAttemptsExceeded)
            }
        })
}

/// Replaces the pending OTP and mails it; a failed delivery fails the request.
async fn send_new_otp(
    state: &AppState,
    lang: &Lang,
    user: &UserRow,
    render: fn(&Lang, &str, &str, u64) -> OutgoingMail,
) -> Result<(), AppError> {
    let otp = state
        .otp
        .issue(Utc::now())
        .map_err(|e| AppError::internal(lang, e))?;

    user_repo::set_otp(&state.db, user.id, &otp.hash, otp.expires_at)
        .await
        .map_err(|e| AppError::internal(lang, e))?;

    let mail = render(lang, &user.email, &otp.code, state.otp.ttl_minutes());
    state
        .mailer
        .send(mail)
        .await
        .map_err(|e| AppError::internal(lang, e))
}
