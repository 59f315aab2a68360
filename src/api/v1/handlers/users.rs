/*
 * Responsibility
 * - gated /users handlers (the access gate has already run)
 * - users are addressed by UUID; an unparsable id is simply not found
 */
use axum::{
    Json,
    extract::{
        Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::{
            envelope::Envelope,
            users::{ChangePasswordRequest, CheckValidationRequest, ImageResponse, UserResponse},
        },
        extractors::{AuthCtxExtractor, LocalizedJson},
    },
    error::AppError,
    i18n::{Lang, MessageKey},
    repos::user_repo::{self, LookupField, UserRow},
    services::upload::UploadError,
    state::AppState,
};

const AVATAR_FIELD: &str = "avatar";

pub async fn list_users(
    State(state): State<AppState>,
    lang: Lang,
) -> Result<Json<Envelope<Vec<UserResponse>>>, AppError> {
    let rows = user_repo::list(&state.db)
        .await
        .map_err(|e| AppError::internal(&lang, e))?;
    let res = rows.into_iter().map(UserResponse::from).collect();

    Ok(Envelope::ok(&lang, MessageKey::UserListSuccess, res))
}

pub async fn change_password(
    State(state): State<AppState>,
    lang: Lang,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    LocalizedJson(req): LocalizedJson<ChangePasswordRequest>,
) -> Result<Json<Envelope<()>>, AppError> {
    // tokens we issue carry the user id as `sub`
    let user_id = ctx
        .user_id()
        .ok_or_else(|| AppError::unauthorized(&lang, MessageKey::InvalidToken))?;
    let user = load_user(&state, &lang, user_id).await?;

    let matches = state
        .hasher
        .verify(&req.old_password, &user.password_hash)
        .await
        .map_err(|e| AppError::internal(&lang, e))?;
    if !matches {
        return Err(AppError::unauthorized(
            &lang,
            MessageKey::InvalidOrMatchPassword,
        ));
    }
    req.validate().map_err(|key| match key {
        MessageKey::InvalidOrMatchPassword => AppError::unauthorized(&lang, key),
        key => AppError::bad_request(&lang, key),
    })?;

    let password_hash = state
        .hasher
        .hash(&req.new_password)
        .await
        .map_err(|e| AppError::internal(&lang, e))?;
    user_repo::update_password(&state.db, user.id, &password_hash, false)
        .await
        .map_err(|e| AppError::internal(&lang, e))?;

    tracing::info!(user_id = %user.id, "password changed");

    Ok(Envelope::message(&lang, MessageKey::PasswordChangeSuccess))
}

pub async fn check_validation(
    State(state): State<AppState>,
    lang: Lang,
    LocalizedJson(req): LocalizedJson<CheckValidationRequest>,
) -> Result<Json<Envelope<()>>, AppError> {
    let field = LookupField::parse(req.key.trim())
        .ok_or_else(|| AppError::bad_request(&lang, MessageKey::InvalidValidationKey))?;
    if req.value.trim().is_empty() {
        return Err(AppError::bad_request(&lang, MessageKey::InvalidRequest));
    }

    let taken = user_repo::exists_by(&state.db, field, &req.value)
        .await
        .map_err(|e| AppError::internal(&lang, e))?;
    if taken {
        return Err(AppError::bad_request(&lang, MessageKey::ValueAlreadyExists));
    }

    Ok(Envelope::message(&lang, MessageKey::ValidationSuccess))
}

pub async fn delete_user(
    State(state): State<AppState>,
    lang: Lang,
    Path(user_id): Path<String>,
) -> Result<Json<Envelope<()>>, AppError> {
    let user_id = parse_user_id(&lang, &user_id)?;

    let deleted = user_repo::delete(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal(&lang, e))?;
    if !deleted {
        return Err(AppError::not_found(&lang, MessageKey::UserNotFound));
    }

    tracing::info!(user_id = %user_id, "user deleted");

    Ok(Envelope::message(&lang, MessageKey::UserDeleted))
}

pub async fn profile_upload(
    State(state): State<AppState>,
    lang: Lang,
    Path(user_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Envelope<ImageResponse>>, AppError> {
    let user_id = parse_user_id(&lang, &user_id)?;
    load_user(&state, &lang, user_id).await?;

    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "not a multipart body");
        AppError::bad_request(&lang, MessageKey::ImageNotSelected)
    })?;

    let mut avatar = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&lang, e))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let original = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| multipart_error(&lang, e))?;
        avatar = Some((original, bytes));
        break;
    }

    let Some((original, bytes)) = avatar.filter(|(_, bytes)| !bytes.is_empty()) else {
        return Err(AppError::bad_request(&lang, MessageKey::ImageNotSelected));
    };

    let stored = state
        .uploads
        .save(AVATAR_FIELD, &original, &bytes)
        .await
        .map_err(|e| match e {
            UploadError::InvalidType => AppError::bad_request(&lang, MessageKey::InvalidImageType),
            UploadError::TooLarge { .. } => {
                AppError::payload_too_large(&lang, MessageKey::FileTooLarge)
            }
            e @ UploadError::Io(_) => AppError::internal(&lang, e),
        })?;

    user_repo::update_image(&state.db, user_id, &stored.url)
        .await
        .map_err(|e| AppError::internal(&lang, e))?
        .ok_or_else(|| AppError::not_found(&lang, MessageKey::UserNotFound))?;

    tracing::info!(user_id = %user_id, file = %stored.file_name, "profile image uploaded");

    Ok(Envelope::ok(
        &lang,
        MessageKey::ImageUploaded,
        ImageResponse {
            image_url: stored.url,
        },
    ))
}

fn parse_user_id(lang: &Lang, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(lang, MessageKey::UserNotFound))
}

async fn load_user(state: &AppState, lang: &Lang, user_id: Uuid) -> Result<UserRow, AppError> {
    user_repo::get(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal(lang, e))?
        .ok_or_else(|| AppError::not_found(lang, MessageKey::UserNotFound))
}

fn multipart_error(lang: &Lang, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(lang, MessageKey::FileTooLarge)
    } else {
        tracing::debug!(error = %err, "malformed multipart body");
        AppError::bad_request(lang, MessageKey::ImageNotSelected)
    }
}
