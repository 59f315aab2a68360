/*
 * Responsibility
 * - POST /users/html-to-string: raw HTML body -> single-line string
 */
use axum::{Json, body::Bytes};

use crate::{
    api::v1::dto::envelope::Envelope,
    error::AppError,
    i18n::{Lang, MessageKey},
    services::html::html_to_string,
};

pub async fn convert_html(lang: Lang, body: Bytes) -> Result<Json<Envelope<String>>, AppError> {
    let body = std::str::from_utf8(&body)
        .map_err(|_| AppError::bad_request(&lang, MessageKey::InvalidRequest))?;

    let flattened = html_to_string(body)
        .ok_or_else(|| AppError::bad_request(&lang, MessageKey::HtmlRequired))?;

    Ok(Envelope::ok(&lang, MessageKey::HtmlConverted, flattened))
}
