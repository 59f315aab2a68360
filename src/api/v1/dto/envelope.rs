/*
 * Responsibility
 * - success body: `{ "status": true, "message": <localized>, "data"?: ... }`
 * - the failure side is error::ErrorResponse
 */
use axum::Json;
use serde::Serialize;

use crate::i18n::{Lang, MessageKey};

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(lang: &Lang, key: MessageKey, data: T) -> Json<Self> {
        Json(Self {
            status: true,
            message: lang.t(key),
            data: Some(data),
        })
    }
}

impl Envelope<()> {
    pub fn message(lang: &Lang, key: MessageKey) -> Json<Self> {
        Json(Self {
            status: true,
            message: lang.t(key),
            data: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::i18n::Catalog;

    #[test]
    fn data_is_omitted_when_absent() {
        let lang = Lang::new(Arc::new(Catalog::builtin("en").unwrap()), None);

        let Json(body) = Envelope::message(&lang, MessageKey::OtpSent);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["status"], true);
        assert!(value.get("data").is_none());

        let Json(body) = Envelope::ok(&lang, MessageKey::HtmlConverted, "<p>x</p>");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["data"], json!("<p>x</p>"));
    }
}
