//! `Json<T>` whose rejection is the localized `INVALID_REQUEST` envelope.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRef, FromRequest, FromRequestParts, Request};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::i18n::{Catalog, Lang, MessageKey};

pub struct LocalizedJson<T>(pub T);

impl<S, T> FromRequest<S> for LocalizedJson<T>
where
    T: DeserializeOwned,
    Arc<Catalog>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let Ok(lang) = Lang::from_request_parts(&mut parts, state).await;
        let req = Request::from_parts(parts, body);

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "rejected json body");
                Err(AppError::bad_request(&lang, MessageKey::InvalidRequest))
            }
        }
    }
}
