//! `Lang` as an extractor: the catalog from state + the request's `Accept-Language`.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header, request::Parts};

use crate::i18n::{Catalog, Lang};

impl<S> FromRequestParts<S> for Lang
where
    Arc<Catalog>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let accept_language = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());

        Ok(Lang::new(Arc::<Catalog>::from_ref(state), accept_language))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    #[tokio::test]
    async fn builds_lang_from_header() {
        let catalog = Arc::new(Catalog::builtin("en").unwrap());
        let (mut parts, _) = Request::builder()
            .header(header::ACCEPT_LANGUAGE, "pt-BR,pt;q=0.9,en;q=0.5")
            .body(())
            .unwrap()
            .into_parts();

        let lang = Lang::from_request_parts(&mut parts, &catalog).await.unwrap();
        assert_eq!(lang.locale(), "pt");
    }

    #[tokio::test]
    async fn missing_header_uses_default() {
        let catalog = Arc::new(Catalog::builtin("fr").unwrap());
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();

        let lang = Lang::from_request_parts(&mut parts, &catalog).await.unwrap();
        assert_eq!(lang.locale(), "fr");
    }
}
