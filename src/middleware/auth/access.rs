//! Bearer access gate: verify `Authorization: Bearer <jwt>` and put AuthCtx into extensions.
//!
//! - Stateless. Every request is verified from scratch (signature + expiry), no
//!   caching, no revocation list, no retries.
//! - Two outcomes only: the next stage runs once with AuthCtx attached, or the
//!   gate answers with the localized `{ status: false, message }` envelope.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{FromRef, State},
    http::{HeaderMap, Request, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::v1::extractors::AuthCtx;
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::i18n::{Catalog, Lang, MessageKey};
use crate::services::auth::{AccessJwtError, AccessTokenVerifier};

/// Read-only state of the gate, built once at startup.
#[derive(Clone, Debug)]
pub struct AccessGate {
    verifier: Arc<AccessTokenVerifier>,
    catalog: Arc<Catalog>,
}

impl AccessGate {
    pub fn new(config: &AuthConfig, catalog: Arc<Catalog>) -> Self {
        Self::with_verifier(AccessTokenVerifier::new(config), catalog)
    }

    pub fn with_verifier(verifier: AccessTokenVerifier, catalog: Arc<Catalog>) -> Self {
        Self {
            verifier: Arc::new(verifier),
            catalog,
        }
    }
}

impl FromRef<AccessGate> for Arc<Catalog> {
    fn from_ref(gate: &AccessGate) -> Self {
        gate.catalog.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// No header, another scheme, or nothing after `Bearer`.
    MissingCredential,
    InvalidCredential,
    CredentialExpired,
    /// The verifier itself failed; carries the diagnostic.
    ServerError(String),
}

impl AuthFailure {
    pub fn message_key(&self) -> MessageKey {
        match self {
            Self::MissingCredential => MessageKey::TokenNotFound,
            Self::InvalidCredential => MessageKey::InvalidToken,
            Self::CredentialExpired => MessageKey::TokenExpired,
            Self::ServerError(_) => MessageKey::ServerErr,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn into_app_error(self, lang: &Lang) -> AppError {
        let message = lang.t(self.message_key());
        match self {
            // localized SERVER_ERR + raw diagnostic
            Self::ServerError(diagnostic) => AppError::Internal(format!("{message}{diagnostic}")),
            _ => AppError::Unauthorized(message),
        }
    }
}

impl From<AccessJwtError> for AuthFailure {
    fn from(err: AccessJwtError) -> Self {
        match err {
            AccessJwtError::Expired => Self::CredentialExpired,
            AccessJwtError::Invalid(_) => Self::InvalidCredential,
            AccessJwtError::Internal(e) => Self::ServerError(e.to_string()),
        }
    }
}

/// Token after a `Bearer` scheme (case-insensitive); further tokens are ignored.
/// Anything else, including a non-ASCII header, counts as no credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthFailure> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthFailure::MissingCredential)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthFailure::MissingCredential),
    }
}

/// Gate every route of `router`. Routes added after this call are not gated.
///
/// ```ignore
/// let users = middleware::auth::access::apply(users::routes(), state.gate.clone());
/// ```
pub fn apply<S>(router: Router<S>, gate: AccessGate) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // from_fn_with_state: the gate carries its own state, independent of the router's
    router.route_layer(middleware::from_fn_with_state(gate, access_middleware))
}

async fn access_middleware(
    State(gate): State<AccessGate>,
    lang: Lang,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let verified = bearer_token(req.headers())
        .and_then(|token| gate.verifier.verify(token).map_err(AuthFailure::from));

    match verified {
        Ok(claims) => {
            let ctx = AuthCtx::new(claims);
            tracing::debug!(
                sub = ?ctx.subject(),
                iat = ?ctx.issued_at(),
                exp = ?ctx.expires_at(),
                "access granted"
            );
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(failure) => {
            match &failure {
                AuthFailure::ServerError(diagnostic) => {
                    tracing::error!(error = %diagnostic, "access token verifier failure");
                }
                other => {
                    tracing::debug!(failure = ?other, "access token rejected");
                }
            }
            failure.into_app_error(&lang).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::to_bytes;
    use axum::routing::get;
    use jsonwebtoken::{Algorithm, EncodingKey, Header, Validation};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::api::v1::extractors::AuthCtxExtractor;

    const SECRET: &str = "gate-secret";

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.to_string(),
            token_ttl_seconds: 3600,
            leeway_seconds: 0,
            bcrypt_cost: 4,
        }
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::builtin("en").unwrap())
    }

    fn token(secret: &str, exp_offset: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &json!({ "sub": "user-1", "iat": now, "exp": now + exp_offset }),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    /// Router with one gated route that counts its invocations.
    fn app(gate: AccessGate, hits: Arc<AtomicUsize>) -> Router {
        let protected = Router::new().route(
            "/protected",
            get(move |AuthCtxExtractor(ctx): AuthCtxExtractor| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    ctx.subject().unwrap_or_default().to_string()
                }
            }),
        );
        apply(protected, gate)
    }

    async fn call(
        gate: AccessGate,
        authorization: Option<&str>,
        accept_language: Option<&str>,
    ) -> (StatusCode, Value, usize) {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut req = Request::builder().uri("/protected");
        if let Some(v) = authorization {
            req = req.header(header::AUTHORIZATION, v);
        }
        if let Some(v) = accept_language {
            req = req.header(header::ACCEPT_LANGUAGE, v);
        }

        let response = app(gate, hits.clone())
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ));
        (status, body, hits.load(Ordering::SeqCst))
    }

    fn gate() -> AccessGate {
        AccessGate::new(&auth_config(), catalog())
    }

    fn assert_rejected(result: (StatusCode, Value, usize), status: StatusCode, message: &str) {
        let (got_status, body, hits) = result;
        assert_eq!(got_status, status);
        assert_eq!(body["status"], false);
        assert_eq!(body["message"], message);
        assert_eq!(hits, 0, "downstream must not run");
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        assert_rejected(
            call(gate(), None, None).await,
            StatusCode::UNAUTHORIZED,
            "Authorization token not found.",
        );
    }

    #[tokio::test]
    async fn other_scheme_is_same_as_missing() {
        assert_rejected(
            call(gate(), Some("Basic xyz"), None).await,
            StatusCode::UNAUTHORIZED,
            "Authorization token not found.",
        );
    }

    #[tokio::test]
    async fn bearer_without_token_is_same_as_missing() {
        assert_rejected(
            call(gate(), Some("Bearer"), None).await,
            StatusCode::UNAUTHORIZED,
            "Authorization token not found.",
        );
        assert_rejected(
            call(gate(), Some("Bearer    "), None).await,
            StatusCode::UNAUTHORIZED,
            "Authorization token not found.",
        );
    }

    #[tokio::test]
    async fn expired_token_is_rejected_as_expired() {
        let header = format!("Bearer {}", token(SECRET, -3600));
        assert_rejected(
            call(gate(), Some(&header), None).await,
            StatusCode::UNAUTHORIZED,
            "Authorization token has expired.",
        );
    }

    #[tokio::test]
    async fn wrong_secret_and_corrupted_tokens_are_invalid() {
        let header = format!("Bearer {}", token("someone-else", 600));
        assert_rejected(
            call(gate(), Some(&header), None).await,
            StatusCode::UNAUTHORIZED,
            "Invalid authorization token.",
        );

        let mut corrupted = token(SECRET, 600);
        corrupted.insert_str(corrupted.find('.').unwrap() + 1, "xx");
        let header = format!("Bearer {corrupted}");
        assert_rejected(
            call(gate(), Some(&header), None).await,
            StatusCode::UNAUTHORIZED,
            "Invalid authorization token.",
        );
    }

    #[tokio::test]
    async fn valid_token_reaches_downstream_once_with_claims() {
        let header = format!("Bearer {} trailing-ignored", token(SECRET, 600));
        let (status, body, hits) = call(gate(), Some(&header), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("user-1".to_string()));
        assert_eq!(hits, 1);
    }

    #[tokio::test]
    async fn scheme_is_case_insensitive() {
        let header = format!("bearer {}", token(SECRET, 600));
        let (status, _, hits) = call(gate(), Some(&header), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(hits, 1);
    }

    #[tokio::test]
    async fn messages_follow_the_locale_hint() {
        assert_rejected(
            call(gate(), None, Some("fr-CA,fr;q=0.9")).await,
            StatusCode::UNAUTHORIZED,
            "Jeton d'autorisation introuvable.",
        );

        let header = format!("Bearer {}", token(SECRET, -60));
        assert_rejected(
            call(gate(), Some(&header), Some("de")).await,
            StatusCode::UNAUTHORIZED,
            "Das Autorisierungstoken ist abgelaufen.",
        );
    }

    #[tokio::test]
    async fn unsupported_locale_falls_back_to_default() {
        assert_rejected(
            call(gate(), None, Some("ja-JP")).await,
            StatusCode::UNAUTHORIZED,
            "Authorization token not found.",
        );
    }

    #[test]
    fn every_failure_kind_has_a_message_in_every_locale() {
        let catalog = catalog();
        let failures = [
            AuthFailure::MissingCredential,
            AuthFailure::InvalidCredential,
            AuthFailure::CredentialExpired,
            AuthFailure::ServerError(String::new()),
        ];

        for locale in catalog.locales() {
            for failure in &failures {
                let key = failure.message_key();
                assert_ne!(catalog.resolve(key, locale), key.as_str(), "{locale}: {key}");
            }
        }
    }

    #[tokio::test]
    async fn verifier_fault_is_a_server_error_with_diagnostic() {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms.clear();
        let gate = AccessGate::with_verifier(
            AccessTokenVerifier::with_validation(SECRET.as_bytes(), validation),
            catalog(),
        );

        let header = format!("Bearer {}", token(SECRET, 600));
        let (status, body, hits) = call(gate, Some(&header), None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], false);
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("Internal server error. "));
        assert!(message.len() > "Internal server error. ".len());
        assert_eq!(hits, 0);
    }

    #[tokio::test]
    async fn empty_secret_is_a_localized_server_error() {
        let config = AuthConfig {
            jwt_secret: String::new(),
            ..auth_config()
        };
        let gate = AccessGate::new(&config, catalog());

        let header = format!("Bearer {}", token(SECRET, 600));
        let (status, body, hits) = call(gate, Some(&header), Some("fr")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("Erreur interne du serveur. ")
        );
        assert_eq!(hits, 0);
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), Err(AuthFailure::MissingCredential));

        headers.insert(header::AUTHORIZATION, "Bearer abc def".parse().unwrap());
        assert_eq!(bearer_token(&headers), Ok("abc"));

        headers.insert(header::AUTHORIZATION, "Token abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Err(AuthFailure::MissingCredential));
    }
}
