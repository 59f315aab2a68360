/*
 * Responsibility
 * - shared context bound to the Router (AppState)
 *   - db, message catalog, access gate, token issuer, hashing, OTP policy,
 *     mailer, upload store
 * - Clone is cheap (Arc / pool handles inside)
 */
use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::i18n::Catalog;
use crate::middleware::auth::AccessGate;
use crate::services::{
    auth::{JwtIssuer, OtpPolicy, PasswordHasher},
    mail::Mailer,
    upload::UploadStore,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub catalog: Arc<Catalog>,
    pub gate: AccessGate,
    pub issuer: Arc<JwtIssuer>,
    pub hasher: PasswordHasher,
    pub otp: OtpPolicy,
    pub mailer: Arc<dyn Mailer>,
    pub uploads: Arc<UploadStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("catalog", &self.catalog.locales())
            .field("mailer", &self.mailer.backend_name())
            .field("uploads", &self.uploads.dir())
            .finish_non_exhaustive()
    }
}

impl FromRef<AppState> for Arc<Catalog> {
    fn from_ref(state: &AppState) -> Self {
        state.catalog.clone()
    }
}
