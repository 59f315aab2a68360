/*
 * Responsibility
 * - the authenticated identity handlers see
 * - the access gate verifies the token and stores this in request extensions;
 *   it lives only as long as the request
 */

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::services::auth::Claims;

/// Decoded claim set of the bearer token (at least `sub` and `exp`).
#[derive(Debug, Clone)]
pub struct AuthCtx {
    claims: Claims,
}

impl AuthCtx {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.claim("sub").and_then(Value::as_str)
    }

    /// `sub` as the internal user id; `None` when the token was not issued by us.
    pub fn user_id(&self) -> Option<Uuid> {
        self.subject().and_then(|s| Uuid::parse_str(s).ok())
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("iat")
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("exp")
    }

    fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        self.claim(name)
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}
