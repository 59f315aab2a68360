use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use uuid::Uuid;

use crate::config::AuthConfig;

#[derive(Debug, Serialize)]
struct AccessTokenClaims<'a> {
    sub: String,
    email: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
}

/// Signs login tokens with the same shared secret the auth gate verifies against.
#[derive(Clone)]
pub struct JwtIssuer {
    ttl_seconds: u64,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl JwtIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            ttl_seconds: config.token_ttl_seconds,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            email,
            iat: now,
            exp: now + self.ttl_seconds as i64,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            expires_in: self.ttl_seconds,
        })
    }
}
