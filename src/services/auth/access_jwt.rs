use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use std::{error::Error as StdError, fmt};

use crate::config::AuthConfig;

/// Decoded claim set of a verified token (claim name -> claim value).
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Three-way outcome of a failed verification.
#[derive(Debug)]
pub enum AccessJwtError {
    /// Signature is valid but `exp` has passed.
    Expired,
    /// Bad signature, malformed token, wrong algorithm, missing claims...
    Invalid(jsonwebtoken::errors::Error),
    /// The verifier itself is unusable (key or algorithm setup).
    Internal(jsonwebtoken::errors::Error),
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "token expired"),
            Self::Invalid(e) => write!(f, "invalid token: {}", e),
            Self::Internal(e) => write!(f, "token verifier failure: {}", e),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Expired => None,
            Self::Invalid(e) | Self::Internal(e) => Some(e),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidKeyFormat | ErrorKind::MissingAlgorithm => Self::Internal(e),
            _ => Self::Invalid(e),
        }
    }
}

/// HS256 verifier for bearer tokens signed with the shared secret.
///
/// - Stateless: no cache, no revocation list; validity is signature + expiry.
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AccessTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    empty_secret: bool,
}

impl fmt::Debug for AccessTokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AccessTokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self::with_validation(config.jwt_secret.as_bytes(), validation)
    }

    pub fn with_validation(secret: &[u8], validation: Validation) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            empty_secret: secret.is_empty(),
        }
    }

    /// Verify signature + expiry and return the decoded claims.
    ///
    /// A verifier that cannot accept any token (no permitted algorithm, empty
    /// secret) fails with `Internal` before the token is looked at.
    pub fn verify(&self, token: &str) -> Result<Claims, AccessJwtError> {
        if self.validation.algorithms.is_empty() {
            return Err(AccessJwtError::Internal(ErrorKind::MissingAlgorithm.into()));
        }
        if self.empty_secret {
            return Err(AccessJwtError::Internal(ErrorKind::InvalidKeyFormat.into()));
        }

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    use super::*;

    const SECRET: &str = "test-secret";

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.to_string(),
            token_ttl_seconds: 3600,
            leeway_seconds: 0,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    fn sign(claims: serde_json::Value, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    #[test]
    fn valid_token_yields_claims() {
        let token = sign(
            json!({ "sub": "42", "iat": now(), "exp": now() + 600, "email": "a@example.com" }),
            SECRET,
        );

        let claims = AccessTokenVerifier::new(&config()).verify(&token).unwrap();
        assert_eq!(claims["sub"], "42");
        assert_eq!(claims["email"], "a@example.com");
    }

    #[test]
    fn expired_token_is_classified_as_expired() {
        let token = sign(json!({ "sub": "42", "exp": now() - 3600 }), SECRET);

        let err = AccessTokenVerifier::new(&config()).verify(&token).unwrap_err();
        assert!(matches!(err, AccessJwtError::Expired));
    }

    #[test]
    fn wrong_secret_is_invalid_even_when_expired() {
        let token = sign(json!({ "sub": "42", "exp": now() - 3600 }), "other-secret");

        let err = AccessTokenVerifier::new(&config()).verify(&token).unwrap_err();
        assert!(matches!(err, AccessJwtError::Invalid(_)));
    }

    #[test]
    fn garbage_is_invalid() {
        let err = AccessTokenVerifier::new(&config())
            .verify("not.a.jwt")
            .unwrap_err();
        assert!(matches!(err, AccessJwtError::Invalid(_)));
    }

    #[test]
    fn missing_subject_is_invalid() {
        let token = sign(json!({ "exp": now() + 600 }), SECRET);

        let err = AccessTokenVerifier::new(&config()).verify(&token).unwrap_err();
        assert!(matches!(err, AccessJwtError::Invalid(_)));
    }

    #[test]
    fn verifier_without_algorithms_is_an_internal_fault() {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms.clear();
        let verifier = AccessTokenVerifier::with_validation(SECRET.as_bytes(), validation);

        let token = sign(json!({ "sub": "42", "exp": now() + 600 }), SECRET);
        let err = verifier.verify(&token).unwrap_err();
        assert!(matches!(err, AccessJwtError::Internal(_)));

        // same outcome for garbage: the fault is the verifier's, not the token's
        let err = verifier.verify("not.a.jwt").unwrap_err();
        assert!(matches!(err, AccessJwtError::Internal(_)));
    }

    #[test]
    fn verifier_with_empty_secret_is_an_internal_fault() {
        let verifier = AccessTokenVerifier::with_validation(b"", Validation::new(Algorithm::HS256));

        let token = sign(json!({ "sub": "42", "exp": now() + 600 }), SECRET);
        let err = verifier.verify(&token).unwrap_err();
        assert!(matches!(err, AccessJwtError::Internal(_)));
    }
}
