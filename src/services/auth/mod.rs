pub mod access_jwt;
pub mod jwt;
pub mod otp;
pub mod password;

pub use access_jwt::{AccessJwtError, AccessTokenVerifier, Claims};
pub use jwt::JwtIssuer;
pub use otp::{OtpFailure, OtpPolicy};
pub use password::PasswordHasher;
