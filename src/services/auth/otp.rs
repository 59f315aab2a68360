//! One-time codes for email verification and password reset.
//!
//! - codes are numeric, drawn from the OS RNG
//! - only the SHA-256 of a code is stored
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use crate::config::OtpConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpFailure {
    Invalid,
    Expired,
    /// The pending code has been guessed at too often; a new one must be issued.
    TooManyAttempts,
}

#[derive(Debug, Clone)]
pub struct IssuedOtp {
    pub code: String,
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct OtpPolicy {
    length: usize,
    ttl_seconds: u64,
    max_attempts: u32,
}

impl OtpPolicy {
    pub fn new(config: &OtpConfig) -> Self {
        Self {
            length: config.length,
            ttl_seconds: config.ttl_seconds,
            max_attempts: config.max_attempts,
        }
    }

    pub fn ttl_minutes(&self) -> u64 {
        self.ttl_seconds.div_ceil(60)
    }

    pub fn issue(&self, now: DateTime<Utc>) -> Result<IssuedOtp, getrandom::Error> {
        let code = generate_code(self.length)?;
        Ok(IssuedOtp {
            hash: hash_code(&code),
            code,
            expires_at: now + Duration::seconds(self.ttl_seconds as i64),
        })
    }

    /// Checks a presented code against the stored hash and expiry.
    ///
    /// `attempt` is the 1-based number of this guess against the pending code,
    /// counted atomically by the caller before checking; past `max_attempts`
    /// even the right code is refused.
    pub fn check(
        &self,
        stored_hash: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
        presented: &str,
        attempt: u32,
        now: DateTime<Utc>,
    ) -> Result<(), OtpFailure> {
        let (Some(stored_hash), Some(expires_at)) = (stored_hash, expires_at) else {
            return Err(OtpFailure::Invalid);
        };
        if attempt > self.max_attempts {
            return Err(OtpFailure::TooManyAttempts);
        }
        if hash_code(presented.trim()) != stored_hash {
            return Err(OtpFailure::Invalid);
        }
        if now > expires_at {
            return Err(OtpFailure::Expired);
        }
        Ok(())
    }
}

fn generate_code(length: usize) -> Result<String, getrandom::Error> {
    let mut code = String::with_capacity(length);
    let mut buf = [0u8; 16];
    while code.len() < length {
        getrandom::fill(&mut buf)?;
        // only bytes below 250 keep `b % 10` uniform
        for b in buf.iter().filter(|b| **b < 250) {
            if code.len() == length {
                break;
            }
            code.push(char::from(b'0' + b % 10));
        }
    }
    Ok(code)
}

fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> OtpPolicy {
        OtpPolicy::new(&OtpConfig {
            length: 6,
            ttl_seconds: 600,
            max_attempts: 3,
        })
    }

    #[test]
    fn issued_code_is_numeric_with_configured_length() {
        let now = Utc::now();
        let otp = policy().issue(now).unwrap();

        assert_eq!(otp.code.len(), 6);
        assert!(otp.code.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(otp.expires_at, now + Duration::seconds(600));
        assert_ne!(otp.hash, otp.code);
        assert_eq!(otp.hash.len(), 64);
    }

    #[test]
    fn matching_code_within_ttl_passes() {
        let now = Utc::now();
        let otp = policy().issue(now).unwrap();

        let result = policy().check(Some(otp.hash.as_str()), Some(otp.expires_at), &otp.code, 1, now);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn wrong_code_is_invalid() {
        let now = Utc::now();
        let otp = policy().issue(now).unwrap();
        let wrong = if otp.code == "000000" { "111111" } else { "000000" };

        let result = policy().check(Some(otp.hash.as_str()), Some(otp.expires_at), wrong, 1, now);
        assert_eq!(result, Err(OtpFailure::Invalid));
    }

    #[test]
    fn late_code_is_expired() {
        let now = Utc::now();
        let otp = policy().issue(now).unwrap();

        let later = now + Duration::seconds(601);
        let result = policy().check(Some(otp.hash.as_str()), Some(otp.expires_at), &otp.code, 1, later);
        assert_eq!(result, Err(OtpFailure::Expired));
    }

    #[test]
    fn no_pending_code_is_invalid() {
        assert_eq!(
            policy().check(None, None, "123456", 1, Utc::now()),
            Err(OtpFailure::Invalid)
        );
    }

    #[test]
    fn guesses_past_the_limit_are_refused_even_when_right() {
        let now = Utc::now();
        let policy = policy();
        let otp = policy.issue(now).unwrap();
        let hash = Some(otp.hash.as_str());

        assert_eq!(
            policy.check(hash, Some(otp.expires_at), &otp.code, 3, now),
            Ok(())
        );
        assert_eq!(
            policy.check(hash, Some(otp.expires_at), &otp.code, 4, now),
            Err(OtpFailure::TooManyAttempts)
        );
    }

    #[test]
    fn brute_force_is_cut_off_after_max_attempts() {
        let now = Utc::now();
        let policy = policy();
        let otp = policy.issue(now).unwrap();
        let hash = Some(otp.hash.as_str());

        let outcomes: Vec<_> = (0..1000u32)
            .map(|n| format!("{n:06}"))
            .filter(|guess| *guess != otp.code)
            .zip(1..)
            .map(|(guess, attempt)| policy.check(hash, Some(otp.expires_at), &guess, attempt, now))
            .collect();

        assert!(outcomes[..3].iter().all(|r| *r == Err(OtpFailure::Invalid)));
        assert!(outcomes[3..].iter().all(|r| *r == Err(OtpFailure::TooManyAttempts)));
    }

    #[test]
    fn ttl_minutes_rounds_up() {
        let policy = OtpPolicy::new(&OtpConfig {
            length: 4,
            ttl_seconds: 90,
            max_attempts: 5,
        });
        assert_eq!(policy.ttl_minutes(), 2);
    }
}
