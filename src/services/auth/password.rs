//! bcrypt hashing, run on the blocking pool so request tasks keep moving.
use thiserror::Error;
use tokio::task;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task failed: {0}")]
    Join(#[from] task::JoinError),
}

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let plain = plain.to_owned();
        let cost = self.cost;
        let hashed = task::spawn_blocking(move || bcrypt::hash(plain, cost)).await??;
        Ok(hashed)
    }

    pub async fn verify(&self, plain: &str, hashed: &str) -> Result<bool, PasswordError> {
        let plain = plain.to_owned();
        let hashed = hashed.to_owned();
        let ok = task::spawn_blocking(move || bcrypt::verify(plain, &hashed)).await??;
        Ok(ok)
    }
}
