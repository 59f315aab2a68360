/*
 * Responsibility
 * - request/response DTOs of the gated /users routes
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::v1::dto::auth::check_password;
use crate::i18n::MessageKey;
use crate::repos::user_repo::UserRow;

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), MessageKey> {
        if self.old_password == self.new_password {
            return Err(MessageKey::InvalidOrMatchPassword);
        }
        check_password(&self.new_password)
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckValidationRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub is_verified: bool,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.id,
            user_name: row.user_name,
            email: row.email,
            image_url: row.image_url,
            is_verified: row.is_verified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub image_url: String,
}
