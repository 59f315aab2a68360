/*
 * Responsibility
 * - SQLx access to the users table
 * - takes a PgPool, returns rows or RepoError (unique violations -> Conflict)
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

const COLUMNS: &str = r#""userId", "userName", "email", "passwordHash", "imageUrl",
    "isVerified", "otpHash", "otpExpiresAt", "createdAt""#;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    #[sqlx(rename = "userId")]
    pub id: Uuid,
    #[sqlx(rename = "userName")]
    pub user_name: String,
    pub email: String,
    #[sqlx(rename = "passwordHash")]
    pub password_hash: String,
    #[sqlx(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[sqlx(rename = "isVerified")]
    pub is_verified: bool,
    #[sqlx(rename = "otpHash")]
    pub otp_hash: Option<String>,
    #[sqlx(rename = "otpExpiresAt")]
    pub otp_expires_at: Option<DateTime<Utc>>,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewUser<'a> {
    pub user_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub otp_hash: &'a str,
    pub otp_expires_at: DateTime<Utc>,
}

/// Columns `check-validation` may probe for uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupField {
    Email,
    UserName,
}

impl LookupField {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "email" => Some(Self::Email),
            "user_name" => Some(Self::UserName),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Email => r#""email""#,
            Self::UserName => r#""userName""#,
        }
    }
}

pub async fn list(db: &PgPool) -> Result<Vec<UserRow>, RepoError> {
    let rows = sqlx::query_as::<_, UserRow>(&format!(
        r#"SELECT {COLUMNS} FROM users ORDER BY "createdAt" DESC"#
    ))
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, user_id: Uuid) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"SELECT {COLUMNS} FROM users WHERE "userId" = $1"#
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// `email` is compared lower-cased; rows are stored that way.
pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"SELECT {COLUMNS} FROM users WHERE "email" = $1"#
    ))
    .bind(email.to_lowercase())
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, user: NewUser<'_>) -> Result<UserRow, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        INSERT INTO users ("userName", "email", "passwordHash", "otpHash", "otpExpiresAt")
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user.user_name)
    .bind(user.email.to_lowercase())
    .bind(user.password_hash)
    .bind(user.otp_hash)
    .bind(user.otp_expires_at)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

/// Replaces any pending OTP.
pub async fn set_otp(
    db: &PgPool,
    user_id: Uuid,
    otp_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET "otpHash" = $2, "otpExpiresAt" = $3, "otpAttempts" = 0, "updatedAt" = now()
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .bind(otp_hash)
    .bind(expires_at)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Counts one guess against the pending OTP and returns the new total.
/// The increment happens in the database so concurrent guesses each get their own number.
pub async fn record_otp_attempt(db: &PgPool, user_id: Uuid) -> Result<Option<i32>, RepoError> {
    let attempts = sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE users
        SET "otpAttempts" = "otpAttempts" + 1
        WHERE "userId" = $1
        RETURNING "otpAttempts"
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(attempts)
}

/// Marks the account verified and consumes the pending OTP.
pub async fn mark_verified(db: &PgPool, user_id: Uuid) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET
            "isVerified" = TRUE,
            "otpHash" = NULL,
            "otpExpiresAt" = NULL,
            "otpAttempts" = 0,
            "updatedAt" = now()
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Sets a new hash and consumes any pending OTP.
/// `verify`: also mark the account verified (reset via emailed OTP proves the address).
pub async fn update_password(
    db: &PgPool,
    user_id: Uuid,
    password_hash: &str,
    verify: bool,
) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET
            "passwordHash" = $2,
            "isVerified" = "isVerified" OR $3,
            "otpHash" = NULL,
            "otpExpiresAt" = NULL,
            "otpAttempts" = 0,
            "updatedAt" = now()
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .bind(password_hash)
    .bind(verify)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn update_image(
    db: &PgPool,
    user_id: Uuid,
    image_url: &str,
) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        UPDATE users
        SET "imageUrl" = $2, "updatedAt" = now()
        WHERE "userId" = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(image_url)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn exists_by(db: &PgPool, field: LookupField, value: &str) -> Result<bool, RepoError> {
    let value = match field {
        LookupField::Email => value.trim().to_lowercase(),
        LookupField::UserName => value.trim().to_string(),
    };

    let exists = sqlx::query_scalar::<_, bool>(&format!(
        "SELECT EXISTS (SELECT 1 FROM users WHERE {} = $1)",
        field.column()
    ))
    .bind(value)
    .fetch_one(db)
    .await?;

    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_field_accepts_only_known_keys() {
        assert_eq!(LookupField::parse("email"), Some(LookupField::Email));
        assert_eq!(LookupField::parse("user_name"), Some(LookupField::UserName));
        assert_eq!(LookupField::parse("passwordHash"), None);
        assert_eq!(LookupField::parse(""), None);
    }

    #[test]
    fn lookup_columns_are_quoted_identifiers() {
        assert_eq!(LookupField::Email.column(), "\"email\"");
        assert_eq!(LookupField::UserName.column(), "\"userName\"");
    }
}
