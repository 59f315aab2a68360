/*
 * Responsibility
 * - read settings from the environment (.env supported)
 * - validate them once at startup (missing / invalid => refuse to start)
 * - group them per concern so each service receives only its own part
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

const MAX_TOKEN_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;
const MAX_LEEWAY_SECONDS: u64 = 60 * 60;
const MAX_OTP_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Shared-secret token settings, handed to the auth gate and the login issuer.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_seconds: u64,
    pub leeway_seconds: u64,
    pub bcrypt_cost: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print the secret
        f.debug_struct("AuthConfig")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: usize,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Copy)]
pub struct OtpConfig {
    pub length: usize,
    pub ttl_seconds: u64,
    /// Wrong guesses allowed per issued code.
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    None,
    StartTls,
    Tls,
}

#[derive(Clone, PartialEq, Eq)]
pub enum MailTransport {
    Smtp {
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        security: SmtpSecurity,
    },
    Sendmail {
        path: String,
    },
}

impl fmt::Debug for MailTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailTransport::Smtp {
                host,
                port,
                username,
                security,
                ..
            } => f
                .debug_struct("Smtp")
                .field("host", host)
                .field("port", port)
                .field("username", username)
                .field("security", security)
                .finish_non_exhaustive(),
            MailTransport::Sendmail { path } => {
                f.debug_struct("Sendmail").field("path", path).finish()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub db_max_connections: u32,

    pub cors_allowed_origins: Vec<String>,
    pub http_timeout_seconds: u64,

    pub default_locale: String,
    pub messages_dir: Option<PathBuf>,

    pub auth: AuthConfig,
    pub upload: UploadConfig,
    pub otp: OtpConfig,
    pub mail: MailConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (the process environment in production).
    pub fn from_source<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let port: u16 = parse_or(&get, "PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let db_max_connections = parse_or(&get, "DB_MAX_CONNECTIONS", 10)?;

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        let http_timeout_seconds = parse_or(&get, "HTTP_TIMEOUT_SECONDS", 30)?;

        let default_locale = get("DEFAULT_LOCALE").unwrap_or_else(|| "en".to_string());
        let messages_dir = get("MESSAGES_DIR").map(PathBuf::from);

        let auth = AuthConfig {
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            token_ttl_seconds: parse_or(&get, "JWT_TTL_SECONDS", 86_400)?, // 1 day
            leeway_seconds: parse_or(&get, "JWT_LEEWAY_SECONDS", 0)?,
            bcrypt_cost: parse_or(&get, "BCRYPT_COST", 10)?,
        };
        if !(4..=31).contains(&auth.bcrypt_cost) {
            return Err(ConfigError::Invalid("BCRYPT_COST"));
        }
        if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&auth.token_ttl_seconds) {
            return Err(ConfigError::Invalid("JWT_TTL_SECONDS"));
        }
        if auth.leeway_seconds > MAX_LEEWAY_SECONDS {
            return Err(ConfigError::Invalid("JWT_LEEWAY_SECONDS"));
        }

        let upload = UploadConfig {
            dir: PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
            max_bytes: parse_or(&get, "UPLOAD_MAX_BYTES", 5 * 1024 * 1024)?,
            public_base_url: get("PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port))
                .trim_end_matches('/')
                .to_string(),
        };

        let otp = OtpConfig {
            length: parse_or(&get, "OTP_LENGTH", 6)?,
            ttl_seconds: parse_or(&get, "OTP_TTL_SECONDS", 600)?, // 10 min
            max_attempts: parse_or(&get, "OTP_MAX_ATTEMPTS", 5)?,
        };
        if !(4..=10).contains(&otp.length) {
            return Err(ConfigError::Invalid("OTP_LENGTH"));
        }
        if !(1..=MAX_OTP_TTL_SECONDS).contains(&otp.ttl_seconds) {
            return Err(ConfigError::Invalid("OTP_TTL_SECONDS"));
        }
        if !(1..=100).contains(&otp.max_attempts) {
            return Err(ConfigError::Invalid("OTP_MAX_ATTEMPTS"));
        }

        let mail = mail_config(&get)?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            db_max_connections,
            cors_allowed_origins,
            http_timeout_seconds,
            default_locale,
            messages_dir,
            auth,
            upload,
            otp,
            mail,
        })
    }
}

fn mail_config(get: &impl Fn(&str) -> Option<String>) -> Result<MailConfig, ConfigError> {
    let username = get("SMTP_USERNAME");

    let transport = match get("MAIL_TRANSPORT")
        .unwrap_or_else(|| "sendmail".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "smtp" => {
            let security = match get("SMTP_SECURITY")
                .unwrap_or_else(|| "none".to_string())
                .to_ascii_lowercase()
                .as_str()
            {
                "none" => SmtpSecurity::None,
                "starttls" => SmtpSecurity::StartTls,
                "tls" => SmtpSecurity::Tls,
                _ => return Err(ConfigError::Invalid("SMTP_SECURITY")),
            };
            MailTransport::Smtp {
                host: get("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
                port: parse_or(get, "SMTP_PORT", 25)?,
                username: username.clone(),
                password: get("SMTP_PASSWORD"),
                security,
            }
        }
        "sendmail" => MailTransport::Sendmail {
            path: get("SENDMAIL_PATH").unwrap_or_else(|| "/usr/sbin/sendmail".to_string()),
        },
        _ => return Err(ConfigError::Invalid("MAIL_TRANSPORT")),
    };

    let from = get("MAIL_FROM")
        .or(username)
        .unwrap_or_else(|| "noreply@example.com".to_string());

    Ok(MailConfig { transport, from })
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
