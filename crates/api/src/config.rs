//! API server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CASAWOOD_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `CASAWOOD_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//! - `RAZORPAY_KEY_ID` - Payment gateway public key id
//! - `RAZORPAY_KEY_SECRET` - Payment gateway key secret (high entropy)
//!
//! ## Optional
//! - `CASAWOOD_HOST` - Bind address (default: 127.0.0.1)
//! - `CASAWOOD_PORT` - Listen port (default: 5000)
//! - `CASAWOOD_ENV` - `development` or `production` (default: development)
//! - `CASAWOOD_JWT_EXPIRY_DAYS` - Token lifetime in days (default: 7)
//! - `CASAWOOD_CORS_ORIGINS` - Comma-separated allowed origins (default: <http://localhost:3000>)
//! - `CASAWOOD_RATE_LIMIT` - Rate limit auth endpoints (default: true)
//! - `RAZORPAY_API_BASE` - Gateway base URL (default: <https://api.razorpay.com/v1>)
//! - `GOOGLE_CLIENT_ID` - Enables Google sign-in
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Internal error details are included in 500 responses.
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("expected development or production, got {other}")),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    pub environment: Environment,
    /// Token signing configuration
    pub jwt: JwtConfig,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Whether auth endpoints are rate limited
    pub rate_limit: bool,
    /// Payment gateway configuration
    pub razorpay: RazorpayConfig,
    /// OAuth client id for Google sign-in; `None` disables it
    pub google_client_id: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// JWT signing configuration.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub expiry_days: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("expiry_days", &self.expiry_days)
            .finish()
    }
}

/// Razorpay configuration.
///
/// Implements `Debug` manually to redact the key secret.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Public key id (safe to expose to the browser)
    pub key_id: String,
    /// Key secret, used for basic auth and signature verification
    pub key_secret: SecretString,
    /// Base URL of the gateway REST API
    pub api_base: String,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("CASAWOOD_DATABASE_URL")?;
        let host = parse_env("CASAWOOD_HOST", "127.0.0.1")?;
        let port = parse_env("CASAWOOD_PORT", "5000")?;
        let environment = parse_env("CASAWOOD_ENV", "development")?;

        let jwt_secret = get_validated_secret("CASAWOOD_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "CASAWOOD_JWT_SECRET")?;
        let expiry_days: i64 = parse_env("CASAWOOD_JWT_EXPIRY_DAYS", "7")?;
        if expiry_days <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CASAWOOD_JWT_EXPIRY_DAYS".to_string(),
                "must be positive".to_string(),
            ));
        }

        let cors_origins = parse_origins(&get_env_or_default(
            "CASAWOOD_CORS_ORIGINS",
            "http://localhost:3000",
        ));
        let rate_limit = parse_bool("CASAWOOD_RATE_LIMIT", &get_env_or_default("CASAWOOD_RATE_LIMIT", "true"))?;

        let razorpay = RazorpayConfig::from_env()?;
        let google_client_id = get_optional_env("GOOGLE_CLIENT_ID").filter(|s| !s.is_empty());
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            environment,
            jwt: JwtConfig {
                secret: jwt_secret,
                expiry_days,
            },
            cors_origins,
            rate_limit,
            razorpay,
            google_client_id,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

impl RazorpayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            key_id: get_required_env("RAZORPAY_KEY_ID")?,
            key_secret: get_validated_secret("RAZORPAY_KEY_SECRET")?,
            api_base: get_env_or_default("RAZORPAY_API_BASE", "https://api.razorpay.com/v1")
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

#[cfg(test)]
impl ApiConfig {
    /// Configuration for in-process router tests. Nothing here is reachable
    /// over the network.
    pub(crate) fn for_tests() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/casawood_test"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 5000,
            environment: Environment::Development,
            jwt: JwtConfig {
                secret: SecretString::from("k7Fq2mZp9Xv4Lr8Nw3Bt6Hy1Jd5Gs0Ce"),
                expiry_days: 7,
            },
            cors_origins: vec!["http://localhost:3000".to_string()],
            rate_limit: false,
            razorpay: RazorpayConfig {
                key_id: "rzp_test_KeyId123".to_string(),
                key_secret: SecretString::from("Qw8Er7Ty6Ui5Op4As3Df2Gh1"),
                api_base: "http://127.0.0.1:9".to_string(),
            },
            google_client_id: None,
            sentry_dsn: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) with `FromStr`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other}"),
        )),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Validate that the JWT secret meets minimum length requirements.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
