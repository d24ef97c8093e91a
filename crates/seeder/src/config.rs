//! Seeder configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MONGODB_URI` - Administrative connection string (falls back to `DATABASE_URL`)
//! - `APP_DB_PASSWORD` - Secret for the application service credential
//!
//! ## Optional
//! - `SEED_PRODUCTION_DB` - Production namespace (default: `video_streaming`)
//! - `SEED_DEVELOPMENT_DB` - Development namespace (default: `video_streaming_dev`)
//! - `SEED_ACTIVE_NAMESPACE` - `production` or `development` (default: development)
//! - `SEED_APP_NAME` - Client application name reported to the server
//! - `APP_DB_USERNAME` - Service credential username (default: `appuser`)
//! - `ADMIN_USERNAME` - Bootstrap administrator username (default: `admin`)
//! - `ADMIN_EMAIL` - Bootstrap administrator email (default: `admin@videostreaming.com`)
//! - `ADMIN_PASSWORD_HASH` - Pre-computed bcrypt or argon2 hash for the administrator
//! - `ADMIN_PASSWORD` - Clear-text administrator password, hashed with Argon2id
//!
//! When neither administrator password variable is set, the legacy bootstrap
//! hash is used and a warning is logged.

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use video_streaming_core::{Email, Namespace, NamespaceKind, PasswordHash, Username};

pub const DEFAULT_PRODUCTION_DB: &str = "video_streaming";
pub const DEFAULT_DEVELOPMENT_DB: &str = "video_streaming_dev";
pub const DEFAULT_APP_NAME: &str = "video-streaming-seeder";
pub const DEFAULT_SERVICE_USERNAME: &str = "appuser";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@videostreaming.com";

const MIN_SERVICE_SECRET_LENGTH: usize = 16;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
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

/// Where the administrator's stored password hash comes from.
#[derive(Clone)]
pub enum AdminPasswordSource {
    /// A hash supplied by the operator, stored verbatim.
    Hash(PasswordHash),
    /// A clear-text password, hashed before storage.
    Plain(SecretString),
    /// Neither was supplied: fall back to the legacy bootstrap hash.
    LegacyDefault,
}

impl std::fmt::Debug for AdminPasswordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash(hash) => f.debug_tuple("Hash").field(hash).finish(),
            Self::Plain(_) => f.debug_tuple("Plain").field(&"[REDACTED]").finish(),
            Self::LegacyDefault => write!(f, "LegacyDefault"),
        }
    }
}

/// Application service credential configuration.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct ServiceCredentialConfig {
    pub username: Username,
    pub secret: SecretString,
}

impl std::fmt::Debug for ServiceCredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCredentialConfig")
            .field("username", &self.username)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Bootstrap administrator configuration.
#[derive(Debug, Clone)]
pub struct AdminAccountConfig {
    pub username: Username,
    pub email: Email,
    pub password: AdminPasswordSource,
}

/// Seeder configuration.
#[derive(Clone)]
pub struct SeedConfig {
    /// Administrative connection string (may contain a password)
    pub database_url: SecretString,
    /// Application name reported in the client handshake
    pub app_name: String,
    pub production_db: Namespace,
    pub development_db: Namespace,
    /// Namespace that receives collections, indexes and the admin document
    pub active: NamespaceKind,
    pub service: ServiceCredentialConfig,
    pub admin: AdminAccountConfig,
}

impl std::fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("database_url", &"[REDACTED]")
            .field("app_name", &self.app_name)
            .field("production_db", &self.production_db)
            .field("development_db", &self.development_db)
            .field("active", &self.active)
            .field("service", &self.service)
            .field("admin", &self.admin)
            .finish()
    }
}

impl SeedConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, values fail
    /// to parse, or the service secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an explicit variable map.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let database_url = env
            .optional("MONGODB_URI")
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("MONGODB_URI".to_string()))?;

        let production_db = env.parse_or_default(
            "SEED_PRODUCTION_DB",
            DEFAULT_PRODUCTION_DB,
            Namespace::parse,
        )?;
        let development_db = env.parse_or_default(
            "SEED_DEVELOPMENT_DB",
            DEFAULT_DEVELOPMENT_DB,
            Namespace::parse,
        )?;
        if production_db == development_db {
            return Err(ConfigError::InvalidEnvVar(
                "SEED_DEVELOPMENT_DB".to_string(),
                format!("must differ from the production namespace ({production_db})"),
            ));
        }
        let active = env.parse_or_default(
            "SEED_ACTIVE_NAMESPACE",
            "development",
            str::parse::<NamespaceKind>,
        )?;

        let service = ServiceCredentialConfig {
            username: env.parse_or_default(
                "APP_DB_USERNAME",
                DEFAULT_SERVICE_USERNAME,
                Username::parse,
            )?,
            secret: env.validated_secret("APP_DB_PASSWORD")?,
        };

        let admin = AdminAccountConfig {
            username: env.parse_or_default("ADMIN_USERNAME", DEFAULT_ADMIN_USERNAME, Username::parse)?,
            email: env.parse_or_default("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL, Email::parse)?,
            password: admin_password_source(&env)?,
        };

        Ok(Self {
            database_url,
            app_name: env.or_default("SEED_APP_NAME", DEFAULT_APP_NAME),
            production_db,
            development_db,
            active,
            service,
            admin,
        })
    }

    /// The namespace named by [`Self::active`].
    #[must_use]
    pub const fn active_namespace(&self) -> &Namespace {
        match self.active {
            NamespaceKind::Production => &self.production_db,
            NamespaceKind::Development => &self.development_db,
        }
    }
}

fn admin_password_source<F: Fn(&str) -> Option<String>>(
    env: &Env<F>,
) -> Result<AdminPasswordSource, ConfigError> {
    if let Some(hash) = env.optional("ADMIN_PASSWORD_HASH") {
        return PasswordHash::parse(&hash)
            .map(AdminPasswordSource::Hash)
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PASSWORD_HASH".to_string(), e.to_string()));
    }
    Ok(env
        .optional("ADMIN_PASSWORD")
        .map_or(AdminPasswordSource::LegacyDefault, |plain| {
            AdminPasswordSource::Plain(SecretString::from(plain))
        }))
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable (or its default) with `parse`.
    fn parse_or_default<T, E: std::fmt::Display>(
        &self,
        key: &str,
        default: &str,
        parse: impl FnOnce(&str) -> Result<T, E>,
    ) -> Result<T, ConfigError> {
        let raw = self.or_default(key, default);
        parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Load and validate a required secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self
            .optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))?;
        let secret = SecretString::from(value);
        validate_secret_strength(&secret, key)?;
        Ok(secret)
    }
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
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is long enough, not a placeholder, and has
/// sufficient entropy.
fn validate_secret_strength(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();

    if value.chars().count() < MIN_SERVICE_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {MIN_SERVICE_SECRET_LENGTH} characters"),
        ));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(value);
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
