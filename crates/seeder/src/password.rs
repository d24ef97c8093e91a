//! Administrator password hashing.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash as PhcHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::warn;
use video_streaming_core::{PasswordHash, PasswordHashError};

use crate::config::AdminPasswordSource;

/// bcrypt hash shipped by the legacy bootstrap script.
///
/// Its clear text is publicly known; it only exists so a stock deployment
/// still gets a working administrator login.
pub const LEGACY_ADMIN_PASSWORD_HASH: &str =
    "$2a$10$N.zmdr9k7uOCQb376NoUnuTJ8iAt6Z5EHsM8lE9lBOsl7iKTVEFDi";

const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur while producing a password hash.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    TooShort,

    #[error("failed to hash password")]
    Hash,

    #[error(transparent)]
    Format(#[from] PasswordHashError),
}

/// Hash a password using Argon2id with a random salt.
///
/// # Errors
///
/// Returns [`PasswordError::TooShort`] for passwords under eight characters
/// and [`PasswordError::Hash`] if hashing fails.
pub fn hash_password(password: &SecretString) -> Result<PasswordHash, PasswordError> {
    let password = password.expose_secret();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }

    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)?;

    Ok(PasswordHash::parse(&phc)?)
}

/// Check `password` against an argon2 hash. bcrypt hashes never verify here.
#[must_use]
pub fn verify_password(password: &str, hash: &PasswordHash) -> bool {
    PhcHash::new(hash.as_str()).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Produce the hash to store for the bootstrap administrator.
///
/// # Errors
///
/// Propagates [`hash_password`] failures for clear-text sources.
pub fn resolve_admin_hash(source: &AdminPasswordSource) -> Result<PasswordHash, PasswordError> {
    match source {
        AdminPasswordSource::Hash(hash) => Ok(hash.clone()),
        AdminPasswordSource::Plain(password) => hash_password(password),
        AdminPasswordSource::LegacyDefault => {
            warn!(
                "No ADMIN_PASSWORD_HASH or ADMIN_PASSWORD set; seeding the administrator with the well-known legacy password. Change it after first login."
            );
            Ok(PasswordHash::parse(LEGACY_ADMIN_PASSWORD_HASH)?)
        }
    }
}
