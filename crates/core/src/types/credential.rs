//! Credential material: stored password hashes and role grants.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{DatabaseRole, Namespace};

/// Length of a modular-crypt bcrypt hash (`$2b$10$` + 22 salt + 31 digest).
const BCRYPT_HASH_LENGTH: usize = 60;

const BCRYPT_PREFIXES: &[&str] = &["$2a$", "$2b$", "$2y$"];
const ARGON2_PREFIXES: &[&str] = &["$argon2id$", "$argon2i$", "$argon2d$"];

/// Errors that can occur when accepting a [`PasswordHash`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordHashError {
    /// The value is not a recognised bcrypt or argon2 hash string.
    #[error("value is not a bcrypt or argon2 hash")]
    NotAHash,
}

/// A salted password hash, ready to be stored in the `password` field.
///
/// Only bcrypt (`$2a$`, `$2b$`, `$2y$`) and argon2 PHC strings are accepted,
/// so a clear-text password can never be stored through this type.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Accept an already-computed hash.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError::NotAHash`] if the value does not look
    /// like a bcrypt or argon2 hash.
    pub fn parse(s: &str) -> Result<Self, PasswordHashError> {
        if Self::looks_hashed(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(PasswordHashError::NotAHash)
        }
    }

    /// Whether `s` has the shape of a supported hash string.
    #[must_use]
    pub fn looks_hashed(s: &str) -> bool {
        let bcrypt = BCRYPT_PREFIXES.iter().any(|p| s.starts_with(p))
            && s.len() == BCRYPT_HASH_LENGTH;
        let argon2 = ARGON2_PREFIXES.iter().any(|p| s.starts_with(p))
            && s.split('$').filter(|part| !part.is_empty()).count() >= 4;
        bcrypt || argon2
    }

    /// Returns the hash string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a bcrypt hash.
    #[must_use]
    pub fn is_bcrypt(&self) -> bool {
        BCRYPT_PREFIXES.iter().any(|p| self.0.starts_with(p))
    }
}

// Hashes are not secrets, but they are offline-crackable; keep them out of logs.
impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.is_bcrypt() { "bcrypt" } else { "argon2" };
        write!(f, "PasswordHash({scheme}, [REDACTED])")
    }
}

/// A role granted on one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleGrant {
    /// Granted role.
    pub role: DatabaseRole,
    /// Namespace the role applies to.
    pub db: Namespace,
}

impl RoleGrant {
    /// Grant read/write on `db`.
    #[must_use]
    pub const fn read_write(db: Namespace) -> Self {
        Self {
            role: DatabaseRole::ReadWrite,
            db,
        }
    }
}
