//! Role enums.

use serde::{Deserialize, Serialize};

/// Application role held by a user account.
///
/// Stored in the `roles` array of user documents as `"ADMIN"` / `"USER"`;
/// the application prefixes them with `ROLE_` when building authorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Full access including user management.
    Admin,
    /// Regular account: upload and watch videos.
    User,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::User => write!(f, "USER"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Database role held by a service credential.
///
/// The seeder only grants `readWrite`; any other role found on an existing
/// credential is kept by name so inspection can report it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DatabaseRole {
    /// Query documents.
    Read,
    /// Query and modify documents, create collections and indexes.
    ReadWrite,
    /// Any other built-in or custom role, e.g. `dbAdmin`.
    Other(String),
}

impl DatabaseRole {
    /// The engine's name for this role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Read => "read",
            Self::ReadWrite => "readWrite",
            Self::Other(name) => name,
        }
    }

    /// Whether this role allows writes. Unknown roles are assumed not to.
    #[must_use]
    pub const fn can_write(&self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

impl std::fmt::Display for DatabaseRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DatabaseRole {
    fn from(s: &str) -> Self {
        match s {
            "read" => Self::Read,
            "readWrite" => Self::ReadWrite,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for DatabaseRole {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<DatabaseRole> for String {
    fn from(role: DatabaseRole) -> Self {
        match role {
            DatabaseRole::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_wire_names() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(serde_json::to_string(&UserRole::User).unwrap(), "\"USER\"");
        assert_eq!("ADMIN".parse::<UserRole>(), Ok(UserRole::Admin));
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_database_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&DatabaseRole::ReadWrite).unwrap(),
            "\"readWrite\""
        );
        assert_eq!(DatabaseRole::from("readWrite"), DatabaseRole::ReadWrite);
        assert!(DatabaseRole::ReadWrite.can_write());
        assert!(!DatabaseRole::Read.can_write());
    }

    #[test]
    fn test_unknown_database_role_kept_by_name() {
        let role = DatabaseRole::from("dbAdmin");
        assert_eq!(role, DatabaseRole::Other("dbAdmin".to_string()));
        assert_eq!(role.as_str(), "dbAdmin");
        assert!(!role.can_write());
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"dbAdmin\"");
        assert_eq!(
            serde_json::from_str::<DatabaseRole>("\"dbAdmin\"").unwrap(),
            role
        );
    }
}
