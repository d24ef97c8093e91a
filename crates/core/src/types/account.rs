//! User account types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, PasswordHash, UserRole, Username};

/// Account status flags checked by the application at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountFlags {
    pub enabled: bool,
    pub account_non_expired: bool,
    pub account_non_locked: bool,
    pub credentials_non_expired: bool,
}

impl AccountFlags {
    /// Every flag in its "good" state.
    #[must_use]
    pub const fn active() -> Self {
        Self {
            enabled: true,
            account_non_expired: true,
            account_non_locked: true,
            credentials_non_expired: true,
        }
    }

    /// Whether the account can log in.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.enabled
            && self.account_non_expired
            && self.account_non_locked
            && self.credentials_non_expired
    }
}

impl Default for AccountFlags {
    fn default() -> Self {
        Self::active()
    }
}

/// A user account as written by the seeder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub username: Username,
    pub email: Email,
    pub password: PasswordHash,
    pub roles: BTreeSet<UserRole>,
    #[serde(flatten)]
    pub flags: AccountFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminAccount {
    /// The bootstrap administrator: roles {ADMIN, USER}, all flags active,
    /// both timestamps set to `now`.
    #[must_use]
    pub fn bootstrap(
        username: Username,
        email: Email,
        password: PasswordHash,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            username,
            email,
            password,
            roles: BTreeSet::from([UserRole::Admin, UserRole::User]),
            flags: AccountFlags::active(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the account holds `role`.
    #[must_use]
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }
}
