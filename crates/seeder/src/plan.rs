//! The seed plan: everything a run will try to create, resolved up front.
//!
//! Building the plan is the only step that can fail before a connection is
//! made (password hashing), so configuration mistakes surface before any
//! state is written.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use video_streaming_core::{
    AdminAccount, IndexSpec, Namespace, NamespaceKind, RoleGrant, Username, schema,
};

use crate::config::SeedConfig;
use crate::password::{PasswordError, resolve_admin_hash};

/// Application service credential to provision.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct ServiceCredential {
    pub username: Username,
    secret: SecretString,
    /// Namespace the credential authenticates against
    pub auth_db: Namespace,
    pub grants: Vec<RoleGrant>,
}

impl ServiceCredential {
    /// Credential with read/write on every namespace in `namespaces`.
    #[must_use]
    pub fn read_write(
        username: Username,
        secret: SecretString,
        auth_db: Namespace,
        namespaces: &[&Namespace],
    ) -> Self {
        Self {
            username,
            secret,
            auth_db,
            grants: namespaces
                .iter()
                .map(|db| RoleGrant::read_write((*db).clone()))
                .collect(),
        }
    }

    /// The credential secret. Never log this.
    #[must_use]
    pub const fn secret(&self) -> &SecretString {
        &self.secret
    }
}

impl std::fmt::Debug for ServiceCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCredential")
            .field("username", &self.username)
            .field("secret", &"[REDACTED]")
            .field("auth_db", &self.auth_db)
            .field("grants", &self.grants)
            .finish()
    }
}

/// Everything one seeding run creates.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub production: Namespace,
    pub development: Namespace,
    pub active: NamespaceKind,
    pub credential: ServiceCredential,
    pub collections: Vec<String>,
    pub indexes: Vec<IndexSpec>,
    pub admin: AdminAccount,
}

impl SeedPlan {
    /// Resolve a plan from configuration, stamping the admin with `now`.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError` if the administrator password cannot be hashed.
    pub fn from_config(config: &SeedConfig, now: DateTime<Utc>) -> Result<Self, PasswordError> {
        let password = resolve_admin_hash(&config.admin.password)?;

        let credential = ServiceCredential::read_write(
            config.service.username.clone(),
            config.service.secret.clone(),
            config.active_namespace().clone(),
            &[&config.production_db, &config.development_db],
        );

        Ok(Self {
            production: config.production_db.clone(),
            development: config.development_db.clone(),
            active: config.active,
            credential,
            collections: schema::COLLECTIONS.iter().map(ToString::to_string).collect(),
            indexes: schema::indexes(),
            admin: AdminAccount::bootstrap(
                config.admin.username.clone(),
                config.admin.email.clone(),
                password,
                now,
            ),
        })
    }

    /// Both namespaces, production first.
    #[must_use]
    pub const fn namespaces(&self) -> [&Namespace; 2] {
        [&self.production, &self.development]
    }

    /// The namespace receiving collections, indexes and the admin document.
    #[must_use]
    pub const fn active_namespace(&self) -> &Namespace {
        match self.active {
            NamespaceKind::Production => &self.production,
            NamespaceKind::Development => &self.development,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;
    use video_streaming_core::{DatabaseRole, UserRole};

    use super::*;

    fn config() -> SeedConfig {
        let vars: HashMap<String, String> = [
            ("MONGODB_URI", "mongodb://localhost:27017"),
            ("APP_DB_PASSWORD", "q7Vd2!kLm9#Rt4xZ"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        SeedConfig::from_map(&vars).unwrap()
    }

    #[test]
    fn test_plan_contents() {
        let now = Utc::now();
        let plan = SeedPlan::from_config(&config(), now).unwrap();

        assert_eq!(plan.collections, ["users", "videos", "video_metadata"]);
        assert_eq!(plan.indexes.len(), 7);
        assert_eq!(plan.active_namespace().as_str(), "video_streaming_dev");
        assert_eq!(plan.admin.username.as_str(), "admin");
        assert!(plan.admin.has_role(UserRole::Admin));
        assert!(plan.admin.has_role(UserRole::User));
        assert_eq!(plan.admin.created_at, now);
    }

    #[test]
    fn test_credential_grants_both_namespaces() {
        let plan = SeedPlan::from_config(&config(), Utc::now()).unwrap();
        let credential = &plan.credential;

        assert_eq!(credential.username.as_str(), "appuser");
        assert_eq!(credential.auth_db.as_str(), "video_streaming_dev");
        assert_eq!(credential.secret().expose_secret(), "q7Vd2!kLm9#Rt4xZ");

        let dbs: Vec<&str> = credential.grants.iter().map(|g| g.db.as_str()).collect();
        assert_eq!(dbs, ["video_streaming", "video_streaming_dev"]);
        assert!(credential
            .grants
            .iter()
            .all(|g| g.role == DatabaseRole::ReadWrite));
    }

    #[test]
    fn test_credential_debug_redacts_secret() {
        let plan = SeedPlan::from_config(&config(), Utc::now()).unwrap();
        let debug = format!("{plan:?}");
        assert!(!debug.contains("q7Vd2!kLm9#Rt4xZ"));
    }
}
