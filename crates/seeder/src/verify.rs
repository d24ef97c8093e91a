//! Post-seed inspection.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{info, instrument};
use video_streaming_core::{PasswordHash, RoleGrant, UserRole};

use crate::db::{SeedStore, StoreError};
use crate::plan::SeedPlan;

/// Observed state of a seeded environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Namespaces the plan names.
    pub namespaces: usize,
    /// Planned collections present in the active namespace.
    pub collections_present: usize,
    pub collections_expected: usize,
    /// Planned indexes whose field, direction and uniqueness all match.
    pub indexes_matching: usize,
    pub indexes_expected: usize,
    /// Planned indexes missing or defined differently.
    pub indexes_missing: Vec<String>,
    /// User documents with the administrator's username.
    pub admin_count: u64,
    pub admin_has_roles: bool,
    pub admin_enabled: bool,
    pub admin_password_hashed: bool,
    /// Credential exists with exactly `readWrite` on both namespaces.
    pub credential_scoped: bool,
}

impl VerifyReport {
    /// Whether every check holds.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.namespaces == 2
            && self.collections_present == self.collections_expected
            && self.indexes_matching == self.indexes_expected
            && self.indexes_missing.is_empty()
            && self.admin_count == 1
            && self.admin_has_roles
            && self.admin_enabled
            && self.admin_password_hashed
            && self.credential_scoped
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "namespaces: {}", self.namespaces)?;
        writeln!(
            f,
            "collections: {}/{}",
            self.collections_present, self.collections_expected
        )?;
        writeln!(
            f,
            "indexes: {}/{}",
            self.indexes_matching, self.indexes_expected
        )?;
        for index in &self.indexes_missing {
            writeln!(f, "  missing: {index}")?;
        }
        writeln!(f, "admin documents: {}", self.admin_count)?;
        writeln!(f, "admin roles ADMIN+USER: {}", self.admin_has_roles)?;
        writeln!(f, "admin enabled: {}", self.admin_enabled)?;
        writeln!(f, "admin password hashed: {}", self.admin_password_hashed)?;
        write!(f, "credential readWrite on both namespaces: {}", self.credential_scoped)
    }
}

/// Inspect `store` against `plan` without modifying anything.
///
/// # Errors
///
/// Returns any store error raised while reading state.
#[instrument(skip_all, fields(active = %plan.active_namespace()))]
pub async fn verify<S: SeedStore>(store: &S, plan: &SeedPlan) -> Result<VerifyReport, StoreError> {
    let db = plan.active_namespace();

    let existing = store.collection_names(db).await?;
    let collections_present = plan
        .collections
        .iter()
        .filter(|name| existing.contains(name))
        .count();

    let mut indexes_missing = Vec::new();
    for spec in &plan.indexes {
        if !store.indexes(db, &spec.collection).await?.contains(spec) {
            indexes_missing.push(spec.to_string());
        }
    }

    let admin_count = store.count_accounts(db, &plan.admin.username).await?;
    let admin = store.find_account(db, &plan.admin.username).await?;
    let (admin_has_roles, admin_enabled, admin_password_hashed) =
        admin.as_ref().map_or((false, false, false), |account| {
            (
                account.has_role(UserRole::Admin) && account.has_role(UserRole::User),
                account.flags.enabled,
                PasswordHash::looks_hashed(account.password.as_str()),
            )
        });

    let expected: BTreeSet<RoleGrant> = plan
        .namespaces()
        .into_iter()
        .map(|db| RoleGrant::read_write(db.clone()))
        .collect();
    let credential_scoped = store
        .credential_grants(&plan.credential.auth_db, &plan.credential.username)
        .await?
        .is_some_and(|grants| {
            grants.len() == expected.len() && grants.into_iter().collect::<BTreeSet<_>>() == expected
        });

    let report = VerifyReport {
        namespaces: plan.namespaces().len(),
        collections_present,
        collections_expected: plan.collections.len(),
        indexes_matching: plan.indexes.len() - indexes_missing.len(),
        indexes_expected: plan.indexes.len(),
        indexes_missing,
        admin_count,
        admin_has_roles,
        admin_enabled,
        admin_password_hashed,
        credential_scoped,
    };

    info!(
        complete = report.is_complete(),
        collections = report.collections_present,
        indexes = report.indexes_matching,
        admin_count = report.admin_count,
        "Verification finished"
    );

    Ok(report)
}
