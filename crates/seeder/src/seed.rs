//! Seeding run.
//!
//! Every step is idempotent or fails safely: objects that already exist are
//! left untouched and recorded as [`StepOutcome::AlreadyPresent`]. Any other
//! error aborts the run; steps already applied stay applied.

use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::db::{SeedStore, StoreError};
use crate::plan::SeedPlan;

/// What a single seeding step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The object was created by this run.
    Created,
    /// The object was already there and was left as is.
    AlreadyPresent,
}

impl StepOutcome {
    #[must_use]
    pub const fn is_created(self) -> bool {
        matches!(self, Self::Created)
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::AlreadyPresent => write!(f, "already present"),
        }
    }
}

/// Result of a seeding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    /// Namespaces selected, production first.
    pub namespaces: Vec<String>,
    pub credential: StepOutcome,
    /// Outcome per collection, in creation order.
    pub collections: Vec<(String, StepOutcome)>,
    /// Outcome per index, keyed by its display form.
    pub indexes: Vec<(String, StepOutcome)>,
    pub admin: StepOutcome,
}

impl SeedReport {
    /// Number of objects this run created.
    #[must_use]
    pub fn created(&self) -> usize {
        let steps = [self.credential, self.admin]
            .into_iter()
            .chain(self.collections.iter().map(|(_, o)| *o))
            .chain(self.indexes.iter().map(|(_, o)| *o));
        steps.filter(|o| o.is_created()).count()
    }

    /// Whether every object was already present.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.created() == 0
    }
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "namespaces: {}", self.namespaces.join(", "))?;
        writeln!(f, "credential: {}", self.credential)?;
        for (name, outcome) in &self.collections {
            writeln!(f, "collection {name}: {outcome}")?;
        }
        for (name, outcome) in &self.indexes {
            writeln!(f, "index {name}: {outcome}")?;
        }
        write!(f, "admin: {}", self.admin)
    }
}

/// Swallow an `AlreadyExists` error, propagate everything else.
fn tolerate(result: Result<(), StoreError>) -> Result<StepOutcome, StoreError> {
    match result {
        Ok(()) => Ok(StepOutcome::Created),
        Err(e) if e.is_already_exists() => {
            debug!(error = %e, "Skipping existing object");
            Ok(StepOutcome::AlreadyPresent)
        }
        Err(e) => Err(e),
    }
}

/// Bring `store` to the state described by `plan`.
///
/// # Errors
///
/// Returns the first error that is not [`StoreError::AlreadyExists`]:
/// a conflicting index definition, a connection failure, or any other
/// engine error.
#[instrument(
    skip_all,
    fields(
        active = %plan.active_namespace(),
        credential = %plan.credential.username,
        admin = %plan.admin.username,
    )
)]
pub async fn seed<S: SeedStore>(store: &S, plan: &SeedPlan) -> Result<SeedReport, StoreError> {
    // Namespaces exist once something is written to them.
    let namespaces: Vec<String> = plan.namespaces().iter().map(ToString::to_string).collect();
    debug!(?namespaces, "Selected namespaces");

    let credential = tolerate(store.create_credential(&plan.credential).await)?;
    debug!(%credential, auth_db = %plan.credential.auth_db, "Service credential");

    let db = plan.active_namespace();

    let mut collections = Vec::with_capacity(plan.collections.len());
    for name in &plan.collections {
        let outcome = tolerate(store.create_collection(db, name).await)?;
        debug!(collection = %name, %outcome, "Collection");
        collections.push((name.clone(), outcome));
    }

    let mut indexes = Vec::with_capacity(plan.indexes.len());
    for index in &plan.indexes {
        let outcome = match tolerate(store.create_index(db, index).await) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(index = %index, error = %e, "Index creation failed");
                return Err(e);
            }
        };
        debug!(index = %index, %outcome, "Index");
        indexes.push((index.to_string(), outcome));
    }

    let admin = tolerate(store.insert_account(db, &plan.admin).await)?;

    let report = SeedReport {
        namespaces,
        credential,
        collections,
        indexes,
        admin,
    };

    info!(
        namespaces = report.namespaces.len(),
        credential = %report.credential,
        collections = report.collections.len(),
        indexes = report.indexes.len(),
        admin = %report.admin,
        created = report.created(),
        "Environment seeding completed successfully"
    );

    Ok(report)
}
