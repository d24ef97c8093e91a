//! Database access for seeding.
//!
//! # Backends
//!
//! - [`MongoStore`] - The `mongodb` driver against a live server
//! - [`MemoryStore`] - An in-process model of the same engine rules, used
//!   for dry runs and tests
//!
//! # Error classification
//!
//! Every backend reports failures through [`StoreError`]. The seeder swallows
//! [`StoreError::AlreadyExists`] per step and aborts on everything else.

pub mod memory;
pub mod mongo;

use std::fmt;
use std::future::Future;

use thiserror::Error;
use video_streaming_core::{AdminAccount, IndexSpec, Namespace, RoleGrant, Username};

use crate::plan::ServiceCredential;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Kind of object a store operation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Credential,
    Collection,
    Index,
    Document,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credential => write!(f, "credential"),
            Self::Collection => write!(f, "collection"),
            Self::Index => write!(f, "index"),
            Self::Document => write!(f, "document"),
        }
    }
}

/// Errors that can occur during store operations.
///
/// Messages carry the engine's own wording.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object is already present. Expected on re-runs.
    #[error("{resource} already exists: {message}")]
    AlreadyExists { resource: Resource, message: String },

    /// An object with the same name exists with a different definition.
    #[error("conflicting {resource} definition: {message}")]
    ConflictingDefinition { resource: Resource, message: String },

    /// The server could not be reached or refused authentication.
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    /// Any other engine error.
    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Whether this error only says the object is already there.
    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

/// An administrative handle on the document database.
///
/// Mutating operations report an existing object as
/// [`StoreError::AlreadyExists`]; creating an index whose definition is
/// identical to an existing one counts as already existing.
pub trait SeedStore: Send + Sync {
    /// Create `credential` in its authentication namespace.
    fn create_credential(
        &self,
        credential: &ServiceCredential,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Create an empty collection.
    fn create_collection(
        &self,
        db: &Namespace,
        name: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Build a single-field index.
    fn create_index(
        &self,
        db: &Namespace,
        index: &IndexSpec,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Insert a user document.
    fn insert_account(
        &self,
        db: &Namespace,
        account: &AdminAccount,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Names of the collections in `db`.
    fn collection_names(
        &self,
        db: &Namespace,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Secondary indexes on `collection`, excluding the primary key index.
    /// A missing collection has no indexes.
    fn indexes(
        &self,
        db: &Namespace,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<IndexSpec>, StoreError>> + Send;

    /// Number of user documents with `username`.
    fn count_accounts(
        &self,
        db: &Namespace,
        username: &Username,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// The user document with `username`, if any.
    fn find_account(
        &self,
        db: &Namespace,
        username: &Username,
    ) -> impl Future<Output = Result<Option<AdminAccount>, StoreError>> + Send;

    /// Role grants of a credential, or `None` if it does not exist.
    fn credential_grants(
        &self,
        auth_db: &Namespace,
        username: &Username,
    ) -> impl Future<Output = Result<Option<Vec<RoleGrant>>, StoreError>> + Send;
}
