//! In-memory seed store.
//!
//! Models the engine behaviour the seeder depends on:
//!
//! - Collections and databases materialize on first write (index build or
//!   insert), not on selection
//! - Unique indexes reject duplicate values, treating a missing field as null
//! - Re-creating an identical index is reported as already existing; the same
//!   key with different options is a conflict
//! - Building a unique index over existing duplicates fails
//! - Credentials live in their authentication namespace and only reach the
//!   namespaces they were granted

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use video_streaming_core::{
    AdminAccount, DatabaseRole, IndexSpec, Namespace, RoleGrant, Username, schema,
};

use super::{Resource, SeedStore, StoreError};
use crate::plan::ServiceCredential;

#[derive(Debug, Default)]
struct Collection {
    indexes: Vec<IndexSpec>,
    documents: Vec<Value>,
}

impl Collection {
    fn value_of<'a>(document: &'a Value, field: &str) -> &'a Value {
        document.get(field).unwrap_or(&Value::Null)
    }

    fn has_duplicates(&self, field: &str) -> bool {
        self.documents.iter().enumerate().any(|(i, a)| {
            self.documents
                .iter()
                .skip(i + 1)
                .any(|b| Self::value_of(a, field) == Self::value_of(b, field))
        })
    }
}

#[derive(Debug, Default)]
struct State {
    /// database name -> collection name -> collection
    databases: BTreeMap<String, BTreeMap<String, Collection>>,
    /// (authentication database, username) -> grants
    credentials: BTreeMap<(Namespace, Username), Vec<RoleGrant>>,
}

/// Seed store holding all state in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    unreachable: bool,
}

impl MemoryStore {
    /// An empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that fails every call as if the server were down.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        if self.unreachable {
            return Err(StoreError::ConnectionFailure(
                "server selection timeout: no available servers".to_string(),
            ));
        }
        Ok(self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Insert an arbitrary document, enforcing unique indexes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] on a duplicate key and
    /// [`StoreError::ConnectionFailure`] if the store is unreachable.
    pub fn insert_document(
        &self,
        db: &Namespace,
        collection: &str,
        document: Value,
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let target = state
            .databases
            .entry(db.to_string())
            .or_default()
            .entry(collection.to_owned())
            .or_default();

        for index in target.indexes.iter().filter(|i| i.unique) {
            let value = Collection::value_of(&document, &index.field);
            if target
                .documents
                .iter()
                .any(|existing| Collection::value_of(existing, &index.field) == value)
            {
                return Err(StoreError::AlreadyExists {
                    resource: Resource::Document,
                    message: format!(
                        "E11000 duplicate key error collection: {db}.{collection} index: {} dup key: {{ {}: {value} }}",
                        index.name(),
                        index.field
                    ),
                });
            }
        }

        target.documents.push(document);
        Ok(())
    }

    /// Documents in `collection` whose `field` equals `value`.
    #[must_use]
    pub fn find_documents(
        &self,
        db: &Namespace,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Vec<Value> {
        let Ok(state) = self.lock() else {
            return Vec::new();
        };
        state
            .databases
            .get(db.as_str())
            .and_then(|collections| collections.get(collection))
            .map(|c| {
                c.documents
                    .iter()
                    .filter(|d| Collection::value_of(d, field) == value)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Databases holding at least one collection.
    #[must_use]
    pub fn database_names(&self) -> Vec<String> {
        self.lock()
            .map(|state| {
                state
                    .databases
                    .iter()
                    .filter(|(_, collections)| !collections.is_empty())
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of credentials across all authentication namespaces.
    #[must_use]
    pub fn credential_count(&self) -> usize {
        self.lock().map(|state| state.credentials.len()).unwrap_or_default()
    }

    /// Whether any credential named `username` may read `db`.
    #[must_use]
    pub fn can_read(&self, username: &Username, db: &Namespace) -> bool {
        self.granted(username, db, |_| true)
    }

    /// Whether any credential named `username` may write `db`.
    #[must_use]
    pub fn can_write(&self, username: &Username, db: &Namespace) -> bool {
        self.granted(username, db, DatabaseRole::can_write)
    }

    fn granted(
        &self,
        username: &Username,
        db: &Namespace,
        allows: impl Fn(&DatabaseRole) -> bool,
    ) -> bool {
        self.lock().is_ok_and(|state| {
            state
                .credentials
                .iter()
                .filter(|((_, user), _)| user == username)
                .flat_map(|(_, grants)| grants)
                .any(|grant| &grant.db == db && allows(&grant.role))
        })
    }
}

impl SeedStore for MemoryStore {
    async fn create_credential(&self, credential: &ServiceCredential) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let key = (credential.auth_db.clone(), credential.username.clone());
        if state.credentials.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                resource: Resource::Credential,
                message: format!(
                    "User \"{}@{}\" already exists",
                    credential.username, credential.auth_db
                ),
            });
        }
        state.credentials.insert(key, credential.grants.clone());
        Ok(())
    }

    async fn create_collection(&self, db: &Namespace, name: &str) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let collections = state.databases.entry(db.to_string()).or_default();
        if collections.contains_key(name) {
            return Err(StoreError::AlreadyExists {
                resource: Resource::Collection,
                message: format!("Collection {db}.{name} already exists."),
            });
        }
        collections.insert(name.to_owned(), Collection::default());
        Ok(())
    }

    async fn create_index(&self, db: &Namespace, index: &IndexSpec) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let collection = state
            .databases
            .entry(db.to_string())
            .or_default()
            .entry(index.collection.clone())
            .or_default();

        if let Some(existing) = collection.indexes.iter().find(|i| i.same_key(index)) {
            if existing == index {
                return Err(StoreError::AlreadyExists {
                    resource: Resource::Index,
                    message: "all indexes already exist".to_string(),
                });
            }
            return Err(StoreError::ConflictingDefinition {
                resource: Resource::Index,
                message: format!(
                    "An index with the same key pattern already exists with different options. Requested index: {index}, existing index: {existing}"
                ),
            });
        }

        if index.unique && collection.has_duplicates(&index.field) {
            return Err(StoreError::ConflictingDefinition {
                resource: Resource::Index,
                message: format!(
                    "E11000 duplicate key error collection: {db}.{} index: {}",
                    index.collection,
                    index.name()
                ),
            });
        }

        collection.indexes.push(index.clone());
        Ok(())
    }

    async fn insert_account(&self, db: &Namespace, account: &AdminAccount) -> Result<(), StoreError> {
        let document =
            serde_json::to_value(account).map_err(|e| StoreError::Database(e.to_string()))?;
        self.insert_document(db, schema::USERS, document)
    }

    async fn collection_names(&self, db: &Namespace) -> Result<Vec<String>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .databases
            .get(db.as_str())
            .map(|collections| collections.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn indexes(&self, db: &Namespace, collection: &str) -> Result<Vec<IndexSpec>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .databases
            .get(db.as_str())
            .and_then(|collections| collections.get(collection))
            .map(|c| c.indexes.clone())
            .unwrap_or_default())
    }

    async fn count_accounts(&self, db: &Namespace, username: &Username) -> Result<u64, StoreError> {
        self.lock()?;
        let matches = self.find_documents(
            db,
            schema::USERS,
            schema::user::USERNAME,
            &Value::from(username.as_str()),
        );
        Ok(matches.len() as u64)
    }

    async fn find_account(
        &self,
        db: &Namespace,
        username: &Username,
    ) -> Result<Option<AdminAccount>, StoreError> {
        self.lock()?;
        self.find_documents(
            db,
            schema::USERS,
            schema::user::USERNAME,
            &Value::from(username.as_str()),
        )
        .into_iter()
        .next()
        .map(|document| {
            serde_json::from_value(document).map_err(|e| StoreError::Database(e.to_string()))
        })
        .transpose()
    }

    async fn credential_grants(
        &self,
        auth_db: &Namespace,
        username: &Username,
    ) -> Result<Option<Vec<RoleGrant>>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .credentials
            .get(&(auth_db.clone(), username.clone()))
            .cloned())
    }
}
