//! MongoDB backend.
//!
//! Administrative commands (`createUser`, `createIndexes`, `listIndexes`,
//! `usersInfo`) go through `run_command` so the raw server response is
//! available; document operations use typed collections.

use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, DateTime as BsonDateTime, Document, doc};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use video_streaming_core::{
    AccountFlags, AdminAccount, DatabaseRole, Email, IndexDirection, IndexSpec, Namespace,
    PasswordHash, RoleGrant, UserRole, Username, schema,
};

use super::{Resource, SeedStore, StoreError};
use crate::plan::ServiceCredential;

/// Server error codes the seeder distinguishes.
pub mod codes {
    pub const AUTHENTICATION_FAILED: i32 = 18;
    pub const NAMESPACE_NOT_FOUND: i32 = 26;
    pub const NAMESPACE_EXISTS: i32 = 48;
    pub const INDEX_ALREADY_EXISTS: i32 = 68;
    pub const INDEX_OPTIONS_CONFLICT: i32 = 85;
    pub const INDEX_KEY_SPECS_CONFLICT: i32 = 86;
    pub const DUPLICATE_KEY: i32 = 11000;
    pub const USER_ALREADY_EXISTS: i32 = 51003;
}

/// Seed store backed by a live MongoDB deployment.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Connect and ping the server.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConnectionFailure`] if the connection string is
    /// invalid or the server cannot be reached or authenticated against.
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &SecretString, app_name: &str) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(database_url.expose_secret())
            .await
            .map_err(|e| StoreError::ConnectionFailure(e.to_string()))?;
        options.app_name = Some(app_name.to_owned());

        let client = Client::with_options(options)
            .map_err(|e| StoreError::ConnectionFailure(e.to_string()))?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::ConnectionFailure(e.to_string()))?;

        info!("Connected to database");
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn db(&self, namespace: &Namespace) -> Database {
        self.client.database(namespace.as_str())
    }
}

impl SeedStore for MongoStore {
    async fn create_credential(&self, credential: &ServiceCredential) -> Result<(), StoreError> {
        let roles: Vec<Document> = credential
            .grants
            .iter()
            .map(|grant| doc! { "role": grant.role.as_str(), "db": grant.db.as_str() })
            .collect();

        self.db(&credential.auth_db)
            .run_command(doc! {
                "createUser": credential.username.as_str(),
                "pwd": credential.secret().expose_secret(),
                "roles": roles,
            })
            .await
            .map_err(|e| classify(&e, Resource::Credential))?;
        Ok(())
    }

    async fn create_collection(&self, db: &Namespace, name: &str) -> Result<(), StoreError> {
        let database = self.db(db);

        // Servers since 7.0 accept createCollection on an existing collection.
        let existing = database
            .list_collection_names()
            .filter(doc! { "name": name })
            .await
            .map_err(|e| classify(&e, Resource::Collection))?;
        if existing.iter().any(|n| n == name) {
            return Err(StoreError::AlreadyExists {
                resource: Resource::Collection,
                message: format!("Collection {db}.{name} already exists."),
            });
        }

        // Code 48 still covers a concurrent creation on older servers.
        database
            .create_collection(name)
            .await
            .map_err(|e| classify(&e, Resource::Collection))
    }

    async fn create_index(&self, db: &Namespace, index: &IndexSpec) -> Result<(), StoreError> {
        let mut key = Document::new();
        key.insert(index.field.as_str(), index.direction.as_i32());

        let mut spec = doc! { "key": key, "name": index.name() };
        if index.unique {
            spec.insert("unique", true);
        }

        let indexes = vec![spec];
        let response = self
            .db(db)
            .run_command(doc! {
                "createIndexes": index.collection.as_str(),
                "indexes": indexes,
            })
            .await
            .map_err(|e| classify(&e, Resource::Index))?;

        index_reply(&response)
    }

    async fn insert_account(&self, db: &Namespace, account: &AdminAccount) -> Result<(), StoreError> {
        self.db(db)
            .collection::<Document>(schema::USERS)
            .insert_one(user_document(account))
            .await
            .map_err(|e| classify(&e, Resource::Document))?;
        Ok(())
    }

    async fn collection_names(&self, db: &Namespace) -> Result<Vec<String>, StoreError> {
        self.db(db)
            .list_collection_names()
            .await
            .map_err(|e| classify(&e, Resource::Collection))
    }

    async fn indexes(&self, db: &Namespace, collection: &str) -> Result<Vec<IndexSpec>, StoreError> {
        let response = match self
            .db(db)
            .run_command(doc! { "listIndexes": collection })
            .await
        {
            Ok(response) => response,
            Err(e) if server_code(&e) == Some(codes::NAMESPACE_NOT_FOUND) => return Ok(Vec::new()),
            Err(e) => return Err(classify(&e, Resource::Index)),
        };

        let batch = response
            .get_document("cursor")
            .and_then(|cursor| cursor.get_array("firstBatch"))
            .map_err(|e| StoreError::Database(format!("malformed listIndexes reply: {e}")))?;

        Ok(batch
            .iter()
            .filter_map(Bson::as_document)
            .filter_map(|index| parse_index(collection, index))
            .collect())
    }

    async fn count_accounts(&self, db: &Namespace, username: &Username) -> Result<u64, StoreError> {
        self.db(db)
            .collection::<Document>(schema::USERS)
            .count_documents(username_filter(username))
            .await
            .map_err(|e| classify(&e, Resource::Document))
    }

    async fn find_account(
        &self,
        db: &Namespace,
        username: &Username,
    ) -> Result<Option<AdminAccount>, StoreError> {
        let found = self
            .db(db)
            .collection::<UserDocument>(schema::USERS)
            .find_one(username_filter(username))
            .await
            .map_err(|e| classify(&e, Resource::Document))?;
        Ok(found.map(AdminAccount::from))
    }

    async fn credential_grants(
        &self,
        auth_db: &Namespace,
        username: &Username,
    ) -> Result<Option<Vec<RoleGrant>>, StoreError> {
        let response = self
            .db(auth_db)
            .run_command(doc! { "usersInfo": username.as_str() })
            .await
            .map_err(|e| classify(&e, Resource::Credential))?;

        users_info_grants(&response)
    }
}

// =============================================================================
// Error classification
// =============================================================================

/// Map a driver error onto the seeding taxonomy.
pub fn classify(err: &MongoError, resource: Resource) -> StoreError {
    let message = err.to_string();
    if matches!(
        err.kind.as_ref(),
        ErrorKind::Io(_)
            | ErrorKind::ServerSelection { .. }
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::Authentication { .. }
    ) {
        return StoreError::ConnectionFailure(message);
    }
    classify_code(server_code(err), resource, message)
}

/// Classification by server error code, given which resource was touched.
///
/// Duplicate key means "already there" for an insert but "existing data
/// violates the new unique index" for an index build.
#[must_use]
pub fn classify_code(code: Option<i32>, resource: Resource, message: String) -> StoreError {
    match (code, resource) {
        (Some(codes::DUPLICATE_KEY), Resource::Document)
        | (Some(codes::NAMESPACE_EXISTS), Resource::Collection)
        | (Some(codes::USER_ALREADY_EXISTS), Resource::Credential) => {
            StoreError::AlreadyExists { resource, message }
        }
        (
            Some(
                codes::INDEX_ALREADY_EXISTS
                | codes::INDEX_OPTIONS_CONFLICT
                | codes::INDEX_KEY_SPECS_CONFLICT
                | codes::DUPLICATE_KEY,
            ),
            Resource::Index,
        ) => StoreError::ConflictingDefinition { resource, message },
        (Some(codes::AUTHENTICATION_FAILED), _) => StoreError::ConnectionFailure(message),
        _ => StoreError::Database(message),
    }
}

/// Interpret a successful `createIndexes` reply.
///
/// The server reports an identical index by leaving the index count
/// unchanged. Replies routed through `mongos` carry per-shard results under
/// `raw` instead of counts and are taken as created.
fn index_reply(response: &Document) -> Result<(), StoreError> {
    let before = response.get("numIndexesBefore").and_then(bson_int);
    let after = response.get("numIndexesAfter").and_then(bson_int);
    if before.is_some() && before == after {
        return Err(StoreError::AlreadyExists {
            resource: Resource::Index,
            message: response
                .get_str("note")
                .unwrap_or("all indexes already exist")
                .to_owned(),
        });
    }
    Ok(())
}

fn server_code(err: &MongoError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(command) => Some(command.code),
        ErrorKind::Write(WriteFailure::WriteError(write)) => Some(write.code),
        _ => None,
    }
}

// =============================================================================
// Document mapping
// =============================================================================

/// A stored user as the application persists it. Flags missing from the
/// document read as `false`.
#[derive(Debug, Deserialize)]
struct UserDocument {
    username: Username,
    email: Email,
    password: PasswordHash,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    account_non_expired: bool,
    #[serde(default)]
    account_non_locked: bool,
    #[serde(default)]
    credentials_non_expired: bool,
    created_at: Option<BsonDateTime>,
    updated_at: Option<BsonDateTime>,
}

impl From<UserDocument> for AdminAccount {
    fn from(doc: UserDocument) -> Self {
        Self {
            username: doc.username,
            email: doc.email,
            password: doc.password,
            roles: doc.roles.iter().filter_map(|r| r.parse::<UserRole>().ok()).collect(),
            flags: AccountFlags {
                enabled: doc.enabled,
                account_non_expired: doc.account_non_expired,
                account_non_locked: doc.account_non_locked,
                credentials_non_expired: doc.credentials_non_expired,
            },
            created_at: to_chrono(doc.created_at),
            updated_at: to_chrono(doc.updated_at),
        }
    }
}

fn to_chrono(value: Option<BsonDateTime>) -> DateTime<Utc> {
    value
        .and_then(|dt| DateTime::from_timestamp_millis(dt.timestamp_millis()))
        .unwrap_or_default()
}

fn user_document(account: &AdminAccount) -> Document {
    use schema::user;

    let roles: Vec<String> = account.roles.iter().map(ToString::to_string).collect();
    let mut document = Document::new();
    document.insert(user::USERNAME, account.username.as_str());
    document.insert(user::EMAIL, account.email.as_str());
    document.insert(user::PASSWORD, account.password.as_str());
    document.insert(user::ROLES, roles);
    document.insert(user::ENABLED, account.flags.enabled);
    document.insert(user::ACCOUNT_NON_EXPIRED, account.flags.account_non_expired);
    document.insert(user::ACCOUNT_NON_LOCKED, account.flags.account_non_locked);
    document.insert(user::CREDENTIALS_NON_EXPIRED, account.flags.credentials_non_expired);
    document.insert(
        user::CREATED_AT,
        BsonDateTime::from_millis(account.created_at.timestamp_millis()),
    );
    document.insert(
        user::UPDATED_AT,
        BsonDateTime::from_millis(account.updated_at.timestamp_millis()),
    );
    document
}

fn username_filter(username: &Username) -> Document {
    let mut filter = Document::new();
    filter.insert(schema::user::USERNAME, username.as_str());
    filter
}

fn parse_index(collection: &str, index: &Document) -> Option<IndexSpec> {
    if index.get_str("name").is_ok_and(|name| name == "_id_") {
        return None;
    }
    let key = index.get_document("key").ok()?;
    let mut fields = key.iter();
    let (field, value) = fields.next()?;
    if fields.next().is_some() {
        debug!(collection, ?key, "Skipping compound index");
        return None;
    }
    let direction = bson_int(value)
        .and_then(|v| i32::try_from(v).ok())
        .and_then(IndexDirection::from_i32)?;

    Some(IndexSpec {
        collection: collection.to_owned(),
        field: field.clone(),
        direction,
        unique: index.get_bool("unique").unwrap_or(false),
    })
}

/// Grants of the first user in a `usersInfo` reply, `None` if it lists no user.
fn users_info_grants(response: &Document) -> Result<Option<Vec<RoleGrant>>, StoreError> {
    let malformed = |e: mongodb::bson::document::ValueAccessError| {
        StoreError::Database(format!("malformed usersInfo reply: {e}"))
    };
    let users = response.get_array("users").map_err(malformed)?;
    let Some(user) = users.iter().find_map(Bson::as_document) else {
        return Ok(None);
    };

    user.get_array("roles")
        .map_err(malformed)?
        .iter()
        .filter_map(Bson::as_document)
        .map(parse_grant)
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn parse_grant(role: &Document) -> Result<RoleGrant, StoreError> {
    let malformed = |e: String| StoreError::Database(format!("unexpected role grant: {e}"));
    let name = role.get_str("role").map_err(|e| malformed(e.to_string()))?;
    let db = role.get_str("db").map_err(|e| malformed(e.to_string()))?;
    Ok(RoleGrant {
        role: DatabaseRole::from(name),
        db: Namespace::parse(db).map_err(|e| malformed(e.to_string()))?,
    })
}

/// Integer value of a numeric BSON field.
fn bson_int(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        #[allow(clippy::cast_possible_truncation)] // guarded by the fract check
        Bson::Double(v) if v.fract().abs() < f64::EPSILON => Some(*v as i64),
        _ => None,
    }
}
