//! Seeding properties against the in-memory engine.
//!
//! Run with: cargo test -p video-streaming-integration-tests

#![allow(clippy::unwrap_used)]

use serde_json::json;
use video_streaming_core::{
    IndexDirection, IndexSpec, Namespace, PasswordHash, UserRole, Username, schema,
};
use video_streaming_integration_tests::{test_config, test_plan};
use video_streaming_seeder::password::verify_password;
use video_streaming_seeder::{
    MemoryStore, SeedStore, StepOutcome, StoreError, seed, verify,
};

fn ns(name: &str) -> Namespace {
    Namespace::parse(name).unwrap()
}

// ============================================================================
// Idempotence
// ============================================================================

#[tokio::test]
async fn test_two_runs_leave_same_counts() {
    let store = MemoryStore::new();
    let plan = test_plan(&[]).unwrap();
    let db = plan.active_namespace();

    seed(&store, &plan).await.unwrap();
    let second = seed(&store, &plan).await.unwrap();

    assert!(second.is_noop());
    assert_eq!(second.namespaces.len(), 2);
    assert_eq!(verify(&store, &plan).await.unwrap().namespaces, 2);
    assert_eq!(store.collection_names(db).await.unwrap().len(), 3);

    let mut index_count = 0;
    for collection in schema::COLLECTIONS {
        index_count += store.indexes(db, collection).await.unwrap().len();
    }
    assert_eq!(index_count, 7);
    assert_eq!(store.count_accounts(db, &plan.admin.username).await.unwrap(), 1);
    assert_eq!(store.credential_count(), 1);
}

#[tokio::test]
async fn test_seed_over_partial_state() {
    let store = MemoryStore::new();
    let plan = test_plan(&[]).unwrap();
    let db = plan.active_namespace();

    store.create_collection(db, schema::VIDEOS).await.unwrap();
    store
        .create_index(db, &IndexSpec::ascending(schema::VIDEOS, schema::video::STATUS))
        .await
        .unwrap();

    let report = seed(&store, &plan).await.unwrap();
    let outcome = |name: &str| {
        report
            .collections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, o)| *o)
            .unwrap()
    };
    assert_eq!(outcome(schema::USERS), StepOutcome::Created);
    assert_eq!(outcome(schema::VIDEOS), StepOutcome::AlreadyPresent);
    assert_eq!(
        report
            .indexes
            .iter()
            .filter(|(_, o)| *o == StepOutcome::AlreadyPresent)
            .count(),
        1
    );
    assert!(verify(&store, &plan).await.unwrap().is_complete());
}

// ============================================================================
// Uniqueness
// ============================================================================

#[tokio::test]
async fn test_second_admin_rejected_and_first_kept() {
    let store = MemoryStore::new();
    let plan = test_plan(&[]).unwrap();
    let db = plan.active_namespace();
    seed(&store, &plan).await.unwrap();

    let err = store
        .insert_document(
            db,
            schema::USERS,
            json!({ "username": "admin", "email": "other@videostreaming.com" }),
        )
        .unwrap_err();
    assert!(err.is_already_exists());
    assert!(err.to_string().contains("duplicate key"));

    let admin = store.find_account(db, &plan.admin.username).await.unwrap().unwrap();
    assert_eq!(admin.email.as_str(), "admin@videostreaming.com");
    assert_eq!(store.count_accounts(db, &plan.admin.username).await.unwrap(), 1);
}

#[tokio::test]
async fn test_existing_email_rejected() {
    let store = MemoryStore::new();
    let plan = test_plan(&[]).unwrap();
    let db = plan.active_namespace();
    seed(&store, &plan).await.unwrap();

    let err = store
        .insert_document(
            db,
            schema::USERS,
            json!({ "username": "someone", "email": "admin@videostreaming.com" }),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));

    let someone = Username::parse("someone").unwrap();
    assert_eq!(store.count_accounts(db, &someone).await.unwrap(), 0);
}

#[tokio::test]
async fn test_existing_admin_never_overwritten() {
    let store = MemoryStore::new();
    let first = test_plan(&[("ADMIN_EMAIL", "ops@videostreaming.com")]).unwrap();
    seed(&store, &first).await.unwrap();

    let second = test_plan(&[]).unwrap();
    let report = seed(&store, &second).await.unwrap();
    assert_eq!(report.admin, StepOutcome::AlreadyPresent);

    let admin = store
        .find_account(second.active_namespace(), &second.admin.username)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(admin.email.as_str(), "ops@videostreaming.com");
}

// ============================================================================
// Index completeness
// ============================================================================

#[tokio::test]
async fn test_seven_indexes_with_expected_options() {
    let store = MemoryStore::new();
    let plan = test_plan(&[]).unwrap();
    let db = plan.active_namespace();
    seed(&store, &plan).await.unwrap();

    let mut found = Vec::new();
    for collection in schema::COLLECTIONS {
        for index in store.indexes(db, collection).await.unwrap() {
            found.push((index.collection, index.field, index.direction, index.unique));
        }
    }

    let expected = [
        ("users", "username", IndexDirection::Ascending, true),
        ("users", "email", IndexDirection::Ascending, true),
        ("videos", "uploaded_by", IndexDirection::Ascending, false),
        ("videos", "is_public", IndexDirection::Ascending, false),
        ("videos", "status", IndexDirection::Ascending, false),
        ("videos", "created_at", IndexDirection::Descending, false),
        ("video_metadata", "video_id", IndexDirection::Ascending, true),
    ];
    assert_eq!(found.len(), expected.len());
    for (collection, field, direction, unique) in expected {
        assert!(
            found.contains(&(collection.to_string(), field.to_string(), direction, unique)),
            "missing {collection}.{field}"
        );
    }
}

#[tokio::test]
async fn test_video_metadata_unique_per_video() {
    let store = MemoryStore::new();
    let plan = test_plan(&[]).unwrap();
    let db = plan.active_namespace();
    seed(&store, &plan).await.unwrap();

    store
        .insert_document(db, schema::VIDEO_METADATA, json!({ "video_id": "v-1" }))
        .unwrap();
    assert!(store
        .insert_document(db, schema::VIDEO_METADATA, json!({ "video_id": "v-1" }))
        .is_err());
    store
        .insert_document(db, schema::VIDEO_METADATA, json!({ "video_id": "v-2" }))
        .unwrap();
}

// ============================================================================
// Credential scope
// ============================================================================

#[tokio::test]
async fn test_credential_reaches_both_namespaces_only() {
    let store = MemoryStore::new();
    let plan = test_plan(&[]).unwrap();
    seed(&store, &plan).await.unwrap();

    let user = &plan.credential.username;
    assert!(store.can_write(user, &ns("video_streaming")));
    assert!(store.can_write(user, &ns("video_streaming_dev")));
    assert!(!store.can_read(user, &ns("some_other_db")));

    let grants = store
        .credential_grants(&ns("video_streaming_dev"), user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(grants.len(), 2);
    assert!(store
        .credential_grants(&ns("video_streaming"), user)
        .await
        .unwrap()
        .is_none());
}

#[test]
fn test_legacy_service_secret_rejected() {
    assert!(test_config(&[("APP_DB_PASSWORD", "apppassword")]).is_err());
}

// ============================================================================
// Password storage
// ============================================================================

#[tokio::test]
async fn test_stored_password_is_hash() {
    let store = MemoryStore::new();
    let plan = test_plan(&[("ADMIN_PASSWORD", "admin-bootstrap-pw")]).unwrap();
    let db = plan.active_namespace();
    seed(&store, &plan).await.unwrap();

    let admin = store.find_account(db, &plan.admin.username).await.unwrap().unwrap();
    assert_ne!(admin.password.as_str(), "admin-bootstrap-pw");
    assert!(PasswordHash::looks_hashed(admin.password.as_str()));
    assert!(verify_password("admin-bootstrap-pw", &admin.password));

    let stored = store.find_documents(db, schema::USERS, "username", &json!("admin"));
    assert_eq!(stored.len(), 1);
    assert!(!stored.first().unwrap().to_string().contains("admin-bootstrap-pw"));
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_fresh_seed_creates_one_active_admin() {
    let store = MemoryStore::new();
    let plan = test_plan(&[]).unwrap();
    let db = plan.active_namespace();
    seed(&store, &plan).await.unwrap();

    assert_eq!(store.count_accounts(db, &plan.admin.username).await.unwrap(), 1);
    let admin = store.find_account(db, &plan.admin.username).await.unwrap().unwrap();
    assert!(admin.has_role(UserRole::Admin));
    assert!(admin.has_role(UserRole::User));
    assert!(admin.flags.enabled);
    assert!(admin.flags.is_active());
}

#[tokio::test]
async fn test_production_as_active_namespace() {
    let store = MemoryStore::new();
    let plan = test_plan(&[("SEED_ACTIVE_NAMESPACE", "production")]).unwrap();
    seed(&store, &plan).await.unwrap();

    let production = ns("video_streaming");
    assert_eq!(store.collection_names(&production).await.unwrap().len(), 3);
    assert!(store
        .collection_names(&ns("video_streaming_dev"))
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .credential_grants(&production, &plan.credential.username)
        .await
        .unwrap()
        .is_some());
    assert!(verify(&store, &plan).await.unwrap().is_complete());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_conflicting_index_aborts_and_skips_admin() {
    let store = MemoryStore::new();
    let plan = test_plan(&[]).unwrap();
    let db = plan.active_namespace();
    store
        .create_index(
            db,
            &IndexSpec::ascending(schema::VIDEO_METADATA, schema::video_metadata::VIDEO_ID),
        )
        .await
        .unwrap();

    let err = seed(&store, &plan).await.unwrap_err();
    assert!(matches!(err, StoreError::ConflictingDefinition { .. }));
    assert_eq!(store.count_accounts(db, &plan.admin.username).await.unwrap(), 0);
    assert!(!verify(&store, &plan).await.unwrap().is_complete());
}

#[tokio::test]
async fn test_duplicate_emails_block_unique_index() {
    let store = MemoryStore::new();
    let plan = test_plan(&[]).unwrap();
    let db = plan.active_namespace();
    for username in ["alice", "bob"] {
        store
            .insert_document(
                db,
                schema::USERS,
                json!({ "username": username, "email": "shared@videostreaming.com" }),
            )
            .unwrap();
    }

    assert!(matches!(
        seed(&store, &plan).await,
        Err(StoreError::ConflictingDefinition { .. })
    ));
}

#[tokio::test]
async fn test_connection_failure_aborts_before_writes() {
    let store = MemoryStore::unreachable();
    let plan = test_plan(&[]).unwrap();

    let err = seed(&store, &plan).await.unwrap_err();
    assert!(matches!(err, StoreError::ConnectionFailure(_)));
    assert!(store.database_names().is_empty());
    assert_eq!(store.credential_count(), 0);
}
