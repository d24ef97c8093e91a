//! Application database layout.
//!
//! Collection names, the stored (snake_case) field names the application
//! reads and writes, and the secondary indexes the seeder maintains.

use crate::IndexSpec;

/// User accounts.
pub const USERS: &str = "users";
/// Uploaded videos.
pub const VIDEOS: &str = "videos";
/// Technical metadata extracted from videos, one document per video.
pub const VIDEO_METADATA: &str = "video_metadata";

/// Collections created by the seeder, in creation order.
pub const COLLECTIONS: [&str; 3] = [USERS, VIDEOS, VIDEO_METADATA];

/// Stored field names of user documents.
pub mod user {
    pub const USERNAME: &str = "username";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const ROLES: &str = "roles";
    pub const ENABLED: &str = "enabled";
    pub const ACCOUNT_NON_EXPIRED: &str = "account_non_expired";
    pub const ACCOUNT_NON_LOCKED: &str = "account_non_locked";
    pub const CREDENTIALS_NON_EXPIRED: &str = "credentials_non_expired";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
}

/// Stored field names of video documents.
pub mod video {
    pub const UPLOADED_BY: &str = "uploaded_by";
    pub const IS_PUBLIC: &str = "is_public";
    pub const STATUS: &str = "status";
    pub const CREATED_AT: &str = "created_at";
}

/// Stored field names of video metadata documents.
pub mod video_metadata {
    pub const VIDEO_ID: &str = "video_id";
}

/// The seven secondary indexes, in creation order.
#[must_use]
pub fn indexes() -> Vec<IndexSpec> {
    vec![
        IndexSpec::ascending(USERS, user::USERNAME).unique(),
        IndexSpec::ascending(USERS, user::EMAIL).unique(),
        IndexSpec::ascending(VIDEOS, video::UPLOADED_BY),
        IndexSpec::ascending(VIDEOS, video::IS_PUBLIC),
        IndexSpec::ascending(VIDEOS, video::STATUS),
        IndexSpec::descending(VIDEOS, video::CREATED_AT),
        IndexSpec::ascending(VIDEO_METADATA, video_metadata::VIDEO_ID).unique(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexDirection;

    #[test]
    fn test_index_layout() {
        let indexes = indexes();
        assert_eq!(indexes.len(), 7);

        let unique: Vec<String> = indexes
            .iter()
            .filter(|i| i.unique)
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            unique,
            [
                "users.username_1 (unique)",
                "users.email_1 (unique)",
                "video_metadata.video_id_1 (unique)",
            ]
        );

        let descending: Vec<&IndexSpec> = indexes
            .iter()
            .filter(|i| i.direction == IndexDirection::Descending)
            .collect();
        assert_eq!(descending.len(), 1);
        assert_eq!(descending[0].field, video::CREATED_AT);
    }

    #[test]
    fn test_every_index_targets_a_seeded_collection() {
        for index in indexes() {
            assert!(COLLECTIONS.contains(&index.collection.as_str()), "{index}");
        }
    }

    #[test]
    fn test_index_names_unique_per_collection() {
        let indexes = indexes();
        for (i, a) in indexes.iter().enumerate() {
            for b in indexes.iter().skip(i + 1) {
                assert!(a.collection != b.collection || a.name() != b.name());
            }
        }
    }
}
