//! Secondary index definitions.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction of a single-field index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexDirection {
    Ascending,
    Descending,
}

impl IndexDirection {
    /// Key value the engine uses for this direction (`1` / `-1`).
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }

    /// Inverse of [`Self::as_i32`]. Any other value is not a plain sort key.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Ascending),
            -1 => Some(Self::Descending),
            _ => None,
        }
    }
}

/// A single-field index on a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexSpec {
    pub collection: String,
    pub field: String,
    pub direction: IndexDirection,
    pub unique: bool,
}

impl IndexSpec {
    /// Ascending index.
    #[must_use]
    pub fn ascending(collection: &str, field: &str) -> Self {
        Self {
            collection: collection.to_owned(),
            field: field.to_owned(),
            direction: IndexDirection::Ascending,
            unique: false,
        }
    }

    /// Descending index.
    #[must_use]
    pub fn descending(collection: &str, field: &str) -> Self {
        Self {
            direction: IndexDirection::Descending,
            ..Self::ascending(collection, field)
        }
    }

    /// Mark the index unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Engine default index name: `<field>_<direction>`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}_{}", self.field, self.direction.as_i32())
    }

    /// Same key on the same collection, regardless of options.
    #[must_use]
    pub fn same_key(&self, other: &Self) -> bool {
        self.collection == other.collection
            && self.field == other.field
            && self.direction == other.direction
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.collection, self.name())?;
        if self.unique {
            write!(f, " (unique)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        assert_eq!(IndexSpec::ascending("users", "username").name(), "username_1");
        assert_eq!(
            IndexSpec::descending("videos", "created_at").name(),
            "created_at_-1"
        );
    }

    #[test]
    fn test_same_key_ignores_uniqueness() {
        let plain = IndexSpec::ascending("users", "email");
        let unique = IndexSpec::ascending("users", "email").unique();
        assert!(plain.same_key(&unique));
        assert_ne!(plain, unique);
        assert!(!plain.same_key(&IndexSpec::descending("users", "email")));
    }

    #[test]
    fn test_direction_round_trip_values() {
        assert_eq!(IndexDirection::from_i32(1), Some(IndexDirection::Ascending));
        assert_eq!(IndexDirection::from_i32(-1), Some(IndexDirection::Descending));
        assert_eq!(IndexDirection::from_i32(0), None);
    }

    #[test]
    fn test_display() {
        let spec = IndexSpec::ascending("video_metadata", "video_id").unique();
        assert_eq!(spec.to_string(), "video_metadata.video_id_1 (unique)");
    }
}
