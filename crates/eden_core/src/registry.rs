//! Typed access to the registry table.
//!
//! The table holds two row shapes under one key schema: profile rows, whose
//! partition key is [`PROFILE_NAMESPACE`], and environment lifecycle rows,
//! partitioned by the owning profile's name. Both use the environment or
//! profile name as sort key.

pub mod memory;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub use memory::InMemoryRegistryStore;

/// Partition key value reserved for profile rows.
pub const PROFILE_NAMESPACE: &str = "_profile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableReadiness {
    Ready,
    Missing,
    Transitioning { status: String },
    Unknown { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvironmentKey {
    pub profile: String,
    pub name: String,
}

impl EnvironmentKey {
    pub fn new(profile: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            name: name.into(),
        }
    }

    /// Denormalized `{profile}_{name}` attribute stored alongside each row.
    pub fn type_name(&self) -> String {
        format!("{}_{}", self.profile, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentRecord {
    pub profile: String,
    pub name: String,
    pub endpoint: String,
    pub last_updated_time: DateTime<Utc>,
}

impl EnvironmentRecord {
    pub fn key(&self) -> EnvironmentKey {
        EnvironmentKey::new(self.profile.clone(), self.name.clone())
    }
}

/// A profile row as stored: the name plus its still-encoded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProfile {
    pub name: String,
    pub document: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Profile {0} not found in remote table!")]
    ProfileNotFound(String),

    #[error("Got {count} profiles for profile name {name} from remote table!")]
    DuplicateProfile { name: String, count: usize },

    #[error("Profile {0} does not contain any parameters!")]
    EmptyProfile(String),

    #[error("{0}")]
    Backend(String),
}

/// Storage seam for the registry table.
///
/// Implementations are blocking. `put_environment` is an unconditional upsert and
/// `delete_environment` succeeds for keys that do not exist.
pub trait RegistryStore {
    fn table_name(&self) -> &str;

    fn check_ready(&self) -> TableReadiness;

    fn get_profile(&self, name: &str) -> Result<StoredProfile, StoreError>;

    fn put_environment(&self, record: &EnvironmentRecord) -> Result<(), StoreError>;

    fn delete_environment(&self, key: &EnvironmentKey) -> Result<(), StoreError>;

    fn list_environments(&self, profile: &str) -> Result<Vec<EnvironmentRecord>, StoreError>;
}

/// Picks the single profile row out of a point-lookup result.
///
/// Each entry is the row's `profile` attribute, `None` when the row lacks it.
/// More than one row is a data-integrity violation and is never resolved by
/// picking one.
pub fn select_profile_row(
    name: &str,
    rows: Vec<Option<String>>,
) -> Result<StoredProfile, StoreError> {
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), count) {
        (None, _) => Err(StoreError::ProfileNotFound(name.to_string())),
        (Some(_), count) if count > 1 => Err(StoreError::DuplicateProfile {
            name: name.to_string(),
            count,
        }),
        (Some(None), _) => Err(StoreError::EmptyProfile(name.to_string())),
        (Some(Some(document)), _) => Ok(StoredProfile {
            name: name.to_string(),
            document,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rows_is_not_found() {
        let error = select_profile_row("dev", Vec::new()).expect_err("lookup should fail");
        assert_eq!(error, StoreError::ProfileNotFound("dev".to_string()));
    }

    #[test]
    fn multiple_rows_are_never_resolved() {
        let error = select_profile_row(
            "dev",
            vec![Some("{}".to_string()), Some("{\"a\":1}".to_string())],
        )
        .expect_err("lookup should fail");
        assert_eq!(
            error,
            StoreError::DuplicateProfile {
                name: "dev".to_string(),
                count: 2,
            }
        );
    }

    #[test]
    fn row_without_document_is_empty_profile() {
        let error = select_profile_row("dev", vec![None]).expect_err("lookup should fail");
        assert_eq!(error.to_string(), "Profile dev does not contain any parameters!");
    }

    #[test]
    fn type_name_joins_profile_and_name() {
        assert_eq!(EnvironmentKey::new("default", "web1").type_name(), "default_web1");
    }
}
