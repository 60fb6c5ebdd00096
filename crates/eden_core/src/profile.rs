//! Profile resolution.
//!
//! A profile is only handed to provisioning after the table has been probed,
//! exactly one row has been found, and its document decoded into an object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::error::LifecycleError;
use crate::registry::{RegistryStore, StoreError, TableReadiness};

pub type ProfileConfig = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub config: ProfileConfig,
}

pub fn resolve_profile<S: RegistryStore + ?Sized>(
    store: &S,
    profile_name: &str,
) -> Result<Profile, LifecycleError> {
    ensure_table_ready(store)?;

    let stored = store.get_profile(profile_name).map_err(|store_error| {
        let mapped = match store_error {
            StoreError::ProfileNotFound(name) => LifecycleError::ProfileMissing(name),
            StoreError::DuplicateProfile { .. } | StoreError::EmptyProfile(_) => {
                LifecycleError::ProfileMalformed(store_error.to_string())
            }
            StoreError::Backend(message) => LifecycleError::RegistryRead(message),
        };
        warn!(profile = profile_name, error = %mapped, "profile lookup failed");
        mapped
    })?;

    let config = decode_profile_document(&stored.name, &stored.document)?;
    Ok(Profile {
        name: stored.name,
        config,
    })
}

pub fn ensure_table_ready<S: RegistryStore + ?Sized>(store: &S) -> Result<(), LifecycleError> {
    let table = store.table_name().to_string();
    match store.check_ready() {
        TableReadiness::Ready => Ok(()),
        TableReadiness::Missing => {
            warn!(table = %table, "registry table does not exist");
            Err(LifecycleError::TableMissing { table })
        }
        TableReadiness::Transitioning { status } => {
            warn!(table = %table, status = %status, "registry table is not active");
            Err(LifecycleError::TableTransitioning { table, status })
        }
        TableReadiness::Unknown { message } => {
            error!(table = %table, error = %message, "registry table probe failed");
            Err(LifecycleError::TableUnavailable(message))
        }
    }
}

fn decode_profile_document(name: &str, document: &str) -> Result<ProfileConfig, LifecycleError> {
    let invalid = |reason: String| {
        error!(profile = name, reason = %reason, "stored profile document is invalid");
        LifecycleError::InvalidEncoding {
            profile: name.to_string(),
            reason,
        }
    };

    match serde_json::from_str::<Value>(document) {
        Ok(Value::Object(config)) => Ok(config),
        Ok(other) => Err(invalid(format!(
            "expected a JSON object, found {}",
            json_type_name(&other)
        ))),
        Err(decode_error) => Err(invalid(decode_error.to_string())),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::FailureKind;
    use crate::registry::InMemoryRegistryStore;

    #[test]
    fn resolves_seeded_profile() {
        let store = InMemoryRegistryStore::new("eden")
            .with_profile("default", &json!({"cluster": "dev", "memory": 512}));

        let profile = resolve_profile(&store, "default").expect("profile should resolve");
        assert_eq!(profile.name, "default");
        assert_eq!(profile.config.get("memory"), Some(&json!(512)));
    }

    #[test]
    fn missing_table_fails_before_lookup() {
        let store = InMemoryRegistryStore::new("eden").with_profile("default", &json!({}));
        store.set_readiness(TableReadiness::Missing);

        let error = resolve_profile(&store, "default").expect_err("resolution should fail");
        assert_eq!(error.kind(), FailureKind::TableNotReady);
        assert!(error.to_string().contains("does not exist"));
    }

    #[test]
    fn unknown_probe_error_is_surfaced_verbatim() {
        let store = InMemoryRegistryStore::new("eden");
        store.set_readiness(TableReadiness::Unknown {
            message: "AccessDeniedException: not authorized".to_string(),
        });

        let error = resolve_profile(&store, "default").expect_err("resolution should fail");
        assert_eq!(error.to_string(), "AccessDeniedException: not authorized");
    }

    #[test]
    fn duplicate_rows_are_malformed_not_missing() {
        let store = InMemoryRegistryStore::new("eden");
        store.insert_profile_row("default", Some("{}".to_string()));
        store.insert_profile_row("default", Some("{}".to_string()));

        let error = resolve_profile(&store, "default").expect_err("resolution should fail");
        assert_eq!(error.kind(), FailureKind::ProfileMalformed);
    }

    #[test]
    fn undecodable_document_is_invalid_encoding() {
        let store = InMemoryRegistryStore::new("eden");
        store.insert_profile_row("default", Some("{not json".to_string()));

        let error = resolve_profile(&store, "default").expect_err("resolution should fail");
        assert_eq!(error.kind(), FailureKind::InvalidEncoding);
    }

    #[test]
    fn non_object_document_is_invalid_encoding() {
        let store = InMemoryRegistryStore::new("eden");
        store.insert_profile_row("default", Some("[1, 2]".to_string()));

        let error = resolve_profile(&store, "default").expect_err("resolution should fail");
        assert_eq!(
            error,
            LifecycleError::InvalidEncoding {
                profile: "default".to_string(),
                reason: "expected a JSON object, found an array".to_string(),
            }
        );
    }
}
