use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use super::{
    select_profile_row, EnvironmentKey, EnvironmentRecord, RegistryStore, StoreError,
    StoredProfile, TableReadiness,
};

/// Process-local registry used by tests and local runs of the HTTP server.
///
/// Profile rows are kept as lists so duplicated or attribute-less rows can be
/// seeded the same way they can exist in the real table.
#[derive(Debug)]
pub struct InMemoryRegistryStore {
    table_name: String,
    readiness: Mutex<TableReadiness>,
    profiles: Mutex<BTreeMap<String, Vec<Option<String>>>>,
    environments: Mutex<BTreeMap<EnvironmentKey, EnvironmentRecord>>,
    write_failure: Mutex<Option<String>>,
}

impl InMemoryRegistryStore {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            readiness: Mutex::new(TableReadiness::Ready),
            profiles: Mutex::new(BTreeMap::new()),
            environments: Mutex::new(BTreeMap::new()),
            write_failure: Mutex::new(None),
        }
    }

    pub fn with_profile(self, name: &str, config: &Value) -> Self {
        self.insert_profile_row(name, Some(config.to_string()));
        self
    }

    /// Appends a raw profile row; `None` models a row without a document.
    pub fn insert_profile_row(&self, name: &str, document: Option<String>) {
        lock(&self.profiles)
            .entry(name.to_string())
            .or_default()
            .push(document);
    }

    pub fn set_readiness(&self, readiness: TableReadiness) {
        *lock(&self.readiness) = readiness;
    }

    /// Makes every subsequent put/delete fail with `message`.
    pub fn fail_writes_with(&self, message: impl Into<String>) {
        *lock(&self.write_failure) = Some(message.into());
    }

    pub fn environment(&self, key: &EnvironmentKey) -> Option<EnvironmentRecord> {
        lock(&self.environments).get(key).cloned()
    }

    pub fn environment_count(&self) -> usize {
        lock(&self.environments).len()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        match lock(&self.write_failure).as_ref() {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

impl RegistryStore for InMemoryRegistryStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn check_ready(&self) -> TableReadiness {
        lock(&self.readiness).clone()
    }

    fn get_profile(&self, name: &str) -> Result<StoredProfile, StoreError> {
        let rows = lock(&self.profiles).get(name).cloned().unwrap_or_default();
        select_profile_row(name, rows)
    }

    fn put_environment(&self, record: &EnvironmentRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        lock(&self.environments).insert(record.key(), record.clone());
        Ok(())
    }

    fn delete_environment(&self, key: &EnvironmentKey) -> Result<(), StoreError> {
        self.check_writable()?;
        lock(&self.environments).remove(key);
        Ok(())
    }

    fn list_environments(&self, profile: &str) -> Result<Vec<EnvironmentRecord>, StoreError> {
        Ok(lock(&self.environments)
            .values()
            .filter(|record| record.profile == profile)
            .cloned()
            .collect())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn record(profile: &str, name: &str, endpoint: &str) -> EnvironmentRecord {
        EnvironmentRecord {
            profile: profile.to_string(),
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            last_updated_time: Utc::now(),
        }
    }

    #[test]
    fn put_overwrites_existing_record() {
        let store = InMemoryRegistryStore::new("eden");
        store
            .put_environment(&record("default", "web1", "a.example.com"))
            .expect("first write");
        store
            .put_environment(&record("default", "web1", "b.example.com"))
            .expect("second write");

        let stored = store
            .environment(&EnvironmentKey::new("default", "web1"))
            .expect("record should exist");
        assert_eq!(stored.endpoint, "b.example.com");
        assert_eq!(store.environment_count(), 1);
    }

    #[test]
    fn delete_of_missing_key_succeeds() {
        let store = InMemoryRegistryStore::new("eden");
        store
            .delete_environment(&EnvironmentKey::new("default", "ghost"))
            .expect("delete should succeed");
    }

    #[test]
    fn listing_is_scoped_to_one_profile() {
        let store = InMemoryRegistryStore::new("eden");
        store
            .put_environment(&record("default", "web2", "b"))
            .expect("write");
        store
            .put_environment(&record("default", "web1", "a"))
            .expect("write");
        store
            .put_environment(&record("staging", "web1", "c"))
            .expect("write");

        let names: Vec<String> = store
            .list_environments("default")
            .expect("list")
            .into_iter()
            .map(|record| record.name)
            .collect();
        assert_eq!(names, vec!["web1".to_string(), "web2".to_string()]);
    }

    #[test]
    fn seeded_profile_round_trips_document() {
        let store = InMemoryRegistryStore::new("eden").with_profile("default", &json!({"vpc": "a"}));

        let profile = store.get_profile("default").expect("profile should exist");
        assert_eq!(profile.document, "{\"vpc\":\"a\"}");
    }
}
