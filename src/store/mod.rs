//! The boundary to the external document/search store.
//!
//! [`PersonStore`] is a cloneable handle constructed once at startup and
//! shared read-only across request tasks. The `redis` backend talks to Redis
//! Stack; the `memory` backend evaluates the same predicate combinators
//! in-process and backs the test suite.

pub mod memory;
pub mod redis;

use std::sync::Arc;

use uuid::Uuid;

use self::memory::MemoryStore;
use self::redis::RedisStore;
use crate::config::StoreConfig;
use crate::error::{Result, RolodexError};
use crate::model::{person_schema, Person};
use crate::query::Predicate;
use crate::schema::IndexSchema;

#[derive(Debug, Clone)]
enum Backend {
    Redis(RedisStore),
    Memory(MemoryStore),
}

/// Process-wide handle to the person store.
#[derive(Debug, Clone)]
pub struct PersonStore {
    schema: Arc<IndexSchema>,
    backend: Backend,
}

impl PersonStore {
    /// Connect to the backend named in the config.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let schema = Arc::new(person_schema(&config.index_name, &config.key_prefix));
        let backend = match config.backend.as_str() {
            "redis" => Backend::Redis(RedisStore::connect(&config.url, schema.clone()).await?),
            "memory" => Backend::Memory(MemoryStore::new(schema.clone())),
            other => {
                return Err(RolodexError::Config(format!(
                    "unsupported store backend {other:?}, expected \"redis\" or \"memory\""
                )))
            }
        };
        Ok(Self { schema, backend })
    }

    /// An in-process store with the default person schema.
    pub fn in_memory() -> Self {
        let schema = Arc::new(person_schema("person-idx", "person:"));
        Self {
            backend: Backend::Memory(MemoryStore::new(schema.clone())),
            schema,
        }
    }

    pub fn index_name(&self) -> &str {
        &self.schema.name
    }

    /// Insert a person, assigning an id when the payload carries none.
    /// The id is never reassigned afterwards.
    pub async fn insert(&self, mut person: Person) -> Result<Person> {
        if person.id.is_none() {
            person.id = Some(Uuid::new_v4().to_string());
        }
        self.save(&person).await?;
        Ok(person)
    }

    /// Persist a person under its existing id.
    pub async fn save(&self, person: &Person) -> Result<()> {
        let id = person
            .id
            .as_deref()
            .ok_or_else(|| RolodexError::Validation("person id is required".into()))?;
        match &self.backend {
            Backend::Redis(store) => store.put(id, person).await,
            Backend::Memory(store) => store.put(id, person),
        }
    }

    /// Load a person by id, `None` when the key does not exist.
    pub async fn get(&self, id: &str) -> Result<Option<Person>> {
        match &self.backend {
            Backend::Redis(store) => store.get(id).await,
            Backend::Memory(store) => Ok(store.get(id)),
        }
    }

    /// Run an indexed query, returning at most `limit` matching records.
    pub async fn search(&self, predicate: &Predicate, limit: usize) -> Result<Vec<Person>> {
        match &self.backend {
            Backend::Redis(store) => store.search(predicate, limit).await,
            Backend::Memory(store) => store.search(predicate, limit),
        }
    }

    /// Remove the storage key for an id. Removing an unknown id is a no-op.
    pub async fn delete(&self, id: &str) -> Result<()> {
        match &self.backend {
            Backend::Redis(store) => store.delete(id).await,
            Backend::Memory(store) => {
                store.delete(id);
                Ok(())
            }
        }
    }

    /// Names of the search indexes currently known to the store.
    pub async fn list_index_names(&self) -> Result<Vec<String>> {
        match &self.backend {
            Backend::Redis(store) => store.list_index_names().await,
            Backend::Memory(store) => Ok(store.list_index_names()),
        }
    }

    /// Create the person index from the declared schema.
    pub async fn create_index(&self) -> Result<()> {
        match &self.backend {
            Backend::Redis(store) => store.create_index(&self.schema).await,
            Backend::Memory(store) => store.create_index(&self.schema),
        }
    }

    /// Round-trip liveness check against the backend.
    pub async fn ping(&self) -> Result<()> {
        match &self.backend {
            Backend::Redis(store) => store.ping().await,
            Backend::Memory(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fields;

    fn person(first: &str, age: u32) -> Person {
        Person {
            id: None,
            first_name: first.into(),
            last_name: "Tester".into(),
            age,
            personal_statement: None,
            skills: vec![],
            home_loc: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_once() {
        let store = PersonStore::in_memory();

        let stored = store.insert(person("Ada", 30)).await.unwrap();
        let id = stored.id.clone().unwrap();
        assert!(!id.is_empty());

        // Re-inserting the stored record keeps the assigned id.
        let again = store.insert(stored).await.unwrap();
        assert_eq!(again.id.unwrap(), id);
    }

    #[tokio::test]
    async fn test_save_requires_id() {
        let store = PersonStore::in_memory();
        let err = store.save(&person("NoId", 1)).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_get_and_delete_roundtrip() {
        let store = PersonStore::in_memory();
        let stored = store.insert(person("Ada", 30)).await.unwrap();
        let id = stored.id.clone().unwrap();

        assert_eq!(store.get(&id).await.unwrap(), Some(stored));
        store.delete(&id).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap(), None);

        // Deleting an unknown id is a silent no-op.
        store.delete("does-not-exist").await.unwrap();
    }

    #[tokio::test]
    async fn test_search_after_delete_is_empty() {
        let store = PersonStore::in_memory();
        let stored = store.insert(person("Ada", 30)).await.unwrap();
        let by_age = Predicate::numeric_range(fields::AGE, 30.0, 30.0);

        assert_eq!(store.search(&by_age, 10).await.unwrap().len(), 1);
        store.delete(stored.id.as_deref().unwrap()).await.unwrap();
        assert!(store.search(&by_age, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_backend_is_config_error() {
        let config = StoreConfig {
            backend: "carrier-pigeon".into(),
            url: String::new(),
            index_name: "person-idx".into(),
            key_prefix: "person:".into(),
        };
        let err = PersonStore::connect(&config).await.unwrap_err();
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
