//! Generic read-modify-write repository over a JSON list in the store.
//!
//! Each resource type lives under a single key as one JSON array; every
//! mutation fetches the whole array, edits it in memory, and writes the whole
//! array back. The two store round-trips are **not** atomic: two overlapping
//! writers can both read the same snapshot and the second SET silently drops
//! the first writer's change (lost update, last writer wins). That is the
//! store's key-granularity consistency model and this repository keeps it;
//! there is no compare-and-swap or versioning here.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::store::{KvStore, StoreError};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// An entity stored in a named JSON list.
///
/// `prepare` is the per-resource validation/denormalization hook: it runs
/// against the incoming payload before any merge or write, with store access
/// for cross-reference lookups (e.g. tenants resolving their apartment).
#[async_trait]
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Store key holding this resource's list blob.
    const LIST_KEY: &'static str;

    /// Human-readable name used in error messages.
    const NAME: &'static str;

    fn id(&self) -> &str;

    async fn prepare(
        _store: &dyn KvStore,
        _payload: &mut Map<String, Value>,
    ) -> Result<(), RepoError> {
        Ok(())
    }
}

/// Read-modify-write operations over the list of `R`.
pub struct ListRepository<R> {
    store: Arc<dyn KvStore>,
    _marker: PhantomData<R>,
}

impl<R: Resource> ListRepository<R> {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store, _marker: PhantomData }
    }

    /// Fetch and parse the whole list. An absent key yields an empty list;
    /// so does a malformed blob (logged at warn level — the next write-back
    /// will persist the empty list over whatever was there).
    pub async fn list(&self) -> Result<Vec<R>, RepoError> {
        match self.store.get(R::LIST_KEY).await? {
            None => Ok(Vec::new()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(items) => Ok(items),
                Err(err) => {
                    tracing::warn!(key = R::LIST_KEY, %err, "malformed list blob, reading as empty");
                    Ok(Vec::new())
                }
            },
        }
    }

    pub async fn get(&self, id: &str) -> Result<R, RepoError> {
        self.list()
            .await?
            .into_iter()
            .find(|item| item.id() == id)
            .ok_or(RepoError::NotFound(R::NAME))
    }

    /// Validate the payload, assign `id` and `createdAt`, append, write back.
    ///
    /// Ids are the current time in milliseconds, stringified; collisions
    /// under rapid concurrent creation are possible and not checked.
    pub async fn create(&self, mut payload: Map<String, Value>) -> Result<R, RepoError> {
        R::prepare(self.store.as_ref(), &mut payload).await?;

        payload.insert("id".into(), Value::String(next_id()));
        payload.insert("createdAt".into(), Value::String(now_rfc3339()));

        let entity: R = serde_json::from_value(Value::Object(payload))
            .map_err(|e| RepoError::Validation(format!("invalid {} payload: {e}", R::NAME)))?;

        let mut items = self.list().await?;
        items.push(entity.clone());
        self.save(&items).await?;

        Ok(entity)
    }

    /// Shallow-merge `payload` onto the record with `id`, stamp `updatedAt`,
    /// write the list back, and return the merged entity.
    pub async fn update(&self, id: &str, mut payload: Map<String, Value>) -> Result<R, RepoError> {
        R::prepare(self.store.as_ref(), &mut payload).await?;

        let mut items = self.list().await?;
        let index = items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(RepoError::NotFound(R::NAME))?;

        let mut merged = match serde_json::to_value(&items[index])? {
            Value::Object(map) => map,
            other => {
                return Err(RepoError::Validation(format!(
                    "stored {} is not an object: {other}",
                    R::NAME
                )))
            }
        };
        for (key, value) in payload {
            merged.insert(key, value);
        }
        // The id is server-owned; a client cannot move a record by updating it.
        merged.insert("id".into(), Value::String(id.to_string()));
        merged.insert("updatedAt".into(), Value::String(now_rfc3339()));

        let entity: R = serde_json::from_value(Value::Object(merged))
            .map_err(|e| RepoError::Validation(format!("invalid {} payload: {e}", R::NAME)))?;

        items[index] = entity.clone();
        self.save(&items).await?;

        Ok(entity)
    }

    /// Remove the record with `id`; `NotFound` if the list is unchanged.
    pub async fn delete(&self, id: &str) -> Result<(), RepoError> {
        let mut items = self.list().await?;
        let before = items.len();
        items.retain(|item| item.id() != id);

        if items.len() == before {
            return Err(RepoError::NotFound(R::NAME));
        }

        self.save(&items).await
    }

    async fn save(&self, items: &[R]) -> Result<(), RepoError> {
        let json = serde_json::to_string(items)?;
        self.store.set(R::LIST_KEY, &json).await?;
        Ok(())
    }
}

fn next_id() -> String {
    Utc::now().timestamp_millis().to_string()
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Note {
        id: String,
        title: String,
        created_at: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        updated_at: Option<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    }

    #[async_trait]
    impl Resource for Note {
        const LIST_KEY: &'static str = "notes";
        const NAME: &'static str = "Note";

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn repo(store: Arc<dyn KvStore>) -> ListRepository<Note> {
        ListRepository::new(store)
    }

    #[tokio::test]
    async fn create_assigns_id_and_round_trips() {
        let repo = repo(Arc::new(MemoryStore::new()));

        let created = repo.create(payload(json!({"title": "first"}))).await.unwrap();
        assert!(!created.id.is_empty());
        assert!(created.id.chars().all(|c| c.is_ascii_digit()));
        assert!(created.created_at.ends_with('Z'));
        assert!(created.updated_at.is_none());

        let fetched = repo.get(&created.id).await.unwrap();
        assert_eq!(fetched.title, "first");
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn create_rejects_missing_required_field() {
        let repo = repo(Arc::new(MemoryStore::new()));

        let err = repo.create(payload(json!({"color": "red"}))).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_merges_shallowly_and_keeps_unknown_fields() {
        let repo = repo(Arc::new(MemoryStore::new()));

        let created = repo
            .create(payload(json!({"title": "first", "pinned": true})))
            .await
            .unwrap();

        let updated = repo
            .update(&created.id, payload(json!({"title": "renamed"})))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.extra.get("pinned"), Some(&Value::Bool(true)));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn update_cannot_reassign_id() {
        let repo = repo(Arc::new(MemoryStore::new()));
        let created = repo.create(payload(json!({"title": "first"}))).await.unwrap();

        let updated = repo
            .update(&created.id, payload(json!({"id": "hijacked"})))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
    }

    #[tokio::test]
    async fn missing_record_reports_not_found() {
        let repo = repo(Arc::new(MemoryStore::new()));

        assert!(matches!(repo.get("1").await.unwrap_err(), RepoError::NotFound(_)));
        assert!(matches!(
            repo.update("1", payload(json!({"title": "x"}))).await.unwrap_err(),
            RepoError::NotFound(_)
        ));
        assert!(matches!(repo.delete("1").await.unwrap_err(), RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn second_delete_reports_not_found() {
        let repo = repo(Arc::new(MemoryStore::new()));
        let created = repo.create(payload(json!({"title": "first"}))).await.unwrap();

        repo.delete(&created.id).await.unwrap();
        assert!(matches!(repo.delete(&created.id).await.unwrap_err(), RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_blob_reads_as_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set("notes", "{definitely not an array").await.unwrap();

        let repo = repo(store);
        assert!(repo.list().await.unwrap().is_empty());
    }

    /// Store wrapper that holds every reader at a barrier after its GET, so
    /// two writers provably act on the same list snapshot.
    struct GatedStore {
        inner: Arc<MemoryStore>,
        gate: tokio::sync::Barrier,
    }

    #[async_trait]
    impl KvStore for GatedStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            let value = self.inner.get(key).await?;
            self.gate.wait().await;
            Ok(value)
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.inner.set(key, value).await
        }

        async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
            self.inner.set_ex(key, value, ttl_secs).await
        }

        async fn del(&self, key: &str) -> Result<(), StoreError> {
            self.inner.del(key).await
        }
    }

    /// Lost-update property: two creates that both read the same snapshot
    /// complete without deadlock or error, and only one appended entity
    /// survives the overlapping write-back.
    #[tokio::test]
    async fn concurrent_creates_can_lose_an_update() {
        let inner = Arc::new(MemoryStore::new());
        let gated = Arc::new(GatedStore {
            inner: inner.clone(),
            gate: tokio::sync::Barrier::new(2),
        });

        let repo = repo(gated);
        let (a, b) = tokio::join!(
            repo.create(payload(json!({"title": "from writer one"}))),
            repo.create(payload(json!({"title": "from writer two"}))),
        );
        a.unwrap();
        b.unwrap();

        let raw = inner.get("notes").await.unwrap().unwrap();
        let survivors: Vec<Note> = serde_json::from_str(&raw).unwrap();
        assert_eq!(survivors.len(), 1, "second SET should overwrite the first");
    }
}
