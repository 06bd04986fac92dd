use async_trait::async_trait;
use lingo_core::model::{SessionId, StudySession, UserId};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key under which every study session is stored, as one JSON array.
pub const SESSIONS_KEY: &str = "lingoflash_sessions";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Opaque key-value persistence. Values are whole JSON documents.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or holds invalid JSON.
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn save(&self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// Simple in-memory store for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn save(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Repository contract for study sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Sessions owned by `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session list cannot be read.
    async fn load_sessions(&self, user: &UserId) -> Result<Vec<StudySession>, StorageError>;

    /// Fetch a session by id regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session list cannot be read.
    async fn get_session(&self, id: SessionId) -> Result<Option<StudySession>, StorageError>;

    /// Insert the session, or replace the stored one with the same id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session list cannot be read or written.
    async fn save_session(&self, session: &StudySession) -> Result<(), StorageError>;
}

/// Sessions kept as one JSON array under [`SESSIONS_KEY`].
///
/// Every write reads the whole array, replaces or appends by id and writes it
/// back. Entries that fail to decode are skipped on read but preserved on write.
#[derive(Clone)]
pub struct KeyValueSessionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KeyValueSessionRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn read_raw(&self) -> Result<Vec<Value>, StorageError> {
        match self.store.load(SESSIONS_KEY).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(StorageError::Serialization(format!(
                "expected an array under {SESSIONS_KEY}, found {}",
                json_kind(&other)
            ))),
        }
    }

    async fn read_sessions(&self) -> Result<Vec<StudySession>, StorageError> {
        let raw = self.read_raw().await?;
        let mut sessions = Vec::with_capacity(raw.len());
        for item in raw {
            match serde_json::from_value::<StudySession>(item) {
                Ok(session) => sessions.push(session),
                Err(err) => tracing::warn!(error = %err, "skipping unreadable session record"),
            }
        }
        Ok(sessions)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn record_id(value: &Value) -> Option<&str> {
    value.get("id").and_then(Value::as_str)
}

#[async_trait]
impl SessionRepository for KeyValueSessionRepository {
    async fn load_sessions(&self, user: &UserId) -> Result<Vec<StudySession>, StorageError> {
        let mut sessions: Vec<StudySession> = self
            .read_sessions()
            .await?
            .into_iter()
            .filter(|s| s.is_owned_by(user))
            .collect();
        sessions.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(sessions)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<StudySession>, StorageError> {
        Ok(self
            .read_sessions()
            .await?
            .into_iter()
            .find(|s| s.id() == id))
    }

    async fn save_session(&self, session: &StudySession) -> Result<(), StorageError> {
        let mut records = self.read_raw().await?;
        let encoded = serde_json::to_value(session)?;
        let id = session.id().to_string();

        match records.iter_mut().find(|r| record_id(r) == Some(id.as_str())) {
            Some(slot) => *slot = encoded,
            None => records.push(encoded),
        }

        tracing::debug!(session_id = %id, total = records.len(), "saving sessions");
        self.store.save(SESSIONS_KEY, Value::Array(records)).await
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    /// Build a `Storage` whose sessions live in the given key-value store.
    #[must_use]
    pub fn from_store(kv: Arc<dyn KeyValueStore>) -> Self {
        let sessions: Arc<dyn SessionRepository> =
            Arc::new(KeyValueSessionRepository::new(Arc::clone(&kv)));
        Self { kv, sessions }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryKeyValueStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lingo_core::model::{StudyMode, WordEntry};
    use lingo_core::time::fixed_now;
    use serde_json::json;

    fn build_session(user: &str, minutes_later: i64) -> StudySession {
        StudySession::new(
            SessionId::generate(),
            UserId::new(user),
            "Travel",
            "B1",
            StudyMode::Vocabulary,
            vec![WordEntry::new(
                "w1",
                "journey",
                "hành trình",
                "The journey was long.",
                "Hành trình dài.",
            )],
            fixed_now() + Duration::minutes(minutes_later),
            3,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn saves_and_replaces_by_id() {
        let storage = Storage::in_memory();
        let session = build_session("u1", 0);
        storage.sessions.save_session(&session).await.unwrap();
        storage.sessions.save_session(&session).await.unwrap();

        let stored = storage.kv.load(SESSIONS_KEY).await.unwrap().unwrap();
        assert_eq!(stored.as_array().map(Vec::len), Some(1));

        let fetched = storage.sessions.get_session(session.id()).await.unwrap();
        assert_eq!(fetched, Some(session));
    }

    #[tokio::test]
    async fn lists_only_owned_sessions_newest_first() {
        let storage = Storage::in_memory();
        let older = build_session("u1", 0);
        let newer = build_session("u1", 10);
        let foreign = build_session("u2", 20);
        for s in [&older, &foreign, &newer] {
            storage.sessions.save_session(s).await.unwrap();
        }

        let listed = storage
            .sessions
            .load_sessions(&UserId::new("u1"))
            .await
            .unwrap();
        let ids: Vec<_> = listed.iter().map(StudySession::id).collect();
        assert_eq!(ids, vec![newer.id(), older.id()]);
    }

    #[tokio::test]
    async fn missing_key_reads_as_empty() {
        let storage = Storage::in_memory();
        assert!(
            storage
                .sessions
                .get_session(SessionId::generate())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn unreadable_records_are_kept_on_write() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        kv.save(SESSIONS_KEY, json!([{ "id": "legacy", "broken": true }]))
            .await
            .unwrap();
        let storage = Storage::from_store(kv);

        let session = build_session("u1", 0);
        storage.sessions.save_session(&session).await.unwrap();

        let listed = storage
            .sessions
            .load_sessions(&UserId::new("u1"))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        let raw = storage.kv.load(SESSIONS_KEY).await.unwrap().unwrap();
        assert_eq!(raw.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn non_array_value_is_a_serialization_error() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        kv.save(SESSIONS_KEY, json!({ "oops": 1 })).await.unwrap();
        let storage = Storage::from_store(kv);

        let err = storage
            .sessions
            .load_sessions(&UserId::new("u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
