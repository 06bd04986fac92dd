#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryKeyValueStore, KeyValueSessionRepository, KeyValueStore, SESSIONS_KEY,
    SessionRepository, Storage, StorageError,
};
