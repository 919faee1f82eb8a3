//! Persistence layer.
//!
//! Engines keep their state in memory and serialize it as JSON blobs into a
//! string key-value store. The store is deliberately dumb: `get`/`set` of
//! text. Decode failures fall back to default state and encode failures skip
//! the write -- progress is data-loss-tolerant, never user-facing-fatal.

mod config;
pub mod database;
mod memory;

pub use config::{ChallengeConfig, Config, NotificationsConfig, StreakConfig};
pub use database::Database;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, StorageError};

/// Returns `~/.config/knockwood[-dev]/` based on KNOCKWOOD_ENV.
///
/// Set KNOCKWOOD_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("KNOCKWOOD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("knockwood-dev")
    } else {
        base_dir.join("knockwood")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

/// String-keyed JSON-text store. The sole durability mechanism the engines
/// depend on.
pub trait PersistentStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Store keys, one per entity kind.
pub mod keys {
    pub const PROGRESS: &str = "progress";
    pub const CHALLENGES: &str = "challenges";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const SEASONAL: &str = "seasonal";
    pub const MOOD_LOG: &str = "mood_log";
    pub const CATALOG: &str = "catalog";
    pub const SOCIAL: &str = "social";
}

/// Versioned wrapper around every persisted record, so future schema changes
/// can migrate instead of corrupting.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

/// Load a state record, degrading to `T::default()` on any failure.
///
/// Missing key, decode error and version mismatch all yield the default;
/// the two failure cases log a warning.
pub fn load_state<T>(store: &dyn PersistentStore, key: &str, version: u32) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "state read failed, starting from default");
            return T::default();
        }
    };
    match serde_json::from_str::<Envelope<T>>(&raw) {
        Ok(envelope) if envelope.version == version => envelope.data,
        Ok(envelope) => {
            tracing::warn!(
                key,
                found = envelope.version,
                expected = version,
                "state version mismatch, starting from default"
            );
            T::default()
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "state decode failed, starting from default");
            T::default()
        }
    }
}

/// Save a state record. Encode or write failures are logged and swallowed;
/// in-memory state remains authoritative.
pub fn save_state<T>(store: &dyn PersistentStore, key: &str, version: u32, data: &T)
where
    T: Serialize,
{
    let envelope = Envelope { version, data };
    match serde_json::to_string(&envelope) {
        Ok(raw) => {
            if let Err(e) = store.set(key, &raw) {
                tracing::warn!(key, error = %e, "state write failed, keeping in-memory state");
            }
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "state encode failed, keeping in-memory state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        count: u32,
    }

    #[test]
    fn round_trips_through_envelope() {
        let store = MemoryStore::new();
        save_state(&store, "sample", 1, &Sample { count: 7 });
        let loaded: Sample = load_state(&store, "sample", 1);
        assert_eq!(loaded, Sample { count: 7 });
    }

    #[test]
    fn missing_key_yields_default() {
        let store = MemoryStore::new();
        let loaded: Sample = load_state(&store, "absent", 1);
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn garbage_degrades_to_default() {
        let store = MemoryStore::new();
        store.set("sample", "not json at all").unwrap();
        let loaded: Sample = load_state(&store, "sample", 1);
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn version_mismatch_degrades_to_default() {
        let store = MemoryStore::new();
        save_state(&store, "sample", 1, &Sample { count: 7 });
        let loaded: Sample = load_state(&store, "sample", 2);
        assert_eq!(loaded, Sample::default());
    }
}
