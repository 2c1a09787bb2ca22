use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::SeraError;

use super::types::AppSnapshot;
use super::SnapshotStore;

const KEY_MARKERS: &str = "markers";
const KEY_RECOMMENDATIONS: &str = "recommendations";
const KEY_PROFILE: &str = "profile";
const KEY_SETTINGS: &str = "settings";

/// Key-value snapshot store backed by SQLite.
/// All operations are synchronous (rusqlite is blocking).
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create or open the snapshot database at `db_path`.
    pub fn new(db_path: &Path) -> Result<Self, SeraError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SeraError::Store(format!("Failed to create data dir: {}", e)))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| SeraError::Store(format!("Failed to open snapshot db: {}", e)))?;
        let store = Self::init(conn)?;
        info!("Opened snapshot database at {:?}", db_path);
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, SeraError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SeraError::Store(format!("Failed to open in-memory db: {}", e)))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, SeraError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| SeraError::Store(format!("Failed to create table: {}", e)))?;
        Ok(Self { conn })
    }

    /// Read one key. Missing or unreadable values come back as the default.
    fn get<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, SeraError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value_json FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| SeraError::Store(format!("Failed to read '{}': {}", key, e)))?;

        let Some(json) = json else {
            debug!("No stored value for '{}'", key);
            return Ok(T::default());
        };

        match serde_json::from_str(&json) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("Discarding unreadable stored value for '{}': {}", key, e);
                Ok(T::default())
            }
        }
    }

    fn put<T: Serialize>(conn: &Connection, key: &str, value: &T, now: &str) -> Result<(), SeraError> {
        let json = serde_json::to_string(value)
            .map_err(|e| SeraError::Store(format!("Failed to serialize '{}': {}", key, e)))?;
        conn.execute(
            "INSERT INTO kv (key, value_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![key, json, now],
        )
        .map_err(|e| SeraError::Store(format!("Failed to write '{}': {}", key, e)))?;
        Ok(())
    }

    /// When `key` was last written, as RFC 3339.
    pub fn updated_at(&self, key: &str) -> Result<Option<String>, SeraError> {
        self.conn
            .query_row(
                "SELECT updated_at FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(SeraError::from)
    }

    /// Remove every stored key.
    pub fn clear(&self) -> Result<(), SeraError> {
        let removed = self.conn.execute("DELETE FROM kv", [])?;
        info!("Cleared snapshot store ({} keys)", removed);
        Ok(())
    }
}

impl SnapshotStore for SqliteStore {
    fn load_all(&self) -> Result<AppSnapshot, SeraError> {
        let snapshot = AppSnapshot {
            markers: self.get(KEY_MARKERS)?,
            recommendations: self.get(KEY_RECOMMENDATIONS)?,
            profile: self.get(KEY_PROFILE)?,
            settings: self.get(KEY_SETTINGS)?,
        };
        debug!(
            "Loaded snapshot: {} markers, {} recommendations",
            snapshot.markers.len(),
            snapshot.recommendations.len()
        );
        Ok(snapshot)
    }

    fn save_all(&self, snapshot: &AppSnapshot) -> Result<(), SeraError> {
        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;
        Self::put(&tx, KEY_MARKERS, &snapshot.markers, &now)?;
        Self::put(&tx, KEY_RECOMMENDATIONS, &snapshot.recommendations, &now)?;
        Self::put(&tx, KEY_PROFILE, &snapshot.profile, &now)?;
        Self::put(&tx, KEY_SETTINGS, &snapshot.settings, &now)?;
        tx.commit()?;

        info!(
            "Saved snapshot: {} markers, {} recommendations",
            snapshot.markers.len(),
            snapshot.recommendations.len()
        );
        Ok(())
    }
}
