//! Persistence of markers, recommendations, profile and settings.
//!
//! Load-all / save-all over an opaque key-value store.

mod sqlite;
mod types;

use crate::error::SeraError;

pub use sqlite::SqliteStore;
pub use types::AppSnapshot;

pub trait SnapshotStore {
    /// Load everything. Missing keys come back as defaults.
    fn load_all(&self) -> Result<AppSnapshot, SeraError>;

    fn save_all(&self, snapshot: &AppSnapshot) -> Result<(), SeraError>;
}
