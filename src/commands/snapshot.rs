use anyhow::{bail, Result};
use tracing::info;

use crate::config::Settings;
use crate::engine::RecommendationStatus;
use crate::store::{AppSnapshot, SnapshotStore, SqliteStore};

pub fn show(settings: &Settings) -> Result<AppSnapshot> {
    let store = SqliteStore::new(&settings.store_path())?;
    Ok(store.load_all()?)
}

/// Change one saved recommendation's status and persist it.
pub fn set_status(settings: &Settings, id: &str, status: RecommendationStatus) -> Result<AppSnapshot> {
    let store = SqliteStore::new(&settings.store_path())?;
    let mut snapshot = store.load_all()?;
    if !snapshot.set_status(id, status) {
        bail!("No saved recommendation with id '{}'", id);
    }
    store.save_all(&snapshot)?;
    info!("Recommendation {} marked {:?}", id, status);
    Ok(snapshot)
}
