//! Snapshot persistence for the stores.
//!
//! Each store is written to its own JSON file so a restart does not begin
//! with empty station boards.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{RailboardError, Result};
use crate::store::{Record, Store, Stores};

const ARRIVALS_FILE: &str = "arrivals.json";
const DEPARTURES_FILE: &str = "departures.json";
const SERVICES_FILE: &str = "services.json";

/// Snapshot storage backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Create a new storage instance.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Directory holding the snapshot files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Storage at [`default_data_dir`].
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined for this platform.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(default_data_dir()?))
    }

    /// Directory holding the snapshot files.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Restore every store whose snapshot file exists. Missing files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing snapshot cannot be read or parsed.
    pub async fn load_into(&self, stores: &Stores) -> Result<()> {
        self.load_store(&stores.arrivals, ARRIVALS_FILE).await?;
        self.load_store(&stores.departures, DEPARTURES_FILE).await?;
        self.load_store(&stores.services, SERVICES_FILE).await?;
        Ok(())
    }

    /// Write snapshots of all stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a file cannot be written.
    pub async fn save(&self, stores: &Stores) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .map_err(|e| persistence_error(&self.data_dir, &e))?;
        self.save_store(&stores.arrivals, ARRIVALS_FILE).await?;
        self.save_store(&stores.departures, DEPARTURES_FILE).await?;
        self.save_store(&stores.services, SERVICES_FILE).await?;
        Ok(())
    }

    async fn load_store<T>(&self, store: &Store<T>, file: &str) -> Result<()>
    where
        T: Record + DeserializeOwned,
    {
        let path = self.data_dir.join(file);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No snapshot to restore");
            return Ok(());
        }

        let content =
            std::fs::read_to_string(&path).map_err(|e| persistence_error(&path, &e))?;
        let records: Vec<T> =
            serde_json::from_str(&content).map_err(|e| persistence_error(&path, &e))?;
        let restored = store.restore(records).await;

        let kind = T::KIND;
        tracing::info!(%kind, records = restored, path = %path.display(), "Restored snapshot");
        Ok(())
    }

    async fn save_store<T>(&self, store: &Store<T>, file: &str) -> Result<()>
    where
        T: Record + Serialize,
    {
        let path = self.data_dir.join(file);
        let records = store.snapshot().await;
        let content = serde_json::to_string(&records)?;
        std::fs::write(&path, content).map_err(|e| persistence_error(&path, &e))?;

        let kind = T::KIND;
        tracing::info!(%kind, records = records.len(), path = %path.display(), "Saved snapshot");
        Ok(())
    }
}

fn persistence_error(path: &Path, err: &dyn std::fmt::Display) -> RailboardError {
    RailboardError::PersistenceError {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Default snapshot directory.
///
/// On Linux: `/var/lib/railboard/`
/// Elsewhere: the platform data directory, e.g. `~/Library/Application Support/railboard/`
///
/// # Errors
///
/// Returns an error if the platform data directory cannot be determined.
pub fn default_data_dir() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        Ok(PathBuf::from("/var/lib/railboard"))
    }
    #[cfg(not(target_os = "linux"))]
    {
        directories::ProjectDirs::from("", "", "railboard")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| RailboardError::ConfigError("Cannot determine data directory".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::{arrival, departure, service};

    #[tokio::test]
    async fn test_save_then_load_restores_records() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("snapshots"));

        let stores = Stores::new();
        stores.arrivals.insert(arrival("1", "UT", 8)).await;
        stores.departures.insert(departure("2", "UT", "8400621", 9)).await;
        stores.services.insert(service("3")).await;
        storage.save(&stores).await.unwrap();

        let restored = Stores::new();
        storage.load_into(&restored).await.unwrap();
        assert_eq!(restored.arrivals.len().await, 1);
        assert_eq!(restored.departures.len().await, 1);
        assert_eq!(restored.services.snapshot().await, vec![service("3")]);
    }

    #[tokio::test]
    async fn test_missing_snapshots_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());

        let stores = Stores::new();
        stores.arrivals.insert(arrival("1", "UT", 8)).await;
        storage.load_into(&stores).await.unwrap();

        assert_eq!(stores.arrivals.len().await, 1);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SERVICES_FILE), "not json").unwrap();

        let err = Storage::new(dir.path())
            .load_into(&Stores::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RailboardError::PersistenceError { .. }));
    }

    #[test]
    fn test_default_data_dir_is_valid_path() {
        let dir = default_data_dir().unwrap();
        assert!(!dir.as_os_str().is_empty());
    }
}
