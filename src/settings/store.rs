use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

use crate::settings::types::PreviewSettings;

/// Settings persistence errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Persistent preview settings backed by a JSON file.
pub struct SettingsStore {
    path: PathBuf,
    data: Mutex<PreviewSettings>,
}

impl SettingsStore {
    /// Create a new store, loading from disk if the file exists. An
    /// unreadable file is logged and replaced by defaults in memory.
    pub fn new(path: PathBuf) -> Self {
        let data = Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load settings from {}: {e}", path.display());
            PreviewSettings::default()
        });
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    /// Load settings from a JSON file, returning defaults on a missing file.
    pub fn load(path: &Path) -> Result<PreviewSettings, SettingsError> {
        if !path.exists() {
            return Ok(PreviewSettings::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save current settings to disk atomically (write .tmp then rename).
    pub fn save(&self) -> Result<(), SettingsError> {
        let data = self.data.lock().clone();
        let json = serde_json::to_string_pretty(&data)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings.
    pub fn get(&self) -> PreviewSettings {
        self.data.lock().clone()
    }

    /// Modify the in-memory settings. Call [`SettingsStore::save`] to persist.
    pub fn update(&self, f: impl FnOnce(&mut PreviewSettings)) {
        f(&mut self.data.lock());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Helper: create a store backed by a temp directory.
    fn temp_store() -> (SettingsStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preview.json");
        let store = SettingsStore::new(path);
        (store, dir)
    }

    #[test]
    fn load_returns_default_when_file_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nonexistent.json");
        let result = SettingsStore::load(&path).unwrap();
        assert_eq!(result, PreviewSettings::default());
    }

    #[test]
    fn load_parses_valid_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preview.json");
        std::fs::write(&path, r#"{"targetWidth":1280,"targetHeight":720,"workers":2}"#).unwrap();

        let result = SettingsStore::load(&path).unwrap();
        assert_eq!(result.target_width, 1280);
        assert_eq!(result.target_height, 720);
        assert_eq!(result.workers, 2);
    }

    #[test]
    fn load_returns_error_for_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preview.json");
        std::fs::write(&path, "not valid json!!!").unwrap();

        let result = SettingsStore::load(&path);
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn new_falls_back_to_defaults_for_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preview.json");
        std::fs::write(&path, "{ broken").unwrap();

        let store = SettingsStore::new(path);
        assert_eq!(store.get(), PreviewSettings::default());
    }

    #[test]
    fn save_round_trips_through_load() {
        let (store, dir) = temp_store();
        store.update(|s| {
            s.workers = 4;
            s.scale_to_target = true;
        });
        store.save().unwrap();

        let loaded = SettingsStore::load(&dir.path().join("preview.json")).unwrap();
        assert_eq!(loaded.workers, 4);
        assert!(loaded.scale_to_target);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("preview.json");
        let store = SettingsStore::new(path.clone());
        store.save().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn save_is_atomic() {
        let (store, dir) = temp_store();
        store.save().unwrap();

        // After a successful save, no .tmp file should remain
        let tmp_path = dir.path().join("preview.json.tmp");
        assert!(
            !tmp_path.exists(),
            ".tmp file should be cleaned up after rename"
        );
    }

    #[test]
    fn new_loads_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preview.json");
        let settings = PreviewSettings {
            dummy_fps: 12,
            ..Default::default()
        };
        std::fs::write(&path, serde_json::to_string(&settings).unwrap()).unwrap();

        let store = SettingsStore::new(path);
        assert_eq!(store.get().dummy_fps, 12);
    }

    #[test]
    fn update_does_not_touch_disk() {
        let (store, dir) = temp_store();
        store.update(|s| s.workers = 8);
        assert_eq!(store.get().workers, 8);
        assert!(!dir.path().join("preview.json").exists());
    }
}
