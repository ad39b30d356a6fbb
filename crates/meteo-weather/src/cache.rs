//! Persistence port for the store state, with a JSON file backend and an
//! in-memory backend.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::{FetchParams, StructuredWeather};

/// Fixed namespace key for the persisted state.
pub const STORAGE_KEY: &str = "weather-storage";

/// The subset of store state that survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub auto_refresh: bool,
    pub last_result: Option<StructuredWeather>,
    pub last_params: Option<FetchParams>,
    pub last_fetch_time: Option<DateTime<Utc>>,
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage format error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait StatePersistence: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<PersistedState>, PersistError>;
    fn save(&self, state: &PersistedState) -> Result<(), PersistError>;
}

/// JSON file at `<config_dir>/weather-storage.json`.
#[derive(Debug, Clone)]
pub struct WeatherCache {
    cache_path: PathBuf,
}

impl WeatherCache {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            cache_path: config_dir.join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.cache_path
    }
}

impl StatePersistence for WeatherCache {
    fn load(&self) -> Result<Option<PersistedState>, PersistError> {
        let contents = match fs::read_to_string(&self.cache_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, state: &PersistedState) -> Result<(), PersistError> {
        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.cache_path, json)?;
        tracing::debug!("Saved weather state to {}", self.cache_path.display());
        Ok(())
    }
}

/// Keeps the state in memory only. Useful for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    state: Mutex<Option<PersistedState>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-saved state.
    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    pub fn snapshot(&self) -> Option<PersistedState> {
        self.state.lock().clone()
    }
}

impl StatePersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<PersistedState>, PersistError> {
        Ok(self.state.lock().clone())
    }

    fn save(&self, state: &PersistedState) -> Result<(), PersistError> {
        *self.state.lock() = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::types::DailyRecord;
    use tempfile::TempDir;

    fn sample_state() -> PersistedState {
        PersistedState {
            auto_refresh: true,
            last_result: Some(StructuredWeather {
                latitude: 40.7128,
                longitude: -74.006,
                timezone: "America/New_York".to_string(),
                timezone_abbreviation: None,
                past_days: Vec::new(),
                current_day: DailyRecord::default(),
                forecast: vec![DailyRecord::default(); 2],
            }),
            last_params: Some(FetchParams::new(40.7128, -74.006).with_forecast_days(2)),
            last_fetch_time: Some(Utc::now()),
        }
    }

    #[test]
    fn test_file_path_uses_storage_key() {
        let cache = WeatherCache::new(Path::new("/tmp/meteo"));
        assert_eq!(cache.path(), Path::new("/tmp/meteo/weather-storage.json"));
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = WeatherCache::new(dir.path());
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let cache = WeatherCache::new(&dir.path().join("nested"));
        let state = sample_state();

        cache.save(&state).unwrap();
        assert!(cache.path().exists());

        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_corrupt_file_is_serde_error() {
        let dir = TempDir::new().unwrap();
        let cache = WeatherCache::new(dir.path());
        fs::write(cache.path(), "{ not json").unwrap();

        assert!(matches!(cache.load(), Err(PersistError::Serde(_))));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let cache = WeatherCache::new(dir.path());
        fs::write(cache.path(), r#"{"auto_refresh": true}"#).unwrap();

        let loaded = cache.load().unwrap().unwrap();
        assert!(loaded.auto_refresh);
        assert!(loaded.last_result.is_none());
    }

    #[test]
    fn test_memory_persistence() {
        let memory = MemoryPersistence::new();
        assert!(memory.load().unwrap().is_none());

        let state = sample_state();
        memory.save(&state).unwrap();
        assert_eq!(memory.snapshot(), Some(state));
    }
}
