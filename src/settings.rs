use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::session::TrackingConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct UserSettings {
    tracking: TrackingConfig,
}

/// JSON-file backed settings. A missing or unparsable file yields defaults.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring unreadable settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Stored tracking config with environment overrides applied.
    pub fn tracking(&self) -> Result<TrackingConfig> {
        Ok(self.stored_tracking()?.with_env_overrides())
    }

    /// Tracking config exactly as persisted, for editing.
    pub fn stored_tracking(&self) -> Result<TrackingConfig> {
        let guard = self
            .data
            .read()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        Ok(guard.tracking.clone())
    }

    pub fn update_tracking(&self, config: TrackingConfig) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        guard.tracking = config;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let config = store.tracking().unwrap();
        assert_eq!(config.continuity_tolerance_secs, 1.5);
        assert_eq!(config.seek_bridge_secs, 0.1);
    }

    #[test]
    fn updates_survive_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let config = TrackingConfig {
            continuity_tolerance_secs: 2.5,
            ..TrackingConfig::default()
        };
        store.update_tracking(config).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.tracking().unwrap().continuity_tolerance_secs, 2.5);
        assert_eq!(reloaded.stored_tracking().unwrap(), store.stored_tracking().unwrap());
    }

    #[test]
    fn garbage_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json at all").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.tracking().unwrap(), TrackingConfig::default().with_env_overrides());
    }
}
