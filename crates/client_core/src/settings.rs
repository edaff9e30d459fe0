//! Durable client preferences (settings port).

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::{Result, SyncError},
    translator::Language,
};

/// Key-value preferences that survive process restarts.
pub trait ClientSettingsStore: Send + Sync {
    fn preset_language(&self) -> Option<Language>;
    fn set_preset_language(&self, language: Language);
    fn hide_new_user_hints(&self) -> bool;
    fn set_hide_new_user_hints(&self, hidden: bool);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_language: Option<Language>,
    #[serde(default)]
    pub hide_new_user_hints: bool,
}

#[derive(Debug, Default)]
pub struct MemorySettings {
    inner: Mutex<StoredSettings>,
}

impl MemorySettings {
    pub fn new(initial: StoredSettings) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut StoredSettings) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl ClientSettingsStore for MemorySettings {
    fn preset_language(&self) -> Option<Language> {
        self.with(|s| s.preset_language)
    }

    fn set_preset_language(&self, language: Language) {
        self.with(|s| s.preset_language = Some(language));
    }

    fn hide_new_user_hints(&self) -> bool {
        self.with(|s| s.hide_new_user_hints)
    }

    fn set_hide_new_user_hints(&self, hidden: bool) {
        self.with(|s| s.hide_new_user_hints = hidden);
    }
}

/// Settings persisted as a JSON document. Every write rewrites the file.
#[derive(Debug)]
pub struct JsonFileSettings {
    path: PathBuf,
    cache: MemorySettings,
}

impl JsonFileSettings {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let stored = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|err| SyncError::Settings {
                path: path.display().to_string(),
                message: err.to_string(),
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoredSettings::default(),
            Err(err) => {
                return Err(SyncError::Settings {
                    path: path.display().to_string(),
                    message: err.to_string(),
                })
            }
        };
        Ok(Self {
            path,
            cache: MemorySettings::new(stored),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        let snapshot = self.cache.with(|s| s.clone());
        if let Err(err) = write_settings(&self.path, &snapshot) {
            warn!(path = %self.path.display(), error = %err, "failed to persist client settings");
        }
    }
}

fn write_settings(path: &Path, settings: &StoredSettings) -> Result<()> {
    let to_settings_error = |message: String| SyncError::Settings {
        path: path.display().to_string(),
        message,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| to_settings_error(err.to_string()))?;
        }
    }
    let raw =
        serde_json::to_string_pretty(settings).map_err(|err| to_settings_error(err.to_string()))?;
    fs::write(path, raw).map_err(|err| to_settings_error(err.to_string()))
}

impl ClientSettingsStore for JsonFileSettings {
    fn preset_language(&self) -> Option<Language> {
        self.cache.preset_language()
    }

    fn set_preset_language(&self, language: Language) {
        self.cache.set_preset_language(language);
        self.persist();
    }

    fn hide_new_user_hints(&self) -> bool {
        self.cache.hide_new_user_hints()
    }

    fn set_hide_new_user_hints(&self, hidden: bool) {
        self.cache.set_hide_new_user_hints(hidden);
        self.persist();
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
