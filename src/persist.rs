//! The per-user settings store.
//!
//! One JSON file holds the named settings of every project the user has run
//! in, keyed by the project's absolute path:
//!
//! ```text
//! { "version": 1,
//!   "projects": { "/work/app": { "active": "default",
//!                                "settings": { "default": { "db": { "host": "localhost" } } } } } }
//! ```
//!
//! A missing file is an empty store. Saving creates parent directories and
//! writes tab-indented JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PromptenvError;
use crate::tree::PersistedSection;

/// The only store format version this crate reads and writes.
pub const STORE_VERSION: u64 = 1;

/// Setting activated for a project seen for the first time.
pub const DEFAULT_SETTING: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsStore {
    pub version: u64,
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    pub active: String,
    #[serde(default)]
    pub settings: BTreeMap<String, PersistedSection>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            projects: BTreeMap::new(),
        }
    }
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            active: DEFAULT_SETTING.to_string(),
            settings: BTreeMap::new(),
        }
    }
}

impl SettingsStore {
    /// Pure function: parse store content, checking the format version first.
    pub fn from_json(content: &str, path: &Path) -> Result<Self, PromptenvError> {
        let raw: serde_json::Value =
            serde_json::from_str(content).map_err(|e| PromptenvError::PersistenceReadFailure {
                path: path.to_path_buf(),
                source: e,
            })?;

        let version = raw.get("version");
        if version.and_then(serde_json::Value::as_u64) != Some(STORE_VERSION) {
            return Err(PromptenvError::PersistenceVersionMismatch {
                path: path.to_path_buf(),
                found: version.map_or_else(|| "<missing>".to_string(), |v| v.to_string()),
                expected: STORE_VERSION,
            });
        }

        serde_json::from_value(raw).map_err(|e| PromptenvError::PersistenceReadFailure {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Pure function: render the store as tab-indented JSON.
    pub fn to_json(&self) -> Result<String, PromptenvError> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| PromptenvError::SerializeFailure {
                what: "settings store",
                reason: e.to_string(),
            })?;
        String::from_utf8(out).map_err(|e| PromptenvError::SerializeFailure {
            what: "settings store",
            reason: e.to_string(),
        })
    }

    /// I/O wrapper: read the store at `path`.
    ///
    /// Returns the store and whether it was freshly created because no file
    /// existed yet.
    pub fn load(path: &Path) -> Result<(Self, bool), PromptenvError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), "loaded settings store");
                Ok((Self::from_json(&content, path)?, false))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings store yet");
                Ok((Self::default(), true))
            }
            Err(e) => Err(PromptenvError::IoError {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// I/O wrapper: write the store to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), PromptenvError> {
        let content = self.to_json()?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| PromptenvError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path, content).map_err(|e| PromptenvError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "saved settings store");
        Ok(())
    }

    /// The settings of `project`, seeding an entry for a new project.
    pub fn project_mut(&mut self, project: &str) -> &mut ProjectSettings {
        self.projects.entry(project.to_string()).or_default()
    }

    pub fn project(&self, project: &str) -> Option<&ProjectSettings> {
        self.projects.get(project)
    }
}

impl ProjectSettings {
    /// The persisted tree of `setting`, seeding an empty one if needed.
    pub fn setting_mut(&mut self, setting: &str) -> &mut PersistedSection {
        self.settings.entry(setting.to_string()).or_default()
    }

    /// The persisted tree of the active setting.
    pub fn active_settings_mut(&mut self) -> &mut PersistedSection {
        let active = self.active.clone();
        self.setting_mut(&active)
    }

    /// Make `setting` active, seeding it if it does not exist yet.
    pub fn activate(&mut self, setting: &str) {
        self.active = setting.to_string();
        self.setting_mut(setting);
    }

    /// Names of all settings, sorted; the active one is included even if it was never saved.
    pub fn setting_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.settings.keys().cloned().collect();
        if !self.settings.contains_key(&self.active) {
            names.push(self.active.clone());
            names.sort();
        }
        names
    }
}
