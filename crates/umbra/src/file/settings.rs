//! User preferences.
//!
//! The core reads and writes preferences through the [`SettingsStore`]
//! trait. [`Preferences`] is the standard implementation: sectioned
//! key-value pairs persisted as an INI file.
//!
//! # Example
//!
//! ```
//! use umbra::file::{Preferences, SettingsStore};
//!
//! let preferences = Preferences::new();
//! preferences.set_key("Settings", "deactivated_components", "addons.tcp");
//!
//! assert!(preferences.key_exists("Settings", "deactivated_components"));
//! assert_eq!(
//!     preferences.get_key("Settings", "deactivated_components").as_deref(),
//!     Some("addons.tcp")
//! );
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use parking_lot::RwLock;
use umbra_core::Signal;
use umbra_core::logging::targets;

use super::error::{FileError, FileResult};

/// Key-value collaborator used by the core to persist state.
pub trait SettingsStore: Send + Sync {
    /// The value stored under `section/key`.
    fn get_key(&self, section: &str, key: &str) -> Option<String>;

    /// Stores `value` under `section/key`.
    fn set_key(&self, section: &str, key: &str, value: &str);

    /// Whether `section/key` holds a value.
    fn key_exists(&self, section: &str, key: &str) -> bool {
        self.get_key(section, key).is_some()
    }

    /// Keys of a section, in storage order.
    fn section_keys(&self, section: &str) -> Vec<String>;
}

/// INI-backed preferences, in memory or bound to a file.
pub struct Preferences {
    path: Option<PathBuf>,
    data: RwLock<Ini>,
    changed: Signal<(String, String)>,
}

impl Preferences {
    /// Creates empty in-memory preferences.
    pub fn new() -> Self {
        Self {
            path: None,
            data: RwLock::new(Ini::new()),
            changed: Signal::new(),
        }
    }

    /// Parses preferences from INI text.
    pub fn parse(content: &str) -> FileResult<Self> {
        let ini = Ini::load_from_str(content)
            .map_err(|e| FileError::invalid_data(None, e.to_string()))?;
        Ok(Self {
            path: None,
            data: RwLock::new(ini),
            changed: Signal::new(),
        })
    }

    /// Loads preferences bound to `path`.
    ///
    /// A missing file yields empty preferences that [`save`](Self::save)
    /// will create.
    pub fn load(path: impl AsRef<Path>) -> FileResult<Self> {
        let path = path.as_ref();
        let ini = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| FileError::from_io(e, path))?;
            Ini::load_from_str(&content)
                .map_err(|e| FileError::invalid_data(Some(path), e.to_string()))?
        } else {
            tracing::debug!(target: targets::SETTINGS, path = %path.display(), "preferences file missing, starting empty");
            Ini::new()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            data: RwLock::new(ini),
            changed: Signal::new(),
        })
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Signal emitted with `(section, key)` after every write.
    pub fn changed(&self) -> &Signal<(String, String)> {
        &self.changed
    }

    /// Removes a key, returning its value.
    pub fn remove_key(&self, section: &str, key: &str) -> Option<String> {
        let removed = self.data.write().delete_from(Some(section), key);
        if removed.is_some() {
            self.changed.emit((section.to_string(), key.to_string()));
        }
        removed
    }

    /// Named sections, in storage order.
    pub fn sections(&self) -> Vec<String> {
        self.data
            .read()
            .sections()
            .flatten()
            .map(str::to_string)
            .collect()
    }

    /// Serializes the preferences as INI text.
    pub fn to_ini_string(&self) -> String {
        let mut output = Vec::new();
        if self.data.read().write_to(&mut output).is_err() {
            return String::new();
        }
        String::from_utf8_lossy(&output).into_owned()
    }

    /// Writes the preferences to their backing file.
    pub fn save(&self) -> FileResult<()> {
        let path = self.path.as_deref().ok_or_else(FileError::no_path)?;
        self.save_to(path)
    }

    /// Writes the preferences to `path`, replacing it atomically.
    pub fn save_to(&self, path: impl AsRef<Path>) -> FileResult<()> {
        let path = path.as_ref();
        let staging = path.with_extension("tmp");
        fs::write(&staging, self.to_ini_string()).map_err(|e| FileError::from_io(e, &staging))?;
        fs::rename(&staging, path).map_err(|e| FileError::from_io(e, path))?;
        tracing::debug!(target: targets::SETTINGS, path = %path.display(), "saved preferences");
        Ok(())
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for Preferences {
    fn get_key(&self, section: &str, key: &str) -> Option<String> {
        self.data.read().get_from(Some(section), key).map(str::to_string)
    }

    fn set_key(&self, section: &str, key: &str, value: &str) {
        self.data.write().with_section(Some(section)).set(key, value);
        tracing::trace!(target: targets::SETTINGS, section, key, "set key");
        self.changed.emit((section.to_string(), key.to_string()));
    }

    fn key_exists(&self, section: &str, key: &str) -> bool {
        self.data
            .read()
            .section(Some(section))
            .is_some_and(|properties| properties.contains_key(key))
    }

    fn section_keys(&self, section: &str) -> Vec<String> {
        self.data
            .read()
            .section(Some(section))
            .map(|properties| properties.iter().map(|(key, _)| key.to_string()).collect())
            .unwrap_or_default()
    }
}

static_assertions::assert_impl_all!(Preferences: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_set_and_get() {
        let preferences = Preferences::new();
        assert!(!preferences.key_exists("Settings", "verbosity"));
        preferences.set_key("Settings", "verbosity", "3");
        assert_eq!(preferences.get_key("Settings", "verbosity").as_deref(), Some("3"));
        assert_eq!(preferences.section_keys("Settings"), vec!["verbosity"]);
        assert_eq!(preferences.sections(), vec!["Settings"]);
    }

    #[test]
    fn test_changed_signal() {
        let preferences = Preferences::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        preferences
            .changed()
            .connect(move |change| received_clone.lock().push(change.clone()));

        preferences.set_key("Layouts", "startup_activeLabel", "Development");
        preferences.remove_key("Layouts", "startup_activeLabel");
        preferences.remove_key("Layouts", "missing");

        assert_eq!(received.lock().len(), 2);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.ini");

        let preferences = Preferences::load(&path).unwrap();
        assert!(preferences.sections().is_empty());
        preferences.set_key("Settings", "deactivated_components", "a, b");
        preferences.save().unwrap();

        let reloaded = Preferences::load(&path).unwrap();
        assert_eq!(
            reloaded.get_key("Settings", "deactivated_components").as_deref(),
            Some("a, b")
        );
    }

    #[test]
    fn test_save_without_path_fails() {
        let preferences = Preferences::new();
        let error = preferences.save().unwrap_err();
        assert_eq!(error.kind(), crate::file::FileErrorKind::InvalidPath);
    }

    #[test]
    fn test_parse() {
        let preferences = Preferences::parse("[Settings]\nrestore_geometry = True\n").unwrap();
        assert_eq!(
            preferences.get_key("Settings", "restore_geometry").as_deref(),
            Some("True")
        );
    }
}
