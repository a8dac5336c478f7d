//! Named window layouts persisted through a [`SettingsStore`].
//!
//! A layout is an opaque snapshot of the host window: its geometry and
//! dock state blobs, whether the central widget is visible and the label
//! of the active perspective. Blobs are stored base64-encoded under the
//! `Layouts` section with the keys `{name}_geometry`, `{name}_windowState`,
//! `{name}_centralWidget` and `{name}_activeLabel`.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;
use parking_lot::RwLock;
use umbra_core::Signal;
use umbra_core::logging::targets;

use super::settings::SettingsStore;
use crate::error::LayoutError;

/// Settings section holding the layouts.
pub const LAYOUTS_SECTION: &str = "Layouts";

/// Identity of the layout restored at startup.
pub const STARTUP_LAYOUT: &str = "startup";

/// A registered layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Human readable name.
    pub name: String,
    /// Key prefix used in the settings.
    pub identity: String,
    /// Optional keyboard shortcut, as text.
    pub shortcut: Option<String>,
}

impl Layout {
    /// Creates a layout without shortcut.
    pub fn new(name: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identity: identity.into(),
            shortcut: None,
        }
    }

    /// Sets the shortcut.
    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }
}

/// Snapshot of the host window for one layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutState {
    pub geometry: Vec<u8>,
    pub window_state: Vec<u8>,
    pub central_widget: bool,
    pub active_label: Option<String>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            geometry: Vec::new(),
            window_state: Vec::new(),
            central_widget: true,
            active_label: None,
        }
    }
}

fn layout_key(name: &str, field: &str) -> String {
    format!("{name}_{field}")
}

/// Registry of layouts and their persistence.
pub struct LayoutsManager {
    settings: Arc<dyn SettingsStore>,
    layouts: RwLock<IndexMap<String, Layout>>,
    current_layout: RwLock<Option<String>>,
    restore_geometry_on_layout_change: RwLock<bool>,
    layout_restored: Signal<String>,
    layout_stored: Signal<String>,
}

impl LayoutsManager {
    /// Creates a manager with the startup layout registered.
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        let mut layouts = IndexMap::new();
        layouts.insert(STARTUP_LAYOUT.to_string(), Layout::new("Startup", STARTUP_LAYOUT));
        Self {
            settings,
            layouts: RwLock::new(layouts),
            current_layout: RwLock::new(None),
            restore_geometry_on_layout_change: RwLock::new(false),
            layout_restored: Signal::new(),
            layout_stored: Signal::new(),
        }
    }

    /// Signal emitted with the layout name after a restore.
    pub fn layout_restored(&self) -> &Signal<String> {
        &self.layout_restored
    }

    /// Signal emitted with the layout name after a store.
    pub fn layout_stored(&self) -> &Signal<String> {
        &self.layout_stored
    }

    /// The layout most recently stored or restored.
    pub fn current_layout(&self) -> Option<String> {
        self.current_layout.read().clone()
    }

    /// Whether [`restore_layout`](Self::restore_layout) brings the geometry back.
    pub fn restore_geometry_on_layout_change(&self) -> bool {
        *self.restore_geometry_on_layout_change.read()
    }

    pub fn set_restore_geometry_on_layout_change(&self, value: bool) {
        *self.restore_geometry_on_layout_change.write() = value;
    }

    /// Registered layout names, sorted.
    pub fn list_layouts(&self) -> Vec<String> {
        let mut names: Vec<String> = self.layouts.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// The layout registered under `name`.
    pub fn layout(&self, name: &str) -> Option<Layout> {
        self.layouts.read().get(name).cloned()
    }

    pub fn is_layout_registered(&self, name: &str) -> bool {
        self.layouts.read().contains_key(name)
    }

    /// Registers a layout under `name`.
    pub fn register_layout(&self, name: impl Into<String>, layout: Layout) -> Result<(), LayoutError> {
        let name = name.into();
        let mut layouts = self.layouts.write();
        if layouts.contains_key(&name) {
            return Err(LayoutError::AlreadyRegistered(name));
        }
        tracing::debug!(target: targets::SETTINGS, layout = %name, "registered layout");
        layouts.insert(name, layout);
        Ok(())
    }

    /// Unregisters the layout `name`.
    pub fn unregister_layout(&self, name: &str) -> Result<Layout, LayoutError> {
        self.layouts
            .write()
            .shift_remove(name)
            .ok_or_else(|| LayoutError::NotRegistered(name.to_string()))
    }

    /// Whether a snapshot of `name` was stored.
    pub fn is_layout_stored(&self, name: &str) -> bool {
        self.settings
            .key_exists(LAYOUTS_SECTION, &layout_key(name, "windowState"))
    }

    /// Stores a snapshot of the layout `name` and makes it current.
    pub fn store_layout(&self, name: &str, state: &LayoutState) -> Result<(), LayoutError> {
        self.ensure_registered(name)?;
        let settings = &self.settings;
        settings.set_key(LAYOUTS_SECTION, &layout_key(name, "geometry"), &STANDARD.encode(&state.geometry));
        settings.set_key(
            LAYOUTS_SECTION,
            &layout_key(name, "windowState"),
            &STANDARD.encode(&state.window_state),
        );
        settings.set_key(
            LAYOUTS_SECTION,
            &layout_key(name, "centralWidget"),
            if state.central_widget { "true" } else { "false" },
        );
        settings.set_key(
            LAYOUTS_SECTION,
            &layout_key(name, "activeLabel"),
            state.active_label.as_deref().unwrap_or_default(),
        );
        tracing::debug!(target: targets::SETTINGS, layout = name, "stored layout");
        *self.current_layout.write() = Some(name.to_string());
        self.layout_stored.emit(name.to_string());
        Ok(())
    }

    /// Restores the snapshot of the layout `name` and makes it current.
    ///
    /// The geometry is only returned when geometry restoration is enabled.
    /// Keys never stored yield the [`LayoutState::default`] fields.
    pub fn restore_layout(&self, name: &str) -> Result<LayoutState, LayoutError> {
        let mut state = self.read_state(name)?;
        if !self.restore_geometry_on_layout_change() {
            state.geometry.clear();
        }
        tracing::debug!(target: targets::SETTINGS, layout = name, "restored layout");
        *self.current_layout.write() = Some(name.to_string());
        self.layout_restored.emit(name.to_string());
        Ok(state)
    }

    /// Restores the startup layout, geometry included.
    pub fn restore_startup_layout(&self) -> Result<LayoutState, LayoutError> {
        let state = self.read_state(STARTUP_LAYOUT)?;
        *self.current_layout.write() = Some(STARTUP_LAYOUT.to_string());
        self.layout_restored.emit(STARTUP_LAYOUT.to_string());
        Ok(state)
    }

    /// Stores the startup layout.
    pub fn store_startup_layout(&self, state: &LayoutState) -> Result<(), LayoutError> {
        self.store_layout(STARTUP_LAYOUT, state)
    }

    fn ensure_registered(&self, name: &str) -> Result<(), LayoutError> {
        if self.is_layout_registered(name) {
            Ok(())
        } else {
            Err(LayoutError::NotRegistered(name.to_string()))
        }
    }

    fn read_blob(&self, name: &str, field: &str) -> Result<Vec<u8>, LayoutError> {
        let key = layout_key(name, field);
        match self.settings.get_key(LAYOUTS_SECTION, &key) {
            Some(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map_err(|source| LayoutError::InvalidBlob { key, source }),
            None => Ok(Vec::new()),
        }
    }

    fn read_state(&self, name: &str) -> Result<LayoutState, LayoutError> {
        self.ensure_registered(name)?;
        let central_widget = self
            .settings
            .get_key(LAYOUTS_SECTION, &layout_key(name, "centralWidget"))
            .is_none_or(|value| value.eq_ignore_ascii_case("true"));
        let active_label = self
            .settings
            .get_key(LAYOUTS_SECTION, &layout_key(name, "activeLabel"))
            .filter(|label| !label.is_empty());
        Ok(LayoutState {
            geometry: self.read_blob(name, "geometry")?,
            window_state: self.read_blob(name, "windowState")?,
            central_widget,
            active_label,
        })
    }
}

static_assertions::assert_impl_all!(LayoutsManager: Send, Sync);

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::file::Preferences;

    fn manager() -> (Arc<Preferences>, LayoutsManager) {
        let preferences = Arc::new(Preferences::new());
        let manager = LayoutsManager::new(preferences.clone());
        (preferences, manager)
    }

    fn state() -> LayoutState {
        LayoutState {
            geometry: vec![1, 2, 3],
            window_state: vec![0, 255, 16],
            central_widget: false,
            active_label: Some("Development".into()),
        }
    }

    #[test]
    fn test_startup_layout_registered() {
        let (_, manager) = manager();
        assert_eq!(manager.list_layouts(), vec!["startup"]);
        assert_eq!(manager.layout("startup").unwrap().name, "Startup");
    }

    #[test]
    fn test_register_and_unregister() {
        let (_, manager) = manager();
        manager
            .register_layout("one", Layout::new("Development", "one").with_shortcut("Ctrl+1"))
            .unwrap();
        assert!(matches!(
            manager.register_layout("one", Layout::new("Development", "one")),
            Err(LayoutError::AlreadyRegistered(_))
        ));
        assert_eq!(manager.list_layouts(), vec!["one", "startup"]);
        manager.unregister_layout("one").unwrap();
        assert!(matches!(
            manager.unregister_layout("one"),
            Err(LayoutError::NotRegistered(_))
        ));
    }

    #[test]
    fn test_store_and_restore() {
        let (preferences, manager) = manager();
        let events = Arc::new(Mutex::new(Vec::new()));
        let stored = events.clone();
        manager
            .layout_stored()
            .connect(move |name| stored.lock().push(format!("stored {name}")));
        let restored = events.clone();
        manager
            .layout_restored()
            .connect(move |name| restored.lock().push(format!("restored {name}")));

        assert!(!manager.is_layout_stored("startup"));
        manager.store_startup_layout(&state()).unwrap();
        assert!(manager.is_layout_stored("startup"));
        assert_eq!(
            preferences.get_key(LAYOUTS_SECTION, "startup_geometry").as_deref(),
            Some("AQID")
        );

        let restored_state = manager.restore_layout("startup").unwrap();
        assert!(restored_state.geometry.is_empty());
        assert_eq!(restored_state.window_state, vec![0, 255, 16]);
        assert!(!restored_state.central_widget);
        assert_eq!(restored_state.active_label.as_deref(), Some("Development"));

        assert_eq!(manager.restore_startup_layout().unwrap(), state());
        assert_eq!(manager.current_layout().as_deref(), Some("startup"));
        assert_eq!(
            *events.lock(),
            vec!["stored startup", "restored startup", "restored startup"]
        );
    }

    #[test]
    fn test_restore_geometry_when_enabled() {
        let (_, manager) = manager();
        manager.set_restore_geometry_on_layout_change(true);
        manager.store_layout("startup", &state()).unwrap();
        assert_eq!(manager.restore_layout("startup").unwrap().geometry, vec![1, 2, 3]);
    }

    #[test]
    fn test_unregistered_layout() {
        let (_, manager) = manager();
        assert!(matches!(
            manager.store_layout("missing", &state()),
            Err(LayoutError::NotRegistered(_))
        ));
        assert!(matches!(
            manager.restore_layout("missing"),
            Err(LayoutError::NotRegistered(_))
        ));
    }

    #[test]
    fn test_invalid_blob() {
        let (preferences, manager) = manager();
        preferences.set_key(LAYOUTS_SECTION, "startup_windowState", "not base64!");
        assert!(matches!(
            manager.restore_layout("startup"),
            Err(LayoutError::InvalidBlob { key, .. }) if key == "startup_windowState"
        ));
    }
}
