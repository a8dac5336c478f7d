//! Persistence collaborators: preferences, layouts and resources.
//!
//! The core only sees the [`SettingsStore`] trait. [`Preferences`] backs it
//! with an INI file, [`LayoutsManager`] keeps named window layouts in it,
//! and [`ResourceResolver`] finds data files such as grammar and component
//! manifests.
//!
//! ```
//! use std::sync::Arc;
//! use umbra::file::{LayoutState, LayoutsManager, Preferences};
//!
//! let preferences = Arc::new(Preferences::new());
//! let layouts = LayoutsManager::new(preferences);
//! layouts.store_startup_layout(&LayoutState::default()).unwrap();
//! assert!(layouts.is_layout_stored("startup"));
//! ```

mod error;
mod layouts;
mod resource;
mod settings;

pub use error::{FileError, FileErrorKind, FileResult};
pub use layouts::{LAYOUTS_SECTION, Layout, LayoutState, LayoutsManager, STARTUP_LAYOUT};
pub use resource::ResourceResolver;
pub use settings::{Preferences, SettingsStore};
