//! Prelude module for Umbra.
//!
//! ```
//! use umbra::prelude::*;
//! ```

// ============================================================================
// Core
// ============================================================================

pub use crate::Context;
pub use crate::error::{Result, UmbraError};
pub use umbra_core::{Attribute, Family, ItemData, ItemFlags, ItemRole, NodeId, SharedGraph, Signal};

// ============================================================================
// Models
// ============================================================================

pub use crate::model::{
    GraphModel, ItemModel, ModelIndex, ModelRegistry, ProjectsModel, ProjectsProxyModel, SortOrder, headers,
};

// ============================================================================
// Highlighting
// ============================================================================

pub use crate::highlight::{Format, Highlighter, Language, RuleSet, Theme};

// ============================================================================
// Components
// ============================================================================

pub use crate::components::{ComponentHost, ComponentInterface, ComponentManifest, ComponentsManager};

// ============================================================================
// Persistence
// ============================================================================

pub use crate::file::{LayoutsManager, Preferences, ResourceResolver, SettingsStore};
