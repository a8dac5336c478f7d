//! Components: manifests, the plug-in interface and the lifecycle manager.
//!
//! A component is a named plug-in described by a [`ComponentManifest`]
//! and driven through a [`ComponentInterface`]. The [`ComponentsManager`]
//! activates, deactivates and reloads components while keeping the
//! dependency constraints:
//!
//! - a component is activated only once all its requirements are;
//! - a component is deactivated only once no activated component requires it;
//! - reloading a component cycles its dependents around it.

mod interface;
mod manager;
mod manifest;

pub use interface::{ComponentHost, ComponentInterface, NullHost};
pub use manager::{
    ACTIVATED_ATTRIBUTE, ComponentsManager, DEACTIVATED_COMPONENTS_KEY, SETTINGS_SECTION, components_headers,
};
pub use manifest::{Category, ComponentManifest, MANIFEST_EXTENSION};
