//! Umbra core: the non-UI engine of the Umbra editor.
//!
//! - [`model`]: tabular models over the node graph, the projects model and
//!   its filtering proxy
//! - [`highlight`]: regex rules, format themes and block highlighting
//! - [`components`]: component manifests and the lifecycle manager
//! - [`file`]: preferences, layouts and resource lookup
//!
//! The node graph, signals and item data come from [`umbra_core`] and are
//! re-exported here.
//!
//! # Example
//!
//! ```
//! use umbra::Context;
//! use umbra::model::{ItemModel, ModelIndex, ProjectsProxyModel};
//!
//! let context = Context::in_memory();
//! let projects = context.projects_model();
//! let project = projects.register_project("/work/umbra", true).unwrap();
//! let file = projects.register_file("/work/umbra/notes.txt", project, true).unwrap();
//! projects.register_editor("notes.txt", file, true).unwrap();
//!
//! let proxy = ProjectsProxyModel::new(projects.clone());
//! let root = ModelIndex::invalid();
//! assert_eq!(proxy.row_count(&root), 2);
//! ```

pub use umbra_core::*;

pub mod components;
mod context;
pub mod error;
pub mod file;
pub mod highlight;
pub mod model;
pub mod prelude;

pub use context::Context;
pub use error::{Result, UmbraError};
