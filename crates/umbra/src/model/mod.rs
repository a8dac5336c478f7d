//! Model/View layer over node graphs.
//!
//! Models present a subtree of a [`SharedGraph`](umbra_core::SharedGraph) to
//! views through [`ModelIndex`] positions and the [`ItemModel`] contract.
//! Views never touch the graph directly; they query data per
//! [`ItemRole`](umbra_core::ItemRole) and listen to [`ModelSignals`].
//!
//! # Core Types
//!
//! - `ModelIndex`: Identifies an item's position in a model
//! - `ItemModel`: The trait that models implement
//! - `ModelSignals`: Signals for change notifications
//!
//! # Model Implementations
//!
//! - `GraphModel`: Rows are nodes, columns are the attributes named by headers
//! - `ProjectsModel`: Projects, directories, files and editors of a script editor
//! - `ProjectsProxyModel`: Hides editor rows and renders per-family labels
//!
//! # Change routing
//!
//! ```text
//! ┌─────────────┐  changed   ┌───────────────┐  node/attribute  ┌────────────┐
//! │ SharedGraph │──────────>│ ModelRegistry │────────────────>│ GraphModel │
//! └─────────────┘           └───────────────┘                  └────────────┘
//!                                                                    │
//!                                                       data_changed │
//!                                                                    v
//!                                                                 views
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use umbra::model::{ItemModel, ModelIndex, ModelRegistry, headers};
//! use umbra_core::{Family, SharedGraph};
//!
//! let registry = ModelRegistry::new();
//! let graph = Arc::new(SharedGraph::default());
//! let root = graph.with_write(|g| g.create_node("root", Family::Default));
//! let model = registry.create_model(graph, root, headers([("Name", "name")]));
//!
//! model.signals().rows_inserted.connect(|(_, first, last)| {
//!     println!("rows {first}..={last} inserted");
//! });
//! model.insert_rows(0, 2, &ModelIndex::invalid()).unwrap();
//! assert_eq!(model.row_count(&ModelIndex::invalid()), 2);
//! ```

mod graph_model;
mod index;
mod projects;
mod proxy_model;
mod registry;
mod traits;

pub use graph_model::{GRAPH_MODEL_MIME_TYPE, GraphModel, Headers, MimeData, headers};
pub use index::ModelIndex;
pub use projects::{DEFAULT_PROJECT, EDITOR_ATTRIBUTE, PATH_ATTRIBUTE, ProjectsModel};
pub use proxy_model::{NodeFormats, ProjectsProxyModel};
pub use registry::ModelRegistry;
pub use traits::{ItemModel, ModelSignals, Orientation, SortOrder};
