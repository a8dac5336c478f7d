//! Core systems for Umbra.
//!
//! This crate provides the foundations the Umbra models, highlighter and
//! components manager are built on:
//!
//! - **Signal/Slot System**: Type-safe synchronous notifications
//! - **Item Data**: Roles, values and interaction flags shared by every cell
//! - **Node & Attribute Graph**: Arena-backed composite tree with observable
//!   nodes and attributes
//! - **Logging**: `tracing` targets, performance spans and tree dumps
//!
//! # Graph Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use umbra_core::graph::{Attribute, Family, GraphChange, SharedGraph};
//!
//! let graph = SharedGraph::default();
//! let node = graph.with_write(|g| {
//!     let node = g.create_node("alpha", Family::Default);
//!     g.set_attribute(node, Attribute::new("traced", false).with_trigger(true))
//!         .unwrap();
//!     node
//! });
//!
//! let changes = Arc::new(Mutex::new(Vec::new()));
//! let sink = changes.clone();
//! graph.changed().connect(move |change| sink.lock().push(change.clone()));
//!
//! graph.with_write(|g| g.set_attribute_value(node, "traced", true)).unwrap();
//! assert_eq!(changes.lock().len(), 1);
//! ```

mod error;
mod flags;
pub mod graph;
pub mod logging;
mod role;
pub mod signal;

pub use error::{AttributeError, AttributeResult, NodeError, NodeResult};
pub use flags::ItemFlags;
pub use graph::{
    Attribute, Family, Graph, GraphChange, GraphId, MatchFlags, Node, NodeId, NodesWalker,
    ObservableMeta, SharedGraph,
};
pub use logging::{GraphTreeDebug, PerfSpan, TreeFormatOptions, TreeStyle};
pub use role::{ItemData, ItemRole, compare_item_data};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
