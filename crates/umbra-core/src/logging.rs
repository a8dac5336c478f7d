//! Logging and debugging facilities for Umbra.
//!
//! This module provides:
//! - Stable `tracing` targets for every subsystem
//! - Debug visualization for graph subtrees
//! - Performance spans for long operations
//!
//! # Tracing Integration
//!
//! Umbra uses the `tracing` crate for instrumentation. To see logs, install a
//! tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//! }
//! ```
//!
//! # Debug Visualization
//!
//! Use [`GraphTreeDebug`] to render a subtree:
//!
//! ```
//! use umbra_core::graph::{Family, Graph};
//! use umbra_core::logging::{GraphTreeDebug, TreeFormatOptions};
//!
//! let mut graph = Graph::new();
//! let root = graph.create_node("root", Family::GraphModel);
//! let child = graph.create_node("alpha", Family::Default);
//! graph.add_child(root, child).unwrap();
//!
//! let debug = GraphTreeDebug::with_options(TreeFormatOptions::minimal());
//! let output = debug.format_subtree(&graph, root).unwrap();
//! assert!(output.contains("alpha"));
//! ```

use std::fmt::Write as FmtWrite;

use crate::error::{NodeError, NodeResult};
use crate::graph::{Graph, NodeId};

/// Span names used throughout Umbra for performance tracing.
pub mod span_names {
    /// Component reload, dependents included.
    pub const COMPONENT_RELOAD: &str = "umbra::components::reload";
    /// Batch activation, deactivation or reload.
    pub const COMPONENT_BATCH: &str = "umbra::components::batch";
    /// Model sort.
    pub const MODEL_SORT: &str = "umbra::model::sort";
    /// Highlighting of a whole document.
    pub const HIGHLIGHT_DOCUMENT: &str = "umbra::highlight::document";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core target.
    pub const CORE: &str = "umbra_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "umbra_core::signal";
    /// Node & attribute graph target.
    pub const GRAPH: &str = "umbra_core::graph";
    /// Tabular models target.
    pub const MODEL: &str = "umbra::model";
    /// Projects proxy target.
    pub const PROXY: &str = "umbra::proxy";
    /// Highlighting engine target.
    pub const HIGHLIGHT: &str = "umbra::highlight";
    /// Components manager target.
    pub const COMPONENTS: &str = "umbra::components";
    /// Preferences, layouts and resources target.
    pub const SETTINGS: &str = "umbra::settings";
    /// Performance spans target.
    pub const PERF: &str = "umbra::perf";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for graph tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node ids.
    pub show_ids: bool,
    /// Whether to show node families.
    pub show_families: bool,
    /// Whether to list attributes below each node.
    pub show_attributes: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_families: true,
            show_attributes: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_attributes: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_families: false,
            show_attributes: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing graph subtrees.
#[derive(Debug, Clone, Default)]
pub struct GraphTreeDebug {
    options: TreeFormatOptions,
}

impl GraphTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format a subtree starting from a specific node.
    pub fn format_subtree(&self, graph: &Graph, root: NodeId) -> NodeResult<String> {
        let mut output = String::new();
        self.format_subtree_into(graph, root, 0, true, &mut output)?;
        Ok(output)
    }

    fn format_subtree_into(
        &self,
        graph: &Graph,
        id: NodeId,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> NodeResult<()> {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        let node = graph.node(id).ok_or(NodeError::UnknownNode)?;

        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(if node.name().is_empty() {
            "(unnamed)"
        } else {
            node.name()
        });
        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        if self.options.show_families {
            let _ = write!(output, " ({})", node.family());
        }
        output.push('\n');

        if self.options.show_attributes {
            let prefix = self.build_attribute_prefix(depth);
            for attribute in node.attributes() {
                let _ = writeln!(output, "{prefix}  .{} = {}", attribute.name(), attribute.value());
            }
        }

        let children = node.children();
        for (i, &child) in children.iter().enumerate() {
            self.format_subtree_into(graph, child, depth + 1, i + 1 == children.len(), output)?;
        }
        Ok(())
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }

    fn build_attribute_prefix(&self, depth: usize) -> String {
        let branch = match self.options.style {
            TreeStyle::Ascii => "|",
            TreeStyle::Unicode => "\u{2502}",
            TreeStyle::Compact => "",
        };
        let mut prefix = String::new();
        for _ in 0..depth {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix
    }
}

/// A guard that keeps a performance span entered until dropped.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "umbra::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Wrappers around the `tracing` macros with the core target.
#[macro_export]
macro_rules! umbra_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "umbra_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! umbra_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "umbra_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! umbra_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "umbra_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! umbra_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "umbra_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! umbra_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "umbra_core", $($arg)*)
    };
}
