//! Tabular model over a node graph.
//!
//! [`GraphModel`] presents the descendants of a root node as rows. Column 0
//! shows the node itself; every other column projects the attribute named
//! by its header.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use umbra_core::logging::{span_names, targets};
use umbra_core::{
    Family, Graph, ItemData, ItemFlags, ItemRole, MatchFlags, NodeId, NodeResult, PerfSpan,
    SharedGraph,
};

use super::index::ModelIndex;
use super::traits::{ItemModel, ModelSignals, Orientation, SortOrder};
use crate::error::{ModelError, ModelResult};

/// Mime format of rows serialized by [`GraphModel::mime_encode`].
pub const GRAPH_MODEL_MIME_TYPE: &str = "application/x-umbragraphmodeldatalist";

/// Ordered header label to attribute name mapping.
///
/// The first entry labels column 0, which always shows the node name.
pub type Headers = IndexMap<String, String>;

/// Builds [`Headers`] from `(label, attribute)` pairs.
pub fn headers<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Headers {
    pairs
        .into_iter()
        .map(|(label, attribute)| (label.to_string(), attribute.to_string()))
        .collect()
}

/// Serialized selection of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeData {
    pub format: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MimePayload {
    graph: u64,
    items: Vec<MimeItem>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MimeItem {
    family: String,
    path: Vec<usize>,
}

/// A tabular view of the subtree below a root node.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use umbra::model::{GraphModel, ItemModel, ModelIndex, headers};
/// use umbra_core::{Family, ItemData, ItemRole, SharedGraph};
///
/// let graph = Arc::new(SharedGraph::default());
/// let root = graph.with_write(|g| {
///     let root = g.create_node("root", Family::Default);
///     let child = g.create_node("alpha", Family::Default);
///     g.add_child(root, child).unwrap();
///     root
/// });
///
/// let model = GraphModel::new(graph, root, headers([("Name", "name")]));
/// assert_eq!(model.row_count(&ModelIndex::invalid()), 1);
/// assert_eq!(
///     model.data_at(0, 0, &ModelIndex::invalid(), ItemRole::Display),
///     ItemData::from("alpha")
/// );
/// ```
pub struct GraphModel {
    graph: Arc<SharedGraph>,
    root: RwLock<NodeId>,
    headers: Headers,
    signals: ModelSignals,
}

impl GraphModel {
    /// Creates a model showing the children of `root`.
    pub fn new(graph: Arc<SharedGraph>, root: NodeId, headers: Headers) -> Self {
        Self {
            graph,
            root: RwLock::new(root),
            headers,
            signals: ModelSignals::new(),
        }
    }

    /// The graph the model presents.
    pub fn graph(&self) -> &Arc<SharedGraph> {
        &self.graph
    }

    /// The invisible root node.
    pub fn root(&self) -> NodeId {
        *self.root.read()
    }

    /// Replaces the root node, resetting the model.
    pub fn set_root(&self, root: NodeId) {
        self.signals.emit_reset(|| *self.root.write() = root);
    }

    /// The header mapping.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The attribute projected by `column`; `None` for column 0.
    pub fn column_attribute(&self, column: usize) -> Option<&str> {
        if column == 0 {
            return None;
        }
        self.headers.get_index(column).map(|(_, attribute)| attribute.as_str())
    }

    /// Whether `node` is displayed by this model.
    pub fn contains(&self, node: NodeId) -> bool {
        let root = self.root();
        node != root && self.graph.with_read(|g| g.is_ancestor_of(root, node))
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// The node behind `index`; the root for an invalid index.
    pub fn get_node(&self, index: &ModelIndex) -> NodeId {
        index.node().unwrap_or_else(|| self.root())
    }

    /// The node and attribute name behind `index`, for attribute columns.
    pub fn get_attribute(&self, index: &ModelIndex) -> Option<(NodeId, String)> {
        let node = index.node()?;
        let name = self.column_attribute(index.column())?;
        self.graph
            .with_read(|g| g.attribute(node, name).is_some())
            .then(|| (node, name.to_string()))
    }

    /// The column-0 index of `node`, invalid when the model doesn't show it.
    pub fn get_node_index(&self, node: NodeId) -> ModelIndex {
        self.graph.with_read(|g| self.node_index_in(g, node, 0))
    }

    /// The index of an attribute cell, invalid when no header projects it.
    pub fn get_attribute_index(&self, node: NodeId, attribute: &str) -> ModelIndex {
        let Some(column) = self
            .headers
            .values()
            .enumerate()
            .skip(1)
            .find_map(|(column, name)| (name == attribute).then_some(column))
        else {
            return ModelIndex::invalid();
        };
        self.graph.with_read(|g| {
            if g.attribute(node, attribute).is_none() {
                return ModelIndex::invalid();
            }
            self.node_index_in(g, node, column)
        })
    }

    fn node_index_in(&self, graph: &Graph, node: NodeId, column: usize) -> ModelIndex {
        let root = self.root();
        if node == root {
            return ModelIndex::invalid();
        }
        let Some(path) = graph.path_from(root, node) else {
            return ModelIndex::invalid();
        };
        let mut current = root;
        let mut index = ModelIndex::invalid();
        let last = path.len().saturating_sub(1);
        for (depth, row) in path.into_iter().enumerate() {
            let Some(child) = graph.child(current, row) else {
                return ModelIndex::invalid();
            };
            let column = if depth == last { column } else { 0 };
            index = ModelIndex::new(row, column, index, child);
            current = child;
        }
        index
    }

    /// Like [`ItemModel::index`], reporting why a position is invalid.
    pub fn try_index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelResult<ModelIndex> {
        let count = self.headers.len();
        if column >= count {
            return Err(ModelError::UnknownColumn { column, count });
        }
        let parent_node = self.get_node(parent);
        self.graph.with_read(|g| {
            let count = g.child_count(parent_node);
            let child = g.child(parent_node, row).ok_or(ModelError::UnknownRow { row, count })?;
            Ok(ModelIndex::new(row, column, self.normalized_parent(parent), child))
        })
    }

    fn normalized_parent(&self, parent: &ModelIndex) -> ModelIndex {
        match parent.node() {
            Some(node) if parent.column() != 0 => {
                ModelIndex::new(parent.row(), 0, parent.parent(), node)
            }
            _ => parent.clone(),
        }
    }

    /// The cell data at `(row, column)` under `parent`.
    pub fn data_at(&self, row: usize, column: usize, parent: &ModelIndex, role: ItemRole) -> ItemData {
        self.data(&self.index(row, column, parent), role)
    }

    /// Writes the cell at `(row, column)` under `parent`.
    pub fn set_data_at(
        &self,
        row: usize,
        column: usize,
        parent: &ModelIndex,
        value: impl Into<ItemData>,
        role: ItemRole,
    ) -> bool {
        self.set_data(&self.index(row, column, parent), value.into(), role)
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Sorts every parent's children by the value shown in `column`.
    pub fn sort(&self, column: usize, order: SortOrder) -> ModelResult<()> {
        let count = self.headers.len();
        if column >= count {
            return Err(ModelError::UnknownColumn { column, count });
        }
        let _span = PerfSpan::new(span_names::MODEL_SORT);
        let key = self.column_attribute(column).map(str::to_string);
        let root = self.root();
        tracing::debug!(target: targets::MODEL, column, ?order, "sorting model");
        self.signals.emit_reset(|| {
            self.graph
                .with_write(|g| g.sort_children(root, key.as_deref(), order.is_descending()))
        })?;
        Ok(())
    }

    /// Inserts `count` new default nodes at `row` under `parent`.
    pub fn insert_rows(&self, row: usize, count: usize, parent: &ModelIndex) -> ModelResult<Vec<NodeId>> {
        let nodes = self.graph.with_write(|g| {
            (0..count)
                .map(|_| g.create_node(String::new(), Family::Default))
                .collect::<Vec<_>>()
        });
        let parent_node = self.get_node(parent);
        match self.insert_nodes(parent_node, row, &nodes) {
            Ok(()) => Ok(nodes),
            Err(error) => {
                self.graph.with_write(|g| {
                    for &node in &nodes {
                        if let Err(cleanup) = g.delete_node(node) {
                            tracing::warn!(target: targets::MODEL, ?node, error = %cleanup, "cannot delete unplaced node");
                        }
                    }
                });
                Err(error)
            }
        }
    }

    /// Inserts detached `nodes` at `row` under `parent`, inside a row bracket.
    pub fn insert_nodes(&self, parent: NodeId, row: usize, nodes: &[NodeId]) -> ModelResult<()> {
        if nodes.is_empty() {
            return Ok(());
        }
        let count = self.graph.with_read(|g| {
            if !g.contains(parent) {
                return Err(ModelError::Node(umbra_core::NodeError::UnknownNode));
            }
            for &node in nodes {
                if g.parent(node).is_some() {
                    return Err(ModelError::Node(umbra_core::NodeError::AlreadyAttached));
                }
                if g.is_ancestor_of(node, parent) {
                    return Err(ModelError::Node(umbra_core::NodeError::Cycle));
                }
            }
            Ok(g.child_count(parent))
        })?;
        if row > count {
            return Err(ModelError::UnknownRow { row, count });
        }
        let parent_index = self.get_node_index(parent);
        let last = row + nodes.len() - 1;
        self.signals.emit_rows_inserted(parent_index, row, last, || {
            self.graph.with_write(|g| {
                nodes
                    .iter()
                    .enumerate()
                    .try_for_each(|(offset, &node)| g.insert_child(parent, node, row + offset))
            })
        })?;
        tracing::trace!(target: targets::MODEL, row, count = nodes.len(), "inserted rows");
        Ok(())
    }

    /// Detaches `count` rows starting at `row` under `parent`.
    ///
    /// Returns the detached nodes, which stay in the graph.
    pub fn remove_rows(&self, row: usize, count: usize, parent: &ModelIndex) -> ModelResult<Vec<NodeId>> {
        let parent_node = self.get_node(parent);
        self.remove_rows_of(parent_node, row, count)
    }

    pub(crate) fn remove_rows_of(&self, parent: NodeId, row: usize, count: usize) -> ModelResult<Vec<NodeId>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let children = self.graph.with_read(|g| g.child_count(parent));
        if row + count > children {
            return Err(ModelError::UnknownRow {
                row: row + count - 1,
                count: children,
            });
        }
        let parent_index = self.get_node_index(parent);
        let removed = self.signals.emit_rows_removed(parent_index, row, row + count - 1, || {
            self.graph.with_write(|g| {
                (0..count)
                    .map(|_| g.remove_child(parent, row))
                    .collect::<NodeResult<Vec<_>>>()
            })
        })?;
        tracing::trace!(target: targets::MODEL, row, count, "removed rows");
        Ok(removed)
    }

    /// Moves the child at `from` to `to` under `parent`.
    ///
    /// Returns `false` when either row is out of range.
    pub fn move_node(&self, parent: NodeId, from: usize, to: usize) -> ModelResult<bool> {
        let count = self.graph.with_read(|g| g.child_count(parent));
        if from >= count || to >= count {
            return Ok(false);
        }
        if from == to {
            return Ok(true);
        }
        let moved = self.remove_rows_of(parent, from, 1)?;
        self.insert_nodes(parent, to, &moved)?;
        Ok(true)
    }

    /// Deletes every row, resetting the model.
    pub fn clear(&self) -> ModelResult<()> {
        let root = self.root();
        self.signals.emit_reset(|| {
            self.graph.with_write(|g| {
                let children = g.children(root).to_vec();
                children.into_iter().try_for_each(|child| g.delete_node(child))
            })
        })?;
        Ok(())
    }

    /// Whether the root has any rows.
    pub fn has_nodes(&self) -> bool {
        let root = self.root();
        self.graph.with_read(|g| g.child_count(root) > 0)
    }

    /// Top-level rows whose name matches `pattern`.
    pub fn find_children(&self, pattern: &str, flags: MatchFlags) -> ModelResult<Vec<NodeId>> {
        let root = self.root();
        Ok(self.graph.with_read(|g| g.find_children(root, pattern, flags))?)
    }

    /// Rows of any depth whose family matches `pattern`, in pre-order.
    pub fn find_family(&self, pattern: &str, flags: MatchFlags) -> ModelResult<Vec<NodeId>> {
        self.find_family_from(self.root(), pattern, flags)
    }

    /// Descendants of `start` whose family matches `pattern`, in pre-order.
    pub fn find_family_from(&self, start: NodeId, pattern: &str, flags: MatchFlags) -> ModelResult<Vec<NodeId>> {
        Ok(self.graph.with_read(|g| g.find_family(start, pattern, flags))?)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Reports a change of `node`'s row, across all columns.
    pub fn node_changed(&self, node: NodeId) -> bool {
        let first = self.get_node_index(node);
        if !first.is_valid() {
            return false;
        }
        let last_column = self.headers.len().saturating_sub(1);
        let last = ModelIndex::new(first.row(), last_column, first.parent(), node);
        self.signals.data_changed.emit((first, last, Vec::new()));
        true
    }

    /// Reports a change of one attribute cell.
    pub fn attribute_changed(&self, node: NodeId, attribute: &str) -> bool {
        let index = self.get_attribute_index(node, attribute);
        if !index.is_valid() {
            return false;
        }
        self.signals.emit_data_changed_single(index, Vec::new());
        true
    }

    /// Switches the observable triggers of every row and attribute.
    pub fn enable_model_triggers(&self, state: bool) -> ModelResult<()> {
        let root = self.root();
        Ok(self.graph.with_write(|g| g.enable_triggers(root, state))?)
    }

    // =========================================================================
    // Mime
    // =========================================================================

    /// Mime formats produced by [`mime_encode`](Self::mime_encode).
    pub fn mime_types(&self) -> Vec<&'static str> {
        vec![GRAPH_MODEL_MIME_TYPE]
    }

    /// Serializes the rows of `indexes`, once per node, in the given order.
    pub fn mime_encode(&self, indexes: &[ModelIndex]) -> ModelResult<MimeData> {
        let root = self.root();
        let items = self.graph.with_read(|g| {
            let mut seen = Vec::new();
            let mut items = Vec::new();
            for node in indexes.iter().filter_map(ModelIndex::node) {
                if seen.contains(&node) {
                    continue;
                }
                seen.push(node);
                let (Some(family), Some(path)) = (g.family(node), g.path_from(root, node)) else {
                    continue;
                };
                items.push(MimeItem {
                    family: family.as_str().to_string(),
                    path,
                });
            }
            items
        });
        let payload = MimePayload {
            graph: self.graph.id().as_raw(),
            items,
        };
        let data = serde_json::to_vec(&payload).map_err(|e| ModelError::invalid_mime(e.to_string()))?;
        Ok(MimeData {
            format: GRAPH_MODEL_MIME_TYPE.to_string(),
            data,
        })
    }

    /// Resolves rows serialized by [`mime_encode`](Self::mime_encode).
    pub fn mime_decode(&self, mime: &MimeData) -> ModelResult<Vec<NodeId>> {
        if mime.format != GRAPH_MODEL_MIME_TYPE {
            return Err(ModelError::invalid_mime(format!("unsupported format '{}'", mime.format)));
        }
        let payload: MimePayload =
            serde_json::from_slice(&mime.data).map_err(|e| ModelError::invalid_mime(e.to_string()))?;
        if payload.graph != self.graph.id().as_raw() {
            return Err(ModelError::ForeignGraph);
        }
        let root = self.root();
        self.graph.with_read(|g| {
            payload
                .items
                .iter()
                .map(|item| {
                    let node = g
                        .resolve_path(root, &item.path)
                        .filter(|&node| node != root)
                        .ok_or_else(|| ModelError::invalid_mime(format!("no row at {:?}", item.path)))?;
                    match g.family(node) {
                        Some(family) if family.as_str() == item.family => Ok(node),
                        _ => Err(ModelError::invalid_mime(format!(
                            "row at {:?} is not a '{}' node",
                            item.path, item.family
                        ))),
                    }
                })
                .collect()
        })
    }
}

impl ItemModel for GraphModel {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        let node = self.get_node(parent);
        self.graph.with_read(|g| g.child_count(node))
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        self.headers.len()
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        let Some(node) = index.node() else {
            return ItemData::None;
        };
        self.graph.with_read(|g| {
            let data = match self.column_attribute(index.column()) {
                None if index.column() == 0 => g.node(node).and_then(|n| n.role(role)),
                None => None,
                Some(name) => g.attribute(node, name).and_then(|a| a.role(role)),
            };
            data.cloned().unwrap_or_default()
        })
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        self.try_index(row, column, parent).unwrap_or_default()
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        let Some(node) = index.node() else {
            return ModelIndex::invalid();
        };
        self.graph.with_read(|g| match g.parent(node) {
            Some(parent) => self.node_index_in(g, parent, 0),
            None => ModelIndex::invalid(),
        })
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn set_data(&self, index: &ModelIndex, value: ItemData, role: ItemRole) -> bool {
        let Some(node) = index.node() else {
            return false;
        };
        let attribute = self.column_attribute(index.column());
        if attribute.is_none() && index.column() != 0 {
            return false;
        }
        let result = self.graph.with_write(|g| match attribute {
            None => g.edit_node(node, role, &value),
            Some(name) => g.edit_attribute(node, name, role, &value),
        });
        match result {
            Ok(_) => {
                self.signals.emit_data_changed_single(index.clone(), vec![role]);
                true
            }
            Err(error) => {
                tracing::debug!(target: targets::MODEL, %error, "rejected edit");
                false
            }
        }
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        let Some(node) = index.node() else {
            return ItemFlags::default();
        };
        self.graph.with_read(|g| match self.column_attribute(index.column()) {
            None if index.column() == 0 => g.node(node).map(|n| n.flags()).unwrap_or_default(),
            None => ItemFlags::default(),
            Some(name) => g.attribute(node, name).map(|a| a.flags()).unwrap_or_default(),
        })
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        if orientation != Orientation::Horizontal || role != ItemRole::Display {
            return ItemData::None;
        }
        self.headers
            .get_index(section)
            .map(|(label, _)| ItemData::from(label.as_str()))
            .unwrap_or_default()
    }
}

static_assertions::assert_impl_all!(GraphModel: Send, Sync);

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use umbra_core::Attribute;

    use super::*;

    struct Fixture {
        graph: Arc<SharedGraph>,
        root: NodeId,
        alpha: NodeId,
        beta: NodeId,
        gamma: NodeId,
        model: GraphModel,
    }

    fn fixture() -> Fixture {
        let graph = Arc::new(SharedGraph::default());
        let (root, alpha, beta, gamma) = graph.with_write(|g| {
            let root = g.create_node("root", Family::Default);
            let alpha = g.create_node("alpha", Family::Default);
            let beta = g.create_node("beta", Family::File);
            let gamma = g.create_node("gamma", Family::Default);
            g.set_attribute(alpha, Attribute::new("traced", true)).unwrap();
            g.set_attribute(beta, Attribute::new("traced", false)).unwrap();
            g.set_attribute(
                gamma,
                Attribute::new("traced", false).with_flags(ItemFlags::new()),
            )
            .unwrap();
            g.add_child(root, alpha).unwrap();
            g.add_child(root, beta).unwrap();
            g.add_child(alpha, gamma).unwrap();
            (root, alpha, beta, gamma)
        });
        let model = GraphModel::new(graph.clone(), root, headers([("Name", "name"), ("Traced", "traced")]));
        Fixture {
            graph,
            root,
            alpha,
            beta,
            gamma,
            model,
        }
    }

    #[test]
    fn test_shape() {
        let f = fixture();
        let top = ModelIndex::invalid();
        assert_eq!(f.model.row_count(&top), 2);
        assert_eq!(f.model.column_count(&top), 2);
        let alpha = f.model.index(0, 0, &top);
        assert_eq!(f.model.row_count(&alpha), 1);
        assert!(f.model.has_children(&alpha));
        assert!(!f.model.index(2, 0, &top).is_valid());
        assert!(!f.model.index(0, 2, &top).is_valid());
    }

    #[test]
    fn test_try_index_errors() {
        let f = fixture();
        let top = ModelIndex::invalid();
        assert!(matches!(
            f.model.try_index(5, 0, &top),
            Err(ModelError::UnknownRow { row: 5, count: 2 })
        ));
        assert!(matches!(
            f.model.try_index(0, 3, &top),
            Err(ModelError::UnknownColumn { column: 3, count: 2 })
        ));
    }

    #[test]
    fn test_data() {
        let f = fixture();
        let top = ModelIndex::invalid();
        assert_eq!(f.model.data_at(0, 0, &top, ItemRole::Display), ItemData::from("alpha"));
        assert_eq!(f.model.data_at(0, 1, &top, ItemRole::Display), ItemData::from("True"));
        assert_eq!(f.model.data_at(0, 1, &top, ItemRole::Edit), ItemData::Bool(true));
        assert_eq!(f.model.data_at(0, 1, &top, ItemRole::ToolTip), ItemData::None);
        assert_eq!(
            f.model.header_data(1, Orientation::Horizontal, ItemRole::Display),
            ItemData::from("Traced")
        );
    }

    #[test]
    fn test_parent_navigation() {
        let f = fixture();
        let alpha = f.model.index(0, 0, &ModelIndex::invalid());
        let gamma = f.model.index(0, 1, &alpha);
        assert_eq!(gamma.node(), Some(f.gamma));
        assert_eq!(f.model.parent(&gamma), alpha);
        assert!(!f.model.parent(&alpha).is_valid());
        assert_eq!(f.model.get_node_index(f.gamma).parent(), alpha);
        assert_eq!(f.model.get_node(&ModelIndex::invalid()), f.root);
    }

    #[test]
    fn test_set_data_emits_once() {
        let f = fixture();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        f.model
            .signals()
            .data_changed
            .connect(move |(top_left, _, _)| sink.lock().push(top_left.clone()));

        let top = ModelIndex::invalid();
        assert!(f.model.set_data_at(1, 1, &top, "True", ItemRole::Edit));
        assert_eq!(f.model.data_at(1, 1, &top, ItemRole::Display), ItemData::from("True"));
        assert_eq!(events.lock().len(), 1);
        assert_eq!(events.lock()[0].node(), Some(f.beta));
    }

    #[test]
    fn test_set_data_rejected() {
        let f = fixture();
        let alpha = f.model.index(0, 0, &ModelIndex::invalid());
        assert!(!f.model.set_data_at(0, 1, &alpha, "True", ItemRole::Edit));
        assert!(!f.model.set_data_at(0, 1, &ModelIndex::invalid(), "maybe", ItemRole::Edit));
        assert_eq!(
            f.graph.with_read(|g| g.attribute_value(f.gamma, "traced").cloned()),
            Some(ItemData::Bool(false))
        );
    }

    #[test]
    fn test_rename_through_column_zero() {
        let f = fixture();
        assert!(f.model.set_data_at(1, 0, &ModelIndex::invalid(), "delta", ItemRole::Edit));
        assert_eq!(f.graph.with_read(|g| g.name(f.beta).map(str::to_string)), Some("delta".into()));
    }

    #[test]
    fn test_sort() {
        let f = fixture();
        let resets = Arc::new(Mutex::new(0));
        let sink = resets.clone();
        f.model.signals().model_reset.connect(move |_| *sink.lock() += 1);

        f.model.sort(0, SortOrder::Descending).unwrap();
        let top = ModelIndex::invalid();
        assert_eq!(f.model.data_at(0, 0, &top, ItemRole::Display), ItemData::from("beta"));

        f.model.sort(1, SortOrder::Descending).unwrap();
        assert_eq!(f.model.data_at(0, 0, &top, ItemRole::Display), ItemData::from("alpha"));
        assert_eq!(*resets.lock(), 2);
        assert!(f.model.sort(4, SortOrder::Ascending).is_err());
    }

    #[test]
    fn test_insert_and_remove_rows() {
        let f = fixture();
        let events = Arc::new(Mutex::new(Vec::new()));
        let about = events.clone();
        f.model
            .signals()
            .rows_about_to_be_inserted
            .connect(move |(_, first, last)| about.lock().push(("insert", *first, *last)));
        let removed = events.clone();
        f.model
            .signals()
            .rows_removed
            .connect(move |(_, first, last)| removed.lock().push(("removed", *first, *last)));

        let top = ModelIndex::invalid();
        let inserted = f.model.insert_rows(1, 2, &top).unwrap();
        assert_eq!(inserted.len(), 2);
        assert_eq!(f.model.row_count(&top), 4);
        assert_eq!(f.model.index(1, 0, &top).node(), Some(inserted[0]));

        let detached = f.model.remove_rows(1, 2, &top).unwrap();
        assert_eq!(detached, inserted);
        assert_eq!(f.model.row_count(&top), 2);
        assert!(matches!(f.model.remove_rows(1, 5, &top), Err(ModelError::UnknownRow { .. })));
        assert!(matches!(f.model.insert_rows(9, 1, &top), Err(ModelError::UnknownRow { .. })));

        assert_eq!(*events.lock(), vec![("insert", 1, 2), ("removed", 1, 2)]);
    }

    #[test]
    fn test_move_node() {
        let f = fixture();
        assert!(f.model.move_node(f.root, 0, 1).unwrap());
        assert_eq!(f.graph.with_read(|g| g.children(f.root).to_vec()), vec![f.beta, f.alpha]);
        assert!(!f.model.move_node(f.root, 0, 2).unwrap());
    }

    #[test]
    fn test_attribute_lookups() {
        let f = fixture();
        let index = f.model.get_attribute_index(f.gamma, "traced");
        assert_eq!(index.column(), 1);
        assert_eq!(f.model.get_attribute(&index), Some((f.gamma, "traced".to_string())));
        assert!(!f.model.get_attribute_index(f.gamma, "missing").is_valid());
        assert!(!f.model.get_node_index(f.root).is_valid());
    }

    #[test]
    fn test_change_notifications() {
        let f = fixture();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        f.model
            .signals()
            .data_changed
            .connect(move |(a, b, _)| sink.lock().push((a.column(), b.column())));

        assert!(f.model.node_changed(f.alpha));
        assert!(f.model.attribute_changed(f.beta, "traced"));
        assert!(!f.model.node_changed(f.root));
        assert_eq!(*events.lock(), vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn test_find() {
        let f = fixture();
        assert_eq!(f.model.find_children("^b", MatchFlags::default()).unwrap(), vec![f.beta]);
        assert_eq!(f.model.find_family("File", MatchFlags::default()).unwrap(), vec![f.beta]);
        assert!(f.model.find_children("(", MatchFlags::default()).is_err());
    }

    #[test]
    fn test_clear() {
        let f = fixture();
        assert!(f.model.has_nodes());
        f.model.clear().unwrap();
        assert!(!f.model.has_nodes());
        assert!(!f.graph.with_read(|g| g.contains(f.gamma)));
    }

    #[test]
    fn test_mime_round_trip() {
        let f = fixture();
        let alpha = f.model.index(0, 0, &ModelIndex::invalid());
        let gamma = f.model.index(0, 0, &alpha);
        let gamma_traced = f.model.index(0, 1, &alpha);

        let mime = f.model.mime_encode(&[gamma.clone(), alpha, gamma_traced]).unwrap();
        assert_eq!(mime.format, GRAPH_MODEL_MIME_TYPE);
        assert_eq!(f.model.mime_decode(&mime).unwrap(), vec![f.gamma, f.alpha]);
    }

    #[test]
    fn test_mime_rejects_foreign_graph() {
        let f = fixture();
        let other = fixture();
        let mime = other.model.mime_encode(&[other.model.get_node_index(other.beta)]).unwrap();
        assert!(matches!(f.model.mime_decode(&mime), Err(ModelError::ForeignGraph)));

        let garbage = MimeData {
            format: GRAPH_MODEL_MIME_TYPE.to_string(),
            data: b"not json".to_vec(),
        };
        assert!(matches!(f.model.mime_decode(&garbage), Err(ModelError::InvalidMimeData(_))));
    }

    #[test]
    fn test_enable_model_triggers() {
        let f = fixture();
        let changes = Arc::new(Mutex::new(0));
        let sink = changes.clone();
        f.graph.changed().connect(move |_| *sink.lock() += 1);

        f.model.enable_model_triggers(true).unwrap();
        f.graph
            .with_write(|g| g.set_attribute_value(f.gamma, "traced", true))
            .unwrap();
        assert_eq!(*changes.lock(), 1);
    }
}
