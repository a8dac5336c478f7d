//! Node & attribute graph.
//!
//! Provides the composite tree every Umbra model is built on:
//! - Arena storage with stable [`NodeId`] handles
//! - Ordered children with a single parent back-pointer per node
//! - Ordered, named [`Attribute`]s carrying values, role maps and flags
//! - Change notifications for observable nodes and attributes
//!
//! # Key Types
//!
//! - [`Graph`] - The arena and all structural and attribute operations
//! - [`SharedGraph`] - Thread-safe wrapper that publishes [`GraphChange`]s
//! - [`NodesWalker`] - Lazy pre-order traversal
//!
//! # Example
//!
//! ```
//! use umbra_core::graph::{Attribute, Family, Graph};
//!
//! let mut graph = Graph::new();
//! let root = graph.create_node("root", Family::GraphModel);
//! let alpha = graph.create_node("alpha", Family::Default);
//! graph.add_child(root, alpha).unwrap();
//! graph.set_attribute(alpha, Attribute::new("traced", true)).unwrap();
//!
//! assert_eq!(graph.child_count(root), 1);
//! assert_eq!(graph.row(alpha), Some(0));
//! ```

mod attribute;
mod node;
mod shared;
mod walker;

use std::cmp::Ordering;

use regex::RegexBuilder;
use slotmap::SlotMap;

use crate::error::{NodeError, NodeResult};
use crate::logging::targets;
use crate::role::{ItemData, compare_item_data};

pub use attribute::RESERVED_ATTRIBUTE_NAMES;
pub use node::{Attribute, Family, GraphId, Node, NodeId, ObservableMeta};
pub use shared::SharedGraph;
pub use walker::NodesWalker;

/// A notification produced by an observable node or attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphChange {
    /// The node's name, roles or flags changed.
    NodeChanged {
        /// The mutated node.
        node: NodeId,
    },
    /// An attribute value, roles or flags changed.
    AttributeChanged {
        /// The owning node.
        node: NodeId,
        /// The attribute name.
        attribute: String,
    },
}

impl GraphChange {
    /// The node the change refers to.
    pub fn node(&self) -> NodeId {
        match self {
            GraphChange::NodeChanged { node } | GraphChange::AttributeChanged { node, .. } => *node,
        }
    }
}

/// Options for name and family searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchFlags {
    /// Match regardless of case.
    pub ignore_case: bool,
}

impl MatchFlags {
    /// Case-insensitive matching.
    pub fn ignore_case() -> Self {
        Self { ignore_case: true }
    }
}

/// Arena of nodes forming one or more trees.
///
/// Children are owned by their parent through the child list; the parent
/// link is a plain id. Deleting a node removes its whole subtree.
pub struct Graph {
    id: GraphId,
    nodes: SlotMap<NodeId, Node>,
    pending: Vec<GraphChange>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            id: GraphId::next(),
            nodes: SlotMap::with_key(),
            pending: Vec::new(),
        }
    }

    /// The process-unique identity of this graph.
    pub fn id(&self) -> GraphId {
        self.id
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached node.
    pub fn create_node(&mut self, name: impl Into<String>, family: Family) -> NodeId {
        let name = name.into();
        tracing::trace!(target: targets::GRAPH, %name, %family, "creating node");
        self.nodes.insert(Node::new(name, family))
    }

    /// Check if a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Access a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// The node's name.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(|node| node.name.as_str())
    }

    /// The node's family.
    pub fn family(&self, id: NodeId) -> Option<Family> {
        self.nodes.get(id).map(|node| node.family)
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Append a detached node to `parent`'s children.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> NodeResult<()> {
        let len = self.child_count(parent);
        self.insert_child(parent, child, len)
    }

    /// Insert a detached node at `index` in `parent`'s children.
    ///
    /// `index` may equal the child count, which appends.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> NodeResult<()> {
        let len = self.nodes.get(parent).ok_or(NodeError::UnknownNode)?.children.len();
        let child_data = self.nodes.get(child).ok_or(NodeError::UnknownNode)?;
        if child_data.parent.is_some() {
            return Err(NodeError::AlreadyAttached);
        }
        if index > len {
            return Err(NodeError::OutOfRange { index, len });
        }
        if self.is_ancestor_of(child, parent) {
            return Err(NodeError::Cycle);
        }

        if let Some(data) = self.nodes.get_mut(child) {
            data.parent = Some(parent);
        }
        if let Some(data) = self.nodes.get_mut(parent) {
            data.children.insert(index, child);
        }
        tracing::trace!(target: targets::GRAPH, ?parent, ?child, index, "inserted child");
        Ok(())
    }

    /// Detach and return the child at `index`.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> NodeResult<NodeId> {
        let data = self.nodes.get_mut(parent).ok_or(NodeError::UnknownNode)?;
        let len = data.children.len();
        if index >= len {
            return Err(NodeError::OutOfRange { index, len });
        }
        let child = data.children.remove(index);
        if let Some(child_data) = self.nodes.get_mut(child) {
            child_data.parent = None;
        }
        tracing::trace!(target: targets::GRAPH, ?parent, ?child, index, "removed child");
        Ok(child)
    }

    /// Detach a node from its parent, if it has one.
    pub fn detach(&mut self, id: NodeId) -> NodeResult<()> {
        let parent = self.nodes.get(id).ok_or(NodeError::UnknownNode)?.parent;
        if let Some(parent) = parent {
            if let Some(index) = self.row(id) {
                self.remove_child(parent, index)?;
            }
        }
        Ok(())
    }

    /// Detach a node and delete it together with all its descendants.
    #[tracing::instrument(skip(self), target = "umbra_core::graph", level = "trace")]
    pub fn delete_node(&mut self, id: NodeId) -> NodeResult<()> {
        self.detach(id)?;
        let doomed: Vec<NodeId> = self.list_node(id, None).map(|(node, _)| node).collect();
        tracing::trace!(target: targets::GRAPH, count = doomed.len(), "deleting subtree");
        for node in doomed {
            self.nodes.remove(node);
        }
        self.pending.retain(|change| self.nodes.contains_key(change.node()));
        Ok(())
    }

    /// Number of children, 0 for unknown nodes.
    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes.get(id).map_or(0, |node| node.children.len())
    }

    /// The child at `index`.
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes.get(id)?.children.get(index).copied()
    }

    /// Children in row order, empty for unknown nodes.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// The parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// Position of the node in its parent's children; `None` for roots.
    pub fn row(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// All ancestors from the immediate parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            result.push(node);
            current = self.parent(node);
        }
        result
    }

    /// Check if `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Row path from `root` down to `id`, or `None` if `id` is not below `root`.
    pub fn path_from(&self, root: NodeId, id: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = id;
        while current != root {
            path.push(self.row(current)?);
            current = self.parent(current)?;
        }
        path.reverse();
        Some(path)
    }

    /// Resolve a row path produced by [`Graph::path_from`].
    pub fn resolve_path(&self, root: NodeId, path: &[usize]) -> Option<NodeId> {
        path.iter()
            .try_fold(root, |node, &row| self.child(node, row))
    }

    /// Lazy pre-order traversal of `id` and its descendants.
    ///
    /// `max_depth` limits how many levels below `id` are visited.
    pub fn list_node(&self, id: NodeId, max_depth: Option<usize>) -> NodesWalker<'_> {
        NodesWalker::new(self, id, max_depth)
    }

    /// Sort the children of `id`, recursively, by an attribute value.
    ///
    /// Without a key the node names are compared. Children lacking the key
    /// attribute keep their relative order after the sorted ones. The sort
    /// is stable in both directions.
    #[tracing::instrument(skip(self), target = "umbra_core::graph", level = "trace")]
    pub fn sort_children(&mut self, id: NodeId, key: Option<&str>, reverse: bool) -> NodeResult<()> {
        let children = self
            .nodes
            .get(id)
            .ok_or(NodeError::UnknownNode)?
            .children
            .clone();

        let (mut keyed, missing): (Vec<_>, Vec<_>) = children
            .iter()
            .map(|&child| (child, self.sort_key(child, key)))
            .partition(|(_, value)| value.is_some());

        keyed.sort_by(|(_, a), (_, b)| {
            let ordering = match (a, b) {
                (Some(a), Some(b)) => compare_item_data(a, b),
                _ => Ordering::Equal,
            };
            if reverse { ordering.reverse() } else { ordering }
        });

        let sorted: Vec<NodeId> = keyed
            .into_iter()
            .chain(missing)
            .map(|(child, _)| child)
            .collect();
        if let Some(node) = self.nodes.get_mut(id) {
            node.children = sorted;
        }

        for child in children {
            self.sort_children(child, key, reverse)?;
        }
        Ok(())
    }

    fn sort_key(&self, id: NodeId, key: Option<&str>) -> Option<ItemData> {
        let node = self.nodes.get(id)?;
        match key {
            None => Some(ItemData::String(node.name.clone())),
            Some(name) => node.attributes.get(name).map(|attribute| attribute.value().clone()),
        }
    }

    /// Direct children of `id` whose name matches `pattern` (regex search).
    pub fn find_children(&self, id: NodeId, pattern: &str, flags: MatchFlags) -> NodeResult<Vec<NodeId>> {
        let node = self.nodes.get(id).ok_or(NodeError::UnknownNode)?;
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(flags.ignore_case)
            .build()?;
        Ok(node
            .children
            .iter()
            .copied()
            .filter(|&child| self.name(child).is_some_and(|name| regex.is_match(name)))
            .collect())
    }

    /// Descendants of `start` whose family matches `pattern`, in pre-order.
    pub fn find_family(&self, start: NodeId, pattern: &str, flags: MatchFlags) -> NodeResult<Vec<NodeId>> {
        if !self.contains(start) {
            return Err(NodeError::UnknownNode);
        }
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(flags.ignore_case)
            .build()?;
        Ok(self
            .list_node(start, None)
            .skip(1)
            .map(|(node, _)| node)
            .filter(|&node| self.family(node).is_some_and(|family| regex.is_match(family.as_str())))
            .collect())
    }

    pub(crate) fn push_change(&mut self, change: GraphChange) {
        tracing::trace!(target: targets::GRAPH, ?change, "queued change");
        self.pending.push(change);
    }

    /// Drain the notifications queued by observable mutations.
    pub fn take_pending_changes(&mut self) -> Vec<GraphChange> {
        std::mem::take(&mut self.pending)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> (Graph, NodeId, Vec<NodeId>) {
        let mut graph = Graph::new();
        let root = graph.create_node("root", Family::GraphModel);
        let mut children = Vec::new();
        for name in ["gamma", "alpha", "beta"] {
            let child = graph.create_node(name, Family::Default);
            graph.add_child(root, child).unwrap();
            children.push(child);
        }
        (graph, root, children)
    }

    #[test]
    fn test_parent_child_consistency() {
        let (graph, root, children) = build();
        for &child in &children {
            assert_eq!(graph.parent(child), Some(root));
            let row = graph.row(child).unwrap();
            assert_eq!(graph.child(root, row), Some(child));
        }
        assert_eq!(graph.row(root), None);
    }

    #[test]
    fn test_insert_out_of_range() {
        let (mut graph, root, _) = build();
        let extra = graph.create_node("extra", Family::Default);
        assert_eq!(
            graph.insert_child(root, extra, 5),
            Err(NodeError::OutOfRange { index: 5, len: 3 })
        );
        graph.insert_child(root, extra, 3).unwrap();
        assert_eq!(graph.child(root, 3), Some(extra));
    }

    #[test]
    fn test_remove_then_insert_restores_tree() {
        let (mut graph, root, children) = build();
        let removed = graph.remove_child(root, 1).unwrap();
        assert_eq!(removed, children[1]);
        assert_eq!(graph.parent(removed), None);
        graph.insert_child(root, removed, 1).unwrap();
        assert_eq!(graph.children(root), children.as_slice());

        assert_eq!(
            graph.remove_child(root, 3),
            Err(NodeError::OutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_attach_rules() {
        let (mut graph, root, children) = build();
        assert_eq!(graph.add_child(children[0], root), Err(NodeError::Cycle));
        assert_eq!(graph.add_child(children[0], children[1]), Err(NodeError::AlreadyAttached));

        let node = graph.create_node("self", Family::Default);
        assert_eq!(graph.add_child(node, node), Err(NodeError::Cycle));
    }

    #[test]
    fn test_find_children_matches_all() {
        let (graph, root, children) = build();
        let found = graph.find_children(root, ".*", MatchFlags::default()).unwrap();
        assert_eq!(found, children);

        let found = graph.find_children(root, "^A", MatchFlags::ignore_case()).unwrap();
        assert_eq!(found, vec![children[1]]);

        assert!(matches!(
            graph.find_children(root, "(", MatchFlags::default()),
            Err(NodeError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_find_family_in_preorder() {
        let (mut graph, root, children) = build();
        let file = graph.create_node("main.py", Family::File);
        let editor = graph.create_node("editor", Family::Editor);
        graph.add_child(children[0], file).unwrap();
        graph.add_child(file, editor).unwrap();
        let other = graph.create_node("other.py", Family::File);
        graph.add_child(children[2], other).unwrap();

        let found = graph.find_family(root, "File", MatchFlags::default()).unwrap();
        assert_eq!(found, vec![file, other]);
        let found = graph.find_family(root, "editor", MatchFlags::ignore_case()).unwrap();
        assert_eq!(found, vec![editor]);
    }

    #[test]
    fn test_sort_by_name_and_reverse() {
        let (mut graph, root, children) = build();
        graph.sort_children(root, None, false).unwrap();
        assert_eq!(graph.children(root), &[children[1], children[2], children[0]]);
        graph.sort_children(root, None, true).unwrap();
        assert_eq!(graph.children(root), &[children[0], children[2], children[1]]);
    }

    #[test]
    fn test_sort_is_stable_and_appends_missing_keys() {
        let (mut graph, root, children) = build();
        graph.set_attribute(children[0], Attribute::new("rank", 1)).unwrap();
        graph.set_attribute(children[1], Attribute::new("rank", 1)).unwrap();
        let late = graph.create_node("late", Family::Default);
        graph.add_child(root, late).unwrap();
        graph.set_attribute(late, Attribute::new("rank", 0)).unwrap();

        graph.sort_children(root, Some("rank"), false).unwrap();
        assert_eq!(graph.children(root), &[late, children[0], children[1], children[2]]);

        graph.sort_children(root, Some("rank"), true).unwrap();
        assert_eq!(graph.children(root), &[children[0], children[1], late, children[2]]);
    }

    #[test]
    fn test_sort_recurses() {
        let (mut graph, _, children) = build();
        let b = graph.create_node("b", Family::Default);
        let a = graph.create_node("a", Family::Default);
        graph.add_child(children[0], b).unwrap();
        graph.add_child(children[0], a).unwrap();
        let root = graph.parent(children[0]).unwrap();
        graph.sort_children(root, None, false).unwrap();
        assert_eq!(graph.children(children[0]), &[a, b]);
    }

    #[test]
    fn test_delete_node_removes_subtree() {
        let (mut graph, root, children) = build();
        let grandchild = graph.create_node("leaf", Family::Default);
        graph.add_child(children[0], grandchild).unwrap();

        graph.delete_node(children[0]).unwrap();
        assert!(!graph.contains(children[0]));
        assert!(!graph.contains(grandchild));
        assert_eq!(graph.child_count(root), 2);
        assert_eq!(graph.delete_node(children[0]), Err(NodeError::UnknownNode));
    }

    #[test]
    fn test_paths_resolve() {
        let (mut graph, root, children) = build();
        let leaf = graph.create_node("leaf", Family::Default);
        graph.add_child(children[2], leaf).unwrap();

        let path = graph.path_from(root, leaf).unwrap();
        assert_eq!(path, vec![2, 0]);
        assert_eq!(graph.resolve_path(root, &path), Some(leaf));
        assert_eq!(graph.path_from(children[0], leaf), None);
        assert_eq!(graph.ancestors(leaf), vec![children[2], root]);
    }
}
