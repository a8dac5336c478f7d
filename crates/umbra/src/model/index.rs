//! Model index for addressing cells of graph models.
//!
//! A `ModelIndex` locates a cell by row and column within a parent index.
//! Its internal id carries the key of the node displayed on the row, so a
//! model resolves an index back to its node without walking the tree.

use std::hash::{Hash, Hasher};

use umbra_core::NodeId;

/// Represents a cell position within an `ItemModel`.
///
/// An invalid index stands for the model root when used as a parent, and
/// for "no such cell" when returned by a lookup.
///
/// # Index Validity
///
/// Indices are cheap snapshots. Row numbers go stale after structural
/// changes (insertions, removals, sorting) while the node key does not;
/// models resolve an index through its node key.
///
/// # Example
///
/// ```ignore
/// let index = model.index(0, 0, &ModelIndex::invalid());
/// let child = model.index(0, 1, &index);
/// assert_eq!(model.parent(&child), index);
/// ```
#[derive(Clone)]
pub struct ModelIndex {
    row: usize,
    column: usize,
    parent: Option<Box<ModelIndex>>,
    internal_id: u64,
    valid: bool,
}

impl Default for ModelIndex {
    fn default() -> Self {
        Self::invalid()
    }
}

impl ModelIndex {
    /// Creates an invalid (root) model index.
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            parent: None,
            internal_id: 0,
            valid: false,
        }
    }

    /// Creates a valid index for the cell of `node` at `(row, column)`.
    ///
    /// Called by model implementations rather than by views.
    #[inline]
    pub fn new(row: usize, column: usize, parent: ModelIndex, node: NodeId) -> Self {
        Self::with_internal_id(row, column, parent, node.as_raw())
    }

    /// Creates a valid index with a raw internal id.
    #[inline]
    pub fn with_internal_id(row: usize, column: usize, parent: ModelIndex, internal_id: u64) -> Self {
        Self {
            row,
            column,
            parent: parent.is_valid().then(|| Box::new(parent)),
            internal_id,
            valid: true,
        }
    }

    /// Returns `true` if this is a valid index.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the row of this index within its parent.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the column of this index.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns the parent index, or an invalid index for top-level rows.
    #[inline]
    pub fn parent(&self) -> ModelIndex {
        match &self.parent {
            Some(parent) => (**parent).clone(),
            None => ModelIndex::invalid(),
        }
    }

    #[inline]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    #[inline]
    pub fn internal_id(&self) -> u64 {
        self.internal_id
    }

    /// The node displayed on this index's row.
    #[inline]
    pub fn node(&self) -> Option<NodeId> {
        self.valid.then(|| NodeId::from_raw(self.internal_id))
    }

    /// Returns the depth of this index; top-level rows have depth 0.
    pub fn depth(&self) -> usize {
        self.ancestors().len()
    }

    /// Returns the ancestors of this index, nearest first.
    pub fn ancestors(&self) -> Vec<ModelIndex> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while current.is_valid() {
            let next = current.parent();
            ancestors.push(current);
            current = next;
        }
        ancestors
    }

    /// Checks if this index is a descendant of `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &ModelIndex) -> bool {
        self.is_valid() && ancestor.is_valid() && self.ancestors().contains(ancestor)
    }
}

impl std::fmt::Debug for ModelIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            f.debug_struct("ModelIndex")
                .field("row", &self.row)
                .field("column", &self.column)
                .field("depth", &self.depth())
                .field("internal_id", &self.internal_id)
                .finish()
        } else {
            write!(f, "ModelIndex(invalid)")
        }
    }
}

impl PartialEq for ModelIndex {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => true,
            (true, true) => {
                self.row == other.row
                    && self.column == other.column
                    && self.internal_id == other.internal_id
                    && self.parent == other.parent
            }
            _ => false,
        }
    }
}

impl Eq for ModelIndex {}

impl Hash for ModelIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.valid.hash(state);
        if self.valid {
            self.row.hash(state);
            self.column.hash(state);
            // The node key identifies the parent chain.
            self.internal_id.hash(state);
        }
    }
}

impl PartialOrd for ModelIndex {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModelIndex {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => std::cmp::Ordering::Equal,
            (false, true) => std::cmp::Ordering::Less,
            (true, false) => std::cmp::Ordering::Greater,
            (true, true) => self
                .depth()
                .cmp(&other.depth())
                .then(self.row.cmp(&other.row))
                .then(self.column.cmp(&other.column)),
        }
    }
}

#[cfg(test)]
mod tests {
    use umbra_core::{Family, Graph};

    use super::*;

    fn nodes() -> (NodeId, NodeId, NodeId) {
        let mut graph = Graph::new();
        (
            graph.create_node("a", Family::Default),
            graph.create_node("b", Family::Default),
            graph.create_node("c", Family::Default),
        )
    }

    #[test]
    fn test_invalid_index() {
        let index = ModelIndex::invalid();
        assert!(!index.is_valid());
        assert_eq!(index.row(), 0);
        assert!(!index.has_parent());
        assert_eq!(index.node(), None);
    }

    #[test]
    fn test_node_round_trip() {
        let (a, _, _) = nodes();
        let index = ModelIndex::new(3, 1, ModelIndex::invalid(), a);
        assert!(index.is_valid());
        assert_eq!(index.node(), Some(a));
        assert_eq!(index.column(), 1);
    }

    #[test]
    fn test_hierarchy() {
        let (a, b, c) = nodes();
        let level1 = ModelIndex::new(0, 0, ModelIndex::invalid(), a);
        let level2 = ModelIndex::new(1, 0, level1.clone(), b);
        let level3 = ModelIndex::new(2, 0, level2.clone(), c);

        assert_eq!(level3.depth(), 2);
        assert_eq!(level3.ancestors(), vec![level2.clone(), level1.clone()]);
        assert!(level3.is_descendant_of(&level1));
        assert!(!level1.is_descendant_of(&level3));
        assert_eq!(level2.parent(), level1);
    }

    #[test]
    fn test_equality_and_ordering() {
        let (a, b, _) = nodes();
        let root = ModelIndex::invalid();
        assert_eq!(ModelIndex::invalid(), ModelIndex::invalid());
        assert_eq!(ModelIndex::new(1, 0, root.clone(), a), ModelIndex::new(1, 0, root.clone(), a));
        assert_ne!(ModelIndex::new(1, 0, root.clone(), a), ModelIndex::new(1, 0, root.clone(), b));

        let first = ModelIndex::new(0, 0, root.clone(), a);
        let second = ModelIndex::new(1, 0, root.clone(), b);
        let first_column = ModelIndex::new(0, 1, root, a);
        assert!(first < second);
        assert!(first < first_column);
        assert!(ModelIndex::invalid() < first);
    }
}
