use super::{Graph, NodeId};

/// Lazy pre-order traversal over a subtree.
///
/// Yields `(node, depth)` pairs, the start node first at depth 0, then each
/// child followed by its own descendants.
pub struct NodesWalker<'a> {
    graph: &'a Graph,
    stack: Vec<(NodeId, usize)>,
    max_depth: Option<usize>,
}

impl<'a> NodesWalker<'a> {
    pub(crate) fn new(graph: &'a Graph, start: NodeId, max_depth: Option<usize>) -> Self {
        let stack = if graph.contains(start) {
            vec![(start, 0)]
        } else {
            Vec::new()
        };
        Self {
            graph,
            stack,
            max_depth,
        }
    }
}

impl Iterator for NodesWalker<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        if self.max_depth.is_none_or(|max| depth < max) {
            self.stack.extend(
                self.graph
                    .children(id)
                    .iter()
                    .rev()
                    .map(|&child| (child, depth + 1)),
            );
        }
        Some((id, depth))
    }
}
