//! Structural invariants of the node graph.

use umbra_core::{Attribute, Family, Graph, GraphTreeDebug, MatchFlags, NodeId, TreeFormatOptions};

/// root
/// ├── a (rank 2)
/// │   ├── a1
/// │   └── a2
/// ├── b (rank 1)
/// ├── c
/// └── d (rank 1)
fn tree() -> (Graph, NodeId, Vec<NodeId>) {
    let mut graph = Graph::new();
    let root = graph.create_node("root", Family::Default);
    let mut top = Vec::new();
    for (name, rank) in [("a", Some(2)), ("b", Some(1)), ("c", None), ("d", Some(1))] {
        let node = graph.create_node(name, Family::Default);
        if let Some(rank) = rank {
            graph.set_attribute(node, Attribute::new("rank", rank as i64)).unwrap();
        }
        graph.add_child(root, node).unwrap();
        top.push(node);
    }
    for name in ["a1", "a2"] {
        let node = graph.create_node(name, Family::File);
        graph.add_child(top[0], node).unwrap();
    }
    (graph, root, top)
}

fn assert_links(graph: &Graph, root: NodeId) {
    for (node, _) in graph.list_node(root, None) {
        for &child in graph.children(node) {
            assert_eq!(graph.parent(child), Some(node));
            let row = graph.row(child).unwrap();
            assert_eq!(graph.children(node)[row], child);
        }
    }
}

#[test]
fn parent_and_row_links_hold() {
    let (graph, root, _) = tree();
    assert_links(&graph, root);
    assert_eq!(graph.list_node(root, None).count(), 7);
    assert_eq!(graph.list_node(root, Some(1)).count(), 5);
}

#[test]
fn remove_then_insert_restores_tree() {
    let (mut graph, root, top) = tree();
    let before = graph.children(root).to_vec();
    let child = graph.remove_child(root, 1).unwrap();
    assert_eq!(child, top[1]);
    assert_eq!(graph.parent(child), None);
    graph.insert_child(root, child, 1).unwrap();
    assert_eq!(graph.children(root), before.as_slice());
    assert_links(&graph, root);
}

#[test]
fn match_all_finds_every_child() {
    let (graph, root, _) = tree();
    let found = graph.find_children(root, ".*", MatchFlags::default()).unwrap();
    assert_eq!(found, graph.children(root));
    let upper = graph.find_children(root, "^A$", MatchFlags::ignore_case()).unwrap();
    assert_eq!(upper.len(), 1);
}

#[test]
fn sorting_is_stable() {
    let (mut graph, root, top) = tree();
    graph.sort_children(root, Some("rank"), false).unwrap();
    assert_eq!(graph.children(root), [top[1], top[3], top[0], top[2]]);

    graph.sort_children(root, Some("rank"), true).unwrap();
    assert_eq!(graph.children(root), [top[0], top[1], top[3], top[2]]);
    assert_links(&graph, root);
}

#[test]
fn cycles_are_rejected() {
    let (mut graph, root, top) = tree();
    graph.detach(top[0]).unwrap();
    let a1 = graph.child(top[0], 0).unwrap();
    assert!(graph.add_child(a1, top[0]).is_err());
    assert!(graph.add_child(root, top[1]).is_err());
}

#[test]
fn delete_removes_subtree() {
    let (mut graph, root, top) = tree();
    let a1 = graph.child(top[0], 0).unwrap();
    graph.delete_node(top[0]).unwrap();
    assert!(!graph.contains(top[0]));
    assert!(!graph.contains(a1));
    assert_eq!(graph.child_count(root), 3);
    assert_links(&graph, root);
}

#[test]
fn tree_dump_lists_every_node() {
    let (graph, root, _) = tree();
    let dump = GraphTreeDebug::with_options(TreeFormatOptions::minimal())
        .format_subtree(&graph, root)
        .unwrap();
    for name in ["root", "a", "a1", "a2", "b", "c", "d"] {
        assert!(dump.contains(name), "{name} missing from:\n{dump}");
    }
}
