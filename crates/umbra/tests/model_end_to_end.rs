//! A graph presented through a registered model, edited through the model
//! and through the graph.

mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use umbra::model::{GraphModel, ItemModel, ModelIndex, ModelRegistry, SortOrder, headers};
use umbra::{Attribute, Family, ItemData, ItemRole, NodeId, SharedGraph};

struct Scene {
    graph: Arc<SharedGraph>,
    alpha: NodeId,
    beta: NodeId,
    model: Arc<GraphModel>,
    _registry: Arc<ModelRegistry>,
}

fn scene() -> Scene {
    common::init_tracing();
    let graph = Arc::new(SharedGraph::default());
    let (root, alpha, beta) = graph.with_write(|g| {
        let root = g.create_node("root", Family::Default);
        let alpha = g.create_node("alpha", Family::Default);
        let beta = g.create_node("beta", Family::Default);
        g.set_attribute(alpha, Attribute::new("traced", true)).unwrap();
        g.set_attribute(beta, Attribute::new("traced", false)).unwrap();
        g.add_child(root, alpha).unwrap();
        g.add_child(root, beta).unwrap();
        (root, alpha, beta)
    });
    let registry = ModelRegistry::new();
    let model = registry.create_model(graph.clone(), root, headers([("Name", "name"), ("Traced", "traced")]));
    Scene {
        graph,
        alpha,
        beta,
        model,
        _registry: registry,
    }
}

#[test]
fn end_to_end_sort_and_edit() {
    let scene = scene();
    let model = &scene.model;
    let top = ModelIndex::invalid();

    assert_eq!(model.row_count(&top), 2);
    assert_eq!(model.data_at(0, 0, &top, ItemRole::Display), ItemData::from("alpha"));
    assert_eq!(model.data_at(0, 1, &top, ItemRole::Display), ItemData::from("True"));

    model.sort(0, SortOrder::Descending).unwrap();
    assert_eq!(model.data_at(0, 0, &top, ItemRole::Display), ItemData::from("beta"));

    let changed = Arc::new(Mutex::new(Vec::new()));
    let sink = changed.clone();
    model
        .signals()
        .data_changed
        .connect(move |(index, _, _)| sink.lock().push((index.node(), index.column())));

    let index = model.index(1, 1, &top);
    assert!(model.set_data(&index, ItemData::from("True"), ItemRole::Edit));
    assert_eq!(model.data_at(1, 1, &top, ItemRole::Display), ItemData::from("True"));
    assert_eq!(*changed.lock(), vec![(Some(scene.alpha), 1)]);
}

#[test]
fn display_matches_attribute_roles() {
    let scene = scene();
    let model = &scene.model;
    let top = ModelIndex::invalid();
    for row in 0..model.row_count(&top) {
        let node = model.index(row, 0, &top).node().unwrap();
        scene.graph.with_read(|g| {
            assert_eq!(
                model.data_at(row, 0, &top, ItemRole::Display),
                g.node(node).and_then(|n| n.role(ItemRole::Display)).cloned().unwrap()
            );
            assert_eq!(
                model.data_at(row, 1, &top, ItemRole::Display),
                g.attribute(node, "traced")
                    .and_then(|a| a.role(ItemRole::Display))
                    .cloned()
                    .unwrap()
            );
        });
    }
}

#[test]
fn triggered_graph_writes_reach_the_model() {
    let scene = scene();
    scene
        .graph
        .with_write(|g| g.set_attribute_trigger(scene.beta, "traced", true))
        .unwrap();

    let changed = common::record(&scene.model.signals().data_changed);
    scene
        .graph
        .with_write(|g| g.set_attribute_value(scene.beta, "traced", true))
        .unwrap();

    let events = changed.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0.node(), Some(scene.beta));
    assert_eq!(events[0].0.column(), 1);
}

#[test]
fn mime_round_trip_resolves_same_nodes() {
    let scene = scene();
    let top = ModelIndex::invalid();
    let indexes = [scene.model.index(1, 0, &top), scene.model.index(0, 0, &top)];
    let mime = scene.model.mime_encode(&indexes).unwrap();
    assert_eq!(scene.model.mime_decode(&mime).unwrap(), vec![scene.beta, scene.alpha]);
}
