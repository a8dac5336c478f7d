//! Find-model registry.
//!
//! Nodes and attributes do not point back at the models showing them.
//! Instead, every live [`GraphModel`] is registered here, and the registry
//! listens to each graph's change signal once, forwarding node and
//! attribute changes to the models whose subtree contains the node.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use umbra_core::logging::targets;
use umbra_core::{ConnectionId, GraphChange, GraphId, NodeId, SharedGraph};

use super::graph_model::GraphModel;

struct GraphHook {
    graph: Weak<SharedGraph>,
    connection: ConnectionId,
}

/// Weak set of live models, keyed by the graph they present.
#[derive(Default)]
pub struct ModelRegistry {
    models: Mutex<Vec<Weak<GraphModel>>>,
    hooks: Mutex<HashMap<GraphId, GraphHook>>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers `model`, hooking its graph on first sight.
    pub fn register(self: &Arc<Self>, model: &Arc<GraphModel>) {
        {
            let mut models = self.models.lock();
            models.retain(|weak| weak.strong_count() > 0);
            if models.iter().any(|weak| weak.as_ptr() == Arc::as_ptr(model)) {
                return;
            }
            models.push(Arc::downgrade(model));
        }

        let graph = model.graph();
        let mut hooks = self.hooks.lock();
        hooks.retain(|_, hook| hook.graph.strong_count() > 0);
        if hooks.contains_key(&graph.id()) {
            return;
        }
        let registry = Arc::downgrade(self);
        let graph_id = graph.id();
        let connection = graph.changed().connect(move |change| {
            if let Some(registry) = registry.upgrade() {
                registry.dispatch(graph_id, change);
            }
        });
        tracing::trace!(target: targets::MODEL, ?graph_id, "hooked graph");
        hooks.insert(
            graph_id,
            GraphHook {
                graph: Arc::downgrade(graph),
                connection,
            },
        );
    }

    /// Creates a model and registers it.
    pub fn create_model(
        self: &Arc<Self>,
        graph: Arc<SharedGraph>,
        root: NodeId,
        headers: super::Headers,
    ) -> Arc<GraphModel> {
        let model = Arc::new(GraphModel::new(graph, root, headers));
        self.register(&model);
        model
    }

    /// Removes `model` from the registry.
    pub fn unregister(&self, model: &Arc<GraphModel>) -> bool {
        let mut models = self.models.lock();
        let before = models.len();
        models.retain(|weak| weak.strong_count() > 0 && weak.as_ptr() != Arc::as_ptr(model));
        models.len() != before
    }

    /// Live registered models.
    pub fn models(&self) -> Vec<Arc<GraphModel>> {
        let mut models = self.models.lock();
        models.retain(|weak| weak.strong_count() > 0);
        models.iter().filter_map(Weak::upgrade).collect()
    }

    /// Number of live registered models.
    pub fn len(&self) -> usize {
        self.models().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Models of `graph` that show `node`.
    pub fn find_models(&self, graph: GraphId, node: NodeId) -> Vec<Arc<GraphModel>> {
        self.models()
            .into_iter()
            .filter(|model| model.graph().id() == graph && model.contains(node))
            .collect()
    }

    fn dispatch(&self, graph: GraphId, change: &GraphChange) {
        let models = self.find_models(graph, change.node());
        tracing::trace!(target: targets::MODEL, ?change, models = models.len(), "dispatching change");
        for model in models {
            match change {
                GraphChange::NodeChanged { node } => {
                    model.node_changed(*node);
                }
                GraphChange::AttributeChanged { node, attribute } => {
                    model.attribute_changed(*node, attribute);
                }
            }
        }
    }
}

impl Drop for ModelRegistry {
    fn drop(&mut self) {
        for hook in self.hooks.get_mut().values() {
            if let Some(graph) = hook.graph.upgrade() {
                graph.changed().disconnect(hook.connection);
            }
        }
    }
}

static_assertions::assert_impl_all!(ModelRegistry: Send, Sync);
