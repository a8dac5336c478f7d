use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use super::{Graph, GraphChange, GraphId};
use crate::logging::targets;
use crate::signal::Signal;

/// A thread-safe wrapper around [`Graph`] that publishes its changes.
///
/// Mutations go through [`SharedGraph::with_write`]. Notifications queued by
/// observable nodes and attributes are emitted on [`SharedGraph::changed`]
/// once the write lock is released, so observers may read or write the graph
/// from their slots. Changes made by an observer are queued and delivered
/// after the current notification returns.
pub struct SharedGraph {
    id: GraphId,
    inner: RwLock<Graph>,
    changed: Signal<GraphChange>,
    queue: Mutex<VecDeque<GraphChange>>,
    emitting: AtomicBool,
}

impl SharedGraph {
    /// Wrap an existing graph.
    pub fn new(graph: Graph) -> Self {
        Self {
            id: graph.id(),
            inner: RwLock::new(graph),
            changed: Signal::new(),
            queue: Mutex::new(VecDeque::new()),
            emitting: AtomicBool::new(false),
        }
    }

    /// Identity of the wrapped graph.
    pub fn id(&self) -> GraphId {
        self.id
    }

    /// Signal emitted for every observable change.
    pub fn changed(&self) -> &Signal<GraphChange> {
        &self.changed
    }

    /// Execute a function with read access to the graph.
    pub fn with_read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Graph) -> R,
    {
        f(&self.inner.read())
    }

    /// Execute a function with write access to the graph, then deliver the
    /// notifications it produced.
    pub fn with_write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Graph) -> R,
    {
        let (result, pending) = {
            let mut graph = self.inner.write();
            let result = f(&mut graph);
            (result, graph.take_pending_changes())
        };
        if !pending.is_empty() {
            self.queue.lock().extend(pending);
            self.flush();
        }
        result
    }

    fn flush(&self) {
        loop {
            if self.emitting.swap(true, Ordering::AcqRel) {
                tracing::trace!(target: targets::GRAPH, "nested change deferred");
                return;
            }
            loop {
                let next = self.queue.lock().pop_front();
                match next {
                    Some(change) => self.changed.emit(change),
                    None => break,
                }
            }
            self.emitting.store(false, Ordering::Release);
            if self.queue.lock().is_empty() {
                return;
            }
        }
    }
}

impl Default for SharedGraph {
    fn default() -> Self {
        Self::new(Graph::new())
    }
}

static_assertions::assert_impl_all!(SharedGraph: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Weak};

    use parking_lot::Mutex;

    use super::*;
    use crate::graph::{Attribute, Family};

    #[test]
    fn test_changes_are_emitted_after_write() {
        let shared = SharedGraph::default();
        let node = shared.with_write(|graph| {
            let node = graph.create_node("alpha", Family::Default);
            graph
                .set_attribute(node, Attribute::new("traced", false).with_trigger(true))
                .unwrap();
            node
        });

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        shared.changed().connect(move |change| received_clone.lock().push(change.clone()));

        shared.with_write(|graph| graph.set_attribute_value(node, "traced", true).unwrap());
        assert_eq!(
            *received.lock(),
            vec![GraphChange::AttributeChanged {
                node,
                attribute: "traced".into()
            }]
        );
    }

    #[test]
    fn test_nested_mutations_are_queued() {
        let shared = Arc::new(SharedGraph::default());
        let (a, b) = shared.with_write(|graph| {
            let a = graph.create_node("a", Family::Default);
            let b = graph.create_node("b", Family::Default);
            graph.set_attribute(a, Attribute::new("v", 0).with_trigger(true)).unwrap();
            graph.set_attribute(b, Attribute::new("v", 0).with_trigger(true)).unwrap();
            (a, b)
        });

        let log = Arc::new(Mutex::new(Vec::new()));
        let weak: Weak<SharedGraph> = Arc::downgrade(&shared);
        let log_clone = log.clone();
        shared.changed().connect(move |change| {
            log_clone.lock().push(format!("enter {:?}", change.node() == a));
            if change.node() == a {
                if let Some(shared) = weak.upgrade() {
                    // The slot may read and write the graph it observes.
                    let value = shared.with_read(|graph| graph.attribute_value(a, "v").cloned());
                    assert!(value.is_some());
                    shared.with_write(|graph| graph.set_attribute_value(b, "v", 1).unwrap());
                }
            }
            log_clone.lock().push("exit".to_string());
        });

        shared.with_write(|graph| graph.set_attribute_value(a, "v", 1).unwrap());
        assert_eq!(
            *log.lock(),
            vec!["enter true", "exit", "enter false", "exit"]
        );
    }
}
