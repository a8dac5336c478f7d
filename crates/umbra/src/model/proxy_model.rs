//! Filtering and rendering proxy over the projects model.
//!
//! `ProjectsProxyModel` hides editor rows and rewrites the column-0 display
//! text of each row with a per-family HTML template. Rows keep their node
//! keys, so proxy and source indices differ only by row numbers.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use umbra_core::logging::targets;
use umbra_core::{ConnectionId, Family, Graph, ItemData, ItemFlags, ItemRole, NodeId};

use super::index::ModelIndex;
use super::projects::ProjectsModel;
use super::traits::{ItemModel, ModelSignals, Orientation};

/// Display templates applied to column 0, `{0}` standing for the node name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFormats {
    pub editor: String,
    pub file: String,
    pub directory: String,
    pub project: String,
    pub default_project: String,
}

impl Default for NodeFormats {
    fn default() -> Self {
        Self {
            editor: "<span>{0}</span>".to_string(),
            file: "<span style=\"color: rgb(160, 160, 160);\">{0}</span>".to_string(),
            directory: "{0}".to_string(),
            project: "<b>{0}</b>".to_string(),
            default_project: "<b>Open Files</b>".to_string(),
        }
    }
}

#[derive(Default)]
struct SourceConnections {
    rows_about_to_be_inserted: Option<ConnectionId>,
    rows_inserted: Option<ConnectionId>,
    rows_about_to_be_removed: Option<ConnectionId>,
    rows_removed: Option<ConnectionId>,
    model_about_to_reset: Option<ConnectionId>,
    model_reset: Option<ConnectionId>,
    layout_about_to_change: Option<ConnectionId>,
    layout_changed: Option<ConnectionId>,
    data_changed: Option<ConnectionId>,
}

/// Proxy hiding editor rows of a [`ProjectsModel`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use umbra::model::{ItemModel, ModelIndex, ModelRegistry, ProjectsModel, ProjectsProxyModel};
/// use umbra_core::{ItemData, ItemRole};
///
/// let projects = Arc::new(ProjectsModel::new(&ModelRegistry::new()));
/// let file = projects
///     .register_file("/tmp/notes.py", projects.default_project_node(), false)
///     .unwrap();
/// projects.register_editor("editor-1", file, false).unwrap();
///
/// let proxy = ProjectsProxyModel::new(projects.clone());
/// let open_files = proxy.index(0, 0, &ModelIndex::invalid());
/// assert_eq!(proxy.data(&open_files, ItemRole::Display), ItemData::from("<b>Open Files</b>"));
///
/// let notes = proxy.index(0, 0, &open_files);
/// assert_eq!(proxy.row_count(&notes), 0);
/// ```
pub struct ProjectsProxyModel {
    source: Arc<ProjectsModel>,
    hidden_families: RwLock<Vec<Family>>,
    formats: RwLock<NodeFormats>,
    signals: ModelSignals,
    connections: RwLock<SourceConnections>,
}

impl ProjectsProxyModel {
    /// Creates the proxy and starts forwarding the source signals.
    pub fn new(source: Arc<ProjectsModel>) -> Arc<Self> {
        let proxy = Arc::new_cyclic(|weak: &Weak<Self>| {
            let signals = source.model().signals();
            let mut connections = SourceConnections::default();

            let w = weak.clone();
            connections.rows_about_to_be_inserted = Some(signals.rows_about_to_be_inserted.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.signals.layout_about_to_change.emit(());
                }
            }));
            let w = weak.clone();
            connections.rows_inserted = Some(signals.rows_inserted.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.signals.layout_changed.emit(());
                }
            }));
            let w = weak.clone();
            connections.rows_about_to_be_removed = Some(signals.rows_about_to_be_removed.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.signals.layout_about_to_change.emit(());
                }
            }));
            let w = weak.clone();
            connections.rows_removed = Some(signals.rows_removed.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.signals.layout_changed.emit(());
                }
            }));
            let w = weak.clone();
            connections.model_about_to_reset = Some(signals.model_about_to_reset.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.signals.model_about_to_reset.emit(());
                }
            }));
            let w = weak.clone();
            connections.model_reset = Some(signals.model_reset.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.signals.model_reset.emit(());
                }
            }));
            let w = weak.clone();
            connections.layout_about_to_change = Some(signals.layout_about_to_change.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.signals.layout_about_to_change.emit(());
                }
            }));
            let w = weak.clone();
            connections.layout_changed = Some(signals.layout_changed.connect(move |_| {
                if let Some(proxy) = w.upgrade() {
                    proxy.signals.layout_changed.emit(());
                }
            }));
            let w = weak.clone();
            connections.data_changed = Some(signals.data_changed.connect(move |(top_left, bottom_right, roles)| {
                if let Some(proxy) = w.upgrade() {
                    proxy.forward_data_changed(top_left, bottom_right, roles);
                }
            }));

            Self {
                source: source.clone(),
                hidden_families: RwLock::new(vec![Family::Editor]),
                formats: RwLock::new(NodeFormats::default()),
                signals: ModelSignals::new(),
                connections: RwLock::new(connections),
            }
        });
        tracing::trace!(target: targets::PROXY, "projects proxy connected");
        proxy
    }

    /// The wrapped projects model.
    pub fn source(&self) -> &Arc<ProjectsModel> {
        &self.source
    }

    /// Display templates in use.
    pub fn formats(&self) -> NodeFormats {
        self.formats.read().clone()
    }

    /// Replaces the display templates.
    pub fn set_formats(&self, formats: NodeFormats) {
        self.signals.emit_layout_changed(|| *self.formats.write() = formats);
    }

    /// Families whose rows, and their subtrees, are hidden.
    pub fn hidden_families(&self) -> Vec<Family> {
        self.hidden_families.read().clone()
    }

    /// Replaces the hidden families, re-filtering the rows.
    pub fn set_hidden_families(&self, families: Vec<Family>) {
        self.signals
            .emit_layout_changed(|| *self.hidden_families.write() = families);
    }

    fn accepts(&self, graph: &Graph, node: NodeId) -> bool {
        graph
            .family(node)
            .is_some_and(|family| !self.hidden_families.read().contains(&family))
    }

    fn visible_children(&self, graph: &Graph, parent: NodeId) -> Vec<NodeId> {
        graph
            .children(parent)
            .iter()
            .copied()
            .filter(|&child| self.accepts(graph, child))
            .collect()
    }

    /// Builds the proxy index of `node`, invalid when it is filtered out.
    fn proxy_index_in(&self, graph: &Graph, node: NodeId, column: usize) -> ModelIndex {
        let root = self.source.root();
        if node == root || !graph.is_ancestor_of(root, node) {
            return ModelIndex::invalid();
        }
        let mut chain = vec![node];
        chain.extend(graph.ancestors(node).into_iter().take_while(|&n| n != root));
        chain.reverse();

        let mut parent = root;
        let mut index = ModelIndex::invalid();
        let last = chain.len() - 1;
        for (depth, &current) in chain.iter().enumerate() {
            let Some(row) = self
                .visible_children(graph, parent)
                .iter()
                .position(|&child| child == current)
            else {
                return ModelIndex::invalid();
            };
            let column = if depth == last { column } else { 0 };
            index = ModelIndex::new(row, column, index, current);
            parent = current;
        }
        index
    }

    /// The source index behind `proxy_index`.
    pub fn map_to_source(&self, proxy_index: &ModelIndex) -> ModelIndex {
        let Some(node) = proxy_index.node() else {
            return ModelIndex::invalid();
        };
        let model = self.source.model();
        if proxy_index.column() == 0 {
            return model.get_node_index(node);
        }
        let source = model.get_node_index(node);
        if !source.is_valid() {
            return source;
        }
        ModelIndex::new(source.row(), proxy_index.column(), source.parent(), node)
    }

    /// The proxy index showing `source_index`, invalid when filtered out.
    pub fn map_from_source(&self, source_index: &ModelIndex) -> ModelIndex {
        let Some(node) = source_index.node() else {
            return ModelIndex::invalid();
        };
        self.source
            .graph()
            .with_read(|g| self.proxy_index_in(g, node, source_index.column()))
    }

    /// The node behind `index`; the root for an invalid index.
    pub fn get_node(&self, index: &ModelIndex) -> NodeId {
        self.source.model().get_node(&self.map_to_source(index))
    }

    fn forward_data_changed(&self, top_left: &ModelIndex, bottom_right: &ModelIndex, roles: &[ItemRole]) {
        let first = self.map_from_source(top_left);
        let last = self.map_from_source(bottom_right);
        if first.is_valid() && last.is_valid() {
            self.signals.data_changed.emit((first, last, roles.to_vec()));
        }
    }

    fn render(&self, node: NodeId, family: Family, name: &str) -> Option<String> {
        let formats = self.formats.read();
        let template = match family {
            Family::Editor => &formats.editor,
            Family::File => &formats.file,
            Family::Directory => &formats.directory,
            Family::Project if node == self.source.default_project_node() => &formats.default_project,
            Family::Project => &formats.project,
            _ => return None,
        };
        Some(template.replace("{0}", name))
    }
}

impl ItemModel for ProjectsProxyModel {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        let node = self.get_node(parent);
        if parent.is_valid() && node == self.source.root() {
            return 0;
        }
        self.source
            .graph()
            .with_read(|g| self.visible_children(g, node).len())
    }

    fn column_count(&self, parent: &ModelIndex) -> usize {
        self.source.model().column_count(parent)
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        let source_index = self.map_to_source(index);
        if !source_index.is_valid() {
            return ItemData::None;
        }
        if role == ItemRole::Display && index.column() == 0 {
            if let Some(node) = index.node() {
                let rendered = self.source.graph().with_read(|g| {
                    let family = g.family(node)?;
                    let name = g.name(node)?;
                    self.render(node, family, name)
                });
                if let Some(text) = rendered {
                    return ItemData::String(text);
                }
            }
        }
        self.source.model().data(&source_index, role)
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= self.column_count(parent) {
            return ModelIndex::invalid();
        }
        let parent_node = self.get_node(parent);
        self.source.graph().with_read(|g| {
            match self.visible_children(g, parent_node).get(row) {
                Some(&child) => {
                    let parent = match parent.node() {
                        Some(node) if parent.column() != 0 => {
                            ModelIndex::new(parent.row(), 0, parent.parent(), node)
                        }
                        _ => parent.clone(),
                    };
                    ModelIndex::new(row, column, parent, child)
                }
                None => ModelIndex::invalid(),
            }
        })
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        let Some(node) = index.node() else {
            return ModelIndex::invalid();
        };
        self.source.graph().with_read(|g| match g.parent(node) {
            Some(parent) => self.proxy_index_in(g, parent, 0),
            None => ModelIndex::invalid(),
        })
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn set_data(&self, index: &ModelIndex, value: ItemData, role: ItemRole) -> bool {
        let source_index = self.map_to_source(index);
        source_index.is_valid() && self.source.model().set_data(&source_index, value, role)
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        self.source.model().flags(&self.map_to_source(index))
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        self.source.model().header_data(section, orientation, role)
    }
}

impl Drop for ProjectsProxyModel {
    fn drop(&mut self) {
        let signals = self.source.model().signals();
        let connections = self.connections.get_mut();
        let pairs = [
            (&signals.rows_about_to_be_inserted, connections.rows_about_to_be_inserted.take()),
            (&signals.rows_inserted, connections.rows_inserted.take()),
            (&signals.rows_about_to_be_removed, connections.rows_about_to_be_removed.take()),
            (&signals.rows_removed, connections.rows_removed.take()),
        ];
        for (signal, id) in pairs {
            if let Some(id) = id {
                signal.disconnect(id);
            }
        }
        let resets = [
            (&signals.model_about_to_reset, connections.model_about_to_reset.take()),
            (&signals.model_reset, connections.model_reset.take()),
            (&signals.layout_about_to_change, connections.layout_about_to_change.take()),
            (&signals.layout_changed, connections.layout_changed.take()),
        ];
        for (signal, id) in resets {
            if let Some(id) = id {
                signal.disconnect(id);
            }
        }
        if let Some(id) = connections.data_changed.take() {
            signals.data_changed.disconnect(id);
        }
    }
}

static_assertions::assert_impl_all!(ProjectsProxyModel: Send, Sync);
