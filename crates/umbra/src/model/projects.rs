//! Projects model of the script editor.
//!
//! Projects, directories, files and editors form a tree below an invisible
//! root. Files opened outside any project live under the default project
//! node, shown as "Open Files" by the proxy.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use umbra_core::logging::targets;
use umbra_core::{Attribute, Family, ItemFlags, MatchFlags, NodeId, SharedGraph, Signal};

use super::graph_model::{GraphModel, headers};
use super::index::ModelIndex;
use super::registry::ModelRegistry;
use crate::error::{ModelError, ModelResult, Result};
use crate::file::FileError;

/// Internal name of the default project node.
pub const DEFAULT_PROJECT: &str = "default_project";

/// Attribute holding the path of project, directory and file nodes.
pub const PATH_ATTRIBUTE: &str = "path";

/// Attribute holding the editor key of editor nodes.
pub const EDITOR_ATTRIBUTE: &str = "editor";

fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// The script editor's tree of projects, directories, files and editors.
pub struct ProjectsModel {
    model: Arc<GraphModel>,
    default_project_node: NodeId,

    project_registered: Signal<NodeId>,
    project_unregistered: Signal<NodeId>,
    directory_registered: Signal<NodeId>,
    directory_unregistered: Signal<NodeId>,
    file_registered: Signal<NodeId>,
    file_unregistered: Signal<NodeId>,
    editor_registered: Signal<NodeId>,
    editor_unregistered: Signal<NodeId>,
}

impl ProjectsModel {
    /// Creates the model over a fresh graph and registers it.
    pub fn new(registry: &Arc<ModelRegistry>) -> Self {
        Self::with_default_project(registry, DEFAULT_PROJECT)
    }

    /// Creates the model with a custom default project name.
    pub fn with_default_project(registry: &Arc<ModelRegistry>, default_project: &str) -> Self {
        let graph = Arc::new(SharedGraph::default());
        let (root, default_project_node) = graph.with_write(|g| {
            let root = g.create_node("InvisibleRootNode", Family::Default);
            let project = g.create_node(default_project, Family::Project);
            let enabled = ItemFlags::default().with_enabled(true);
            if let Err(error) = g.set_node_flags(project, enabled) {
                tracing::warn!(target: targets::MODEL, %error, "cannot set default project flags");
            }
            if let Err(error) = g.set_attribute(
                project,
                Attribute::new(PATH_ATTRIBUTE, "").with_flags(enabled),
            ) {
                tracing::warn!(target: targets::MODEL, %error, "cannot set default project path");
            }
            if let Err(error) = g.add_child(root, project) {
                tracing::warn!(target: targets::MODEL, %error, "cannot attach default project");
            }
            if let Err(error) = g.enable_triggers(root, true) {
                tracing::warn!(target: targets::MODEL, %error, "cannot enable projects triggers");
            }
            (root, project)
        });
        let model = registry.create_model(graph, root, headers([("Projects", "name")]));
        Self {
            model,
            default_project_node,
            project_registered: Signal::new(),
            project_unregistered: Signal::new(),
            directory_registered: Signal::new(),
            directory_unregistered: Signal::new(),
            file_registered: Signal::new(),
            file_unregistered: Signal::new(),
            editor_registered: Signal::new(),
            editor_unregistered: Signal::new(),
        }
    }

    /// The underlying tabular model.
    pub fn model(&self) -> &Arc<GraphModel> {
        &self.model
    }

    pub fn graph(&self) -> &Arc<SharedGraph> {
        self.model.graph()
    }

    pub fn root(&self) -> NodeId {
        self.model.root()
    }

    /// The project holding files opened outside any project.
    pub fn default_project_node(&self) -> NodeId {
        self.default_project_node
    }

    pub fn project_registered(&self) -> &Signal<NodeId> {
        &self.project_registered
    }

    pub fn project_unregistered(&self) -> &Signal<NodeId> {
        &self.project_unregistered
    }

    pub fn directory_registered(&self) -> &Signal<NodeId> {
        &self.directory_registered
    }

    pub fn directory_unregistered(&self) -> &Signal<NodeId> {
        &self.directory_unregistered
    }

    pub fn file_registered(&self) -> &Signal<NodeId> {
        &self.file_registered
    }

    pub fn file_unregistered(&self) -> &Signal<NodeId> {
        &self.file_unregistered
    }

    pub fn editor_registered(&self) -> &Signal<NodeId> {
        &self.editor_registered
    }

    pub fn editor_unregistered(&self) -> &Signal<NodeId> {
        &self.editor_unregistered
    }

    /// The `path` attribute of a node.
    pub fn node_path(&self, node: NodeId) -> Option<String> {
        self.graph()
            .with_read(|g| g.attribute_value(node, PATH_ATTRIBUTE).and_then(|v| v.as_string().map(str::to_string)))
    }

    // =========================================================================
    // Listing
    // =========================================================================

    fn list_family(&self, family: Family, start: NodeId) -> Vec<NodeId> {
        self.model
            .find_family_from(start, &format!("^{}$", family.as_str()), MatchFlags::default())
            .unwrap_or_default()
    }

    /// Editor nodes below `node`, the default project by default.
    pub fn list_editor_nodes(&self, node: Option<NodeId>) -> Vec<NodeId> {
        self.list_family(Family::Editor, node.unwrap_or(self.default_project_node))
    }

    /// File nodes below `node`, the default project by default.
    pub fn list_file_nodes(&self, node: Option<NodeId>) -> Vec<NodeId> {
        self.list_family(Family::File, node.unwrap_or(self.default_project_node))
    }

    /// Every directory node.
    pub fn list_directory_nodes(&self) -> Vec<NodeId> {
        self.list_family(Family::Directory, self.root())
    }

    /// Every project node, optionally without the default project.
    pub fn list_project_nodes(&self, ignore_default_project_node: bool) -> Vec<NodeId> {
        let mut nodes = self.list_family(Family::Project, self.root());
        if ignore_default_project_node {
            nodes.retain(|&node| node != self.default_project_node);
        }
        nodes
    }

    fn with_path(&self, nodes: Vec<NodeId>, path: &str) -> Vec<NodeId> {
        nodes
            .into_iter()
            .filter(|&node| self.node_path(node).as_deref() == Some(path))
            .collect()
    }

    /// Editor nodes bound to `editor`.
    pub fn get_editor_nodes(&self, editor: &str, node: Option<NodeId>) -> Vec<NodeId> {
        let candidates = self.list_editor_nodes(node);
        self.graph().with_read(|g| {
            candidates
                .into_iter()
                .filter(|&candidate| {
                    g.attribute_value(candidate, EDITOR_ATTRIBUTE)
                        .and_then(|v| v.as_string())
                        == Some(editor)
                })
                .collect()
        })
    }

    /// File nodes with `path`.
    pub fn get_file_nodes(&self, path: &str, node: Option<NodeId>) -> Vec<NodeId> {
        self.with_path(self.list_file_nodes(node), path)
    }

    /// Directory nodes with `path`.
    pub fn get_directory_nodes(&self, path: &str) -> Vec<NodeId> {
        self.with_path(self.list_directory_nodes(), path)
    }

    /// Project nodes with `path`.
    pub fn get_project_nodes(&self, path: &str) -> Vec<NodeId> {
        self.with_path(self.list_project_nodes(true), path)
    }

    /// Whether `node` is the default project or lives below it.
    pub fn is_authoring_node(&self, node: NodeId) -> bool {
        self.graph()
            .with_read(|g| g.is_ancestor_of(self.default_project_node, node))
    }

    // =========================================================================
    // Registration
    // =========================================================================

    fn register_node(
        &self,
        name: String,
        family: Family,
        attribute: Attribute,
        parent: NodeId,
    ) -> ModelResult<NodeId> {
        let node = self.graph().with_write(|g| {
            let node = g.create_node(name, family);
            g.set_attribute(node, attribute).map(|_| node)
        })?;
        let row = self.graph().with_read(|g| g.child_count(parent));
        if let Err(error) = self.model.insert_nodes(parent, row, &[node]) {
            if let Err(cleanup) = self.graph().with_write(|g| g.delete_node(node)) {
                tracing::warn!(target: targets::MODEL, ?node, error = %cleanup, "cannot delete unplaced node");
            }
            return Err(error);
        }
        Ok(node)
    }

    fn unregister_node(&self, node: NodeId, family: Family, signal: &Signal<NodeId>) -> ModelResult<NodeId> {
        let shown = self.model.contains(node);
        let location = self.graph().with_read(|g| {
            (shown && g.family(node) == Some(family))
                .then(|| g.parent(node).zip(g.row(node)))
                .flatten()
        });
        let Some((parent, row)) = location else {
            return Err(ModelError::NotRegistered(format!("{family} node {node:?}")));
        };
        self.model.remove_rows_of(parent, row, 1)?;
        signal.emit(node);
        self.graph().with_write(|g| g.delete_node(node))?;
        Ok(node)
    }

    /// Registers a project at `path` below the root.
    pub fn register_project(&self, path: &str, ensure_uniqueness: bool) -> ModelResult<NodeId> {
        if ensure_uniqueness && !self.get_project_nodes(path).is_empty() {
            return Err(ModelError::AlreadyRegistered(path.to_string()));
        }
        tracing::debug!(target: targets::MODEL, path, "registering project");
        let node = self.register_node(
            base_name(path),
            Family::Project,
            Attribute::new(PATH_ATTRIBUTE, path),
            self.root(),
        )?;
        self.project_registered.emit(node);
        Ok(node)
    }

    /// Unregisters a project node and its subtree.
    pub fn unregister_project(&self, node: NodeId) -> ModelResult<NodeId> {
        if node == self.default_project_node {
            return Err(ModelError::NotRegistered(DEFAULT_PROJECT.to_string()));
        }
        tracing::debug!(target: targets::MODEL, ?node, "unregistering project");
        self.unregister_node(node, Family::Project, &self.project_unregistered)
    }

    /// Registers a directory at `path` below `parent`.
    pub fn register_directory(&self, path: &str, parent: NodeId, ensure_uniqueness: bool) -> ModelResult<NodeId> {
        if ensure_uniqueness && !self.get_directory_nodes(path).is_empty() {
            return Err(ModelError::AlreadyRegistered(path.to_string()));
        }
        tracing::debug!(target: targets::MODEL, path, "registering directory");
        let node = self.register_node(
            base_name(path),
            Family::Directory,
            Attribute::new(PATH_ATTRIBUTE, path),
            parent,
        )?;
        self.directory_registered.emit(node);
        Ok(node)
    }

    /// Unregisters a directory node and its subtree.
    pub fn unregister_directory(&self, node: NodeId) -> ModelResult<NodeId> {
        tracing::debug!(target: targets::MODEL, ?node, "unregistering directory");
        self.unregister_node(node, Family::Directory, &self.directory_unregistered)
    }

    /// Registers a file at `path` below `parent`.
    pub fn register_file(&self, path: &str, parent: NodeId, ensure_uniqueness: bool) -> ModelResult<NodeId> {
        if ensure_uniqueness && !self.get_file_nodes(path, Some(self.root())).is_empty() {
            return Err(ModelError::AlreadyRegistered(path.to_string()));
        }
        tracing::debug!(target: targets::MODEL, path, "registering file");
        let node = self.register_node(
            base_name(path),
            Family::File,
            Attribute::new(PATH_ATTRIBUTE, path),
            parent,
        )?;
        self.file_registered.emit(node);
        Ok(node)
    }

    /// Unregisters a file node and its editors.
    pub fn unregister_file(&self, node: NodeId) -> ModelResult<NodeId> {
        tracing::debug!(target: targets::MODEL, ?node, "unregistering file");
        self.unregister_node(node, Family::File, &self.file_unregistered)
    }

    /// Registers an editor, keyed by `editor`, below `parent`.
    pub fn register_editor(&self, editor: &str, parent: NodeId, ensure_uniqueness: bool) -> ModelResult<NodeId> {
        if ensure_uniqueness && !self.get_editor_nodes(editor, Some(self.root())).is_empty() {
            return Err(ModelError::AlreadyRegistered(editor.to_string()));
        }
        tracing::debug!(target: targets::MODEL, editor, "registering editor");
        let node = self.register_node(
            editor.to_string(),
            Family::Editor,
            Attribute::new(EDITOR_ATTRIBUTE, editor),
            parent,
        )?;
        self.editor_registered.emit(node);
        Ok(node)
    }

    /// Unregisters an editor node.
    pub fn unregister_editor(&self, node: NodeId) -> ModelResult<NodeId> {
        tracing::debug!(target: targets::MODEL, ?node, "unregistering editor");
        self.unregister_node(node, Family::Editor, &self.editor_unregistered)
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Moves the child at `from` to `to` under `parent`.
    pub fn move_node(&self, parent: NodeId, from: usize, to: usize) -> ModelResult<bool> {
        self.model.move_node(parent, from, to)
    }

    /// Renames every project, directory and file node registered at `source`.
    ///
    /// The nodes always take the new name and path. The path is renamed on
    /// disk only when `source` exists; otherwise a warning is logged.
    /// Returns the renamed nodes.
    pub fn rename_path(&self, source: &str, target: &str) -> Result<Vec<NodeId>> {
        let root = Some(self.root());
        let nodes: Vec<NodeId> = self
            .get_project_nodes(source)
            .into_iter()
            .chain(self.get_directory_nodes(source))
            .chain(self.get_file_nodes(source, root))
            .collect();

        if Path::new(source).exists() {
            tracing::info!(target: targets::MODEL, source, target, "renaming path");
            fs::rename(source, target).map_err(|e| FileError::from_io(e, source))?;
        } else {
            tracing::warn!(target: targets::MODEL, source, target, "path does not exist, renaming nodes only");
        }

        let name = base_name(target);
        for &node in &nodes {
            self.graph().with_write(|g| {
                g.set_name(node, name.clone())?;
                g.set_attribute_value(node, PATH_ATTRIBUTE, target)
                    .map_err(ModelError::from)?;
                Ok::<_, ModelError>(())
            })?;
            self.model.node_changed(node);
            self.rebase_descendant_paths(node, source, target)?;
        }
        Ok(nodes)
    }

    /// Moves the `path` of every node below `node` from `source` to `target`.
    fn rebase_descendant_paths(&self, node: NodeId, source: &str, target: &str) -> ModelResult<()> {
        let rebased: Vec<(NodeId, String)> = self.graph().with_read(|g| {
            g.list_node(node, None)
                .skip(1)
                .filter_map(|(descendant, _)| {
                    let path = g.attribute_value(descendant, PATH_ATTRIBUTE)?.as_string()?;
                    let relative = Path::new(path).strip_prefix(source).ok()?;
                    let path = Path::new(target).join(relative);
                    Some((descendant, path.to_string_lossy().into_owned()))
                })
                .collect()
        });
        for (descendant, path) in rebased {
            tracing::trace!(target: targets::MODEL, ?descendant, %path, "rebasing path");
            self.graph()
                .with_write(|g| g.set_attribute_value(descendant, PATH_ATTRIBUTE, path.as_str()))?;
        }
        Ok(())
    }

    /// The column-0 index of `node`.
    pub fn get_node_index(&self, node: NodeId) -> ModelIndex {
        self.model.get_node_index(node)
    }
}
