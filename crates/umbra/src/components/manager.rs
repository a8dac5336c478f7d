//! Components lifecycle manager.
//!
//! The manager owns the registered components, enforces their dependency
//! constraints while activating, deactivating and reloading them, and
//! mirrors their state into a node graph that a
//! [`GraphModel`](crate::model::GraphModel) can present.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use umbra_core::logging::{span_names, targets};
use umbra_core::{Attribute, Family, ItemFlags, NodeId, PerfSpan, SharedGraph, Signal};

use super::interface::{ComponentHost, ComponentInterface, NullHost};
use super::manifest::{Category, ComponentManifest};
use crate::error::{BoxError, ComponentError, ComponentResult};
use crate::file::SettingsStore;
use crate::model::{GraphModel, Headers, ModelRegistry, headers};

/// Settings section holding the manager's persisted state.
pub const SETTINGS_SECTION: &str = "Settings";

/// Settings key listing the deactivated components, comma separated.
pub const DEACTIVATED_COMPONENTS_KEY: &str = "deactivated_components";

/// Attribute mirroring the activation state of a component node.
pub const ACTIVATED_ATTRIBUTE: &str = "activated";

struct Component {
    manifest: ComponentManifest,
    interface: Mutex<Box<dyn ComponentInterface>>,
    activated: AtomicBool,
    node: NodeId,
}

impl Component {
    fn is_activated(&self) -> bool {
        self.activated.load(Ordering::Acquire)
    }
}

fn run_activation(
    interface: &mut dyn ComponentInterface,
    host: &Arc<dyn ComponentHost>,
    category: Category,
) -> Result<(), BoxError> {
    interface.activate(host)?;
    if category.is_widget() {
        interface.initialize_ui()?;
        interface.add_widget(host.as_ref())?;
    } else {
        interface.initialize()?;
    }
    Ok(())
}

fn run_deactivation(
    interface: &mut dyn ComponentInterface,
    host: &dyn ComponentHost,
    category: Category,
) -> Result<(), BoxError> {
    if category.is_widget() {
        interface.uninitialize_ui()?;
        interface.remove_widget(host)?;
    } else {
        interface.uninitialize()?;
    }
    interface.deactivate()
}

/// Headers of the components graph: column 0 shows the component title.
pub fn components_headers() -> Headers {
    headers([
        ("Components", "name"),
        ("Activated", ACTIVATED_ATTRIBUTE),
        ("Category", "category"),
        ("Dependencies", "require"),
        ("Version", "version"),
    ])
}

/// Registry and lifecycle driver of components.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use umbra::components::{ComponentHost, ComponentInterface, ComponentManifest, ComponentsManager};
/// use umbra::error::BoxError;
/// use umbra::file::Preferences;
///
/// struct Quiet;
///
/// impl ComponentInterface for Quiet {
///     fn activate(&mut self, _host: &Arc<dyn ComponentHost>) -> Result<(), BoxError> {
///         Ok(())
///     }
///     fn deactivate(&mut self) -> Result<(), BoxError> {
///         Ok(())
///     }
/// }
///
/// let manager = ComponentsManager::new(Arc::new(Preferences::new()));
/// manager.register(ComponentManifest::new("core.db"), Box::new(Quiet)).unwrap();
/// manager
///     .register(ComponentManifest::new("addons.tcp").with_require(["core.db"]), Box::new(Quiet))
///     .unwrap();
///
/// manager.activate_components(&["addons.tcp", "core.db"]).unwrap();
/// assert!(manager.is_activated("addons.tcp"));
/// assert_eq!(manager.list_dependents("core.db").unwrap(), ["addons.tcp"]);
/// ```
pub struct ComponentsManager {
    components: RwLock<IndexMap<String, Arc<Component>>>,
    settings: Arc<dyn SettingsStore>,
    host: Arc<dyn ComponentHost>,
    graph: Arc<SharedGraph>,
    root: NodeId,

    component_activated: Signal<String>,
    component_deactivated: Signal<String>,
    component_reloaded: Signal<String>,
}

impl ComponentsManager {
    /// Creates a manager without host.
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self::with_host(settings, Arc::new(NullHost))
    }

    /// Creates a manager driving components on `host`.
    pub fn with_host(settings: Arc<dyn SettingsStore>, host: Arc<dyn ComponentHost>) -> Self {
        let graph = Arc::new(SharedGraph::default());
        let root = graph.with_write(|g| g.create_node("InvisibleRootNode", Family::Default));
        Self {
            components: RwLock::new(IndexMap::new()),
            settings,
            host,
            graph,
            root,
            component_activated: Signal::new(),
            component_deactivated: Signal::new(),
            component_reloaded: Signal::new(),
        }
    }

    /// Emitted with the name of each activated component.
    pub fn component_activated(&self) -> &Signal<String> {
        &self.component_activated
    }

    /// Emitted with the name of each deactivated component.
    pub fn component_deactivated(&self) -> &Signal<String> {
        &self.component_deactivated
    }

    /// Emitted with the name of each reloaded component.
    pub fn component_reloaded(&self) -> &Signal<String> {
        &self.component_reloaded
    }

    // =========================================================================
    // Registry
    // =========================================================================

    fn get(&self, name: &str) -> ComponentResult<Arc<Component>> {
        self.components
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ComponentError::UnknownName(name.to_string()))
    }

    /// Registers a component.
    pub fn register(&self, manifest: ComponentManifest, interface: Box<dyn ComponentInterface>) -> ComponentResult<()> {
        let mut components = self.components.write();
        if components.contains_key(&manifest.name) {
            return Err(ComponentError::DuplicateName(manifest.name));
        }
        let node = self.add_node(&manifest);
        tracing::debug!(target: targets::COMPONENTS, name = %manifest.name, "registered component");
        components.insert(
            manifest.name.clone(),
            Arc::new(Component {
                manifest,
                interface: Mutex::new(interface),
                activated: AtomicBool::new(false),
                node,
            }),
        );
        Ok(())
    }

    /// Unregisters a component, returning its manifest.
    pub fn unregister(&self, name: &str) -> ComponentResult<ComponentManifest> {
        let component = self
            .components
            .write()
            .shift_remove(name)
            .ok_or_else(|| ComponentError::UnknownName(name.to_string()))?;
        if component.is_activated() {
            tracing::warn!(target: targets::COMPONENTS, name, "unregistering an activated component");
        }
        self.remove_node(component.node);
        tracing::debug!(target: targets::COMPONENTS, name, "unregistered component");
        Ok(component.manifest.clone())
    }

    /// Registered component names, in registration order.
    pub fn list_components(&self) -> Vec<String> {
        self.components.read().keys().cloned().collect()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.components.read().contains_key(name)
    }

    /// The manifest of `name`.
    pub fn manifest(&self, name: &str) -> Option<ComponentManifest> {
        self.components.read().get(name).map(|c| c.manifest.clone())
    }

    /// Whether `name` is registered and activated.
    pub fn is_activated(&self, name: &str) -> bool {
        self.components.read().get(name).is_some_and(|c| c.is_activated())
    }

    /// Names of the activated components, in registration order.
    pub fn list_activated(&self) -> Vec<String> {
        self.components
            .read()
            .iter()
            .filter(|(_, component)| component.is_activated())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Every component depending on `name`, directly or transitively.
    ///
    /// Dependents come leaf first: a component is listed before every
    /// component it requires.
    pub fn list_dependents(&self, name: &str) -> ComponentResult<Vec<String>> {
        let components = self.components.read();
        if !components.contains_key(name) {
            return Err(ComponentError::UnknownName(name.to_string()));
        }
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for (dependent, component) in components.iter() {
            for requirement in &component.manifest.require {
                dependents.entry(requirement.as_str()).or_default().push(dependent.as_str());
            }
        }

        struct Walk<'a> {
            dependents: HashMap<&'a str, Vec<&'a str>>,
            visited: HashSet<&'a str>,
            on_path: HashSet<&'a str>,
            order: Vec<String>,
        }

        fn visit<'a>(walk: &mut Walk<'a>, current: &'a str, origin: &str) -> ComponentResult<()> {
            walk.on_path.insert(current);
            let next = walk.dependents.get(current).cloned().unwrap_or_default();
            for dependent in next {
                if walk.on_path.contains(dependent) {
                    return Err(ComponentError::CycleDetected(origin.to_string()));
                }
                if !walk.visited.contains(dependent) {
                    visit(walk, dependent, origin)?;
                }
            }
            walk.on_path.remove(current);
            walk.visited.insert(current);
            if current != origin {
                walk.order.push(current.to_string());
            }
            Ok(())
        }

        let mut walk = Walk {
            dependents,
            visited: HashSet::new(),
            on_path: HashSet::new(),
            order: Vec::new(),
        };
        visit(&mut walk, name, name)?;
        Ok(walk.order)
    }

    /// Orders `names` so that every component follows the ones it requires.
    fn topological_order(&self, names: &[String]) -> ComponentResult<Vec<String>> {
        let components = self.components.read();
        let mut indegree: IndexMap<&str, usize> = names.iter().map(|name| (name.as_str(), 0)).collect();
        let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
        for name in names {
            let Some(component) = components.get(name) else {
                continue;
            };
            for requirement in &component.manifest.require {
                if requirement != name && indegree.contains_key(requirement.as_str()) {
                    edges.entry(requirement.as_str()).or_default().push(name.as_str());
                    if let Some(degree) = indegree.get_mut(name.as_str()) {
                        *degree += 1;
                    }
                }
            }
        }

        let mut queue: VecDeque<&str> = indegree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut ordered = Vec::with_capacity(names.len());
        while let Some(name) = queue.pop_front() {
            ordered.push(name.to_string());
            for dependent in edges.get(name).into_iter().flatten() {
                if let Some(degree) = indegree.get_mut(dependent) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }

        if ordered.len() != indegree.len() {
            let unresolved = indegree
                .iter()
                .find(|(_, degree)| **degree > 0)
                .map(|(name, _)| name.to_string())
                .unwrap_or_default();
            return Err(ComponentError::CycleDetected(unresolved));
        }
        Ok(ordered)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Activates `name`; every required component must already be activated.
    pub fn activate(&self, name: &str) -> ComponentResult<()> {
        let component = self.get(name)?;
        if component.is_activated() {
            return Err(ComponentError::AlreadyActivated(name.to_string()));
        }
        if let Some(dependency) = component
            .manifest
            .require
            .iter()
            .find(|dependency| !self.is_activated(dependency))
        {
            return Err(ComponentError::MissingDependency {
                name: name.to_string(),
                dependency: dependency.clone(),
            });
        }

        tracing::info!(target: targets::COMPONENTS, "Activating '{name}' Component.");
        run_activation(&mut **component.interface.lock(), &self.host, component.manifest.category)
            .map_err(|source| ComponentError::interface(name, source))?;
        component.activated.store(true, Ordering::Release);
        self.sync_node(&component);
        tracing::info!(target: targets::COMPONENTS, "'{name}' Component has been activated!");
        self.component_activated.emit(name.to_string());
        Ok(())
    }

    /// Deactivates `name`; no activated component may depend on it.
    pub fn deactivate(&self, name: &str) -> ComponentResult<()> {
        let component = self.get(name)?;
        if !component.is_activated() {
            return Err(ComponentError::AlreadyDeactivated(name.to_string()));
        }
        if !component.manifest.deactivatable {
            return Err(ComponentError::NotDeactivatable(name.to_string()));
        }
        let active: Vec<String> = self
            .list_dependents(name)?
            .into_iter()
            .filter(|dependent| self.is_activated(dependent))
            .collect();
        if !active.is_empty() {
            return Err(ComponentError::IfDependentsActive {
                name: name.to_string(),
                dependents: active,
            });
        }

        tracing::info!(target: targets::COMPONENTS, "Deactivating '{name}' Component.");
        run_deactivation(&mut **component.interface.lock(), &*self.host, component.manifest.category)
            .map_err(|source| ComponentError::interface(name, source))?;
        component.activated.store(false, Ordering::Release);
        self.sync_node(&component);
        tracing::info!(target: targets::COMPONENTS, "'{name}' Component has been deactivated!");
        self.component_deactivated.emit(name.to_string());
        Ok(())
    }

    /// Reloads `name` together with its dependents.
    ///
    /// Dependents and the component are deactivated leaf first, the
    /// component's code is reloaded, then the previously activated ones are
    /// activated again in dependency order. The first failure stops the
    /// reload and leaves the partial state in place.
    #[tracing::instrument(skip(self), target = "umbra::components", level = "trace")]
    pub fn reload(&self, name: &str) -> ComponentResult<()> {
        let _perf = PerfSpan::new(span_names::COMPONENT_RELOAD);
        let component = self.get(name)?;
        if !component.manifest.deactivatable {
            return Err(ComponentError::NotReloadable {
                name: name.to_string(),
                blocker: name.to_string(),
            });
        }
        let mut order = self.list_dependents(name)?;
        let blocker = order.iter().find(|dependent| {
            self.components
                .read()
                .get(dependent.as_str())
                .is_some_and(|c| !c.manifest.deactivatable)
        });
        if let Some(blocker) = blocker {
            return Err(ComponentError::NotReloadable {
                name: name.to_string(),
                blocker: blocker.clone(),
            });
        }
        tracing::info!(
            target: targets::COMPONENTS,
            "'{name}' Component dependents: '{}'.",
            order.join(", ")
        );
        order.push(name.to_string());

        let previously_activated: HashSet<String> =
            order.iter().filter(|item| self.is_activated(item)).cloned().collect();
        for item in &order {
            if self.is_activated(item) {
                self.deactivate(item)?;
            }
            self.host.process_events();
        }

        tracing::debug!(target: targets::COMPONENTS, "Reloading '{name}' Component.");
        component
            .interface
            .lock()
            .reload()
            .map_err(|source| ComponentError::interface(name, source))?;

        for item in order.iter().rev() {
            if previously_activated.contains(item) && !self.is_activated(item) {
                self.activate(item)?;
            }
            self.host.process_events();
        }

        tracing::info!(target: targets::COMPONENTS, "'{name}' Component has been reloaded!");
        self.component_reloaded.emit(name.to_string());
        Ok(())
    }

    // =========================================================================
    // Batches
    // =========================================================================

    fn batch_result(operation: &str, failed: Vec<String>) -> ComponentResult<()> {
        if failed.is_empty() {
            return Ok(());
        }
        let error = ComponentError::BatchFailed {
            operation: operation.to_string(),
            names: failed,
        };
        tracing::warn!(target: targets::COMPONENTS, %error, "batch failed");
        Err(error)
    }

    /// Activates `names` in dependency order, continuing past failures.
    ///
    /// Already activated components are skipped. The deactivated set is
    /// stored afterwards.
    pub fn activate_components<S: AsRef<str>>(&self, names: &[S]) -> ComponentResult<()> {
        let _perf = PerfSpan::new(span_names::COMPONENT_BATCH);
        let names: Vec<String> = names.iter().map(|name| name.as_ref().to_string()).collect();
        let mut failed = Vec::new();
        for name in self.topological_order(&names)? {
            if self.is_activated(&name) {
                tracing::warn!(target: targets::COMPONENTS, "'{name}' Component is already activated!");
            } else if let Err(error) = self.activate(&name) {
                tracing::warn!(target: targets::COMPONENTS, %error, "activation failed");
                failed.push(name);
            }
            self.host.process_events();
        }
        self.store_deactivated_components();
        Self::batch_result("activating", failed)
    }

    /// Deactivates `names`, dependents first, continuing past failures.
    ///
    /// Components that are already deactivated or cannot be deactivated
    /// are skipped. The deactivated set is stored afterwards.
    pub fn deactivate_components<S: AsRef<str>>(&self, names: &[S]) -> ComponentResult<()> {
        let _perf = PerfSpan::new(span_names::COMPONENT_BATCH);
        let names: Vec<String> = names.iter().map(|name| name.as_ref().to_string()).collect();
        let mut failed = Vec::new();
        for name in self.topological_order(&names)?.into_iter().rev() {
            match self.deactivate(&name) {
                Ok(()) => {}
                Err(error @ (ComponentError::AlreadyDeactivated(_) | ComponentError::NotDeactivatable(_))) => {
                    tracing::warn!(target: targets::COMPONENTS, %error, "skipping component");
                }
                Err(error) => {
                    tracing::warn!(target: targets::COMPONENTS, %error, "deactivation failed");
                    failed.push(name);
                }
            }
            self.host.process_events();
        }
        self.store_deactivated_components();
        Self::batch_result("deactivating", failed)
    }

    /// Reloads `names` in dependency order, continuing past failures.
    ///
    /// Components that cannot be deactivated are skipped.
    pub fn reload_components<S: AsRef<str>>(&self, names: &[S]) -> ComponentResult<()> {
        let _perf = PerfSpan::new(span_names::COMPONENT_BATCH);
        let names: Vec<String> = names.iter().map(|name| name.as_ref().to_string()).collect();
        let mut failed = Vec::new();
        for name in self.topological_order(&names)? {
            let deactivatable = self.manifest(&name).is_some_and(|manifest| manifest.deactivatable);
            if !deactivatable && self.is_registered(&name) {
                tracing::warn!(
                    target: targets::COMPONENTS,
                    "'{name}' Component cannot be deactivated and won't be reloaded!"
                );
            } else if let Err(error) = self.reload(&name) {
                tracing::warn!(target: targets::COMPONENTS, %error, "reload failed");
                failed.push(name);
            }
            self.host.process_events();
        }
        Self::batch_result("reloading", failed)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Writes the deactivated component names to the settings.
    pub fn store_deactivated_components(&self) -> Vec<String> {
        let deactivated: Vec<String> = self
            .components
            .read()
            .iter()
            .filter(|(_, component)| !component.is_activated())
            .map(|(name, _)| name.clone())
            .collect();
        tracing::debug!(
            target: targets::COMPONENTS,
            "Storing '{}' deactivated Components.",
            deactivated.join(", ")
        );
        self.settings
            .set_key(SETTINGS_SECTION, DEACTIVATED_COMPONENTS_KEY, &deactivated.join(","));
        deactivated
    }

    /// Deactivated component names stored in the settings.
    pub fn stored_deactivated_components(&self) -> Vec<String> {
        self.settings
            .get_key(SETTINGS_SECTION, DEACTIVATED_COMPONENTS_KEY)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Activates every registered component not stored as deactivated.
    pub fn activate_startup_components(&self) -> ComponentResult<Vec<String>> {
        let deactivated = self.stored_deactivated_components();
        let startup: Vec<String> = self
            .list_components()
            .into_iter()
            .filter(|name| !deactivated.contains(name) && !self.is_activated(name))
            .collect();
        tracing::info!(target: targets::COMPONENTS, count = startup.len(), "activating startup components");
        self.activate_components(&startup)?;
        Ok(startup)
    }

    // =========================================================================
    // Graph projection
    // =========================================================================

    /// The graph mirroring the registry.
    pub fn graph(&self) -> &Arc<SharedGraph> {
        &self.graph
    }

    /// Root of the components graph: path nodes holding component nodes.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node of component `name`.
    pub fn component_node(&self, name: &str) -> Option<NodeId> {
        self.components.read().get(name).map(|component| component.node)
    }

    /// The name of the component shown by `node`.
    pub fn node_component(&self, node: NodeId) -> Option<String> {
        self.components
            .read()
            .iter()
            .find(|(_, component)| component.node == node)
            .map(|(name, _)| name.clone())
    }

    /// Creates a registered model over the components graph.
    pub fn create_model(&self, registry: &Arc<ModelRegistry>) -> Arc<GraphModel> {
        registry.create_model(self.graph.clone(), self.root, components_headers())
    }

    fn add_node(&self, manifest: &ComponentManifest) -> NodeId {
        let flags = ItemFlags::new();
        let group = manifest.group();
        self.graph.with_write(|g| {
            let existing = g
                .children(self.root)
                .iter()
                .copied()
                .find(|&node| g.family(node) == Some(Family::Path) && g.name(node) == Some(group.as_str()));
            let path = match existing {
                Some(path) => path,
                None => {
                    let path = g.create_node(group.as_str(), Family::Path);
                    if let Err(error) = g.add_child(self.root, path) {
                        tracing::warn!(target: targets::COMPONENTS, %error, group = group.as_str(), "failed to attach path node");
                    }
                    path
                }
            };
            let node = g.create_node(manifest.title.as_str(), Family::Component);
            let attributes = [
                Attribute::new(ACTIVATED_ATTRIBUTE, false).with_trigger(true),
                Attribute::new("category", manifest.category.as_str()),
                Attribute::new("require", manifest.require.clone()),
                Attribute::new("version", manifest.version.as_str()),
            ];
            for attribute in attributes {
                if let Err(error) = g.set_attribute(node, attribute.with_flags(flags)) {
                    tracing::warn!(target: targets::COMPONENTS, %error, "failed to set component attribute");
                }
            }
            if let Err(error) = g.add_child(path, node) {
                tracing::warn!(target: targets::COMPONENTS, %error, "failed to attach component node");
            }
            if let Err(error) = g.sort_children(self.root, None, false) {
                tracing::warn!(target: targets::COMPONENTS, %error, "failed to sort components graph");
            }
            node
        })
    }

    fn remove_node(&self, node: NodeId) {
        self.graph.with_write(|g| {
            let path = g.parent(node);
            if let Err(error) = g.delete_node(node) {
                tracing::warn!(target: targets::COMPONENTS, %error, "failed to delete component node");
            }
            if let Some(path) = path.filter(|&path| path != self.root && g.child_count(path) == 0) {
                if let Err(error) = g.delete_node(path) {
                    tracing::warn!(target: targets::COMPONENTS, %error, "failed to delete path node");
                }
            }
        });
    }

    fn sync_node(&self, component: &Component) {
        let activated = component.is_activated();
        if let Err(error) = self
            .graph
            .with_write(|g| g.set_attribute_value(component.node, ACTIVATED_ATTRIBUTE, activated))
        {
            tracing::warn!(target: targets::COMPONENTS, %error, "failed to update component node");
        }
    }
}

static_assertions::assert_impl_all!(ComponentsManager: Send, Sync);
