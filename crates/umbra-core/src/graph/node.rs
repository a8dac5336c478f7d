//! Node, attribute and family types stored in a [`Graph`](super::Graph).

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use slotmap::new_key_type;

use crate::flags::ItemFlags;
use crate::role::{ItemData, ItemRole};

new_key_type! {
    /// A stable handle to a node inside a [`Graph`](super::Graph).
    ///
    /// Ids stay valid while the tree is restructured and become stale once
    /// the node is deleted.
    pub struct NodeId;
}

impl NodeId {
    /// Convert the id to a raw u64 value.
    ///
    /// Models store this value in the internal id of their indexes.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create a NodeId from a raw u64 value.
    ///
    /// This does not check that the node exists in any graph.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Process-unique identity of a graph, carried by mime payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(u64);

impl GraphId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identity value.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// Class-level tag of a node.
///
/// Views pick their rendering from the family and filters select on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Family {
    /// Invisible root of a model.
    GraphModel,
    /// Plain node.
    #[default]
    Default,
    /// Theme format node.
    Format,
    /// Components search path.
    Path,
    /// Registered component.
    Component,
    /// Backing module of a component.
    Module,
    /// Project root directory.
    Project,
    /// Directory inside a project.
    Directory,
    /// File, inside a project or opened standalone.
    File,
    /// Editor bound to a file.
    Editor,
}

impl Family {
    /// All families, in declaration order.
    pub const ALL: [Family; 10] = [
        Family::GraphModel,
        Family::Default,
        Family::Format,
        Family::Path,
        Family::Component,
        Family::Module,
        Family::Project,
        Family::Directory,
        Family::File,
        Family::Editor,
    ];

    /// The family name used by filters and mime payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::GraphModel => "GraphModel",
            Family::Default => "Default",
            Family::Format => "Format",
            Family::Path => "Path",
            Family::Component => "Component",
            Family::Module => "Module",
            Family::Project => "Project",
            Family::Directory => "Directory",
            Family::File => "File",
            Family::Editor => "Editor",
        }
    }

    /// Looks a family up by its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.as_str() == name)
    }

    /// Default flags of nodes of this family.
    pub fn default_flags(&self) -> ItemFlags {
        match self {
            Family::Component | Family::Path => ItemFlags::new(),
            _ => ItemFlags::editable().with_drag(true),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable metadata shared by nodes and attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservableMeta {
    /// Display role projections.
    pub roles: HashMap<ItemRole, ItemData>,
    /// Allowed interactions.
    pub flags: ItemFlags,
    /// Whether mutations produce change notifications.
    pub trigger: bool,
}

impl ObservableMeta {
    pub(crate) fn with_text(display: String, edit: ItemData, flags: ItemFlags) -> Self {
        let mut roles = HashMap::new();
        roles.insert(ItemRole::Display, ItemData::String(display));
        roles.insert(ItemRole::Edit, edit);
        Self {
            roles,
            flags,
            trigger: false,
        }
    }

    /// The data stored under `role`, if any.
    pub fn role(&self, role: ItemRole) -> Option<&ItemData> {
        self.roles.get(&role)
    }

    /// Stores `data` under `role`, returning whether it differed.
    pub fn set_role(&mut self, role: ItemRole, data: ItemData) -> bool {
        if self.roles.get(&role) == Some(&data) {
            return false;
        }
        self.roles.insert(role, data);
        true
    }

    pub(crate) fn refresh_text(&mut self, display: String, edit: ItemData) {
        self.roles.insert(ItemRole::Display, ItemData::String(display));
        self.roles.insert(ItemRole::Edit, edit);
    }
}

/// A named, typed cell owned by a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    value: ItemData,
    meta: ObservableMeta,
}

impl Attribute {
    /// Creates an attribute whose display roles mirror `value`.
    ///
    /// Attributes start selectable, editable and enabled with triggers off.
    pub fn new(name: impl Into<String>, value: impl Into<ItemData>) -> Self {
        let value = value.into();
        let meta = ObservableMeta::with_text(value.to_string(), value.clone(), ItemFlags::editable());
        Self {
            name: name.into(),
            value,
            meta,
        }
    }

    /// Replaces the flags.
    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.meta.flags = flags;
        self
    }

    /// Turns change notifications on or off.
    pub fn with_trigger(mut self, trigger: bool) -> Self {
        self.meta.trigger = trigger;
        self
    }

    /// Sets an extra role, e.g. a tooltip.
    pub fn with_role(mut self, role: ItemRole, data: impl Into<ItemData>) -> Self {
        self.meta.roles.insert(role, data.into());
        self
    }

    /// The attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current value.
    pub fn value(&self) -> &ItemData {
        &self.value
    }

    /// Role map, flags and trigger.
    pub fn meta(&self) -> &ObservableMeta {
        &self.meta
    }

    /// The data stored under `role`.
    pub fn role(&self, role: ItemRole) -> Option<&ItemData> {
        self.meta.role(role)
    }

    /// The attribute flags.
    pub fn flags(&self) -> ItemFlags {
        self.meta.flags
    }

    /// Whether mutations of this attribute are observable.
    pub fn trigger(&self) -> bool {
        self.meta.trigger
    }

    pub(crate) fn meta_mut(&mut self) -> &mut ObservableMeta {
        &mut self.meta
    }

    /// Writes the value and refreshes the text roles. Returns whether it changed.
    pub(crate) fn replace_value(&mut self, value: ItemData) -> bool {
        if self.value == value {
            return false;
        }
        self.meta.refresh_text(value.to_string(), value.clone());
        self.value = value;
        true
    }
}

/// A vertex of the graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) family: Family,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) attributes: IndexMap<String, Attribute>,
    pub(crate) meta: ObservableMeta,
}

impl Node {
    pub(crate) fn new(name: String, family: Family) -> Self {
        let meta = ObservableMeta::with_text(
            name.clone(),
            ItemData::String(name.clone()),
            family.default_flags(),
        );
        Self {
            name,
            family,
            parent: None,
            children: Vec::new(),
            attributes: IndexMap::new(),
            meta,
        }
    }

    /// The display name. Names are not unique.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node family.
    pub fn family(&self) -> Family {
        self.family
    }

    /// The parent node, `None` for roots and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in row order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Looks an attribute up by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Role map, flags and trigger.
    pub fn meta(&self) -> &ObservableMeta {
        &self.meta
    }

    /// The data stored under `role`.
    pub fn role(&self, role: ItemRole) -> Option<&ItemData> {
        self.meta.role(role)
    }

    /// The node flags.
    pub fn flags(&self) -> ItemFlags {
        self.meta.flags
    }

    /// Whether mutations of this node are observable.
    pub fn trigger(&self) -> bool {
        self.meta.trigger
    }
}
