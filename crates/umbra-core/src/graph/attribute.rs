//! Attribute and observable metadata operations on [`Graph`].

use super::{Attribute, Graph, GraphChange, NodeId};
use crate::error::{AttributeError, AttributeResult, NodeError, NodeResult};
use crate::flags::ItemFlags;
use crate::logging::targets;
use crate::role::{ItemData, ItemRole};

/// Node field names that attributes may not shadow.
pub const RESERVED_ATTRIBUTE_NAMES: &[&str] =
    &["name", "family", "parent", "children", "roles", "flags", "trigger"];

impl Graph {
    /// Insert or replace an attribute, returning the replaced one.
    pub fn set_attribute(&mut self, id: NodeId, attribute: Attribute) -> NodeResult<Option<Attribute>> {
        if RESERVED_ATTRIBUTE_NAMES.contains(&attribute.name()) {
            return Err(NodeError::NameConflict(attribute.name().to_string()));
        }
        let node = self.node_mut(id).ok_or(NodeError::UnknownNode)?;
        Ok(node.attributes.insert(attribute.name().to_string(), attribute))
    }

    /// Looks an attribute up by name.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&Attribute> {
        self.node(id)?.attribute(name)
    }

    /// The attribute value, if the attribute exists.
    pub fn attribute_value(&self, id: NodeId, name: &str) -> Option<&ItemData> {
        self.attribute(id, name).map(Attribute::value)
    }

    /// Attributes in insertion order.
    pub fn attributes(&self, id: NodeId) -> Vec<&Attribute> {
        self.node(id).map(|node| node.attributes().collect()).unwrap_or_default()
    }

    /// Remove an attribute, preserving the order of the others.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<Attribute> {
        self.node_mut(id)?.attributes.shift_remove(name)
    }

    fn attribute_mut(&mut self, id: NodeId, name: &str) -> AttributeResult<&mut Attribute> {
        self.node_mut(id)
            .ok_or(AttributeError::UnknownNode)?
            .attributes
            .get_mut(name)
            .ok_or_else(|| AttributeError::Unknown(name.to_string()))
    }

    fn notify_attribute(&mut self, id: NodeId, name: &str, trigger: bool) {
        if trigger {
            self.push_change(GraphChange::AttributeChanged {
                node: id,
                attribute: name.to_string(),
            });
        }
    }

    fn notify_node(&mut self, id: NodeId) {
        if self.node(id).is_some_and(|node| node.trigger()) {
            self.push_change(GraphChange::NodeChanged { node: id });
        }
    }

    /// Programmatic value write.
    ///
    /// Refreshes the text roles and queues a notification when the attribute
    /// is observable and the value changed. Returns whether it changed.
    pub fn set_attribute_value(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<ItemData>,
    ) -> AttributeResult<bool> {
        let attribute = self.attribute_mut(id, name)?;
        let changed = attribute.replace_value(value.into());
        let trigger = attribute.trigger();
        if changed {
            self.notify_attribute(id, name, trigger);
        }
        Ok(changed)
    }

    /// User-edit write used by models.
    ///
    /// Text roles (`Display`, `Edit`) write the value: they fail with
    /// `ReadOnly` when the attribute is not editable and with `TypeMismatch`
    /// when `value` cannot be coerced to the stored type. Other roles store
    /// `value` in the role map. Does not queue a notification; the calling
    /// model reports the edit.
    pub fn edit_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        role: ItemRole,
        value: &ItemData,
    ) -> AttributeResult<bool> {
        let attribute = self.attribute_mut(id, name)?;
        if !role.is_text_role() {
            return Ok(attribute.meta_mut().set_role(role, value.clone()));
        }
        if !attribute.flags().editable {
            return Err(AttributeError::ReadOnly(name.to_string()));
        }
        let coerced = value
            .coerce_to(attribute.value())
            .ok_or_else(|| AttributeError::TypeMismatch {
                attribute: name.to_string(),
                expected: attribute.value().type_name(),
                got: value.type_name(),
            })?;
        let changed = attribute.replace_value(coerced);
        tracing::trace!(target: targets::GRAPH, ?id, attribute = name, changed, "edited attribute");
        Ok(changed)
    }

    /// Set an attribute role such as a tooltip.
    pub fn set_attribute_role(
        &mut self,
        id: NodeId,
        name: &str,
        role: ItemRole,
        data: impl Into<ItemData>,
    ) -> AttributeResult<bool> {
        let attribute = self.attribute_mut(id, name)?;
        let changed = attribute.meta_mut().set_role(role, data.into());
        let trigger = attribute.trigger();
        if changed {
            self.notify_attribute(id, name, trigger);
        }
        Ok(changed)
    }

    /// Replace an attribute's flags.
    pub fn set_attribute_flags(&mut self, id: NodeId, name: &str, flags: ItemFlags) -> AttributeResult<bool> {
        let attribute = self.attribute_mut(id, name)?;
        let changed = attribute.flags() != flags;
        attribute.meta_mut().flags = flags;
        let trigger = attribute.trigger();
        if changed {
            self.notify_attribute(id, name, trigger);
        }
        Ok(changed)
    }

    /// Turn notifications of a single attribute on or off.
    pub fn set_attribute_trigger(&mut self, id: NodeId, name: &str, trigger: bool) -> AttributeResult<()> {
        self.attribute_mut(id, name)?.meta_mut().trigger = trigger;
        Ok(())
    }

    /// Rename a node programmatically, refreshing its text roles.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> NodeResult<bool> {
        let name = name.into();
        let node = self.node_mut(id).ok_or(NodeError::UnknownNode)?;
        if node.name == name {
            return Ok(false);
        }
        node.meta.refresh_text(name.clone(), ItemData::String(name.clone()));
        node.name = name;
        self.notify_node(id);
        Ok(true)
    }

    /// User-edit write of a node role used by models.
    ///
    /// Text roles rename the node and honor the editable flag; other roles
    /// are stored as given. Does not queue a notification.
    pub fn edit_node(&mut self, id: NodeId, role: ItemRole, value: &ItemData) -> AttributeResult<bool> {
        let node = self.node_mut(id).ok_or(AttributeError::UnknownNode)?;
        if !role.is_text_role() {
            return Ok(node.meta.set_role(role, value.clone()));
        }
        if !node.meta.flags.editable {
            return Err(AttributeError::ReadOnly("name".to_string()));
        }
        let name = value.to_string();
        if node.name == name {
            return Ok(false);
        }
        node.meta.refresh_text(name.clone(), ItemData::String(name.clone()));
        node.name = name;
        Ok(true)
    }

    /// Set a node role such as a tooltip or icon key.
    pub fn set_node_role(&mut self, id: NodeId, role: ItemRole, data: impl Into<ItemData>) -> NodeResult<bool> {
        let node = self.node_mut(id).ok_or(NodeError::UnknownNode)?;
        let changed = node.meta.set_role(role, data.into());
        if changed {
            self.notify_node(id);
        }
        Ok(changed)
    }

    /// Replace a node's flags.
    pub fn set_node_flags(&mut self, id: NodeId, flags: ItemFlags) -> NodeResult<bool> {
        let node = self.node_mut(id).ok_or(NodeError::UnknownNode)?;
        let changed = node.meta.flags != flags;
        node.meta.flags = flags;
        if changed {
            self.notify_node(id);
        }
        Ok(changed)
    }

    /// Turn notifications of a single node on or off.
    pub fn set_node_trigger(&mut self, id: NodeId, trigger: bool) -> NodeResult<()> {
        self.node_mut(id).ok_or(NodeError::UnknownNode)?.meta.trigger = trigger;
        Ok(())
    }

    /// Switch the triggers of a node, its attributes and its whole subtree.
    pub fn enable_triggers(&mut self, id: NodeId, state: bool) -> NodeResult<()> {
        if !self.contains(id) {
            return Err(NodeError::UnknownNode);
        }
        let subtree: Vec<NodeId> = self.list_node(id, None).map(|(node, _)| node).collect();
        for node in subtree {
            if let Some(data) = self.node_mut(node) {
                data.meta.trigger = state;
                for attribute in data.attributes.values_mut() {
                    attribute.meta_mut().trigger = state;
                }
            }
        }
        tracing::trace!(target: targets::GRAPH, ?id, state, "switched triggers");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{AttributeError, NodeError};
    use crate::flags::ItemFlags;
    use crate::graph::{Attribute, Family, Graph, GraphChange};
    use crate::role::{ItemData, ItemRole};

    #[test]
    fn test_attributes_keep_insertion_order() {
        let mut graph = Graph::new();
        let node = graph.create_node("alpha", Family::Default);
        for name in ["zeta", "traced", "alpha"] {
            graph.set_attribute(node, Attribute::new(name, 0)).unwrap();
        }
        let replaced = graph.set_attribute(node, Attribute::new("traced", 5)).unwrap();
        assert_eq!(replaced.map(|a| a.value().clone()), Some(ItemData::Int(0)));

        let names: Vec<&str> = graph.attributes(node).iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["zeta", "traced", "alpha"]);

        graph.remove_attribute(node, "zeta");
        let names: Vec<&str> = graph.attributes(node).iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["traced", "alpha"]);
    }

    #[test]
    fn test_reserved_attribute_names() {
        let mut graph = Graph::new();
        let node = graph.create_node("alpha", Family::Default);
        assert_eq!(
            graph.set_attribute(node, Attribute::new("children", 1)),
            Err(NodeError::NameConflict("children".into()))
        );
    }

    #[test]
    fn test_observable_value_write_queues_change() {
        let mut graph = Graph::new();
        let node = graph.create_node("alpha", Family::Default);
        graph
            .set_attribute(node, Attribute::new("traced", false).with_trigger(true))
            .unwrap();
        graph.set_attribute(node, Attribute::new("silent", 1)).unwrap();

        assert!(graph.set_attribute_value(node, "traced", true).unwrap());
        assert!(!graph.set_attribute_value(node, "traced", true).unwrap());
        assert!(graph.set_attribute_value(node, "silent", 2).unwrap());

        assert_eq!(
            graph.take_pending_changes(),
            vec![GraphChange::AttributeChanged {
                node,
                attribute: "traced".into()
            }]
        );
        assert_eq!(
            graph.attribute(node, "traced").and_then(|a| a.role(ItemRole::Display)),
            Some(&ItemData::from("True"))
        );
    }

    #[test]
    fn test_edit_attribute_checks() {
        let mut graph = Graph::new();
        let node = graph.create_node("alpha", Family::Default);
        graph.set_attribute(node, Attribute::new("traced", false)).unwrap();
        graph
            .set_attribute(node, Attribute::new("locked", 1).with_flags(ItemFlags::new()))
            .unwrap();

        assert!(graph.edit_attribute(node, "traced", ItemRole::Edit, &ItemData::from("True")).unwrap());
        assert_eq!(graph.attribute_value(node, "traced"), Some(&ItemData::Bool(true)));
        assert!(graph.take_pending_changes().is_empty());

        assert_eq!(
            graph.edit_attribute(node, "locked", ItemRole::Edit, &ItemData::Int(2)),
            Err(AttributeError::ReadOnly("locked".into()))
        );
        assert_eq!(
            graph.edit_attribute(node, "traced", ItemRole::Display, &ItemData::from("perhaps")),
            Err(AttributeError::TypeMismatch {
                attribute: "traced".into(),
                expected: "bool",
                got: "string"
            })
        );
        assert_eq!(
            graph.edit_attribute(node, "missing", ItemRole::Edit, &ItemData::Int(2)),
            Err(AttributeError::Unknown("missing".into()))
        );

        assert!(graph
            .edit_attribute(node, "locked", ItemRole::ToolTip, &ItemData::from("fixed"))
            .unwrap());
        assert!(graph.take_pending_changes().is_empty());
    }

    #[test]
    fn test_rename_and_triggers() {
        let mut graph = Graph::new();
        let root = graph.create_node("root", Family::Default);
        let child = graph.create_node("child", Family::Default);
        graph.add_child(root, child).unwrap();
        graph.set_attribute(child, Attribute::new("value", 1)).unwrap();

        graph.enable_triggers(root, true).unwrap();
        assert!(graph.attribute(child, "value").unwrap().trigger());

        assert!(graph.set_name(child, "renamed").unwrap());
        assert!(graph.set_node_role(child, ItemRole::ToolTip, "tip").unwrap());
        assert_eq!(
            graph.take_pending_changes(),
            vec![
                GraphChange::NodeChanged { node: child },
                GraphChange::NodeChanged { node: child }
            ]
        );
        assert_eq!(graph.node(child).unwrap().role(ItemRole::Display), Some(&ItemData::from("renamed")));

        graph.enable_triggers(root, false).unwrap();
        graph.set_name(child, "quiet").unwrap();
        assert!(graph.take_pending_changes().is_empty());
    }
}
