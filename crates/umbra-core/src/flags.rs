//! Item flags.

/// Flags indicating what operations are allowed on a node or attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    /// Item can be selected.
    pub selectable: bool,
    /// Item can be edited.
    pub editable: bool,
    /// Item can be dragged.
    pub drag_enabled: bool,
    /// Item is enabled (can interact).
    pub enabled: bool,
}

impl ItemFlags {
    /// Creates flags with all defaults (selectable and enabled only).
    pub fn new() -> Self {
        Self {
            selectable: true,
            enabled: true,
            ..Default::default()
        }
    }

    /// Creates flags for a disabled item.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Creates flags for an editable item.
    pub fn editable() -> Self {
        Self {
            selectable: true,
            editable: true,
            enabled: true,
            ..Default::default()
        }
    }

    /// Sets the selectable flag.
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Sets the editable flag.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the drag enabled flag.
    pub fn with_drag(mut self, enabled: bool) -> Self {
        self.drag_enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_flags() {
        let flags = ItemFlags::new();
        assert!(flags.selectable);
        assert!(flags.enabled);
        assert!(!flags.editable);
        assert!(!flags.drag_enabled);

        let editable = ItemFlags::editable().with_drag(true);
        assert!(editable.editable);
        assert!(editable.drag_enabled);
        assert!(!ItemFlags::disabled().enabled);
    }
}
