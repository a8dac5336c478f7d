//! Core traits for the graph models.
//!
//! This module defines the view-agnostic contract every model exposes and
//! the signals views connect to.

use umbra_core::{ItemData, ItemFlags, ItemRole, Signal};

use super::index::ModelIndex;

/// The contract views use to query and edit a model.
///
/// # Implementation Requirements
///
/// At minimum, implement:
/// - [`row_count`](ItemModel::row_count) - Number of rows under a parent
/// - [`column_count`](ItemModel::column_count) - Number of columns
/// - [`data`](ItemModel::data) - Data for a given index and role
/// - [`index`](ItemModel::index) - Create an index for a position
/// - [`parent`](ItemModel::parent) - Get the parent of an index
///
/// Editable models also implement [`set_data`](ItemModel::set_data) and
/// [`flags`](ItemModel::flags).
pub trait ItemModel: Send + Sync {
    /// Returns the number of rows under the given parent.
    ///
    /// An invalid parent stands for the model root.
    fn row_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the number of columns.
    fn column_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the data stored under the given role for the item at index.
    ///
    /// Returns `ItemData::None` for invalid indices and absent roles.
    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData;

    /// Creates a model index for the given row and column under parent.
    ///
    /// Returns `ModelIndex::invalid()` if the position is out of bounds.
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex;

    /// Returns the parent of the given index, invalid for top-level rows.
    fn parent(&self, index: &ModelIndex) -> ModelIndex;

    /// Returns the signals for this model.
    fn signals(&self) -> &ModelSignals;

    /// Sets the data for the given index and role.
    ///
    /// Returns `true` if the data was set. Implementations emit
    /// `data_changed` after a successful write. The default is read-only.
    fn set_data(&self, _index: &ModelIndex, _value: ItemData, _role: ItemRole) -> bool {
        false
    }

    /// Returns the flags for the item at the given index.
    fn flags(&self, _index: &ModelIndex) -> ItemFlags {
        ItemFlags::new()
    }

    /// Returns `true` if the item at parent has any children.
    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    /// Returns header data for the given section.
    fn header_data(&self, _section: usize, _orientation: Orientation, _role: ItemRole) -> ItemData {
        ItemData::None
    }

    /// Returns the display text for an item.
    fn display_text(&self, index: &ModelIndex) -> Option<String> {
        self.data(index, ItemRole::Display).into_string()
    }

    /// Creates a sibling index at the given row and column.
    fn sibling(&self, index: &ModelIndex, row: usize, column: usize) -> ModelIndex {
        if !index.is_valid() {
            return ModelIndex::invalid();
        }
        self.index(row, column, &index.parent())
    }
}

/// Header orientation for `header_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Sort direction for model sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Whether the order reverses the natural comparison.
    pub fn is_descending(self) -> bool {
        self == SortOrder::Descending
    }
}

/// Collection of signals emitted by item models.
///
/// - **Before modifications**: `rows_about_to_be_*`, `layout_about_to_change`
///   or `model_about_to_reset`
/// - **After modifications**: `rows_*`, `layout_changed` or `model_reset`
/// - **Value changes**: `data_changed`
pub struct ModelSignals {
    /// Args: (parent index, first row, last row)
    pub rows_about_to_be_inserted: Signal<(ModelIndex, usize, usize)>,
    /// Args: (parent index, first row, last row)
    pub rows_inserted: Signal<(ModelIndex, usize, usize)>,
    /// Args: (parent index, first row, last row)
    pub rows_about_to_be_removed: Signal<(ModelIndex, usize, usize)>,
    /// Args: (parent index, first row, last row)
    pub rows_removed: Signal<(ModelIndex, usize, usize)>,

    /// Args: (top-left index, bottom-right index, changed roles)
    pub data_changed: Signal<(ModelIndex, ModelIndex, Vec<ItemRole>)>,

    /// Emitted before a layout change such as filtering.
    pub layout_about_to_change: Signal<()>,
    pub layout_changed: Signal<()>,

    /// Emitted before the model is reset, e.g. by sorting.
    pub model_about_to_reset: Signal<()>,
    pub model_reset: Signal<()>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSignals {
    /// Creates a new set of model signals.
    pub fn new() -> Self {
        Self {
            rows_about_to_be_inserted: Signal::new(),
            rows_inserted: Signal::new(),
            rows_about_to_be_removed: Signal::new(),
            rows_removed: Signal::new(),
            data_changed: Signal::new(),
            layout_about_to_change: Signal::new(),
            layout_changed: Signal::new(),
            model_about_to_reset: Signal::new(),
            model_reset: Signal::new(),
        }
    }

    /// Emits signals for row insertion around `insert_fn`.
    pub fn emit_rows_inserted<F, R>(&self, parent: ModelIndex, first: usize, last: usize, insert_fn: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.rows_about_to_be_inserted.emit((parent.clone(), first, last));
        let result = insert_fn();
        self.rows_inserted.emit((parent, first, last));
        result
    }

    /// Emits signals for row removal around `remove_fn`.
    pub fn emit_rows_removed<F, R>(&self, parent: ModelIndex, first: usize, last: usize, remove_fn: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.rows_about_to_be_removed.emit((parent.clone(), first, last));
        let result = remove_fn();
        self.rows_removed.emit((parent, first, last));
        result
    }

    /// Emits the data_changed signal for a single item.
    pub fn emit_data_changed_single(&self, index: ModelIndex, roles: Vec<ItemRole>) {
        self.data_changed.emit((index.clone(), index, roles));
    }

    /// Emits signals for a model reset around `reset_fn`.
    pub fn emit_reset<F, R>(&self, reset_fn: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.model_about_to_reset.emit(());
        let result = reset_fn();
        self.model_reset.emit(());
        result
    }

    /// Emits signals for a layout change around `change_fn`.
    pub fn emit_layout_changed<F, R>(&self, change_fn: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.layout_about_to_change.emit(());
        let result = change_fn();
        self.layout_changed.emit(());
        result
    }
}
