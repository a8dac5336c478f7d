//! Data roles and item data.
//!
//! Roles define what projection of a node or attribute is being requested
//! or set. Each node and attribute carries a role map from [`ItemRole`] to
//! [`ItemData`].

use std::cmp::Ordering;
use std::fmt;

/// Standard roles for accessing different aspects of item data.
///
/// # Standard Roles
///
/// - **Display**: The primary text to show (e.g., node label)
/// - **Decoration**: Icon key to display alongside text
/// - **Edit**: Value for editing (may differ from display text)
/// - **ToolTip**: Text shown when hovering over the item
/// - **StatusTip**: Text shown in the status bar
/// - **WhatsThis**: Extended help text
/// - **User**: Application-specific data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    /// Primary text to display.
    Display,
    /// Icon key for the item.
    Decoration,
    /// Value for editing.
    Edit,
    /// Tooltip text shown on hover.
    ToolTip,
    /// Text shown in status bar when item is selected.
    StatusTip,
    /// Extended "What's This?" help text.
    WhatsThis,
    /// First role available for application-specific data.
    User(u32),
}

impl ItemRole {
    /// Returns `true` if this is a user-defined role.
    #[inline]
    pub fn is_user_role(&self) -> bool {
        matches!(self, ItemRole::User(_))
    }

    /// Returns the numeric value of this role.
    ///
    /// Standard roles have fixed values 0-255.
    /// User roles have values >= 256.
    pub fn value(&self) -> u32 {
        match self {
            ItemRole::Display => 0,
            ItemRole::Decoration => 1,
            ItemRole::Edit => 2,
            ItemRole::ToolTip => 3,
            ItemRole::StatusTip => 4,
            ItemRole::WhatsThis => 5,
            ItemRole::User(n) => 256 + n,
        }
    }

    /// Creates an ItemRole from a numeric value.
    ///
    /// Returns `None` for reserved but undefined role values (6-255).
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(ItemRole::Display),
            1 => Some(ItemRole::Decoration),
            2 => Some(ItemRole::Edit),
            3 => Some(ItemRole::ToolTip),
            4 => Some(ItemRole::StatusTip),
            5 => Some(ItemRole::WhatsThis),
            6..=255 => None,
            n => Some(ItemRole::User(n - 256)),
        }
    }

    /// Whether writes under this role replace the underlying value.
    pub fn is_text_role(&self) -> bool {
        matches!(self, ItemRole::Display | ItemRole::Edit)
    }
}

/// A value held by an attribute or a role map entry.
///
/// # Example
///
/// ```
/// use umbra_core::ItemData;
///
/// let data = ItemData::from("Hello");
/// assert_eq!(data.as_string(), Some("Hello"));
///
/// let traced = ItemData::from(true);
/// assert_eq!(traced.to_string(), "True");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ItemData {
    /// No data.
    #[default]
    None,
    /// String data (for Display, ToolTip, etc.).
    String(String),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// Boolean data.
    Bool(bool),
    /// An ordered list of strings (dependency lists, extensions).
    StringList(Vec<String>),
}

impl ItemData {
    /// Returns `true` if this is `ItemData::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    /// Returns `true` if this contains some data.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Attempts to get the data as a string slice.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ItemData::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an owned string.
    pub fn into_string(self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the data as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ItemData::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ItemData::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ItemData::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the data as a list of strings.
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            ItemData::StringList(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Name of the held variant, used in type mismatch reports.
    pub fn type_name(&self) -> &'static str {
        match self {
            ItemData::None => "none",
            ItemData::String(_) => "string",
            ItemData::Int(_) => "int",
            ItemData::Float(_) => "float",
            ItemData::Bool(_) => "bool",
            ItemData::StringList(_) => "string list",
        }
    }

    /// Converts this value into the variant held by `template`.
    ///
    /// Strings are parsed into the template's type, booleans accept
    /// `true`/`false`/`1`/`0` in any case, and lists are split on commas.
    /// Returns `None` when the conversion is not possible.
    pub fn coerce_to(&self, template: &ItemData) -> Option<ItemData> {
        if std::mem::discriminant(self) == std::mem::discriminant(template)
            || template.is_none()
        {
            return Some(self.clone());
        }

        match (template, self) {
            (ItemData::String(_), value) => Some(ItemData::String(value.to_string())),
            (ItemData::Bool(_), ItemData::String(s)) => parse_bool(s).map(ItemData::Bool),
            (ItemData::Bool(_), ItemData::Int(n)) => Some(ItemData::Bool(*n != 0)),
            (ItemData::Int(_), ItemData::String(s)) => s.trim().parse().ok().map(ItemData::Int),
            (ItemData::Int(_), ItemData::Bool(b)) => Some(ItemData::Int(i64::from(*b))),
            (ItemData::Float(_), ItemData::String(s)) => {
                s.trim().parse().ok().map(ItemData::Float)
            }
            (ItemData::Float(_), ItemData::Int(n)) => Some(ItemData::Float(*n as f64)),
            (ItemData::StringList(_), ItemData::String(s)) => Some(ItemData::StringList(
                s.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(String::from)
                    .collect(),
            )),
            _ => None,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

impl fmt::Display for ItemData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemData::None => Ok(()),
            ItemData::String(s) => f.write_str(s),
            ItemData::Int(n) => write!(f, "{n}"),
            ItemData::Float(n) => write!(f, "{n}"),
            ItemData::Bool(true) => f.write_str("True"),
            ItemData::Bool(false) => f.write_str("False"),
            ItemData::StringList(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// Compares two ItemData values for sorting.
///
/// Values of the same variant compare naturally, `None` sorts first, and
/// mixed variants fall back to their display text.
pub fn compare_item_data(a: &ItemData, b: &ItemData) -> Ordering {
    match (a, b) {
        (ItemData::None, ItemData::None) => Ordering::Equal,
        (ItemData::None, _) => Ordering::Less,
        (_, ItemData::None) => Ordering::Greater,
        (ItemData::String(sa), ItemData::String(sb)) => sa.cmp(sb),
        (ItemData::Int(ia), ItemData::Int(ib)) => ia.cmp(ib),
        (ItemData::Float(fa), ItemData::Float(fb)) => fa.partial_cmp(fb).unwrap_or(Ordering::Equal),
        (ItemData::Bool(ba), ItemData::Bool(bb)) => ba.cmp(bb),
        (ItemData::StringList(la), ItemData::StringList(lb)) => la.cmp(lb),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

impl From<String> for ItemData {
    fn from(s: String) -> Self {
        ItemData::String(s)
    }
}

impl From<&str> for ItemData {
    fn from(s: &str) -> Self {
        ItemData::String(s.to_string())
    }
}

impl From<i64> for ItemData {
    fn from(n: i64) -> Self {
        ItemData::Int(n)
    }
}

impl From<i32> for ItemData {
    fn from(n: i32) -> Self {
        ItemData::Int(n as i64)
    }
}

impl From<f64> for ItemData {
    fn from(n: f64) -> Self {
        ItemData::Float(n)
    }
}

impl From<bool> for ItemData {
    fn from(b: bool) -> Self {
        ItemData::Bool(b)
    }
}

impl From<Vec<String>> for ItemData {
    fn from(items: Vec<String>) -> Self {
        ItemData::StringList(items)
    }
}

impl From<Option<String>> for ItemData {
    fn from(opt: Option<String>) -> Self {
        match opt {
            Some(s) => ItemData::String(s),
            None => ItemData::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_role_values() {
        assert_eq!(ItemRole::Display.value(), 0);
        assert_eq!(ItemRole::Decoration.value(), 1);
        assert_eq!(ItemRole::User(0).value(), 256);
        assert_eq!(ItemRole::User(10).value(), 266);
    }

    #[test]
    fn test_item_role_from_value() {
        assert_eq!(ItemRole::from_value(0), Some(ItemRole::Display));
        assert_eq!(ItemRole::from_value(3), Some(ItemRole::ToolTip));
        assert_eq!(ItemRole::from_value(256), Some(ItemRole::User(0)));
        assert_eq!(ItemRole::from_value(100), None);
    }

    #[test]
    fn test_bool_display_text() {
        assert_eq!(ItemData::from(true).to_string(), "True");
        assert_eq!(ItemData::from(false).to_string(), "False");
        assert_eq!(ItemData::None.to_string(), "");
    }

    #[test]
    fn test_coerce_string_into_template() {
        let template = ItemData::Bool(false);
        assert_eq!(
            ItemData::from("True").coerce_to(&template),
            Some(ItemData::Bool(true))
        );
        assert_eq!(ItemData::from("maybe").coerce_to(&template), None);

        assert_eq!(
            ItemData::from(" 12 ").coerce_to(&ItemData::Int(0)),
            Some(ItemData::Int(12))
        );
        assert_eq!(
            ItemData::from("a, b,").coerce_to(&ItemData::StringList(Vec::new())),
            Some(ItemData::StringList(vec!["a".into(), "b".into()]))
        );
        assert_eq!(
            ItemData::Int(3).coerce_to(&ItemData::from("")),
            Some(ItemData::from("3"))
        );
    }

    #[test]
    fn test_compare_item_data() {
        assert_eq!(
            compare_item_data(&ItemData::from("alpha"), &ItemData::from("beta")),
            Ordering::Less
        );
        assert_eq!(
            compare_item_data(&ItemData::Int(2), &ItemData::Int(10)),
            Ordering::Less
        );
        assert_eq!(
            compare_item_data(&ItemData::None, &ItemData::Bool(false)),
            Ordering::Less
        );
    }
}
