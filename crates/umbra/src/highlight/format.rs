//! Text format records used by themes.

use std::fmt;
use std::str::FromStr;

use umbra_core::{Attribute, Graph, ItemData, NodeId, NodeResult};

use crate::error::HighlightError;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Create a color from 8-bit components.
    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A gray with all components set to `value`.
    #[inline]
    pub const fn gray(value: u8) -> Self {
        Self::from_rgb8(value, value, value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = HighlightError;

    /// Parses `rgb(r, g, b)` or a bare `r, g, b` triple.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(s);
        let components = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| HighlightError::grammar(format!("invalid color '{s}': {e}")))?;
        match components.as_slice() {
            [r, g, b] => Ok(Self::from_rgb8(*r, *g, *b)),
            _ => Err(HighlightError::grammar(format!("invalid color '{s}'"))),
        }
    }
}

const FOREGROUND: &str = "foreground";
const BACKGROUND: &str = "background";
const WEIGHT: &str = "weight";
const ITALIC: &str = "italic";
const POINT_SIZE: &str = "point_size";

/// A text format with optional fields.
///
/// Unset fields are inherited from the enclosing scope when resolved
/// through a [`Theme`](super::Theme).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Format {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub weight: Option<u16>,
    pub italic: Option<bool>,
    pub point_size: Option<u16>,
}

impl Format {
    /// An empty format.
    pub const fn new() -> Self {
        Self {
            foreground: None,
            background: None,
            weight: None,
            italic: None,
            point_size: None,
        }
    }

    pub fn with_foreground(mut self, color: Color) -> Self {
        self.foreground = Some(color);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_point_size(mut self, point_size: u16) -> Self {
        self.point_size = Some(point_size);
        self
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::new()
    }

    /// Fills every unset field from `parent`.
    pub fn inherit(self, parent: &Format) -> Format {
        Format {
            foreground: self.foreground.or(parent.foreground),
            background: self.background.or(parent.background),
            weight: self.weight.or(parent.weight),
            italic: self.italic.or(parent.italic),
            point_size: self.point_size.or(parent.point_size),
        }
    }

    /// Writes the set fields as attributes of `node`, removing unset ones.
    pub(crate) fn store(&self, graph: &mut Graph, node: NodeId) -> NodeResult<()> {
        let colors = [(FOREGROUND, self.foreground), (BACKGROUND, self.background)];
        for (name, color) in colors {
            match color {
                Some(color) => {
                    graph.set_attribute(node, Attribute::new(name, color.to_string()))?;
                }
                None => {
                    graph.remove_attribute(node, name);
                }
            }
        }
        let numbers = [(WEIGHT, self.weight), (POINT_SIZE, self.point_size)];
        for (name, number) in numbers {
            match number {
                Some(number) => {
                    graph.set_attribute(node, Attribute::new(name, i64::from(number)))?;
                }
                None => {
                    graph.remove_attribute(node, name);
                }
            }
        }
        match self.italic {
            Some(italic) => {
                graph.set_attribute(node, Attribute::new(ITALIC, italic))?;
            }
            None => {
                graph.remove_attribute(node, ITALIC);
            }
        }
        Ok(())
    }

    /// Reads the format stored on `node`; unreadable fields stay unset.
    pub(crate) fn load(graph: &Graph, node: NodeId) -> Format {
        let color = |name| {
            graph
                .attribute_value(node, name)
                .and_then(ItemData::as_string)
                .and_then(|text| text.parse().ok())
        };
        let number = |name| {
            graph
                .attribute_value(node, name)
                .and_then(ItemData::as_int)
                .and_then(|value| u16::try_from(value).ok())
        };
        Format {
            foreground: color(FOREGROUND),
            background: color(BACKGROUND),
            weight: number(WEIGHT),
            italic: graph.attribute_value(node, ITALIC).and_then(ItemData::as_bool),
            point_size: number(POINT_SIZE),
        }
    }
}
