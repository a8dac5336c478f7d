//! Scope trees mapping dotted scope names to formats.
//!
//! A [`Theme`] keeps its scopes as `Format` family nodes of a node graph,
//! one node per scope segment. Resolving `keyword.operator` walks
//! `keyword` then `operator`, each set field overriding the enclosing one.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use umbra_core::logging::targets;
use umbra_core::{Family, Graph, NodeId, NodeResult};

use super::format::{Color, Format};

/// Scope tree of formats with memoized resolution.
///
/// # Example
///
/// ```
/// use umbra::highlight::{Color, Format, Theme};
///
/// let theme = Theme::new(Format::new().with_foreground(Color::gray(192)));
/// theme.set_format("keyword", Format::new().with_weight(75)).unwrap();
///
/// let format = theme.resolve("keyword.control");
/// assert_eq!(format.weight, Some(75));
/// assert_eq!(format.foreground, Some(Color::gray(192)));
/// ```
pub struct Theme {
    graph: RwLock<Graph>,
    root: NodeId,
    cache: Mutex<HashMap<String, Format>>,
}

impl Theme {
    /// Creates a theme whose root carries `base`.
    pub fn new(base: Format) -> Self {
        let mut graph = Graph::new();
        let root = graph.create_node("", Family::Format);
        if let Err(error) = base.store(&mut graph, root) {
            tracing::warn!(target: targets::HIGHLIGHT, %error, "cannot store base format");
        }
        Self {
            graph: RwLock::new(graph),
            root,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The format applied to unknown scopes.
    pub fn base(&self) -> Format {
        Format::load(&self.graph.read(), self.root)
    }

    fn find_child(graph: &Graph, parent: NodeId, name: &str) -> Option<NodeId> {
        graph
            .children(parent)
            .iter()
            .copied()
            .find(|&child| graph.name(child) == Some(name))
    }

    /// Sets the format of `scope`, creating intermediate scopes.
    pub fn set_format(&self, scope: &str, format: Format) -> NodeResult<()> {
        let mut graph = self.graph.write();
        let mut node = self.root;
        for segment in scope.split('.').filter(|segment| !segment.is_empty()) {
            node = match Self::find_child(&graph, node, segment) {
                Some(child) => child,
                None => {
                    let child = graph.create_node(segment, Family::Format);
                    graph.add_child(node, child)?;
                    child
                }
            };
        }
        format.store(&mut graph, node)?;
        self.cache.lock().clear();
        tracing::trace!(target: targets::HIGHLIGHT, scope, "format set");
        Ok(())
    }

    /// The format stored on `scope` itself, without inheritance.
    pub fn format(&self, scope: &str) -> Option<Format> {
        let graph = self.graph.read();
        let mut node = self.root;
        for segment in scope.split('.').filter(|segment| !segment.is_empty()) {
            node = Self::find_child(&graph, node, segment)?;
        }
        Some(Format::load(&graph, node))
    }

    /// Resolves `scope` to a complete format.
    ///
    /// Walks the scope segments as deep as the tree allows, layering every
    /// format found over the base. Unknown scopes resolve to the base.
    pub fn resolve(&self, scope: &str) -> Format {
        if let Some(format) = self.cache.lock().get(scope) {
            return *format;
        }
        let resolved = {
            let graph = self.graph.read();
            let mut node = self.root;
            let mut format = Format::load(&graph, self.root);
            for segment in scope.split('.').filter(|segment| !segment.is_empty()) {
                let Some(child) = Self::find_child(&graph, node, segment) else {
                    break;
                };
                let own = Format::load(&graph, child);
                if !own.is_empty() {
                    format = own.inherit(&format);
                }
                node = child;
            }
            format
        };
        self.cache.lock().insert(scope.to_string(), resolved);
        resolved
    }

    /// Sorted names of the scopes carrying a format.
    pub fn list_formats(&self) -> Vec<String> {
        let graph = self.graph.read();
        let mut scopes = Vec::new();
        let mut stack: Vec<(NodeId, String)> = graph
            .children(self.root)
            .iter()
            .filter_map(|&child| graph.name(child).map(|name| (child, name.to_string())))
            .collect();
        while let Some((node, scope)) = stack.pop() {
            if !Format::load(&graph, node).is_empty() {
                scopes.push(scope.clone());
            }
            for &child in graph.children(node) {
                if let Some(name) = graph.name(child) {
                    stack.push((child, format!("{scope}.{name}")));
                }
            }
        }
        scopes.sort();
        scopes
    }

    /// Runs `f` over the scope graph and its root node.
    pub fn with_graph<R>(&self, f: impl FnOnce(&Graph, NodeId) -> R) -> R {
        f(&self.graph.read(), self.root)
    }

    /// Builds a theme from `(scope, format)` pairs over `base`.
    pub fn from_formats<'a>(base: Format, formats: impl IntoIterator<Item = (&'a str, Format)>) -> Self {
        let theme = Self::new(base);
        for (scope, format) in formats {
            if let Err(error) = theme.set_format(scope, format) {
                tracing::warn!(target: targets::HIGHLIGHT, scope, %error, "cannot set format");
            }
        }
        theme
    }
}

impl Default for Theme {
    fn default() -> Self {
        default_theme()
    }
}

static_assertions::assert_impl_all!(Theme: Send, Sync);

fn base_format() -> Format {
    Format::new().with_foreground(Color::gray(192))
}

/// The editor theme for source code.
pub fn default_theme() -> Theme {
    let keyword = Color::from_rgb8(205, 170, 105);
    let entity = Color::from_rgb8(115, 135, 175);
    Theme::from_formats(
        base_format(),
        [
            ("default", Format::new().with_background(Color::gray(32))),
            ("comment", Format::new().with_foreground(Color::gray(96))),
            ("comment.block", Format::new().with_foreground(Color::gray(128))),
            ("constant", Format::new().with_foreground(Color::from_rgb8(205, 105, 75))),
            ("entity", Format::new().with_foreground(entity)),
            ("support", Format::new().with_foreground(entity)),
            ("keyword", Format::new().with_foreground(keyword).with_weight(75)),
            ("keyword.operator", Format::new().with_foreground(keyword).with_weight(50)),
            ("storage.type", Format::new().with_weight(75)),
            ("storage.modifier", Format::new().with_italic(true)),
            (
                "string",
                Format::new()
                    .with_foreground(Color::from_rgb8(145, 160, 105))
                    .with_italic(true),
            ),
            ("variable", Format::new().with_italic(true)),
            ("accelerator.line", Format::new().with_background(Color::gray(48))),
            ("accelerator.occurence", Format::new().with_background(Color::gray(64))),
            ("accelerator.pair", Format::new().with_background(Color::gray(64))),
        ],
    )
}

/// The theme for log files.
pub fn logging_theme() -> Theme {
    let red = Color::from_rgb8(255, 64, 64);
    Theme::from_formats(
        base_format(),
        [
            (
                "critical",
                Format::new().with_foreground(Color::gray(48)).with_background(red),
            ),
            ("error", Format::new().with_foreground(red)),
            ("warning", Format::new().with_foreground(Color::from_rgb8(255, 128, 0))),
            ("debug", Format::new().with_italic(true)),
            (
                "trace.in",
                Format::new()
                    .with_foreground(Color::from_rgb8(128, 160, 192))
                    .with_italic(true),
            ),
            (
                "trace.out",
                Format::new()
                    .with_foreground(Color::from_rgb8(192, 160, 128))
                    .with_italic(true),
            ),
        ],
    )
}

/// A built-in theme by its grammar name.
pub fn builtin_theme(name: &str) -> Option<Theme> {
    match name {
        "DefaultTheme" => Some(default_theme()),
        "LoggingTheme" => Some(logging_theme()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_descends_deepest() {
        let theme = default_theme();
        let operator = theme.resolve("keyword.operator.assignment");
        assert_eq!(operator.foreground, Some(Color::from_rgb8(205, 170, 105)));
        assert_eq!(operator.weight, Some(50));
        assert_eq!(theme.resolve("keyword").weight, Some(75));
    }

    #[test]
    fn test_unknown_scope_resolves_to_base() {
        let theme = default_theme();
        assert_eq!(theme.resolve("markup.heading"), theme.base());
        assert_eq!(theme.resolve(""), theme.base());
    }

    #[test]
    fn test_fields_inherit_from_ancestors() {
        let theme = default_theme();
        let block = theme.resolve("comment.block.python");
        assert_eq!(block.foreground, Some(Color::gray(128)));
        let storage = theme.resolve("storage.type");
        assert_eq!(storage.foreground, Some(Color::gray(192)));
        assert_eq!(storage.weight, Some(75));
    }

    #[test]
    fn test_set_format_invalidates_cache() {
        let theme = default_theme();
        assert_eq!(theme.resolve("variable.language").italic, Some(true));
        theme
            .set_format("variable.language", Format::new().with_italic(false))
            .unwrap();
        assert_eq!(theme.resolve("variable.language").italic, Some(false));
    }

    #[test]
    fn test_list_formats_sorted() {
        let theme = logging_theme();
        assert_eq!(
            theme.list_formats(),
            vec!["critical", "debug", "error", "trace.in", "trace.out", "warning"]
        );
        assert!(theme.format("trace").is_some_and(|format| format.is_empty()));
        assert!(theme.format("missing").is_none());
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(builtin_theme("LoggingTheme").is_some());
        assert!(builtin_theme("Solarized").is_none());
    }
}
