//! Regex driven syntax highlighting.
//!
//! - [`Theme`]: scope tree of [`Format`] records
//! - [`RuleSet`]: ordered `(scope, pattern)` rules with multi-line pairs
//! - [`Highlighter`]: turns blocks of text into [`HighlightSpan`]s
//! - [`Language`]: grammar manifests producing ready highlighters
//!
//! # Example
//!
//! ```
//! use umbra::highlight::Language;
//!
//! let highlighter = Language::python().unwrap().highlighter().unwrap();
//! let blocks = highlighter.highlight_document([
//!     "def greet(name):",
//!     "    \"\"\"Says hello.",
//!     "    \"\"\"",
//!     "    print('hello', name)",
//! ]);
//! assert_eq!(blocks[1].state, 1);
//! assert_eq!(blocks[2].state, 0);
//! ```

mod format;
mod grammar;
mod highlighter;
mod rules;
mod theme;

pub use format::{Color, Format};
pub use grammar::{GRAMMAR_EXTENSION, Language, Syntax, TOKENS_PLACEHOLDER, language_for_file};
pub use highlighter::{BlockHighlight, HighlightSpan, Highlighter};
pub use rules::{MultiLineRule, Rule, RuleSet};
pub use theme::{Theme, builtin_theme, default_theme, logging_theme};
