//! Grammar manifests describing languages.
//!
//! A grammar is an INI document:
//!
//! ```ini
//! [Language]
//! Name = Python
//! Extensions = \.py$|\.pyw$
//!
//! [Accelerators]
//! Theme = DefaultTheme
//!
//! [Syntax]
//! CommentMarker = #
//!
//! [Tokens]
//! keyword = def|class
//!
//! [Rules]
//! keyword = \b(@Tokens)\b
//! ```
//!
//! `@Tokens` in a rule is replaced by the `|`-joined tokens of the same
//! scope before the pattern is compiled.

use std::sync::Arc;

use indexmap::IndexMap;
use ini::{Ini, ParseOption};
use regex::Regex;
use umbra_core::logging::targets;

use super::highlighter::Highlighter;
use super::rules::{Rule, RuleSet};
use super::theme::{Theme, builtin_theme, default_theme};
use crate::error::{HighlightError, HighlightResult};
use crate::file::ResourceResolver;

/// Placeholder substituted by the tokens of a rule's scope.
pub const TOKENS_PLACEHOLDER: &str = "@Tokens";

/// Extension of grammar files.
pub const GRAMMAR_EXTENSION: &str = "grc";

const PYTHON_GRAMMAR: &str = include_str!("../../resources/grammars/Python.grc");
const LOGGING_GRAMMAR: &str = include_str!("../../resources/grammars/Logging.grc");
const TEXT_GRAMMAR: &str = include_str!("../../resources/grammars/Text.grc");

/// Editing syntax of a language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Syntax {
    pub indent_marker: String,
    pub comment_marker: Option<String>,
    pub comment_block_marker_start: Option<String>,
    pub comment_block_marker_end: Option<String>,
    pub symbols_pairs: Vec<String>,
    pub indentation_symbols: Vec<String>,
}

/// A parsed grammar.
///
/// # Example
///
/// ```
/// use umbra::highlight::Language;
///
/// let python = Language::python().unwrap();
/// assert!(python.matches("setup.py"));
///
/// let highlighter = python.highlighter().unwrap();
/// let block = highlighter.highlight_block("def main():", 0);
/// assert!(!block.spans.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Language {
    name: String,
    extensions: Regex,
    accelerators: IndexMap<String, String>,
    syntax: Syntax,
    tokens: IndexMap<String, Vec<String>>,
    rules: Vec<(String, String)>,
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl Language {
    /// Parses a grammar document.
    pub fn parse(content: &str) -> HighlightResult<Self> {
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, options)
            .map_err(|e| HighlightError::grammar(e.to_string()))?;

        let name = non_empty(ini.get_from(Some("Language"), "Name"))
            .ok_or_else(|| HighlightError::grammar("missing [Language] Name"))?;
        let extensions = non_empty(ini.get_from(Some("Language"), "Extensions"))
            .ok_or_else(|| HighlightError::grammar(format!("'{name}' grammar has no [Language] Extensions")))?;
        let extensions = Regex::new(&extensions).map_err(|e| HighlightError::regex("Extensions", e))?;

        let section = |section: &str| -> IndexMap<String, String> {
            ini.section(Some(section))
                .map(|properties| {
                    properties
                        .iter()
                        .map(|(key, value)| (key.to_string(), value.trim().to_string()))
                        .collect()
                })
                .unwrap_or_default()
        };

        let accelerators = section("Accelerators");
        let syntax_section = section("Syntax");
        let syntax_value = |key: &str| non_empty(syntax_section.get(key).map(String::as_str));
        let syntax = Syntax {
            indent_marker: syntax_value("IndentMarker")
                .map(|marker| marker.replace("\\t", "\t"))
                .unwrap_or_else(|| "\t".to_string()),
            comment_marker: syntax_value("CommentMarker"),
            comment_block_marker_start: syntax_value("CommentBlockMarkerStart"),
            comment_block_marker_end: syntax_value("CommentBlockMarkerEnd"),
            symbols_pairs: syntax_value("SymbolsPairs").as_deref().map(split_list).unwrap_or_default(),
            indentation_symbols: syntax_value("IndentationSymbols")
                .as_deref()
                .map(split_list)
                .unwrap_or_default(),
        };

        let tokens = section("Tokens")
            .into_iter()
            .map(|(scope, value)| (scope, split_list(&value)))
            .collect();
        let rules = section("Rules").into_iter().collect();

        tracing::debug!(target: targets::HIGHLIGHT, name, "grammar parsed");
        Ok(Self {
            name,
            extensions,
            accelerators,
            syntax,
            tokens,
            rules,
        })
    }

    /// Loads the grammar file `name` through `resolver`.
    pub fn load(resolver: &ResourceResolver, name: &str) -> HighlightResult<Self> {
        let content = resolver.load_text(name)?;
        Self::parse(&content)
    }

    /// Loads every grammar file found by `resolver`, skipping invalid ones.
    pub fn load_all(resolver: &ResourceResolver) -> Vec<Self> {
        resolver
            .list(GRAMMAR_EXTENSION)
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy().into_owned();
                match Self::load(resolver, &name) {
                    Ok(language) => Some(language),
                    Err(error) => {
                        tracing::warn!(target: targets::HIGHLIGHT, %error, grammar = %name, "skipping grammar");
                        None
                    }
                }
            })
            .collect()
    }

    /// The built-in Python grammar.
    pub fn python() -> HighlightResult<Self> {
        Self::parse(PYTHON_GRAMMAR)
    }

    /// The built-in grammar for log files.
    pub fn logging() -> HighlightResult<Self> {
        Self::parse(LOGGING_GRAMMAR)
    }

    /// The built-in plain text grammar.
    pub fn text() -> HighlightResult<Self> {
        Self::parse(TEXT_GRAMMAR)
    }

    /// Every built-in grammar.
    pub fn builtins() -> HighlightResult<Vec<Self>> {
        Ok(vec![Self::python()?, Self::logging()?, Self::text()?])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pattern matching the file names of the language.
    pub fn extensions(&self) -> &Regex {
        &self.extensions
    }

    /// Whether `file_name` belongs to the language.
    pub fn matches(&self, file_name: &str) -> bool {
        self.extensions.is_match(file_name)
    }

    /// An `[Accelerators]` entry, `None` when absent or empty.
    pub fn accelerator(&self, key: &str) -> Option<&str> {
        self.accelerators
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// A `|`-separated `[Accelerators]` entry as a list.
    pub fn accelerator_list(&self, key: &str) -> Vec<String> {
        self.accelerator(key).map(split_list).unwrap_or_default()
    }

    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    /// Tokens of `scope`.
    pub fn tokens(&self, scope: &str) -> &[String] {
        self.tokens.get(scope).map_or(&[], Vec::as_slice)
    }

    /// Rule patterns as written, before substitution.
    pub fn raw_rules(&self) -> &[(String, String)] {
        &self.rules
    }

    /// Compiles the rules, substituting `@Tokens`.
    pub fn rule_set(&self) -> HighlightResult<RuleSet> {
        let rules = self
            .rules
            .iter()
            .map(|(scope, pattern)| {
                let pattern = if pattern.contains(TOKENS_PLACEHOLDER) {
                    pattern.replace(TOKENS_PLACEHOLDER, &self.tokens(scope).join("|"))
                } else {
                    pattern.clone()
                };
                Rule::new(scope.as_str(), &pattern)
            })
            .collect::<HighlightResult<Vec<_>>>()?;
        Ok(RuleSet::from_rules(rules))
    }

    /// The theme named by `[Accelerators] Theme`, the default theme otherwise.
    pub fn theme(&self) -> Theme {
        match self.accelerator("Theme") {
            Some(name) => builtin_theme(name).unwrap_or_else(|| {
                tracing::warn!(target: targets::HIGHLIGHT, theme = name, language = %self.name, "unknown theme");
                default_theme()
            }),
            None => default_theme(),
        }
    }

    /// A highlighter over the grammar's rules and theme.
    pub fn highlighter(&self) -> HighlightResult<Highlighter> {
        Ok(Highlighter::new(self.rule_set()?, Arc::new(self.theme())))
    }
}

/// The first language of `languages` matching `file_name`.
pub fn language_for_file<'a>(languages: &'a [Language], file_name: &str) -> Option<&'a Language> {
    languages.iter().find(|language| language.matches(file_name))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::highlight::Color;

    const TINY: &str = r"
[Language]
Name = Tiny
Extensions = \.tiny$

[Accelerators]
VisualAccelerators = highlight_current_line|highlight_occurences
Theme = LoggingTheme

[Tokens]
error = FAIL|ABORT

[Rules]
error = \b(@Tokens)\b
";

    #[test]
    fn test_tokens_substitution() {
        let tiny = Language::parse(TINY).unwrap();
        assert_eq!(tiny.tokens("error"), ["FAIL", "ABORT"]);
        let rules = tiny.rule_set().unwrap();
        assert_eq!(rules.rules()[0].regex().as_str(), r"\b(FAIL|ABORT)\b");
        assert_eq!(
            tiny.accelerator_list("VisualAccelerators"),
            ["highlight_current_line", "highlight_occurences"]
        );
    }

    #[test]
    fn test_grammar_theme_is_used() {
        let highlighter = Language::parse(TINY).unwrap().highlighter().unwrap();
        let result = highlighter.highlight_block("step ABORT", 0);
        assert_eq!(result.spans.len(), 1);
        assert_eq!(result.spans[0].offset, 5);
        assert_eq!(result.spans[0].format.foreground, Some(Color::from_rgb8(255, 64, 64)));
    }

    #[test]
    fn test_quotes_and_escapes_kept_verbatim() {
        let grammar = r#"[Language]
Name = Quoted
Extensions = \.q$

[Rules]
string.quoted.double = "[^"\\]*(\\.[^"\\]*)*"
constant.character.escape = \\[nt"']
"#;
        let language = Language::parse(grammar).unwrap();
        assert_eq!(
            language.raw_rules(),
            [
                ("string.quoted.double".to_string(), r#""[^"\\]*(\\.[^"\\]*)*""#.to_string()),
                ("constant.character.escape".to_string(), r#"\\[nt"']"#.to_string()),
            ]
        );
        assert!(language.matches("notes.q"));
        assert!(language.rule_set().is_ok());
    }

    #[test]
    fn test_missing_name_rejected() {
        let error = Language::parse("[Language]\nExtensions = \\.x$\n").unwrap_err();
        assert!(matches!(error, HighlightError::Grammar(_)));
    }

    #[test]
    fn test_bad_rule_rejected() {
        let grammar = "[Language]\nName = Bad\nExtensions = \\.bad$\n[Rules]\nkeyword = (unclosed\n";
        let language = Language::parse(grammar).unwrap();
        assert!(matches!(language.rule_set(), Err(HighlightError::Regex { .. })));
    }

    #[test]
    fn test_builtins() {
        let languages = Language::builtins().unwrap();
        let python = language_for_file(&languages, "main.py").unwrap();
        assert_eq!(python.name(), "Python");
        assert_eq!(python.syntax().comment_marker.as_deref(), Some("#"));
        assert_eq!(python.syntax().comment_block_marker_start.as_deref(), Some("\"\"\""));
        assert_eq!(python.syntax().indent_marker, "\t");
        assert_eq!(python.rule_set().unwrap().multi_line().len(), 1);
        assert_eq!(language_for_file(&languages, "umbra.log").unwrap().name(), "Logging");
        assert!(language_for_file(&languages, "image.png").is_none());
        for language in &languages {
            language.highlighter().unwrap();
        }
    }

    #[test]
    fn test_load_from_resources() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Tiny.grc"), TINY).unwrap();
        fs::write(dir.path().join("Broken.grc"), "[Language]\n").unwrap();
        let resolver = ResourceResolver::with_directories([dir.path()]);

        assert_eq!(Language::load(&resolver, "Tiny.grc").unwrap().name(), "Tiny");
        assert!(matches!(
            Language::load(&resolver, "Missing.grc"),
            Err(HighlightError::Resource(_))
        ));
        let names: Vec<_> = Language::load_all(&resolver)
            .iter()
            .map(|language| language.name().to_string())
            .collect();
        assert_eq!(names, ["Tiny"]);
    }
}
