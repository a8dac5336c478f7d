//! Ordered highlighting rules.

use regex::Regex;

use crate::error::{HighlightError, HighlightResult};

const START_SUFFIX: &str = ".start";
const END_SUFFIX: &str = ".end";

/// A scope paired with its compiled pattern.
#[derive(Debug, Clone)]
pub struct Rule {
    scope: String,
    regex: Regex,
}

impl Rule {
    /// Compiles `pattern` for `scope`.
    pub fn new(scope: impl Into<String>, pattern: &str) -> HighlightResult<Self> {
        let scope = scope.into();
        let regex = Regex::new(pattern).map_err(|e| HighlightError::regex(scope.clone(), e))?;
        Ok(Self { scope, regex })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// A multi-line construct formed by a `.start` rule and its `.end` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiLineRule {
    /// Block state carried while inside the construct, starting at 1.
    pub state: u32,
    /// Position of the `.start` rule.
    pub start: usize,
    /// Position of the `.end` rule.
    pub end: usize,
}

/// Rules in application order, with their multi-line pairs.
///
/// # Example
///
/// ```
/// use umbra::highlight::RuleSet;
///
/// let rules = RuleSet::new([
///     ("keyword", r"\b(def|class)\b"),
///     ("comment.block.start", r#"""""#),
///     ("comment.block.end", r#"""""#),
/// ])
/// .unwrap();
/// assert_eq!(rules.len(), 3);
/// assert_eq!(rules.multi_line().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    multi_line: Vec<MultiLineRule>,
}

impl RuleSet {
    /// Compiles `(scope, pattern)` pairs, failing on the first bad pattern.
    pub fn new<'a>(rules: impl IntoIterator<Item = (&'a str, &'a str)>) -> HighlightResult<Self> {
        let rules = rules
            .into_iter()
            .map(|(scope, pattern)| Rule::new(scope, pattern))
            .collect::<HighlightResult<Vec<_>>>()?;
        Ok(Self::from_rules(rules))
    }

    /// Builds a rule set from compiled rules.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        let mut multi_line = Vec::new();
        for (start, rule) in rules.iter().enumerate() {
            let Some(prefix) = rule.scope.strip_suffix(START_SUFFIX) else {
                continue;
            };
            let end_scope = format!("{prefix}{END_SUFFIX}");
            if let Some(end) = rules.iter().position(|candidate| candidate.scope == end_scope) {
                multi_line.push(MultiLineRule {
                    state: multi_line.len() as u32 + 1,
                    start,
                    end,
                });
            }
        }
        Self { rules, multi_line }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Multi-line pairs, by ascending state.
    pub fn multi_line(&self) -> &[MultiLineRule] {
        &self.multi_line
    }

    /// Whether the rule at `index` belongs to a multi-line pair.
    pub fn is_multi_line(&self, index: usize) -> bool {
        self.multi_line
            .iter()
            .any(|pair| pair.start == index || pair.end == index)
    }
}
