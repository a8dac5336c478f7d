//! Block-by-block syntax highlighting.
//!
//! A block is one line (or paragraph) of a document. Highlighting a block
//! takes the state the previous block ended in and returns the format spans
//! of the block together with the state the next block starts in. State `0`
//! is outside every multi-line construct; state `k` is inside the construct
//! of the `k`-th multi-line rule pair.

use std::sync::Arc;

use regex::Match;
use umbra_core::PerfSpan;
use umbra_core::logging::{span_names, targets};

use super::format::Format;
use super::rules::{MultiLineRule, RuleSet};
use super::theme::Theme;

/// A formatted run of characters.
///
/// Offsets and lengths count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub offset: usize,
    pub length: usize,
    pub format: Format,
}

impl HighlightSpan {
    pub fn new(offset: usize, length: usize, format: Format) -> Self {
        Self { offset, length, format }
    }

    /// Offset one past the last character.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// The spans of one block and the state it ends in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockHighlight {
    pub spans: Vec<HighlightSpan>,
    pub state: u32,
}

/// Per-character formats of a block, last writer wins.
struct Paint<'t> {
    text: &'t str,
    char_starts: Vec<usize>,
    cells: Vec<Option<Format>>,
}

impl<'t> Paint<'t> {
    fn new(text: &'t str) -> Self {
        let char_starts: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
        let cells = vec![None; char_starts.len()];
        Self {
            text,
            char_starts,
            cells,
        }
    }

    fn char_offset(&self, byte: usize) -> usize {
        self.char_starts.partition_point(|&start| start < byte)
    }

    fn paint(&mut self, bytes: std::ops::Range<usize>, format: Format) {
        let first = self.char_offset(bytes.start);
        let last = self.char_offset(bytes.end);
        for cell in &mut self.cells[first..last] {
            *cell = Some(format);
        }
    }

    fn next_boundary(&self, byte: usize) -> usize {
        self.text[byte..]
            .chars()
            .next()
            .map_or(self.text.len(), |c| byte + c.len_utf8())
    }

    fn into_spans(self) -> Vec<HighlightSpan> {
        let mut spans: Vec<HighlightSpan> = Vec::new();
        for (offset, cell) in self.cells.into_iter().enumerate() {
            let Some(format) = cell else {
                continue;
            };
            match spans.last_mut() {
                Some(last) if last.end() == offset && last.format == format => last.length += 1,
                _ => spans.push(HighlightSpan::new(offset, 1, format)),
            }
        }
        spans
    }
}

/// Applies a [`RuleSet`] with the formats of a [`Theme`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use umbra::highlight::{Highlighter, RuleSet, default_theme};
///
/// let rules = RuleSet::new([
///     ("keyword", r"\bdef\b"),
///     ("comment.block.start", "\"\"\""),
///     ("comment.block.end", "\"\"\""),
/// ])
/// .unwrap();
/// let highlighter = Highlighter::new(rules, Arc::new(default_theme()));
///
/// let first = highlighter.highlight_block("def f(): \"\"\"doc", 0);
/// assert_eq!(first.spans[0].offset, 0);
/// assert_eq!(first.spans[0].length, 3);
/// assert_eq!(first.state, 1);
///
/// let second = highlighter.highlight_block("still doc\"\"\" x", first.state);
/// assert_eq!(second.spans[0].offset, 0);
/// assert_eq!(second.spans[0].length, 12);
/// assert_eq!(second.state, 0);
/// ```
#[derive(Clone)]
pub struct Highlighter {
    rules: RuleSet,
    theme: Arc<Theme>,
}

impl Highlighter {
    pub fn new(rules: RuleSet, theme: Arc<Theme>) -> Self {
        Self { rules, theme }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn theme(&self) -> &Arc<Theme> {
        &self.theme
    }

    /// Swaps the theme; spans of later blocks use the new formats.
    pub fn set_theme(&mut self, theme: Arc<Theme>) {
        self.theme = theme;
    }

    fn construct_format(&self, pair: &MultiLineRule) -> Format {
        self.theme.resolve(self.rules.rules()[pair.start].scope())
    }

    /// Byte end of the construct opened at `begin`, and whether it closes
    /// inside the block. The end pattern is searched from `search_from`.
    fn construct_end(&self, text: &str, pair: &MultiLineRule, search_from: usize) -> (usize, bool) {
        match self.rules.rules()[pair.end].regex().find_at(text, search_from) {
            Some(end) => (end.end(), true),
            None => (text.len(), false),
        }
    }

    fn next_start<'t>(&self, text: &'t str, cursor: usize) -> Option<(Match<'t>, &MultiLineRule)> {
        self.rules
            .multi_line()
            .iter()
            .filter_map(|pair| {
                self.rules.rules()[pair.start]
                    .regex()
                    .find_at(text, cursor)
                    .map(|found| (found, pair))
            })
            .min_by_key(|(found, pair)| (found.start(), pair.state))
    }

    /// Highlights one block, given the state the previous block ended in.
    ///
    /// Unknown states are treated as `0`.
    #[tracing::instrument(skip(self, text), target = "umbra::highlight", level = "trace")]
    pub fn highlight_block(&self, text: &str, previous_state: u32) -> BlockHighlight {
        let mut paint = Paint::new(text);

        for (index, rule) in self.rules.rules().iter().enumerate() {
            if self.rules.is_multi_line(index) {
                continue;
            }
            let format = self.theme.resolve(rule.scope());
            for found in rule.regex().find_iter(text) {
                paint.paint(found.range(), format);
            }
        }

        let mut state = 0;
        let mut cursor = 0;
        let carried = self
            .rules
            .multi_line()
            .iter()
            .find(|pair| previous_state != 0 && pair.state == previous_state);
        if let Some(pair) = carried {
            let (end, closed) = self.construct_end(text, pair, 0);
            paint.paint(0..end, self.construct_format(pair));
            if !closed {
                state = pair.state;
            }
            cursor = end;
        }

        while state == 0 && cursor < text.len() {
            let Some((start, pair)) = self.next_start(text, cursor) else {
                break;
            };
            let (end, closed) = self.construct_end(text, pair, start.end());
            paint.paint(start.start()..end, self.construct_format(pair));
            if !closed {
                state = pair.state;
            }
            cursor = if end > cursor { end } else { paint.next_boundary(cursor) };
        }

        let spans = paint.into_spans();
        tracing::trace!(target: targets::HIGHLIGHT, spans = spans.len(), state, "block highlighted");
        BlockHighlight { spans, state }
    }

    /// Highlights consecutive blocks, threading the state from each block
    /// into the next. The first block starts in state `0`.
    pub fn highlight_document<'a>(&self, blocks: impl IntoIterator<Item = &'a str>) -> Vec<BlockHighlight> {
        let _perf = PerfSpan::new(span_names::HIGHLIGHT_DOCUMENT);
        let mut state = 0;
        blocks
            .into_iter()
            .map(|block| {
                let highlight = self.highlight_block(block, state);
                state = highlight.state;
                highlight
            })
            .collect()
    }
}
