//! Inline recognizers and their fixed, ordered composition.
//!
//! The set of recognizers is known when the extractor is built, so there is no
//! registry: [`RecognizerSet::new`] takes the full list once and orders it by
//! priority. Ties keep the order they were listed in.

use std::cmp::Reverse;
use std::fmt;
use std::ops::Range;

use memoindex_core::ParserConfig;

use crate::tags::TagRecognizer;
use crate::tree::{NodeKind, SyntaxNode};

/// A successful match: the node to emit and how many bytes of the line it used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognized {
    pub kind: NodeKind,
    /// Bytes consumed from the start of the line, trigger included
    pub consumed: usize,
}

/// An inline token recognizer triggered by a single character.
pub trait InlineRecognizer: fmt::Debug + Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// The character that makes this recognizer worth asking.
    fn trigger(&self) -> char;

    /// Higher runs first.
    fn priority(&self) -> u16;

    /// Try to recognize a token at the start of `line`.
    ///
    /// `line` begins with the trigger and ends before the next line break.
    /// `prev` is the character right before the cursor in the same text run.
    fn recognize(&self, line: &str, prev: Option<char>) -> Option<Recognized>;
}

/// Ordered list of inline recognizers.
#[derive(Debug)]
pub struct RecognizerSet {
    recognizers: Vec<Box<dyn InlineRecognizer>>,
}

impl RecognizerSet {
    pub fn new(mut recognizers: Vec<Box<dyn InlineRecognizer>>) -> Self {
        recognizers.sort_by_key(|r| Reverse(r.priority()));
        log::debug!(
            "Inline recognizers: {:?}",
            recognizers.iter().map(|r| r.name()).collect::<Vec<_>>()
        );
        Self { recognizers }
    }

    /// The recognizers every extractor runs with.
    pub fn standard(config: &ParserConfig) -> Self {
        Self::new(vec![Box::new(TagRecognizer::new(config.max_tag_length))])
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }

    /// Recognizer names in the order they are tried.
    pub fn names(&self) -> Vec<&'static str> {
        self.recognizers.iter().map(|r| r.name()).collect()
    }

    fn is_trigger(&self, c: char) -> bool {
        self.recognizers.iter().any(|r| r.trigger() == c)
    }

    fn recognize_at(&self, text: &str, pos: usize, trigger: char) -> Option<Recognized> {
        let rest = &text[pos..];
        let line = rest.find(['\n', '\r']).map_or(rest, |end| &rest[..end]);
        let prev = text[..pos].chars().next_back();

        self.recognizers
            .iter()
            .filter(|r| r.trigger() == trigger)
            .find_map(|r| {
                let hit = r.recognize(line, prev)?;
                if hit.consumed == 0 || !line.is_char_boundary(hit.consumed) {
                    log::warn!(
                        "Recognizer {} returned invalid length {}; ignoring match",
                        r.name(),
                        hit.consumed
                    );
                    return None;
                }
                Some(hit)
            })
    }

    /// Split a run of inline text into text nodes and recognized nodes.
    ///
    /// `span` is the source range of `text` when it is a verbatim slice; the
    /// produced nodes get sub-ranges of it.
    pub fn split(&self, text: &str, span: Option<Range<usize>>) -> Vec<SyntaxNode> {
        let sub_span = |range: Range<usize>| {
            span.as_ref()
                .map(|s| s.start + range.start..s.start + range.end)
        };

        let mut nodes = Vec::new();
        let mut plain_start = 0;
        let mut pos = 0;

        while let Some(c) = text[pos..].chars().next() {
            if self.is_trigger(c)
                && let Some(hit) = self.recognize_at(text, pos, c)
            {
                if plain_start < pos {
                    nodes.push(SyntaxNode::new(
                        NodeKind::Text(text[plain_start..pos].to_string()),
                        sub_span(plain_start..pos),
                    ));
                }
                nodes.push(SyntaxNode::new(hit.kind, sub_span(pos..pos + hit.consumed)));
                pos += hit.consumed;
                plain_start = pos;
                continue;
            }
            pos += c.len_utf8();
        }

        if plain_start < text.len() {
            nodes.push(SyntaxNode::new(
                NodeKind::Text(text[plain_start..].to_string()),
                sub_span(plain_start..text.len()),
            ));
        }
        nodes
    }
}
