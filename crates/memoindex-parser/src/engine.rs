//! Extraction engine - single entry point from note text to [`ContentPayload`].
//!
//! The engine:
//! - Configures pulldown-cmark once (task lists always on; tables, strikethrough
//!   and footnotes per [`ParserConfig`])
//! - Composes the inline recognizer set once
//! - Builds a syntax tree per call and walks it with [`ExtractionWalker`]
//!
//! An [`Extractor`] holds no per-call state, so one instance can serve any number
//! of threads.

use pulldown_cmark::Options;

use memoindex_core::{ContentPayload, Error, ParserConfig, Result};

use crate::recognizer::RecognizerSet;
use crate::tags::{TAG_TRIGGER, is_tag_char, is_valid_tag};
use crate::tree::{self, NodeKind, SyntaxNode};
use crate::walker::ExtractionWalker;

// ============================================================================
// Extractor
// ============================================================================

/// Parses note text and extracts tags plus property flags.
#[derive(Debug)]
pub struct Extractor {
    options: Options,
    recognizers: RecognizerSet,
    max_tag_length: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}

impl Extractor {
    /// Create an extractor for the given parser settings.
    pub fn new(config: &ParserConfig) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TASKLISTS);
        if config.enable_tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if config.enable_strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if config.enable_footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }

        Self {
            options,
            recognizers: RecognizerSet::standard(config),
            max_tag_length: config.max_tag_length,
        }
    }

    /// Parse `content` into a syntax tree.
    pub fn parse(&self, content: &str) -> Result<SyntaxNode> {
        tree::build(content, self.options, &self.recognizers)
    }

    /// Extract the payload for one note body.
    ///
    /// Either the whole payload is returned or the parse error is; there is no
    /// partial result.
    pub fn extract(&self, content: &str) -> Result<ContentPayload> {
        let tree = self.parse(content)?;
        let payload = ExtractionWalker::new().walk(&tree);
        log::trace!(
            "Extracted {} tag(s) from {} byte(s): {:?}",
            payload.tags().len(),
            content.len(),
            payload.property()
        );
        Ok(payload)
    }

    /// Extract from raw bytes; input that is not UTF-8 is a parse error.
    pub fn extract_bytes(&self, raw: &[u8]) -> Result<ContentPayload> {
        let content = std::str::from_utf8(raw)
            .map_err(|e| Error::parse_error(format!("note body is not valid UTF-8: {}", e)))?;
        self.extract(content)
    }

    /// Tags only, deduplicated in first-occurrence order.
    pub fn extract_tags(&self, content: &str) -> Result<Vec<String>> {
        let (tags, _) = self.extract(content)?.into_parts();
        Ok(tags)
    }

    // ========================================================================
    // Tag renaming
    // ========================================================================

    /// Rewrite every `#old` tag token in `content` to `#new`.
    ///
    /// Only tokens the recognizer produces are touched, so occurrences inside
    /// code, inside longer tags, or behind escapes stay as they are. A token
    /// truncated at the length cap is replaced up to the end of its character
    /// run, so the leftover characters cannot fuse with the new name.
    pub fn rename_tag(&self, content: &str, old: &str, new: &str) -> Result<String> {
        if !is_valid_tag(new, self.max_tag_length) {
            return Err(Error::invalid_tag(new));
        }
        if old == new {
            return Ok(content.to_string());
        }

        let tree = self.parse(content)?;
        let spans: Vec<_> = tree
            .descendants()
            .filter(|node| matches!(&node.kind, NodeKind::Tag(name) if name == old))
            .filter_map(|node| node.span.clone())
            .map(|span| span.start..tag_run_end(content, span.end))
            .collect();

        let mut renamed = content.to_string();
        for span in spans.iter().rev() {
            renamed.replace_range(span.start + TAG_TRIGGER.len_utf8()..span.end, new);
        }

        log::debug!("Renamed {} occurrence(s) of #{} to #{}", spans.len(), old, new);
        Ok(renamed)
    }
}

/// End of the run of tag characters continuing at `from`.
fn tag_run_end(content: &str, from: usize) -> usize {
    content[from..]
        .char_indices()
        .find(|&(_, c)| !is_tag_char(c))
        .map_or(content.len(), |(offset, _)| from + offset)
}
