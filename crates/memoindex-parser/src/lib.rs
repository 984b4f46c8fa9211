//! # memoindex parser
//!
//! Markdown-aware extraction of tags and content properties, built on `pulldown-cmark`.
//!
//! This crate provides:
//! - An owned syntax tree with a closed set of node kinds ([`NodeKind`])
//! - An ordered composition of inline recognizers ([`RecognizerSet`])
//! - The `#tag` recognizer ([`TagRecognizer`])
//! - The extraction walker that turns a tree into a [`ContentPayload`]
//! - Tag renaming that edits only real tag tokens
//!
//! ## Architecture
//!
//! ```text
//! note text ─▶ pulldown-cmark events ─▶ tree builder ─▶ SyntaxNode ─▶ ExtractionWalker ─▶ ContentPayload
//!                                         │
//!                                         └─ RecognizerSet splits inline text into Text / Tag nodes
//! ```
//!
//! Code spans, code blocks and raw HTML never reach the recognizers, so `#x`
//! inside code is never a tag.
//!
//! ## Quick Start
//!
//! ```
//! use memoindex_parser::extract;
//!
//! let payload = extract("Plan #work\n\n- [ ] write [docs](https://example.com)\n").unwrap();
//! assert_eq!(payload.tags(), ["work"]);
//! assert!(payload.property().has_link());
//! assert!(payload.property().has_incomplete_tasks());
//! ```
//!
//! ### Custom configuration
//!
//! ```
//! use memoindex_parser::Extractor;
//! use memoindex_core::ParserConfig;
//!
//! let extractor = Extractor::new(&ParserConfig { max_tag_length: 4, ..Default::default() });
//! assert_eq!(extractor.extract_tags("#abcdefg").unwrap(), vec!["abcd"]);
//! ```

mod engine;
pub mod recognizer;
pub mod tags;
pub mod tree;
pub mod walker;

use std::sync::LazyLock;

pub use engine::Extractor;
pub use recognizer::{InlineRecognizer, Recognized, RecognizerSet};
pub use tags::{TAG_TRIGGER, TagRecognizer, is_tag_char, is_valid_tag};
pub use tree::{Element, NodeKind, SyntaxNode};
pub use walker::ExtractionWalker;

pub use memoindex_core::{ContentPayload, MemoProperty};

use memoindex_core::Result;

static DEFAULT_EXTRACTOR: LazyLock<Extractor> = LazyLock::new(Extractor::default);

/// Extract tags and property flags with the default configuration.
///
/// # Example
/// ```
/// use memoindex_parser::extract;
///
/// let payload = extract("Hello #project #bug fix #project").unwrap();
/// assert_eq!(payload.tags(), ["project", "bug"]);
/// ```
pub fn extract(content: &str) -> Result<ContentPayload> {
    DEFAULT_EXTRACTOR.extract(content)
}

/// Extract only the deduplicated tag list.
///
/// # Example
/// ```
/// use memoindex_parser::extract_tags;
///
/// assert_eq!(extract_tags("#a `#b` #c").unwrap(), vec!["a", "c"]);
/// ```
pub fn extract_tags(content: &str) -> Result<Vec<String>> {
    DEFAULT_EXTRACTOR.extract_tags(content)
}

/// Rename a tag throughout `content`.
///
/// # Example
/// ```
/// use memoindex_parser::rename_tag;
///
/// let renamed = rename_tag("#todo and #todo/later", "todo", "done").unwrap();
/// assert_eq!(renamed, "#done and #todo/later");
/// ```
pub fn rename_tag(content: &str, old: &str, new: &str) -> Result<String> {
    DEFAULT_EXTRACTOR.rename_tag(content, old, new)
}

/// Convenient prelude for common imports.
pub mod prelude {
    pub use crate::{
        ContentPayload, Element, ExtractionWalker, Extractor, InlineRecognizer, MemoProperty,
        NodeKind, RecognizerSet, SyntaxNode, TagRecognizer, extract, extract_tags, rename_tag,
    };
}
