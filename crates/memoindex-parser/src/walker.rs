//! Extraction walker: one pre-order pass over a syntax tree that collects tags
//! and raises property flags.

use memoindex_core::{ContentPayload, MemoProperty};

use crate::tree::{NodeKind, SyntaxNode};

/// Accumulates tags and flags while visiting nodes.
#[derive(Debug, Default)]
pub struct ExtractionWalker {
    tags: Vec<String>,
    property: MemoProperty,
}

impl ExtractionWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visit every node under `root` and build the payload.
    pub fn walk(mut self, root: &SyntaxNode) -> ContentPayload {
        for node in root.descendants() {
            self.visit(node);
        }
        ContentPayload::new(self.tags, self.property)
    }

    fn visit(&mut self, node: &SyntaxNode) {
        match &node.kind {
            NodeKind::Tag(name) => self.tags.push(name.clone()),
            NodeKind::Link { .. } => self.property.mark_link(),
            NodeKind::CodeSpan(_) | NodeKind::CodeBlock { .. } => self.property.mark_code(),
            NodeKind::TaskCheckbox { checked } => self.property.mark_task(*checked),
            NodeKind::Document | NodeKind::Text(_) | NodeKind::Element(_) => {}
        }
    }
}
