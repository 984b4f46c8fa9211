//! Owned syntax tree folded from the pulldown-cmark event stream.
//!
//! pulldown-cmark produces a flat stream of `Start`/`End`/leaf events. This module
//! turns that stream into a tree of [`SyntaxNode`]s whose kinds form a closed set,
//! so every consumer has to handle (or explicitly ignore) each kind. Inline text is
//! handed to the [`RecognizerSet`] while the tree is built, which is where tag leaf
//! nodes come from.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag as CmarkTag};
use std::ops::Range;

use memoindex_core::{Error, Result};

use crate::recognizer::RecognizerSet;

/// Structural node kinds that carry no signal for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Paragraph,
    Heading(u8),
    BlockQuote,
    List { ordered: bool },
    Item,
    Emphasis,
    Strong,
    Strikethrough,
    Image,
    Table,
    TableHead,
    TableRow,
    TableCell,
    FootnoteDefinition,
    FootnoteReference,
    Html,
    Math,
    SoftBreak,
    HardBreak,
    Rule,
    Other,
}

/// Every node kind the tree can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Text(String),
    /// Tag body with the trigger stripped
    Tag(String),
    Link { url: String },
    CodeSpan(String),
    CodeBlock {
        fenced: bool,
        info: String,
        literal: String,
    },
    TaskCheckbox { checked: bool },
    Element(Element),
}

/// A node of the syntax tree.
///
/// `span` is the byte range in the source. Text and tag nodes only carry a span
/// when their text is a verbatim slice of the source (no escapes or entities).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Option<Range<usize>>,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, span: Option<Range<usize>>) -> Self {
        Self {
            kind,
            span,
            children: Vec::new(),
        }
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Tag bodies in document order, duplicates included.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.descendants().filter_map(|node| match &node.kind {
            NodeKind::Tag(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Pre-order traversal with an explicit stack.
pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Text collected from consecutive `Text` events, waiting for recognizers.
struct PendingText {
    text: String,
    span: Option<Range<usize>>,
}

struct TreeBuilder<'a> {
    source: &'a str,
    recognizers: &'a RecognizerSet,
    stack: Vec<SyntaxNode>,
    pending: Option<PendingText>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str, recognizers: &'a RecognizerSet) -> Self {
        Self {
            source,
            recognizers,
            stack: vec![SyntaxNode::new(NodeKind::Document, Some(0..source.len()))],
            pending: None,
        }
    }

    fn top(&mut self) -> Result<&mut SyntaxNode> {
        self.stack
            .last_mut()
            .ok_or_else(|| Error::parse_error("syntax tree lost its root"))
    }

    fn push_text(&mut self, text: &str, range: Range<usize>) -> Result<()> {
        // Code block bodies arrive as text events and stay literal.
        if let NodeKind::CodeBlock { literal, .. } = &mut self.top()?.kind {
            literal.push_str(text);
            return Ok(());
        }

        let verbatim = self.source.get(range.clone()) == Some(text);
        let span = verbatim.then_some(range);

        match &mut self.pending {
            Some(pending) => {
                pending.span = match (pending.span.take(), span) {
                    (Some(prev), Some(next)) if prev.end == next.start => Some(prev.start..next.end),
                    _ => None,
                };
                pending.text.push_str(text);
            }
            None => {
                self.pending = Some(PendingText {
                    text: text.to_string(),
                    span,
                });
            }
        }
        Ok(())
    }

    fn flush_text(&mut self) -> Result<()> {
        if let Some(pending) = self.pending.take() {
            let nodes = self.recognizers.split(&pending.text, pending.span);
            self.top()?.children.extend(nodes);
        }
        Ok(())
    }

    fn push_leaf(&mut self, kind: NodeKind, range: Range<usize>) -> Result<()> {
        self.flush_text()?;
        self.top()?.children.push(SyntaxNode::new(kind, Some(range)));
        Ok(())
    }

    fn open(&mut self, kind: NodeKind, range: Range<usize>) -> Result<()> {
        self.flush_text()?;
        self.stack.push(SyntaxNode::new(kind, Some(range)));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush_text()?;
        if self.stack.len() < 2 {
            return Err(Error::parse_error("end event without a matching start"));
        }
        let node = self
            .stack
            .pop()
            .ok_or_else(|| Error::parse_error("end event without a matching start"))?;
        self.top()?.children.push(node);
        Ok(())
    }

    fn finish(mut self) -> Result<SyntaxNode> {
        self.flush_text()?;
        if self.stack.len() != 1 {
            return Err(Error::parse_error(format!(
                "{} container(s) left open at end of input",
                self.stack.len() - 1
            )));
        }
        self.stack
            .pop()
            .ok_or_else(|| Error::parse_error("syntax tree lost its root"))
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) -> Result<()> {
        match event {
            Event::Start(tag) => self.open(container_kind(tag), range),
            Event::End(_) => self.close(),
            Event::Text(text) => self.push_text(&text, range),
            Event::Code(code) => self.push_leaf(NodeKind::CodeSpan(code.to_string()), range),
            Event::TaskListMarker(checked) => {
                self.push_leaf(NodeKind::TaskCheckbox { checked }, range)
            }
            Event::InlineMath(_) | Event::DisplayMath(_) => {
                self.push_leaf(NodeKind::Element(Element::Math), range)
            }
            Event::Html(_) | Event::InlineHtml(_) => {
                self.push_leaf(NodeKind::Element(Element::Html), range)
            }
            Event::FootnoteReference(_) => {
                self.push_leaf(NodeKind::Element(Element::FootnoteReference), range)
            }
            Event::SoftBreak => self.push_leaf(NodeKind::Element(Element::SoftBreak), range),
            Event::HardBreak => self.push_leaf(NodeKind::Element(Element::HardBreak), range),
            Event::Rule => self.push_leaf(NodeKind::Element(Element::Rule), range),
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn container_kind(tag: CmarkTag<'_>) -> NodeKind {
    let element = match tag {
        CmarkTag::Link { dest_url, .. } => {
            return NodeKind::Link {
                url: dest_url.to_string(),
            };
        }
        CmarkTag::CodeBlock(kind) => {
            let (fenced, info) = match kind {
                CodeBlockKind::Fenced(info) => (true, info.to_string()),
                CodeBlockKind::Indented => (false, String::new()),
            };
            return NodeKind::CodeBlock {
                fenced,
                info,
                literal: String::new(),
            };
        }
        CmarkTag::Paragraph => Element::Paragraph,
        CmarkTag::Heading { level, .. } => Element::Heading(heading_level(level)),
        CmarkTag::BlockQuote(_) => Element::BlockQuote,
        CmarkTag::HtmlBlock => Element::Html,
        CmarkTag::List(start) => Element::List {
            ordered: start.is_some(),
        },
        CmarkTag::Item => Element::Item,
        CmarkTag::FootnoteDefinition(_) => Element::FootnoteDefinition,
        CmarkTag::Table(_) => Element::Table,
        CmarkTag::TableHead => Element::TableHead,
        CmarkTag::TableRow => Element::TableRow,
        CmarkTag::TableCell => Element::TableCell,
        CmarkTag::Emphasis => Element::Emphasis,
        CmarkTag::Strong => Element::Strong,
        CmarkTag::Strikethrough => Element::Strikethrough,
        CmarkTag::Image { .. } => Element::Image,
        _ => Element::Other,
    };
    NodeKind::Element(element)
}

/// Parse `source` into a syntax tree, running `recognizers` over inline text.
pub(crate) fn build(
    source: &str,
    options: Options,
    recognizers: &RecognizerSet,
) -> Result<SyntaxNode> {
    let mut builder = TreeBuilder::new(source, recognizers);
    for (event, range) in Parser::new_ext(source, options).into_offset_iter() {
        builder.event(event, range)?;
    }
    builder.finish()
}
