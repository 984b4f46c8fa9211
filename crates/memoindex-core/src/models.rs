//! Core data models shared by the extraction engine, the prefilter and the stores.
//!
//! These types are designed to be:
//! - **Serializable**: All types derive Serialize/Deserialize
//! - **Immutable once built**: payloads expose accessors, not public fields
//! - **Type-Safe**: Enums replace magic strings

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Derived boolean signals computed once per note from its parsed structure.
///
/// Flags can only be raised, never cleared, and raising `has_incomplete_tasks`
/// always raises `has_task_list` with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "PropertyRepr", rename_all = "camelCase")]
pub struct MemoProperty {
    has_link: bool,
    has_code: bool,
    has_task_list: bool,
    has_incomplete_tasks: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyRepr {
    #[serde(default)]
    has_link: bool,
    #[serde(default)]
    has_code: bool,
    #[serde(default)]
    has_task_list: bool,
    #[serde(default)]
    has_incomplete_tasks: bool,
}

impl From<PropertyRepr> for MemoProperty {
    fn from(repr: PropertyRepr) -> Self {
        let mut property = MemoProperty::default();
        if repr.has_link {
            property.mark_link();
        }
        if repr.has_code {
            property.mark_code();
        }
        if repr.has_task_list {
            property.mark_task(true);
        }
        if repr.has_incomplete_tasks {
            property.mark_task(false);
        }
        property
    }
}

impl MemoProperty {
    /// Record a link.
    pub fn mark_link(&mut self) {
        self.has_link = true;
    }

    /// Record an inline code span or a code block.
    pub fn mark_code(&mut self) {
        self.has_code = true;
    }

    /// Record a task checkbox with its checked state.
    pub fn mark_task(&mut self, checked: bool) {
        self.has_task_list = true;
        if !checked {
            self.has_incomplete_tasks = true;
        }
    }

    pub fn has_link(&self) -> bool {
        self.has_link
    }

    pub fn has_code(&self) -> bool {
        self.has_code
    }

    pub fn has_task_list(&self) -> bool {
        self.has_task_list
    }

    pub fn has_incomplete_tasks(&self) -> bool {
        self.has_incomplete_tasks
    }

    /// True when no flag is raised.
    pub fn is_empty(&self) -> bool {
        *self == MemoProperty::default()
    }
}

/// Output of one extraction call: deduplicated tags plus property flags.
///
/// Tags keep first-occurrence order and their exact case. Duplicates are
/// removed under exact string equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PayloadRepr")]
pub struct ContentPayload {
    tags: Vec<String>,
    property: MemoProperty,
}

#[derive(Deserialize)]
struct PayloadRepr {
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    property: MemoProperty,
}

impl From<PayloadRepr> for ContentPayload {
    fn from(repr: PayloadRepr) -> Self {
        ContentPayload::new(repr.tags, repr.property)
    }
}

impl ContentPayload {
    /// Build a payload, deduplicating `tags` while keeping first occurrences.
    pub fn new<I, S>(tags: I, property: MemoProperty) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut unique: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.into();
            if seen.insert(tag.clone()) {
                unique.push(tag);
            }
        }
        Self {
            tags: unique,
            property,
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn property(&self) -> &MemoProperty {
        &self.property
    }

    /// Whether the payload carries a tag exactly equal to `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether any tag starts with `prefix`.
    pub fn has_tag_prefix(&self, prefix: &str) -> bool {
        self.tags.iter().any(|t| t.starts_with(prefix))
    }

    /// Split into owned parts for persistence.
    pub fn into_parts(self) -> (Vec<String>, MemoProperty) {
        (self.tags, self.property)
    }
}

/// Who can see a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Private,
    Protected,
    Public,
}

/// Lifecycle state of a stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    Normal,
    Archived,
}

/// A stored note as seen by the persistence and query collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: i32,
    pub creator_id: i32,
    pub visibility: Visibility,
    pub state: RowStatus,
    pub pinned: bool,
    pub content: String,
    #[serde(default)]
    pub payload: ContentPayload,
}

impl NoteRecord {
    /// Create a private, normal, unpinned note with an empty payload.
    pub fn new(id: i32, creator_id: i32, content: impl Into<String>) -> Self {
        Self {
            id,
            creator_id,
            visibility: Visibility::Private,
            state: RowStatus::Normal,
            pinned: false,
            content: content.into(),
            payload: ContentPayload::default(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_state(mut self, state: RowStatus) -> Self {
        self.state = state;
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn with_payload(mut self, payload: ContentPayload) -> Self {
        self.payload = payload;
        self
    }
}

/// Every level of a hierarchical tag, outermost first.
///
/// `"a/b/c"` yields `["a", "a/b", "a/b/c"]`. Empty segments are skipped, so
/// `"a//b/"` yields `["a", "a//b"]`.
pub fn tag_ancestors(tag: &str) -> Vec<&str> {
    let mut levels = Vec::new();
    let mut end = 0;
    for segment in tag.split('/') {
        if end > 0 {
            end += 1;
        }
        end += segment.len();
        if !segment.is_empty() {
            levels.push(&tag[..end]);
        }
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_dedup_keeps_first_occurrence() {
        let payload = ContentPayload::new(["b", "a", "b", "A"], MemoProperty::default());
        assert_eq!(payload.tags(), ["b", "a", "A"]);
    }

    #[test]
    fn test_payload_dedup_many_tags() {
        let tags = (0..20_000).map(|i| format!("t{}", i % 5_000));
        let payload = ContentPayload::new(tags, MemoProperty::default());
        assert_eq!(payload.tags().len(), 5_000);
        assert_eq!(payload.tags()[0], "t0");
        assert_eq!(payload.tags()[4_999], "t4999");
    }

    #[test]
    fn test_incomplete_task_implies_task_list() {
        let mut property = MemoProperty::default();
        property.mark_task(false);
        assert!(property.has_task_list());
        assert!(property.has_incomplete_tasks());

        property.mark_task(true);
        assert!(property.has_incomplete_tasks(), "flags never reset");
    }

    #[test]
    fn test_payload_json_shape() {
        let mut property = MemoProperty::default();
        property.mark_link();
        let payload = ContentPayload::new(["rust"], property);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["tags"][0], "rust");
        assert_eq!(json["property"]["hasLink"], true);
        assert_eq!(json["property"]["hasIncompleteTasks"], false);
    }

    #[test]
    fn test_deserialize_normalizes_invariants() {
        let json = r#"{"tags":["x","x","y"],"property":{"hasIncompleteTasks":true}}"#;
        let payload: ContentPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.tags(), ["x", "y"]);
        assert!(payload.property().has_task_list());
    }

    #[test]
    fn test_tag_prefix_lookup() {
        let payload = ContentPayload::new(["project/alpha"], MemoProperty::default());
        assert!(payload.has_tag_prefix("project/"));
        assert!(!payload.has_tag("project"));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&Visibility::Protected).unwrap(),
            "\"PROTECTED\""
        );
        assert_eq!(
            serde_json::to_string(&RowStatus::Archived).unwrap(),
            "\"ARCHIVED\""
        );
    }

    #[test]
    fn test_tag_ancestors() {
        assert_eq!(tag_ancestors("a/b/c"), ["a", "a/b", "a/b/c"]);
        assert_eq!(tag_ancestors("solo"), ["solo"]);
        assert_eq!(tag_ancestors("a//b/"), ["a", "a//b"]);
    }
}
