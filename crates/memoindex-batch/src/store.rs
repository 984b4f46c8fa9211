//! Note storage seam and the in-memory reference store.
//!
//! The reference store persists payloads the way a relational backend would:
//! property flags live on the note record, and tags go into a per-owner tag
//! dictionary plus a note/tag join relation.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use memoindex_core::{ContentPayload, Error, NoteRecord, Result};
use memoindex_filter::{Compiled, MemoryCompiler, ValidatedPrefilter, compile};

/// Storage operations the rebuild driver needs.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Every stored note, ordered by id.
    async fn list_notes(&self) -> Result<Vec<NoteRecord>>;

    /// Overwrite the stored tags and property flags of one note.
    ///
    /// `content` is the body `payload` was extracted from. The store writes only
    /// while the note still holds exactly that content, checking and writing
    /// atomically, and returns `false` without writing otherwise. A missing note
    /// is [`Error::NoteNotFound`].
    async fn update_payload(
        &self,
        id: i32,
        content: &str,
        payload: ContentPayload,
    ) -> Result<bool>;
}

#[derive(Debug, Default)]
struct Tables {
    notes: BTreeMap<i32, NoteRecord>,
    /// (creator_id, tag) -> tag_id
    tag_dictionary: BTreeMap<(i32, String), i64>,
    /// (note_id, tag_id)
    note_tags: BTreeSet<(i32, i64)>,
    next_tag_id: i64,
}

impl Tables {
    fn tag_id(&mut self, creator_id: i32, tag: &str) -> i64 {
        if let Some(id) = self.tag_dictionary.get(&(creator_id, tag.to_string())) {
            return *id;
        }
        self.next_tag_id += 1;
        self.tag_dictionary
            .insert((creator_id, tag.to_string()), self.next_tag_id);
        self.next_tag_id
    }

    fn link_tags(&mut self, note_id: i32, creator_id: i32, tags: &[String]) {
        self.note_tags.retain(|(note, _)| *note != note_id);
        for tag in tags {
            let tag_id = self.tag_id(creator_id, tag);
            self.note_tags.insert((note_id, tag_id));
        }

        let referenced: BTreeSet<i64> = self.note_tags.iter().map(|(_, tag)| *tag).collect();
        self.tag_dictionary
            .retain(|_, tag_id| referenced.contains(tag_id));
    }
}

/// In-memory store with a normalized tag index.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    tables: RwLock<Tables>,
    scans: AtomicUsize,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a note, indexing the tags of its payload.
    pub async fn insert(&self, note: NoteRecord) {
        let mut tables = self.tables.write().await;
        tables.link_tags(note.id, note.creator_id, note.payload.tags());
        tables.notes.insert(note.id, note);
    }

    pub async fn get(&self, id: i32) -> Option<NoteRecord> {
        self.tables.read().await.notes.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.notes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.notes.is_empty()
    }

    /// Tags in the dictionary of one owner, sorted.
    pub async fn tags_for_creator(&self, creator_id: i32) -> Vec<String> {
        self.tables
            .read()
            .await
            .tag_dictionary
            .keys()
            .filter(|(creator, _)| *creator == creator_id)
            .map(|(_, tag)| tag.clone())
            .collect()
    }

    /// Ids of one owner's notes that reference `tag`, via the join relation.
    pub async fn notes_with_tag(&self, creator_id: i32, tag: &str) -> Vec<i32> {
        let tables = self.tables.read().await;
        let Some(tag_id) = tables.tag_dictionary.get(&(creator_id, tag.to_string())) else {
            return Vec::new();
        };
        tables
            .note_tags
            .iter()
            .filter(|(_, t)| t == tag_id)
            .map(|(note, _)| *note)
            .collect()
    }

    /// Number of times query has read the note table.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::Relaxed)
    }

    /// Notes accepted by `filter`, ordered by id.
    ///
    /// An unsatisfiable filter returns immediately without touching the tables.
    pub async fn query(&self, filter: &ValidatedPrefilter) -> Result<Vec<NoteRecord>> {
        let predicate = match compile(&MemoryCompiler, filter)? {
            Compiled::Empty => return Ok(Vec::new()),
            Compiled::Predicate(predicate) => predicate,
        };

        self.scans.fetch_add(1, Ordering::Relaxed);
        let tables = self.tables.read().await;
        Ok(tables
            .notes
            .values()
            .filter(|note| predicate.matches(note))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>> {
        Ok(self.tables.read().await.notes.values().cloned().collect())
    }

    async fn update_payload(
        &self,
        id: i32,
        content: &str,
        payload: ContentPayload,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let note = tables.notes.get(&id).ok_or_else(|| Error::note_not_found(id))?;
        if note.content != content {
            return Ok(false);
        }
        let creator_id = note.creator_id;

        tables.link_tags(id, creator_id, payload.tags());
        if let Some(note) = tables.notes.get_mut(&id) {
            note.payload = payload;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoindex_core::MemoProperty;
    use memoindex_filter::{MatchGroup, MemoPrefilter, TagMatch};

    fn payload(tags: &[&str]) -> ContentPayload {
        ContentPayload::new(tags.iter().copied(), MemoProperty::default())
    }

    #[tokio::test]
    async fn test_dictionary_is_per_owner() {
        let store = MemoryNoteStore::new();
        store
            .insert(NoteRecord::new(1, 10, "").with_payload(payload(&["work", "home"])))
            .await;
        store
            .insert(NoteRecord::new(2, 20, "").with_payload(payload(&["work"])))
            .await;

        assert_eq!(store.tags_for_creator(10).await, vec!["home", "work"]);
        assert_eq!(store.tags_for_creator(20).await, vec!["work"]);
        assert_eq!(store.notes_with_tag(10, "work").await, vec![1]);
        assert_eq!(store.notes_with_tag(20, "work").await, vec![2]);
    }

    #[tokio::test]
    async fn test_update_rewrites_join_and_prunes() {
        let store = MemoryNoteStore::new();
        store
            .insert(NoteRecord::new(1, 10, "").with_payload(payload(&["old"])))
            .await;

        assert!(store.update_payload(1, "", payload(&["new"])).await.unwrap());

        assert_eq!(store.tags_for_creator(10).await, vec!["new"]);
        assert!(store.notes_with_tag(10, "old").await.is_empty());
        assert_eq!(store.get(1).await.unwrap().payload.tags(), ["new"]);
    }

    #[tokio::test]
    async fn test_update_missing_note() {
        let store = MemoryNoteStore::new();
        let result = store.update_payload(99, "", payload(&[])).await;
        assert!(matches!(result, Err(Error::NoteNotFound { id: 99 })));
    }

    #[tokio::test]
    async fn test_update_skipped_when_content_changed() {
        let store = MemoryNoteStore::new();
        store
            .insert(NoteRecord::new(1, 10, "edited #fresh").with_payload(payload(&["fresh"])))
            .await;

        let written = store
            .update_payload(1, "original #stale", payload(&["stale"]))
            .await
            .unwrap();

        assert!(!written);
        assert_eq!(store.get(1).await.unwrap().payload.tags(), ["fresh"]);
        assert_eq!(store.tags_for_creator(10).await, vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_unsatisfiable_query_skips_scan() {
        let store = MemoryNoteStore::new();
        store
            .insert(NoteRecord::new(1, 10, "").with_payload(payload(&["a"])))
            .await;

        let none = MemoPrefilter::new()
            .with_tag_group(MatchGroup::new())
            .validate();
        assert!(store.query(&none).await.unwrap().is_empty());
        assert_eq!(store.scan_count(), 0);

        let some = MemoPrefilter::new()
            .with_tag_group(MatchGroup::any([TagMatch::exact("a")]))
            .validate();
        assert_eq!(store.query(&some).await.unwrap().len(), 1);
        assert_eq!(store.scan_count(), 1);
    }
}
