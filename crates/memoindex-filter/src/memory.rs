//! In-memory reference compiler.
//!
//! Evaluates a prefilter directly against [`NoteRecord`]s. Storage-backed
//! compilers must agree with this one on every note.

use memoindex_core::{NoteRecord, Result};

use crate::compiler::PrefilterCompiler;
use crate::prefilter::SatisfiablePrefilter;

/// Compiles prefilters into [`NotePredicate`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryCompiler;

impl PrefilterCompiler for MemoryCompiler {
    type Predicate = NotePredicate;

    fn compile_predicate(&self, filter: &SatisfiablePrefilter) -> Result<NotePredicate> {
        Ok(NotePredicate {
            filter: filter.clone(),
        })
    }
}

/// A compiled in-memory predicate over notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePredicate {
    filter: SatisfiablePrefilter,
}

fn flag_matches(wanted: Option<bool>, actual: bool) -> bool {
    wanted.is_none_or(|wanted| wanted == actual)
}

impl NotePredicate {
    fn scalars_match(&self, note: &NoteRecord) -> bool {
        let filter = &self.filter;
        let property = note.payload.property();

        (filter.creator_ids().is_empty() || filter.creator_ids().contains(&note.creator_id))
            && (filter.visibility_in().is_empty()
                || filter.visibility_in().contains(&note.visibility))
            && (filter.state_in().is_empty() || filter.state_in().contains(&note.state))
            && flag_matches(filter.pinned(), note.pinned)
            && flag_matches(filter.has_link(), property.has_link())
            && flag_matches(filter.has_task_list(), property.has_task_list())
            && flag_matches(filter.has_code(), property.has_code())
            && flag_matches(filter.has_incomplete_tasks(), property.has_incomplete_tasks())
    }

    /// Whether `note` is accepted.
    pub fn matches(&self, note: &NoteRecord) -> bool {
        let tags = note.payload.tags();
        self.scalars_match(note)
            && self.filter.tag_groups().iter().all(|group| group.matches(tags))
            && !self
                .filter
                .exclude_tag_groups()
                .iter()
                .any(|group| group.matches(tags))
    }

    /// Accepted notes, in input order.
    pub fn filter<'a>(&self, notes: &'a [NoteRecord]) -> Vec<&'a NoteRecord> {
        notes.iter().filter(|note| self.matches(note)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiled, compile};
    use crate::prefilter::{MatchGroup, MemoPrefilter, TagMatch};
    use memoindex_core::{ContentPayload, MemoProperty, RowStatus, Visibility};

    fn note(id: i32, tags: &[&str]) -> NoteRecord {
        NoteRecord::new(id, 1, "")
            .with_payload(ContentPayload::new(tags.iter().copied(), MemoProperty::default()))
    }

    fn predicate(filter: MemoPrefilter) -> NotePredicate {
        match compile(&MemoryCompiler, &filter.validate()).unwrap() {
            Compiled::Predicate(predicate) => predicate,
            Compiled::Empty => panic!("filter unexpectedly unsatisfiable"),
        }
    }

    #[test]
    fn test_unconstrained_matches_everything() {
        let p = predicate(MemoPrefilter::new());
        assert!(p.matches(&note(1, &[])));
        assert!(p.matches(&note(2, &["x"])));
    }

    #[test]
    fn test_scalar_constraints() {
        let mut property = MemoProperty::default();
        property.mark_code();
        let coded = NoteRecord::new(1, 9, "")
            .with_visibility(Visibility::Public)
            .pinned(true)
            .with_payload(ContentPayload::new(Vec::<String>::new(), property));

        let p = predicate(
            MemoPrefilter::new()
                .for_creator(9)
                .with_visibility(Visibility::Public)
                .with_state(RowStatus::Normal)
                .pinned(true)
                .has_code(true)
                .has_link(false),
        );
        assert!(p.matches(&coded));

        let p = predicate(MemoPrefilter::new().for_creator(10));
        assert!(!p.matches(&coded));

        let p = predicate(MemoPrefilter::new().has_code(false));
        assert!(!p.matches(&coded));

        let p = predicate(MemoPrefilter::new().with_state(RowStatus::Archived));
        assert!(!p.matches(&coded));
    }

    #[test]
    fn test_exclude_overrides_include() {
        let p = predicate(
            MemoPrefilter::new()
                .with_tag_group(MatchGroup::any([TagMatch::prefix("project/")]))
                .exclude_tag_group(MatchGroup::any([TagMatch::exact("project/old")])),
        );
        assert!(p.matches(&note(1, &["project/new"])));
        assert!(!p.matches(&note(2, &["project/new", "project/old"])));
        assert!(!p.matches(&note(3, &["other"])));
    }

    #[test]
    fn test_filter_keeps_input_order() {
        let notes = vec![note(3, &["a"]), note(1, &["b"]), note(2, &["a"])];
        let p = predicate(
            MemoPrefilter::new().with_tag_group(MatchGroup::any([TagMatch::exact("a")])),
        );
        let ids: Vec<i32> = p.filter(&notes).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }
}
