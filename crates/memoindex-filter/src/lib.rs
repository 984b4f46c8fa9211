//! # memoindex filter
//!
//! Storage-agnostic description of which notes a query should return.
//!
//! - [`prefilter`] - the draft model, match groups and validation
//! - [`compiler`] - the contract every predicate compiler honours
//! - [`memory`] - the in-memory reference compiler
//!
//! ## Semantics
//!
//! Tag groups combine with AND, options inside a group with OR. Exclude groups
//! reject any note that matches one of their options, whatever the tag groups
//! say. A tag group without options can never be satisfied, which makes the
//! whole filter unsatisfiable; validation reports that up front.
//!
//! ```
//! use memoindex_core::{ContentPayload, MemoProperty, NoteRecord};
//! use memoindex_filter::{Compiled, MatchGroup, MemoPrefilter, MemoryCompiler, TagMatch, compile};
//!
//! let note = NoteRecord::new(1, 1, "#a #b")
//!     .with_payload(ContentPayload::new(["a", "b"], MemoProperty::default()));
//!
//! let filter = MemoPrefilter::new()
//!     .with_tag_group(MatchGroup::any([TagMatch::exact("a")]))
//!     .with_tag_group(MatchGroup::any([TagMatch::exact("b")]))
//!     .validate();
//!
//! match compile(&MemoryCompiler, &filter).unwrap() {
//!     Compiled::Predicate(predicate) => assert!(predicate.matches(&note)),
//!     Compiled::Empty => unreachable!(),
//! }
//! ```

pub mod compiler;
pub mod memory;
pub mod prefilter;

pub use compiler::{Compiled, PrefilterCompiler, compile};
pub use memory::{MemoryCompiler, NotePredicate};
pub use prefilter::{
    MatchGroup, MatchKind, MemoPrefilter, SatisfiablePrefilter, TagMatch, ValidatedPrefilter,
};
