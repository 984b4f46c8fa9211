//! Contract between a validated prefilter and whatever turns it into a storage predicate.
//!
//! Compilers implement [`PrefilterCompiler`] and only ever receive a
//! [`SatisfiablePrefilter`]. The [`compile`] entry point handles the
//! unsatisfiable case itself by returning [`Compiled::Empty`] without calling
//! the compiler, so an unsatisfiable filter cannot reach storage.
//!
//! A compliant compiler must implement these semantics:
//!
//! - an `exact` option matches when the note has a tag equal to the value
//! - a `prefix` option matches when some tag starts with the value
//! - a note is accepted when every scalar constraint holds, every tag group has
//!   a matching option, and no exclude group has a matching option
//! - comparisons are case-sensitive

use memoindex_core::Result;

use crate::prefilter::{SatisfiablePrefilter, ValidatedPrefilter};

/// Translates a satisfiable prefilter into a backend-specific predicate.
pub trait PrefilterCompiler {
    type Predicate;

    fn compile_predicate(&self, filter: &SatisfiablePrefilter) -> Result<Self::Predicate>;
}

/// Outcome of compiling a validated prefilter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compiled<P> {
    /// Nothing can match; callers return an empty result without querying.
    Empty,
    Predicate(P),
}

impl<P> Compiled<P> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Compiled::Empty)
    }

    pub fn predicate(&self) -> Option<&P> {
        match self {
            Compiled::Empty => None,
            Compiled::Predicate(predicate) => Some(predicate),
        }
    }

    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> Compiled<Q> {
        match self {
            Compiled::Empty => Compiled::Empty,
            Compiled::Predicate(predicate) => Compiled::Predicate(f(predicate)),
        }
    }
}

/// Compile `filter`, short-circuiting when it is unsatisfiable.
pub fn compile<C>(compiler: &C, filter: &ValidatedPrefilter) -> Result<Compiled<C::Predicate>>
where
    C: PrefilterCompiler + ?Sized,
{
    match filter {
        ValidatedPrefilter::Unsatisfiable => {
            log::debug!("Prefilter unsatisfiable; skipping compilation");
            Ok(Compiled::Empty)
        }
        ValidatedPrefilter::Satisfiable(filter) => {
            compiler.compile_predicate(filter).map(Compiled::Predicate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefilter::{MatchGroup, MemoPrefilter, TagMatch};
    use std::cell::Cell;

    /// Counts calls and renders a debug string of the tag groups.
    #[derive(Default)]
    struct Recording {
        calls: Cell<usize>,
    }

    impl PrefilterCompiler for Recording {
        type Predicate = String;

        fn compile_predicate(&self, filter: &SatisfiablePrefilter) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok(format!("{} group(s)", filter.tag_groups().len()))
        }
    }

    #[test]
    fn test_unsatisfiable_never_reaches_compiler() {
        let compiler = Recording::default();
        let filter = MemoPrefilter::new()
            .with_tag_group(MatchGroup::new())
            .validate();

        let compiled = compile(&compiler, &filter).unwrap();
        assert!(compiled.is_empty());
        assert_eq!(compiler.calls.get(), 0);
    }

    #[test]
    fn test_satisfiable_is_compiled() {
        let compiler = Recording::default();
        let filter = MemoPrefilter::new()
            .with_tag_group(MatchGroup::any([TagMatch::exact("a")]))
            .validate();

        let compiled = compile(&compiler, &filter).unwrap();
        assert_eq!(compiled.predicate().map(String::as_str), Some("1 group(s)"));
        assert_eq!(compiler.calls.get(), 1);
    }

    #[test]
    fn test_map_keeps_empty() {
        let empty: Compiled<u8> = Compiled::Empty;
        assert!(empty.map(|v| v + 1).is_empty());
        assert_eq!(Compiled::Predicate(1u8).map(|v| v + 1), Compiled::Predicate(2));
    }
}
