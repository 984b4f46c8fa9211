//! The prefilter model: scalar note constraints plus AND-of-OR tag match groups.
//!
//! A [`MemoPrefilter`] is a draft that callers fill in freely. Calling
//! [`MemoPrefilter::validate`] consumes the draft and returns a
//! [`ValidatedPrefilter`], which is either a read-only [`SatisfiablePrefilter`]
//! or `Unsatisfiable`. Compilers only ever see the satisfiable case.
//!
//! # Example
//!
//! ```
//! use memoindex_filter::{MatchGroup, MemoPrefilter, TagMatch, ValidatedPrefilter};
//!
//! let filter = MemoPrefilter::new()
//!     .for_creator(1)
//!     .with_tag_group(MatchGroup::any([TagMatch::exact("work"), TagMatch::prefix("project/")]))
//!     .exclude_tag_group(MatchGroup::any([TagMatch::exact("archived")]))
//!     .validate();
//! assert!(!filter.is_unsatisfiable());
//!
//! let impossible = MemoPrefilter::new().with_tag_group(MatchGroup::default()).validate();
//! assert!(matches!(impossible, ValidatedPrefilter::Unsatisfiable));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use memoindex_core::{Error, Result, RowStatus, Visibility};

// =============================================================================
// MATCH OPTIONS
// =============================================================================

/// How a match option compares against a note's tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Tag equals the value.
    Exact,
    /// Tag starts with the value.
    Prefix,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Prefix => "prefix",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" => Ok(MatchKind::Exact),
            "prefix" => Ok(MatchKind::Prefix),
            other => Err(Error::invalid_match_kind(other)),
        }
    }
}

/// One tag comparison. Comparisons are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagMatch {
    pub kind: MatchKind,
    pub value: String,
}

impl TagMatch {
    pub fn exact(value: impl Into<String>) -> Self {
        Self {
            kind: MatchKind::Exact,
            value: value.into(),
        }
    }

    pub fn prefix(value: impl Into<String>) -> Self {
        Self {
            kind: MatchKind::Prefix,
            value: value.into(),
        }
    }

    /// Build from a textual kind; anything but `exact`/`prefix` is rejected.
    pub fn parse(kind: &str, value: impl Into<String>) -> Result<Self> {
        Ok(Self {
            kind: kind.parse()?,
            value: value.into(),
        })
    }

    /// Whether this option accepts a single tag.
    pub fn accepts(&self, tag: &str) -> bool {
        match self.kind {
            MatchKind::Exact => tag == self.value,
            MatchKind::Prefix => tag.starts_with(&self.value),
        }
    }

    /// Whether any of `tags` is accepted.
    pub fn matches<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|tag| self.accepts(tag.as_ref()))
    }
}

/// OR-combined match options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchGroup(Vec<TagMatch>);

impl MatchGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// A group satisfied by any of `options`.
    pub fn any(options: impl IntoIterator<Item = TagMatch>) -> Self {
        Self(options.into_iter().collect())
    }

    pub fn push(&mut self, option: TagMatch) {
        self.0.push(option);
    }

    pub fn options(&self) -> &[TagMatch] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// OR over the options; a group with no options matches nothing.
    pub fn matches<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        self.0.iter().any(|option| option.matches(tags))
    }
}

impl FromIterator<TagMatch> for MatchGroup {
    fn from_iter<I: IntoIterator<Item = TagMatch>>(iter: I) -> Self {
        Self::any(iter)
    }
}

// =============================================================================
// DRAFT
// =============================================================================

/// Draft prefilter as built by a query caller.
///
/// Empty sets and `None` flags leave a dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoPrefilter {
    #[serde(
        rename = "creatorIDs",
        alias = "creatorIds",
        skip_serializing_if = "BTreeSet::is_empty"
    )]
    pub creator_ids: BTreeSet<i32>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub visibility_in: BTreeSet<Visibility>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub state_in: BTreeSet<RowStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_link: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_task_list: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_code: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_incomplete_tasks: Option<bool>,

    /// Every group must match (AND); within a group any option may match (OR).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_groups: Vec<MatchGroup>,

    /// A note matching any option of any group is rejected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_tag_groups: Vec<MatchGroup>,
}

impl MemoPrefilter {
    /// Create an unconstrained prefilter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON prefilter; unknown match kinds fail here.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::invalid_filter(e.to_string()))
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    pub fn for_creator(mut self, creator_id: i32) -> Self {
        self.creator_ids.insert(creator_id);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility_in.insert(visibility);
        self
    }

    pub fn with_state(mut self, state: RowStatus) -> Self {
        self.state_in.insert(state);
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = Some(pinned);
        self
    }

    pub fn has_link(mut self, value: bool) -> Self {
        self.has_link = Some(value);
        self
    }

    pub fn has_task_list(mut self, value: bool) -> Self {
        self.has_task_list = Some(value);
        self
    }

    pub fn has_code(mut self, value: bool) -> Self {
        self.has_code = Some(value);
        self
    }

    pub fn has_incomplete_tasks(mut self, value: bool) -> Self {
        self.has_incomplete_tasks = Some(value);
        self
    }

    /// Add a group that must match.
    pub fn with_tag_group(mut self, group: MatchGroup) -> Self {
        self.tag_groups.push(group);
        self
    }

    /// Add a group whose match disqualifies a note.
    pub fn exclude_tag_group(mut self, group: MatchGroup) -> Self {
        self.exclude_tag_groups.push(group);
        self
    }

    /// Build a prefilter from a compact tag query.
    ///
    /// Whitespace separates groups, `|` separates options inside a group, a
    /// leading `!` turns the group into an exclude group and a trailing `*` makes
    /// an option a prefix match. A leading `#` on an option is ignored.
    ///
    /// ```
    /// use memoindex_filter::{MemoPrefilter, TagMatch};
    ///
    /// let filter = MemoPrefilter::from_tag_query("work|home project/* !draft").unwrap();
    /// assert_eq!(filter.tag_groups.len(), 2);
    /// assert_eq!(filter.tag_groups[1].options(), [TagMatch::prefix("project/")]);
    /// assert_eq!(filter.exclude_tag_groups[0].options(), [TagMatch::exact("draft")]);
    /// ```
    pub fn from_tag_query(query: &str) -> Result<Self> {
        let mut filter = Self::new();
        for token in query.split_whitespace() {
            let (exclude, body) = match token.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, token),
            };

            let group = body
                .split('|')
                .map(|option| parse_query_option(option, token))
                .collect::<Result<MatchGroup>>()?;

            if exclude {
                filter.exclude_tag_groups.push(group);
            } else {
                filter.tag_groups.push(group);
            }
        }
        Ok(filter)
    }

    /// Whether the draft constrains nothing at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Check satisfiability and freeze the model.
    ///
    /// A zero-option group in `tag_groups` can never match, so the whole filter
    /// is unsatisfiable. Zero-option groups in `exclude_tag_groups` exclude
    /// nothing and are dropped.
    pub fn validate(mut self) -> ValidatedPrefilter {
        if let Some(index) = self.tag_groups.iter().position(MatchGroup::is_empty) {
            log::debug!("Tag group {} has no options; prefilter matches nothing", index);
            return ValidatedPrefilter::Unsatisfiable;
        }

        self.exclude_tag_groups.retain(|group| !group.is_empty());
        ValidatedPrefilter::Satisfiable(SatisfiablePrefilter { inner: self })
    }
}

fn parse_query_option(option: &str, token: &str) -> Result<TagMatch> {
    let option = option.strip_prefix('#').unwrap_or(option);
    let parsed = match option.strip_suffix('*') {
        Some(prefix) => TagMatch::prefix(prefix),
        None => TagMatch::exact(option),
    };
    if parsed.value.is_empty() {
        return Err(Error::invalid_filter(format!(
            "empty tag option in query term {:?}",
            token
        )));
    }
    Ok(parsed)
}

// =============================================================================
// VALIDATED
// =============================================================================

/// Result of [`MemoPrefilter::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedPrefilter {
    Satisfiable(SatisfiablePrefilter),
    /// Proven to match no note; storage must not be queried.
    Unsatisfiable,
}

impl ValidatedPrefilter {
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, ValidatedPrefilter::Unsatisfiable)
    }

    pub fn as_satisfiable(&self) -> Option<&SatisfiablePrefilter> {
        match self {
            ValidatedPrefilter::Satisfiable(filter) => Some(filter),
            ValidatedPrefilter::Unsatisfiable => None,
        }
    }
}

/// A prefilter that may match some notes. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SatisfiablePrefilter {
    inner: MemoPrefilter,
}

impl SatisfiablePrefilter {
    pub fn creator_ids(&self) -> &BTreeSet<i32> {
        &self.inner.creator_ids
    }

    pub fn visibility_in(&self) -> &BTreeSet<Visibility> {
        &self.inner.visibility_in
    }

    pub fn state_in(&self) -> &BTreeSet<RowStatus> {
        &self.inner.state_in
    }

    pub fn pinned(&self) -> Option<bool> {
        self.inner.pinned
    }

    pub fn has_link(&self) -> Option<bool> {
        self.inner.has_link
    }

    pub fn has_task_list(&self) -> Option<bool> {
        self.inner.has_task_list
    }

    pub fn has_code(&self) -> Option<bool> {
        self.inner.has_code
    }

    pub fn has_incomplete_tasks(&self) -> Option<bool> {
        self.inner.has_incomplete_tasks
    }

    /// Non-empty groups, all of which must match.
    pub fn tag_groups(&self) -> &[MatchGroup] {
        &self.inner.tag_groups
    }

    /// Non-empty groups, none of which may match.
    pub fn exclude_tag_groups(&self) -> &[MatchGroup] {
        &self.inner.exclude_tag_groups
    }

    /// Whether any tag dimension is constrained.
    pub fn has_tag_constraints(&self) -> bool {
        !self.inner.tag_groups.is_empty() || !self.inner.exclude_tag_groups.is_empty()
    }

    /// Back to an editable draft.
    pub fn into_draft(self) -> MemoPrefilter {
        self.inner
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tag_group_is_unsatisfiable() {
        let validated = MemoPrefilter::new()
            .with_tag_group(MatchGroup::any([TagMatch::exact("a")]))
            .with_tag_group(MatchGroup::new())
            .validate();
        assert!(validated.is_unsatisfiable());
    }

    #[test]
    fn test_zero_groups_is_unconstrained() {
        let validated = MemoPrefilter::new().validate();
        let filter = validated.as_satisfiable().unwrap();
        assert!(filter.tag_groups().is_empty());
        assert!(!filter.has_tag_constraints());
    }

    #[test]
    fn test_empty_exclude_group_dropped() {
        let validated = MemoPrefilter::new()
            .exclude_tag_group(MatchGroup::new())
            .exclude_tag_group(MatchGroup::any([TagMatch::exact("c")]))
            .validate();
        let filter = validated.as_satisfiable().unwrap();
        assert_eq!(filter.exclude_tag_groups().len(), 1);
    }

    #[test]
    fn test_scalar_sets_not_second_guessed() {
        let validated = MemoPrefilter::new()
            .with_state(RowStatus::Archived)
            .pinned(true)
            .validate();
        let filter = validated.as_satisfiable().unwrap();
        assert!(filter.state_in().contains(&RowStatus::Archived));
        assert_eq!(filter.pinned(), Some(true));
    }

    #[test]
    fn test_match_kind_parse() {
        assert_eq!("exact".parse::<MatchKind>().unwrap(), MatchKind::Exact);
        assert_eq!("prefix".parse::<MatchKind>().unwrap(), MatchKind::Prefix);
        let err = "Exact".parse::<MatchKind>().unwrap_err();
        assert!(matches!(err, Error::InvalidMatchKind { .. }));
        assert!(TagMatch::parse("regex", "x").is_err());
    }

    #[test]
    fn test_tag_match_is_case_sensitive() {
        assert!(TagMatch::exact("Work").accepts("Work"));
        assert!(!TagMatch::exact("Work").accepts("work"));
        assert!(!TagMatch::prefix("Proj").accepts("project"));
    }

    #[test]
    fn test_prefix_match_hierarchy() {
        let option = TagMatch::prefix("project/");
        assert!(option.matches(&["misc", "project/alpha"]));
        assert!(!option.matches(&["project"]));
    }

    #[test]
    fn test_empty_group_matches_nothing() {
        assert!(!MatchGroup::new().matches(&["anything"]));
    }

    #[test]
    fn test_json_shape_and_unknown_kind() {
        let json = r#"{
            "creatorIDs": [7],
            "hasLink": true,
            "tagGroups": [[{"kind": "exact", "value": "a"}, {"kind": "prefix", "value": "b/"}]],
            "excludeTagGroups": [[]]
        }"#;
        let filter = MemoPrefilter::from_json(json).unwrap();
        assert_eq!(filter.tag_groups[0].len(), 2);
        assert_eq!(filter.has_link, Some(true));
        assert_eq!(filter.creator_ids, BTreeSet::from([7]));
        assert!(!filter.clone().validate().is_unsatisfiable());

        let written = serde_json::to_value(&filter).unwrap();
        assert_eq!(written["creatorIDs"], serde_json::json!([7]));
        assert!(written.get("creatorIds").is_none());

        let legacy = MemoPrefilter::from_json(r#"{"creatorIds": [3]}"#).unwrap();
        assert_eq!(legacy.creator_ids, BTreeSet::from([3]));

        let bad = r#"{"tagGroups": [[{"kind": "fuzzy", "value": "a"}]]}"#;
        assert!(matches!(
            MemoPrefilter::from_json(bad),
            Err(Error::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_tag_query_parsing() {
        let filter = MemoPrefilter::from_tag_query("#a|b  c* !d|e*").unwrap();
        assert_eq!(
            filter.tag_groups,
            vec![
                MatchGroup::any([TagMatch::exact("a"), TagMatch::exact("b")]),
                MatchGroup::any([TagMatch::prefix("c")]),
            ]
        );
        assert_eq!(
            filter.exclude_tag_groups,
            vec![MatchGroup::any([TagMatch::exact("d"), TagMatch::prefix("e")])]
        );
    }

    #[test]
    fn test_tag_query_rejects_empty_options() {
        assert!(MemoPrefilter::from_tag_query("a||b").is_err());
        assert!(MemoPrefilter::from_tag_query("!").is_err());
        assert!(MemoPrefilter::from_tag_query("*").is_err());
        assert!(MemoPrefilter::from_tag_query("   ").unwrap().is_empty());
    }
}
