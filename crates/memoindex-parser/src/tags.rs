//! Tag recognizer: `#tag`, `#parent/child`, `#日本語`, `#🚀`
//!
//! A tag is the trigger `#` followed by a run of tag characters: Unicode letters,
//! numbers and symbols, plus `_`, `-`, `/` and `&`. The run ends at the first other
//! character, at the end of the line, or once the length cap is reached; a capped
//! tag is truncated rather than rejected.
//!
//! `# heading`-like input (a space after the trigger) and doubled triggers such
//! as `##project` never start a tag.

use unicode_general_category::{GeneralCategory, get_general_category};

use crate::recognizer::{InlineRecognizer, Recognized};
use crate::tree::NodeKind;

/// The reserved tag trigger character.
pub const TAG_TRIGGER: char = '#';

/// Whether `c` may appear in a tag body.
pub fn is_tag_char(c: char) -> bool {
    if matches!(c, '_' | '-' | '/' | '&') {
        return true;
    }
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
            | GeneralCategory::DecimalNumber
            | GeneralCategory::LetterNumber
            | GeneralCategory::OtherNumber
            | GeneralCategory::MathSymbol
            | GeneralCategory::CurrencySymbol
            | GeneralCategory::ModifierSymbol
            | GeneralCategory::OtherSymbol
    )
}

/// Whether `name` would come back unchanged from the recognizer.
pub fn is_valid_tag(name: &str, max_length: usize) -> bool {
    let mut count = 0;
    for c in name.chars() {
        if !is_tag_char(c) {
            return false;
        }
        count += 1;
    }
    count > 0 && count <= max_length
}

/// Recognizes `#tag` tokens and emits [`NodeKind::Tag`] leaves.
#[derive(Debug, Clone)]
pub struct TagRecognizer {
    max_length: usize,
}

impl TagRecognizer {
    /// `max_length` is the cap on the body, in code points.
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl InlineRecognizer for TagRecognizer {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn trigger(&self) -> char {
        TAG_TRIGGER
    }

    fn priority(&self) -> u16 {
        200
    }

    fn recognize(&self, line: &str, prev: Option<char>) -> Option<Recognized> {
        let body = line.strip_prefix(TAG_TRIGGER)?;
        if prev == Some(TAG_TRIGGER) {
            return None;
        }
        match body.chars().next() {
            None | Some(TAG_TRIGGER) | Some(' ') => return None,
            Some(_) => {}
        }

        let mut end = 0;
        for (count, c) in body.chars().enumerate() {
            if count == self.max_length || !is_tag_char(c) {
                break;
            }
            end += c.len_utf8();
        }

        if end == 0 {
            return None;
        }

        Some(Recognized {
            kind: NodeKind::Tag(body[..end].to_string()),
            consumed: TAG_TRIGGER.len_utf8() + end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(line: &str) -> Option<String> {
        match TagRecognizer::new(100).recognize(line, None)?.kind {
            NodeKind::Tag(name) => Some(name),
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_simple_tag() {
        assert_eq!(tag("#rust is great").as_deref(), Some("rust"));
    }

    #[test]
    fn test_nested_tag() {
        assert_eq!(tag("#project/alpha,").as_deref(), Some("project/alpha"));
    }

    #[test]
    fn test_whitelisted_punctuation() {
        assert_eq!(tag("#R&D_2024-q1/x.").as_deref(), Some("R&D_2024-q1/x"));
    }

    #[test]
    fn test_unicode_letters_and_symbols() {
        assert_eq!(tag("#日本語 text").as_deref(), Some("日本語"));
        assert_eq!(tag("#🚀launch").as_deref(), Some("🚀launch"));
        assert_eq!(tag("#price$").as_deref(), Some("price$"));
    }

    #[test]
    fn test_case_preserved() {
        assert_eq!(tag("#MixedCase").as_deref(), Some("MixedCase"));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(tag("#"), None);
        assert_eq!(tag("# heading"), None);
        assert_eq!(tag("##project"), None);
        assert_eq!(tag("#.dot"), None);
        assert_eq!(tag("#\ttab"), None);
    }

    #[test]
    fn test_rejects_after_trigger() {
        let recognizer = TagRecognizer::new(100);
        assert!(recognizer.recognize("#project", Some('#')).is_none());
        assert!(recognizer.recognize("#project", Some('a')).is_some());
    }

    #[test]
    fn test_truncates_at_cap() {
        let long = format!("#{}", "a".repeat(150));
        let hit = TagRecognizer::new(100).recognize(&long, None).unwrap();
        assert_eq!(hit.kind, NodeKind::Tag("a".repeat(100)));
        assert_eq!(hit.consumed, 101);
    }

    #[test]
    fn test_cap_counts_code_points() {
        let long = format!("#{}", "é".repeat(120));
        let hit = TagRecognizer::new(100).recognize(&long, None).unwrap();
        match hit.kind {
            NodeKind::Tag(name) => assert_eq!(name.chars().count(), 100),
            other => panic!("unexpected node {:?}", other),
        }
        assert_eq!(hit.consumed, 1 + 200);
    }

    #[test]
    fn test_is_valid_tag() {
        assert!(is_valid_tag("work/urgent", 100));
        assert!(!is_valid_tag("has space", 100));
        assert!(!is_valid_tag("", 100));
        assert!(!is_valid_tag("abc", 2));
    }
}
