//! Pack-numbering marks (`№20`, `N 20`, `#20`).

use std::sync::LazyLock;

use regex::Regex;

use super::tables::{NUMBERING_MARKS, NUMBERING_TAG_PREFIX};

static NUMBERING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let marks = NUMBERING_MARKS
        .iter()
        .map(|mark| {
            if mark.chars().all(char::is_alphabetic) {
                format!(r"\b{}", regex::escape(mark))
            } else {
                regex::escape(mark)
            }
        })
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)(?:{})\s?(\d+)\b", marks))
        .expect("numbering mark table yields a valid pattern")
});

/// Canonical numbering tag for a pack count, e.g. `"020"` → `"№20"`.
pub fn numbering_tag(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    let count = if trimmed.is_empty() { "0" } else { trimmed };
    format!("{}{}", NUMBERING_TAG_PREFIX, count)
}

/// Remove the first numbering mark from `text`.
///
/// Returns the canonical tag of that mark and the text with the mark replaced
/// by a space. Later marks are left untouched.
pub fn take_numbering(text: &str) -> (Option<String>, String) {
    let Some(caps) = NUMBERING_PATTERN.captures(text) else {
        return (None, text.to_string());
    };
    let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
        return (None, text.to_string());
    };

    let mut rest = String::with_capacity(text.len());
    rest.push_str(&text[..whole.start()]);
    rest.push(' ');
    rest.push_str(&text[whole.end()..]);

    (Some(numbering_tag(digits.as_str())), rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_tag() {
        assert_eq!(numbering_tag("20"), "№20");
        assert_eq!(numbering_tag("020"), "№20");
        assert_eq!(numbering_tag("0"), "№0");
    }

    #[test]
    fn test_take_numbering_variants() {
        for text in ["табл №20", "табл № 20", "табл n20", "табл N 20", "табл #20"] {
            let (tag, rest) = take_numbering(text);
            assert_eq!(tag.as_deref(), Some("№20"), "input {:?}", text);
            assert_eq!(rest.trim(), "табл", "input {:?}", text);
        }
    }

    #[test]
    fn test_letter_mark_needs_word_start() {
        // "n" inside a word is not a mark; "nacl" has no digits
        assert_eq!(take_numbering("vitamin20").0, None);
        assert_eq!(take_numbering("nacl 0.9%").0, None);
    }

    #[test]
    fn test_only_first_mark_taken() {
        let (tag, rest) = take_numbering("№10 №30");
        assert_eq!(tag.as_deref(), Some("№10"));
        assert!(rest.contains("№30"));
    }

    #[test]
    fn test_no_mark() {
        let (tag, rest) = take_numbering("парацетамол 500мг");
        assert_eq!(tag, None);
        assert_eq!(rest, "парацетамол 500мг");
    }
}
