//! Department group detection from order notes.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::RequestLine;

/// Locations an order is fulfilled from when none are configured.
pub const DEFAULT_DEPARTMENT_GROUPS: &[&str] =
    &["Жумабаева 3", "Пушкина 1", "Асфендиярова 2", "А. Бокейхана 32"];

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(&text.to_lowercase(), " ").into_owned()
}

/// Find the allowed group named in a note.
///
/// The note is trimmed and stripped of surrounding quotes, and must then
/// start with a letter. Matching is case-insensitive containment with runs of
/// whitespace collapsed. The first allowed group found wins; the returned
/// value is its configured spelling.
pub fn extract_department_group<S: AsRef<str>>(note: &str, allowed: &[S]) -> Option<String> {
    let note = note.trim().trim_matches(|c: char| c == '"' || c == '\'');
    if !note.chars().next().is_some_and(char::is_alphabetic) {
        return None;
    }

    let haystack = normalize(note);
    allowed
        .iter()
        .map(|group| group.as_ref())
        .find(|group| {
            let needle = normalize(group);
            !needle.trim().is_empty() && haystack.contains(&needle)
        })
        .map(str::to_string)
}

/// Department group of an order: taken from the first note that names one.
pub fn resolve_department_group<S: AsRef<str>>(
    lines: &[RequestLine],
    allowed: &[S],
) -> Option<String> {
    lines.iter().find_map(|line| {
        let note = line.note.as_deref()?;
        let group = extract_department_group(note, allowed);
        if group.is_none() {
            debug!(line_id = line.id, note, "Note names no department group");
        }
        group
    })
}
