//! Item name decomposition.
//!
//! Splits a free-text name into:
//! - up to three brand tokens (first unclassified tokens, left to right)
//! - a canonical form tag (таблетки, капсулы, ...)
//! - a canonical pack numbering tag (№20)
//! - the dosage list
//! - a tail of the remaining tokens

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::ParsedName;

use super::dosage::{blank_dosages, extract_dosages, prepare_text};
use super::numbering::take_numbering;
use super::tables::FORM_SPELLINGS;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]+").expect("punctuation pattern is valid"));

/// Decomposer for item names.
#[derive(Debug, Clone)]
pub struct NameDecomposer {
    /// Form spelling → canonical form tag
    forms: HashMap<String, String>,
}

impl Default for NameDecomposer {
    fn default() -> Self {
        Self::new()
    }
}

impl NameDecomposer {
    /// Create a decomposer with the default form table.
    pub fn new() -> Self {
        Self {
            forms: Self::default_forms(),
        }
    }

    /// Decompose a raw name.
    pub fn decompose(&self, raw: &str) -> ParsedName {
        let prepared = prepare_text(raw);
        let (numbering, without_mark) = take_numbering(&prepared);
        let dosage = extract_dosages(&without_mark);

        let blanked = blank_dosages(&without_mark);

        let slots = blanked
            .split_whitespace()
            .flat_map(|word| self.tokens(word))
            .fold(TokenSlots::default(), |slots, token| {
                let form = self.form_tag(&token);
                slots.push(&token, form)
            });

        ParsedName {
            brand1: slots.brands[0].clone(),
            brand2: slots.brands[1].clone(),
            brand3: slots.brands[2].clone(),
            form: slots.form,
            numbering,
            dosage,
            tail: slots.tail.join(" "),
        }
    }

    /// Canonical form tag for a cleaned token.
    pub fn form_tag(&self, token: &str) -> Option<&str> {
        self.forms.get(token).map(String::as_str)
    }

    /// Split a word into cleaned tokens.
    ///
    /// A word spelled like a form (`р-р.`, `амп.`) stays whole; anything else
    /// is split at punctuation.
    fn tokens(&self, word: &str) -> Vec<String> {
        let bare = word.trim_end_matches('.');
        if self.forms.contains_key(bare) {
            return vec![bare.to_string()];
        }
        PUNCTUATION
            .replace_all(word, " ")
            .split_whitespace()
            .map(String::from)
            .collect()
    }

    /// Add a custom form spelling.
    pub fn add_form(&mut self, spelling: &str, tag: &str) {
        self.forms.insert(spelling.to_lowercase(), tag.to_lowercase());
    }

    fn default_forms() -> HashMap<String, String> {
        FORM_SPELLINGS
            .iter()
            .map(|(spelling, tag)| (spelling.to_string(), tag.to_string()))
            .collect()
    }
}

/// Accumulator for the token fold.
#[derive(Default)]
struct TokenSlots {
    brands: [String; 3],
    form: Option<String>,
    tail: Vec<String>,
}

impl TokenSlots {
    fn push(mut self, token: &str, form: Option<&str>) -> Self {
        if self.form.is_none() {
            if let Some(tag) = form {
                self.form = Some(tag.to_string());
                return self;
            }
        }
        match self.brands.iter_mut().find(|slot| slot.is_empty()) {
            Some(slot) => *slot = token.to_string(),
            None => self.tail.push(token.to_string()),
        }
        self
    }
}
