//! Reference list of canonical product names (e.g., items promoted by a sales rep).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Case-insensitive set of canonical names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReferenceNames {
    names: HashSet<String>,
}

impl ReferenceNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name; returns `false` if it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ReferenceNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ReferenceNames::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}
