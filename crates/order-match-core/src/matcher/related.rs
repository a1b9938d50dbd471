//! Sibling entries: same name and department group, different code.

use std::collections::HashMap;

use crate::db::Database;
use crate::models::CatalogEntry;

use super::MatcherResult;

/// Source of entries related to a matched catalog entry.
pub trait RelatedLookup {
    /// All entries sharing `entry`'s name and department group but not its code.
    fn related_entries(&self, entry: &CatalogEntry) -> MatcherResult<Vec<CatalogEntry>>;
}

/// Entries of one batch grouped by (department group, name), built once.
#[derive(Debug, Clone, Default)]
pub struct RelatedIndex {
    by_name: HashMap<(String, String), Vec<CatalogEntry>>,
}

impl RelatedIndex {
    /// Group a catalog batch. Entries keep their batch order within a group.
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        let mut by_name: HashMap<(String, String), Vec<CatalogEntry>> = HashMap::new();
        for entry in entries {
            by_name
                .entry((entry.department_group.clone(), entry.name.clone()))
                .or_default()
                .push(entry.clone());
        }
        Self { by_name }
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl RelatedLookup for RelatedIndex {
    fn related_entries(&self, entry: &CatalogEntry) -> MatcherResult<Vec<CatalogEntry>> {
        let key = (entry.department_group.clone(), entry.name.clone());
        Ok(self
            .by_name
            .get(&key)
            .map(|group| {
                group
                    .iter()
                    .filter(|other| other.is_sibling_of(entry))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl RelatedLookup for Database {
    fn related_entries(&self, entry: &CatalogEntry) -> MatcherResult<Vec<CatalogEntry>> {
        Ok(self.list_related_entries(&entry.name, &entry.code, &entry.department_group)?)
    }
}
