//! Order-line matcher.
//!
//! Pipeline: Dosage Parsing → Name Decomposition → Partial Comparators →
//! Structural + Price Score → Best-of-N Search → Related Entries

mod compare;
mod decomposer;
mod dosage;
mod engine;
mod numbering;
mod related;
pub mod tables;

pub use compare::*;
pub use decomposer::*;
pub use dosage::parse_dosages;
pub use engine::*;
pub use numbering::{numbering_tag, take_numbering};
pub use related::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::db::Database;
use crate::grouping::{resolve_department_group, DEFAULT_DEPARTMENT_GROUPS};
use crate::models::MatchResult;

/// Matcher errors.
#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Could not determine the department group from any order note")]
    UndeterminedGroup,
}

pub type MatcherResult<T> = Result<T, MatcherError>;

/// Results of matching the stored order against one department group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRun {
    pub department_group: String,
    pub results: Vec<MatchResult>,
}

/// Runs the full reconciliation against the database.
pub struct Reconciler<'a> {
    db: &'a Database,
    engine: MatchEngine,
    allowed_groups: Vec<String>,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler with the default engine and department groups.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            engine: MatchEngine::new(),
            allowed_groups: DEFAULT_DEPARTMENT_GROUPS
                .iter()
                .map(|g| g.to_string())
                .collect(),
        }
    }

    /// Use a custom engine.
    pub fn with_engine(mut self, engine: MatchEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Replace the department groups order notes may name.
    pub fn with_allowed_groups(mut self, groups: Vec<String>) -> Self {
        self.allowed_groups = groups;
        self
    }

    /// Match the stored order, taking the department group from its notes.
    pub fn run(&self) -> MatcherResult<MatchRun> {
        let lines = self.db.list_request_lines()?;
        let Some(group) = resolve_department_group(&lines, self.allowed_groups.as_slice()) else {
            warn!(
                lines = lines.len(),
                "No order note names an allowed department group"
            );
            return Err(MatcherError::UndeterminedGroup);
        };
        info!(department_group = %group, "Department group determined");
        self.run_for_group(&group)
    }

    /// Match the stored order against an explicit department group.
    pub fn run_for_group(&self, department_group: &str) -> MatcherResult<MatchRun> {
        let lines = self.db.list_request_lines()?;
        let catalog = self.db.list_catalog_entries(department_group)?;
        if catalog.is_empty() {
            warn!(department_group, "No catalog entries for department group");
        }
        let reference = self.db.load_reference_names()?;
        let index = RelatedIndex::from_entries(&catalog);

        let results = self
            .engine
            .match_batch(&lines, &catalog, &index, &reference);

        Ok(MatchRun {
            department_group: department_group.to_string(),
            results,
        })
    }

    /// Get the engine for direct access.
    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }
}
