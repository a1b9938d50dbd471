//! Order-Match Core Library
//!
//! Reconciles free-text procurement order lines against a product catalog.
//!
//! # Architecture
//!
//! ```text
//! Order lines (CSV/DB)            Catalog (CSV/DB, per department group)
//!        │                                    │
//!        ▼                                    ▼
//!  Department group ◄── order notes     list entries of group
//!        │                                    │
//!        └──────────────┬─────────────────────┘
//!                       ▼
//!        Name Decomposition (brands, form, №, dosage, tail)
//!                       │
//!                       ▼
//!        Structural Score (gated by primary brand) + Price Score
//!                       │
//!                       ▼
//!        Best-of-N (first strict maximum wins)
//!                       │
//!                       ▼
//!        Related entries · Reference membership · Sales warning
//!                       │
//!                       ▼
//!               JSON Lines / CSV export
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite storage for catalog, order lines and reference names
//! - [`models`]: Domain types (CatalogEntry, RequestLine, ParsedName, MatchResult, ...)
//! - [`matcher`]: Dosage parsing, name decomposition, comparators, match engine
//! - [`grouping`]: Department group detection from order notes
//! - [`config`]: Tunable scoring parameters
//! - [`export`]: JSON Lines, JSON and CSV export

pub mod config;
pub mod db;
pub mod export;
pub mod grouping;
pub mod matcher;
pub mod models;

// Re-export commonly used types
pub use config::{ConfigError, MatchConfig, StructuralWeights};
pub use db::Database;
pub use export::{MatchExport, MatchRecord};
pub use grouping::{extract_department_group, resolve_department_group, DEFAULT_DEPARTMENT_GROUPS};
pub use matcher::{
    parse_dosages, MatchEngine, MatchRun, MatcherError, NameDecomposer, Reconciler, RelatedIndex,
    RelatedLookup,
};
pub use models::{
    CandidateScore, CatalogEntry, Dosage, DosageUnit, MatchOutcome, MatchResult, ParsedName,
    ReferenceNames, RequestLine,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum OrderMatchError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Match error: {0}")]
    MatchError(String),
}

impl From<db::DbError> for OrderMatchError {
    fn from(e: db::DbError) -> Self {
        OrderMatchError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for OrderMatchError {
    fn from(e: serde_json::Error) -> Self {
        OrderMatchError::SerializationError(e.to_string())
    }
}

impl From<ConfigError> for OrderMatchError {
    fn from(e: ConfigError) -> Self {
        OrderMatchError::InvalidInput(e.to_string())
    }
}

impl From<MatcherError> for OrderMatchError {
    fn from(e: MatcherError) -> Self {
        match e {
            MatcherError::Database(e) => e.into(),
            MatcherError::Config(e) => e.into(),
            other => OrderMatchError::MatchError(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for OrderMatchError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        OrderMatchError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<OrderMatchCore>, OrderMatchError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(OrderMatchCore::with_database(db)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<OrderMatchCore>, OrderMatchError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(OrderMatchCore::with_database(db)))
}

/// Score two names with their prices using the default configuration.
#[uniffi::export]
pub fn compare_names(
    name_a: String,
    price_a: Option<f64>,
    name_b: String,
    price_b: Option<f64>,
) -> FfiCandidateScore {
    MatchEngine::new()
        .score_pair(&name_a, price_a, &name_b, price_b)
        .into()
}

/// Decompose a name into brands, form, numbering, dosage and tail.
#[uniffi::export]
pub fn decompose_name(name: String) -> FfiParsedName {
    NameDecomposer::new().decompose(&name).into()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database and engine wrapper for FFI.
#[derive(uniffi::Object)]
pub struct OrderMatchCore {
    db: Arc<Mutex<Database>>,
    engine: Mutex<MatchEngine>,
    allowed_groups: Mutex<Vec<String>>,
}

impl OrderMatchCore {
    fn with_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            engine: Mutex::new(MatchEngine::new()),
            allowed_groups: Mutex::new(
                DEFAULT_DEPARTMENT_GROUPS
                    .iter()
                    .map(|g| g.to_string())
                    .collect(),
            ),
        }
    }
}

#[uniffi::export]
impl OrderMatchCore {
    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the scoring configuration from a JSON document.
    pub fn configure(&self, config_json: String) -> Result<(), OrderMatchError> {
        let config = MatchConfig::from_json(&config_json)?;
        *self.engine.lock()? = MatchEngine::with_config(config)?;
        Ok(())
    }

    /// Replace the department groups order notes may name.
    pub fn set_allowed_groups(&self, groups: Vec<String>) -> Result<(), OrderMatchError> {
        if groups.iter().all(|g| g.trim().is_empty()) {
            return Err(OrderMatchError::InvalidInput(
                "at least one department group is required".into(),
            ));
        }
        *self.allowed_groups.lock()? = groups;
        Ok(())
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Add or update a catalog entry. Returns its row ID.
    pub fn upsert_catalog_entry(&self, entry: FfiCatalogEntry) -> Result<i64, OrderMatchError> {
        let db = self.db.lock()?;
        Ok(db.upsert_catalog_entry(&entry.into())?)
    }

    /// Get a catalog entry by code within a department group.
    pub fn get_catalog_entry(
        &self,
        code: String,
        department_group: String,
    ) -> Result<Option<FfiCatalogEntry>, OrderMatchError> {
        let db = self.db.lock()?;
        let entry = db.get_catalog_entry(&code, &department_group)?;
        Ok(entry.map(|e| e.into()))
    }

    /// All entries of a department group.
    pub fn list_catalog_entries(
        &self,
        department_group: String,
    ) -> Result<Vec<FfiCatalogEntry>, OrderMatchError> {
        let db = self.db.lock()?;
        let entries = db.list_catalog_entries(&department_group)?;
        Ok(entries.into_iter().map(|e| e.into()).collect())
    }

    /// Department groups present in the catalog.
    pub fn list_department_groups(&self) -> Result<Vec<String>, OrderMatchError> {
        let db = self.db.lock()?;
        Ok(db.list_department_groups()?)
    }

    // =========================================================================
    // Order Operations
    // =========================================================================

    /// Append an order line. Returns its row ID.
    pub fn insert_request_line(&self, line: FfiRequestLine) -> Result<i64, OrderMatchError> {
        let db = self.db.lock()?;
        Ok(db.insert_request_line(&line.into())?)
    }

    /// The stored order, most expensive lines first.
    pub fn list_request_lines(&self) -> Result<Vec<FfiRequestLine>, OrderMatchError> {
        let db = self.db.lock()?;
        let lines = db.list_request_lines()?;
        Ok(lines.into_iter().map(|l| l.into()).collect())
    }

    /// Remove all stored order lines. Returns how many were removed.
    pub fn clear_request_lines(&self) -> Result<u64, OrderMatchError> {
        let db = self.db.lock()?;
        Ok(db.clear_request_lines()? as u64)
    }

    // =========================================================================
    // Reference Operations
    // =========================================================================

    /// Add a reference name. Returns `false` if it was already present.
    pub fn add_reference_name(&self, name: String) -> Result<bool, OrderMatchError> {
        let db = self.db.lock()?;
        Ok(db.add_reference_name(&name)?)
    }

    // =========================================================================
    // Matching Operations
    // =========================================================================

    /// Match the stored order.
    ///
    /// Without an explicit department group it is taken from the order notes.
    pub fn match_department(
        &self,
        department_group: Option<String>,
    ) -> Result<FfiMatchRun, OrderMatchError> {
        Ok(self.run(department_group)?.into())
    }

    /// Match the stored order and export it as JSON Lines.
    pub fn export_json_lines(
        &self,
        department_group: Option<String>,
    ) -> Result<String, OrderMatchError> {
        let run = self.run(department_group)?;
        Ok(MatchExport::from_run(&run).to_json_lines()?)
    }

    /// Match the stored order and export it as CSV.
    pub fn export_csv(&self, department_group: Option<String>) -> Result<String, OrderMatchError> {
        let run = self.run(department_group)?;
        MatchExport::from_run(&run)
            .to_csv()
            .map_err(|e| OrderMatchError::SerializationError(e.to_string()))
    }
}

impl OrderMatchCore {
    fn run(&self, department_group: Option<String>) -> Result<MatchRun, OrderMatchError> {
        let db = self.db.lock()?;
        let engine = self.engine.lock()?.clone();
        let groups = self.allowed_groups.lock()?.clone();

        let reconciler = Reconciler::new(&db)
            .with_engine(engine)
            .with_allowed_groups(groups);
        let run = match department_group {
            Some(group) => reconciler.run_for_group(&group)?,
            None => reconciler.run()?,
        };
        Ok(run)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe catalog entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCatalogEntry {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub current_stock: Option<f64>,
    pub sales_rate: Option<f64>,
    pub status: Option<String>,
    pub department_group: String,
    pub average_price: Option<f64>,
    pub abc_category: Option<String>,
    pub xyz_category: Option<String>,
    pub profit_sum: Option<f64>,
}

impl From<CatalogEntry> for FfiCatalogEntry {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            id: entry.id,
            code: entry.code,
            name: entry.name,
            current_stock: entry.current_stock,
            sales_rate: entry.sales_rate,
            status: entry.status,
            department_group: entry.department_group,
            average_price: entry.average_price,
            abc_category: entry.abc_category,
            xyz_category: entry.xyz_category,
            profit_sum: entry.profit_sum,
        }
    }
}

impl From<FfiCatalogEntry> for CatalogEntry {
    fn from(entry: FfiCatalogEntry) -> Self {
        CatalogEntry {
            id: entry.id,
            code: entry.code,
            name: entry.name,
            current_stock: entry.current_stock,
            sales_rate: entry.sales_rate,
            status: entry.status,
            department_group: entry.department_group,
            average_price: entry.average_price,
            abc_category: entry.abc_category,
            xyz_category: entry.xyz_category,
            profit_sum: entry.profit_sum,
        }
    }
}

/// FFI-safe order line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRequestLine {
    pub id: i64,
    pub raw_name: String,
    pub quantity: Option<f64>,
    pub declared_price: Option<f64>,
    pub note: Option<String>,
}

impl From<RequestLine> for FfiRequestLine {
    fn from(line: RequestLine) -> Self {
        Self {
            id: line.id,
            raw_name: line.raw_name,
            quantity: line.quantity,
            declared_price: line.declared_price,
            note: line.note,
        }
    }
}

impl From<FfiRequestLine> for RequestLine {
    fn from(line: FfiRequestLine) -> Self {
        RequestLine {
            id: line.id,
            raw_name: line.raw_name,
            quantity: line.quantity,
            declared_price: line.declared_price,
            note: line.note,
        }
    }
}

/// FFI-safe dosage.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDosage {
    pub value: f64,
    /// "", "fraction", "g" or "ml"
    pub unit: String,
}

/// FFI-safe decomposed name.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiParsedName {
    pub brand1: String,
    pub brand2: String,
    pub brand3: String,
    pub form: Option<String>,
    pub numbering: Option<String>,
    pub dosage: Vec<FfiDosage>,
    pub tail: String,
}

impl From<ParsedName> for FfiParsedName {
    fn from(parsed: ParsedName) -> Self {
        Self {
            brand1: parsed.brand1,
            brand2: parsed.brand2,
            brand3: parsed.brand3,
            form: parsed.form,
            numbering: parsed.numbering,
            dosage: parsed
                .dosage
                .into_iter()
                .map(|d| FfiDosage {
                    value: d.value,
                    unit: d.unit.as_str().to_string(),
                })
                .collect(),
            tail: parsed.tail,
        }
    }
}

/// FFI-safe candidate score.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCandidateScore {
    pub brand1: u8,
    pub brand_gated: bool,
    pub structural: u8,
    pub price: u8,
    pub combined: u8,
}

impl From<CandidateScore> for FfiCandidateScore {
    fn from(score: CandidateScore) -> Self {
        Self {
            brand1: score.brand1,
            brand_gated: score.is_brand_gated(),
            structural: score.structural,
            price: score.price,
            combined: score.combined,
        }
    }
}

/// Outcome of the search for one order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiMatchOutcome {
    EmptyName,
    NoCandidates,
    NoMatch,
    Matched,
}

/// FFI-safe match result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMatchResult {
    pub line_number: u64,
    pub request: FfiRequestLine,
    pub outcome: FfiMatchOutcome,
    pub best_match: Option<FfiCatalogEntry>,
    pub score: u8,
    pub related: Vec<FfiCatalogEntry>,
    pub in_reference_list: bool,
    pub sales_warning: bool,
}

impl From<MatchResult> for FfiMatchResult {
    fn from(result: MatchResult) -> Self {
        let sales_warning = result.exceeds_sales_rate();
        let (outcome, best_match) = match result.outcome {
            MatchOutcome::EmptyName => (FfiMatchOutcome::EmptyName, None),
            MatchOutcome::NoCandidates => (FfiMatchOutcome::NoCandidates, None),
            MatchOutcome::NoMatch => (FfiMatchOutcome::NoMatch, None),
            MatchOutcome::Matched(entry) => (FfiMatchOutcome::Matched, Some(entry.into())),
        };

        Self {
            line_number: result.line_number as u64,
            request: result.request.into(),
            outcome,
            best_match,
            score: result.score,
            related: result.related.into_iter().map(|e| e.into()).collect(),
            in_reference_list: result.in_reference_list,
            sales_warning,
        }
    }
}

/// FFI-safe match run.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMatchRun {
    pub department_group: String,
    pub results: Vec<FfiMatchResult>,
}

impl From<MatchRun> for FfiMatchRun {
    fn from(run: MatchRun) -> Self {
        Self {
            department_group: run.department_group,
            results: run.results.into_iter().map(|r| r.into()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_entry(code: &str, name: &str, price: f64) -> FfiCatalogEntry {
        FfiCatalogEntry {
            id: 0,
            code: code.into(),
            name: name.into(),
            current_stock: Some(4.0),
            sales_rate: Some(10.0),
            status: None,
            department_group: "Пушкина 1".into(),
            average_price: Some(price),
            abc_category: None,
            xyz_category: None,
            profit_sum: None,
        }
    }

    fn request_line(name: &str, price: f64, note: &str) -> FfiRequestLine {
        FfiRequestLine {
            id: 0,
            raw_name: name.into(),
            quantity: Some(25.0),
            declared_price: Some(price),
            note: Some(note.into()),
        }
    }

    #[test]
    fn test_compare_names() {
        let score = compare_names(
            "Парацетамол 500мг таб №20".into(),
            Some(300.0),
            "Парацетамол 500 мг табл N20".into(),
            Some(310.0),
        );
        assert_eq!(score.combined, 80);
        assert!(!score.brand_gated);
    }

    #[test]
    fn test_decompose_name() {
        let parsed = decompose_name("Нурофен 200мг табл №10".into());
        assert_eq!(parsed.brand1, "нурофен");
        assert_eq!(parsed.numbering.as_deref(), Some("№10"));
        assert_eq!(parsed.dosage[0].unit, "g");
    }

    #[test]
    fn test_core_match_flow() {
        let core = open_database_in_memory().unwrap();
        core.upsert_catalog_entry(catalog_entry("100", "Парацетамол 500 мг табл N20", 310.0))
            .unwrap();
        core.insert_request_line(request_line("Парацетамол 500мг таб №20", 300.0, "Пушкина 1"))
            .unwrap();
        core.add_reference_name("парацетамол 500 мг табл n20".into())
            .unwrap();

        let run = core.match_department(None).unwrap();
        assert_eq!(run.department_group, "Пушкина 1");
        assert_eq!(run.results.len(), 1);

        let result = &run.results[0];
        assert_eq!(result.outcome, FfiMatchOutcome::Matched);
        assert_eq!(result.score, 80);
        assert!(result.in_reference_list);
        assert!(result.sales_warning);

        let lines = core.export_json_lines(None).unwrap();
        assert!(lines.contains("\"SALES_WARNING\":\"!!!\""));
    }

    #[test]
    fn test_core_undetermined_group() {
        let core = open_database_in_memory().unwrap();
        core.insert_request_line(request_line("Аспирин", 10.0, "срочно"))
            .unwrap();

        assert!(matches!(
            core.match_department(None),
            Err(OrderMatchError::MatchError(_))
        ));
    }

    #[test]
    fn test_core_configure() {
        let core = open_database_in_memory().unwrap();
        assert!(core.configure(r#"{"price_share": 0.0}"#.into()).is_ok());
        assert!(matches!(
            core.configure(r#"{"price_share": 3.0}"#.into()),
            Err(OrderMatchError::InvalidInput(_))
        ));
        assert!(core.set_allowed_groups(vec![]).is_err());
    }
}
