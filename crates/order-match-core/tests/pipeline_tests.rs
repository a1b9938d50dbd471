//! End-to-end tests: on-disk database → reconciler → export.

use order_match_core::export::{MatchExport, NO_MATCH};
use order_match_core::models::{CatalogEntry, MatchOutcome, RequestLine};
use order_match_core::{Database, MatchConfig, MatchEngine, MatcherError, Reconciler};
use tempfile::TempDir;

fn catalog_entry(code: &str, name: &str, group: &str, price: f64, sales: f64) -> CatalogEntry {
    let mut entry = CatalogEntry::new(code.into(), name.into(), group.into());
    entry.average_price = Some(price);
    entry.sales_rate = Some(sales);
    entry.current_stock = Some(40.0);
    entry.status = Some("active".into());
    entry
}

fn request_line(name: &str, quantity: f64, price: Option<f64>, note: Option<&str>) -> RequestLine {
    let mut line = RequestLine::new(name.into());
    line.quantity = Some(quantity);
    line.declared_price = price;
    line.note = note.map(String::from);
    line
}

fn seeded_database(dir: &TempDir) -> Database {
    let mut db = Database::open(dir.path().join("orders.db")).unwrap();

    db.replace_catalog(&[
        catalog_entry("100", "Парацетамол 500 мг табл N20", "Пушкина 1", 310.0, 30.0),
        catalog_entry("101", "Парацетамол 500 мг табл N20", "Пушкина 1", 320.0, 8.0),
        catalog_entry("200", "Ибупрофен 400мг", "Пушкина 1", 150.0, 5.0),
        catalog_entry("300", "Парацетамол 500 мг табл N20", "Жумабаева 3", 300.0, 30.0),
    ])
    .unwrap();

    db.replace_request_lines(&[
        request_line("Парацетамол 500мг таб №20", 10.0, Some(300.0), Some("")),
        request_line("Ибупрофен 400 мг", 12.0, Some(145.0), Some("\"Пушкина 1\"")),
        request_line("", 1.0, Some(5.0), None),
        request_line("Валидол 60мг", 3.0, None, None),
    ])
    .unwrap();

    db.replace_reference_names(&["ИБУПРОФЕН 400МГ"]).unwrap();
    db
}

#[test]
fn test_full_run_from_disk() {
    let dir = TempDir::new().unwrap();
    let db = seeded_database(&dir);

    let run = Reconciler::new(&db).run().unwrap();
    assert_eq!(run.department_group, "Пушкина 1");

    // Unpriced lines first, then the most expensive ones
    let names: Vec<&str> = run
        .results
        .iter()
        .map(|r| r.request.raw_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Валидол 60мг", "Парацетамол 500мг таб №20", "Ибупрофен 400 мг", ""]
    );

    // Nothing shares its brand and it has no price to fall back on
    assert_eq!(run.results[0].outcome, MatchOutcome::NoMatch);

    let paracetamol = &run.results[1];
    assert_eq!(paracetamol.line_number, 2);
    assert_eq!(paracetamol.best_entry().map(|e| e.code.as_str()), Some("100"));
    assert_eq!(paracetamol.score, 80);
    assert_eq!(paracetamol.related.len(), 1);
    assert!(!paracetamol.exceeds_sales_rate());

    let ibuprofen = &run.results[2];
    assert_eq!(ibuprofen.best_entry().map(|e| e.code.as_str()), Some("200"));
    assert!(ibuprofen.in_reference_list);
    assert!(ibuprofen.exceeds_sales_rate());

    assert_eq!(run.results[3].outcome, MatchOutcome::EmptyName);
}

#[test]
fn test_export_json_lines() {
    let dir = TempDir::new().unwrap();
    let db = seeded_database(&dir);

    let run = Reconciler::new(&db).run().unwrap();
    let export = MatchExport::from_run(&run);
    let text = export.to_json_lines().unwrap();

    let records: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 4);

    assert_eq!(records[0]["BEST_MATCH"], NO_MATCH);
    assert!(records[0]["STOIM"].is_null());

    assert_eq!(records[1]["BEST_MATCH"], "Парацетамол 500 мг табл N20");
    assert_eq!(records[1]["PRIMECHANIE"], "-");
    assert_eq!(records[1]["STATUS"], "active");
    assert_eq!(records[1]["IAotdel"], "Пушкина 1");
    assert_eq!(records[1]["RELATED_PRODUCTS"][0]["product_code"], "101");
    assert_eq!(records[1]["SALES_WARNING"], "");

    assert_eq!(records[2]["IN_MEDPRED"], true);
    assert_eq!(records[2]["SALES_WARNING"], "!!!");

    assert!(records[3]["BEST_MATCH"].is_null());

    assert_eq!(export.summary.matched, 2);
    assert_eq!(export.summary.sales_warnings, 1);
}

#[test]
fn test_explicit_group_overrides_notes() {
    let dir = TempDir::new().unwrap();
    let db = seeded_database(&dir);

    let run = Reconciler::new(&db).run_for_group("Жумабаева 3").unwrap();

    assert_eq!(run.department_group, "Жумабаева 3");
    assert_eq!(
        run.results[1].best_entry().map(|e| e.code.as_str()),
        Some("300")
    );
    // Ibuprofen is not stocked there; only the price share is left
    assert_eq!(run.results[2].score, 10);
}

#[test]
fn test_custom_engine_changes_scores() {
    let dir = TempDir::new().unwrap();
    let db = seeded_database(&dir);

    let config = MatchConfig {
        structural_share: 1.0,
        price_share: 0.0,
        ..MatchConfig::default()
    };
    let engine = MatchEngine::with_config(config).unwrap();

    let run = Reconciler::new(&db).with_engine(engine).run().unwrap();
    assert_eq!(run.results[1].score, 75);
}

#[test]
fn test_no_group_in_notes_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut db = seeded_database(&dir);
    db.replace_request_lines(&[request_line("Аспирин", 1.0, None, Some("срочно"))])
        .unwrap();

    let result = Reconciler::new(&db).run();
    assert!(matches!(result, Err(MatcherError::UndeterminedGroup)));
}
