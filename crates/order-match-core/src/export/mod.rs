//! Export of match results as JSON Lines, JSON, or CSV.

mod records;

pub use records::*;

use std::io;

use serde::{Deserialize, Serialize};

use crate::matcher::MatchRun;
use crate::models::MatchResult;

/// Counts over one exported batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub empty_names: usize,
    pub in_reference_list: usize,
    pub sales_warnings: usize,
}

/// One export of a matched order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchExport {
    /// Unique export ID
    pub batch_id: String,
    /// Export timestamp
    pub exported_at: String,
    /// Department group the order was matched against
    pub department_group: String,
    pub summary: ExportSummary,
    pub records: Vec<MatchRecord>,
}

impl MatchExport {
    /// Create an export from a finished run.
    pub fn from_run(run: &MatchRun) -> Self {
        Self::from_results(&run.department_group, &run.results)
    }

    /// Create an export from match results of one department group.
    pub fn from_results(department_group: &str, results: &[MatchResult]) -> Self {
        let records: Vec<MatchRecord> = results
            .iter()
            .map(|r| MatchRecord::from_result(r, department_group))
            .collect();

        let summary = ExportSummary {
            total: results.len(),
            matched: results.iter().filter(|r| r.is_matched()).count(),
            unmatched: results.iter().filter(|r| !r.is_matched()).count(),
            empty_names: results.iter().filter(|r| !r.request.has_name()).count(),
            in_reference_list: results.iter().filter(|r| r.in_reference_list).count(),
            sales_warnings: results.iter().filter(|r| r.exceeds_sales_rate()).count(),
        };

        Self {
            batch_id: uuid::Uuid::new_v4().to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            department_group: department_group.to_string(),
            summary,
            records,
        }
    }

    /// One compact JSON object per line, no envelope.
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Export to JSON (with envelope and summary).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format. Related products are listed by code.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;

        for record in &self.records {
            let related_codes = record
                .related
                .iter()
                .map(|r| r.product_code.as_str())
                .collect::<Vec<_>>()
                .join(";");

            writer.write_record([
                record.number.to_string(),
                record.name.clone(),
                record.price.map(|p| p.to_string()).unwrap_or_default(),
                record.quantity.map(|q| q.to_string()).unwrap_or_default(),
                record.note.clone(),
                record.best_match.clone().unwrap_or_default(),
                record.current_stock.render(),
                record.sales_rate.render(),
                record.status.render(),
                record.abc_category.render(),
                record.xyz_category.render(),
                record.profit_sum.render(),
                record.score.to_string(),
                record.department_group.clone().unwrap_or_default(),
                related_codes,
                record.in_reference_list.to_string(),
                record.sales_warning.clone(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

const CSV_HEADER: [&str; 17] = [
    "number",
    "name",
    "price",
    "quantity",
    "note",
    "best_match",
    "current_stock",
    "sales_rate",
    "status",
    "abc_category",
    "xyz_category",
    "profit_sum",
    "score",
    "department_group",
    "related_codes",
    "in_reference_list",
    "sales_warning",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogEntry, MatchOutcome, RequestLine};

    fn sample_results() -> Vec<MatchResult> {
        let mut line = RequestLine::new("Аспирин, 500 мг".into());
        line.quantity = Some(30.0);
        line.declared_price = Some(55.5);

        let mut entry = CatalogEntry::new("100".into(), "Аспирин 500мг".into(), "Пушкина 1".into());
        entry.sales_rate = Some(10.0);
        let mut sibling = entry.clone();
        sibling.code = "101".into();

        vec![
            MatchResult {
                line_number: 1,
                request: line,
                outcome: MatchOutcome::Matched(entry),
                score: 80,
                related: vec![sibling],
                in_reference_list: true,
            },
            MatchResult::unmatched(2, RequestLine::new(String::new()), MatchOutcome::EmptyName),
            MatchResult::unmatched(3, RequestLine::new("Ибупрофен".into()), MatchOutcome::NoMatch),
        ]
    }

    #[test]
    fn test_csv_quotes_awkward_fields() {
        let mut line = RequestLine::new("Капли \"Називин\"\n0,05%".into());
        line.note = Some("срочно, к пятнице".into());
        let results = vec![MatchResult::unmatched(1, line, MatchOutcome::NoMatch)];

        let text = MatchExport::from_results("Пушкина 1", &results).to_csv().unwrap();
        assert!(text.contains("\"Капли \"\"Називин\"\"\n0,05%\""));

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "Капли \"Називин\"\n0,05%");
        assert_eq!(&rows[0][4], "срочно, к пятнице");
    }

    #[test]
    fn test_summary() {
        let export = MatchExport::from_results("Пушкина 1", &sample_results());

        assert_eq!(
            export.summary,
            ExportSummary {
                total: 3,
                matched: 1,
                unmatched: 2,
                empty_names: 1,
                in_reference_list: 1,
                sales_warnings: 1,
            }
        );
        assert!(uuid::Uuid::parse_str(&export.batch_id).is_ok());
    }

    #[test]
    fn test_json_lines_one_record_per_line() {
        let export = MatchExport::from_results("Пушкина 1", &sample_results());
        let text = export.to_json_lines().unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["Number"], 1);
        assert_eq!(first["BEST_MATCH"], "Аспирин 500мг");
        assert_eq!(first["SALES_WARNING"], "!!!");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["NAIMENOVANIE"], "(empty)");
        assert!(second["BEST_MATCH"].is_null());
    }

    #[test]
    fn test_csv_export() {
        let export = MatchExport::from_results("Пушкина 1", &sample_results());
        let csv = export.to_csv().unwrap();

        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].starts_with("number,name,price"));
        assert!(rows[1].starts_with("1,\"Аспирин, 500 мг\",55.5,30,-,Аспирин 500мг,"));
        assert!(rows[1].ends_with(",80,Пушкина 1,101,true,!!!"));
        assert!(rows[3].contains("(no match)"));
    }

    #[test]
    fn test_json_envelope() {
        let export = MatchExport::from_results("Пушкина 1", &sample_results());
        let value: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();

        assert_eq!(value["department_group"], "Пушкина 1");
        assert_eq!(value["records"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["summary"]["matched"], 1);
    }
}
