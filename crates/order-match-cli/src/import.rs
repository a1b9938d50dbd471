//! CSV intake for catalogs and procurement orders.
//!
//! Both files come out of spreadsheets, so headers are matched loosely
//! (case, surrounding whitespace and a BOM are ignored) and may use either
//! the spreadsheet column names or the field names of the models.
//! Decimal commas and space thousands separators are accepted in numbers.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use order_match_core::{CatalogEntry, RequestLine};
use thiserror::Error;
use tracing::{debug, warn};

/// Intake errors.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No header row found")]
    MissingHeader,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Row {row}: invalid number {value:?} in column {column}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
}

pub type IntakeResult<T> = Result<T, IntakeError>;

/// Catalog spreadsheet columns → catalog fields.
pub const CATALOG_COLUMNS: &[(&str, &str)] = &[
    ("Группа отделов", "department_group"),
    ("Код товара", "product_code"),
    ("Название товара", "product_name"),
    ("Текущий запас шт", "current_stock"),
    // The exported header starts with a Latin "C"
    ("Cкорость продаж шт/мес", "sales_rate"),
    ("Скорость продаж шт/мес", "sales_rate"),
    ("ABC", "abc_category"),
    ("XYZ", "xyz_category"),
    ("Статус", "status"),
    ("Цена закупки средняя", "average_purchase_price"),
    ("Продажи", "profit_sum"),
];

const CATALOG_REQUIRED: &[&str] = &["product_code", "product_name", "department_group"];

/// Order spreadsheet columns → request line fields.
pub const REQUEST_COLUMNS: &[(&str, &str)] = &[
    ("Наименование", "raw_name"),
    ("Количество", "quantity"),
    ("Стоимость со скидкой", "declared_price"),
    ("Примечание", "note"),
];

const REQUEST_REQUIRED: &[&str] = &["raw_name"];

/// How to read an intake file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeOptions {
    pub delimiter: u8,
    /// Rows above the header (titles, blank lines) to skip
    pub skip_rows: usize,
}

impl Default for IntakeOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_rows: 0,
        }
    }
}

/// Read a catalog CSV from disk.
pub fn read_catalog_path(path: &Path, options: &IntakeOptions) -> IntakeResult<Vec<CatalogEntry>> {
    read_catalog(File::open(path)?, options)
}

/// Read catalog entries. Rows without a product code are skipped.
pub fn read_catalog<R: Read>(reader: R, options: &IntakeOptions) -> IntakeResult<Vec<CatalogEntry>> {
    let table = Table::read(reader, options, CATALOG_COLUMNS, CATALOG_REQUIRED)?;

    let mut entries = Vec::with_capacity(table.rows.len());
    for (row_number, record) in table.numbered_rows() {
        let row = table.row(row_number, record);
        let Some(code) = row.text("product_code") else {
            if !row.is_blank() {
                warn!(row = row_number, "Skipping catalog row without product code");
            }
            continue;
        };

        let mut entry = CatalogEntry::new(
            code,
            row.text("product_name").unwrap_or_default(),
            row.text("department_group").unwrap_or_default(),
        );
        entry.current_stock = row.number("current_stock")?;
        entry.sales_rate = row.number("sales_rate")?;
        entry.status = row.text("status");
        entry.average_price = row.number("average_purchase_price")?;
        entry.abc_category = row.text("abc_category");
        entry.xyz_category = row.text("xyz_category");
        entry.profit_sum = row.number("profit_sum")?;
        entries.push(entry);
    }

    debug!(count = entries.len(), "Read catalog entries");
    Ok(entries)
}

/// Read an order CSV from disk.
pub fn read_requests_path(path: &Path, options: &IntakeOptions) -> IntakeResult<Vec<RequestLine>> {
    read_requests(File::open(path)?, options)
}

/// Read order lines. Lines with an empty name are kept, fully blank rows are not.
pub fn read_requests<R: Read>(reader: R, options: &IntakeOptions) -> IntakeResult<Vec<RequestLine>> {
    let table = Table::read(reader, options, REQUEST_COLUMNS, REQUEST_REQUIRED)?;

    let mut lines = Vec::with_capacity(table.rows.len());
    for (row_number, record) in table.numbered_rows() {
        let row = table.row(row_number, record);
        if row.is_blank() {
            continue;
        }

        let mut line = RequestLine::new(row.text("raw_name").unwrap_or_default());
        line.quantity = row.number("quantity")?;
        line.declared_price = row.number("declared_price")?;
        line.note = row.text("note");
        lines.push(line);
    }

    debug!(count = lines.len(), "Read order lines");
    Ok(lines)
}

/// Read reference names, one per line. Blank lines are ignored.
pub fn read_reference_names<R: Read>(mut reader: R) -> IntakeResult<Vec<String>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text
        .lines()
        .map(|line| line.trim().trim_start_matches('\u{feff}'))
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Parse a spreadsheet number: decimal comma, space or NBSP thousands separators.
pub fn parse_number(raw: &str) -> Option<Result<f64, std::num::ParseFloatError>> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.parse())
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A CSV file with its header resolved to field names.
struct Table {
    columns: HashMap<&'static str, usize>,
    rows: Vec<StringRecord>,
    /// 1-based file row of the first data row
    first_row: usize,
}

impl Table {
    fn read<R: Read>(
        reader: R,
        options: &IntakeOptions,
        aliases: &[(&str, &'static str)],
        required: &[&str],
    ) -> IntakeResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter)
            .from_reader(reader);
        let mut records = csv_reader.records().skip(options.skip_rows);

        let header = records.next().ok_or(IntakeError::MissingHeader)??;
        let mut columns = HashMap::new();
        for (index, name) in header.iter().enumerate() {
            if let Some(field) = resolve_column(name, aliases) {
                columns.entry(field).or_insert(index);
            }
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|field| !columns.contains_key(**field))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(IntakeError::MissingColumns(missing));
        }

        let rows = records.collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            columns,
            rows,
            first_row: options.skip_rows + 2,
        })
    }

    fn numbered_rows(&self) -> impl Iterator<Item = (usize, &StringRecord)> {
        let first_row = self.first_row;
        self.rows
            .iter()
            .enumerate()
            .map(move |(index, record)| (first_row + index, record))
    }

    fn row<'t>(&'t self, number: usize, record: &'t StringRecord) -> Row<'t> {
        Row {
            table: self,
            record,
            line: number,
        }
    }
}

fn resolve_column(header: &str, aliases: &[(&str, &'static str)]) -> Option<&'static str> {
    let key = normalize_header(header);
    aliases
        .iter()
        .find(|(alias, field)| normalize_header(alias) == key || *field == key)
        .map(|(_, field)| *field)
}

struct Row<'t> {
    table: &'t Table,
    record: &'t StringRecord,
    line: usize,
}

impl Row<'_> {
    fn raw(&self, field: &str) -> Option<&str> {
        let index = *self.table.columns.get(field)?;
        self.record.get(index)
    }

    /// Trimmed, non-empty text.
    fn text(&self, field: &str) -> Option<String> {
        self.raw(field)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(String::from)
    }

    fn number(&self, field: &str) -> IntakeResult<Option<f64>> {
        let Some(raw) = self.raw(field) else {
            return Ok(None);
        };
        match parse_number(raw) {
            None => Ok(None),
            Some(Ok(value)) => Ok(Some(value)),
            Some(Err(_)) => Err(IntakeError::InvalidNumber {
                row: self.line,
                column: field.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    fn is_blank(&self) -> bool {
        self.record.iter().all(|value| value.trim().is_empty())
    }
}
