//! Per-line export records.
//!
//! Field names are the column names downstream spreadsheets already consume.

use serde::{Deserialize, Serialize};

use crate::models::{CatalogEntry, MatchOutcome, MatchResult};

/// Placeholder for absent values.
pub const ABSENT: &str = "-";

/// Printed name of an order line without a name.
pub const EMPTY_NAME: &str = "(empty)";

/// Best-match placeholder when nothing scored above zero.
pub const NO_MATCH: &str = "(no match)";

/// Best-match placeholder when the department group has no catalog.
pub const NO_PRODUCTS: &str = "(no products in department_group)";

/// Flag for quantities above the monthly sales rate.
pub const SALES_WARNING: &str = "!!!";

/// A value that is either a number or a text placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Attribute {
    Number(f64),
    Text(String),
}

impl Attribute {
    /// Number, or the absent placeholder.
    pub fn number(value: Option<f64>) -> Self {
        match value {
            Some(v) => Attribute::Number(v),
            None => Attribute::absent(),
        }
    }

    /// Text, or the absent placeholder for missing or empty text.
    pub fn text(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => Attribute::Text(v.to_string()),
            _ => Attribute::absent(),
        }
    }

    pub fn absent() -> Self {
        Attribute::Text(ABSENT.to_string())
    }

    /// Plain text rendering (numbers in shortest form).
    pub fn render(&self) -> String {
        match self {
            Attribute::Number(v) => v.to_string(),
            Attribute::Text(s) => s.clone(),
        }
    }
}

/// A related catalog entry as exported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelatedProduct {
    pub id: i64,
    pub product_code: String,
    pub product_name: String,
    pub current_stock: Option<f64>,
    pub sales_rate: Option<f64>,
    pub status: Option<String>,
    pub department_group: String,
    pub average_purchase_price: Option<f64>,
    pub abc_category: Option<String>,
    pub xyz_category: Option<String>,
    pub profit_sum: Option<f64>,
}

impl From<&CatalogEntry> for RelatedProduct {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id,
            product_code: entry.code.clone(),
            product_name: entry.name.clone(),
            current_stock: entry.current_stock,
            sales_rate: entry.sales_rate,
            status: entry.status.clone(),
            department_group: entry.department_group.clone(),
            average_purchase_price: entry.average_price,
            abc_category: entry.abc_category.clone(),
            xyz_category: entry.xyz_category.clone(),
            profit_sum: entry.profit_sum,
        }
    }
}

/// One exported order line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    #[serde(rename = "Number")]
    pub number: usize,
    #[serde(rename = "NAIMENOVANIE")]
    pub name: String,
    #[serde(rename = "STOIM")]
    pub price: Option<f64>,
    #[serde(rename = "COL")]
    pub quantity: Option<f64>,
    #[serde(rename = "PRIMECHANIE")]
    pub note: String,
    /// `None` only for lines without a name
    #[serde(rename = "BEST_MATCH")]
    pub best_match: Option<String>,
    #[serde(rename = "CUR_STK")]
    pub current_stock: Attribute,
    #[serde(rename = "SALES")]
    pub sales_rate: Attribute,
    #[serde(rename = "STATUS")]
    pub status: Attribute,
    #[serde(rename = "ABC_CATEGORY")]
    pub abc_category: Attribute,
    #[serde(rename = "XYZ_CATEGORY")]
    pub xyz_category: Attribute,
    #[serde(rename = "PROFIT_SUM")]
    pub profit_sum: Attribute,
    #[serde(rename = "SCORE")]
    pub score: u8,
    /// Present once matching against the group was attempted
    #[serde(rename = "IAotdel", default, skip_serializing_if = "Option::is_none")]
    pub department_group: Option<String>,
    #[serde(rename = "RELATED_PRODUCTS")]
    pub related: Vec<RelatedProduct>,
    #[serde(rename = "IN_MEDPRED")]
    pub in_reference_list: bool,
    #[serde(rename = "SALES_WARNING")]
    pub sales_warning: String,
}

impl MatchRecord {
    /// Build the record for one match result.
    pub fn from_result(result: &MatchResult, department_group: &str) -> Self {
        let request = &result.request;
        let name = if request.has_name() {
            request.raw_name.clone()
        } else {
            EMPTY_NAME.to_string()
        };
        let note = match request.note.as_deref() {
            Some(note) if !note.is_empty() => note.to_string(),
            _ => ABSENT.to_string(),
        };

        let mut record = Self {
            number: result.line_number,
            name,
            price: request.declared_price,
            quantity: request.quantity,
            note,
            best_match: None,
            current_stock: Attribute::absent(),
            sales_rate: Attribute::absent(),
            status: Attribute::absent(),
            abc_category: Attribute::absent(),
            xyz_category: Attribute::absent(),
            profit_sum: Attribute::absent(),
            score: result.score,
            department_group: None,
            related: Vec::new(),
            in_reference_list: false,
            sales_warning: String::new(),
        };

        match &result.outcome {
            MatchOutcome::EmptyName => {}
            MatchOutcome::NoCandidates => {
                record.best_match = Some(NO_PRODUCTS.to_string());
            }
            MatchOutcome::NoMatch => {
                record.best_match = Some(NO_MATCH.to_string());
                record.department_group = Some(department_group.to_string());
            }
            MatchOutcome::Matched(entry) => {
                record.best_match = Some(entry.name.clone());
                record.current_stock = Attribute::number(entry.current_stock);
                record.sales_rate = Attribute::number(entry.sales_rate);
                record.status = Attribute::text(entry.status.as_deref());
                record.abc_category = Attribute::text(entry.abc_category.as_deref());
                record.xyz_category = Attribute::text(entry.xyz_category.as_deref());
                record.profit_sum = Attribute::number(entry.profit_sum);
                record.department_group = Some(department_group.to_string());
                record.related = result.related.iter().map(RelatedProduct::from).collect();
                record.in_reference_list = result.in_reference_list;
                if result.exceeds_sales_rate() {
                    record.sales_warning = SALES_WARNING.to_string();
                }
            }
        }

        record
    }
}
