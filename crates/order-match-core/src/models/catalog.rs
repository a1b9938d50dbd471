//! Product catalog models.

use serde::{Deserialize, Serialize};

/// A single row of the assortment plan for one department group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Database row ID (0 until persisted)
    pub id: i64,
    /// Product code - unique within a department group
    pub code: String,
    /// Canonical product name
    pub name: String,
    /// Units currently in stock
    pub current_stock: Option<f64>,
    /// Units sold per month
    pub sales_rate: Option<f64>,
    /// Assortment status (e.g., "active", "delisted")
    pub status: Option<String>,
    /// Physical location the entry belongs to
    pub department_group: String,
    /// Average purchase price
    pub average_price: Option<f64>,
    /// ABC analysis category
    pub abc_category: Option<String>,
    /// XYZ analysis category
    pub xyz_category: Option<String>,
    /// Profit over the statistics window
    pub profit_sum: Option<f64>,
}

impl CatalogEntry {
    /// Create a new catalog entry with required fields.
    pub fn new(code: String, name: String, department_group: String) -> Self {
        Self {
            id: 0,
            code,
            name,
            current_stock: None,
            sales_rate: None,
            status: None,
            department_group,
            average_price: None,
            abc_category: None,
            xyz_category: None,
            profit_sum: None,
        }
    }

    /// Whether the entry carries a usable name for matching.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Same product name and department group, different code.
    pub fn is_sibling_of(&self, other: &CatalogEntry) -> bool {
        self.name == other.name
            && self.code != other.code
            && self.department_group == other.department_group
    }

    /// Check whether an ordered quantity exceeds what this entry sells per month.
    ///
    /// Returns `false` when either side is unknown.
    pub fn is_oversold_by(&self, quantity: Option<f64>) -> bool {
        match (quantity, self.sales_rate) {
            (Some(q), Some(rate)) => q > rate,
            _ => false,
        }
    }
}
