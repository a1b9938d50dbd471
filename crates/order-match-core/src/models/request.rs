//! Procurement order lines.

use serde::{Deserialize, Serialize};

/// A single free-text line of a procurement order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestLine {
    /// Database row ID (0 until persisted)
    pub id: i64,
    /// Item description as typed or recognized by OCR
    pub raw_name: String,
    /// Ordered quantity
    pub quantity: Option<f64>,
    /// Price declared on the order (after discount)
    pub declared_price: Option<f64>,
    /// Free-form note; usually names the delivery location
    pub note: Option<String>,
}

impl RequestLine {
    /// Create a new request line with just a name.
    pub fn new(raw_name: String) -> Self {
        Self {
            id: 0,
            raw_name,
            quantity: None,
            declared_price: None,
            note: None,
        }
    }

    /// Whether the line carries a name worth matching.
    pub fn has_name(&self) -> bool {
        !self.raw_name.trim().is_empty()
    }
}
