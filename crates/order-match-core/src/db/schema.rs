//! SQLite schema definition.

/// Stored in `PRAGMA user_version`; bump when a table changes shape.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete database schema.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Catalog (assortment plan, one row per product and department group)
-- ============================================================================

CREATE TABLE IF NOT EXISTS catalog_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_code TEXT NOT NULL,
    product_name TEXT NOT NULL DEFAULT '',
    current_stock REAL,
    sales_rate REAL,                             -- units per month
    status TEXT,
    department_group TEXT NOT NULL,
    average_purchase_price REAL,
    abc_category TEXT,
    xyz_category TEXT,
    profit_sum REAL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (product_code, department_group)
);

CREATE INDEX IF NOT EXISTS idx_catalog_group ON catalog_entries(department_group);
CREATE INDEX IF NOT EXISTS idx_catalog_group_name ON catalog_entries(department_group, product_name);

-- ============================================================================
-- Order lines (replaced wholesale on every import)
-- ============================================================================

CREATE TABLE IF NOT EXISTS request_lines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    raw_name TEXT NOT NULL DEFAULT '',
    quantity REAL,
    declared_price REAL,                         -- price after discount
    note TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Reference names (membership only, case-insensitive)
-- ============================================================================

CREATE TABLE IF NOT EXISTS reference_names (
    name_key TEXT PRIMARY KEY,                   -- lower-cased name
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
