//! Catalog database operations.

use rusqlite::{params, OptionalExtension, Row, ToSql};
use tracing::info;

use super::{Database, DbError, DbResult};
use crate::models::CatalogEntry;

const ENTRY_COLUMNS: &str = r#"
    id, product_code, product_name, current_stock, sales_rate, status,
    department_group, average_purchase_price, abc_category, xyz_category, profit_sum
"#;

const UPSERT_ENTRY: &str = r#"
    INSERT INTO catalog_entries (
        product_code, product_name, current_stock, sales_rate, status,
        department_group, average_purchase_price, abc_category, xyz_category,
        profit_sum, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, datetime('now'))
    ON CONFLICT(product_code, department_group) DO UPDATE SET
        product_name = excluded.product_name,
        current_stock = excluded.current_stock,
        sales_rate = excluded.sales_rate,
        status = excluded.status,
        average_purchase_price = excluded.average_purchase_price,
        abc_category = excluded.abc_category,
        xyz_category = excluded.xyz_category,
        profit_sum = excluded.profit_sum,
        updated_at = datetime('now')
"#;

impl Database {
    /// Insert or update a catalog entry keyed by (code, department group).
    ///
    /// Returns the row ID.
    pub fn upsert_catalog_entry(&self, entry: &CatalogEntry) -> DbResult<i64> {
        check_entry_keys(entry)?;
        self.conn.execute(UPSERT_ENTRY, &entry_params(entry))?;

        let id = self.conn.query_row(
            "SELECT id FROM catalog_entries WHERE product_code = ?1 AND department_group = ?2",
            params![entry.code, entry.department_group],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Replace the whole catalog in one transaction.
    ///
    /// Nothing is changed if any entry is rejected.
    pub fn replace_catalog(&mut self, entries: &[CatalogEntry]) -> DbResult<usize> {
        for entry in entries {
            check_entry_keys(entry)?;
        }

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM catalog_entries", [])?;
        {
            let mut stmt = tx.prepare(UPSERT_ENTRY)?;
            for entry in entries {
                stmt.execute(&entry_params(entry))?;
            }
        }
        tx.commit()?;

        info!(entries = entries.len(), "Catalog replaced");
        Ok(entries.len())
    }

    /// Get a catalog entry by code within a department group.
    pub fn get_catalog_entry(
        &self,
        code: &str,
        department_group: &str,
    ) -> DbResult<Option<CatalogEntry>> {
        let sql = format!(
            "SELECT {} FROM catalog_entries WHERE product_code = ?1 AND department_group = ?2",
            ENTRY_COLUMNS
        );
        let entry = self
            .conn
            .query_row(&sql, params![code, department_group], entry_from_row)
            .optional()?;
        Ok(entry)
    }

    /// All entries of a department group, in insertion order.
    pub fn list_catalog_entries(&self, department_group: &str) -> DbResult<Vec<CatalogEntry>> {
        let sql = format!(
            "SELECT {} FROM catalog_entries WHERE department_group = ?1 ORDER BY id",
            ENTRY_COLUMNS
        );
        self.query_entries(&sql, params![department_group])
    }

    /// Entries sharing a name within a department group, excluding one code.
    pub fn list_related_entries(
        &self,
        name: &str,
        code: &str,
        department_group: &str,
    ) -> DbResult<Vec<CatalogEntry>> {
        let sql = format!(
            r#"
            SELECT {} FROM catalog_entries
            WHERE product_name = ?1
              AND product_code != ?2
              AND department_group = ?3
            ORDER BY id
            "#,
            ENTRY_COLUMNS
        );
        self.query_entries(&sql, params![name, code, department_group])
    }

    /// Distinct department groups present in the catalog.
    pub fn list_department_groups(&self) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT department_group FROM catalog_entries ORDER BY department_group",
        )?;
        let groups = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(groups)
    }

    /// Number of catalog entries across all groups.
    pub fn count_catalog_entries(&self) -> DbResult<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM catalog_entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn query_entries<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> DbResult<Vec<CatalogEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let entries = stmt
            .query_map(params, entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

fn check_entry_keys(entry: &CatalogEntry) -> DbResult<()> {
    if entry.code.trim().is_empty() {
        return Err(DbError::Constraint(format!(
            "catalog entry '{}' has no product code",
            entry.name
        )));
    }
    if entry.department_group.trim().is_empty() {
        return Err(DbError::Constraint(format!(
            "catalog entry {} has no department group",
            entry.code
        )));
    }
    Ok(())
}

fn entry_params(entry: &CatalogEntry) -> [&dyn ToSql; 10] {
    [
        &entry.code,
        &entry.name,
        &entry.current_stock,
        &entry.sales_rate,
        &entry.status,
        &entry.department_group,
        &entry.average_price,
        &entry.abc_category,
        &entry.xyz_category,
        &entry.profit_sum,
    ]
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogEntry> {
    Ok(CatalogEntry {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        current_stock: row.get(3)?,
        sales_rate: row.get(4)?,
        status: row.get(5)?,
        department_group: row.get(6)?,
        average_price: row.get(7)?,
        abc_category: row.get(8)?,
        xyz_category: row.get(9)?,
        profit_sum: row.get(10)?,
    })
}
