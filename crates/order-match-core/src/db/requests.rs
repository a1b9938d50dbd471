//! Order line database operations.

use rusqlite::{params, Row};
use tracing::info;

use super::{Database, DbResult};
use crate::models::RequestLine;

const INSERT_LINE: &str = r#"
    INSERT INTO request_lines (raw_name, quantity, declared_price, note)
    VALUES (?1, ?2, ?3, ?4)
"#;

impl Database {
    /// Append an order line. Returns the row ID.
    pub fn insert_request_line(&self, line: &RequestLine) -> DbResult<i64> {
        self.conn.execute(
            INSERT_LINE,
            params![line.raw_name, line.quantity, line.declared_price, line.note],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Replace the stored order in one transaction.
    pub fn replace_request_lines(&mut self, lines: &[RequestLine]) -> DbResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM request_lines", [])?;
        {
            let mut stmt = tx.prepare(INSERT_LINE)?;
            for line in lines {
                stmt.execute(params![
                    line.raw_name,
                    line.quantity,
                    line.declared_price,
                    line.note
                ])?;
            }
        }
        tx.commit()?;

        info!(lines = lines.len(), "Order lines replaced");
        Ok(lines.len())
    }

    /// The stored order, most expensive lines first.
    ///
    /// Lines without a price come before priced ones; ties keep insertion order.
    pub fn list_request_lines(&self) -> DbResult<Vec<RequestLine>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, raw_name, quantity, declared_price, note
            FROM request_lines
            ORDER BY declared_price DESC NULLS FIRST, id
            "#,
        )?;
        let lines = stmt
            .query_map([], line_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    /// Remove every stored order line.
    pub fn clear_request_lines(&self) -> DbResult<usize> {
        Ok(self.conn.execute("DELETE FROM request_lines", [])?)
    }
}

fn line_from_row(row: &Row<'_>) -> rusqlite::Result<RequestLine> {
    Ok(RequestLine {
        id: row.get(0)?,
        raw_name: row.get(1)?,
        quantity: row.get(2)?,
        declared_price: row.get(3)?,
        note: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, price: Option<f64>) -> RequestLine {
        let mut line = RequestLine::new(name.into());
        line.declared_price = price;
        line
    }

    #[test]
    fn test_insert_and_list() {
        let db = Database::open_in_memory().unwrap();

        let mut first = line("Аспирин", Some(50.0));
        first.quantity = Some(3.0);
        first.note = Some("Пушкина 1".into());
        let id = db.insert_request_line(&first).unwrap();

        let lines = db.list_request_lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, id);
        assert_eq!(lines[0].raw_name, "Аспирин");
        assert_eq!(lines[0].quantity, Some(3.0));
        assert_eq!(lines[0].note.as_deref(), Some("Пушкина 1"));
    }

    #[test]
    fn test_list_orders_by_price_descending() {
        let db = Database::open_in_memory().unwrap();
        db.insert_request_line(&line("cheap", Some(10.0))).unwrap();
        db.insert_request_line(&line("dear", Some(500.0))).unwrap();
        db.insert_request_line(&line("unpriced", None)).unwrap();
        db.insert_request_line(&line("cheap too", Some(10.0))).unwrap();

        let names: Vec<String> = db
            .list_request_lines()
            .unwrap()
            .into_iter()
            .map(|l| l.raw_name)
            .collect();
        assert_eq!(names, vec!["unpriced", "dear", "cheap", "cheap too"]);
    }

    #[test]
    fn test_replace_and_clear() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_request_line(&line("old", None)).unwrap();

        db.replace_request_lines(&[line("new 1", None), line("new 2", None)])
            .unwrap();
        assert_eq!(db.list_request_lines().unwrap().len(), 2);

        assert_eq!(db.clear_request_lines().unwrap(), 2);
        assert!(db.list_request_lines().unwrap().is_empty());
    }
}
