//! Reference name database operations.

use rusqlite::params;

use super::{Database, DbResult};
use crate::models::ReferenceNames;

impl Database {
    /// Add a reference name. Returns `false` if it was already present
    /// (case-insensitively).
    pub fn add_reference_name(&self, name: &str) -> DbResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO reference_names (name_key, name) VALUES (?1, ?2)",
            params![name.to_lowercase(), name],
        )?;
        Ok(inserted > 0)
    }

    /// Replace the reference list in one transaction.
    pub fn replace_reference_names<S: AsRef<str>>(&mut self, names: &[S]) -> DbResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM reference_names", [])?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO reference_names (name_key, name) VALUES (?1, ?2)",
            )?;
            for name in names {
                let name = name.as_ref();
                inserted += stmt.execute(params![name.to_lowercase(), name])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Load the reference list as a membership set.
    pub fn load_reference_names(&self) -> DbResult<ReferenceNames> {
        let mut stmt = self.conn.prepare("SELECT name FROM reference_names")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<ReferenceNames, _>>()?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_case_insensitive() {
        let db = Database::open_in_memory().unwrap();

        assert!(db.add_reference_name("Нурофен Форте").unwrap());
        assert!(!db.add_reference_name("НУРОФЕН ФОРТЕ").unwrap());

        let names = db.load_reference_names().unwrap();
        assert_eq!(names.len(), 1);
        assert!(names.contains("нурофен форте"));
    }

    #[test]
    fn test_replace() {
        let mut db = Database::open_in_memory().unwrap();
        db.add_reference_name("Старое").unwrap();

        let inserted = db
            .replace_reference_names(&["Аспирин", "аспирин", "Ибупрофен"])
            .unwrap();

        assert_eq!(inserted, 2);
        let names = db.load_reference_names().unwrap();
        assert!(!names.contains("старое"));
        assert!(names.contains("ибупрофен"));
    }

    #[test]
    fn test_empty_list() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_reference_names().unwrap().is_empty());
    }
}
