//! CSV import
//!
//! Loads a CSV file into a table so the server has data to expose. The header
//! row names the columns, every column is `TEXT`, and all rows go in through
//! one transaction: a bad row leaves the table untouched.

use anyhow::{bail, Context, Result};
use rusqlite::{params_from_iter, Connection};
use std::path::Path;

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: usize,
}

/// Quote an identifier for SQLite, doubling embedded quotes
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Import `csv_path` into `table` of the database at `db_path`.
///
/// The table is created if missing; rows are appended otherwise.
pub fn import_csv(csv_path: &Path, db_path: &Path, table: &str) -> Result<ImportSummary> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {:?}", csv_path))?;

    let columns: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {:?}", csv_path))?
        .iter()
        .map(String::from)
        .collect();
    if columns.is_empty() {
        bail!("CSV file {:?} has no header row", csv_path);
    }

    let mut conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {:?}", db_path))?;

    let column_defs = columns
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    let table_ident = quote_ident(table);

    let tx = conn.transaction()?;
    tx.execute(
        &format!("CREATE TABLE IF NOT EXISTS {} ({})", table_ident, column_defs),
        [],
    )
    .with_context(|| format!("Failed to create table {}", table_ident))?;

    let mut rows = 0;
    {
        let mut insert = tx
            .prepare(&format!("INSERT INTO {} VALUES ({})", table_ident, placeholders))
            .with_context(|| format!("Failed to prepare insert into {}", table_ident))?;

        for (line, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Bad CSV record {}", line + 1))?;
            insert
                .execute(params_from_iter(record.iter()))
                .with_context(|| format!("Failed to insert CSV record {}", line + 1))?;
            rows += 1;
        }
    }
    tx.commit()?;

    tracing::debug!(table, rows, "Imported CSV");

    Ok(ImportSummary {
        table: table.to_string(),
        columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn count(db_path: &Path, table: &str) -> i64 {
        let conn = Connection::open(db_path).unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", quote_ident(table)), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("song"), "\"song\"");
        assert_eq!(quote_ident("a \"b\""), "\"a \"\"b\"\"\"");
    }

    #[test]
    fn test_import_creates_text_table() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(
            dir.path(),
            "songs.csv",
            "song,artist,play count\nIntro,\"Band, The\",12\nOutro,Solo,3\n",
        );
        let db_path = dir.path().join("database.db");

        let summary = import_csv(&csv_path, &db_path, "song").unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns, vec!["song", "artist", "play count"]);

        let conn = Connection::open(&db_path).unwrap();
        let sql: String = conn
            .query_row("SELECT sql FROM sqlite_master WHERE name = 'song'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE \"song\" (\"song\" TEXT, \"artist\" TEXT, \"play count\" TEXT)"
        );

        let (artist, plays): (String, String) = conn
            .query_row(
                "SELECT artist, \"play count\" FROM song WHERE song = 'Intro'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(artist, "Band, The");
        assert_eq!(plays, "12");
    }

    #[test]
    fn test_import_appends_to_existing_table() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(dir.path(), "songs.csv", "song\nA\nB\n");
        let db_path = dir.path().join("database.db");

        import_csv(&csv_path, &db_path, "song").unwrap();
        import_csv(&csv_path, &db_path, "song").unwrap();

        assert_eq!(count(&db_path, "song"), 4);
    }

    #[test]
    fn test_ragged_row_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(dir.path(), "bad.csv", "a,b\n1,2\n3\n");
        let db_path = dir.path().join("database.db");

        assert!(import_csv(&csv_path, &db_path, "t").is_err());

        let conn = Connection::open(&db_path).unwrap();
        let tables: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE name = 't'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(tables, 0);
    }

    #[test]
    fn test_missing_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = import_csv(
            &dir.path().join("absent.csv"),
            &dir.path().join("database.db"),
            "song",
        );

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to open CSV file"));
    }

    #[test]
    fn test_empty_csv_has_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(dir.path(), "empty.csv", "");

        let result = import_csv(&csv_path, &dir.path().join("database.db"), "song");
        assert!(result.is_err());
    }
}
