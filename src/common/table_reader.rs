use duckdb::Connection;
use std::path::Path;
use tracing::{debug, info};

use super::types::RawTable;
use crate::error::Result;

/// Read a comma-separated file with a header row into a `RawTable`.
///
/// The file is scanned by an in-memory DuckDB connection with every column
/// typed as VARCHAR, so numeric coercion and missing-value checks stay with
/// the validator. Empty cells, and cells missing from short rows, come back
/// as `None`.
pub fn read_csv_table(path: &Path) -> Result<RawTable> {
    if !path.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("CSV file not found: {}", path.display()),
        )
        .into());
    }

    let con = Connection::open_in_memory()?;
    let source = csv_source(path);

    let columns = read_column_names(&con, &source)?;
    debug!(path = %path.display(), ?columns, "csv header");

    let sql = format!("SELECT * FROM {}", source);
    let mut stmt = con.prepare(&sql)?;
    let width = columns.len();
    let rows = stmt
        .query_map([], |row| {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(row.get::<_, Option<String>>(i)?);
            }
            Ok(cells)
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    info!(path = %path.display(), rows = rows.len(), "read csv table");
    Ok(RawTable::new(columns, rows))
}

/// Column names as DuckDB sees them, in file order.
fn read_column_names(con: &Connection, source: &str) -> Result<Vec<String>> {
    let sql = format!("DESCRIBE SELECT * FROM {}", source);
    let mut stmt = con.prepare(&sql)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

/// The `read_csv(...)` table expression for a file path.
fn csv_source(path: &Path) -> String {
    format!(
        "read_csv('{}', header = true, delim = ',', quote = '\"', all_varchar = true, null_padding = true)",
        escape_literal(&path.to_string_lossy())
    )
}

/// Escape a SQL string literal by doubling any internal single quotes.
fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}
