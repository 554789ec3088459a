use serde::Serialize;

/// Column holding the regressor (x).
pub const FLUX_COLUMN: &str = "F.S.Flux";

/// Column holding the response (y).
pub const ELE_FLOW_COLUMN: &str = "Ele.Flow";

/// Columns every input table must carry, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 2] = [FLUX_COLUMN, ELE_FLOW_COLUMN];

/// Minimum number of observations required for the analysis.
pub const MIN_OBSERVATIONS: usize = 3;

/// An untyped table as read from a CSV file: header names plus rows of
/// optional text cells. `None` marks a NULL cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// Build a table from string literals, treating every cell as present.
    /// Handy for tests and callers that already hold text data.
    pub fn from_strings(columns: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| Some(cell.to_string())).collect())
                .collect(),
        }
    }

    /// Returns the number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name. A UTF-8 byte-order mark glued to the
    /// first header name is ignored.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.trim_start_matches('\u{feff}') == name)
    }

    /// Cell at (row, column), `None` when absent or NULL.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }
}

/// Validated (F.S.Flux, Ele.Flow) pairs, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observations {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Observations {
    /// Pair up two equally long columns. Validation of row count and
    /// finiteness happens in the validator; this only zips.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), y.len());
        Self { x, y }
    }

    /// Returns the number of observations.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if there are no observations.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Smallest and largest x, or None if empty.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        min_max(&self.x)
    }

    /// Smallest and largest y, or None if empty.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        min_max(&self.y)
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index_ignores_bom() {
        let table = RawTable::from_strings(&["\u{feff}F.S.Flux", "Ele.Flow"], &[]);
        assert_eq!(table.column_index(FLUX_COLUMN), Some(0));
        assert_eq!(table.column_index(ELE_FLOW_COLUMN), Some(1));
        assert_eq!(table.column_index("other"), None);
    }

    #[test]
    fn test_cell_access() {
        let table = RawTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Some("1".to_string()), None]],
        );
        assert_eq!(table.cell(0, 0), Some("1"));
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.cell(3, 0), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_ranges() {
        let obs = Observations::new(vec![3.0, 1.0, 2.0], vec![-1.0, 5.0, 0.5]);
        assert_eq!(obs.x_range(), Some((1.0, 3.0)));
        assert_eq!(obs.y_range(), Some((-1.0, 5.0)));
        assert_eq!(Observations::new(vec![], vec![]).x_range(), None);
    }
}
