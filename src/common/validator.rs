use tracing::debug;

use super::types::{Observations, RawTable, MIN_OBSERVATIONS, REQUIRED_COLUMNS};
use crate::error::InputError;

/// Cell contents treated as missing, on top of NULL and blank cells.
const NA_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Validate a raw table and coerce the required columns to numbers.
///
/// Checks run in a fixed order and the first failure wins:
/// 1. both required columns are present
/// 2. at least `MIN_OBSERVATIONS` rows
/// 3. no missing cells in the required columns
/// 4. every required cell parses as a finite number
///
/// Extra columns are ignored. Row numbers in errors are 1-based data rows.
pub fn validate_table(table: &RawTable) -> Result<Observations, InputError> {
    let indices: Vec<Option<usize>> = REQUIRED_COLUMNS
        .iter()
        .map(|name| table.column_index(name))
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .zip(&indices)
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(InputError::MissingColumns { missing });
    }
    let indices: Vec<usize> = indices.into_iter().flatten().collect();

    if table.len() < MIN_OBSERVATIONS {
        return Err(InputError::InsufficientRows {
            required: MIN_OBSERVATIONS,
            found: table.len(),
        });
    }

    for (name, &col) in REQUIRED_COLUMNS.iter().zip(&indices) {
        for row in 0..table.len() {
            if is_missing(table.cell(row, col)) {
                return Err(InputError::MissingValues {
                    column: name.to_string(),
                    row: row + 1,
                });
            }
        }
    }

    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(REQUIRED_COLUMNS.len());
    for (name, &col) in REQUIRED_COLUMNS.iter().zip(&indices) {
        let mut values = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let raw = table.cell(row, col).unwrap_or_default();
            values.push(parse_number(raw).ok_or_else(|| InputError::NonNumericData {
                column: name.to_string(),
                row: row + 1,
                value: raw.to_string(),
            })?);
        }
        columns.push(values);
    }

    let y = columns.pop().unwrap_or_default();
    let x = columns.pop().unwrap_or_default();
    debug!(rows = x.len(), "validated input table");
    Ok(Observations::new(x, y))
}

/// Validate numeric columns that were already typed by the caller.
pub fn validate_columns(x: &[f64], y: &[f64]) -> Result<Observations, InputError> {
    let rows = x.len().min(y.len());
    if rows < MIN_OBSERVATIONS {
        return Err(InputError::InsufficientRows {
            required: MIN_OBSERVATIONS,
            found: rows,
        });
    }
    if x.len() != y.len() {
        return Err(InputError::MissingValues {
            column: if x.len() < y.len() { REQUIRED_COLUMNS[0] } else { REQUIRED_COLUMNS[1] }
                .to_string(),
            row: rows + 1,
        });
    }
    for (name, values) in REQUIRED_COLUMNS.iter().zip([x, y]) {
        if let Some(pos) = values.iter().position(|v| v.is_nan()) {
            return Err(InputError::MissingValues {
                column: name.to_string(),
                row: pos + 1,
            });
        }
        if let Some(pos) = values.iter().position(|v| v.is_infinite()) {
            return Err(InputError::NonNumericData {
                column: name.to_string(),
                row: pos + 1,
                value: values[pos].to_string(),
            });
        }
    }
    Ok(Observations::new(x.to_vec(), y.to_vec()))
}

fn is_missing(cell: Option<&str>) -> bool {
    match cell {
        None => true,
        Some(s) => {
            let s = s.trim();
            s.is_empty() || NA_MARKERS.contains(&s)
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_table() -> RawTable {
        RawTable::from_strings(
            &["F.S.Flux", "Ele.Flow"],
            &[
                &["1.0", "10.5"],
                &["2.0", "20.3"],
                &["3.0", "30.1"],
                &["4.0", "40.8"],
                &["5.0", "50.2"],
            ],
        )
    }

    #[test]
    fn test_validate_success() {
        let obs = validate_table(&valid_table()).unwrap();
        assert_eq!(obs.len(), 5);
        assert_eq!(obs.x, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(obs.y[4], 50.2);
    }

    #[test]
    fn test_column_order_and_extra_columns() {
        let table = RawTable::from_strings(
            &["note", "Ele.Flow", "F.S.Flux"],
            &[&["a", "10", "1"], &["b", "20", "2"], &["c", "30", "3"]],
        );
        let obs = validate_table(&table).unwrap();
        assert_eq!(obs.x, vec![1.0, 2.0, 3.0]);
        assert_eq!(obs.y, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_missing_column() {
        let table = RawTable::from_strings(&["F.S.Flux"], &[&["1"], &["2"], &["3"]]);
        let err = validate_table(&table).unwrap_err();
        assert_eq!(
            err,
            InputError::MissingColumns {
                missing: vec!["Ele.Flow".to_string()]
            }
        );
    }

    #[test]
    fn test_missing_columns_reported_before_row_count() {
        let table = RawTable::from_strings(&["x", "y"], &[]);
        match validate_table(&table).unwrap_err() {
            InputError::MissingColumns { missing } => assert_eq!(missing.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_too_few_rows() {
        let table = RawTable::from_strings(&["F.S.Flux", "Ele.Flow"], &[&["1", "10"], &["2", "20"]]);
        let err = validate_table(&table).unwrap_err();
        assert_eq!(err, InputError::InsufficientRows { required: 3, found: 2 });
        assert!(err.to_string().contains("At least 3 rows"));
    }

    #[test]
    fn test_missing_values() {
        let mut table = valid_table();
        table.rows[1][0] = None;
        let err = validate_table(&table).unwrap_err();
        assert_eq!(
            err,
            InputError::MissingValues {
                column: "F.S.Flux".to_string(),
                row: 2
            }
        );

        let mut table = valid_table();
        table.rows[2][1] = Some("  ".to_string());
        assert!(matches!(validate_table(&table), Err(InputError::MissingValues { .. })));

        let mut table = valid_table();
        table.rows[0][1] = Some("NaN".to_string());
        assert!(matches!(validate_table(&table), Err(InputError::MissingValues { .. })));
    }

    #[test]
    fn test_na_markers_are_missing() {
        for marker in NA_MARKERS {
            let mut table = valid_table();
            table.rows[1][1] = Some(marker.to_string());
            assert_eq!(
                validate_table(&table),
                Err(InputError::MissingValues {
                    column: "Ele.Flow".to_string(),
                    row: 2
                }),
                "marker {:?}",
                marker
            );
        }

        let mut table = valid_table();
        table.rows[1][1] = Some(" n/a ".to_string());
        assert!(matches!(validate_table(&table), Err(InputError::MissingValues { row: 2, .. })));
    }

    #[test]
    fn test_missing_values_checked_before_non_numeric() {
        let mut table = valid_table();
        table.rows[0][1] = Some("x".to_string());
        table.rows[3][0] = None;
        assert!(matches!(validate_table(&table), Err(InputError::MissingValues { .. })));
    }

    #[test]
    fn test_non_numeric() {
        let mut table = valid_table();
        table.rows[1][1] = Some("x".to_string());
        let err = validate_table(&table).unwrap_err();
        assert_eq!(
            err,
            InputError::NonNumericData {
                column: "Ele.Flow".to_string(),
                row: 2,
                value: "x".to_string()
            }
        );

        let mut table = valid_table();
        table.rows[0][0] = Some("inf".to_string());
        assert!(matches!(validate_table(&table), Err(InputError::NonNumericData { .. })));
    }

    #[test]
    fn test_whitespace_and_exponents_are_numeric() {
        let table = RawTable::from_strings(
            &["F.S.Flux", "Ele.Flow"],
            &[&[" 1 ", "1e4"], &["2", "2.5E4"], &["3", "-3"]],
        );
        let obs = validate_table(&table).unwrap();
        assert_eq!(obs.y, vec![10000.0, 25000.0, -3.0]);
    }

    #[test]
    fn test_validate_columns() {
        assert!(validate_columns(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).is_ok());
        assert!(matches!(
            validate_columns(&[1.0, 2.0], &[1.0, 2.0]),
            Err(InputError::InsufficientRows { found: 2, .. })
        ));
        assert!(matches!(
            validate_columns(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0]),
            Err(InputError::MissingValues { row: 2, .. })
        ));
        assert!(matches!(
            validate_columns(&[1.0, 2.0, 3.0], &[1.0, f64::INFINITY, 3.0]),
            Err(InputError::NonNumericData { .. })
        ));
    }
}
