use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{Statement, params_from_iter};

use crate::attributes::ConnectionAttributes;
use crate::error::{SqlKitError, sqlite_code};
use crate::results::ResultSet;
use crate::types::RowValues;

pub(crate) fn execution_error(err: &rusqlite::Error) -> SqlKitError {
    SqlKitError::execution(err.to_string(), sqlite_code(err))
}

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
/// Returns `SqlKitError::ExecutionError` if the value cannot be read.
pub fn sqlite_extract_value_sync(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<RowValues, SqlKitError> {
    let value: Value = row.get(idx).map_err(|e| execution_error(&e))?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Run a row-producing statement and buffer every row, shaped by `attributes`.
///
/// # Errors
/// Returns `SqlKitError::ExecutionError` if execution or reading a row fails.
pub fn build_result_set(
    stmt: &mut Statement<'_>,
    params: &[Value],
    attributes: &ConnectionAttributes,
) -> Result<ResultSet, SqlKitError> {
    let column_names = attributes.shape_column_names(&stmt.column_names());
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows_iter = stmt
        .query(params_from_iter(params.iter()))
        .map_err(|e| execution_error(&e))?;
    while let Some(row) = rows_iter.next().map_err(|e| execution_error(&e))? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(attributes.shape_value(sqlite_extract_value_sync(row, i)?));
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
