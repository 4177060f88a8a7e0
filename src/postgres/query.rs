use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

use crate::attributes::ConnectionAttributes;
use crate::error::{SqlKitError, postgres_code};
use crate::results::ResultSet;
use crate::types::RowValues;

pub(crate) fn execution_error(err: &tokio_postgres::Error) -> SqlKitError {
    SqlKitError::execution(err.to_string(), postgres_code(err))
}

fn get<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Result<Option<T>, SqlKitError> {
    row.try_get(idx).map_err(|e| execution_error(&e))
}

/// Build a result set from rows already fetched, shaped by `attributes`.
///
/// # Errors
/// Returns `SqlKitError::ExecutionError` if a column has a type that cannot be read.
pub fn build_result_set(
    column_names: &[&str],
    rows: &[Row],
    attributes: &ConnectionAttributes,
) -> Result<ResultSet, SqlKitError> {
    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(Arc::new(attributes.shape_column_names(column_names)));

    for row in rows {
        let mut row_values = Vec::with_capacity(column_names.len());
        for i in 0..column_names.len() {
            row_values.push(attributes.shape_value(postgres_extract_value(row, i)?));
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Extract a `RowValues` from a tokio-postgres row, keyed on the column's type name.
///
/// # Errors
/// Returns `SqlKitError::ExecutionError` if the column type has no `RowValues` equivalent.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<RowValues, SqlKitError> {
    let type_info = row.columns()[idx].type_();

    let value = match type_info.name() {
        "int2" => get::<i16>(row, idx)?.map(|v| RowValues::Int(i64::from(v))),
        "int4" => get::<i32>(row, idx)?.map(|v| RowValues::Int(i64::from(v))),
        "int8" => get::<i64>(row, idx)?.map(RowValues::Int),
        "oid" => get::<u32>(row, idx)?.map(|v| RowValues::Int(i64::from(v))),
        "float4" => get::<f32>(row, idx)?.map(|v| RowValues::Float(f64::from(v))),
        "float8" => get::<f64>(row, idx)?.map(RowValues::Float),
        "bool" => get::<bool>(row, idx)?.map(RowValues::Bool),
        "timestamp" => get::<NaiveDateTime>(row, idx)?.map(RowValues::Timestamp),
        "timestamptz" => {
            get::<DateTime<Utc>>(row, idx)?.map(|v| RowValues::Timestamp(v.naive_utc()))
        }
        "date" => {
            get::<NaiveDate>(row, idx)?.map(|v| RowValues::Timestamp(v.and_time(NaiveTime::MIN)))
        }
        "json" | "jsonb" => get::<Value>(row, idx)?.map(RowValues::JSON),
        "bytea" => get::<Vec<u8>>(row, idx)?.map(RowValues::Blob),
        "text" | "varchar" | "bpchar" | "name" | "unknown" => {
            get::<String>(row, idx)?.map(RowValues::Text)
        }
        other => {
            // Anything else that decodes as text (citext, enums) is still usable.
            get::<String>(row, idx)
                .map_err(|_| {
                    SqlKitError::execution(
                        format!(
                            "column `{}` has unsupported type `{other}`; cast it in SQL",
                            row.columns()[idx].name()
                        ),
                        None,
                    )
                })?
                .map(RowValues::Text)
        }
    };

    Ok(value.unwrap_or(RowValues::Null))
}
