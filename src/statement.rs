//! SQL text builders for the CRUD helpers.
//!
//! Values are never interpolated: every value becomes a `?` placeholder and is returned in
//! binding order next to the statement text.

use crate::error::SqlKitError;
use crate::quoting::{TableName, quote_identifier, quote_table_name};
use crate::types::{DriverKind, RowValues};

/// Statement text plus its positional bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAndParams {
    pub query: String,
    pub params: Vec<RowValues>,
}

/// `INSERT INTO <table> (<cols>) VALUES (?, ...);`
///
/// # Errors
/// Returns `SqlKitError::ArgumentError` when `values` is empty.
pub fn build_insert(
    kind: DriverKind,
    table: &TableName,
    values: &[(&str, RowValues)],
) -> Result<QueryAndParams, SqlKitError> {
    ensure_non_empty(values, "insert requires at least one column")?;
    let columns: Vec<String> = values
        .iter()
        .map(|(col, _)| quote_identifier(kind, col))
        .collect();
    let placeholders = vec!["?"; values.len()].join(", ");
    let query = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders});",
        quote_table_name(kind, table),
        columns.join(", ")
    );
    Ok(QueryAndParams {
        query,
        params: values.iter().map(|(_, v)| v.clone()).collect(),
    })
}

/// `UPDATE <table> SET <col> = ?, ... WHERE <col> = ? AND ...;`
///
/// Bound values are the SET values followed by the WHERE values.
///
/// # Errors
/// Returns `SqlKitError::ArgumentError` when either mapping is empty.
pub fn build_update(
    kind: DriverKind,
    table: &TableName,
    set: &[(&str, RowValues)],
    filter: &[(&str, RowValues)],
) -> Result<QueryAndParams, SqlKitError> {
    ensure_non_empty(set, "update requires at least one column to set")?;
    ensure_non_empty(filter, "update requires at least one where predicate")?;
    let mut params = Vec::with_capacity(set.len() + filter.len());
    let directives = equality_list(kind, set, &mut params);
    let predicates = equality_list(kind, filter, &mut params);
    let query = format!(
        "UPDATE {} SET {} WHERE {};",
        quote_table_name(kind, table),
        directives.join(", "),
        predicates.join(" AND ")
    );
    Ok(QueryAndParams { query, params })
}

/// `DELETE FROM <table> WHERE <col> = ? AND ...;`
///
/// # Errors
/// Returns `SqlKitError::ArgumentError` when `filter` is empty.
pub fn build_delete(
    kind: DriverKind,
    table: &TableName,
    filter: &[(&str, RowValues)],
) -> Result<QueryAndParams, SqlKitError> {
    ensure_non_empty(filter, "delete requires at least one where predicate")?;
    let mut params = Vec::with_capacity(filter.len());
    let predicates = equality_list(kind, filter, &mut params);
    let query = format!(
        "DELETE FROM {} WHERE {};",
        quote_table_name(kind, table),
        predicates.join(" AND ")
    );
    Ok(QueryAndParams { query, params })
}

pub(crate) fn ensure_non_empty(
    mapping: &[(&str, RowValues)],
    message: &str,
) -> Result<(), SqlKitError> {
    if mapping.is_empty() {
        Err(SqlKitError::ArgumentError(message.to_string()))
    } else {
        Ok(())
    }
}

fn equality_list(
    kind: DriverKind,
    mapping: &[(&str, RowValues)],
    params: &mut Vec<RowValues>,
) -> Vec<String> {
    mapping
        .iter()
        .map(|(col, value)| {
            params.push(value.clone());
            format!("{} = ?", quote_identifier(kind, col))
        })
        .collect()
}
