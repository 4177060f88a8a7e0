//! Dialect-aware identifier quoting.

use crate::types::DriverKind;

/// A table reference: a single identifier or schema-qualified parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableName {
    Single(String),
    Qualified(Vec<String>),
}

impl From<&str> for TableName {
    fn from(name: &str) -> Self {
        TableName::Single(name.to_string())
    }
}

impl From<String> for TableName {
    fn from(name: String) -> Self {
        TableName::Single(name)
    }
}

impl From<&String> for TableName {
    fn from(name: &String) -> Self {
        TableName::Single(name.clone())
    }
}

impl From<Vec<String>> for TableName {
    fn from(parts: Vec<String>) -> Self {
        TableName::Qualified(parts)
    }
}

impl From<&[&str]> for TableName {
    fn from(parts: &[&str]) -> Self {
        TableName::Qualified(parts.iter().map(|p| (*p).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TableName {
    fn from(parts: [&str; N]) -> Self {
        TableName::Qualified(parts.iter().map(|p| (*p).to_string()).collect())
    }
}

/// Quote one identifier for `kind`: backticks for `MySQL`, double quotes otherwise.
/// Embedded quote characters are doubled.
///
/// ```rust
/// use sql_kit::prelude::*;
/// use sql_kit::quoting::quote_identifier;
///
/// assert_eq!(quote_identifier(DriverKind::Mysql, "weird`name"), "`weird``name`");
/// assert_eq!(quote_identifier(DriverKind::Postgresql, "wei\"rd"), "\"wei\"\"rd\"");
/// ```
#[must_use]
pub fn quote_identifier(kind: DriverKind, name: &str) -> String {
    let quote = kind.quote_char();
    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    for ch in name.chars() {
        if ch == quote {
            out.push(quote);
        }
        out.push(ch);
    }
    out.push(quote);
    out
}

/// Quote a table reference; qualified parts are quoted one by one and joined with `.`.
#[must_use]
pub fn quote_table_name(kind: DriverKind, table: &TableName) -> String {
    match table {
        TableName::Single(name) => quote_identifier(kind, name),
        TableName::Qualified(parts) => parts
            .iter()
            .map(|part| quote_identifier(kind, part))
            .collect::<Vec<_>>()
            .join("."),
    }
}
