use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::SqlKitError;

/// Values that can be bound to a statement or fetched from a row.
///
/// The same enum is used for every dialect so callers never branch on driver types:
/// ```rust
/// use sql_kit::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Render a scalar as text, the way a driver with forced-string fetches would.
    /// `Null` stays `Null`; blobs are decoded lossily.
    #[must_use]
    pub fn into_text(self) -> RowValues {
        match self {
            RowValues::Null => RowValues::Null,
            RowValues::Text(s) => RowValues::Text(s),
            RowValues::Int(i) => RowValues::Text(i.to_string()),
            RowValues::Float(f) => RowValues::Text(f.to_string()),
            RowValues::Bool(b) => RowValues::Text(if b { "1" } else { "0" }.to_string()),
            RowValues::Timestamp(dt) => RowValues::Text(dt.format("%F %T%.f").to_string()),
            RowValues::JSON(v) => RowValues::Text(v.to_string()),
            RowValues::Blob(bytes) => RowValues::Text(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<JsonValue> for RowValues {
    fn from(value: JsonValue) -> Self {
        RowValues::JSON(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// The SQL dialect a connection speaks.
///
/// Governs identifier quoting, the default port and charset suggested for a descriptor, and
/// the key the charset is emitted under in a connection string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum DriverKind {
    /// `PostgreSQL`
    #[value(name = "postgresql", aliases = ["pgsql", "postgres"])]
    #[serde(rename = "postgresql", alias = "pgsql", alias = "postgres")]
    Postgresql,
    /// `MySQL` / `MariaDB`
    #[value(name = "mysql")]
    #[serde(rename = "mysql")]
    Mysql,
    /// `SQLite`
    #[value(name = "sqlite")]
    #[serde(rename = "sqlite")]
    Sqlite,
}

struct Dialect {
    name: &'static str,
    default_port: Option<u16>,
    default_charset: Option<&'static str>,
    charset_key: &'static str,
    quote_char: char,
}

const POSTGRESQL: Dialect = Dialect {
    name: "postgresql",
    default_port: Some(5432),
    default_charset: Some("UTF8"),
    charset_key: "client_encoding",
    quote_char: '"',
};

const MYSQL: Dialect = Dialect {
    name: "mysql",
    default_port: Some(3306),
    default_charset: Some("utf8mb4"),
    charset_key: "charset",
    quote_char: '`',
};

const SQLITE: Dialect = Dialect {
    name: "sqlite",
    default_port: None,
    default_charset: None,
    charset_key: "charset",
    quote_char: '"',
};

impl DriverKind {
    fn dialect(self) -> &'static Dialect {
        match self {
            DriverKind::Postgresql => &POSTGRESQL,
            DriverKind::Mysql => &MYSQL,
            DriverKind::Sqlite => &SQLITE,
        }
    }

    /// Identifier used as the connection-string prefix.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.dialect().name
    }

    #[must_use]
    pub fn default_port(self) -> Option<u16> {
        self.dialect().default_port
    }

    #[must_use]
    pub fn default_charset(self) -> Option<&'static str> {
        self.dialect().default_charset
    }

    /// Connection-string key the charset is emitted under.
    #[must_use]
    pub fn charset_key(self) -> &'static str {
        self.dialect().charset_key
    }

    /// Character used to delimit identifiers.
    #[must_use]
    pub fn quote_char(self) -> char {
        self.dialect().quote_char
    }

    /// Parse a driver name, returning `None` for anything unrecognized.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name.trim(), true).ok()
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverKind {
    type Err = SqlKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| SqlKitError::ConfigError(format!("unrecognized driver kind: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_table_matches_documented_defaults() {
        assert_eq!(DriverKind::Mysql.default_port(), Some(3306));
        assert_eq!(DriverKind::Mysql.default_charset(), Some("utf8mb4"));
        assert_eq!(DriverKind::Postgresql.default_port(), Some(5432));
        assert_eq!(DriverKind::Postgresql.default_charset(), Some("UTF8"));
        assert_eq!(DriverKind::Sqlite.default_port(), None);
        assert_eq!(DriverKind::Sqlite.default_charset(), None);
    }

    #[test]
    fn charset_key_and_quote_char_per_dialect() {
        assert_eq!(DriverKind::Postgresql.charset_key(), "client_encoding");
        assert_eq!(DriverKind::Mysql.charset_key(), "charset");
        assert_eq!(DriverKind::Mysql.quote_char(), '`');
        assert_eq!(DriverKind::Postgresql.quote_char(), '"');
        assert_eq!(DriverKind::Sqlite.quote_char(), '"');
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!(DriverKind::from_name("postgresql"), Some(DriverKind::Postgresql));
        assert_eq!(DriverKind::from_name("pgsql"), Some(DriverKind::Postgresql));
        assert_eq!(DriverKind::from_name("MySQL"), Some(DriverKind::Mysql));
        assert_eq!(DriverKind::from_name("sqlite"), Some(DriverKind::Sqlite));
        assert_eq!(DriverKind::from_name("oracle"), None);
        assert!("oracle".parse::<DriverKind>().is_err());
        assert_eq!(DriverKind::Postgresql.to_string(), "postgresql");
    }

    #[test]
    fn into_text_keeps_null() {
        assert_eq!(RowValues::Null.into_text(), RowValues::Null);
        assert_eq!(RowValues::Int(0).into_text(), RowValues::Text("0".into()));
        assert_eq!(RowValues::Bool(true).into_text(), RowValues::Text("1".into()));
    }
}
