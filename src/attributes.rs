//! Typed connection attributes.
//!
//! A connection carries one [`ConnectionAttributes`] snapshot at a time. The engine applies
//! [`ConnectionAttributes::desired`] before each operation and puts the previous snapshot back
//! afterwards.

use crate::types::RowValues;

/// How the driver reports failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorMode {
    /// Failures are recorded on the handle only.
    Silent,
    /// Failures are recorded and a warning is emitted.
    Warning,
    /// Failures are raised as errors.
    Exception,
}

/// Shape of fetched rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchShape {
    /// Ordered mapping of column name to value.
    Associative,
    /// Positional values only.
    Numeric,
    /// Both names and positions.
    Both,
}

/// Case applied to fetched column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseMode {
    Natural,
    Lower,
    Upper,
}

impl CaseMode {
    #[must_use]
    pub fn apply(self, name: &str) -> String {
        match self {
            CaseMode::Natural => name.to_string(),
            CaseMode::Lower => name.to_lowercase(),
            CaseMode::Upper => name.to_uppercase(),
        }
    }
}

/// One snapshot of every attribute the engine manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionAttributes {
    pub error_mode: ErrorMode,
    pub fetch_shape: FetchShape,
    /// Emulate prepared statements client-side instead of using server-side prepares.
    pub emulate_prepares: bool,
    pub case: CaseMode,
    /// Convert every fetched scalar to text.
    pub stringify_fetches: bool,
}

impl ConnectionAttributes {
    /// The configuration every engine operation runs under.
    #[must_use]
    pub const fn desired() -> Self {
        Self {
            error_mode: ErrorMode::Exception,
            fetch_shape: FetchShape::Associative,
            emulate_prepares: false,
            case: CaseMode::Natural,
            stringify_fetches: false,
        }
    }

    /// Column names as they should be reported under `case`.
    #[must_use]
    pub fn shape_column_names<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        names.iter().map(|name| self.case.apply(name.as_ref())).collect()
    }

    /// A fetched value as it should be reported under `stringify_fetches`.
    #[must_use]
    pub fn shape_value(&self, value: RowValues) -> RowValues {
        if self.stringify_fetches {
            value.into_text()
        } else {
            value
        }
    }
}

/// Values a freshly opened connection starts with.
impl Default for ConnectionAttributes {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Silent,
            fetch_shape: FetchShape::Both,
            emulate_prepares: true,
            case: CaseMode::Natural,
            stringify_fetches: false,
        }
    }
}
