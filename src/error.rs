use thiserror::Error;

/// Coarse classification of a [`SqlKitError`], for callers that want to branch without
/// matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    Argument,
    Connection,
    Statement,
    Execution,
    Config,
    Unsupported,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqlKitError {
    /// Caller supplied an argument the operation cannot work with (e.g. an empty WHERE mapping).
    #[error("Argument error: {0}")]
    ArgumentError(String),

    /// Opening the underlying connection failed.
    #[error("Connection error: {message}")]
    ConnectionError {
        message: String,
        code: Option<String>,
    },

    /// Preparing a statement failed.
    #[error("Statement error: {message}")]
    StatementError {
        message: String,
        code: Option<String>,
    },

    /// Executing a prepared statement (or fetching from it) failed.
    #[error("SQL execution error: {message}")]
    ExecutionError {
        message: String,
        code: Option<String>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl SqlKitError {
    pub fn connection(message: impl Into<String>, code: Option<String>) -> Self {
        SqlKitError::ConnectionError {
            message: message.into(),
            code,
        }
    }

    pub fn statement(message: impl Into<String>, code: Option<String>) -> Self {
        SqlKitError::StatementError {
            message: message.into(),
            code,
        }
    }

    pub fn execution(message: impl Into<String>, code: Option<String>) -> Self {
        SqlKitError::ExecutionError {
            message: message.into(),
            code,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SqlKitError::ArgumentError(_) => ErrorKind::Argument,
            SqlKitError::ConnectionError { .. } => ErrorKind::Connection,
            SqlKitError::StatementError { .. } => ErrorKind::Statement,
            SqlKitError::ExecutionError { .. } => ErrorKind::Execution,
            SqlKitError::ConfigError(_) => ErrorKind::Config,
            SqlKitError::Unsupported(_) => ErrorKind::Unsupported,
        }
    }

    /// Native error code reported by the driver, if any (SQLite extended result code,
    /// PostgreSQL SQLSTATE).
    #[must_use]
    pub fn native_code(&self) -> Option<&str> {
        match self {
            SqlKitError::ConnectionError { code, .. }
            | SqlKitError::StatementError { code, .. }
            | SqlKitError::ExecutionError { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SqlKitError {
    fn from(err: serde_json::Error) -> Self {
        SqlKitError::ConfigError(format!("invalid descriptor config: {err}"))
    }
}

#[cfg(feature = "sqlite")]
pub(crate) fn sqlite_code(err: &rusqlite::Error) -> Option<String> {
    match err {
        rusqlite::Error::SqliteFailure(native, _) => Some(native.extended_code.to_string()),
        _ => None,
    }
}

#[cfg(feature = "postgres")]
pub(crate) fn postgres_code(err: &tokio_postgres::Error) -> Option<String> {
    err.code().map(|state| state.code().to_string())
}
