//! The driver collaborator contract.
//!
//! The engine never speaks a wire protocol itself. It opens, prepares, executes and fetches
//! through these traits. Built-in implementations live in the `sqlite` and `postgres`
//! modules; anything else (for example a `MySQL` driver) can be plugged in by implementing
//! [`Driver`] and handing it to [`crate::Engine::from_dsn_with_driver`].

use std::sync::Arc;

use crate::attributes::ConnectionAttributes;
use crate::dsn::Dsn;
use crate::error::SqlKitError;
use crate::results::CustomDbRow;
use crate::types::{DriverKind, RowValues};

/// Opens connections for one dialect.
pub trait Driver: Send + Sync {
    fn kind(&self) -> DriverKind;

    /// Open a connection described by `dsn`.
    ///
    /// # Errors
    /// Returns `SqlKitError::ConnectionError` when the connection cannot be established.
    fn open(&self, dsn: &Dsn) -> Result<Box<dyn DriverConnection>, SqlKitError>;
}

/// A live connection handle.
pub trait DriverConnection: Send {
    /// Dialect reported by the handle's metadata.
    fn driver_kind(&self) -> DriverKind;

    /// Attributes currently in effect.
    fn attributes(&self) -> ConnectionAttributes;

    /// Replace the attributes in effect.
    ///
    /// # Errors
    /// Returns an error if the driver rejects one of the values.
    fn set_attributes(&mut self, attributes: &ConnectionAttributes) -> Result<(), SqlKitError>;

    /// Prepare `sql` (written with `?` placeholders).
    ///
    /// # Errors
    /// Returns `SqlKitError::StatementError` when the driver refuses the statement.
    fn prepare<'conn>(
        &'conn mut self,
        sql: &str,
    ) -> Result<Box<dyn DriverStatement + 'conn>, SqlKitError>;

    /// Identity generated by the last insert, as the driver reports it.
    ///
    /// # Errors
    /// Returns `SqlKitError::ExecutionError` when the driver cannot report one.
    fn last_insert_id(&mut self, sequence_name: Option<&str>) -> Result<String, SqlKitError>;
}

/// A prepared statement.
pub trait DriverStatement {
    /// Execute with positional bound values.
    ///
    /// Returns the affected-row count for DML and the matched-row count for queries.
    ///
    /// # Errors
    /// Returns `SqlKitError::ExecutionError` when execution fails.
    fn execute(&mut self, params: &[RowValues]) -> Result<usize, SqlKitError>;

    /// Next row of the last execution, or `None` once exhausted.
    ///
    /// # Errors
    /// Returns `SqlKitError::ExecutionError` when the row cannot be read.
    fn fetch_one(&mut self) -> Result<Option<CustomDbRow>, SqlKitError>;
}

/// Collaborator compiled into this build for `kind`, if any.
#[must_use]
pub fn builtin_driver(kind: DriverKind) -> Option<Arc<dyn Driver>> {
    match kind {
        #[cfg(feature = "sqlite")]
        DriverKind::Sqlite => Some(Arc::new(crate::sqlite::SqliteDriver)),
        #[cfg(feature = "postgres")]
        DriverKind::Postgresql => Some(Arc::new(crate::postgres::PostgresDriver)),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}
