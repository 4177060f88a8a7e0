use tracing::debug;

use super::connection::SqliteConnectionHandle;
use crate::driver::{Driver, DriverConnection};
use crate::dsn::Dsn;
use crate::error::{SqlKitError, sqlite_code};
use crate::types::DriverKind;

/// Database path used when the DSN names none.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Built-in `SQLite` driver.
///
/// The database file comes from the `dbname` component (`sqlite:dbname=app.db`). A bare path
/// after the prefix (`sqlite:/tmp/app.db`) is accepted too; with neither, an in-memory
/// database is opened. A `dbname` value cannot contain `;`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    /// Path the driver would open for `dsn`.
    #[must_use]
    pub fn database_path(dsn: &Dsn) -> &str {
        if let Some(path) = dsn.component("dbname") {
            return path;
        }
        match dsn.connection_string().split_once(':') {
            Some((_, rest)) if !rest.is_empty() && !rest.contains('=') => rest,
            _ => IN_MEMORY_PATH,
        }
    }
}

impl Driver for SqliteDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Sqlite
    }

    fn open(&self, dsn: &Dsn) -> Result<Box<dyn DriverConnection>, SqlKitError> {
        if dsn.component("dbname").is_some()
            && let Some(stray) = dsn.stray_segment()
        {
            return Err(SqlKitError::connection(
                format!("DSN segment `{stray}` has no `=`; component values cannot contain `;`"),
                None,
            ));
        }
        let path = Self::database_path(dsn);
        let conn = rusqlite::Connection::open(path).map_err(|e| {
            SqlKitError::connection(
                format!("failed to open SQLite database `{path}`: {e}"),
                sqlite_code(&e),
            )
        })?;
        debug!(path, "opened SQLite database");
        Ok(Box::new(SqliteConnectionHandle::new(conn)))
    }
}
