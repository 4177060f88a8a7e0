use rusqlite::params_from_iter;
use tracing::debug;

use super::params::Params;
use super::query::{build_result_set, execution_error};
use crate::attributes::ConnectionAttributes;
use crate::driver::{DriverConnection, DriverStatement};
use crate::error::{SqlKitError, sqlite_code};
use crate::results::CustomDbRow;
use crate::types::{DriverKind, RowValues};

/// A rusqlite connection plus the attributes currently applied to it.
///
/// Attributes are tracked client-side: `SQLite` has no server-side equivalent, so they shape
/// how fetched rows are reported.
pub struct SqliteConnectionHandle {
    conn: rusqlite::Connection,
    attributes: ConnectionAttributes,
}

impl SqliteConnectionHandle {
    /// Wrap an already-open connection, for example one configured with custom functions.
    #[must_use]
    pub fn new(conn: rusqlite::Connection) -> Self {
        Self {
            conn,
            attributes: ConnectionAttributes::default(),
        }
    }

    /// Borrow the underlying rusqlite connection.
    #[must_use]
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }

    #[must_use]
    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }
}

impl std::fmt::Debug for SqliteConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnectionHandle")
            .field("path", &self.conn.path())
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl DriverConnection for SqliteConnectionHandle {
    fn driver_kind(&self) -> DriverKind {
        DriverKind::Sqlite
    }

    fn attributes(&self) -> ConnectionAttributes {
        self.attributes
    }

    fn set_attributes(&mut self, attributes: &ConnectionAttributes) -> Result<(), SqlKitError> {
        self.attributes = *attributes;
        Ok(())
    }

    fn prepare<'conn>(
        &'conn mut self,
        sql: &str,
    ) -> Result<Box<dyn DriverStatement + 'conn>, SqlKitError> {
        let stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| SqlKitError::statement(e.to_string(), sqlite_code(&e)))?;
        Ok(Box::new(SqliteStatement {
            stmt,
            attributes: self.attributes,
            pending: Vec::new().into_iter(),
        }))
    }

    fn last_insert_id(&mut self, sequence_name: Option<&str>) -> Result<String, SqlKitError> {
        if let Some(sequence_name) = sequence_name {
            debug!(sequence_name, "SQLite has no sequences; returning last rowid");
        }
        Ok(self.conn.last_insert_rowid().to_string())
    }
}

/// A prepared rusqlite statement. Rows are buffered on execute and handed out by `fetch_one`.
struct SqliteStatement<'conn> {
    stmt: rusqlite::Statement<'conn>,
    attributes: ConnectionAttributes,
    pending: std::vec::IntoIter<CustomDbRow>,
}

impl DriverStatement for SqliteStatement<'_> {
    fn execute(&mut self, params: &[RowValues]) -> Result<usize, SqlKitError> {
        let converted = Params::convert(params);

        if self.stmt.column_count() == 0 {
            self.pending = Vec::new().into_iter();
            return self
                .stmt
                .execute(params_from_iter(converted.as_values().iter()))
                .map_err(|e| execution_error(&e));
        }

        let result_set = build_result_set(&mut self.stmt, converted.as_values(), &self.attributes)?;
        let matched = result_set.rows_affected;
        self.pending = result_set.into_iter();
        Ok(matched)
    }

    fn fetch_one(&mut self) -> Result<Option<CustomDbRow>, SqlKitError> {
        Ok(self.pending.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::CaseMode;

    fn handle() -> SqliteConnectionHandle {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (Id INTEGER PRIMARY KEY, Name TEXT);
             INSERT INTO t (Name) VALUES ('a'), ('b');",
        )
        .unwrap();
        SqliteConnectionHandle::new(conn)
    }

    #[test]
    fn buffers_rows_and_reports_match_count() {
        let mut h = handle();
        let mut stmt = h.prepare("SELECT Id, Name FROM t ORDER BY Id").unwrap();
        assert_eq!(stmt.execute(&[]).unwrap(), 2);
        let first = stmt.fetch_one().unwrap().unwrap();
        assert_eq!(first.get("Name"), Some(&RowValues::Text("a".into())));
        assert!(stmt.fetch_one().unwrap().is_some());
        assert!(stmt.fetch_one().unwrap().is_none());
    }

    #[test]
    fn attributes_shape_fetches() {
        let mut h = handle();
        h.set_attributes(&ConnectionAttributes {
            case: CaseMode::Lower,
            stringify_fetches: true,
            ..ConnectionAttributes::desired()
        })
        .unwrap();
        let mut stmt = h.prepare("SELECT Id FROM t WHERE Name = ?").unwrap();
        stmt.execute(&[RowValues::Text("b".into())]).unwrap();
        let row = stmt.fetch_one().unwrap().unwrap();
        assert_eq!(row.get("id"), Some(&RowValues::Text("2".into())));
    }

    #[test]
    fn prepare_failure_carries_code() {
        let mut h = handle();
        let err = h.prepare("SELECT * FROM missing").err().unwrap();
        assert!(matches!(err, SqlKitError::StatementError { .. }));
        assert!(err.native_code().is_some());
    }

    #[test]
    fn last_insert_id_is_rowid() {
        let mut h = handle();
        let affected = h
            .prepare("INSERT INTO t (Name) VALUES (?)")
            .unwrap()
            .execute(&["c".into()])
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(h.last_insert_id(None).unwrap(), "3");
    }
}
