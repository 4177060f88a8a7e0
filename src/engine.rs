use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::attributes::ConnectionAttributes;
use crate::descriptor::ConnectionDescriptor;
use crate::driver::{Driver, DriverConnection, builtin_driver};
use crate::dsn::Dsn;
use crate::error::SqlKitError;
use crate::quoting::{self, TableName};
use crate::results::{CustomDbRow, ResultSet};
use crate::statement::{self, QueryAndParams, ensure_non_empty};
use crate::types::{DriverKind, RowValues};

/// Connection-owning SQL executor.
///
/// The connection is opened lazily on the first operation and kept for the engine's lifetime.
/// Every operation runs inside an attribute bracket: the engine applies
/// [`ConnectionAttributes::desired`], runs, then puts back whatever attributes were in effect
/// before. The restore happens on every exit path, including errors.
///
/// Operations take `&self`; a mutex serializes them, so one engine can be shared across threads
/// but never runs two operations at once.
///
/// ```rust,no_run
/// use sql_kit::prelude::*;
///
/// # fn demo() -> Result<(), SqlKitError> {
/// let source = ConnectionDescriptor::builder(DriverKind::Sqlite)
///     .database_name("app.db")
///     .finish();
/// let engine = Engine::from_descriptor(&source);
/// engine.exec("CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, name TEXT)", &[])?;
/// engine.insert("users", &[("name", "Alice".into())])?;
/// let row = engine.select_row("SELECT name FROM users WHERE id = ?", &[RowValues::Int(1)])?;
/// assert!(row.is_some());
/// # Ok(()) }
/// ```
pub struct Engine {
    state: Mutex<EngineState>,
    dsn: Option<Dsn>,
    driver: Option<Arc<dyn Driver>>,
    desired: ConnectionAttributes,
}

struct EngineState {
    handle: Option<Box<dyn DriverConnection>>,
    driver_kind: Option<DriverKind>,
    saved_attributes: Option<ConnectionAttributes>,
}

impl Engine {
    fn with_parts(
        handle: Option<Box<dyn DriverConnection>>,
        dsn: Option<Dsn>,
        driver: Option<Arc<dyn Driver>>,
        driver_kind: Option<DriverKind>,
    ) -> Self {
        Self {
            state: Mutex::new(EngineState {
                handle,
                driver_kind,
                saved_attributes: None,
            }),
            dsn,
            driver,
            desired: ConnectionAttributes::desired(),
        }
    }

    /// Wrap an already-open connection. The dialect is read from the handle on first use.
    #[must_use]
    pub fn from_handle(handle: Box<dyn DriverConnection>) -> Self {
        Self::with_parts(Some(handle), None, None, None)
    }

    /// Connect lazily through the built-in driver named by the DSN prefix.
    #[must_use]
    pub fn from_dsn(dsn: Dsn) -> Self {
        let kind = dsn.driver_kind();
        Self::with_parts(None, Some(dsn), None, kind)
    }

    /// Connect lazily through `driver` instead of a built-in one.
    #[must_use]
    pub fn from_dsn_with_driver(dsn: Dsn, driver: Arc<dyn Driver>) -> Self {
        let kind = dsn.driver_kind();
        Self::with_parts(None, Some(dsn), Some(driver), kind)
    }

    #[must_use]
    pub fn from_descriptor(descriptor: &ConnectionDescriptor) -> Self {
        let dsn = descriptor.to_dsn();
        Self::with_parts(None, Some(dsn), None, Some(descriptor.driver_kind()))
    }

    #[must_use]
    pub fn dsn(&self) -> Option<&Dsn> {
        self.dsn.as_ref()
    }

    /// Dialect of the connection, opening it if that is the only way to find out.
    ///
    /// # Errors
    /// Returns `SqlKitError::ConnectionError` if the connection has to be opened and that fails.
    pub fn driver_kind(&self) -> Result<DriverKind, SqlKitError> {
        let mut state = self.lock_state();
        self.ensure_connected(&mut state)
    }

    /// Quote a single identifier for this engine's dialect.
    ///
    /// # Errors
    /// Returns an error if resolving the dialect requires a connection that cannot be opened.
    pub fn quote_identifier(&self, name: &str) -> Result<String, SqlKitError> {
        Ok(quoting::quote_identifier(self.driver_kind()?, name))
    }

    /// Quote a table name; schema-qualified parts are quoted one by one and joined with `.`.
    ///
    /// # Errors
    /// Returns an error if resolving the dialect requires a connection that cannot be opened.
    pub fn quote_table_name(&self, table: impl Into<TableName>) -> Result<String, SqlKitError> {
        Ok(quoting::quote_table_name(
            self.driver_kind()?,
            &table.into(),
        ))
    }

    /// `INSERT INTO <table> (<cols>) VALUES (?, ...);` with `values` bound in order.
    ///
    /// # Errors
    /// Returns `SqlKitError::ArgumentError` for an empty mapping, or the driver error otherwise.
    pub fn insert(
        &self,
        table: impl Into<TableName>,
        values: &[(&str, RowValues)],
    ) -> Result<(), SqlKitError> {
        ensure_non_empty(values, "insert requires at least one column")?;
        let built = statement::build_insert(self.driver_kind()?, &table.into(), values)?;
        self.exec_built(&built)?;
        Ok(())
    }

    /// `UPDATE <table> SET .. WHERE ..;` returning the affected-row count.
    ///
    /// # Errors
    /// Returns `SqlKitError::ArgumentError` if either mapping is empty; nothing is sent to the
    /// driver in that case.
    pub fn update(
        &self,
        table: impl Into<TableName>,
        set: &[(&str, RowValues)],
        filter: &[(&str, RowValues)],
    ) -> Result<usize, SqlKitError> {
        ensure_non_empty(set, "update requires at least one column to set")?;
        ensure_non_empty(filter, "update requires at least one where predicate")?;
        let built = statement::build_update(self.driver_kind()?, &table.into(), set, filter)?;
        self.exec_built(&built)
    }

    /// `DELETE FROM <table> WHERE ..;` returning the affected-row count.
    ///
    /// # Errors
    /// Returns `SqlKitError::ArgumentError` if `filter` is empty.
    pub fn delete(
        &self,
        table: impl Into<TableName>,
        filter: &[(&str, RowValues)],
    ) -> Result<usize, SqlKitError> {
        ensure_non_empty(filter, "delete requires at least one where predicate")?;
        let built = statement::build_delete(self.driver_kind()?, &table.into(), filter)?;
        self.exec_built(&built)
    }

    /// Prepare and execute `statement`, returning the driver-reported affected-row count.
    ///
    /// # Errors
    /// Returns `SqlKitError::StatementError` if preparing fails and
    /// `SqlKitError::ExecutionError` if executing fails.
    pub fn exec(&self, statement: &str, params: &[RowValues]) -> Result<usize, SqlKitError> {
        let mut bracket = self.connect()?;
        let affected = {
            let handle = bracket.handle()?;
            debug!(sql = statement, params = params.len(), "exec");
            let mut prepared = handle.prepare(statement)?;
            prepared.execute(params)?
        };
        bracket.disconnect()?;
        Ok(affected)
    }

    /// Fetch at most one row.
    ///
    /// Returns `Ok(None)` when nothing matched, which is distinct from a row whose values
    /// are all falsy.
    ///
    /// # Errors
    /// Returns `SqlKitError::StatementError` or `SqlKitError::ExecutionError` from the driver.
    pub fn select_row(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<Option<CustomDbRow>, SqlKitError> {
        let mut bracket = self.connect()?;
        let row = {
            let handle = bracket.handle()?;
            debug!(sql = query, params = params.len(), "select_row");
            let mut prepared = handle.prepare(query)?;
            let matched = prepared.execute(params)?;
            let row = prepared.fetch_one()?;
            if row.is_none() && matched > 0 {
                debug!(matched, "driver reported matches but returned no row");
            }
            row
        };
        bracket.disconnect()?;
        Ok(row)
    }

    /// Fetch every row.
    ///
    /// # Errors
    /// Returns `SqlKitError::StatementError` or `SqlKitError::ExecutionError` from the driver.
    pub fn select_all(&self, query: &str, params: &[RowValues]) -> Result<ResultSet, SqlKitError> {
        let mut bracket = self.connect()?;
        let result_set = {
            let handle = bracket.handle()?;
            debug!(sql = query, params = params.len(), "select_all");
            let mut prepared = handle.prepare(query)?;
            let matched = prepared.execute(params)?;
            let mut result_set = ResultSet::with_capacity(matched);
            while let Some(row) = prepared.fetch_one()? {
                result_set.add_row(row);
            }
            result_set
        };
        bracket.disconnect()?;
        Ok(result_set)
    }

    /// Identity generated by the most recent insert, exactly as the driver reports it.
    ///
    /// # Errors
    /// Returns the driver's error if it cannot report an identity.
    pub fn last_insert_id(&self, sequence_name: Option<&str>) -> Result<String, SqlKitError> {
        let mut bracket = self.connect()?;
        let id = bracket.handle()?.last_insert_id(sequence_name)?;
        bracket.disconnect()?;
        Ok(id)
    }

    fn exec_built(&self, built: &QueryAndParams) -> Result<usize, SqlKitError> {
        self.exec(&built.query, &built.params)
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        match self.state.lock() {
            Ok(guard) => guard,
            // A panic mid-operation leaves the state usable; the bracket already restored.
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn resolve_driver(&self, dsn: &Dsn) -> Result<Arc<dyn Driver>, SqlKitError> {
        if let Some(driver) = &self.driver {
            return Ok(Arc::clone(driver));
        }
        let kind = dsn.driver_kind().ok_or_else(|| {
            SqlKitError::Unsupported(format!("unrecognized driver kind `{}`", dsn.scheme()))
        })?;
        builtin_driver(kind).ok_or_else(|| {
            SqlKitError::Unsupported(format!(
                "no built-in driver for {kind}; supply one with Engine::from_dsn_with_driver"
            ))
        })
    }

    /// Open the connection if needed and resolve the dialect once.
    fn ensure_connected(&self, state: &mut EngineState) -> Result<DriverKind, SqlKitError> {
        if state.handle.is_none() {
            let dsn = self.dsn.as_ref().ok_or_else(|| {
                SqlKitError::connection("engine has neither a connection nor a DSN", None)
            })?;
            let driver = self.resolve_driver(dsn)?;
            debug!(driver = %driver.kind(), dsn = %dsn.redacted(), "opening connection");
            state.handle = Some(driver.open(dsn)?);
        }

        if let Some(kind) = state.driver_kind {
            return Ok(kind);
        }
        let kind = state
            .handle
            .as_deref()
            .map(|handle| handle.driver_kind())
            .ok_or_else(|| SqlKitError::connection("connection handle missing", None))?;
        state.driver_kind = Some(kind);
        Ok(kind)
    }

    /// Ensure a connection, save its attributes, and apply the desired ones.
    fn connect(&self) -> Result<AttributeBracket<'_>, SqlKitError> {
        let mut state = self.lock_state();
        self.ensure_connected(&mut state)?;
        let previous = state
            .handle
            .as_deref()
            .map(|handle| handle.attributes())
            .ok_or_else(|| SqlKitError::connection("connection handle missing", None))?;
        state.saved_attributes = Some(previous);

        // From here on the guard owns the restore, even if applying fails halfway.
        let mut bracket = AttributeBracket { state };
        if previous != self.desired {
            debug!(?previous, desired = ?self.desired, "applying connection attributes");
        }
        bracket.handle()?.set_attributes(&self.desired)?;
        Ok(bracket)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Engine");
        out.field("dsn", &self.dsn)
            .field("custom_driver", &self.driver.is_some());
        // try_lock: formatting from inside an operation must not deadlock
        if let Ok(state) = self.state.try_lock() {
            out.field("connected", &state.handle.is_some())
                .field("driver_kind", &state.driver_kind);
        }
        out.finish_non_exhaustive()
    }
}

/// Exclusive use of the connection for one operation.
///
/// Holds the engine lock; restores the saved attributes when disconnected or dropped.
struct AttributeBracket<'e> {
    state: MutexGuard<'e, EngineState>,
}

impl AttributeBracket<'_> {
    fn handle(&mut self) -> Result<&mut (dyn DriverConnection + 'static), SqlKitError> {
        self.state
            .handle
            .as_deref_mut()
            .ok_or_else(|| SqlKitError::connection("connection handle missing", None))
    }

    fn restore(&mut self) -> Result<(), SqlKitError> {
        let Some(saved) = self.state.saved_attributes.take() else {
            return Ok(());
        };
        if let Some(handle) = self.state.handle.as_deref_mut() {
            if handle.attributes() != saved {
                debug!(restored = ?saved, "restoring connection attributes");
            }
            handle.set_attributes(&saved)?;
        }
        Ok(())
    }

    /// Restore on the normal exit path, surfacing a failed restore.
    fn disconnect(mut self) -> Result<(), SqlKitError> {
        self.restore()
    }
}

impl Drop for AttributeBracket<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!(error = %err, "failed to restore connection attributes");
        }
    }
}
