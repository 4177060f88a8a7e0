use tokio::runtime::Runtime;
use tokio_postgres::Client;
use tracing::debug;

use super::params::Params;
use super::query::{build_result_set, execution_error};
use crate::attributes::ConnectionAttributes;
use crate::driver::{DriverConnection, DriverStatement};
use crate::error::{SqlKitError, postgres_code};
use crate::results::CustomDbRow;
use crate::translation::{PlaceholderStyle, translate_placeholders};
use crate::types::{DriverKind, RowValues};

/// A tokio-postgres client and the runtime that drives it.
///
/// Attributes are tracked client-side and shape how fetched rows are reported.
pub struct PostgresConnectionHandle {
    runtime: Runtime,
    client: Client,
    attributes: ConnectionAttributes,
}

impl PostgresConnectionHandle {
    /// Wrap a client whose connection task is spawned on `runtime`.
    #[must_use]
    pub fn new(runtime: Runtime, client: Client) -> Self {
        Self {
            runtime,
            client,
            attributes: ConnectionAttributes::default(),
        }
    }
}

impl std::fmt::Debug for PostgresConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConnectionHandle")
            .field("closed", &self.client.is_closed())
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl DriverConnection for PostgresConnectionHandle {
    fn driver_kind(&self) -> DriverKind {
        DriverKind::Postgresql
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
        let translated = translate_placeholders(sql, PlaceholderStyle::Numbered);
        let stmt = self
            .runtime
            .block_on(self.client.prepare(&translated))
            .map_err(|e| SqlKitError::statement(e.to_string(), postgres_code(&e)))?;
        Ok(Box::new(PostgresStatement {
            runtime: &self.runtime,
            client: &self.client,
            stmt,
            attributes: self.attributes,
            pending: Vec::new().into_iter(),
        }))
    }

    fn last_insert_id(&mut self, sequence_name: Option<&str>) -> Result<String, SqlKitError> {
        let row = match sequence_name {
            Some(sequence_name) => self.runtime.block_on(
                self.client
                    .query_one("SELECT currval($1::text::regclass)", &[&sequence_name]),
            ),
            None => {
                debug!("no sequence name given; using lastval()");
                self.runtime
                    .block_on(self.client.query_one("SELECT lastval()", &[]))
            }
        }
        .map_err(|e| execution_error(&e))?;
        let id: i64 = row.try_get(0).map_err(|e| execution_error(&e))?;
        Ok(id.to_string())
    }
}

struct PostgresStatement<'conn> {
    runtime: &'conn Runtime,
    client: &'conn Client,
    stmt: tokio_postgres::Statement,
    attributes: ConnectionAttributes,
    pending: std::vec::IntoIter<CustomDbRow>,
}

impl DriverStatement for PostgresStatement<'_> {
    fn execute(&mut self, params: &[RowValues]) -> Result<usize, SqlKitError> {
        let converted = Params::convert(params);

        if self.stmt.columns().is_empty() {
            self.pending = Vec::new().into_iter();
            let affected = self
                .runtime
                .block_on(self.client.execute(&self.stmt, converted.as_refs()))
                .map_err(|e| execution_error(&e))?;
            return usize::try_from(affected).map_err(|e| SqlKitError::execution(e.to_string(), None));
        }

        let rows = self
            .runtime
            .block_on(self.client.query(&self.stmt, converted.as_refs()))
            .map_err(|e| execution_error(&e))?;
        let column_names: Vec<&str> = self.stmt.columns().iter().map(|c| c.name()).collect();
        let result_set = build_result_set(&column_names, &rows, &self.attributes)?;
        let matched = result_set.rows_affected;
        self.pending = result_set.into_iter();
        Ok(matched)
    }

    fn fetch_one(&mut self) -> Result<Option<CustomDbRow>, SqlKitError> {
        Ok(self.pending.next())
    }
}
