use tokio_postgres::NoTls;
use tracing::{debug, warn};

use super::connection::PostgresConnectionHandle;
use crate::driver::{Driver, DriverConnection};
use crate::dsn::Dsn;
use crate::error::{SqlKitError, postgres_code};
use crate::types::DriverKind;

/// Build a `tokio_postgres::Config` from the DSN components.
///
/// `client_encoding` is sent as a startup option. Credentials carried on the [`Dsn`] itself
/// take precedence over `user=`/`password=` components.
///
/// # Errors
/// Returns `SqlKitError::ConfigError` if a value was split by `;`, the port is not a number,
/// or no host or user is set.
pub fn pg_config_from_dsn(dsn: &Dsn) -> Result<tokio_postgres::Config, SqlKitError> {
    if let Some(stray) = dsn.stray_segment() {
        return Err(SqlKitError::ConfigError(format!(
            "DSN segment `{stray}` has no `=`; component values cannot contain `;`"
        )));
    }
    let mut config = tokio_postgres::Config::new();

    for (key, value) in dsn.components() {
        match key {
            "host" => {
                config.host(value);
            }
            "port" => {
                let port = value.parse::<u16>().map_err(|e| {
                    SqlKitError::ConfigError(format!("invalid port `{value}`: {e}"))
                })?;
                config.port(port);
            }
            "dbname" => {
                config.dbname(value);
            }
            "user" => {
                config.user(value);
            }
            "password" => {
                config.password(value);
            }
            "client_encoding" => {
                config.options(&format!("-c client_encoding={value}"));
            }
            other => debug!(key = other, "ignoring unknown DSN component"),
        }
    }

    if let Some(user) = dsn.username() {
        config.user(user);
    }
    if let Some(password) = dsn.password() {
        config.password(password);
    }

    if config.get_hosts().is_empty() {
        return Err(SqlKitError::ConfigError("host is required".to_string()));
    }
    if config.get_user().is_none() {
        return Err(SqlKitError::ConfigError("user is required".to_string()));
    }

    Ok(config)
}

/// Built-in `PostgreSQL` driver.
///
/// Each connection owns a current-thread tokio runtime and blocks on it, so the driver must be
/// used from synchronous code (inside an async application, call the engine from
/// `tokio::task::spawn_blocking`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDriver;

impl Driver for PostgresDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Postgresql
    }

    fn open(&self, dsn: &Dsn) -> Result<Box<dyn DriverConnection>, SqlKitError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(SqlKitError::connection(
                "the PostgreSQL driver blocks and cannot be opened inside an async runtime",
                None,
            ));
        }

        // A DSN missing its host or user is an open failure from the engine's point of view.
        let config = pg_config_from_dsn(dsn).map_err(|e| match e {
            SqlKitError::ConfigError(message) => SqlKitError::connection(message, None),
            other => other,
        })?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                SqlKitError::connection(format!("failed to start runtime: {e}"), None)
            })?;

        let (client, connection) = runtime.block_on(config.connect(NoTls)).map_err(|e| {
            SqlKitError::connection(
                format!("failed to connect to PostgreSQL: {e}"),
                postgres_code(&e),
            )
        })?;

        // Driven whenever the handle blocks on a client call.
        runtime.spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "PostgreSQL connection closed with error");
            }
        });

        debug!(hosts = ?config.get_hosts(), dbname = ?config.get_dbname(), "opened PostgreSQL connection");
        Ok(Box::new(PostgresConnectionHandle::new(runtime, client)))
    }
}
