// PostgreSQL driver backed by tokio-postgres, driven from blocking code.
//
// - config: DSN to `tokio_postgres::Config`, opening connections
// - params: binding `RowValues` as PostgreSQL values
// - query: reading rows back into `RowValues`
// - connection: the connection handle and prepared statement

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::{PostgresDriver, pg_config_from_dsn};
pub use connection::PostgresConnectionHandle;
