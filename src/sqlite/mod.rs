// SQLite driver backed by rusqlite.
//
// - config: opening a connection from a DSN
// - params: binding values as SQLite values
// - query: reading rows back into `RowValues`
// - connection: the connection handle and prepared statement

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::SqliteDriver;
pub use connection::SqliteConnectionHandle;
