//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::attributes::{CaseMode, ConnectionAttributes, ErrorMode, FetchShape};
pub use crate::descriptor::{
    ConnectionDescriptor, ConnectionDescriptorBuilder, suggest_charset, suggest_charset_for_name,
    suggest_port, suggest_port_for_name,
};
pub use crate::driver::{Driver, DriverConnection, DriverStatement, builtin_driver};
pub use crate::dsn::Dsn;
pub use crate::engine::Engine;
pub use crate::error::{ErrorKind, SqlKitError};
pub use crate::quoting::TableName;
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::statement::QueryAndParams;
pub use crate::translation::{PlaceholderStyle, translate_placeholders};
pub use crate::types::{DriverKind, RowValues};

#[cfg(feature = "postgres")]
pub use crate::postgres::{PostgresConnectionHandle, PostgresDriver};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteConnectionHandle, SqliteDriver};
