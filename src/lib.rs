//! Driver-agnostic SQL execution.
//!
//! Describe a database with a [`ConnectionDescriptor`] (or hand over a [`Dsn`]), wrap it in an
//! [`Engine`], and run statements written with `?` placeholders. The engine opens its
//! connection lazily, applies a fixed set of [`ConnectionAttributes`] around every operation,
//! and puts the caller's attributes back afterwards.
//!
//! ```rust,no_run
//! use sql_kit::prelude::*;
//!
//! # fn demo() -> Result<(), SqlKitError> {
//! let engine = Engine::from_dsn(Dsn::new("sqlite:dbname=app.db", None, None));
//! let affected = engine.update(
//!     "users",
//!     &[("name", "Bob".into())],
//!     &[("id", RowValues::Int(5))],
//! )?;
//! println!("{affected} row(s) updated");
//! # Ok(()) }
//! ```
//!
//! Built-in drivers: `SQLite` (feature `sqlite`) and `PostgreSQL` (feature `postgres`). Other
//! dialects plug in through the [`driver::Driver`] trait.

pub mod attributes;
pub mod descriptor;
pub mod driver;
pub mod dsn;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod quoting;
pub mod results;
pub mod statement;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use attributes::{CaseMode, ConnectionAttributes, ErrorMode, FetchShape};
pub use descriptor::{ConnectionDescriptor, ConnectionDescriptorBuilder};
pub use dsn::Dsn;
pub use engine::Engine;
pub use error::{ErrorKind, SqlKitError};
pub use quoting::TableName;
pub use results::{CustomDbRow, ResultSet};
pub use types::{DriverKind, RowValues};
