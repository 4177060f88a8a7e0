use serde::{Deserialize, Deserializer, Serialize};

use crate::dsn::Dsn;
use crate::error::SqlKitError;
use crate::types::DriverKind;

pub const HOST_LOOPBACK_NAME: &str = "localhost";
pub const HOST_LOOPBACK_IP: &str = "127.0.0.1";
pub const HOST_DEFAULT: &str = HOST_LOOPBACK_IP;

/// Default port for a dialect (`None` for `SQLite`).
#[must_use]
pub fn suggest_port(kind: DriverKind) -> Option<u16> {
    kind.default_port()
}

/// Default charset for a dialect (`None` for `SQLite`).
#[must_use]
pub fn suggest_charset(kind: DriverKind) -> Option<&'static str> {
    kind.default_charset()
}

/// Like [`suggest_port`], for a raw driver name; unrecognized names get `None`.
#[must_use]
pub fn suggest_port_for_name(driver_name: &str) -> Option<u16> {
    DriverKind::from_name(driver_name).and_then(suggest_port)
}

/// Like [`suggest_charset`], for a raw driver name; unrecognized names get `None`.
#[must_use]
pub fn suggest_charset_for_name(driver_name: &str) -> Option<&'static str> {
    DriverKind::from_name(driver_name).and_then(suggest_charset)
}

/// Structured connection parameters from which a [`Dsn`] is derived.
///
/// The driver kind is fixed at construction; every other field is public and may be changed
/// freely before calling [`ConnectionDescriptor::to_dsn`].
///
/// ```rust
/// use sql_kit::prelude::*;
///
/// let mut source = ConnectionDescriptor::new(DriverKind::Mysql);
/// source.database_name = Some("app".into());
/// source.username = Some("root".into());
/// assert_eq!(
///     source.to_dsn().connection_string(),
///     "mysql:host=127.0.0.1;port=3306;dbname=app;charset=utf8mb4;user=root"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionDescriptor {
    driver: DriverKind,
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub database_name: Option<String>,
    pub charset: Option<String>,
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ConnectionDescriptor {
    #[must_use]
    pub fn new(driver: DriverKind) -> Self {
        Self {
            driver,
            hostname: Some(HOST_DEFAULT.to_string()),
            port: suggest_port(driver),
            database_name: None,
            charset: suggest_charset(driver).map(str::to_string),
            username: None,
            password: None,
        }
    }

    #[must_use]
    pub fn builder(driver: DriverKind) -> ConnectionDescriptorBuilder {
        ConnectionDescriptorBuilder::new(driver)
    }

    #[must_use]
    pub fn driver_kind(&self) -> DriverKind {
        self.driver
    }

    /// Build a fresh [`Dsn`] from the current field values.
    ///
    /// Components are emitted only for fields that are set, in the fixed order
    /// `host, port, dbname, client_encoding|charset, user, password`. A `localhost` host is
    /// rewritten to the loopback IP when the port is set and differs from the dialect default,
    /// so the driver does not fall back to a socket bound to the default port.
    ///
    /// Values are written as given. Only the password may contain `;`; the built-in drivers
    /// refuse any other value that does when they open the connection.
    #[must_use]
    pub fn to_dsn(&self) -> Dsn {
        let mut components: Vec<String> = Vec::with_capacity(6);

        if let Some(hostname) = &self.hostname {
            let mut effective = hostname.as_str();
            if hostname == HOST_LOOPBACK_NAME
                && let Some(port) = self.port
                && Some(port) != suggest_port(self.driver)
            {
                effective = HOST_LOOPBACK_IP;
            }
            components.push(format!("host={effective}"));
        }

        if let Some(port) = self.port {
            components.push(format!("port={port}"));
        }

        if let Some(database_name) = &self.database_name {
            components.push(format!("dbname={database_name}"));
        }

        if let Some(charset) = &self.charset {
            components.push(format!("{}={charset}", self.driver.charset_key()));
        }

        if let Some(username) = &self.username {
            components.push(format!("user={username}"));
        }

        if let Some(password) = &self.password {
            components.push(format!("password={password}"));
        }

        let connection_string = format!("{}:{}", self.driver, components.join(";"));
        Dsn::new(
            connection_string,
            self.username.clone(),
            self.password.clone(),
        )
    }

    /// Load a descriptor from JSON.
    ///
    /// `driver` is required. Absent `hostname`/`port`/`charset` keep the constructor defaults;
    /// an explicit `null` clears them.
    ///
    /// # Errors
    /// Returns `SqlKitError::ConfigError` for malformed JSON or an unknown driver kind.
    pub fn from_json(json: &str) -> Result<Self, SqlKitError> {
        let raw: RawDescriptor = serde_json::from_str(json)?;
        let mut descriptor = Self::new(raw.driver);
        if let Some(hostname) = raw.hostname {
            descriptor.hostname = hostname;
        }
        if let Some(port) = raw.port {
            descriptor.port = port;
        }
        if let Some(charset) = raw.charset {
            descriptor.charset = charset;
        }
        descriptor.database_name = raw.database_name;
        descriptor.username = raw.username;
        descriptor.password = raw.password;
        Ok(descriptor)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDescriptor {
    driver: DriverKind,
    #[serde(default, deserialize_with = "present")]
    hostname: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    port: Option<Option<u16>>,
    #[serde(default, deserialize_with = "present")]
    charset: Option<Option<String>>,
    #[serde(default)]
    database_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

// Distinguishes an explicit `null` (Some(None)) from an absent key (None via `default`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Fluent builder for [`ConnectionDescriptor`].
#[derive(Debug, Clone)]
pub struct ConnectionDescriptorBuilder {
    descriptor: ConnectionDescriptor,
}

impl ConnectionDescriptorBuilder {
    #[must_use]
    pub fn new(driver: DriverKind) -> Self {
        Self {
            descriptor: ConnectionDescriptor::new(driver),
        }
    }

    #[must_use]
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.descriptor.hostname = Some(hostname.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.descriptor.port = Some(port);
        self
    }

    #[must_use]
    pub fn database_name(mut self, database_name: impl Into<String>) -> Self {
        self.descriptor.database_name = Some(database_name.into());
        self
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.descriptor.charset = Some(charset.into());
        self
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.descriptor.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.descriptor.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectionDescriptor {
        self.descriptor
    }

    #[must_use]
    pub fn to_dsn(&self) -> Dsn {
        self.descriptor.to_dsn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_applies_dialect_defaults() {
        let mysql = ConnectionDescriptor::new(DriverKind::Mysql);
        assert_eq!(mysql.hostname.as_deref(), Some("127.0.0.1"));
        assert_eq!(mysql.port, Some(3306));
        assert_eq!(mysql.charset.as_deref(), Some("utf8mb4"));
        assert_eq!(mysql.database_name, None);
        assert_eq!(mysql.username, None);
        assert_eq!(mysql.password, None);

        let pg = ConnectionDescriptor::new(DriverKind::Postgresql);
        assert_eq!(pg.port, Some(5432));
        assert_eq!(pg.charset.as_deref(), Some("UTF8"));

        let sqlite = ConnectionDescriptor::new(DriverKind::Sqlite);
        assert_eq!(sqlite.port, None);
        assert_eq!(sqlite.charset, None);
    }

    #[test]
    fn suggestions_for_raw_names() {
        assert_eq!(suggest_port_for_name("mysql"), Some(3306));
        assert_eq!(suggest_charset_for_name("pgsql"), Some("UTF8"));
        assert_eq!(suggest_port_for_name("sqlite"), None);
        assert_eq!(suggest_port_for_name("oracle"), None);
        assert_eq!(suggest_charset_for_name("oracle"), None);
    }

    #[test]
    fn mysql_end_to_end_string() {
        let mut source = ConnectionDescriptor::new(DriverKind::Mysql);
        source.database_name = Some("app".into());
        source.username = Some("root".into());
        let dsn = source.to_dsn();
        assert_eq!(
            dsn.connection_string(),
            "mysql:host=127.0.0.1;port=3306;dbname=app;charset=utf8mb4;user=root"
        );
        assert_eq!(dsn.username(), Some("root"));
        assert_eq!(dsn.password(), None);
    }

    #[test]
    fn postgres_uses_client_encoding_key() {
        let dsn = ConnectionDescriptor::builder(DriverKind::Postgresql)
            .database_name("app")
            .username("u")
            .password("p")
            .to_dsn();
        assert_eq!(
            dsn.connection_string(),
            "postgresql:host=127.0.0.1;port=5432;dbname=app;client_encoding=UTF8;user=u;password=p"
        );
    }

    #[test]
    fn localhost_kept_on_default_port() {
        let mut source = ConnectionDescriptor::new(DriverKind::Mysql);
        source.hostname = Some("localhost".into());
        source.port = Some(3306);
        assert!(
            source
                .to_dsn()
                .connection_string()
                .starts_with("mysql:host=localhost;port=3306")
        );
    }

    #[test]
    fn localhost_rewritten_on_non_default_port() {
        let mut source = ConnectionDescriptor::new(DriverKind::Mysql);
        source.hostname = Some("localhost".into());
        source.port = Some(3307);
        assert!(
            source
                .to_dsn()
                .connection_string()
                .starts_with("mysql:host=127.0.0.1;port=3307")
        );
    }

    #[test]
    fn localhost_kept_when_port_unset() {
        let mut source = ConnectionDescriptor::new(DriverKind::Mysql);
        source.hostname = Some("localhost".into());
        source.port = None;
        assert_eq!(
            source.to_dsn().connection_string(),
            "mysql:host=localhost;charset=utf8mb4"
        );
    }

    #[test]
    fn other_hosts_never_rewritten() {
        let mut source = ConnectionDescriptor::new(DriverKind::Postgresql);
        source.hostname = Some("db.internal".into());
        source.port = Some(6543);
        assert!(
            source
                .to_dsn()
                .connection_string()
                .starts_with("postgresql:host=db.internal;port=6543")
        );
    }

    #[test]
    fn nothing_set_gives_bare_prefix() {
        let mut source = ConnectionDescriptor::new(DriverKind::Sqlite);
        source.hostname = None;
        assert_eq!(source.to_dsn().connection_string(), "sqlite:");
    }

    #[test]
    fn to_dsn_is_repeatable_and_tracks_mutation() {
        let mut source = ConnectionDescriptor::new(DriverKind::Mysql);
        let first = source.to_dsn();
        let second = source.to_dsn();
        assert_eq!(first.connection_string(), second.connection_string());

        source.database_name = Some("other".into());
        let third = source.to_dsn();
        assert_ne!(first.connection_string(), third.connection_string());
        assert!(!first.connection_string().contains("dbname"));
    }

    #[test]
    fn loads_from_json_with_defaults_and_explicit_nulls() {
        let source = ConnectionDescriptor::from_json(
            r#"{"driver": "pgsql", "database_name": "app", "charset": null}"#,
        )
        .unwrap();
        assert_eq!(source.driver_kind(), DriverKind::Postgresql);
        assert_eq!(source.port, Some(5432));
        assert_eq!(source.charset, None);
        assert_eq!(source.hostname.as_deref(), Some("127.0.0.1"));
        assert_eq!(source.database_name.as_deref(), Some("app"));
    }

    #[test]
    fn json_rejects_unknown_driver() {
        let err = ConnectionDescriptor::from_json(r#"{"driver": "oracle"}"#).unwrap_err();
        assert!(matches!(err, SqlKitError::ConfigError(_)));
    }
}
