use std::fmt;

use crate::types::DriverKind;

/// A normalized connection string plus credentials.
///
/// The connection string has the form `<driverKind>:key1=val1;key2=val2` and is never mutated
/// once built; [`Dsn::component`] and friends only read it.
#[derive(Clone, PartialEq, Eq)]
pub struct Dsn {
    connection_string: String,
    username: Option<String>,
    password: Option<String>,
}

impl Dsn {
    #[must_use]
    pub fn new(
        connection_string: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            connection_string: connection_string.into(),
            username,
            password,
        }
    }

    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Text before the first `:`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.connection_string
            .split_once(':')
            .map_or("", |(scheme, _)| scheme)
    }

    /// Dialect named by the prefix, if recognized.
    #[must_use]
    pub fn driver_kind(&self) -> Option<DriverKind> {
        DriverKind::from_name(self.scheme())
    }

    /// `key=value` pairs after the prefix, in order. Segments without `=` are skipped.
    ///
    /// Values are cut at `;`, so a component value cannot contain one. See
    /// [`Dsn::stray_segment`].
    pub fn components(&self) -> impl Iterator<Item = (&str, &str)> {
        self.segments().filter_map(|segment| segment.split_once('='))
    }

    /// Value of the first component named `key`.
    #[must_use]
    pub fn component(&self, key: &str) -> Option<&str> {
        self.components()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value)
    }

    /// First non-empty segment without `=`, which is what a `;` inside a value leaves behind
    /// (`dbname=/tmp/a;b.db` yields `b.db`). The trailing password component is not checked.
    #[must_use]
    pub fn stray_segment(&self) -> Option<&str> {
        self.segments()
            .take_while(|segment| !segment.starts_with("password="))
            .find(|segment| !segment.contains('='))
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        let body = self
            .connection_string
            .split_once(':')
            .map_or("", |(_, body)| body);
        body.split(';').filter(|segment| !segment.is_empty())
    }

    /// Connection string with the password masked, for logs.
    ///
    /// Everything from the first `password=` component to the end is masked. Descriptors emit
    /// the password last, so a password containing `;` stays hidden.
    #[must_use]
    pub fn redacted(&self) -> String {
        let Some((scheme, body)) = self.connection_string.split_once(':') else {
            return self.connection_string.clone();
        };
        let start = if body.starts_with("password=") {
            Some(0)
        } else {
            body.find(";password=").map(|at| at + 1)
        };
        match start {
            Some(at) => format!("{scheme}:{}password=<redacted>", &body[..at]),
            None => self.connection_string.clone(),
        }
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.connection_string)
    }
}

// Manual Debug so credentials never end up in logs or panic messages
impl fmt::Debug for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dsn")
            .field("connection_string", &self.redacted())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AsRef<str> for Dsn {
    fn as_ref(&self) -> &str {
        &self.connection_string
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_connection_string() {
        let dsn = Dsn::new("mysql:host=127.0.0.1;port=3306", Some("root".into()), None);
        assert_eq!(dsn.to_string(), "mysql:host=127.0.0.1;port=3306");
        assert_eq!(dsn.username(), Some("root"));
        assert_eq!(dsn.password(), None);
    }

    #[test]
    fn reads_components_without_mutating() {
        let dsn = Dsn::new("postgresql:host=db;port=5432;dbname=app", None, None);
        assert_eq!(dsn.driver_kind(), Some(DriverKind::Postgresql));
        assert_eq!(dsn.component("dbname"), Some("app"));
        assert_eq!(dsn.component("user"), None);
        assert_eq!(dsn.components().count(), 3);
        assert_eq!(dsn.connection_string(), "postgresql:host=db;port=5432;dbname=app");
    }

    #[test]
    fn empty_component_list() {
        let dsn = Dsn::new("sqlite:", None, None);
        assert_eq!(dsn.driver_kind(), Some(DriverKind::Sqlite));
        assert_eq!(dsn.components().count(), 0);
    }

    #[test]
    fn unknown_scheme_has_no_driver_kind() {
        let dsn = Dsn::new("oracle:host=x", None, None);
        assert_eq!(dsn.scheme(), "oracle");
        assert_eq!(dsn.driver_kind(), None);
    }

    #[test]
    fn debug_masks_passwords() {
        let dsn = Dsn::new(
            "mysql:host=h;user=u;password=hunter2",
            Some("u".into()),
            Some("hunter2".into()),
        );
        let rendered = format!("{dsn:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("password=<redacted>"));
    }

    #[test]
    fn redaction_covers_passwords_with_separators() {
        let dsn = Dsn::new(
            "mysql:host=127.0.0.1;port=3306;charset=utf8mb4;user=u;password=hunter;2secret",
            Some("u".into()),
            Some("hunter;2secret".into()),
        );
        assert_eq!(
            dsn.redacted(),
            "mysql:host=127.0.0.1;port=3306;charset=utf8mb4;user=u;password=<redacted>"
        );
        let rendered = format!("{dsn:?}");
        assert!(!rendered.contains("2secret"));

        let leading = Dsn::new("postgresql:password=a;b;host=h", None, None);
        assert_eq!(leading.redacted(), "postgresql:password=<redacted>");
        let none = Dsn::new("sqlite:dbname=app.db", None, None);
        assert_eq!(none.redacted(), "sqlite:dbname=app.db");
    }

    #[test]
    fn separator_inside_a_value_leaves_a_stray_segment() {
        let split = Dsn::new("sqlite:dbname=/tmp/a;b.db", None, None);
        assert_eq!(split.component("dbname"), Some("/tmp/a"));
        assert_eq!(split.stray_segment(), Some("b.db"));

        let clean = Dsn::new("sqlite:host=h;;dbname=app.db", None, None);
        assert_eq!(clean.stray_segment(), None);

        let secret = Dsn::new("postgresql:host=h;user=u;password=a;b", None, Some("a;b".into()));
        assert_eq!(secret.stray_segment(), None);
    }
}
