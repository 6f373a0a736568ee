//! Parsing of `KEY=value;` connection strings.
//!
//! Accepts the ADO-style form MySQL connectors have long used:
//!
//! ```text
//! SERVER=localhost;PORT=3306;DATABASE=app;UID=root;PASSWORD=secret
//! ```
//!
//! Keys are case-insensitive and the usual aliases are understood
//! (`HOST`, `USER ID`, `PWD`, ...). Keys we don't interpret are kept in
//! `options()` so a backend can forward them.

use std::fmt;
use std::str::FromStr;

use super::config::DEFAULT_PORT;
use crate::common::{Error, Result};

/// A parsed connection target.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    host: String,
    port: u16,
    database: Option<String>,
    user: Option<String>,
    password: Option<String>,
    options: Vec<(String, String)>,
}

impl ConnectionString {
    /// Server host name or IP address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port (3306 unless given).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Default schema, if any.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Login user, if any.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Login password, if any.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Remaining `key=value` pairs in the order they appeared (keys lowercased).
    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }
}

impl FromStr for ConnectionString {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(Error::InvalidConnectionString("empty".into()));
        }

        let mut host = None;
        let mut port = DEFAULT_PORT;
        let mut database = None;
        let mut user = None;
        let mut password = None;
        let mut options = Vec::new();

        for segment in s.split(';') {
            if segment.trim().is_empty() {
                continue;
            }
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                Error::InvalidConnectionString(format!("segment '{}' has no '='", segment.trim()))
            })?;
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();
            let non_empty = (!value.is_empty()).then(|| value.to_string());

            match key.as_str() {
                "server" | "host" | "data source" | "datasource" | "address" => host = non_empty,
                "port" => {
                    port = value.parse().map_err(|_| {
                        Error::InvalidConnectionString(format!("invalid port '{}'", value))
                    })?;
                }
                "database" | "initial catalog" => database = non_empty,
                "uid" | "user" | "user id" | "userid" | "username" => user = non_empty,
                "password" | "pwd" => password = non_empty,
                _ => options.push((key, value.to_string())),
            }
        }

        let host = host.ok_or_else(|| Error::InvalidConnectionString("missing server".into()))?;

        Ok(Self {
            host,
            port,
            database,
            user,
            password,
            options,
        })
    }
}

// Passwords must never reach a log line.
impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SERVER={};PORT={}", self.host, self.port)?;
        if let Some(db) = &self.database {
            write!(f, ";DATABASE={}", db)?;
        }
        if let Some(user) = &self.user {
            write!(f, ";UID={}", user)?;
        }
        if self.password.is_some() {
            write!(f, ";PASSWORD=***")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionString({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let conn: ConnectionString = "SERVER=localhost;PORT=3307;DATABASE=app;UID=root;PASSWORD=secret"
            .parse()
            .unwrap();
        assert_eq!(conn.host(), "localhost");
        assert_eq!(conn.port(), 3307);
        assert_eq!(conn.database(), Some("app"));
        assert_eq!(conn.user(), Some("root"));
        assert_eq!(conn.password(), Some("secret"));
        assert!(conn.options().is_empty());
    }

    #[test]
    fn test_parse_aliases_and_case() {
        let conn: ConnectionString = "host=db; user id=svc; pwd=x; Initial Catalog=main"
            .parse()
            .unwrap();
        assert_eq!(conn.host(), "db");
        assert_eq!(conn.port(), DEFAULT_PORT);
        assert_eq!(conn.user(), Some("svc"));
        assert_eq!(conn.password(), Some("x"));
        assert_eq!(conn.database(), Some("main"));
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let conn: ConnectionString = "SERVER=db;SslMode=none;Pooling=false;".parse().unwrap();
        assert_eq!(
            conn.options(),
            &[
                ("sslmode".to_string(), "none".to_string()),
                ("pooling".to_string(), "false".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_is_rejected() {
        assert!(matches!(
            "   ".parse::<ConnectionString>(),
            Err(Error::InvalidConnectionString(_))
        ));
    }

    #[test]
    fn test_segment_without_equals_is_rejected() {
        assert!("SERVER=db;garbage".parse::<ConnectionString>().is_err());
    }

    #[test]
    fn test_bad_port_is_rejected() {
        assert!("SERVER=db;PORT=abc".parse::<ConnectionString>().is_err());
        assert!("SERVER=db;PORT=70000".parse::<ConnectionString>().is_err());
    }

    #[test]
    fn test_missing_server_is_rejected() {
        let err = "DATABASE=app;UID=root".parse::<ConnectionString>().unwrap_err();
        assert_eq!(format!("{}", err), "invalid connection string: missing server");
    }

    #[test]
    fn test_display_redacts_password() {
        let conn: ConnectionString = "SERVER=db;UID=root;PASSWORD=hunter2".parse().unwrap();
        let shown = format!("{}", conn);
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("PASSWORD=***"));
        assert!(!format!("{:?}", conn).contains("hunter2"));
    }
}
