use odbc_api::escape_attribute_value;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::driver::path::DriverPath;
use crate::driver::{Driver, DriverResult, Session};
use crate::error::TdvqError;
use crate::masking;
use crate::normalize;

/// Defaults applied to a descriptor when building a connection string.
pub struct ConnectionDefaults;

impl ConnectionDefaults {
    pub const HOST: &'static str = "localhost";
    pub const DOMAIN: &'static str = "composite";
}

/// Caller-supplied connection parameters for one TDV datasource.
#[derive(Debug)]
pub struct ConnectionDescriptor {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub domain: Option<String>,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    /// Per-connection row cap, overriding the global default.
    pub max_rows: Option<i64>,
}

impl Clone for ConnectionDescriptor {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            port: self.port,
            domain: self.domain.clone(),
            database: self.database.clone(),
            username: self.username.clone(),
            password: self
                .password
                .as_ref()
                .map(|p| SecretString::from(p.expose_secret().to_string())),
            max_rows: self.max_rows,
        }
    }
}

impl ConnectionDescriptor {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            host: None,
            port: None,
            domain: None,
            database: database.into(),
            username: None,
            password: None,
            max_rows: None,
        }
    }

    pub fn host(&self) -> &str {
        non_blank(self.host.as_deref()).unwrap_or(ConnectionDefaults::HOST)
    }

    pub fn domain(&self) -> &str {
        non_blank(self.domain.as_deref()).unwrap_or(ConnectionDefaults::DOMAIN)
    }

    /// Build the ODBC connection string for this descriptor.
    pub fn connection_string(&self, driver: &DriverPath) -> String {
        self.render(driver, |p| escape_attribute_value(p.expose_secret()).into_owned())
    }

    /// Connection string with the password masked, for diagnostics.
    pub fn redacted_connection_string(&self, driver: &DriverPath, show_secrets: bool) -> String {
        self.render(driver, |p| masking::format_secret(p, show_secrets))
    }

    fn render(&self, driver: &DriverPath, password: impl Fn(&SecretString) -> String) -> String {
        let driver_path = driver.as_path().display().to_string();
        let mut parts = vec![
            format!("DRIVER={}", escape_attribute_value(&driver_path)),
            format!("HOST={}", escape_attribute_value(self.host())),
        ];

        if let Some(port) = self.port {
            parts.push(format!("PORT={}", port));
        }

        parts.push(format!("DOMAIN={}", escape_attribute_value(self.domain())));
        parts.push(format!("DATASOURCE={}", escape_attribute_value(&self.database)));

        if let Some(user) = non_blank(self.username.as_deref()) {
            parts.push(format!("USER={}", escape_attribute_value(user)));
        }
        if let Some(ref pass) = self.password
            && !pass.expose_secret().is_empty()
        {
            parts.push(format!("PASSWORD={}", password(pass)));
        }

        parts.join(";") + ";"
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Lifecycle state of a `Connection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Closed,
}

/// One logical connection, used for a single request and then closed.
///
/// `connect` may run once per instance. Dropping the connection disconnects it.
pub struct Connection<'d> {
    driver: &'d dyn Driver,
    driver_path: &'d DriverPath,
    descriptor: &'d ConnectionDescriptor,
    state: ConnectionState,
    session: Option<Box<dyn Session + 'd>>,
}

impl<'d> Connection<'d> {
    pub fn new(
        driver: &'d dyn Driver,
        driver_path: &'d DriverPath,
        descriptor: &'d ConnectionDescriptor,
    ) -> Self {
        Self {
            driver,
            driver_path,
            descriptor,
            state: ConnectionState::Idle,
            session: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn connect(&mut self) -> Result<(), TdvqError> {
        if self.state != ConnectionState::Idle {
            return Err(TdvqError::Usage {
                message: format!("connect called on a {:?} connection", self.state),
            });
        }

        self.state = ConnectionState::Connecting;
        debug!(
            connection = %self.descriptor.redacted_connection_string(self.driver_path, false),
            "connecting to TDV"
        );

        let conn_str = self.descriptor.connection_string(self.driver_path);
        match self.driver.connect(&conn_str) {
            Ok(session) => {
                self.session = Some(session);
                self.state = ConnectionState::Connected;
                debug!(
                    host = self.descriptor.host(),
                    datasource = %self.descriptor.database,
                    "connected"
                );
                Ok(())
            }
            Err(failure) => {
                self.state = ConnectionState::Closed;
                Err(normalize::connection_error(failure))
            }
        }
    }

    /// Execute one statement on the open session.
    pub fn execute(&mut self, sql: &str) -> Result<DriverResult<'_>, TdvqError> {
        if self.state != ConnectionState::Connected {
            return Err(TdvqError::Usage {
                message: format!("execute called on a {:?} connection", self.state),
            });
        }
        let Some(session) = self.session.as_mut() else {
            return Err(TdvqError::Usage {
                message: "connection has no live session".to_string(),
            });
        };
        session.execute(sql).map_err(normalize::query_error)
    }

    /// Close the session. Close failures are logged, never returned.
    pub fn disconnect(&mut self) {
        if let Some(session) = self.session.take()
            && let Err(failure) = session.close()
        {
            warn!(error = %failure, "failed to close TDV connection");
        }
        self.state = ConnectionState::Closed;
    }
}

impl Drop for Connection<'_> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
