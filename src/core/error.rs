/// sqlcli Error Module
///
/// This module defines the closed set of errors a session can raise. Every
/// error carries a short name and, for the code-bearing kinds, the numeric code
/// that becomes the process exit code once the error reaches the controller.
use thiserror::Error;

/// Comprehensive error type for the session engine.
///
/// The variants cover:
/// - Connecting to and querying the data service
/// - Parsing connection URIs
/// - Meta-command lookup and setting paths
/// - Scripting sandbox evaluation
/// - Configuration loading and terminal I/O
#[derive(Error, Debug)]
pub enum SessionError {
    /// The driver refused or failed to open a connection
    #[error("{message}")]
    Connection { message: String, code: Option<i32> },

    /// A SQL statement was issued while no connection is open
    #[error("DB not connected.")]
    NotConnected,

    /// The connection URI is malformed or names an unsupported scheme
    #[error("{0}")]
    BadUri(String),

    /// No meta-command is registered under the given name
    #[error("Unknown command: \"{0}\"")]
    UnknownMetaCommand(String),

    /// A `set` path that does not name a setting, or an invalid value for it
    #[error("{0}")]
    BadSetting(String),

    /// The driver reported an execution failure
    #[error("{message}")]
    Sql { message: String, code: Option<i32> },

    /// The sandbox failed to evaluate an expression
    #[error("{0}")]
    Script(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Terminal and file system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Short, stable name printed alongside the message.
    pub fn name(&self) -> &'static str {
        match self {
            SessionError::Connection { .. } => "CONNERR",
            SessionError::NotConnected => "DBDISCON",
            SessionError::BadUri(_) => "BADURI",
            SessionError::UnknownMetaCommand(_) => "BADCMD",
            SessionError::BadSetting(_) => "NULLAPPSET",
            SessionError::Sql { .. } => "SQLERR",
            SessionError::Script(_) => "SCRIPTERR",
            SessionError::Config(_) => "CONFIG",
            SessionError::Io(_) => "IOERR",
        }
    }

    /// Exit code recorded when this error ends a dispatch.
    ///
    /// `UnknownMetaCommand` and `Script` are console notices and carry no code.
    pub fn code(&self) -> Option<i32> {
        match self {
            SessionError::Connection { code, .. } => Some(code.unwrap_or(10)),
            SessionError::NotConnected => Some(12),
            SessionError::BadUri(_) => Some(11),
            SessionError::UnknownMetaCommand(_) => None,
            SessionError::BadSetting(_) => Some(110),
            SessionError::Sql { code, .. } => Some(code.unwrap_or(1)),
            SessionError::Script(_) => None,
            SessionError::Config(_) => Some(2),
            SessionError::Io(_) => Some(5),
        }
    }

    /// Renders the error the way it is printed on the error stream.
    pub fn report(&self) -> String {
        let report = serde_json::json!({
            "name": self.name(),
            "code": self.code().unwrap_or(-1),
            "message": self.to_string(),
        });
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| self.to_string())
    }
}

impl From<rusqlite::Error> for SessionError {
    fn from(err: rusqlite::Error) -> Self {
        let code = match &err {
            rusqlite::Error::SqliteFailure(failure, _) => Some(failure.extended_code),
            _ => None,
        };
        SessionError::Sql {
            message: err.to_string(),
            code,
        }
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::Config(err.to_string())
    }
}

/// Type alias for Result to use SessionError as the error type.
pub type Result<T> = std::result::Result<T, SessionError>;
