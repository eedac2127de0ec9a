//! Error types for zeal

use thiserror::Error;

/// Result type alias for zeal operations
pub type ZealResult<T> = Result<T, ZealError>;

/// Error types for query building and execution
#[derive(Debug, Error)]
pub enum ZealError {
    /// `configure` was called while a global facade is already installed
    #[error("zeal can only be configured once")]
    AlreadyConfigured,

    /// `global` was called before `configure`
    #[error("zeal has not been configured")]
    NotConfigured,

    /// A terminal call needs mutation data that was never supplied
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Invalid pool configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reported by the MySQL driver, passed through unchanged
    #[error(transparent)]
    Driver(#[from] mysql_async::Error),

    /// Row decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// A query hook refused to run the statement
    #[error("Query aborted: {0}")]
    Aborted(String),
}

impl ZealError {
    /// Create a missing data error
    pub fn missing_data(message: impl Into<String>) -> Self {
        Self::MissingData(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Whether this error comes from misusing the API rather than from the database.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyConfigured | Self::NotConfigured | Self::MissingData(_)
        )
    }

    /// Whether this error was reported by the driver.
    pub fn is_driver_error(&self) -> bool {
        matches!(self, Self::Driver(_))
    }

    /// The server error code, when the driver reported one (e.g. 1062 for a duplicate key).
    pub fn server_code(&self) -> Option<u16> {
        match self {
            Self::Driver(mysql_async::Error::Server(err)) => Some(err.code),
            _ => None,
        }
    }
}

impl From<mysql_async::UrlError> for ZealError {
    fn from(err: mysql_async::UrlError) -> Self {
        Self::Config(err.to_string())
    }
}
