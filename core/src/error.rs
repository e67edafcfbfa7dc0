//! Error types for the IRC daemon

use thiserror::Error;

/// Main error type for the IRC daemon
///
/// Protocol-level mistakes made by a client never become an `Error`; they are
/// answered with a numeric reply by the command handlers instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Message parsing error: {0}")]
    MessageParse(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("DNS error: {0}")]
    Dns(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(format!("Failed to parse config file: {}", e))
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(format!("Failed to serialize config: {}", e))
    }
}
