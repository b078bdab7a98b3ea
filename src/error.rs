use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(schedule_bot::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(schedule_bot::config))]
    Config(String),

    #[error("Calendar API error: {0}")]
    #[diagnostic(code(schedule_bot::calendar))]
    Calendar(String),

    #[error("Calendar feed error: {0}")]
    #[diagnostic(code(schedule_bot::feed))]
    Feed(String),

    #[error("Token error: {0}")]
    #[diagnostic(
        code(schedule_bot::token),
        help("Run the get_calendar_token binary to authorize calendar access")
    )]
    Token(String),

    /// Any failure of the language model call collapses into this variant
    #[error("Assistant unavailable: {0}")]
    #[diagnostic(code(schedule_bot::assistant))]
    Assistant(String),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(schedule_bot::http))]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    #[diagnostic(code(schedule_bot::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(schedule_bot::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(schedule_bot::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Token(format!("Redis error: {}", err))
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create calendar API errors
pub fn calendar_error(message: &str) -> Error {
    Error::Calendar(message.to_string())
}

/// Helper to create calendar feed errors
pub fn feed_error(message: &str) -> Error {
    Error::Feed(message.to_string())
}

/// Helper to create token errors
pub fn token_error(message: &str) -> Error {
    Error::Token(message.to_string())
}

/// Helper to create assistant errors
pub fn assistant_error(message: &str) -> Error {
    Error::Assistant(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
