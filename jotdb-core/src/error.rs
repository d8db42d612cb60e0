// src/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JotError {
    /// A required argument was missing or malformed. Raised synchronously,
    /// before anything is dispatched to the engine.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure reported by the underlying engine. Never swallowed, never
    /// retried by this layer.
    #[error("Engine error: {message}")]
    Engine {
        message: String,
        /// Query execution log, when the engine produced one.
        log: Option<String>,
    },
}

impl JotError {
    pub fn engine(message: impl Into<String>) -> Self {
        JotError::Engine {
            message: message.into(),
            log: None,
        }
    }

    pub fn engine_with_log(message: impl Into<String>, log: Option<String>) -> Self {
        JotError::Engine {
            message: message.into(),
            log,
        }
    }

    /// Query execution log attached to an engine failure, if any.
    pub fn log(&self) -> Option<&str> {
        match self {
            JotError::Engine { log, .. } => log.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, JotError>;
