//! Error taxonomy for command dispatch
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use thiserror::Error;

/// Why a transformer refused its input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailureReason {
    #[error("is missing")]
    Missing,

    #[error("`{token}` is not a valid {expected}")]
    InvalidFormat {
        token: String,
        expected: &'static str,
    },

    #[error("`{token}` is out of range")]
    OutOfRange { token: String },
}

/// A transformer could not decode its argument
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Argument `{transformer_name}` {reason}")]
pub struct ParseFailure {
    pub transformer_name: String,
    pub reason: ParseFailureReason,
}

impl ParseFailure {
    pub fn new(transformer_name: impl Into<String>, reason: ParseFailureReason) -> Self {
        Self {
            transformer_name: transformer_name.into(),
            reason,
        }
    }

    pub fn missing(transformer_name: impl Into<String>) -> Self {
        Self::new(transformer_name, ParseFailureReason::Missing)
    }
}

/// Registry construction errors; fatal at startup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("command name or alias `{name}` of `{command}` is already registered")]
    DuplicateName { name: String, command: String },
}

/// Handler asked the argument bag for something it does not hold
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("no argument at index {index} (bag holds {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("argument {index} is not a {expected}")]
    TypeMismatch { index: usize, expected: &'static str },
}

/// A resolved command the invoker may not run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyRejection {
    #[error("command is restricted to the bot owner")]
    OwnerOnly,

    #[error("bot is shutting down")]
    ShuttingDown,
}
