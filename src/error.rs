use anyhow::Error as AnyhowError;
use thiserror::Error as ThisError;

/// Result alias for errors emitted by engine internals.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured error type for the analysis engine.
///
/// "No finding" outcomes (unresolvable symbols, rejected candidates) are not
/// errors and never surface here; these variants are reserved for I/O, bad
/// fixtures and programming-contract violations.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fixture failure: {0}")]
    Fixture(String),

    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error("analysis cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn fixture(msg: impl Into<String>) -> Self {
        Self::Fixture(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        Self::ContractViolation(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Convert to anyhow::Error for interop with anyhow-based code.
    pub fn into_anyhow(self) -> AnyhowError {
        AnyhowError::new(self)
    }
}

impl From<AnyhowError> for Error {
    fn from(err: AnyhowError) -> Self {
        Error::other(err.to_string())
    }
}

/// Convenience macro mirroring `anyhow::bail!` but returning [`Error`].
#[macro_export]
macro_rules! engine_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::Error::other(format!($($arg)*)));
    };
}

/// Convenience macro mirroring `anyhow::ensure!`.
#[macro_export]
macro_rules! engine_ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::engine_bail!($($arg)*);
        }
    };
}
