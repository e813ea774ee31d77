use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a stored argument into a value of the declared parameter type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unsupported parameter type `{type_name}`")]
    UnsupportedType { type_name: &'static str },

    #[error("`{text}` is not a member of enum `{enum_name}`")]
    EnumParse { enum_name: &'static str, text: String },
}

/// A decoded value did not have the shape the parameter type expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("argument mismatch: expected {expected}, found {found}")]
pub struct ArgumentMismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

/// Errors that abort a single invocation and, by default, the rest of the pass.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("cannot decode argument {index} of `{method}`: {source}")]
    Decode {
        method: String,
        index: usize,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Argument(#[from] ArgumentMismatch),

    #[error("component is not a `{expected}`, cannot call `{method}`")]
    TargetMismatch {
        expected: &'static str,
        method: &'static str,
    },

    #[error("`{method}` failed: {source}")]
    Method {
        method: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl InvocationError {
    /// Wrap an error returned by an invoked method.
    pub fn method<E>(method: &str, err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self::Method {
            method: method.to_string(),
            source: err.into(),
        }
    }

    /// Whether the error was raised by user code rather than by argument handling.
    pub fn is_method_failure(&self) -> bool {
        matches!(self, Self::Method { .. })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
}
