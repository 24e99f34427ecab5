//! Definition of errors.

use std::error::Error;
use std::fmt;

pub type Result<T, E = SceltaError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum SceltaError {
    InvalidConfig(InvalidConfigError),
    InsufficientData(InsufficientDataError),
    Training(TrainingError),
}

impl SceltaError {
    pub(crate) fn invalid_config<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidConfig(InvalidConfigError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn insufficient_data<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InsufficientData(InsufficientDataError { msg: msg.into() })
    }

    pub(crate) fn training<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Training(TrainingError { msg: msg.into() })
    }
}

impl fmt::Display for SceltaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidConfig(e) => e.fmt(f),
            Self::InsufficientData(e) => e.fmt(f),
            Self::Training(e) => e.fmt(f),
        }
    }
}

impl Error for SceltaError {}

/// Error used when a caller-fixable parameter is invalid.
#[derive(Debug)]
pub struct InvalidConfigError {
    /// Name of the parameter.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidConfigError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidConfigError {}

/// Error used when the given data cannot support the requested operation.
#[derive(Debug)]
pub struct InsufficientDataError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InsufficientDataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InsufficientDataError: {}", self.msg)
    }
}

impl Error for InsufficientDataError {}

/// Error propagated unmodified from the underlying model engine.
#[derive(Debug)]
pub struct TrainingError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for TrainingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TrainingError: {}", self.msg)
    }
}

impl Error for TrainingError {}
