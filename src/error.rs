//! Error types
//!
//! Only configuration and start-up can fail; the frame loop has no error
//! paths of its own.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("option {0} expects a value")]
    MissingValue(String),

    #[error("invalid value {value:?} for {option}")]
    InvalidValue { option: String, value: String },

    #[error("{field} {reason}")]
    OutOfRange { field: &'static str, reason: String },

    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("malformed settings JSON: {0}")]
    Json(String),
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no drawing surface available: {0}")]
    Surface(String),

    #[error("no compatible graphics adapter")]
    NoAdapter,

    #[error("failed to create graphics device: {0}")]
    Device(String),

    #[error("surface reports no texture formats")]
    NoSurfaceFormat,

    #[error("cannot allocate {what} of {len} elements")]
    Allocation { what: &'static str, len: usize },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Buffer of `cols * rows` copies of `value`, reporting overflow or
/// allocation failure instead of aborting
pub(crate) fn try_filled<T: Copy>(
    what: &'static str,
    cols: usize,
    rows: usize,
    value: T,
) -> Result<Vec<T>, StartupError> {
    let len = cols.checked_mul(rows).ok_or(StartupError::Allocation {
        what,
        len: usize::MAX,
    })?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| StartupError::Allocation { what, len })?;
    buf.resize(len, value);
    Ok(buf)
}
