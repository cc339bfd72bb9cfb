//! Error types.

use std::io;

use thiserror::Error;

/// Errors raised while encoding or transmitting a lighting command.
#[derive(Error, Debug)]
pub enum Error {
    /// A preset field or transport setting is outside its domain.
    #[error("invalid {field}: {value}")]
    InvalidParameter { field: &'static str, value: String },

    /// A key name which is not part of the keyboard layout.
    #[error("unknown key: {0:?}")]
    InvalidKey(String),

    /// A pre-built buffer does not have the required size.
    #[error("invalid buffer length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Writing report `index` of `total` to the device failed.
    #[error("unable to write report {index} of {total}: {source}")]
    Transport {
        index: usize,
        total: usize,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn invalid_parameter(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidParameter { field, value: value.to_string() }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
