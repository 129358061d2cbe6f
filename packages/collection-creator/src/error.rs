//! Error types for collection creation.

use collection_types::FormError;
use std::fmt;

/// Collection creator error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// A selected file could not be read.
    Selection(String),
    /// Collection form is incomplete.
    Form(FormError),
    /// Pinning service request failed.
    Pinning(String),
    /// JSON-RPC communication error.
    Rpc(String),
    /// Transaction reverted or its logs could not be decoded.
    Contract(String),
    /// A submit cycle is already in flight.
    Busy,
    /// Submit was attempted with no files selected.
    NothingSelected,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Selection(msg) => write!(f, "selection error: {msg}"),
            Error::Form(e) => write!(f, "form error: {e}"),
            Error::Pinning(msg) => write!(f, "pinning error: {msg}"),
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
            Error::Contract(msg) => write!(f, "contract error: {msg}"),
            Error::Busy => write!(f, "a collection is already being created"),
            Error::NothingSelected => write!(f, "no images selected"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Form(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FormError> for Error {
    fn from(e: FormError) -> Self {
        Error::Form(e)
    }
}
