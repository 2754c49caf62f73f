//! Error types for mixlink core

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types
#[derive(Error, Debug)]
pub enum Error {
    /// OSC address did not start with '/'
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Encoded packet would exceed the UDP payload limit
    #[error("payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    /// Type tag we neither emit nor accept
    #[error("unknown type tag: '{0}'")]
    UnknownTypeTag(char),

    /// Frame shorter than its own structure requires
    #[error("buffer too small: need {needed} bytes, have {have}")]
    BufferTooSmall { needed: usize, have: usize },

    /// Malformed frame content
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Bundle inside a bundle; the device never sends these
    #[error("nested bundles are not supported")]
    NestedBundle,
}
