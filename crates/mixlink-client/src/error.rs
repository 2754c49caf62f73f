//! Client error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("bad configuration: {0}")]
    BadConfig(String),

    #[error("could not resolve {host}: {reason}")]
    ResolveFailed { host: String, reason: String },

    #[error("channel {channel} out of range 1..={max}")]
    InvalidChannel { channel: u8, max: u8 },

    #[error(transparent)]
    Transport(#[from] mixlink_transport::TransportError),

    #[error(transparent)]
    Core(#[from] mixlink_core::Error),
}
