//! Transport trait definitions
//!
//! The session layer talks to the socket through these seams so tests can
//! substitute an in-memory pair.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Events surfaced by a transport receiver
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Datagram payload received
    Data(Bytes),
    /// Receive-side error
    Error(String),
}

/// Trait for sending datagrams to the device
#[async_trait]
pub trait TransportSender: Send + Sync {
    async fn send(&self, data: Bytes) -> Result<()>;
}

/// Trait for receiving datagrams from the device
#[async_trait]
pub trait TransportReceiver: Send {
    async fn recv(&mut self) -> Option<TransportEvent>;
}
