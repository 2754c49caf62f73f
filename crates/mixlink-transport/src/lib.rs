//! Mixlink transport
//!
//! UDP socket plumbing and stream reassembly. The socket side is a thin
//! async wrapper over `tokio::net::UdpSocket`; the [`Reassembler`] turns raw
//! datagram payloads back into whole OSC messages, tolerating frames split
//! or concatenated across datagram boundaries and recovering from junk
//! bytes without ever stalling.

pub mod error;
pub mod reassembler;
pub mod traits;
pub mod udp;

pub use error::{Result, TransportError};
pub use reassembler::Reassembler;
pub use traits::{TransportEvent, TransportReceiver, TransportSender};
pub use udp::{UdpReceiver, UdpSender, UdpTransport};
