//! Mixlink core
//!
//! Protocol primitives for talking OSC to a matrix audio router:
//! - OSC wire codec, including the device's non-standard path-only frames
//!   ([`codec`])
//! - Address/variable-id mapping and label generation ([`address`])
//! - Argument model, display formatting, tolerant boolean parsing ([`types`])
//! - Flat variable store and saved-gain bookkeeping ([`state`])
//!
//! Everything here is synchronous and socket-free; the transport and session
//! layers live in `mixlink-transport` and `mixlink-client`.

pub mod address;
pub mod codec;
pub mod error;
pub mod state;
pub mod types;

pub use address::{channel_label, device_path, variable_id, VariableKind};
pub use codec::{decode_packet, encode_message, frame_length, FrameLength, OscMessage, OscPacket};
pub use error::{Error, Result};
pub use state::{SavedGains, StateStore, StoreUpdate};
pub use types::{parse_bool_loose, ChannelKind, Direction, OscArg};

/// Inputs on the routing matrix
pub const NUM_INPUTS: u8 = 8;

/// Outputs on the routing matrix
pub const NUM_OUTPUTS: u8 = 8;

/// Lower gain bound in dB; also the canonical "crosspoint muted" value
pub const GAIN_MIN: f32 = -120.0;

/// Upper gain bound in dB
pub const GAIN_MAX: f32 = 10.0;

/// Default port the device listens on for commands
pub const DEFAULT_TARGET_PORT: u16 = 9000;

/// Default port the device sends feedback to
pub const DEFAULT_FEEDBACK_PORT: u16 = 9001;

/// Maximum UDP payload we will ever frame
pub const MAX_PACKET_SIZE: usize = 65507;
