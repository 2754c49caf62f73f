//! OSC stream reassembly
//!
//! UDP hands us datagram payloads that may carry a partial frame, exactly
//! one frame, or several frames back to back. The reassembler keeps one
//! growing buffer per connection and peels complete frames off the front
//! using the codec's structural scanner.
//!
//! Recovery policy: a prefix the scanner classifies as junk loses exactly
//! one byte per iteration, so the loop always terminates. The cost is one
//! sacrificed byte of an already-unparseable run, never a valid frame.
//! Frames that slice cleanly but fail to decode are logged and skipped.
//!
//! A path-only frame sitting alone at the end of the buffer stays pending
//! until the next datagram proves no type-tag section follows; liveness does
//! not suffer because the session refreshes it on raw datagram arrival, not
//! on decoded output.

use bytes::{Buf, BytesMut};
use mixlink_core::codec::{decode_packet, frame_length, FrameLength, OscMessage, OscPacket};
use tracing::debug;

/// Per-connection stream reassembler
#[derive(Debug, Default)]
pub struct Reassembler {
    buf: BytesMut,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one datagram payload and extract every complete message.
    /// Bundles are unwrapped here; inner messages come out in wire order.
    pub fn push(&mut self, datagram: &[u8]) -> Vec<OscMessage> {
        self.buf.extend_from_slice(datagram);

        let mut out = Vec::new();
        loop {
            match frame_length(&self.buf) {
                FrameLength::NeedMore => break,
                FrameLength::Invalid => {
                    debug!("dropping unparseable byte 0x{:02x}", self.buf[0]);
                    self.buf.advance(1);
                }
                FrameLength::Complete(len) => {
                    let frame = self.buf.split_to(len);
                    match decode_packet(&frame) {
                        Ok(OscPacket::Message(msg)) => out.push(msg),
                        Ok(OscPacket::Bundle(messages)) => out.extend(messages),
                        Err(e) => debug!("discarding undecodable frame: {}", e),
                    }
                }
            }
            if self.buf.is_empty() {
                break;
            }
        }
        out
    }

    /// Bytes still waiting for the rest of their frame
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drop buffered bytes; called on every reconnect
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
