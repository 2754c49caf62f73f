//! OSC wire codec
//!
//! Implements the subset of the OSC 1.0 binary format the device emits and
//! accepts: messages with `f`/`i`/`s`/`T`/`F` arguments, one level of
//! `#bundle` wrapping, and the device's non-standard *path-only* frame: a
//! bare null-terminated address with no type-tag section, used for probe-echo
//! replies.
//!
//! Message layout:
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ address   null-terminated, padded to a 4-byte boundary   │
//! │ type tags ","  + one letter per argument, padded         │
//! │ arguments f/i: 4 bytes big-endian; s: padded string;     │
//! │           T/F: no payload, the tag is the value          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! [`frame_length`] is the structural scanner the stream reassembler drives:
//! it never panics and never errors, it only classifies the front of a
//! buffer as a complete frame, a frame still in flight, or junk.

use crate::error::{Error, Result};
use crate::types::OscArg;
use crate::MAX_PACKET_SIZE;
use bytes::{BufMut, Bytes, BytesMut};

const BUNDLE_TAG: &[u8] = b"#bundle\0";

/// Bundle header: "#bundle\0" plus the 8-byte time tag
const BUNDLE_HEADER: usize = 16;

/// A decoded OSC message
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    pub addr: String,
    pub args: Vec<OscArg>,
}

/// A decoded OSC packet. Bundles are unwrapped one level; the device never
/// nests them.
#[derive(Debug, Clone, PartialEq)]
pub enum OscPacket {
    Message(OscMessage),
    Bundle(Vec<OscMessage>),
}

/// Classification of the front of a reassembly buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLength {
    /// One complete frame of exactly this many bytes
    Complete(usize),
    /// Structure is consistent so far but the frame is still in flight
    NeedMore,
    /// The leading byte can never start a frame; drop it and rescan
    Invalid,
}

fn align4(n: usize) -> usize {
    (n + 3) & !3
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode one OSC message. The type-tag string is emitted even with zero
/// arguments; `T`/`F` arguments contribute a tag letter but no payload bytes.
pub fn encode_message(addr: &str, args: &[OscArg]) -> Result<Bytes> {
    if !addr.starts_with('/') {
        return Err(Error::InvalidAddress(addr.to_string()));
    }

    let mut buf = BytesMut::with_capacity(align4(addr.len() + 1) + align4(args.len() + 2) + args.len() * 4);
    put_padded_str(&mut buf, addr);

    let mut tags = String::with_capacity(args.len() + 1);
    tags.push(',');
    for arg in args {
        tags.push(arg.type_tag());
    }
    put_padded_str(&mut buf, &tags);

    for arg in args {
        match arg {
            OscArg::Float(f) => buf.put_f32(*f),
            OscArg::Int(i) => buf.put_i32(*i),
            OscArg::Str(s) => put_padded_str(&mut buf, s),
            OscArg::Bool(_) => {}
        }
    }

    if buf.len() > MAX_PACKET_SIZE {
        return Err(Error::PayloadTooLarge(buf.len()));
    }
    Ok(buf.freeze())
}

fn put_padded_str(buf: &mut BytesMut, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    let pad = align4(s.len() + 1) - s.len();
    for _ in 0..pad {
        buf.put_u8(0);
    }
}

// ---------------------------------------------------------------------------
// Structural scan
// ---------------------------------------------------------------------------

/// Byte length of the first complete frame in `buf`, without decoding it.
///
/// Tries the standard message/bundle layout first and falls back to
/// path-only framing (length = the padded address alone) when no type-tag
/// section follows the address. Infallible: malformed leading bytes come
/// back as [`FrameLength::Invalid`] so the caller can drop one byte and
/// rescan, which keeps the reassembly loop terminating.
pub fn frame_length(buf: &[u8]) -> FrameLength {
    if buf.is_empty() {
        return FrameLength::NeedMore;
    }
    match buf[0] {
        b'/' => message_length(buf),
        b'#' => bundle_length(buf),
        _ => FrameLength::Invalid,
    }
}

enum Scan {
    /// `end` is the NUL position, `next` the 4-aligned offset after padding
    Ok { end: usize, next: usize },
    NeedMore,
    Invalid,
}

/// Scan a null-terminated printable-ASCII string (addresses, type tags)
fn scan_ascii_str(buf: &[u8], at: usize) -> Scan {
    let mut i = at;
    while i < buf.len() {
        match buf[i] {
            0 => {
                let next = at + align4(i - at + 1);
                if next > buf.len() {
                    return Scan::NeedMore;
                }
                return Scan::Ok { end: i, next };
            }
            0x20..=0x7e => i += 1,
            _ => return Scan::Invalid,
        }
    }
    Scan::NeedMore
}

/// Scan a null-terminated string argument (any non-NUL byte allowed)
fn scan_str_arg(buf: &[u8], at: usize) -> Scan {
    let mut i = at;
    while i < buf.len() {
        if buf[i] == 0 {
            let next = at + align4(i - at + 1);
            if next > buf.len() {
                return Scan::NeedMore;
            }
            return Scan::Ok { end: i, next };
        }
        i += 1;
    }
    Scan::NeedMore
}

fn message_length(buf: &[u8]) -> FrameLength {
    let (addr_end, addr_next) = match scan_ascii_str(buf, 0) {
        Scan::Ok { end, next } => (end, next),
        Scan::NeedMore => return FrameLength::NeedMore,
        Scan::Invalid => return FrameLength::Invalid,
    };
    if addr_end == 0 {
        // a lone "/" is not an address
        return FrameLength::Invalid;
    }

    // The type-tag decision needs one byte past the padded address: a
    // buffer ending exactly there is indistinguishable from a standard
    // message whose tag section is still in flight.
    if addr_next >= buf.len() {
        return FrameLength::NeedMore;
    }
    // No comma where the type-tag string belongs: this is the device's
    // path-only framing and the padded address is the whole frame.
    if buf[addr_next] != b',' {
        return FrameLength::Complete(addr_next);
    }

    let (tags_end, mut pos) = match scan_ascii_str(buf, addr_next) {
        Scan::Ok { end, next } => (end, next),
        Scan::NeedMore => return FrameLength::NeedMore,
        Scan::Invalid => return FrameLength::Invalid,
    };

    for &tag in &buf[addr_next + 1..tags_end] {
        match tag {
            b'f' | b'i' => pos += 4,
            b'T' | b'F' => {}
            b's' => match scan_str_arg(buf, pos) {
                Scan::Ok { next, .. } => pos = next,
                Scan::NeedMore => return FrameLength::NeedMore,
                Scan::Invalid => return FrameLength::Invalid,
            },
            _ => return FrameLength::Invalid,
        }
    }

    if pos > buf.len() {
        FrameLength::NeedMore
    } else {
        FrameLength::Complete(pos)
    }
}

/// Whether a big-endian i32 at `pos` is a credible bundle element size.
/// A following frame's leading '/' or '#' read as an int is in the hundreds
/// of millions, so this check also finds where a bundle ends when more
/// frames are queued behind it.
fn plausible_element_size(size: i32) -> Option<usize> {
    if size > 0 && size % 4 == 0 && (size as usize) <= MAX_PACKET_SIZE {
        Some(size as usize)
    } else {
        None
    }
}

fn bundle_length(buf: &[u8]) -> FrameLength {
    let n = buf.len().min(BUNDLE_TAG.len());
    if buf[..n] != BUNDLE_TAG[..n] {
        return FrameLength::Invalid;
    }
    if buf.len() < BUNDLE_HEADER {
        return FrameLength::NeedMore;
    }

    let mut pos = BUNDLE_HEADER;
    loop {
        if pos == buf.len() {
            return FrameLength::Complete(pos);
        }
        if pos + 4 > buf.len() {
            return FrameLength::NeedMore;
        }
        let size = i32::from_be_bytes([buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]]);
        let size = match plausible_element_size(size) {
            Some(s) => s,
            // next bytes start another frame, the bundle ends here
            None => return FrameLength::Complete(pos),
        };
        let end = pos + 4 + size;
        if end > buf.len() {
            return FrameLength::NeedMore;
        }
        pos = end;
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode one complete frame, as delimited by [`frame_length`].
pub fn decode_packet(frame: &[u8]) -> Result<OscPacket> {
    if frame.is_empty() {
        return Err(Error::DecodeError("empty frame".to_string()));
    }
    match frame[0] {
        b'/' => decode_message(frame).map(OscPacket::Message),
        b'#' => decode_bundle(frame).map(OscPacket::Bundle),
        other => Err(Error::DecodeError(format!(
            "frame starts with 0x{other:02x}, expected '/' or '#'"
        ))),
    }
}

fn read_padded_str(frame: &[u8], at: usize) -> Result<(String, usize)> {
    match scan_str_arg(frame, at) {
        Scan::Ok { end, next } => {
            let s = std::str::from_utf8(&frame[at..end])
                .map_err(|e| Error::DecodeError(e.to_string()))?;
            Ok((s.to_string(), next))
        }
        _ => Err(Error::BufferTooSmall {
            needed: at + 4,
            have: frame.len(),
        }),
    }
}

fn read_f32(frame: &[u8], at: usize) -> Result<f32> {
    let bytes: [u8; 4] = frame
        .get(at..at + 4)
        .ok_or(Error::BufferTooSmall {
            needed: at + 4,
            have: frame.len(),
        })?
        .try_into()
        .expect("slice of length 4");
    Ok(f32::from_be_bytes(bytes))
}

fn read_i32(frame: &[u8], at: usize) -> Result<i32> {
    let bytes: [u8; 4] = frame
        .get(at..at + 4)
        .ok_or(Error::BufferTooSmall {
            needed: at + 4,
            have: frame.len(),
        })?
        .try_into()
        .expect("slice of length 4");
    Ok(i32::from_be_bytes(bytes))
}

fn decode_message(frame: &[u8]) -> Result<OscMessage> {
    let (addr, pos) = read_padded_str(frame, 0)?;
    if !addr.starts_with('/') || addr.len() < 2 {
        return Err(Error::InvalidAddress(addr));
    }

    // Path-only frame: address, then nothing (or no type-tag section)
    if pos >= frame.len() || frame[pos] != b',' {
        return Ok(OscMessage { addr, args: vec![] });
    }

    let (tags, mut pos) = read_padded_str(frame, pos)?;
    let mut args = Vec::with_capacity(tags.len().saturating_sub(1));
    for tag in tags.chars().skip(1) {
        match tag {
            'f' => {
                args.push(OscArg::Float(read_f32(frame, pos)?));
                pos += 4;
            }
            'i' => {
                args.push(OscArg::Int(read_i32(frame, pos)?));
                pos += 4;
            }
            's' => {
                let (s, next) = read_padded_str(frame, pos)?;
                args.push(OscArg::Str(s));
                pos = next;
            }
            'T' => args.push(OscArg::Bool(true)),
            'F' => args.push(OscArg::Bool(false)),
            other => return Err(Error::UnknownTypeTag(other)),
        }
    }

    Ok(OscMessage { addr, args })
}

fn decode_bundle(frame: &[u8]) -> Result<Vec<OscMessage>> {
    if frame.len() < BUNDLE_HEADER || &frame[..BUNDLE_TAG.len()] != BUNDLE_TAG {
        return Err(Error::DecodeError("malformed bundle header".to_string()));
    }

    let mut messages = Vec::new();
    let mut pos = BUNDLE_HEADER;
    while pos + 4 <= frame.len() {
        let size = i32::from_be_bytes([frame[pos], frame[pos + 1], frame[pos + 2], frame[pos + 3]]);
        let size = match plausible_element_size(size) {
            Some(s) => s,
            None => break,
        };
        let start = pos + 4;
        let end = start + size;
        if end > frame.len() {
            return Err(Error::BufferTooSmall {
                needed: end,
                have: frame.len(),
            });
        }
        let element = &frame[start..end];
        if element.first() == Some(&b'#') {
            return Err(Error::NestedBundle);
        }
        messages.push(decode_message(element)?);
        pos = end;
    }
    Ok(messages)
}

/// Encode a bundle of messages. Outbound device commands are always single
/// messages, so only tests and tooling use this; kept symmetric with
/// [`decode_bundle`].
pub fn encode_bundle(messages: &[(String, Vec<OscArg>)]) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(BUNDLE_HEADER + messages.len() * 32);
    buf.extend_from_slice(BUNDLE_TAG);
    // Immediate-execution time tag
    buf.put_u64(1);
    for (addr, args) in messages {
        let inner = encode_message(addr, args)?;
        buf.put_i32(inner.len() as i32);
        buf.extend_from_slice(&inner);
    }
    if buf.len() > MAX_PACKET_SIZE {
        return Err(Error::PayloadTooLarge(buf.len()));
    }
    Ok(buf.freeze())
}
