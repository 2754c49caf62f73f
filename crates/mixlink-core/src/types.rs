//! Argument model, channel naming and value formatting

use std::fmt;

/// A single OSC argument, restricted to the subset the device speaks.
///
/// Outbound commands carry `Float` (gains) or `Bool` (mutes, tag-only on the
/// wire). Inbound reports may additionally carry `Int` and `Str`.
#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    Float(f32),
    Int(i32),
    Str(String),
    Bool(bool),
}

impl OscArg {
    /// OSC type tag letter for this argument
    pub fn type_tag(&self) -> char {
        match self {
            OscArg::Float(_) => 'f',
            OscArg::Int(_) => 'i',
            OscArg::Str(_) => 's',
            OscArg::Bool(true) => 'T',
            OscArg::Bool(false) => 'F',
        }
    }

    /// Numeric view of the argument, if it has one
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            OscArg::Float(f) => Some(*f),
            OscArg::Int(i) => Some(*i as f32),
            _ => None,
        }
    }

    /// Display form stored in the variable map.
    ///
    /// Booleans become `"1"`/`"0"`; numbers equal to exactly 0 or 1 collapse
    /// to `"0"`/`"1"`; other numbers round to one decimal place; strings pass
    /// through. One-decimal precision is lossy and intentional: stored
    /// values must match what the variable display shows.
    pub fn format(&self) -> String {
        match self {
            OscArg::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            OscArg::Float(f) => format_number(*f),
            OscArg::Int(i) => format_number(*i as f32),
            OscArg::Str(s) => s.clone(),
        }
    }
}

fn format_number(v: f32) -> String {
    if v == 0.0 {
        "0".to_string()
    } else if v == 1.0 {
        "1".to_string()
    } else {
        format!("{:.1}", v)
    }
}

/// Tolerant truthiness parse for stored mute values.
///
/// The device reports mutes as `T`/`F` tags but stored values may be `"1"`,
/// `"1.0"`, `"true"` or similar depending on which path wrote them. One
/// parser is authoritative: numeric parse compares against zero, otherwise a
/// case-insensitive `true` literal matches, everything else is false.
pub fn parse_bool_loose(s: &str) -> bool {
    let t = s.trim();
    if let Ok(n) = t.parse::<f64>() {
        return n != 0.0;
    }
    t.eq_ignore_ascii_case("true")
}

/// Signal direction on the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// Short form used in channel labels
    pub fn short(&self) -> &'static str {
        match self {
            Direction::Input => "in",
            Direction::Output => "out",
        }
    }
}

/// Physical kind of a channel. Channels 1..4 are analog, 5..8 are Dante.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Analog,
    Dante,
}

impl ChannelKind {
    /// Kind of a 1-based channel number
    pub fn of(channel: u8) -> ChannelKind {
        if channel <= 4 {
            ChannelKind::Analog
        } else {
            ChannelKind::Dante
        }
    }

    /// Display number within the kind (numbering restarts at 1 for Dante)
    pub fn display_number(channel: u8) -> u8 {
        if channel <= 4 {
            channel
        } else {
            channel - 4
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Analog => write!(f, "Analog"),
            ChannelKind::Dante => write!(f, "Dante"),
        }
    }
}
