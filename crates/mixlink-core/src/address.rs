//! Address/variable-id mapping and label generation
//!
//! The device scopes every OSC path with a trailing device-name segment:
//! commands go out as `<logical>/<device>` and reports come back the same
//! way. Internally state is keyed by flat identifiers derived from the
//! logical path (`/gain/input/2/5` → `gain_input_2_5`).

use crate::types::{ChannelKind, Direction};

/// Build the outbound wire path for a logical path
pub fn device_path(logical: &str, device_name: &str) -> String {
    format!("{logical}/{device_name}")
}

/// Map an inbound OSC path to its variable identifier: strip the trailing
/// `/<device-name>` segment when present, drop the leading slash, flatten
/// the rest with underscores.
pub fn variable_id(path: &str, device_name: &str) -> String {
    let suffix = format!("/{device_name}");
    let logical = if !device_name.is_empty() && path.ends_with(&suffix) {
        &path[..path.len() - suffix.len()]
    } else {
        path
    };
    logical.trim_start_matches('/').replace('/', "_")
}

/// `"<Analog|Dante> <in|out> <1..4>"` per the channel partition rule
pub fn channel_label(channel: u8, direction: Direction) -> String {
    format!(
        "{} {} {}",
        ChannelKind::of(channel),
        direction.short(),
        ChannelKind::display_number(channel)
    )
}

/// Parsed shape of a variable identifier.
///
/// Built once per identifier by [`VariableKind::parse`]; everything that
/// needs to branch on what a variable *is* (labels, queries) matches on this
/// instead of re-splitting strings. Identifiers that match no known shape
/// carry their raw text in [`VariableKind::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableKind {
    CrosspointGain { input: u8, output: u8 },
    OutputGain { output: u8 },
    InputMute { channel: u8 },
    OutputMute { channel: u8 },
    Trim { channel: u8 },
    Delay { channel: u8 },
    Phase { direction: Direction, channel: u8 },
    EqEnable { direction: Direction, channel: u8 },
    Comp { param: String, direction: Direction, channel: u8 },
    EqGain { direction: Direction, channel: u8, band: String },
    Unknown(String),
}

fn channel(seg: &str) -> Option<u8> {
    seg.parse::<u8>().ok().filter(|n| (1..=8).contains(n))
}

fn direction(seg: &str) -> Option<Direction> {
    match seg {
        "input" => Some(Direction::Input),
        "output" => Some(Direction::Output),
        _ => None,
    }
}

impl VariableKind {
    /// Parse an identifier into its shape. Total: anything unrecognized
    /// becomes [`VariableKind::Unknown`].
    pub fn parse(id: &str) -> VariableKind {
        let segs: Vec<&str> = id.split('_').collect();
        let parsed = match segs.as_slice() {
            ["gain", "input", i, o] => channel(i)
                .zip(channel(o))
                .map(|(input, output)| VariableKind::CrosspointGain { input, output }),
            ["gain", "output", o] => channel(o).map(|output| VariableKind::OutputGain { output }),
            ["mute", "input", c] => channel(c).map(|channel| VariableKind::InputMute { channel }),
            ["mute", "output", c] => channel(c).map(|channel| VariableKind::OutputMute { channel }),
            ["trim", c] => channel(c).map(|channel| VariableKind::Trim { channel }),
            ["delay", c] => channel(c).map(|channel| VariableKind::Delay { channel }),
            ["phase", d, c] => direction(d)
                .zip(channel(c))
                .map(|(direction, channel)| VariableKind::Phase { direction, channel }),
            ["eqenable", d, c] => direction(d)
                .zip(channel(c))
                .map(|(direction, channel)| VariableKind::EqEnable { direction, channel }),
            ["comp", param, d, c] => {
                direction(d)
                    .zip(channel(c))
                    .map(|(direction, channel)| VariableKind::Comp {
                        param: (*param).to_string(),
                        direction,
                        channel,
                    })
            }
            ["eq", "gain", d, c, band] => {
                direction(d)
                    .zip(channel(c))
                    .map(|(direction, channel)| VariableKind::EqGain {
                        direction,
                        channel,
                        band: (*band).to_string(),
                    })
            }
            _ => None,
        };
        parsed.unwrap_or_else(|| VariableKind::Unknown(id.to_string()))
    }

    /// Human-readable label for the identifier. Never fails: unknown shapes
    /// fall back to the title-cased raw identifier.
    pub fn label(&self) -> String {
        use Direction::{Input, Output};
        match self {
            VariableKind::CrosspointGain { input, output } => format!(
                "Gain: {} -> {}",
                channel_label(*input, Input),
                channel_label(*output, Output)
            ),
            VariableKind::OutputGain { output } => {
                format!("Gain: {}", channel_label(*output, Output))
            }
            VariableKind::InputMute { channel } => {
                format!("Mute: {}", channel_label(*channel, Input))
            }
            VariableKind::OutputMute { channel } => {
                format!("Mute: {}", channel_label(*channel, Output))
            }
            VariableKind::Trim { channel } => {
                format!("Trim: {}", channel_label(*channel, Input))
            }
            VariableKind::Delay { channel } => {
                format!("Delay: {}", channel_label(*channel, Output))
            }
            VariableKind::Phase { direction, channel } => {
                format!("Phase: {}", channel_label(*channel, *direction))
            }
            VariableKind::EqEnable { direction, channel } => {
                format!("EQ Enable: {}", channel_label(*channel, *direction))
            }
            VariableKind::Comp {
                param,
                direction,
                channel,
            } => format!(
                "Comp {}: {}",
                title_case_word(param),
                channel_label(*channel, *direction)
            ),
            VariableKind::EqGain {
                direction,
                channel,
                band,
            } => format!(
                "EQ Gain: {} Band {}",
                channel_label(*channel, *direction),
                band
            ),
            VariableKind::Unknown(raw) => title_case_id(raw),
        }
    }
}

/// Convenience: parse + label in one step
pub fn label_for(id: &str) -> String {
    VariableKind::parse(id).label()
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_case_id(id: &str) -> String {
    id.split('_')
        .filter(|s| !s.is_empty())
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}
