//! Mixing operations and queries
//!
//! Every mutator follows the same read-modify-write shape: read the stored
//! value (absent means 0 dB / unmuted), compute the new one, transmit the
//! command optimistically, then update the store and notify observers
//! before the device confirms. The device's own echo may overwrite the
//! optimistic value later; whichever write the session task processes last
//! wins, and both sides converge on the device's authoritative state.

use mixlink_core::{parse_bool_loose, OscArg, GAIN_MAX, GAIN_MIN, NUM_INPUTS, NUM_OUTPUTS};

use crate::error::{ClientError, Result};
use crate::session::{send_command, store_and_notify, Session};

/// Gain step presets plus a custom amount in dB
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GainStep {
    Up3,
    Down3,
    Custom(f32),
}

impl GainStep {
    pub fn amount(&self) -> f32 {
        match self {
            GainStep::Up3 => 3.0,
            GainStep::Down3 => -3.0,
            GainStep::Custom(v) => *v,
        }
    }
}

/// Channel mute modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteMode {
    Off,
    On,
    Toggle,
}

/// The named operations the host environment can invoke, with typed,
/// bounded parameters. Channel indices are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetCrosspointGain { input: u8, output: u8, gain: f32 },
    SetOutputGain { output: u8, gain: f32 },
    StepCrosspointGain { input: u8, output: u8, step: GainStep },
    StepOutputGain { output: u8, step: GainStep },
    ToggleCrosspointMute { input: u8, output: u8 },
    SetInputMute { channel: u8, mode: MuteMode },
    SetOutputMute { channel: u8, mode: MuteMode },
}

impl Action {
    /// Registry name of the operation
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetCrosspointGain { .. } => "set_crosspoint_gain",
            Action::SetOutputGain { .. } => "set_output_gain",
            Action::StepCrosspointGain { .. } => "step_crosspoint_gain",
            Action::StepOutputGain { .. } => "step_output_gain",
            Action::ToggleCrosspointMute { .. } => "toggle_crosspoint_mute",
            Action::SetInputMute { .. } => "set_input_mute",
            Action::SetOutputMute { .. } => "set_output_mute",
        }
    }
}

/// Clamp a gain to the device's working range
pub fn clamp_gain(gain: f32) -> f32 {
    gain.clamp(GAIN_MIN, GAIN_MAX)
}

/// Stepped gain: current value plus step, clamped
pub fn step_gain(current: f32, step: GainStep) -> f32 {
    clamp_gain(current + step.amount())
}

/// A crosspoint is muted when its gain sits at the floor
pub fn gain_is_muted(gain: f32) -> bool {
    gain <= GAIN_MIN
}

fn check_input(channel: u8) -> Result<()> {
    if (1..=NUM_INPUTS).contains(&channel) {
        Ok(())
    } else {
        Err(ClientError::InvalidChannel {
            channel,
            max: NUM_INPUTS,
        })
    }
}

fn check_output(channel: u8) -> Result<()> {
    if (1..=NUM_OUTPUTS).contains(&channel) {
        Ok(())
    } else {
        Err(ClientError::InvalidChannel {
            channel,
            max: NUM_OUTPUTS,
        })
    }
}

impl Session {
    /// Dispatch a named operation
    pub async fn apply(&self, action: Action) -> Result<()> {
        match action {
            Action::SetCrosspointGain { input, output, gain } => {
                self.set_crosspoint_gain(input, output, gain).await
            }
            Action::SetOutputGain { output, gain } => self.set_output_gain(output, gain).await,
            Action::StepCrosspointGain { input, output, step } => {
                self.step_crosspoint_gain(input, output, step).await
            }
            Action::StepOutputGain { output, step } => self.step_output_gain(output, step).await,
            Action::ToggleCrosspointMute { input, output } => {
                self.toggle_crosspoint_mute(input, output).await
            }
            Action::SetInputMute { channel, mode } => self.set_input_mute(channel, mode).await,
            Action::SetOutputMute { channel, mode } => self.set_output_mute(channel, mode).await,
        }
    }

    /// Set one crosspoint gain directly
    pub async fn set_crosspoint_gain(&self, input: u8, output: u8, gain: f32) -> Result<()> {
        check_input(input)?;
        check_output(output)?;
        self.write_gain(
            format!("/gain/input/{input}/{output}"),
            format!("gain_input_{input}_{output}"),
            clamp_gain(gain),
        )
        .await;
        Ok(())
    }

    /// Set one output gain directly
    pub async fn set_output_gain(&self, output: u8, gain: f32) -> Result<()> {
        check_output(output)?;
        self.write_gain(
            format!("/gain/output/{output}"),
            format!("gain_output_{output}"),
            clamp_gain(gain),
        )
        .await;
        Ok(())
    }

    /// Step a crosspoint gain relative to its last-known value
    pub async fn step_crosspoint_gain(&self, input: u8, output: u8, step: GainStep) -> Result<()> {
        check_input(input)?;
        check_output(output)?;
        let id = format!("gain_input_{input}_{output}");
        let current = { self.shared.store.lock().get_f32(&id, 0.0) };
        self.write_gain(
            format!("/gain/input/{input}/{output}"),
            id,
            step_gain(current, step),
        )
        .await;
        Ok(())
    }

    /// Step an output gain relative to its last-known value
    pub async fn step_output_gain(&self, output: u8, step: GainStep) -> Result<()> {
        check_output(output)?;
        let id = format!("gain_output_{output}");
        let current = { self.shared.store.lock().get_f32(&id, 0.0) };
        self.write_gain(format!("/gain/output/{output}"), id, step_gain(current, step))
            .await;
        Ok(())
    }

    /// Mute a crosspoint by dropping it to the gain floor, remembering the
    /// previous level; unmute by restoring the remembered level (0 dB when
    /// nothing was remembered, e.g. after a reconnect cleared state).
    pub async fn toggle_crosspoint_mute(&self, input: u8, output: u8) -> Result<()> {
        check_input(input)?;
        check_output(output)?;
        let id = format!("gain_input_{input}_{output}");
        let logical = format!("/gain/input/{input}/{output}");
        let current = { self.shared.store.lock().get_f32(&id, 0.0) };

        if gain_is_muted(current) {
            let restore = self.shared.saved.lock().take(input, output).unwrap_or(0.0);
            self.write_gain(logical, id, clamp_gain(restore)).await;
        } else {
            self.shared.saved.lock().save(input, output, current);
            self.write_gain(logical, id, GAIN_MIN).await;
        }
        Ok(())
    }

    /// Set, clear or toggle an input channel mute
    pub async fn set_input_mute(&self, channel: u8, mode: MuteMode) -> Result<()> {
        check_input(channel)?;
        self.write_mute(
            format!("/mute/input/{channel}"),
            format!("mute_input_{channel}"),
            mode,
        )
        .await;
        Ok(())
    }

    /// Set, clear or toggle an output channel mute
    pub async fn set_output_mute(&self, channel: u8, mode: MuteMode) -> Result<()> {
        check_output(channel)?;
        self.write_mute(
            format!("/mute/output/{channel}"),
            format!("mute_output_{channel}"),
            mode,
        )
        .await;
        Ok(())
    }

    async fn write_gain(&self, logical: String, id: String, gain: f32) {
        send_command(&self.shared, &logical, &[OscArg::Float(gain)]).await;
        store_and_notify(&self.shared, id, OscArg::Float(gain).format()).await;
    }

    async fn write_mute(&self, logical: String, id: String, mode: MuteMode) {
        let muted = {
            self.shared
                .store
                .lock()
                .get(&id)
                .map(parse_bool_loose)
                .unwrap_or(false)
        };
        let target = match mode {
            MuteMode::Off => false,
            MuteMode::On => true,
            MuteMode::Toggle => !muted,
        };
        send_command(&self.shared, &logical, &[OscArg::Bool(target)]).await;
        store_and_notify(&self.shared, id, OscArg::Bool(target).format()).await;
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether an input channel is muted (tolerant parse of stored state)
    pub fn input_muted(&self, channel: u8) -> bool {
        let id = format!("mute_input_{channel}");
        self.shared
            .store
            .lock()
            .get(&id)
            .map(parse_bool_loose)
            .unwrap_or(false)
    }

    /// Whether an output channel is muted
    pub fn output_muted(&self, channel: u8) -> bool {
        let id = format!("mute_output_{channel}");
        self.shared
            .store
            .lock()
            .get(&id)
            .map(parse_bool_loose)
            .unwrap_or(false)
    }

    /// Whether a crosspoint sits at the muted gain floor
    pub fn crosspoint_muted(&self, input: u8, output: u8) -> bool {
        let id = format!("gain_input_{input}_{output}");
        gain_is_muted(self.shared.store.lock().get_f32(&id, 0.0))
    }

    /// Last-known formatted value of a variable
    pub fn variable(&self, id: &str) -> Option<String> {
        self.shared.store.lock().get(id).map(str::to_string)
    }

    /// All variables in registration order
    pub fn variables(&self) -> Vec<(String, String)> {
        self.shared.store.lock().snapshot()
    }

    /// Human-readable label for a variable id; never fails
    pub fn variable_label(&self, id: &str) -> String {
        mixlink_core::address::label_for(id)
    }
}
