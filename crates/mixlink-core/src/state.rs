//! Variable store and saved-gain bookkeeping
//!
//! The store is the last-known device state as a flat id → formatted-string
//! map. Registration order is first-seen and stable so the collaborating
//! layer can publish a consistent variable list; later writes change the
//! value only. Everything is cleared on reconnect; nothing survives a
//! session.

use std::collections::HashMap;

/// Outcome of a store write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreUpdate {
    /// First write for this identifier
    Registered,
    /// Known identifier, value differs
    Changed,
    /// Known identifier, same value
    Unchanged,
}

/// Flat id → formatted value map preserving registration order
#[derive(Debug, Default)]
pub struct StateStore {
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value, registering the identifier on first sight
    pub fn insert(&mut self, id: &str, value: String) -> StoreUpdate {
        match self.values.get_mut(id) {
            Some(existing) if *existing == value => StoreUpdate::Unchanged,
            Some(existing) => {
                *existing = value;
                StoreUpdate::Changed
            }
            None => {
                self.order.push(id.to_string());
                self.values.insert(id.to_string(), value);
                StoreUpdate::Registered
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    /// Stored value parsed as a float; `default` when absent or unparseable.
    /// This is the read side of every stepped gain operation.
    pub fn get_f32(&self, id: &str, default: f32) -> f32 {
        self.get(id)
            .and_then(|s| s.trim().parse::<f32>().ok())
            .unwrap_or(default)
    }

    /// All entries in registration order
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.order
            .iter()
            .filter_map(|id| self.values.get(id).map(|v| (id.clone(), v.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.values.clear();
    }
}

/// Pre-mute crosspoint gains, keyed `"<input>_<output>"`.
///
/// An entry is written when a crosspoint transitions to muted and taken back
/// out on restore; a missing entry restores to 0 dB.
#[derive(Debug, Default)]
pub struct SavedGains {
    gains: HashMap<String, f32>,
}

impl SavedGains {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(input: u8, output: u8) -> String {
        format!("{input}_{output}")
    }

    pub fn save(&mut self, input: u8, output: u8, gain: f32) {
        self.gains.insert(Self::key(input, output), gain);
    }

    /// Remove and return the saved gain for a crosspoint
    pub fn take(&mut self, input: u8, output: u8) -> Option<f32> {
        self.gains.remove(&Self::key(input, output))
    }

    pub fn contains(&self, input: u8, output: u8) -> bool {
        self.gains.contains_key(&Self::key(input, output))
    }

    pub fn clear(&mut self) {
        self.gains.clear();
    }
}
