//! Controller configuration
//!
//! Pin names, button polarity, and debounce timing. The host supplies a
//! config at startup, either [`ControllerConfig::default()`] or a JSON
//! document via [`ControllerConfig::from_json`].

use serde::{Deserialize, Serialize};

use crate::drivers::button::ActiveState;
use crate::error::{Error, Result};
use crate::pins::{self, LogicLevel, PinId};

/// Allowed debounce window, in milliseconds.
pub const DEBOUNCE_RANGE_MS: core::ops::RangeInclusive<u32> = 5..=500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // --- Pins ---
    /// Push-button input pin.
    pub button_pin: PinId,
    /// LED output pin.
    pub led_pin: PinId,
    /// Electrical level that means "pressed".
    pub button_active: ActiveState,

    // --- Debounce ---
    /// Quiet period a new level must hold before it is reported.
    pub debounce_ms: u32,
    /// How often the debounce worker checks for confirmed levels.
    pub poll_interval_ms: u32,

    // --- LED ---
    /// Level written to the LED pin as soon as it is acquired.
    pub led_initial: LogicLevel,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            button_pin: default_pin(pins::BUTTON_PIN),
            led_pin: default_pin(pins::LED_PIN),
            button_active: ActiveState::ActiveLow,

            debounce_ms: 30,
            poll_interval_ms: 5,

            led_initial: LogicLevel::Low,
        }
    }
}

fn default_pin(name: &'static str) -> PinId {
    // Default names are short compile-time constants.
    match PinId::new(name) {
        Ok(id) => id,
        Err(_) => unreachable!("default pin name {name} exceeds PinId capacity"),
    }
}

impl ControllerConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON config"))?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<()> {
        if self.button_pin == self.led_pin {
            return Err(Error::Config("button_pin and led_pin must differ"));
        }
        if !DEBOUNCE_RANGE_MS.contains(&self.debounce_ms) {
            return Err(Error::Config("debounce_ms must be 5–500"));
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > self.debounce_ms {
            return Err(Error::Config("poll_interval_ms must be 1–debounce_ms"));
        }
        Ok(())
    }
}
