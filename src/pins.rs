//! Pin naming, logic levels, and board pin assignments.
//!
//! Components refer to pins by name only. The ESP-IDF port resolves names to
//! GPIO numbers through [`resolve`]; the host simulator uses the names as-is.

use core::fmt;

use embedded_hal::digital::PinState;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Default pin names
// ---------------------------------------------------------------------------

/// Momentary push-button (active-low with pull-up).
pub const BUTTON_PIN: &str = "BUTTON";
/// Indicator LED (active-high).
pub const LED_PIN: &str = "LED";

// ---------------------------------------------------------------------------
// Board assignments (ESP32-S3 dev board)
// ---------------------------------------------------------------------------

pub const BUTTON_GPIO: i32 = 16;
pub const LED_GPIO: i32 = 2;

/// Highest GPIO number on the ESP32-S3.
pub const MAX_GPIO: i32 = 48;

const ALIASES: &[(&str, i32)] = &[(BUTTON_PIN, BUTTON_GPIO), (LED_PIN, LED_GPIO)];

/// Resolve a pin name to a GPIO number.
///
/// Accepts the board aliases (`"BUTTON"`, `"LED"`) and the literal form
/// `"GPIO<n>"`.
pub fn resolve(name: &str) -> Option<i32> {
    if let Some(&(_, gpio)) = ALIASES.iter().find(|(alias, _)| *alias == name) {
        return Some(gpio);
    }
    let digits = name.strip_prefix("GPIO")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i32>().ok().filter(|n| *n <= MAX_GPIO)
}

/// Names of the board aliases, for [`GpioPort::available_pins`].
///
/// [`GpioPort::available_pins`]: crate::app::ports::GpioPort::available_pins
pub fn alias_names() -> impl Iterator<Item = &'static str> {
    ALIASES.iter().map(|(name, _)| *name)
}

// ---------------------------------------------------------------------------
// PinId
// ---------------------------------------------------------------------------

/// Maximum pin-name length in bytes.
pub const PIN_NAME_CAP: usize = 16;

/// Opaque name of a physical GPIO line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    try_from = "heapless::String<16>",
    into = "heapless::String<16>"
)]
pub struct PinId(heapless::String<PIN_NAME_CAP>);

impl PinId {
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::Config("pin name must not be empty"));
        }
        let mut s = heapless::String::new();
        s.push_str(name)
            .map_err(|()| Error::Config("pin name longer than 16 bytes"))?;
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<heapless::String<PIN_NAME_CAP>> for PinId {
    type Error = Error;

    fn try_from(name: heapless::String<PIN_NAME_CAP>) -> Result<Self> {
        Self::new(&name)
    }
}

impl From<PinId> for heapless::String<PIN_NAME_CAP> {
    fn from(id: PinId) -> Self {
        id.0
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LogicLevel
// ---------------------------------------------------------------------------

/// Raw electrical state of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicLevel {
    Low,
    High,
}

impl LogicLevel {
    pub fn is_high(self) -> bool {
        self == Self::High
    }
}

impl From<bool> for LogicLevel {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

impl From<PinState> for LogicLevel {
    fn from(state: PinState) -> Self {
        match state {
            PinState::Low => Self::Low,
            PinState::High => Self::High,
        }
    }
}

impl From<LogicLevel> for PinState {
    fn from(level: LogicLevel) -> Self {
        match level {
            LogicLevel::Low => PinState::Low,
            LogicLevel::High => PinState::High,
        }
    }
}

impl core::ops::Not for LogicLevel {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}
