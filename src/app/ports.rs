//! Port traits — the boundary between the control loop and the platform.
//!
//! ```text
//!   GpioPort adapter ──▶ InputMonitor / OutputLatch ──▶ Controller
//! ```
//!
//! The platform (ESP-IDF GPIO, the host simulator, a test mock) implements
//! these traits. Components take them via generics, so the control loop
//! never touches hardware directly.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::Result;
use crate::pins::{LogicLevel, PinId};

use super::events::ControllerEvent;

// ───────────────────────────────────────────────────────────────
// GPIO port (platform: pin acquisition)
// ───────────────────────────────────────────────────────────────

/// Raw edge callback. Invoked with the new electrical level on every
/// transition the platform observes. Must not block.
pub type EdgeCallback = Box<dyn FnMut(LogicLevel) + Send + 'static>;

/// Hands out exclusive pin handles by name.
///
/// Implementations MUST refuse a second acquisition of a pin that is still
/// held, with [`Unavailable::AlreadyOwned`](crate::error::Unavailable).
pub trait GpioPort {
    type Input: InputPinHandle;
    type Output: OutputPinHandle;

    /// Claim `pin` and configure it as an input.
    fn acquire_input(&mut self, pin: &PinId) -> Result<Self::Input>;

    /// Claim `pin` and configure it as an output.
    fn acquire_output(&mut self, pin: &PinId) -> Result<Self::Output>;

    /// Every pin name this port can hand out.
    fn available_pins(&self) -> Vec<PinId>;
}

/// An acquired input pin.
pub trait InputPinHandle: InputPin<Error = crate::error::Error> {
    /// Install `callback` for every level transition. Replaces any
    /// previously registered callback.
    fn register_edge_callback(&mut self, callback: EdgeCallback) -> Result<()>;

    /// Remove the callback. After this returns the callback is no longer
    /// invoked.
    fn unregister_edge_callback(&mut self);

    /// Give the pin back to the platform.
    fn release(self) -> Result<()>
    where
        Self: Sized;

    /// Current electrical level.
    fn level(&mut self) -> Result<LogicLevel> {
        self.is_high().map(LogicLevel::from)
    }
}

/// An acquired output pin.
pub trait OutputPinHandle: OutputPin<Error = crate::error::Error> {
    /// Drive the pin to `level`.
    fn write(&mut self, level: LogicLevel) -> Result<()> {
        self.set_state(level.into())
    }

    /// Give the pin back to the platform.
    fn release(self) -> Result<()>
    where
        Self: Sized;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock. Wraps at `u32::MAX`; consumers compare
/// timestamps with `wrapping_sub`.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (controller → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The controller emits lifecycle [`ControllerEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &ControllerEvent);
}
