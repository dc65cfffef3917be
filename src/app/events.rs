//! Outbound controller events.
//!
//! The [`Controller`](super::controller::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port on its owner thread.

use crate::error::Error;
use crate::pins::PinId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Both pins acquired; button edges now drive the LED.
    Started { button: PinId, led: PinId },

    /// `start()` failed; every pin it acquired has been released.
    StartFailed(Error),

    /// Both pins released.
    Stopped,
}
