//! Unified error type for the ButtonLatch firmware.
//!
//! Every fallible operation funnels into [`Error`]. All variants are `Copy`
//! so they can be handed across the edge-callback and worker contexts
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A pin could not be acquired.
    ResourceUnavailable(Unavailable),
    /// Operation on a component whose pin was released or never acquired.
    NotInitialized,
    /// Configuration is invalid.
    Config(&'static str),
    /// The GPIO driver reported an error code on read, write, or registration.
    Platform(i32),
    /// The debounce worker thread could not be created.
    Spawn,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceUnavailable(e) => write!(f, "resource unavailable: {e}"),
            Self::NotInitialized => write!(f, "not initialised"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Platform(rc) => write!(f, "platform error (rc={rc})"),
            Self::Spawn => write!(f, "worker thread spawn failed"),
        }
    }
}

impl core::error::Error for Error {}

/// Lets [`Error`] be the error type of `embedded-hal` pin implementations.
impl embedded_hal::digital::Error for Error {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

// ---------------------------------------------------------------------------
// Acquisition failures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// The port has no pin with that name.
    NoSuchPin,
    /// Another component already holds the pin.
    AlreadyOwned,
    /// The driver refused to configure the pin.
    Platform(i32),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchPin => write!(f, "no such pin"),
            Self::AlreadyOwned => write!(f, "pin already owned"),
            Self::Platform(rc) => write!(f, "pin configuration failed (rc={rc})"),
        }
    }
}

impl From<Unavailable> for Error {
    fn from(e: Unavailable) -> Self {
        Self::ResourceUnavailable(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
