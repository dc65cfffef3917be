//! Application core — lifecycle and wiring, zero direct I/O.
//!
//! The [`controller::Controller`] binds button events to the LED latch. All
//! interaction with hardware happens through the port traits in [`ports`].

pub mod controller;
pub mod events;
pub mod ports;
