//! In-memory GPIO bank for host simulation and tests.
//!
//! Implements [`GpioPort`] over a shared table of named pins. The test side
//! keeps a clone of the [`SimGpio`] and acts as the outside world: it drives
//! input levels (which fire registered edge callbacks on the calling thread),
//! reads output levels, and injects driver faults.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use log::warn;

use crate::app::ports::{EdgeCallback, GpioPort, InputPinHandle, OutputPinHandle};
use crate::error::{Error, Result, Unavailable};
use crate::pins::{LogicLevel, PinId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Input,
    Output,
}

struct SimPin {
    level: LogicLevel,
    owner: Option<Direction>,
    callback: Option<EdgeCallback>,
    writes: Vec<LogicLevel>,
    failed_writes: u32,
    releases: u32,
    write_fault: Option<i32>,
    release_fault: Option<i32>,
}

#[derive(Default)]
struct Bank {
    pins: HashMap<String, SimPin>,
}

type SharedBank = Arc<Mutex<Bank>>;

fn lock(bank: &SharedBank) -> MutexGuard<'_, Bank> {
    bank.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulated GPIO controller. Clones share the same pins.
#[derive(Clone, Default)]
pub struct SimGpio {
    bank: SharedBank,
}

impl SimGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pin (or reset an unowned one) at `level`.
    pub fn add_pin(&self, name: &str, level: LogicLevel) {
        let mut bank = lock(&self.bank);
        if bank.pins.get(name).is_some_and(|p| p.owner.is_some()) {
            warn!("SimGpio: {} is owned, not resetting", name);
            return;
        }
        bank.pins.insert(
            name.to_owned(),
            SimPin {
                level,
                owner: None,
                callback: None,
                writes: Vec::new(),
                failed_writes: 0,
                releases: 0,
                write_fault: None,
                release_fault: None,
            },
        );
    }

    /// Set the electrical level seen on `pin`, as external hardware would.
    ///
    /// Fires the edge callback (on this thread) if the level changed.
    pub fn drive(&self, pin: &str, level: LogicLevel) -> Result<()> {
        let mut bank = lock(&self.bank);
        let slot = bank.pins.get_mut(pin).ok_or(Unavailable::NoSuchPin)?;
        if slot.owner == Some(Direction::Output) {
            return Err(Unavailable::AlreadyOwned.into());
        }
        if slot.level == level {
            return Ok(());
        }
        slot.level = level;
        if let Some(callback) = slot.callback.as_mut() {
            callback(level);
        }
        Ok(())
    }

    pub fn level(&self, pin: &str) -> Option<LogicLevel> {
        lock(&self.bank).pins.get(pin).map(|p| p.level)
    }

    /// Every level written to `pin` through an output handle, oldest first.
    pub fn writes(&self, pin: &str) -> Vec<LogicLevel> {
        lock(&self.bank)
            .pins
            .get(pin)
            .map(|p| p.writes.clone())
            .unwrap_or_default()
    }

    /// Writes to `pin` rejected by an injected fault.
    pub fn failed_writes(&self, pin: &str) -> u32 {
        lock(&self.bank).pins.get(pin).map_or(0, |p| p.failed_writes)
    }

    pub fn is_owned(&self, pin: &str) -> bool {
        lock(&self.bank).pins.get(pin).is_some_and(|p| p.owner.is_some())
    }

    pub fn has_edge_callback(&self, pin: &str) -> bool {
        lock(&self.bank).pins.get(pin).is_some_and(|p| p.callback.is_some())
    }

    pub fn release_count(&self, pin: &str) -> u32 {
        lock(&self.bank).pins.get(pin).map_or(0, |p| p.releases)
    }

    /// Make every subsequent write to `pin` fail with `Platform(rc)`.
    pub fn inject_write_fault(&self, pin: &str, rc: i32) {
        if let Some(p) = lock(&self.bank).pins.get_mut(pin) {
            p.write_fault = Some(rc);
        }
    }

    /// Make releasing `pin` report `Platform(rc)`. The pin is still freed.
    pub fn inject_release_fault(&self, pin: &str, rc: i32) {
        if let Some(p) = lock(&self.bank).pins.get_mut(pin) {
            p.release_fault = Some(rc);
        }
    }

    pub fn clear_faults(&self, pin: &str) {
        if let Some(p) = lock(&self.bank).pins.get_mut(pin) {
            p.write_fault = None;
            p.release_fault = None;
        }
    }

    fn claim(&self, pin: &PinId, direction: Direction) -> Result<()> {
        let mut bank = lock(&self.bank);
        let slot = bank.pins.get_mut(pin.as_str()).ok_or(Unavailable::NoSuchPin)?;
        if slot.owner.is_some() {
            return Err(Unavailable::AlreadyOwned.into());
        }
        slot.owner = Some(direction);
        Ok(())
    }
}

impl GpioPort for SimGpio {
    type Input = SimInput;
    type Output = SimOutput;

    fn acquire_input(&mut self, pin: &PinId) -> Result<SimInput> {
        self.claim(pin, Direction::Input)?;
        Ok(SimInput {
            pin: pin.clone(),
            bank: Arc::clone(&self.bank),
        })
    }

    fn acquire_output(&mut self, pin: &PinId) -> Result<SimOutput> {
        self.claim(pin, Direction::Output)?;
        Ok(SimOutput {
            pin: pin.clone(),
            bank: Arc::clone(&self.bank),
        })
    }

    fn available_pins(&self) -> Vec<PinId> {
        let bank = lock(&self.bank);
        let mut names: Vec<&String> = bank.pins.keys().collect();
        names.sort();
        names.into_iter().filter_map(|n| PinId::new(n).ok()).collect()
    }
}

fn release_slot(bank: &SharedBank, pin: &PinId) -> Result<()> {
    let mut bank = lock(bank);
    let slot = bank.pins.get_mut(pin.as_str()).ok_or(Unavailable::NoSuchPin)?;
    slot.releases += 1;
    slot.owner = None;
    slot.callback = None;
    match slot.release_fault {
        Some(rc) => Err(Error::Platform(rc)),
        None => Ok(()),
    }
}

// ── Input handle ──────────────────────────────────────────────

pub struct SimInput {
    pin: PinId,
    bank: SharedBank,
}

impl SimInput {
    fn read(&self) -> Result<LogicLevel> {
        lock(&self.bank)
            .pins
            .get(self.pin.as_str())
            .map(|p| p.level)
            .ok_or(Error::NotInitialized)
    }
}

impl ErrorType for SimInput {
    type Error = Error;
}

impl InputPin for SimInput {
    fn is_high(&mut self) -> Result<bool> {
        self.read().map(LogicLevel::is_high)
    }

    fn is_low(&mut self) -> Result<bool> {
        self.is_high().map(|high| !high)
    }
}

impl InputPinHandle for SimInput {
    fn register_edge_callback(&mut self, callback: EdgeCallback) -> Result<()> {
        let mut bank = lock(&self.bank);
        let slot = bank.pins.get_mut(self.pin.as_str()).ok_or(Error::NotInitialized)?;
        slot.callback = Some(callback);
        Ok(())
    }

    fn unregister_edge_callback(&mut self) {
        if let Some(slot) = lock(&self.bank).pins.get_mut(self.pin.as_str()) {
            slot.callback = None;
        }
    }

    fn release(self) -> Result<()> {
        release_slot(&self.bank, &self.pin)
    }
}

// ── Output handle ─────────────────────────────────────────────

pub struct SimOutput {
    pin: PinId,
    bank: SharedBank,
}

impl SimOutput {
    fn write_level(&mut self, level: LogicLevel) -> Result<()> {
        let mut bank = lock(&self.bank);
        let slot = bank.pins.get_mut(self.pin.as_str()).ok_or(Error::NotInitialized)?;
        if let Some(rc) = slot.write_fault {
            slot.failed_writes += 1;
            return Err(Error::Platform(rc));
        }
        slot.level = level;
        slot.writes.push(level);
        Ok(())
    }
}

impl ErrorType for SimOutput {
    type Error = Error;
}

impl OutputPin for SimOutput {
    fn set_low(&mut self) -> Result<()> {
        self.write_level(LogicLevel::Low)
    }

    fn set_high(&mut self) -> Result<()> {
        self.write_level(LogicLevel::High)
    }
}

impl OutputPinHandle for SimOutput {
    fn release(self) -> Result<()> {
        release_slot(&self.bank, &self.pin)
    }
}
