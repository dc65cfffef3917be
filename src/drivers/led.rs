//! LED output latch.
//!
//! Holds the commanded level of one output pin. The in-memory mirror only
//! changes after the pin write succeeds, so it always matches the hardware.

use log::{info, warn};

use crate::app::ports::{GpioPort, OutputPinHandle};
use crate::error::{Error, Result};
use crate::pins::{LogicLevel, PinId};

pub struct OutputLatch<O: OutputPinHandle> {
    pin: PinId,
    handle: Option<O>,
    level: LogicLevel,
}

impl<O: OutputPinHandle> OutputLatch<O> {
    /// Acquire `pin` as an output and drive it to `initial` immediately.
    pub fn start<P>(port: &mut P, pin: &PinId, initial: LogicLevel) -> Result<Self>
    where
        P: GpioPort<Output = O>,
    {
        let mut handle = port.acquire_output(pin)?;
        if let Err(e) = handle.write(initial) {
            if let Err(release_err) = handle.release() {
                warn!("OutputLatch: releasing {} failed: {} (ignored)", pin, release_err);
            }
            return Err(e);
        }

        info!("OutputLatch: {} acquired (initial={:?})", pin, initial);
        Ok(Self {
            pin: pin.clone(),
            handle: Some(handle),
            level: initial,
        })
    }

    /// Drive the pin High for `true`, Low for `false`.
    pub fn set_on(&mut self, on: bool) -> Result<()> {
        let handle = self.handle.as_mut().ok_or(Error::NotInitialized)?;
        let level = LogicLevel::from(on);
        handle.write(level)?;
        self.level = level;
        Ok(())
    }

    /// Release the pin. Calling this again is a no-op.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Err(e) = handle.release() {
            warn!("OutputLatch: releasing {} failed: {} (ignored)", self.pin, e);
        }
        info!("OutputLatch: {} released", self.pin);
    }

    /// Last level successfully written.
    pub fn level(&self) -> LogicLevel {
        self.level
    }

    pub fn is_on(&self) -> bool {
        self.level.is_high()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl<O: OutputPinHandle> Drop for OutputLatch<O> {
    fn drop(&mut self) {
        self.stop();
    }
}
