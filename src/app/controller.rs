//! Controller — lifecycle and wiring.
//!
//! [`Controller`] owns the GPIO port and the two pin components. `start()`
//! acquires the LED latch, then the button monitor, and routes button events
//! to the latch. `stop()` tears down in reverse.
//!
//! ```text
//!   InputMonitor ──ButtonEvent──▶ handler ──set_on──▶ Mutex<OutputLatch>
//!        ▲                                                   │
//!   GpioPort::Input                                   GpioPort::Output
//! ```
//!
//! `start()` while running is a no-op that returns `Ok(())`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::drivers::button::{ButtonEvent, DebounceSettings, InputMonitor};
use crate::drivers::led::OutputLatch;
use crate::error::Result;

use super::events::ControllerEvent;
use super::ports::{Clock, EventSink, GpioPort, OutputPinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Stopped,
    Running,
}

type SharedLatch<P> = Arc<Mutex<OutputLatch<<P as GpioPort>::Output>>>;

struct Running<P: GpioPort> {
    monitor: InputMonitor<P::Input>,
    latch: SharedLatch<P>,
}

pub struct Controller<P: GpioPort, C: Clock, S: EventSink> {
    port: P,
    clock: Arc<C>,
    config: ControllerConfig,
    sink: S,
    running: Option<Running<P>>,
}

fn lock_latch<O: OutputPinHandle>(
    latch: &Arc<Mutex<OutputLatch<O>>>,
) -> MutexGuard<'_, OutputLatch<O>> {
    latch.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<P, C, S> Controller<P, C, S>
where
    P: GpioPort,
    P::Output: Send + 'static,
    C: Clock + 'static,
    S: EventSink,
{
    pub fn new(port: P, clock: Arc<C>, config: ControllerConfig, sink: S) -> Self {
        Self {
            port,
            clock,
            config,
            sink,
            running: None,
        }
    }

    /// Acquire both pins and start routing button events to the LED.
    ///
    /// On failure every pin acquired so far is released before the error
    /// is returned.
    pub fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            debug!("Controller: start() while running ignored");
            return Ok(());
        }

        match self.try_start() {
            Ok(running) => {
                self.running = Some(running);
                self.sink.emit(&ControllerEvent::Started {
                    button: self.config.button_pin.clone(),
                    led: self.config.led_pin.clone(),
                });
                info!("Controller started");
                Ok(())
            }
            Err(e) => {
                self.sink.emit(&ControllerEvent::StartFailed(e));
                Err(e)
            }
        }
    }

    fn try_start(&mut self) -> Result<Running<P>> {
        self.config.validate()?;

        let available = self.port.available_pins();
        debug!(
            "Available GPIO: [{}]",
            available
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let cfg = &self.config;
        let latch = Arc::new(Mutex::new(OutputLatch::start(
            &mut self.port,
            &cfg.led_pin,
            cfg.led_initial,
        )?));

        let handler_latch = Arc::clone(&latch);
        let on_event = move |event: ButtonEvent| {
            let mut latch = lock_latch(&handler_latch);
            if let Err(e) = latch.set_on(event == ButtonEvent::Pressed) {
                warn!("Controller: LED write for {:?} failed: {}", event, e);
            }
        };

        let settings = DebounceSettings {
            window_ms: cfg.debounce_ms,
            poll_interval_ms: cfg.poll_interval_ms,
        };
        let monitor = match InputMonitor::start(
            &mut self.port,
            Arc::clone(&self.clock),
            &cfg.button_pin,
            cfg.button_active,
            settings,
            on_event,
        ) {
            Ok(monitor) => monitor,
            Err(e) => {
                lock_latch(&latch).stop();
                return Err(e);
            }
        };

        Ok(Running { monitor, latch })
    }

    /// Release the button then the LED. No-op when already stopped.
    pub fn stop(&mut self) {
        let Some(mut running) = self.running.take() else {
            return;
        };
        running.monitor.stop();
        lock_latch(&running.latch).stop();
        self.sink.emit(&ControllerEvent::Stopped);
        info!("Controller stopped");
    }

    pub fn state(&self) -> ControllerState {
        if self.running.is_some() {
            ControllerState::Running
        } else {
            ControllerState::Stopped
        }
    }

    /// Commanded LED state, `None` while stopped.
    pub fn led_is_on(&self) -> Option<bool> {
        self.running
            .as_ref()
            .map(|r| lock_latch(&r.latch).is_on())
    }

}

impl<P: GpioPort, C: Clock, S: EventSink> Drop for Controller<P, C, S> {
    fn drop(&mut self) {
        if let Some(mut running) = self.running.take() {
            running.monitor.stop();
            lock_latch(&running.latch).stop();
        }
    }
}
