//! Debounced push-button monitor.
//!
//! ## Execution contexts
//!
//! The GPIO port invokes the edge callback on its own context (interrupt-fed
//! dispatcher task on ESP-IDF, the stimulating thread in simulation). The callback only
//! timestamps the edge into the shared [`Debouncer`]. A dedicated debounce
//! worker wakes every `poll_interval_ms`, confirms levels that held for the
//! full window, and delivers [`ButtonEvent`]s to the handler. All events come
//! from that one worker, in hardware order.
//!
//! ```text
//!  GPIO edge ──▶ callback ──▶ Mutex<Debouncer> ◀── worker ──▶ on_event
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{Clock, EdgeCallback, GpioPort, InputPinHandle};
use crate::drivers::debounce::Debouncer;
use crate::drivers::task_pin::{self, Core, TaskSpec};
use crate::error::Result;
use crate::pins::{LogicLevel, PinId};

pub(crate) const DEBOUNCE_TASK: TaskSpec = TaskSpec {
    name: "debounce\0",
    core: Core::App,
    priority: 5,
    stack_kb: 8,
};

/// Which electrical level means "pressed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveState {
    ActiveHigh,
    ActiveLow,
}

impl ActiveState {
    pub fn active_level(self) -> LogicLevel {
        match self {
            Self::ActiveHigh => LogicLevel::High,
            Self::ActiveLow => LogicLevel::Low,
        }
    }

    pub fn inactive_level(self) -> LogicLevel {
        !self.active_level()
    }

    /// Map a stable level to its logical event.
    pub fn classify(self, level: LogicLevel) -> ButtonEvent {
        if level == self.active_level() {
            ButtonEvent::Pressed
        } else {
            ButtonEvent::Released
        }
    }
}

/// Logical button transitions, emitted once per stable change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
    Released,
}

/// Debounce timing, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceSettings {
    pub window_ms: u32,
    pub poll_interval_ms: u32,
}

struct Shared {
    debouncer: Mutex<Debouncer>,
    stop: AtomicBool,
}

impl Shared {
    fn debouncer(&self) -> MutexGuard<'_, Debouncer> {
        self.debouncer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct InputMonitor<I: InputPinHandle> {
    pin: PinId,
    handle: Option<I>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl<I: InputPinHandle> InputMonitor<I> {
    /// Acquire `pin`, hook its edges, and start the debounce worker.
    ///
    /// `on_event` runs on the worker thread and must not block. On any
    /// failure after acquisition the pin is released before returning.
    pub fn start<P, C, F>(
        port: &mut P,
        clock: Arc<C>,
        pin: &PinId,
        active: ActiveState,
        settings: DebounceSettings,
        on_event: F,
    ) -> Result<Self>
    where
        P: GpioPort<Input = I>,
        C: Clock + 'static,
        F: FnMut(ButtonEvent) + Send + 'static,
    {
        let mut handle = port.acquire_input(pin)?;

        let initial = handle.level().unwrap_or_else(|e| {
            warn!("InputMonitor: reading {} failed ({}), assuming released", pin, e);
            active.inactive_level()
        });

        let shared = Arc::new(Shared {
            debouncer: Mutex::new(Debouncer::new(settings.window_ms, initial)),
            stop: AtomicBool::new(false),
        });

        let edge_shared = Arc::clone(&shared);
        let edge_clock = Arc::clone(&clock);
        let callback: EdgeCallback = Box::new(move |level| {
            let now_ms = edge_clock.now_ms();
            edge_shared.debouncer().on_edge(level, now_ms);
        });
        if let Err(e) = handle.register_edge_callback(callback) {
            release_input(pin, handle);
            return Err(e);
        }

        // The pin may have moved between the seed read and registration.
        // An edge already reported by the callback is newer than this read.
        if let Ok(level) = handle.level() {
            let mut debouncer = shared.debouncer();
            if !debouncer.is_settling() {
                debouncer.on_edge(level, clock.now_ms());
            }
        }

        let worker_shared = Arc::clone(&shared);
        let poll = Duration::from_millis(settings.poll_interval_ms as u64);
        let spawned = task_pin::spawn_worker(DEBOUNCE_TASK, move || {
            run_worker(&worker_shared, clock.as_ref(), active, poll, on_event);
        });
        let worker = match spawned {
            Ok(worker) => worker,
            Err(e) => {
                handle.unregister_edge_callback();
                release_input(pin, handle);
                return Err(e);
            }
        };

        info!(
            "InputMonitor: {} acquired ({:?}, stable={:?}, window={}ms)",
            pin, active, initial, settings.window_ms
        );

        Ok(Self {
            pin: pin.clone(),
            handle: Some(handle),
            shared,
            worker: Some(worker),
        })
    }

    /// Stop the worker, unhook edges, and release the pin.
    ///
    /// A transition still inside its debounce window is dropped. Calling
    /// this again is a no-op.
    pub fn stop(&mut self) {
        let Some(mut handle) = self.handle.take() else {
            return;
        };

        self.shared.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            worker.thread().unpark();
            if worker.join().is_err() {
                warn!("InputMonitor: debounce worker for {} panicked", self.pin);
            }
        }

        handle.unregister_edge_callback();
        release_input(&self.pin, handle);
        info!("InputMonitor: {} released", self.pin);
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Last level confirmed by the debouncer.
    pub fn stable_level(&self) -> LogicLevel {
        self.shared.debouncer().stable()
    }
}

impl<I: InputPinHandle> Drop for InputMonitor<I> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<C, F>(shared: &Shared, clock: &C, active: ActiveState, poll: Duration, mut on_event: F)
where
    C: Clock + ?Sized,
    F: FnMut(ButtonEvent),
{
    while !shared.stop.load(Ordering::Acquire) {
        std::thread::park_timeout(poll);
        if shared.stop.load(Ordering::Acquire) {
            break;
        }

        // Release the debounce lock before running the handler.
        let confirmed = shared.debouncer().poll(clock.now_ms());
        if let Some(level) = confirmed {
            let event = active.classify(level);
            debug!("button {:?} (level={:?})", event, level);
            on_event(event);
        }
    }
}

fn release_input<I: InputPinHandle>(pin: &PinId, handle: I) {
    if let Err(e) = handle.release() {
        warn!("InputMonitor: releasing {} failed: {} (ignored)", pin, e);
    }
}
