//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing controller lifecycle events to the
//! `log` facade (ESP-IDF logger on the device, whatever the host installs
//! elsewhere).

use log::{info, warn};

use crate::app::events::ControllerEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`ControllerEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &ControllerEvent) {
        match event {
            ControllerEvent::Started { button, led } => {
                info!("START | button={} led={}", button, led);
            }
            ControllerEvent::StartFailed(e) => {
                warn!("START | failed: {}", e);
            }
            ControllerEvent::Stopped => {
                info!("STOP  | pins released");
            }
        }
    }
}
