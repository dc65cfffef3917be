//! Time-window debouncer for a single digital input.
//!
//! Raw edges are recorded with [`Debouncer::on_edge`] from the edge-callback
//! context; [`Debouncer::poll`] is called periodically by the debounce
//! worker and reports a level once it has held for the full window.
//!
//! ```text
//!            edge            edge (restarts timer)         window elapsed
//!   Stable ───────▶ Pending ─────────────────────▶ Pending ──────────────▶ Stable
//!     ▲                                                                      │
//!     └──────── burst settled on the old level (nothing reported) ◀─────────┘
//! ```

use crate::pins::LogicLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    level: LogicLevel,
    since_ms: u32,
}

#[derive(Debug)]
pub struct Debouncer {
    window_ms: u32,
    stable: LogicLevel,
    pending: Option<Pending>,
}

impl Debouncer {
    pub fn new(window_ms: u32, initial: LogicLevel) -> Self {
        Self {
            window_ms,
            stable: initial,
            pending: None,
        }
    }

    /// Record a raw level reported at `now_ms`.
    ///
    /// Only real transitions restart the quiet timer; a repeated report of
    /// the level already pending (or already stable) is ignored.
    pub fn on_edge(&mut self, level: LogicLevel, now_ms: u32) {
        let current = self.pending.map_or(self.stable, |p| p.level);
        if level == current {
            return;
        }
        self.pending = Some(Pending {
            level,
            since_ms: now_ms,
        });
    }

    /// Confirm a pending level that has been quiet for the full window.
    ///
    /// Returns the new stable level if it changed.
    pub fn poll(&mut self, now_ms: u32) -> Option<LogicLevel> {
        let pending = self.pending?;
        if now_ms.wrapping_sub(pending.since_ms) < self.window_ms {
            return None;
        }
        self.pending = None;
        if pending.level == self.stable {
            return None;
        }
        self.stable = pending.level;
        Some(pending.level)
    }

    /// Last confirmed level.
    pub fn stable(&self) -> LogicLevel {
        self.stable
    }

    /// Whether an unconfirmed transition is waiting out the window.
    pub fn is_settling(&self) -> bool {
        self.pending.is_some()
    }
}
