//! Debounced autosave.
//!
//! Every committed snapshot replaces the pending change and restarts the
//! delay, so a burst of edits coalesces into one write.

use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default debounce delay in milliseconds.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 500;

/// Payload delivered to the persistence collaborator; also the
/// `{json, width, height}` form documents are opened from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChange {
    pub json: String,
    pub width: f64,
    pub height: f64,
}

/// Holds at most one pending change until its debounce delay expires.
#[derive(Debug)]
pub struct AutosaveBridge {
    delay: Duration,
    pending: Option<(DocumentChange, Instant)>,
}

impl Default for AutosaveBridge {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS))
    }
}

impl AutosaveBridge {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending change and restart the delay from `now`.
    pub fn schedule_at(&mut self, change: DocumentChange, now: Instant) {
        self.pending = Some((change, now + self.delay));
    }

    pub fn schedule(&mut self, change: DocumentChange) {
        self.schedule_at(change, Instant::now());
    }

    /// Take the pending change if its delay has expired at `now`.
    pub fn poll_at(&mut self, now: Instant) -> Option<DocumentChange> {
        match &self.pending {
            Some((_, due)) if now >= *due => self.pending.take().map(|(change, _)| change),
            _ => None,
        }
    }

    pub fn poll(&mut self) -> Option<DocumentChange> {
        self.poll_at(Instant::now())
    }

    /// Time left before the pending change is due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, due)| due.saturating_duration_since(now))
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending change without delivering it.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.pending.take().is_some();
        if cancelled {
            log::debug!("autosave: pending change cancelled");
        }
        cancelled
    }
}
