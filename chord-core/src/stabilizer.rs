//! # Chord Stabilizer
//!
//! A hysteresis state machine between the per-frame classifier and the
//! consumer. A new label must be seen on several consecutive frames, and
//! the previous label must have been shown for a minimum time, before the
//! output switches. Brief "Unknown" dropouts inside the hold window are
//! suppressed entirely.

use std::time::{Duration, Instant};

use crate::DetectionResult;

/// How long a stable chord survives "Unknown" or competing frames.
pub const HOLD_DURATION: Duration = Duration::from_millis(1200);
/// Minimum time between two committed switches.
pub const MIN_SWITCH_INTERVAL: Duration = Duration::from_millis(220);
/// Consecutive frames a new label needs before it is committed.
pub const CONFIRM_FRAMES: u32 = 3;

#[derive(Debug, Clone)]
pub struct Stabilizer {
    stable: DetectionResult,
    last_stable: Instant,
    pending: Option<DetectionResult>,
    pending_count: u32,
}

impl Stabilizer {
    /// Creates a stabilizer showing silence, with its clock starting at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            stable: DetectionResult::silent(),
            last_stable: now,
            pending: None,
            pending_count: 0,
        }
    }

    pub fn stable(&self) -> &DetectionResult {
        &self.stable
    }

    pub fn pending_count(&self) -> u32 {
        self.pending_count
    }

    /// Feeds one raw classification and returns what should be displayed.
    pub fn update(&mut self, raw: DetectionResult, now: Instant) -> DetectionResult {
        let since_stable = now.saturating_duration_since(self.last_stable);

        if raw.is_unknown() {
            if since_stable < HOLD_DURATION && !self.stable.note_names.is_empty() {
                return self.stable.clone();
            }
            // The stable timestamp is intentionally not refreshed here.
            self.stable = raw.clone();
            return raw;
        }

        if raw.chord_name == self.stable.chord_name {
            self.stable = raw.clone();
            self.last_stable = now;
            self.pending = None;
            self.pending_count = 0;
            return raw;
        }

        let repeats_pending = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.chord_name == raw.chord_name);
        self.pending_count = if repeats_pending { self.pending_count + 1 } else { 1 };
        self.pending = Some(raw.clone());

        let can_switch = since_stable > MIN_SWITCH_INTERVAL;
        if self.pending_count >= CONFIRM_FRAMES && can_switch {
            if let Some(confirmed) = self.pending.take() {
                log::debug!(
                    "Chord switch {} -> {} after {} frames",
                    self.stable.chord_name,
                    confirmed.chord_name,
                    self.pending_count
                );
                self.stable = confirmed.clone();
                self.last_stable = now;
                self.pending_count = 0;
                return confirmed;
            }
        }

        if since_stable < HOLD_DURATION {
            self.stable.clone()
        } else {
            raw
        }
    }

    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }
}
