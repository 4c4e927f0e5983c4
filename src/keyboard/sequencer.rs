//! Keypress sequencing
//!
//! Every mapped character goes through the same cycle:
//!
//! ```text
//! Idle -> KeyDown -> Held (downtime) -> KeyUp -> Idle
//! ```
//!
//! Characters are separated by the request interval, which is never applied
//! before the first one. An unmapped character short-circuits straight from
//! `Idle` to a sentinel in the result and emits no reports.
//!
//! The sink sits behind a mutex that is held for the whole request, so reports
//! of two concurrent requests never interleave on the device.

use super::device::{HidDevice, ReportSink};
use super::keymap::{KeyEntry, KeymapRegistry};
use super::report::HidReport;
use crate::error::KeypressError;
use serde::Serialize;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Source of real-time delays
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

/// Wall-clock sleeping on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Hold and gap durations for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// How long each key is held down
    pub downtime: Duration,
    /// Gap before each key after the first
    pub interval: Duration,
}

impl Timing {
    pub fn from_millis(downtime_ms: u64, interval_ms: u64) -> Self {
        Self {
            downtime: Duration::from_millis(downtime_ms),
            interval: Duration::from_millis(interval_ms),
        }
    }
}

/// Characters to type with a layout and timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypressRequest {
    pub characters: Vec<char>,
    pub layout: String,
    pub timing: Timing,
}

impl KeypressRequest {
    pub fn new(text: &str, layout: impl Into<String>, timing: Timing) -> Self {
        Self {
            characters: text.chars().collect(),
            layout: layout.into(),
            timing,
        }
    }
}

/// What happened to one input character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyOutcome {
    pub character: char,
    /// `None` when the layout has no mapping for the character
    pub entry: Option<KeyEntry>,
}

impl KeyOutcome {
    pub fn typed(character: char, entry: KeyEntry) -> Self {
        Self {
            character,
            entry: Some(entry),
        }
    }

    pub fn unmapped(character: char) -> Self {
        Self {
            character,
            entry: None,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        self.entry.is_none()
    }
}

/// Per-character outcomes, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeypressResult {
    outcomes: Vec<KeyOutcome>,
}

impl KeypressResult {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, outcome: KeyOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[KeyOutcome] {
        &self.outcomes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyOutcome> {
        self.outcomes.iter()
    }

    /// Resolved entries in order, `None` for unmapped characters
    pub fn entries(&self) -> Vec<Option<KeyEntry>> {
        self.outcomes.iter().map(|o| o.entry).collect()
    }

    pub fn typed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_unmapped()).count()
    }

    pub fn unmapped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_unmapped()).count()
    }
}

impl<'a> IntoIterator for &'a KeypressResult {
    type Item = &'a KeyOutcome;
    type IntoIter = std::slice::Iter<'a, KeyOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// Drives reports for a request through the shared sink
pub struct Sequencer<S = HidDevice, C = SystemClock> {
    keymaps: Arc<KeymapRegistry>,
    sink: Mutex<S>,
    clock: C,
}

impl<S: ReportSink> Sequencer<S, SystemClock> {
    pub fn new(keymaps: Arc<KeymapRegistry>, sink: S) -> Self {
        Self::with_clock(keymaps, sink, SystemClock)
    }
}

impl<S: ReportSink, C: Clock> Sequencer<S, C> {
    pub fn with_clock(keymaps: Arc<KeymapRegistry>, sink: S, clock: C) -> Self {
        Self {
            keymaps,
            sink: Mutex::new(sink),
            clock,
        }
    }

    pub fn keymaps(&self) -> &KeymapRegistry {
        &self.keymaps
    }

    /// Type the request's characters in order.
    ///
    /// Blocks for the sum of the configured delays. Unknown layouts fail before
    /// the device is touched; a write error abandons the remaining characters.
    pub fn send(&self, request: &KeypressRequest) -> Result<KeypressResult, KeypressError> {
        let layout = self
            .keymaps
            .layout(&request.layout)
            .map_err(|_| KeypressError::UnknownLayout(request.layout.clone()))?;

        // Sinks carry no invariants a panicking holder could break.
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let mut result = KeypressResult::with_capacity(request.characters.len());

        for (index, &character) in request.characters.iter().enumerate() {
            if index > 0 {
                self.clock.sleep(request.timing.interval);
            }

            let Some(entry) = layout.resolve(character) else {
                log::warn!(
                    "no mapping for {:?} in layout '{}', skipping",
                    character,
                    layout.name()
                );
                result.push(KeyOutcome::unmapped(character));
                continue;
            };

            if let Err((source, key_down_sent)) =
                self.press(&mut *sink, entry, request.timing.downtime)
            {
                log::error!(
                    "HID write failed at character {} of {}: {}",
                    index + 1,
                    request.characters.len(),
                    source
                );
                let held = key_down_sent.then_some(character);
                if let Some(held) = held {
                    log::warn!("key-up for {:?} was not sent, key may be stuck", held);
                }
                return Err(KeypressError::DeviceWrite {
                    completed: result,
                    held,
                    source,
                });
            }
            result.push(KeyOutcome::typed(character, entry));
        }

        Ok(result)
    }

    /// On failure, the flag tells whether the key-down had already been written
    fn press(
        &self,
        sink: &mut S,
        entry: KeyEntry,
        downtime: Duration,
    ) -> Result<(), (io::Error, bool)> {
        sink.write_report(&HidReport::key_down(entry.modifier, entry.scancode))
            .map_err(|e| (e, false))?;
        self.clock.sleep(downtime);
        sink.write_report(&HidReport::key_up()).map_err(|e| (e, true))
    }

    /// Consume the sequencer and hand back its sink
    pub fn into_sink(self) -> S {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
