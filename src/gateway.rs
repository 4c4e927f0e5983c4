//! Keypress operations offered to callers
//!
//! The gateway fills in defaults for layout and timing and turns caller input
//! into [`KeypressRequest`]s for the shared [`Sequencer`].

use crate::config::TypingConfig;
use crate::error::KeypressError;
use crate::keyboard::{
    Clock, HidDevice, KeymapRegistry, KeypressRequest, KeypressResult, ReportSink, Sequencer,
    SystemClock, Timing,
};
use std::sync::Arc;
use std::time::Duration;

/// Per-request overrides. `None` falls back to the gateway defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeypressOptions {
    pub layout: Option<String>,
    pub downtime_ms: Option<u64>,
    pub interval_ms: Option<u64>,
}

impl KeypressOptions {
    pub fn layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn downtime_ms(mut self, ms: u64) -> Self {
        self.downtime_ms = Some(ms);
        self
    }

    pub fn interval_ms(mut self, ms: u64) -> Self {
        self.interval_ms = Some(ms);
        self
    }
}

pub struct Gateway<S = HidDevice, C = SystemClock> {
    sequencer: Sequencer<S, C>,
    default_layout: String,
    default_timing: Timing,
}

impl<S: ReportSink, C: Clock> Gateway<S, C> {
    /// Build a gateway around a sequencer.
    ///
    /// Fails if `typing.layout` names a layout the registry does not have.
    pub fn new(sequencer: Sequencer<S, C>, typing: &TypingConfig) -> Result<Self, KeypressError> {
        let default_layout = match &typing.layout {
            Some(name) if !sequencer.keymaps().contains(name) => {
                return Err(KeypressError::UnknownLayout(name.clone()));
            }
            Some(name) => name.clone(),
            None => sequencer.keymaps().default_layout().to_string(),
        };

        Ok(Self {
            sequencer,
            default_layout,
            default_timing: typing.timing(),
        })
    }

    pub fn keymaps(&self) -> &KeymapRegistry {
        self.sequencer.keymaps()
    }

    pub fn default_layout(&self) -> &str {
        &self.default_layout
    }

    pub fn default_timing(&self) -> Timing {
        self.default_timing
    }

    /// Press and release one key
    pub fn single_keypress(
        &self,
        key: &str,
        options: &KeypressOptions,
    ) -> Result<KeypressResult, KeypressError> {
        let mut chars = key.chars();
        let (Some(character), None) = (chars.next(), chars.next()) else {
            return Err(KeypressError::InvalidKey(key.to_string()));
        };

        let request = KeypressRequest {
            characters: vec![character],
            layout: self.layout_for(options),
            timing: self.timing_for(options),
        };
        self.sequencer.send(&request)
    }

    /// Type a string, optionally followed by a newline
    pub fn type_text(
        &self,
        text: &str,
        append_newline: bool,
        options: &KeypressOptions,
    ) -> Result<KeypressResult, KeypressError> {
        let mut request = KeypressRequest::new(
            text,
            self.layout_for(options),
            self.timing_for(options),
        );
        if append_newline {
            request.characters.push('\n');
        }
        log::info!(
            "typing {} character(s) with layout '{}'",
            request.characters.len(),
            request.layout
        );
        self.sequencer.send(&request)
    }

    fn layout_for(&self, options: &KeypressOptions) -> String {
        options
            .layout
            .clone()
            .unwrap_or_else(|| self.default_layout.clone())
    }

    fn timing_for(&self, options: &KeypressOptions) -> Timing {
        Timing {
            downtime: options
                .downtime_ms
                .map(Duration::from_millis)
                .unwrap_or(self.default_timing.downtime),
            interval: options
                .interval_ms
                .map(Duration::from_millis)
                .unwrap_or(self.default_timing.interval),
        }
    }
}

impl Gateway<HidDevice, SystemClock> {
    /// Gateway writing to the gadget device file in real time
    pub fn for_device(
        keymaps: Arc<KeymapRegistry>,
        device: HidDevice,
        typing: &TypingConfig,
    ) -> Result<Self, KeypressError> {
        Self::new(Sequencer::new(keymaps, device), typing)
    }
}
