//! Keymaps, HID reports and the keypress sequencer

pub mod device;
pub mod keymap;
pub mod layouts;
pub mod report;
mod sequencer;

pub use device::{HidDevice, ReportSink};
pub use keymap::{KeyEntry, KeymapError, KeymapRegistry, Layout};
pub use report::{modifier, HidReport, REPORT_SIZE};
pub use sequencer::{
    Clock, KeyOutcome, KeypressRequest, KeypressResult, Sequencer, SystemClock, Timing,
};
