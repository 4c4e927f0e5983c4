//! Errors for keypress requests

use crate::keyboard::KeypressResult;
use std::io;
use thiserror::Error;

/// Reasons a keypress request fails as a whole.
///
/// Unmapped characters are not errors; they show up as sentinels in the
/// [`KeypressResult`].
#[derive(Debug, Error)]
pub enum KeypressError {
    /// The requested layout is not in the registry. Raised before any write.
    #[error("unknown layout '{0}'")]
    UnknownLayout(String),

    /// A single keypress was requested with zero or several characters
    #[error("expected exactly one character, got {0:?}")]
    InvalidKey(String),

    /// Writing a report to the device failed. `completed` holds the characters
    /// sequenced before the failure. `held` is the character whose key-down
    /// reached the device but whose key-up did not; the host may see it stuck.
    #[error("HID device write failed after {} character(s)", .completed.len())]
    DeviceWrite {
        completed: KeypressResult,
        held: Option<char>,
        #[source]
        source: io::Error,
    },
}
