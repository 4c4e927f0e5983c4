//! Zero HID Gateway - USB keyboard emulation over HTTP
//!
//! Translates characters into USB HID keyboard reports and writes them, with
//! configurable key hold and gap timing, to a Linux HID gadget device.

pub mod config;
pub mod error;
pub mod gadget;
pub mod gateway;
pub mod keyboard;
pub mod report;
pub mod server;

pub use config::Config;
pub use error::KeypressError;
pub use gadget::{ConfigfsGadget, GadgetProvisioner, ProvisionError};
pub use gateway::{Gateway, KeypressOptions};
