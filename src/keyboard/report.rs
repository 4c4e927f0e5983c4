//! USB HID keyboard report (boot protocol compatible)
//!
//! Layout (8 bytes):
//! ```text
//! Byte 0: Modifier keys (bitfield, see `modifier`)
//! Byte 1: Reserved (0x00)
//! Byte 2: Primary key code (USB HID usage code)
//! Byte 3-7: Further simultaneous key codes, always zero here
//! ```
//!
//! Only one key is modelled per report. Chords would need more of bytes 3-7.

/// Keyboard report size in bytes
pub const REPORT_SIZE: usize = 8;

/// Modifier bits for byte 0 of the report
pub mod modifier {
    pub const NONE: u8 = 0x00;
    pub const LEFT_CTRL: u8 = 0x01;
    pub const LEFT_SHIFT: u8 = 0x02;
    pub const LEFT_ALT: u8 = 0x04;
    pub const LEFT_GUI: u8 = 0x08;
    pub const RIGHT_CTRL: u8 = 0x10;
    pub const RIGHT_SHIFT: u8 = 0x20;
    pub const RIGHT_ALT: u8 = 0x40;
    pub const RIGHT_GUI: u8 = 0x80;
}

/// A single 8-byte keyboard input report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HidReport([u8; REPORT_SIZE]);

impl HidReport {
    /// Report with one key held: `[modifier, 0, scancode, 0, 0, 0, 0, 0]`
    pub const fn key_down(modifier: u8, scancode: u8) -> Self {
        Self([modifier, 0, scancode, 0, 0, 0, 0, 0])
    }

    /// All keys released
    pub const fn key_up() -> Self {
        Self([0; REPORT_SIZE])
    }

    pub fn as_bytes(&self) -> &[u8; REPORT_SIZE] {
        &self.0
    }

    pub fn modifier(&self) -> u8 {
        self.0[0]
    }

    pub fn scancode(&self) -> u8 {
        self.0[2]
    }

    /// Returns `true` if no keys are pressed
    pub fn is_release(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl From<HidReport> for [u8; REPORT_SIZE] {
    fn from(report: HidReport) -> Self {
        report.0
    }
}

/// USB HID report descriptor for a boot-protocol keyboard.
///
/// Written to the gadget function's `report_desc` during provisioning:
///   - 8 modifier key bits (input)
///   - 1 reserved byte
///   - 5 LED indicators (output)
///   - 6 key code bytes (input)
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    //
    //   - Modifier keys (8 bits) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - Reserved byte -
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x03, //   Input (Constant)
    //
    //   - LED output (5 bits + 3 padding) -
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (Num Lock)
    0x29, 0x05, //   Usage Maximum (Kana)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x03, //   Output (Constant)
    //
    //   - Key codes (6 bytes) -
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x65, //   Logical Maximum (101)
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0x65, //   Usage Maximum (101)
    0x81, 0x00, //   Input (Data, Array)
    //
    0xC0, // End Collection
];
