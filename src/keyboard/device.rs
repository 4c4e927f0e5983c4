//! HID gadget device writer
//!
//! The gadget exposes a character device (normally `/dev/hidg0`). Each report is
//! written with a single blocking `write` of exactly [`REPORT_SIZE`] bytes.

use super::report::{HidReport, REPORT_SIZE};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default device node created by the `hid.usb0` gadget function
pub const DEFAULT_DEVICE_PATH: &str = "/dev/hidg0";

/// Destination for keyboard reports
pub trait ReportSink {
    /// Write one report. Errors are not retried.
    fn write_report(&mut self, report: &HidReport) -> io::Result<()>;
}

/// In-memory sink that records every report in order
impl ReportSink for Vec<HidReport> {
    fn write_report(&mut self, report: &HidReport) -> io::Result<()> {
        self.push(*report);
        Ok(())
    }
}

/// Writes reports to the gadget device file.
///
/// The file is reopened for every report, so a device that disappears and
/// comes back does not leave a stale handle behind. Opening in append mode has
/// no effect on the character device and lets plain files record a stream.
#[derive(Debug, Clone)]
pub struct HidDevice {
    path: PathBuf,
}

impl HidDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for HidDevice {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE_PATH)
    }
}

impl ReportSink for HidDevice {
    fn write_report(&mut self, report: &HidReport) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        let written = file.write(report.as_bytes())?;
        if written != REPORT_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!(
                    "short write to {}: {} of {} bytes",
                    self.path.display(),
                    written,
                    REPORT_SIZE
                ),
            ));
        }
        log::debug!("wrote report {:02x?} to {}", report.as_bytes(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink: Vec<HidReport> = Vec::new();
        sink.write_report(&HidReport::key_down(0, 0x04)).unwrap();
        sink.write_report(&HidReport::key_up()).unwrap();
        assert_eq!(sink, vec![HidReport::key_down(0, 0x04), HidReport::key_up()]);
    }

    #[test]
    fn device_writes_exactly_eight_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hidg0");
        fs::write(&path, b"").unwrap();

        let mut device = HidDevice::new(&path);
        device.write_report(&HidReport::key_down(0x02, 0x0b)).unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![0x02, 0, 0x0b, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn device_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut device = HidDevice::new(dir.path().join("absent").join("hidg0"));
        let err = device.write_report(&HidReport::key_up()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn default_path_is_hidg0() {
        assert_eq!(HidDevice::default().path(), Path::new("/dev/hidg0"));
    }
}
