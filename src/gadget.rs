//! USB HID gadget provisioning through configfs
//!
//! Builds the gadget tree for a single boot keyboard function and binds it to
//! the first USB device controller. The gadget counts as provisioned once its
//! `UDC` attribute names a controller; until then every step may be repeated.

use crate::config::GadgetConfig;
use crate::keyboard::report::{KEYBOARD_REPORT_DESCRIPTOR, REPORT_SIZE};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// US English string descriptor directory
const LANG_EN_US: &str = "0x409";
const CONFIG_NAME: &str = "c.1";
const FUNCTION_NAME: &str = "hid.usb0";
const MAX_POWER_MA: u32 = 250;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to provision {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no USB device controller found in {}", .0.display())]
    NoController(PathBuf),
}

/// Makes sure the HID gadget exists before reports are written
pub trait GadgetProvisioner {
    /// Idempotent; a provisioned gadget is left untouched
    fn ensure_ready(&self) -> Result<(), ProvisionError>;
}

/// Provisioner writing the configfs `usb_gadget` tree
#[derive(Debug, Clone)]
pub struct ConfigfsGadget {
    config: GadgetConfig,
}

impl ConfigfsGadget {
    pub fn new(config: GadgetConfig) -> Self {
        Self { config }
    }

    /// Directory of this gadget under the configfs root
    pub fn gadget_dir(&self) -> PathBuf {
        self.config.configfs_root.join(&self.config.name)
    }

    /// Whether the gadget is bound to a controller
    pub fn is_provisioned(&self) -> bool {
        fs::read_to_string(self.gadget_dir().join("UDC"))
            .map(|udc| !udc.trim().is_empty())
            .unwrap_or(false)
    }

    /// First controller listed in the UDC class directory
    fn find_controller(&self) -> Result<String, ProvisionError> {
        let root = &self.config.udc_root;
        let entries = fs::read_dir(root).map_err(|source| ProvisionError::Io {
            path: root.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();

        names
            .into_iter()
            .next()
            .ok_or_else(|| ProvisionError::NoController(root.clone()))
    }

    fn provision(&self, controller: &str) -> Result<(), ProvisionError> {
        let gadget = self.gadget_dir();
        let cfg = &self.config;

        create_dir(&gadget)?;
        write_attr(&gadget.join("idVendor"), format!("{:#06x}", cfg.vendor_id))?;
        write_attr(&gadget.join("idProduct"), format!("{:#06x}", cfg.product_id))?;
        write_attr(&gadget.join("bcdDevice"), "0x0100")?;
        write_attr(&gadget.join("bcdUSB"), "0x0200")?;

        let strings = gadget.join("strings").join(LANG_EN_US);
        create_dir(&strings)?;
        write_attr(&strings.join("serialnumber"), &cfg.serial_number)?;
        write_attr(&strings.join("manufacturer"), &cfg.manufacturer)?;
        write_attr(&strings.join("product"), &cfg.product)?;

        let config = gadget.join("configs").join(CONFIG_NAME);
        let config_strings = config.join("strings").join(LANG_EN_US);
        create_dir(&config_strings)?;
        write_attr(&config_strings.join("configuration"), "Config 1: HID keyboard")?;
        write_attr(&config.join("MaxPower"), MAX_POWER_MA.to_string())?;

        let function = gadget.join("functions").join(FUNCTION_NAME);
        let link = config.join(FUNCTION_NAME);
        // f_hid refuses attribute writes (EBUSY) once the function is linked
        if fs::symlink_metadata(&link).is_ok() {
            log::debug!("{} already linked, keeping function attributes", link.display());
        } else {
            create_dir(&function)?;
            write_attr(&function.join("protocol"), "1")?;
            write_attr(&function.join("subclass"), "1")?;
            write_attr(&function.join("report_length"), REPORT_SIZE.to_string())?;
            write_attr(&function.join("report_desc"), KEYBOARD_REPORT_DESCRIPTOR)?;
            std::os::unix::fs::symlink(&function, &link).map_err(|source| ProvisionError::Io {
                path: link.clone(),
                source,
            })?;
        }

        write_attr(&gadget.join("UDC"), controller)?;
        Ok(())
    }
}

impl GadgetProvisioner for ConfigfsGadget {
    fn ensure_ready(&self) -> Result<(), ProvisionError> {
        let gadget = self.gadget_dir();
        if self.is_provisioned() {
            log::info!("USB gadget {} already provisioned", gadget.display());
            return Ok(());
        }

        warn_if_not_root();
        let controller = self.find_controller()?;
        log::info!(
            "provisioning USB gadget {} on controller {}",
            gadget.display(),
            controller
        );
        self.provision(&controller)
    }
}

fn create_dir(path: &Path) -> Result<(), ProvisionError> {
    fs::create_dir_all(path).map_err(|source| ProvisionError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_attr(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), ProvisionError> {
    fs::write(path, contents).map_err(|source| ProvisionError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(target_os = "linux")]
fn warn_if_not_root() {
    if !nix::unistd::geteuid().is_root() {
        log::warn!("not running as root, configfs writes will likely fail");
    }
}

#[cfg(not(target_os = "linux"))]
fn warn_if_not_root() {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(with_controller: bool) -> (TempDir, ConfigfsGadget) {
        let dir = tempfile::tempdir().unwrap();
        let configfs = dir.path().join("usb_gadget");
        let udc = dir.path().join("udc");
        fs::create_dir_all(&configfs).unwrap();
        fs::create_dir_all(&udc).unwrap();
        if with_controller {
            fs::write(udc.join("20980000.usb"), "").unwrap();
        }

        let gadget = ConfigfsGadget::new(GadgetConfig {
            configfs_root: configfs,
            udc_root: udc,
            ..GadgetConfig::default()
        });
        (dir, gadget)
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn provisions_full_tree() {
        let (_dir, gadget) = setup(true);
        assert!(!gadget.is_provisioned());

        gadget.ensure_ready().unwrap();

        let root = gadget.gadget_dir();
        assert!(gadget.is_provisioned());
        assert_eq!(read(root.join("idVendor")), "0x1d6b");
        assert_eq!(read(root.join("idProduct")), "0x0104");
        assert_eq!(read(root.join("strings/0x409/product")), "USB Keyboard");
        assert_eq!(read(root.join("configs/c.1/MaxPower")), "250");
        assert_eq!(read(root.join("functions/hid.usb0/report_length")), "8");
        assert_eq!(
            fs::read(root.join("functions/hid.usb0/report_desc")).unwrap(),
            KEYBOARD_REPORT_DESCRIPTOR
        );
        assert_eq!(
            fs::read_link(root.join("configs/c.1/hid.usb0")).unwrap(),
            root.join("functions/hid.usb0")
        );
        assert_eq!(read(root.join("UDC")), "20980000.usb");
    }

    #[test]
    fn second_call_is_noop() {
        let (_dir, gadget) = setup(true);
        gadget.ensure_ready().unwrap();

        // A provisioned gadget must not be rewritten
        let product = gadget.gadget_dir().join("strings/0x409/product");
        fs::write(&product, "changed").unwrap();

        gadget.ensure_ready().unwrap();
        assert_eq!(read(product), "changed");
    }

    #[test]
    fn missing_controller_is_error() {
        let (_dir, gadget) = setup(false);
        let err = gadget.ensure_ready().unwrap_err();
        assert!(matches!(err, ProvisionError::NoController(_)));
        assert!(!gadget.gadget_dir().exists());
    }

    #[test]
    fn missing_udc_root_is_io_error() {
        let (dir, _) = setup(true);
        let gadget = ConfigfsGadget::new(GadgetConfig {
            configfs_root: dir.path().join("usb_gadget"),
            udc_root: dir.path().join("no-such-class"),
            ..GadgetConfig::default()
        });
        assert!(matches!(
            gadget.ensure_ready(),
            Err(ProvisionError::Io { .. })
        ));
    }

    #[test]
    fn partial_tree_is_completed() {
        let (_dir, gadget) = setup(true);
        let function = gadget.gadget_dir().join("functions/hid.usb0");
        let link = gadget.gadget_dir().join("configs/c.1/hid.usb0");
        fs::create_dir_all(&function).unwrap();
        fs::create_dir_all(link.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(&function, &link).unwrap();

        gadget.ensure_ready().unwrap();
        assert!(gadget.is_provisioned());
    }

    #[test]
    fn unbound_gadget_keeps_linked_function_attributes() {
        let (_dir, gadget) = setup(true);
        gadget.ensure_ready().unwrap();

        let root = gadget.gadget_dir();
        fs::write(root.join("UDC"), "").unwrap();
        fs::write(root.join("functions/hid.usb0/protocol"), "2").unwrap();
        assert!(!gadget.is_provisioned());

        gadget.ensure_ready().unwrap();
        assert!(gadget.is_provisioned());
        assert_eq!(read(root.join("functions/hid.usb0/protocol")), "2");
        assert_eq!(read(root.join("UDC")), "20980000.usb");
    }

    #[test]
    fn io_error_message_leaves_cause_to_source() {
        let err = ProvisionError::Io {
            path: PathBuf::from("/sys/kernel/config/usb_gadget/zerohid/UDC"),
            source: io::Error::new(io::ErrorKind::Other, "device busy"),
        };
        assert_eq!(
            err.to_string(),
            "failed to provision /sys/kernel/config/usb_gadget/zerohid/UDC"
        );
        assert_eq!(
            std::error::Error::source(&err).unwrap().to_string(),
            "device busy"
        );
    }

    #[test]
    fn picks_first_controller_in_order() {
        let (dir, gadget) = setup(true);
        fs::write(dir.path().join("udc").join("10000000.usb"), "").unwrap();
        gadget.ensure_ready().unwrap();
        assert_eq!(read(gadget.gadget_dir().join("UDC")), "10000000.usb");
    }
}
