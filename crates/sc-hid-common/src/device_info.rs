//! Device information for a probed HID interface

use serde::{Deserialize, Serialize};

/// Linux `BUS_USB`.
pub const BUS_USB: u16 = 0x03;

/// Identity of one HID interface as reported by the host transport.
///
/// `report_descriptor` holds the raw descriptor bytes of the interface; the
/// protocol layer fingerprints it to decide whether the interface carries
/// controller data at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HidDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub version: u16,
    pub bus_type: u16,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
    pub interface_number: Option<i32>,
    pub path: String,
    #[serde(default)]
    pub report_descriptor: Vec<u8>,
}

impl HidDeviceInfo {
    pub fn new(vendor_id: u16, product_id: u16, path: String) -> Self {
        Self {
            vendor_id,
            product_id,
            path,
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn with_interface_number(mut self, interface: i32) -> Self {
        self.interface_number = Some(interface);
        self
    }

    pub fn with_report_descriptor(mut self, descriptor: impl Into<Vec<u8>>) -> Self {
        self.report_descriptor = descriptor.into();
        self
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .or_else(|| self.manufacturer.clone())
            .unwrap_or_else(|| format!("{:04x}:{:04x}", self.vendor_id, self.product_id))
    }
}

impl Default for HidDeviceInfo {
    fn default() -> Self {
        Self {
            vendor_id: 0,
            product_id: 0,
            version: 0,
            bus_type: BUS_USB,
            serial_number: None,
            manufacturer: None,
            product_name: None,
            interface_number: None,
            path: String::new(),
            report_descriptor: Vec::new(),
        }
    }
}
