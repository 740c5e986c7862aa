//! Interface identity verification.
//!
//! A Steam Controller enumerates as a composite device. The controller
//! interface is recognised by its exact report descriptor: one vendor-page
//! collection with a 64-byte input, output and feature report. Every other
//! interface of the device is left to the generic HID stack.

use crate::ids::{STEAM_VENDOR_ID, Topology};

/// Raw report descriptor of the controller data interface.
pub const CONTROLLER_REPORT_DESCRIPTOR: [u8; 33] = [
    0x06, 0x00, 0xFF, // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01, // Usage (0x01)
    0xA1, 0x01, // Collection (Application)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x40, //   Report Count (64)
    0x09, 0x01, //   Usage (0x01)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x95, 0x40, //   Report Count (64)
    0x09, 0x01, //   Usage (0x01)
    0x91, 0x02, //   Output (Data,Var,Abs)
    0x95, 0x40, //   Report Count (64)
    0x09, 0x01, //   Usage (0x01)
    0xB1, 0x02, //   Feature (Data,Var,Abs)
    0xC0, // End Collection
];

/// Identity of one HID interface at probe time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSignature<'a> {
    pub vendor_id: u16,
    pub product_id: u16,
    pub report_descriptor: &'a [u8],
}

impl<'a> DeviceSignature<'a> {
    pub const fn new(vendor_id: u16, product_id: u16, report_descriptor: &'a [u8]) -> Self {
        Self {
            vendor_id,
            product_id,
            report_descriptor,
        }
    }
}

/// Outcome of checking an interface against the known controller identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureVerdict {
    /// The controller data interface of a known product.
    Controller(Topology),
    /// A known product, but some other interface of the composite device.
    GenericInterface(Topology),
    /// Valve vendor ID with an unsupported product ID.
    UnknownProduct,
    /// Not a Valve device.
    Rejected,
}

impl SignatureVerdict {
    pub const fn topology(self) -> Option<Topology> {
        match self {
            Self::Controller(t) | Self::GenericInterface(t) => Some(t),
            Self::UnknownProduct | Self::Rejected => None,
        }
    }
}

/// Classify an interface. Pure; never touches the device.
pub fn verify_signature(sig: &DeviceSignature<'_>) -> SignatureVerdict {
    if sig.vendor_id != STEAM_VENDOR_ID {
        return SignatureVerdict::Rejected;
    }
    let Some(topology) = Topology::from_product_id(sig.product_id) else {
        return SignatureVerdict::UnknownProduct;
    };
    if sig.report_descriptor == CONTROLLER_REPORT_DESCRIPTOR.as_slice() {
        SignatureVerdict::Controller(topology)
    } else {
        SignatureVerdict::GenericInterface(topology)
    }
}
