//! Common HID plumbing shared by the Steam Controller protocol and driver crates
//!
//! This crate defines the transport boundary the driver consumes: a
//! synchronous feature-report control channel, a blocking interrupt frame
//! source, zero-copy report reading and fixed-layout report building. It also
//! carries a scripted mock transport for tests and, behind the `hidapi`
//! feature, an adapter over a real hidraw/hidapi handle.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device_info;
pub mod report_parser;
pub mod transport;

#[cfg(feature = "hidapi")]
pub mod hidapi_transport;

pub use device_info::*;
pub use report_parser::*;
pub use transport::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HidCommonError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open device: {0}")]
    OpenError(String),

    #[error("Failed to read from device: {0}")]
    ReadError(String),

    #[error("Failed to write to device: {0}")]
    WriteError(String),

    #[error("Transport returned status {0}")]
    Status(i32),

    #[error("Short transfer: expected {expected} bytes, got {actual}")]
    ShortTransfer { expected: usize, actual: usize },

    #[error("Invalid report format: {0}")]
    InvalidReport(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type HidCommonResult<T> = Result<T, HidCommonError>;
