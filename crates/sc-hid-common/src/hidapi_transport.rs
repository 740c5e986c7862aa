//! hidapi-backed transport
//!
//! Control transfers and interrupt reads go through two separate handles to
//! the same interface so a blocked read never starves a feature exchange.

use std::sync::Mutex;

use hidapi::{DeviceInfo, HidApi, HidDevice};
use tracing::debug;

use crate::{
    ControlChannel, ControlDirection, FrameSource, HidCommonError, HidCommonResult,
    HidDeviceInfo,
};

/// Largest report descriptor hidapi will hand back.
const MAX_REPORT_DESCRIPTOR_SIZE: usize = 4096;

/// Control channel over a hidapi handle.
pub struct HidapiTransport {
    device: Mutex<HidDevice>,
}

impl HidapiTransport {
    pub fn open(api: &HidApi, info: &DeviceInfo) -> HidCommonResult<Self> {
        let device = info
            .open_device(api)
            .map_err(|e| HidCommonError::OpenError(e.to_string()))?;
        Ok(Self {
            device: Mutex::new(device),
        })
    }

    /// Build the interface identity, including its raw report descriptor.
    pub fn describe(&self, info: &DeviceInfo) -> HidCommonResult<HidDeviceInfo> {
        let mut descriptor = vec![0u8; MAX_REPORT_DESCRIPTOR_SIZE];
        let len = {
            let device = self.device.lock().unwrap_or_else(|e| e.into_inner());
            device
                .get_report_descriptor(&mut descriptor)
                .map_err(|e| HidCommonError::ReadError(e.to_string()))?
        };
        descriptor.truncate(len);
        debug!(
            "Read {} byte report descriptor from {:?}",
            len,
            info.path()
        );

        let mut out = HidDeviceInfo::new(
            info.vendor_id(),
            info.product_id(),
            info.path().to_string_lossy().into_owned(),
        )
        .with_version(info.release_number())
        .with_interface_number(info.interface_number())
        .with_report_descriptor(descriptor);
        if let Some(serial) = info.serial_number() {
            out = out.with_serial(serial);
        }
        if let Some(manufacturer) = info.manufacturer_string() {
            out = out.with_manufacturer(manufacturer);
        }
        if let Some(product) = info.product_string() {
            out = out.with_product_name(product);
        }
        Ok(out)
    }
}

impl ControlChannel for HidapiTransport {
    fn control_exchange(
        &self,
        buffer: &mut [u8],
        direction: ControlDirection,
    ) -> HidCommonResult<usize> {
        let device = self.device.lock().unwrap_or_else(|e| e.into_inner());
        match direction {
            ControlDirection::Set => {
                device
                    .send_feature_report(buffer)
                    .map_err(|e| HidCommonError::WriteError(e.to_string()))?;
                Ok(buffer.len())
            }
            ControlDirection::Get => device
                .get_feature_report(buffer)
                .map_err(|e| HidCommonError::ReadError(e.to_string())),
        }
    }
}

/// Interrupt frame reader over its own hidapi handle.
pub struct HidapiFrameReader {
    device: HidDevice,
}

impl HidapiFrameReader {
    pub fn open(api: &HidApi, info: &DeviceInfo) -> HidCommonResult<Self> {
        let device = info
            .open_device(api)
            .map_err(|e| HidCommonError::OpenError(e.to_string()))?;
        Ok(Self { device })
    }
}

impl FrameSource for HidapiFrameReader {
    fn read_frame(&mut self, buf: &mut [u8], timeout_ms: i32) -> HidCommonResult<usize> {
        self.device
            .read_timeout(buf, timeout_ms)
            .map_err(|e| HidCommonError::ReadError(e.to_string()))
    }
}
