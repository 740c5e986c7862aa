//! Fixtures shared by the session tests.

use std::sync::Arc;
use std::time::Duration;

use hid_steam_controller_protocol::{
    CONTROLLER_REPORT_DESCRIPTOR, FeatureRequest, INPUT_REPORT_SIZE, STEAM_VENDOR_ID, report,
};
use sc_hid_common::mock::MockControlChannel;
use sc_hid_common::{HidDeviceInfo, ReportBuilder};
use steam_controller_driver::testing::RecordingSink;
use steam_controller_driver::{DeviceSession, InputSink, SessionConfig};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn controller_info(product_id: u16) -> HidDeviceInfo {
    HidDeviceInfo::new(STEAM_VENDOR_ID, product_id, "/dev/hidraw7".to_string())
        .with_version(0x0001)
        .with_report_descriptor(CONTROLLER_REPORT_DESCRIPTOR.to_vec())
}

pub fn fast_config() -> Result<SessionConfig, Box<dyn std::error::Error>> {
    Ok(SessionConfig::builder()
        .settle_delay(Duration::from_millis(1))
        .build()?)
}

pub fn bind_with(
    product_id: u16,
    mock: &MockControlChannel,
    sink: Arc<dyn InputSink>,
    config: SessionConfig,
) -> Result<DeviceSession, Box<dyn std::error::Error>> {
    let outcome = DeviceSession::probe(
        controller_info(product_id),
        Arc::new(mock.clone()),
        sink,
        config,
    )?;
    Ok(outcome.session().ok_or("controller interface was skipped")?)
}

pub fn bind(
    product_id: u16,
    mock: &MockControlChannel,
    sink: &RecordingSink,
) -> Result<DeviceSession, Box<dyn std::error::Error>> {
    bind_with(product_id, mock, Arc::new(sink.clone()), fast_config()?)
}

/// Connection event frame carrying `subtype`.
pub fn connection_frame(subtype: u8) -> [u8; INPUT_REPORT_SIZE] {
    let mut builder = ReportBuilder::new(INPUT_REPORT_SIZE);
    builder
        .seek(report::header::TYPE)
        .write_u8(report::report_types::CONNECTION)
        .write_u8(1)
        .write_u8(subtype);
    builder.to_array()
}

/// The buffer a feature request puts on the wire.
pub fn wire(report_id: u8, params: &[u8]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    Ok(FeatureRequest::new(report_id, params)?.encode().to_vec())
}

pub fn sets_with_id(mock: &MockControlChannel, report_id: u8) -> Vec<Vec<u8>> {
    mock.set_history()
        .into_iter()
        .filter(|buf| buf.get(1) == Some(&report_id))
        .collect()
}
