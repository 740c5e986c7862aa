//! Wire-format snapshots for feature requests and decoded events.
//!
//! Any change to these byte layouts changes what the firmware receives.

use hid_steam_controller_protocol::{
    DecodeOptions, DeviceSettings, FeatureRequest, Orientation, RawInputReport,
    autobuttons_report_id, automouse_params, button_mask, combined_params, decode, feature_ids,
    orientation_params, serial_request_params,
};
use insta::assert_snapshot;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn head(frame: &[u8], n: usize) -> String {
    format!("{:02X?}", frame.get(..n).unwrap_or(frame))
}

#[test]
fn snapshot_motion_sensor_push() -> TestResult {
    let params = orientation_params(Orientation::MOTION_SENSORS);
    let frame = FeatureRequest::new(feature_ids::SET_SETTINGS, &params)?.encode();
    assert_snapshot!(head(&frame, 6), @"[00, 87, 03, 30, 14, 00]");
    Ok(())
}

#[test]
fn snapshot_connect_settings_defaults() -> TestResult {
    let params = combined_params(&DeviceSettings::default());
    let frame = FeatureRequest::new(feature_ids::SET_SETTINGS, &params)?.encode();
    assert_snapshot!(head(&frame, 9), @"[00, 87, 06, 08, 07, 00, 30, 00, 00]");
    Ok(())
}

#[test]
fn snapshot_automouse_on() -> TestResult {
    let frame = FeatureRequest::new(feature_ids::SET_SETTINGS, &automouse_params(true))?.encode();
    assert_snapshot!(head(&frame, 6), @"[00, 87, 03, 08, 00, 00]");
    Ok(())
}

#[test]
fn snapshot_serial_request() -> TestResult {
    let params = serial_request_params();
    let frame = FeatureRequest::new(feature_ids::GET_SERIAL, &params)?.encode();
    assert_snapshot!(head(&frame, 6), @"[00, AE, 15, 01, 00, 00]");
    Ok(())
}

#[test]
fn snapshot_parameterless_requests() {
    let off = FeatureRequest::bare(autobuttons_report_id(false)).encode();
    let on = FeatureRequest::bare(autobuttons_report_id(true)).encode();
    let state = FeatureRequest::bare(feature_ids::GET_CONNECTION_STATE).encode();
    assert_snapshot!(head(&off, 3), @"[00, 81, 00]");
    assert_snapshot!(head(&on, 3), @"[00, 85, 00]");
    assert_snapshot!(head(&state, 3), @"[00, B4, 00]");
}

#[test]
fn snapshot_stick_frame_events() {
    let report = RawInputReport {
        report_type: 0x01,
        length: 60,
        buttons: button_mask::A,
        triggers: [10, 250],
        left: [100, 200],
        ..RawInputReport::default()
    }
    .to_bytes();
    let events = decode(&report, &DecodeOptions::default()).primary_events();
    let rendered: Vec<String> = events.iter().map(ToString::to_string).collect();
    assert_snapshot!(
        rendered.join(", "),
        @"Hat1X=0, Hat1Y=0, Brake=10, Gas=250, X=100, Y=-200, South down, East up, West up, North up, Select up, Mode up, Start up, LeftShoulder up, RightShoulder up, LeftTrigger up, RightTrigger up, LeftGrip up, RightGrip up, StickClick up"
    );
}

#[test]
fn snapshot_report_layout() {
    let report = RawInputReport {
        report_type: 0x01,
        length: 60,
        sequence: 0x00_0102,
        buttons: button_mask::TOUCH_LEFT | button_mask::B,
        triggers: [0x11, 0x22],
        left: [-2, 3],
        right: [0x0100, 0],
        accel: [0, 0, 0x4000],
        gyro: [1, 0, -1],
    }
    .to_bytes();
    assert_snapshot!(
        head(&report, 40),
        @"[00, 00, 01, 3C, 02, 01, 00, 00, 20, 00, 08, 11, 22, 00, 00, 00, FE, FF, 03, 00, 00, 01, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 40, 01, 00, 00, 00, FF, FF]"
    );
}
