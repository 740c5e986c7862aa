//! Steam Controller HID protocol: feature framing, settings encoding and
//! input report decoding.
//!
//! This crate is intentionally I/O-free. It knows the wire layout of the
//! 65-byte feature reports and the 64-byte interrupt reports of the wired
//! controller (`28DE:1102`) and the wireless receiver (`28DE:1142`), and turns
//! them into typed values. Timing, locking and the transport itself belong to
//! `steam-controller-driver` and `sc-hid-common`.

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod button;
pub mod decode;
pub mod event;
pub mod feature;
pub mod ids;
pub mod report;
pub mod settings;
pub mod signature;
pub mod tilt;

pub use button::{Button, ButtonSet, button_mask};
pub use decode::{
    AxisConvention, DecodeOptions, DecodedInput, MotionMode, MotionSample, Position, decode,
    decode_report,
};
pub use event::{Axis, InputEvent};
pub use feature::{
    FEATURE_REPORT_SIZE, FeatureAnswer, FeatureRequest, MAX_ANSWER_LEN, MAX_PARAMS_LEN,
    encode_answer_frame, feature_ids, parse_answer,
};
pub use ids::{STEAM_VENDOR_ID, Topology, product_ids};
pub use report::{
    ConnectionEvent, INPUT_REPORT_SIZE, RawInputReport, ReportKind, as_report, classify,
};
pub use settings::{
    DeviceSettings, Orientation, autobuttons_report_id, automouse_params, combined_params,
    orientation_params, parse_serial, serial_request_params,
};
pub use signature::{
    CONTROLLER_REPORT_DESCRIPTOR, DeviceSignature, SignatureVerdict, verify_signature,
};
pub use tilt::{ANGLE_RANGE, tilt_angle, tilt_angles};

use thiserror::Error;

/// Framing errors raised while building or validating feature reports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Feature parameters too long: {len} bytes (max {max})")]
    ParamsTooLong { len: usize, max: usize },

    #[error("Answer report id mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ReportIdMismatch { expected: u8, actual: u8 },

    #[error("Answer length {len} exceeds {max}")]
    AnswerTooLong { len: usize, max: usize },

    #[error("Malformed feature frame: {0}")]
    Malformed(String),
}

impl From<sc_hid_common::HidCommonError> for FrameError {
    fn from(err: sc_hid_common::HidCommonError) -> Self {
        Self::Malformed(err.to_string())
    }
}

pub type FrameResult<T> = Result<T, FrameError>;
