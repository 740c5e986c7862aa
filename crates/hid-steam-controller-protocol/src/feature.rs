//! Feature report framing.
//!
//! Every control exchange uses the same 65-byte buffer:
//!
//! ```text
//! [0]      report number (always 0)
//! [1]      feature id
//! [2]      parameter / answer length
//! [3..65]  parameters or answer payload, zero padded
//! ```
//!
//! The device answers in place: after a SET the host issues a GET on the same
//! buffer and the device echoes the feature id followed by its reply.

use sc_hid_common::{ReportBuilder, ReportParser};

use crate::{FrameError, FrameResult};

/// Size of a framed feature report including the leading report number.
pub const FEATURE_REPORT_SIZE: usize = 65;

/// Largest parameter block a request can carry.
pub const MAX_PARAMS_LEN: usize = 62;

/// Largest answer length the host accepts.
pub const MAX_ANSWER_LEN: usize = 61;

const ID_OFFSET: usize = 1;
const LEN_OFFSET: usize = 2;
const PAYLOAD_OFFSET: usize = 3;

/// Feature ids understood by the controller firmware.
pub mod feature_ids {
    /// Turn off the firmware's keyboard/mouse emulation of buttons.
    pub const DISABLE_AUTOBUTTONS: u8 = 0x81;
    /// Turn firmware button emulation back on.
    pub const ENABLE_AUTOBUTTONS: u8 = 0x85;
    /// Write one or more (key, value, 0) settings triplets.
    pub const SET_SETTINGS: u8 = 0x87;
    pub const GET_SERIAL: u8 = 0xAE;
    /// Ask the receiver to report whether a controller is paired.
    pub const GET_CONNECTION_STATE: u8 = 0xB4;
}

/// One outgoing feature request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRequest<'a> {
    report_id: u8,
    params: &'a [u8],
}

impl<'a> FeatureRequest<'a> {
    /// Validate a request. Fails when `params` exceeds [`MAX_PARAMS_LEN`].
    pub fn new(report_id: u8, params: &'a [u8]) -> FrameResult<Self> {
        if params.len() > MAX_PARAMS_LEN {
            return Err(FrameError::ParamsTooLong {
                len: params.len(),
                max: MAX_PARAMS_LEN,
            });
        }
        Ok(Self { report_id, params })
    }

    /// Request without parameters.
    pub const fn bare(report_id: u8) -> Self {
        Self {
            report_id,
            params: &[],
        }
    }

    pub fn report_id(&self) -> u8 {
        self.report_id
    }

    pub fn params(&self) -> &'a [u8] {
        self.params
    }

    /// Frame the request into the fixed 65-byte buffer.
    pub fn encode(&self) -> [u8; FEATURE_REPORT_SIZE] {
        let mut builder = ReportBuilder::new(FEATURE_REPORT_SIZE);
        builder
            .seek(ID_OFFSET)
            .write_u8(self.report_id)
            .write_u8(declared_len(self.params.len()))
            .write_bytes(self.params);
        builder.to_array()
    }

    /// Recover a request from a framed SET buffer.
    ///
    /// Used when inspecting recorded control traffic.
    pub fn from_frame(frame: &'a [u8]) -> FrameResult<Self> {
        let mut parser = ReportParser::new(frame);
        let report_number = parser.read_u8()?;
        if report_number != 0 {
            return Err(FrameError::Malformed(format!(
                "report number {report_number} is not 0"
            )));
        }
        let report_id = parser.read_u8()?;
        let len = usize::from(parser.read_u8()?);
        if len > MAX_PARAMS_LEN {
            return Err(FrameError::ParamsTooLong {
                len,
                max: MAX_PARAMS_LEN,
            });
        }
        let params = parser.read_bytes(len)?;
        Ok(Self { report_id, params })
    }
}

/// A validated feature answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureAnswer {
    pub report_id: u8,
    pub payload: Vec<u8>,
}

impl FeatureAnswer {
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Validate the buffer returned by a GET against the request it answers.
///
/// The echoed feature id must match `expected_id` and the declared length
/// must not exceed [`MAX_ANSWER_LEN`].
pub fn parse_answer(frame: &[u8], expected_id: u8) -> FrameResult<FeatureAnswer> {
    let mut parser = ReportParser::at(frame, ID_OFFSET);
    let report_id = parser.read_u8()?;
    if report_id != expected_id {
        return Err(FrameError::ReportIdMismatch {
            expected: expected_id,
            actual: report_id,
        });
    }
    let len = usize::from(parser.read_u8()?);
    if len > MAX_ANSWER_LEN {
        return Err(FrameError::AnswerTooLong {
            len,
            max: MAX_ANSWER_LEN,
        });
    }
    let payload = parser.read_bytes(len)?.to_vec();
    Ok(FeatureAnswer { report_id, payload })
}

/// Build the buffer a device would return for `report_id`.
///
/// The declared length is written as given so callers can script
/// out-of-range answers; payload bytes past the frame are dropped.
pub fn encode_answer_frame(report_id: u8, payload: &[u8]) -> [u8; FEATURE_REPORT_SIZE] {
    let mut builder = ReportBuilder::new(FEATURE_REPORT_SIZE);
    builder
        .seek(ID_OFFSET)
        .write_u8(report_id)
        .write_u8(declared_len(payload.len()));
    let room = FEATURE_REPORT_SIZE.saturating_sub(PAYLOAD_OFFSET);
    builder.write_bytes(payload.get(..payload.len().min(room)).unwrap_or_default());
    builder.to_array()
}

fn declared_len(len: usize) -> u8 {
    u8::try_from(len).unwrap_or(u8::MAX)
}
