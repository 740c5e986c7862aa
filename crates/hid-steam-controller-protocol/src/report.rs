//! Interrupt report layout.
//!
//! Every interrupt frame is 64 bytes. Byte 2 carries the report type and
//! byte 3 the declared payload length. Type `0x01` frames carry live control
//! state; type `0x03` frames carry a receiver connection event.

use sc_hid_common::{ReportBuilder, ReportParser};

/// Size of every interrupt frame.
pub const INPUT_REPORT_SIZE: usize = 64;

pub mod report_types {
    pub const INPUT: u8 = 0x01;
    pub const CONNECTION: u8 = 0x03;
}

/// Byte offsets shared by all frames.
pub mod header {
    pub const TYPE: usize = 2;
    pub const LENGTH: usize = 3;
}

/// Byte offsets of the control state frame.
pub mod input_report {
    /// Declared length of a well-formed control state frame.
    pub const EXPECTED_LENGTH: u8 = 60;
    /// 24-bit frame counter.
    pub const SEQUENCE: usize = 4;
    pub const BUTTONS: usize = 7;
    pub const TRIGGERS: usize = 11;
    pub const LEFT_AXES: usize = 16;
    pub const RIGHT_AXES: usize = 20;
    pub const ACCEL: usize = 28;
    pub const GYRO: usize = 34;
}

/// Byte offsets of the connection event frame.
pub mod connection_report {
    pub const EXPECTED_LENGTH: u8 = 1;
    pub const SUBTYPE: usize = 4;

    pub const DISCONNECTED: u8 = 0x01;
    pub const CONNECTED: u8 = 0x02;
    pub const PAIRED: u8 = 0x03;
}

/// Receiver connection event.
///
/// The subtype values come from captured traffic, not a published document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionEvent {
    Disconnected,
    Connected,
    /// A controller is paired to the receiver but has no active session.
    Paired,
    Unknown(u8),
}

impl ConnectionEvent {
    pub const fn from_subtype(subtype: u8) -> Self {
        match subtype {
            connection_report::DISCONNECTED => Self::Disconnected,
            connection_report::CONNECTED => Self::Connected,
            connection_report::PAIRED => Self::Paired,
            other => Self::Unknown(other),
        }
    }

    pub const fn subtype(self) -> u8 {
        match self {
            Self::Disconnected => connection_report::DISCONNECTED,
            Self::Connected => connection_report::CONNECTED,
            Self::Paired => connection_report::PAIRED,
            Self::Unknown(other) => other,
        }
    }
}

/// What a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Input,
    Connection(ConnectionEvent),
    Unknown(u8),
}

/// Borrow `frame` as a report if it is exactly [`INPUT_REPORT_SIZE`] bytes.
pub fn as_report(frame: &[u8]) -> Option<&[u8; INPUT_REPORT_SIZE]> {
    frame.try_into().ok()
}

pub fn report_type(report: &[u8; INPUT_REPORT_SIZE]) -> u8 {
    byte(report, header::TYPE)
}

pub fn declared_length(report: &[u8; INPUT_REPORT_SIZE]) -> u8 {
    byte(report, header::LENGTH)
}

pub fn classify(report: &[u8; INPUT_REPORT_SIZE]) -> ReportKind {
    match report_type(report) {
        report_types::INPUT => ReportKind::Input,
        report_types::CONNECTION => ReportKind::Connection(ConnectionEvent::from_subtype(byte(
            report,
            connection_report::SUBTYPE,
        ))),
        other => ReportKind::Unknown(other),
    }
}

/// Whether the declared length matches what the report type should carry.
/// Unknown types are never flagged.
pub fn has_expected_length(report: &[u8; INPUT_REPORT_SIZE]) -> bool {
    let len = declared_length(report);
    match report_type(report) {
        report_types::INPUT => len == input_report::EXPECTED_LENGTH,
        report_types::CONNECTION => len == connection_report::EXPECTED_LENGTH,
        _ => true,
    }
}

/// Every field of a control state frame, unscaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawInputReport {
    pub report_type: u8,
    pub length: u8,
    /// Frame counter; not interpreted.
    pub sequence: u32,
    pub buttons: u32,
    /// Left, right.
    pub triggers: [u8; 2],
    pub left: [i16; 2],
    pub right: [i16; 2],
    pub accel: [i16; 3],
    pub gyro: [i16; 3],
}

impl RawInputReport {
    /// Read every field at its fixed offset. Never fails.
    pub fn parse(report: &[u8; INPUT_REPORT_SIZE]) -> Self {
        let sequence = u32::from_le_bytes([
            byte(report, input_report::SEQUENCE),
            byte(report, input_report::SEQUENCE + 1),
            byte(report, input_report::SEQUENCE + 2),
            0,
        ]);
        Self {
            report_type: report_type(report),
            length: declared_length(report),
            sequence,
            buttons: ReportParser::at(report, input_report::BUTTONS)
                .read_u32_le()
                .unwrap_or_default(),
            triggers: [
                byte(report, input_report::TRIGGERS),
                byte(report, input_report::TRIGGERS + 1),
            ],
            left: read_i16s(report, input_report::LEFT_AXES),
            right: read_i16s(report, input_report::RIGHT_AXES),
            accel: read_i16s(report, input_report::ACCEL),
            gyro: read_i16s(report, input_report::GYRO),
        }
    }

    /// Lay the fields back out as a frame.
    ///
    /// Only the low 24 bits of `sequence` are representable.
    pub fn to_bytes(&self) -> [u8; INPUT_REPORT_SIZE] {
        let mut builder = ReportBuilder::new(INPUT_REPORT_SIZE);
        builder
            .seek(header::TYPE)
            .write_u8(self.report_type)
            .write_u8(self.length);
        let seq = self.sequence.to_le_bytes();
        builder.write_bytes(seq.get(..3).unwrap_or_default());
        builder.seek(input_report::BUTTONS).write_u32_le(self.buttons);
        builder.seek(input_report::TRIGGERS).write_bytes(&self.triggers);
        write_i16s(&mut builder, input_report::LEFT_AXES, &self.left);
        write_i16s(&mut builder, input_report::RIGHT_AXES, &self.right);
        write_i16s(&mut builder, input_report::ACCEL, &self.accel);
        write_i16s(&mut builder, input_report::GYRO, &self.gyro);
        builder.to_array()
    }
}

fn byte(report: &[u8; INPUT_REPORT_SIZE], offset: usize) -> u8 {
    report.get(offset).copied().unwrap_or(0)
}

fn read_i16s<const N: usize>(report: &[u8; INPUT_REPORT_SIZE], start: usize) -> [i16; N] {
    let mut parser = ReportParser::at(report, start);
    let mut out = [0i16; N];
    for value in &mut out {
        *value = parser.read_i16_le().unwrap_or_default();
    }
    out
}

fn write_i16s(builder: &mut ReportBuilder, start: usize, values: &[i16]) {
    builder.seek(start);
    for &value in values {
        builder.write_i16_le(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with(report_type: u8, length: u8, subtype: u8) -> [u8; INPUT_REPORT_SIZE] {
        let mut frame = [0u8; INPUT_REPORT_SIZE];
        for (offset, value) in [(2, report_type), (3, length), (4, subtype)] {
            if let Some(b) = frame.get_mut(offset) {
                *b = value;
            }
        }
        frame
    }

    #[test]
    fn as_report_requires_exact_size() {
        assert!(as_report(&[0u8; 64]).is_some());
        assert!(as_report(&[0u8; 63]).is_none());
        assert!(as_report(&[0u8; 65]).is_none());
    }

    #[test]
    fn classify_connection_subtypes() {
        assert_eq!(
            classify(&frame_with(0x03, 1, 0x01)),
            ReportKind::Connection(ConnectionEvent::Disconnected)
        );
        assert_eq!(
            classify(&frame_with(0x03, 1, 0x02)),
            ReportKind::Connection(ConnectionEvent::Connected)
        );
        assert_eq!(
            classify(&frame_with(0x03, 1, 0x03)),
            ReportKind::Connection(ConnectionEvent::Paired)
        );
        assert_eq!(
            classify(&frame_with(0x03, 1, 0x09)),
            ReportKind::Connection(ConnectionEvent::Unknown(0x09))
        );
        assert_eq!(classify(&frame_with(0x04, 0, 0)), ReportKind::Unknown(0x04));
    }

    #[test]
    fn expected_lengths() {
        assert!(has_expected_length(&frame_with(0x01, 60, 0)));
        assert!(!has_expected_length(&frame_with(0x01, 59, 0)));
        assert!(has_expected_length(&frame_with(0x03, 1, 2)));
        assert!(!has_expected_length(&frame_with(0x03, 2, 2)));
        assert!(has_expected_length(&frame_with(0x7F, 0, 0)));
    }

    #[test]
    fn parse_reads_fixed_offsets() {
        let mut frame = frame_with(0x01, 60, 0x10);
        let fields: &[(usize, u8)] = &[
            (5, 0x20),
            (6, 0x30),
            (7, 0x00),
            (8, 0x80),
            (10, 0x10),
            (11, 0x7F),
            (12, 0xFF),
            (16, 0x34),
            (17, 0x12),
            (18, 0x00),
            (19, 0x80),
            (28, 0x00),
            (29, 0x40),
            (38, 0xFF),
            (39, 0xFF),
        ];
        for &(offset, value) in fields {
            if let Some(b) = frame.get_mut(offset) {
                *b = value;
            }
        }
        let raw = RawInputReport::parse(&frame);
        assert_eq!(raw.report_type, 0x01);
        assert_eq!(raw.length, 60);
        assert_eq!(raw.sequence, 0x0030_2010);
        assert_eq!(raw.buttons, 0x1000_8000);
        assert_eq!(raw.triggers, [0x7F, 0xFF]);
        assert_eq!(raw.left, [0x1234, i16::MIN]);
        assert_eq!(raw.accel, [0x4000, 0, 0]);
        assert_eq!(raw.gyro, [0, 0, -1]);
    }

    #[test]
    fn connection_event_subtypes_round_trip() {
        for subtype in 0u8..=4 {
            assert_eq!(ConnectionEvent::from_subtype(subtype).subtype(), subtype);
        }
    }
}
