//! Device settings and their parameter encodings.
//!
//! Settings travel as `(key, value, 0x00)` triplets in the parameter block of
//! a [`feature_ids::SET_SETTINGS`](crate::feature::feature_ids::SET_SETTINGS)
//! request. Several triplets may share one request.

use serde::{Deserialize, Serialize};

use crate::feature::FeatureAnswer;
use crate::feature::feature_ids;

/// Settings keys.
pub mod setting_keys {
    pub const AUTOMOUSE: u8 = 0x08;
    pub const ORIENTATION: u8 = 0x30;
}

/// Firmware value for "right pad drives the mouse pointer".
pub const AUTOMOUSE_ON: u8 = 0x00;
pub const AUTOMOUSE_OFF: u8 = 0x07;

/// Length of the serial request parameter block.
pub const SERIAL_REQUEST_LEN: usize = 21;

/// Bitmask selecting which motion quantities the firmware computes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Orientation(u8);

impl Orientation {
    pub const NONE: Self = Self(0);
    pub const TILT_X: Self = Self(0x01);
    pub const TILT_Y: Self = Self(0x02);
    pub const ACCEL: Self = Self(0x04);
    pub const QUATERNION: Self = Self(0x08);
    pub const GYRO: Self = Self(0x10);
    pub const ALL: Self = Self(0x1F);

    /// Bits the motion endpoint powers on while it is open.
    pub const MOTION_SENSORS: Self = Self::ACCEL.union(Self::GYRO);

    /// Accepts only masks within [`Orientation::ALL`].
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL.0 == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn insert(&mut self, other: Self) {
        *self = self.union(other);
    }

    pub fn remove(&mut self, other: Self) {
        *self = self.difference(other);
    }
}

impl std::ops::BitOr for Orientation {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// Desired on-device configuration.
///
/// `center_touchpads` never reaches the device; it only changes how reports
/// are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub automouse: bool,
    pub autobuttons: bool,
    pub center_touchpads: bool,
    pub orientation: Orientation,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            automouse: false,
            autobuttons: false,
            center_touchpads: true,
            orientation: Orientation::NONE,
        }
    }
}

pub const fn automouse_value(on: bool) -> u8 {
    if on { AUTOMOUSE_ON } else { AUTOMOUSE_OFF }
}

pub const fn automouse_params(on: bool) -> [u8; 3] {
    [setting_keys::AUTOMOUSE, automouse_value(on), 0x00]
}

pub const fn orientation_params(orientation: Orientation) -> [u8; 3] {
    [setting_keys::ORIENTATION, orientation.bits(), 0x00]
}

/// Automouse and orientation in one request, as pushed on connect.
pub const fn combined_params(settings: &DeviceSettings) -> [u8; 6] {
    [
        setting_keys::AUTOMOUSE,
        automouse_value(settings.automouse),
        0x00,
        setting_keys::ORIENTATION,
        settings.orientation.bits(),
        0x00,
    ]
}

/// Auto-buttons is toggled by feature id alone.
pub const fn autobuttons_report_id(on: bool) -> u8 {
    if on {
        feature_ids::ENABLE_AUTOBUTTONS
    } else {
        feature_ids::DISABLE_AUTOBUTTONS
    }
}

pub fn serial_request_params() -> [u8; SERIAL_REQUEST_LEN] {
    let mut params = [0u8; SERIAL_REQUEST_LEN];
    if let Some(first) = params.first_mut() {
        *first = 0x01;
    }
    params
}

/// Extract the serial string from a serial answer.
///
/// Byte 0 of the payload is a tag; the string follows, NUL terminated or
/// running to the declared length. An empty answer yields an empty serial.
pub fn parse_serial(answer: &FeatureAnswer) -> String {
    let Some(text) = answer.payload.get(1..) else {
        return String::new();
    };
    let end = text.iter().position(|&b| b == 0).unwrap_or(text.len());
    String::from_utf8_lossy(text.get(..end).unwrap_or_default()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_center_touchpads_only() {
        let settings = DeviceSettings::default();
        assert!(!settings.automouse);
        assert!(!settings.autobuttons);
        assert!(settings.center_touchpads);
        assert!(settings.orientation.is_empty());
    }

    #[test]
    fn orientation_bit_ops() {
        let mut o = Orientation::TILT_X;
        o.insert(Orientation::MOTION_SENSORS);
        assert_eq!(o.bits(), 0x15);
        assert!(o.contains(Orientation::GYRO));
        o.remove(Orientation::MOTION_SENSORS);
        assert_eq!(o, Orientation::TILT_X);
        assert_eq!((Orientation::ACCEL | Orientation::GYRO).bits(), 0x14);
    }

    #[test]
    fn orientation_from_bits_bounds() {
        assert_eq!(Orientation::from_bits(0x1F), Some(Orientation::ALL));
        assert_eq!(Orientation::from_bits(0x20), None);
        assert_eq!(Orientation::from_bits_truncate(0xF4), Orientation::MOTION_SENSORS);
    }

    #[test]
    fn orientation_display_is_two_digit_hex() {
        assert_eq!(Orientation::MOTION_SENSORS.to_string(), "0x14");
        assert_eq!(Orientation::NONE.to_string(), "0x00");
    }

    #[test]
    fn combined_params_for_defaults() {
        let params = combined_params(&DeviceSettings::default());
        assert_eq!(params, [0x08, 0x07, 0x00, 0x30, 0x00, 0x00]);
    }

    #[test]
    fn automouse_on_is_zero() {
        assert_eq!(automouse_params(true), [0x08, 0x00, 0x00]);
        assert_eq!(automouse_params(false), [0x08, 0x07, 0x00]);
    }

    #[test]
    fn autobuttons_ids() {
        assert_eq!(autobuttons_report_id(true), 0x85);
        assert_eq!(autobuttons_report_id(false), 0x81);
    }

    #[test]
    fn serial_params_start_with_one() {
        let params = serial_request_params();
        assert_eq!(params.len(), 21);
        assert_eq!(params.first(), Some(&0x01));
        assert!(params.iter().skip(1).all(|&b| b == 0));
    }

    #[test]
    fn serial_parsing() {
        let answer = FeatureAnswer {
            report_id: 0xAE,
            payload: b"\x01FXAA12345\x00junk".to_vec(),
        };
        assert_eq!(parse_serial(&answer), "FXAA12345");

        let unterminated = FeatureAnswer {
            report_id: 0xAE,
            payload: b"\x01ABC".to_vec(),
        };
        assert_eq!(parse_serial(&unterminated), "ABC");

        let empty = FeatureAnswer {
            report_id: 0xAE,
            payload: Vec::new(),
        };
        assert_eq!(parse_serial(&empty), "");
    }

    #[test]
    fn settings_deserialize_with_missing_fields() -> Result<(), serde_json::Error> {
        let settings: DeviceSettings = serde_json::from_str(r#"{"orientation": 20}"#)?;
        assert_eq!(settings.orientation, Orientation::MOTION_SENSORS);
        assert!(settings.center_touchpads);
        Ok(())
    }
}
