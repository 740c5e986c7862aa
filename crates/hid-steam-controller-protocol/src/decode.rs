//! Control state decoding.
//!
//! The left axis pair is a single sensor shared by the left pad and the
//! joystick. The left touch bit decides which one a frame describes, and the
//! left click bit follows it: pad click while touched, stick click otherwise.
//! The right pad has no stick, so its click is only meaningful while touched.

use serde::{Deserialize, Serialize};

use crate::button::{Button, ButtonSet, button_mask};
use crate::event::{Axis, InputEvent};
use crate::report::{INPUT_REPORT_SIZE, RawInputReport};
use crate::settings::DeviceSettings;
use crate::tilt::tilt_angles;

/// Sign convention for the vertical component of stick and pad positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisConvention {
    /// Up is negative, as gamepad consumers expect.
    #[default]
    InvertY,
    /// Device coordinates, up is positive.
    Raw,
}

/// How motion fields are delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionMode {
    /// Accelerometer and gyroscope samples as reported.
    #[default]
    Raw,
    /// Two tilt angles derived from the accelerometer, plus the gyroscope.
    Tilt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Report the right pad even without touch, and centre the left pad
    /// when it reads exactly `(0, 0)` untouched. The hardware does not
    /// always report a release otherwise.
    pub center_touchpads: bool,
    pub axis_convention: AxisConvention,
    pub motion_mode: MotionMode,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            center_touchpads: true,
            axis_convention: AxisConvention::default(),
            motion_mode: MotionMode::default(),
        }
    }
}

impl DecodeOptions {
    pub fn new(axis_convention: AxisConvention, motion_mode: MotionMode) -> Self {
        Self {
            axis_convention,
            motion_mode,
            ..Self::default()
        }
    }

    pub fn with_center_touchpads(mut self, on: bool) -> Self {
        self.center_touchpads = on;
        self
    }

    /// Take the decode-relevant part of the current settings.
    pub fn with_settings(self, settings: &DeviceSettings) -> Self {
        self.with_center_touchpads(settings.center_touchpads)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const CENTER: Self = Self { x: 0, y: 0 };

    fn from_raw(raw: [i16; 2], convention: AxisConvention) -> Self {
        let [x, y] = raw;
        let y = i32::from(y);
        Self {
            x: i32::from(x),
            // Negated in i32 so i16::MIN maps to 32768 instead of wrapping.
            y: match convention {
                AxisConvention::InvertY => -y,
                AxisConvention::Raw => y,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionSample {
    Raw { accel: [i16; 3], gyro: [i16; 3] },
    /// `angles` are centidegrees in `-18000..=18000`.
    Tilt { angles: [i32; 2], gyro: [i16; 3] },
}

impl MotionSample {
    pub fn gyro(&self) -> [i16; 3] {
        match self {
            Self::Raw { gyro, .. } | Self::Tilt { gyro, .. } => *gyro,
        }
    }
}

/// One decoded control state frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedInput {
    pub buttons: ButtonSet,
    pub stick: Option<Position>,
    pub left_pad: Option<Position>,
    pub right_pad: Option<Position>,
    /// Left, right.
    pub triggers: [u8; 2],
    pub motion: MotionSample,
}

/// Decode a 64-byte control state frame. Never fails; the declared length
/// and type are not checked here.
pub fn decode(report: &[u8; INPUT_REPORT_SIZE], options: &DecodeOptions) -> DecodedInput {
    decode_report(&RawInputReport::parse(report), options)
}

pub fn decode_report(raw: &RawInputReport, options: &DecodeOptions) -> DecodedInput {
    let mask = raw.buttons;
    let bit = |b: u32| mask & b != 0;
    let convention = options.axis_convention;

    let mut buttons = ButtonSet::default();
    for button in Button::ALL {
        if let Some(m) = button.direct_mask() {
            buttons.report(button, bit(m));
        }
    }

    let left = Position::from_raw(raw.left, convention);
    let (stick, left_pad) = if bit(button_mask::TOUCH_LEFT) {
        buttons.report(Button::LeftPadClick, bit(button_mask::CLICK_LEFT));
        (None, Some(left))
    } else {
        buttons.report(Button::StickClick, bit(button_mask::CLICK_LEFT));
        let centered = (options.center_touchpads && raw.left == [0, 0]).then_some(Position::CENTER);
        (Some(left), centered)
    };

    let touch_right = bit(button_mask::TOUCH_RIGHT);
    if touch_right {
        buttons.report(Button::RightPadClick, bit(button_mask::CLICK_RIGHT));
    }
    let right_pad = (touch_right || options.center_touchpads)
        .then(|| Position::from_raw(raw.right, convention));

    let motion = match options.motion_mode {
        MotionMode::Raw => MotionSample::Raw {
            accel: raw.accel,
            gyro: raw.gyro,
        },
        MotionMode::Tilt => MotionSample::Tilt {
            angles: tilt_angles(raw.accel),
            gyro: raw.gyro,
        },
    };

    DecodedInput {
        buttons,
        stick,
        left_pad,
        right_pad,
        triggers: raw.triggers,
        motion,
    }
}

impl DecodedInput {
    /// Events for the primary endpoint: positions, triggers, then buttons.
    pub fn primary_events(&self) -> Vec<InputEvent> {
        let mut events = Vec::with_capacity(24);
        if let Some(pad) = self.left_pad {
            events.push(InputEvent::abs(Axis::Hat0X, pad.x));
            events.push(InputEvent::abs(Axis::Hat0Y, pad.y));
        }
        if let Some(pad) = self.right_pad {
            events.push(InputEvent::abs(Axis::Hat1X, pad.x));
            events.push(InputEvent::abs(Axis::Hat1Y, pad.y));
        }
        let [left_trigger, right_trigger] = self.triggers;
        events.push(InputEvent::abs(Axis::Brake, i32::from(left_trigger)));
        events.push(InputEvent::abs(Axis::Gas, i32::from(right_trigger)));
        if let Some(stick) = self.stick {
            events.push(InputEvent::abs(Axis::X, stick.x));
            events.push(InputEvent::abs(Axis::Y, stick.y));
        }
        events.extend(
            self.buttons
                .iter()
                .map(|(button, pressed)| InputEvent::key(button, pressed)),
        );
        events
    }

    /// Events for the motion endpoint.
    pub fn motion_events(&self) -> Vec<InputEvent> {
        let mut events = Vec::with_capacity(6);
        match self.motion {
            MotionSample::Raw { accel, .. } => {
                let [x, y, z] = accel;
                events.push(InputEvent::abs(Axis::X, i32::from(x)));
                events.push(InputEvent::abs(Axis::Y, i32::from(y)));
                events.push(InputEvent::abs(Axis::Z, i32::from(z)));
            }
            MotionSample::Tilt { angles, .. } => {
                let [x, y] = angles;
                events.push(InputEvent::abs(Axis::X, x));
                events.push(InputEvent::abs(Axis::Y, y));
            }
        }
        let [rx, ry, rz] = self.motion.gyro();
        events.push(InputEvent::abs(Axis::Rx, i32::from(rx)));
        events.push(InputEvent::abs(Axis::Ry, i32::from(ry)));
        events.push(InputEvent::abs(Axis::Rz, i32::from(rz)));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(buttons: u32, left: [i16; 2], right: [i16; 2]) -> RawInputReport {
        RawInputReport {
            report_type: 0x01,
            length: 60,
            buttons,
            left,
            right,
            ..RawInputReport::default()
        }
    }

    #[test]
    fn untouched_left_is_stick() {
        let input = decode_report(
            &raw(button_mask::CLICK_LEFT, [100, 200], [0, 0]),
            &DecodeOptions::default(),
        );
        assert_eq!(input.stick, Some(Position { x: 100, y: -200 }));
        assert_eq!(input.left_pad, None);
        assert_eq!(input.buttons.get(Button::StickClick), Some(true));
        assert_eq!(input.buttons.get(Button::LeftPadClick), None);
    }

    #[test]
    fn touched_left_is_pad() {
        let input = decode_report(
            &raw(button_mask::TOUCH_LEFT, [-5, -7], [0, 0]),
            &DecodeOptions::default(),
        );
        assert_eq!(input.stick, None);
        assert_eq!(input.left_pad, Some(Position { x: -5, y: 7 }));
        assert_eq!(input.buttons.get(Button::LeftPadClick), Some(false));
        assert_eq!(input.buttons.get(Button::StickClick), None);
    }

    #[test]
    fn centered_left_pad_is_synthesized_at_rest() {
        let input = decode_report(&raw(0, [0, 0], [0, 0]), &DecodeOptions::default());
        assert_eq!(input.stick, Some(Position::CENTER));
        assert_eq!(input.left_pad, Some(Position::CENTER));

        let off = DecodeOptions::default().with_center_touchpads(false);
        let input = decode_report(&raw(0, [0, 0], [0, 0]), &off);
        assert_eq!(input.left_pad, None);
    }

    #[test]
    fn right_pad_needs_touch_or_centering() {
        let off = DecodeOptions::default().with_center_touchpads(false);
        let untouched = decode_report(&raw(button_mask::CLICK_RIGHT, [0, 0], [9, 9]), &off);
        assert_eq!(untouched.right_pad, None);
        assert_eq!(untouched.buttons.get(Button::RightPadClick), None);

        let touched = decode_report(
            &raw(button_mask::TOUCH_RIGHT | button_mask::CLICK_RIGHT, [0, 0], [9, 9]),
            &off,
        );
        assert_eq!(touched.right_pad, Some(Position { x: 9, y: -9 }));
        assert_eq!(touched.buttons.get(Button::RightPadClick), Some(true));

        let centered = decode_report(&raw(0, [0, 0], [3, 4]), &DecodeOptions::default());
        assert_eq!(centered.right_pad, Some(Position { x: 3, y: -4 }));
        assert_eq!(centered.buttons.get(Button::RightPadClick), None);
    }

    #[test]
    fn inverting_min_does_not_wrap() {
        let input = decode_report(&raw(0, [0, i16::MIN], [0, 0]), &DecodeOptions::default());
        assert_eq!(input.stick, Some(Position { x: 0, y: 32_768 }));
    }

    #[test]
    fn raw_convention_keeps_sign() {
        let options = DecodeOptions::new(AxisConvention::Raw, MotionMode::Raw);
        let input = decode_report(&raw(0, [1, 2], [0, 0]), &options);
        assert_eq!(input.stick, Some(Position { x: 1, y: 2 }));
    }

    #[test]
    fn face_buttons_follow_gamepad_layout() {
        let input = decode_report(
            &raw(button_mask::A | button_mask::Y | button_mask::GRIP_RIGHT, [0, 0], [0, 0]),
            &DecodeOptions::default(),
        );
        let pressed: Vec<Button> = input.buttons.pressed().collect();
        assert_eq!(pressed, vec![Button::South, Button::North, Button::RightGrip]);
    }

    #[test]
    fn tilt_mode_replaces_accel() {
        let report = RawInputReport {
            accel: [0x4000, 0, 0],
            gyro: [1, 2, 3],
            ..raw(0, [0, 0], [0, 0])
        };
        let options = DecodeOptions::new(AxisConvention::InvertY, MotionMode::Tilt);
        let input = decode_report(&report, &options);
        assert_eq!(
            input.motion,
            MotionSample::Tilt {
                angles: [9_000, 0],
                gyro: [1, 2, 3]
            }
        );
        assert_eq!(input.motion_events().len(), 5);
    }
}
