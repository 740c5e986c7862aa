//! Button mask bits and the logical button set.

use serde::{Deserialize, Serialize};

/// Bits of the 32-bit button mask at [`crate::report::input_report::BUTTONS`].
pub mod button_mask {
    pub const TOUCH_RIGHT: u32 = 0x1000_0000;
    pub const TOUCH_LEFT: u32 = 0x0800_0000;
    pub const CLICK_RIGHT: u32 = 0x0400_0000;
    pub const CLICK_LEFT: u32 = 0x0200_0000;
    pub const GRIP_RIGHT: u32 = 0x0100_0000;
    pub const GRIP_LEFT: u32 = 0x0080_0000;
    pub const START: u32 = 0x0040_0000;
    pub const MODE: u32 = 0x0020_0000;
    pub const SELECT: u32 = 0x0010_0000;
    pub const A: u32 = 0x0000_8000;
    pub const X: u32 = 0x0000_4000;
    pub const B: u32 = 0x0000_2000;
    pub const Y: u32 = 0x0000_1000;
    pub const SHOULDER_LEFT: u32 = 0x0000_0800;
    pub const SHOULDER_RIGHT: u32 = 0x0000_0400;
    pub const TRIGGER_LEFT: u32 = 0x0000_0200;
    pub const TRIGGER_RIGHT: u32 = 0x0000_0100;

    /// Every assigned bit.
    pub const ASSIGNED: u32 = TOUCH_RIGHT
        | TOUCH_LEFT
        | CLICK_RIGHT
        | CLICK_LEFT
        | GRIP_RIGHT
        | GRIP_LEFT
        | START
        | MODE
        | SELECT
        | A
        | X
        | B
        | Y
        | SHOULDER_LEFT
        | SHOULDER_RIGHT
        | TRIGGER_LEFT
        | TRIGGER_RIGHT;
}

/// Logical buttons of the primary endpoint, named by their gamepad role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Button {
    South,
    East,
    West,
    North,
    Select,
    Mode,
    Start,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
    LeftGrip,
    RightGrip,
    /// Left pad clicked while touched.
    LeftPadClick,
    /// Right pad clicked while touched.
    RightPadClick,
    /// Left pad clicked while not touched: the joystick button.
    StickClick,
}

impl Button {
    pub const ALL: [Button; 16] = [
        Self::South,
        Self::East,
        Self::West,
        Self::North,
        Self::Select,
        Self::Mode,
        Self::Start,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftTrigger,
        Self::RightTrigger,
        Self::LeftGrip,
        Self::RightGrip,
        Self::LeftPadClick,
        Self::RightPadClick,
        Self::StickClick,
    ];

    /// Linux input event code.
    pub const fn code(self) -> u16 {
        match self {
            Self::South => 0x130,
            Self::East => 0x131,
            Self::LeftGrip => 0x132,
            Self::North => 0x133,
            Self::West => 0x134,
            Self::RightGrip => 0x135,
            Self::LeftShoulder => 0x136,
            Self::RightShoulder => 0x137,
            Self::LeftTrigger => 0x138,
            Self::RightTrigger => 0x139,
            Self::Select => 0x13A,
            Self::Start => 0x13B,
            Self::Mode => 0x13C,
            Self::LeftPadClick => 0x13D,
            Self::RightPadClick => 0x13E,
            Self::StickClick => 0x13F,
        }
    }

    /// Mask bit for buttons that map one-to-one. Pad and stick clicks share
    /// [`button_mask::CLICK_LEFT`]/[`button_mask::CLICK_RIGHT`] and are gated
    /// by touch state instead.
    pub const fn direct_mask(self) -> Option<u32> {
        match self {
            Self::South => Some(button_mask::A),
            Self::East => Some(button_mask::B),
            Self::West => Some(button_mask::X),
            Self::North => Some(button_mask::Y),
            Self::Select => Some(button_mask::SELECT),
            Self::Mode => Some(button_mask::MODE),
            Self::Start => Some(button_mask::START),
            Self::LeftShoulder => Some(button_mask::SHOULDER_LEFT),
            Self::RightShoulder => Some(button_mask::SHOULDER_RIGHT),
            Self::LeftTrigger => Some(button_mask::TRIGGER_LEFT),
            Self::RightTrigger => Some(button_mask::TRIGGER_RIGHT),
            Self::LeftGrip => Some(button_mask::GRIP_LEFT),
            Self::RightGrip => Some(button_mask::GRIP_RIGHT),
            Self::LeftPadClick | Self::RightPadClick | Self::StickClick => None,
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Buttons a report states, and which of those are pressed.
///
/// A button absent from `reported` keeps whatever state the consumer last
/// saw; this is how the pad clicks stay untouched while the pad is not
/// touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSet {
    reported: u16,
    pressed: u16,
}

impl ButtonSet {
    pub fn report(&mut self, button: Button, pressed: bool) {
        self.reported |= button.bit();
        if pressed {
            self.pressed |= button.bit();
        } else {
            self.pressed &= !button.bit();
        }
    }

    /// `None` when the report says nothing about `button`.
    pub fn get(&self, button: Button) -> Option<bool> {
        if self.reported & button.bit() == 0 {
            None
        } else {
            Some(self.pressed & button.bit() != 0)
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.get(button).unwrap_or(false)
    }

    /// Reported buttons in [`Button::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Button, bool)> + '_ {
        Button::ALL
            .into_iter()
            .filter_map(|button| self.get(button).map(|pressed| (button, pressed)))
    }

    pub fn pressed(&self) -> impl Iterator<Item = Button> + '_ {
        self.iter()
            .filter_map(|(button, pressed)| pressed.then_some(button))
    }
}
