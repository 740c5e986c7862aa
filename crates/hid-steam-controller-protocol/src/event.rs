//! Normalised events delivered to input endpoints.

use serde::{Deserialize, Serialize};

use crate::button::Button;

/// Absolute axes, carrying their Linux input event codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
    Rx,
    Ry,
    Rz,
    Gas,
    Brake,
    Hat0X,
    Hat0Y,
    Hat1X,
    Hat1Y,
}

impl Axis {
    pub const fn code(self) -> u16 {
        match self {
            Self::X => 0x00,
            Self::Y => 0x01,
            Self::Z => 0x02,
            Self::Rx => 0x03,
            Self::Ry => 0x04,
            Self::Rz => 0x05,
            Self::Gas => 0x09,
            Self::Brake => 0x0A,
            Self::Hat0X => 0x10,
            Self::Hat0Y => 0x11,
            Self::Hat1X => 0x12,
            Self::Hat1Y => 0x13,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Key { button: Button, pressed: bool },
    Abs { axis: Axis, value: i32 },
}

impl InputEvent {
    pub const fn key(button: Button, pressed: bool) -> Self {
        Self::Key { button, pressed }
    }

    pub const fn abs(axis: Axis, value: i32) -> Self {
        Self::Abs { axis, value }
    }
}

impl std::fmt::Display for InputEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key { button, pressed } => {
                write!(f, "{button:?} {}", if *pressed { "down" } else { "up" })
            }
            Self::Abs { axis, value } => write!(f, "{axis:?}={value}"),
        }
    }
}
