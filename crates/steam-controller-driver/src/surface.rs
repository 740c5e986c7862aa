//! Named settings exposed for reading and writing as text.
//!
//! Switches read and write as `on`/`off`. The orientation mask reads as
//! `0x%02x` and accepts decimal or `0x`-prefixed hex. Surrounding whitespace
//! is ignored.

use std::str::FromStr;

use hid_steam_controller_protocol::{DeviceSettings, Orientation};
use serde::{Deserialize, Serialize};

use crate::error::{DriverError, DriverResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setting {
    Automouse,
    Autobuttons,
    CenterTouchpads,
    Orientation,
}

impl Setting {
    pub const ALL: [Setting; 4] = [
        Self::Automouse,
        Self::Autobuttons,
        Self::CenterTouchpads,
        Self::Orientation,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Automouse => "automouse",
            Self::Autobuttons => "autobuttons",
            Self::CenterTouchpads => "center_touchpads",
            Self::Orientation => "orientation",
        }
    }

    /// Whether writing this setting changes what the device is sent.
    pub const fn reaches_device(self) -> bool {
        !matches!(self, Self::CenterTouchpads)
    }

    pub fn read(self, settings: &DeviceSettings) -> String {
        match self {
            Self::Automouse => switch_str(settings.automouse).to_string(),
            Self::Autobuttons => switch_str(settings.autobuttons).to_string(),
            Self::CenterTouchpads => switch_str(settings.center_touchpads).to_string(),
            Self::Orientation => settings.orientation.to_string(),
        }
    }

    /// Parse `token` and store it. `settings` is untouched on error.
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidArgument`] for a token this setting does not accept.
    pub fn apply(self, settings: &mut DeviceSettings, token: &str) -> DriverResult<()> {
        match self {
            Self::Automouse => settings.automouse = parse_switch(token)?,
            Self::Autobuttons => settings.autobuttons = parse_switch(token)?,
            Self::CenterTouchpads => settings.center_touchpads = parse_switch(token)?,
            Self::Orientation => settings.orientation = parse_orientation(token)?,
        }
        Ok(())
    }
}

impl std::fmt::Display for Setting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Setting {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|setting| setting.name() == name)
            .ok_or_else(|| DriverError::invalid_argument(format!("unknown setting '{name}'")))
    }
}

fn switch_str(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

pub fn parse_switch(token: &str) -> DriverResult<bool> {
    match token.trim() {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(DriverError::invalid_argument(format!(
            "expected 'on' or 'off', got '{other}'"
        ))),
    }
}

pub fn parse_orientation(token: &str) -> DriverResult<Orientation> {
    let token = token.trim();
    let bits = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => token.parse::<u8>(),
    }
    .map_err(|e| DriverError::invalid_argument(format!("bad orientation '{token}': {e}")))?;
    Orientation::from_bits(bits).ok_or_else(|| {
        DriverError::invalid_argument(format!(
            "orientation 0x{bits:02x} has bits outside {}",
            Orientation::ALL
        ))
    })
}
