//! Logical input endpoints and the sink that hosts them.
//!
//! A session registers two endpoints: the primary one (buttons, stick, pads,
//! triggers) and the motion one (accelerometer and gyroscope). The sink is
//! whatever publishes events to the rest of the system.

use std::sync::Arc;

use hid_steam_controller_protocol::{ANGLE_RANGE, Axis, Button, InputEvent, MotionMode};
use sc_hid_common::HidDeviceInfo;
use serde::{Deserialize, Serialize};

use crate::error::DriverResult;

pub const PRIMARY_NAME: &str = "Valve Software Steam Controller";
pub const MOTION_NAME: &str = "Valve Software Steam Controller Accelerometer";

/// Accelerometer counts per g.
pub const ACCEL_RESOLUTION: i32 = 0x4000;

/// Tilt channels are centidegrees.
pub const TILT_RESOLUTION: i32 = 100;

const AXIS_MAX: i32 = 32_767;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointKind {
    Primary,
    Motion,
}

/// Range and noise filtering of one absolute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisInfo {
    pub axis: Axis,
    pub min: i32,
    pub max: i32,
    pub fuzz: i32,
    pub flat: i32,
    /// Units per physical unit, 0 when unspecified.
    pub resolution: i32,
}

impl AxisInfo {
    pub const fn new(axis: Axis, min: i32, max: i32, fuzz: i32, flat: i32) -> Self {
        Self {
            axis,
            min,
            max,
            fuzz,
            flat,
            resolution: 0,
        }
    }

    pub const fn with_resolution(mut self, resolution: i32) -> Self {
        self.resolution = resolution;
        self
    }

    const fn symmetric(axis: Axis, fuzz: i32, flat: i32) -> Self {
        Self::new(axis, -AXIS_MAX, AXIS_MAX, fuzz, flat)
    }
}

/// Bus identity an endpoint carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointIdentity {
    pub bus_type: u16,
    pub vendor_id: u16,
    pub product_id: u16,
    pub version: u16,
    /// Controller serial, empty when it could not be read.
    pub uniq: String,
}

impl EndpointIdentity {
    pub fn from_device(info: &HidDeviceInfo, serial: &str) -> Self {
        Self {
            bus_type: info.bus_type,
            vendor_id: info.vendor_id,
            product_id: info.product_id,
            version: info.version,
            uniq: serial.to_string(),
        }
    }
}

/// Everything a sink needs to create an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub kind: EndpointKind,
    pub name: String,
    pub identity: EndpointIdentity,
    pub keys: Vec<Button>,
    pub axes: Vec<AxisInfo>,
    /// Marks the endpoint as an accelerometer rather than a gamepad.
    pub accelerometer: bool,
}

impl EndpointDescriptor {
    pub fn primary(identity: EndpointIdentity) -> Self {
        Self {
            kind: EndpointKind::Primary,
            name: PRIMARY_NAME.to_string(),
            identity,
            keys: Button::ALL.to_vec(),
            axes: vec![
                AxisInfo::symmetric(Axis::X, 100, 100),
                AxisInfo::symmetric(Axis::Y, 100, 100),
                AxisInfo::symmetric(Axis::Hat0X, 500, 1000),
                AxisInfo::symmetric(Axis::Hat0Y, 500, 1000),
                AxisInfo::symmetric(Axis::Hat1X, 500, 1000),
                AxisInfo::symmetric(Axis::Hat1Y, 500, 1000),
                AxisInfo::new(Axis::Gas, 0, 255, 2, 1),
                AxisInfo::new(Axis::Brake, 0, 255, 2, 1),
            ],
            accelerometer: false,
        }
    }

    pub fn motion(identity: EndpointIdentity, mode: MotionMode) -> Self {
        let mut axes = match mode {
            MotionMode::Raw => vec![
                AxisInfo::symmetric(Axis::X, 0, 0).with_resolution(ACCEL_RESOLUTION),
                AxisInfo::symmetric(Axis::Y, 0, 0).with_resolution(ACCEL_RESOLUTION),
                AxisInfo::symmetric(Axis::Z, 0, 0).with_resolution(ACCEL_RESOLUTION),
            ],
            MotionMode::Tilt => vec![
                AxisInfo::new(Axis::X, -ANGLE_RANGE, ANGLE_RANGE, 0, 0)
                    .with_resolution(TILT_RESOLUTION),
                AxisInfo::new(Axis::Y, -ANGLE_RANGE, ANGLE_RANGE, 0, 0)
                    .with_resolution(TILT_RESOLUTION),
            ],
        };
        axes.extend([
            AxisInfo::symmetric(Axis::Rx, 0, 0),
            AxisInfo::symmetric(Axis::Ry, 0, 0),
            AxisInfo::symmetric(Axis::Rz, 0, 0),
        ]);
        Self {
            kind: EndpointKind::Motion,
            name: MOTION_NAME.to_string(),
            identity,
            keys: Vec::new(),
            axes,
            accelerometer: true,
        }
    }

    pub fn axis(&self, axis: Axis) -> Option<&AxisInfo> {
        self.axes.iter().find(|info| info.axis == axis)
    }
}

/// Consumer open/close notifications for an endpoint.
pub trait EndpointHooks: Send + Sync {
    fn on_open(&self);
    fn on_close(&self);
}

/// A registered endpoint.
pub trait EndpointHandle: Send + Sync {
    /// Deliver one report's worth of events followed by a sync.
    fn emit(&self, events: &[InputEvent]);

    /// Remove the endpoint. Consumers see it disappear.
    fn unregister(self: Box<Self>);
}

/// Publishes endpoints to the rest of the system.
pub trait InputSink: Send + Sync {
    /// # Errors
    ///
    /// `Resource` when the endpoint cannot be created.
    fn register(
        &self,
        descriptor: EndpointDescriptor,
        hooks: Option<Arc<dyn EndpointHooks>>,
    ) -> DriverResult<Box<dyn EndpointHandle>>;
}
