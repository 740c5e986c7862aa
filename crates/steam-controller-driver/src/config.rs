//! Per-session configuration.

use std::time::Duration;

use hid_steam_controller_protocol::{AxisConvention, DecodeOptions, DeviceSettings, MotionMode};
use serde::{Deserialize, Serialize};

use crate::error::{DriverError, DriverResult};

/// Settle time the firmware needs before a feature answer can be read.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Upper bound accepted for the settle delay.
pub const MAX_SETTLE_DELAY: Duration = Duration::from_secs(1);

pub const DEFAULT_QUEUE_DEPTH: usize = 16;

/// The queue must hold at least one init and one teardown.
pub const MIN_QUEUE_DEPTH: usize = 2;

/// Configuration of one [`DeviceSession`](crate::DeviceSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Wait between a feature SET and the GET reading its answer.
    pub settle_delay: Duration,
    /// Capacity of the deferred job queue.
    pub queue_depth: usize,
    pub motion_mode: MotionMode,
    pub axis_convention: AxisConvention,
    /// Settings the session starts with.
    pub initial_settings: DeviceSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            motion_mode: MotionMode::default(),
            axis_convention: AxisConvention::default(),
            initial_settings: DeviceSettings::default(),
        }
    }
}

impl SessionConfig {
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidArgument`] naming the first bad field.
    pub fn validate(&self) -> DriverResult<()> {
        if self.settle_delay.is_zero() {
            return Err(DriverError::invalid_argument(
                "settle_delay must be greater than 0",
            ));
        }
        if self.settle_delay > MAX_SETTLE_DELAY {
            return Err(DriverError::invalid_argument(format!(
                "settle_delay must not exceed {MAX_SETTLE_DELAY:?}"
            )));
        }
        if self.queue_depth < MIN_QUEUE_DEPTH {
            return Err(DriverError::invalid_argument(format!(
                "queue_depth must be at least {MIN_QUEUE_DEPTH}"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Decode options for the given current settings.
    pub fn decode_options(&self, settings: &DeviceSettings) -> DecodeOptions {
        DecodeOptions::new(self.axis_convention, self.motion_mode).with_settings(settings)
    }
}

#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    #[must_use]
    pub fn queue_depth(mut self, depth: usize) -> Self {
        self.config.queue_depth = depth;
        self
    }

    #[must_use]
    pub fn motion_mode(mut self, mode: MotionMode) -> Self {
        self.config.motion_mode = mode;
        self
    }

    #[must_use]
    pub fn axis_convention(mut self, convention: AxisConvention) -> Self {
        self.config.axis_convention = convention;
        self
    }

    #[must_use]
    pub fn initial_settings(mut self, settings: DeviceSettings) -> Self {
        self.config.initial_settings = settings;
        self
    }

    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> DriverResult<SessionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
