//! Error types for the session runtime.

use hid_steam_controller_protocol::FrameError;
use sc_hid_common::HidCommonError;
use thiserror::Error;

/// Driver errors, one variant per failure class.
#[derive(Debug, Error)]
pub enum DriverError {
    /// I/O failure talking to the hardware. Not retried.
    #[error("Transport error: {0}")]
    Transport(#[from] HidCommonError),

    /// The device answered with an unexpected shape.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Caller misuse: oversized parameters, bad configuration token.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Endpoint registration, thread or queue allocation failed.
    #[error("Resource error: {0}")]
    Resource(String),
}

impl DriverError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

impl From<FrameError> for DriverError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::ParamsTooLong { .. } => Self::InvalidArgument(err.to_string()),
            FrameError::ReportIdMismatch { .. }
            | FrameError::AnswerTooLong { .. }
            | FrameError::Malformed(_) => Self::Protocol(err.to_string()),
        }
    }
}

pub type DriverResult<T> = Result<T, DriverError>;
