//! Steam Controller session runtime.
//!
//! A [`DeviceSession`] binds one controller interface (a wired controller or
//! one slot of a wireless receiver). It decodes interrupt frames into input
//! events for two endpoints, follows connection events, and runs device
//! initialization and teardown on its own worker thread so the interrupt
//! path never blocks on a control transfer.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use steam_controller_driver::{DeviceSession, InputSink, ProbeOutcome, SessionConfig};
//! # fn run(
//! #     info: sc_hid_common::HidDeviceInfo,
//! #     channel: Arc<dyn sc_hid_common::ControlChannel>,
//! #     sink: Arc<dyn InputSink>,
//! #     mut frames: Box<dyn sc_hid_common::FrameSource>,
//! # ) -> steam_controller_driver::DriverResult<()> {
//! if let ProbeOutcome::Bound(session) =
//!     DeviceSession::probe(info, channel, sink, SessionConfig::default())?
//! {
//!     while session.pump(frames.as_mut(), 100)? {}
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod endpoint;
pub mod error;
pub mod feature_client;
mod lifecycle;
pub mod session;
pub mod state;
pub mod stats;
pub mod surface;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod worker;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use endpoint::{
    AxisInfo, EndpointDescriptor, EndpointHandle, EndpointHooks, EndpointIdentity, EndpointKind,
    InputSink,
};
pub use error::{DriverError, DriverResult};
pub use feature_client::{FeatureClient, FeatureIo};
pub use session::{DeviceSession, ProbeOutcome};
pub use state::{ConnectionMachine, ConnectionState, Transition};
pub use stats::{SessionCounters, SessionStats};
pub use surface::Setting;
pub use worker::{SessionWorker, SubmitError};
