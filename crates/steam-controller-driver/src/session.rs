//! One bound controller interface.
//!
//! [`DeviceSession::probe`] decides whether an interface is the controller
//! interface and, if so, owns everything needed to drive it until drop.
//! [`DeviceSession::handle_frame`] is the interrupt path: it never performs a
//! control exchange and never waits for the worker.

use std::sync::Arc;

use hid_steam_controller_protocol::{
    DeviceSettings, DeviceSignature, ReportKind, SignatureVerdict, Topology, as_report, classify,
    feature_ids, report, verify_signature,
};
use sc_hid_common::{ControlChannel, FrameSource, HidDeviceInfo};
use tracing::{debug, error, trace, warn};

use crate::config::SessionConfig;
use crate::endpoint::InputSink;
use crate::error::DriverResult;
use crate::lifecycle::{InitPhase, SessionInner};
use crate::state::{ConnectionState, Transition};
use crate::stats::SessionStats;
use crate::surface::Setting;
use crate::worker::SessionWorker;

/// Result of probing one HID interface.
pub enum ProbeOutcome {
    Bound(DeviceSession),
    /// Not the controller interface; left to the generic HID stack.
    Skipped(SignatureVerdict),
}

impl ProbeOutcome {
    pub fn session(self) -> Option<DeviceSession> {
        match self {
            Self::Bound(session) => Some(session),
            Self::Skipped(_) => None,
        }
    }
}

impl std::fmt::Debug for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bound(session) => f.debug_tuple("Bound").field(session).finish(),
            Self::Skipped(verdict) => f.debug_tuple("Skipped").field(verdict).finish(),
        }
    }
}

pub struct DeviceSession {
    inner: Arc<SessionInner>,
    worker: SessionWorker<Transition>,
}

impl DeviceSession {
    /// Bind to `info` if it is a controller interface.
    ///
    /// A wired controller is considered connected immediately and its init
    /// job is queued. A receiver starts disconnected and is asked to report
    /// its connection state; the answer arrives as a connection event frame.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an invalid `config`, `Resource` if the worker
    /// thread cannot be started.
    pub fn probe(
        info: HidDeviceInfo,
        channel: Arc<dyn ControlChannel>,
        sink: Arc<dyn InputSink>,
        config: SessionConfig,
    ) -> DriverResult<ProbeOutcome> {
        config.validate()?;
        let signature =
            DeviceSignature::new(info.vendor_id, info.product_id, &info.report_descriptor);
        let topology = match verify_signature(&signature) {
            SignatureVerdict::Controller(topology) => topology,
            verdict => {
                debug!("Not binding {}: {:?}", info.path, verdict);
                return Ok(ProbeOutcome::Skipped(verdict));
            }
        };

        let depth = config.queue_depth;
        let inner = Arc::new(SessionInner::new(info, topology, channel, sink, config));
        let worker_inner = Arc::clone(&inner);
        let worker = SessionWorker::spawn(format!("sc-{}", topology.name()), depth, move |job| {
            worker_inner.run_job(job);
        })?;
        let session = Self { inner, worker };

        match topology {
            Topology::Wired => {
                if session.inner.claim_job() {
                    session.submit(Transition::Initialize);
                }
            }
            Topology::Receiver => session.request_connection_state(),
        }
        Ok(ProbeOutcome::Bound(session))
    }

    fn request_connection_state(&self) {
        match self
            .inner
            .features
            .send_request(feature_ids::GET_CONNECTION_STATE, &[], true)
        {
            // The state itself arrives as a connection event on the input
            // stream; the answer is read to complete the exchange.
            Ok(answer) => debug!(
                "Requested connection state of {} ({} byte answer)",
                self.inner.info.path,
                answer.map_or(0, |a| a.len())
            ),
            Err(e) => warn!(
                "Failed to request connection state of {}: {}",
                self.inner.info.path, e
            ),
        }
    }

    /// Queue a job whose slot was already claimed.
    fn submit(&self, job: Transition) {
        match self.worker.submit(job) {
            Ok(()) => {
                self.inner.counters.inc_jobs_submitted();
                debug!("Queued {:?} for {}", job, self.inner.info.path);
            }
            Err(e) => {
                self.inner.release_job();
                self.inner.counters.inc_jobs_dropped();
                error!("Dropped {:?} for {}: {}", job, self.inner.info.path, e);
            }
        }
    }

    /// Process one interrupt frame.
    ///
    /// Frames that are not exactly 64 bytes and unknown report types are
    /// ignored. A mismatched declared length is logged and the frame is
    /// processed anyway.
    pub fn handle_frame(&self, frame: &[u8]) {
        let counters = &self.inner.counters;
        counters.inc_frames_received();
        let Some(frame) = as_report(frame) else {
            counters.inc_frames_ignored();
            trace!("Ignoring {} byte frame", frame.len());
            return;
        };

        let kind = classify(frame);
        if !report::has_expected_length(frame) {
            counters.inc_malformed_lengths();
            warn!(
                "{:?} report declares length {}",
                kind,
                report::declared_length(frame)
            );
        }

        match kind {
            ReportKind::Input => self.inner.deliver_input(frame),
            ReportKind::Connection(event) => {
                debug!("Connection event {:?} on {}", event, self.inner.info.path);
                if let Some(job) = self.inner.apply_connection_event(event) {
                    self.submit(job);
                }
            }
            ReportKind::Unknown(report_type) => {
                counters.inc_frames_ignored();
                trace!("Ignoring report type 0x{report_type:02X}");
            }
        }
    }

    /// Read one frame from `source` and process it.
    /// Returns `Ok(false)` when the read timed out.
    ///
    /// # Errors
    ///
    /// `Transport` when the read fails.
    pub fn pump(&self, source: &mut dyn FrameSource, timeout_ms: i32) -> DriverResult<bool> {
        let mut buf = [0u8; report::INPUT_REPORT_SIZE + 1];
        let len = source.read_frame(&mut buf, timeout_ms)?;
        if len == 0 {
            return Ok(false);
        }
        self.handle_frame(buf.get(..len).unwrap_or_default());
        Ok(true)
    }

    pub fn read_setting(&self, setting: Setting) -> String {
        setting.read(&self.inner.link.lock().settings)
    }

    /// Parse and store `token`, forwarding it to the device if connected.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a token the setting does not accept; the stored
    /// settings are unchanged.
    pub fn write_setting(&self, setting: Setting, token: &str) -> DriverResult<()> {
        self.inner.write_setting(setting, token)
    }

    pub fn settings(&self) -> DeviceSettings {
        self.inner.link.lock().settings
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.link.lock().machine.state()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.link.lock().machine.is_connected()
    }

    /// Whether the init sequence has completed and not been torn down.
    pub fn is_ready(&self) -> bool {
        self.inner.link.lock().phase == InitPhase::Up
    }

    /// Serial read during the last init; `Some("")` if it could not be read.
    pub fn serial(&self) -> Option<String> {
        self.inner.link.lock().serial.clone()
    }

    pub fn topology(&self) -> Topology {
        self.inner.topology
    }

    pub fn device_info(&self) -> &HidDeviceInfo {
        &self.inner.info
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn stats(&self) -> SessionStats {
        self.inner.counters.snapshot()
    }

    /// Block until every queued init/teardown job has run.
    pub fn wait_idle(&self) -> bool {
        self.worker.wait_idle()
    }

    /// Finish outstanding jobs, stop the worker and tear down endpoints.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if !self.worker.is_running() {
            return;
        }
        debug!("Shutting down session for {}", self.inner.info.path);
        self.worker.shutdown();
        self.inner.teardown();
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("path", &self.inner.info.path)
            .field("topology", &self.inner.topology)
            .field("worker", &self.worker.name())
            .finish_non_exhaustive()
    }
}
