//! Device lifecycle: what happens when the controller comes and goes.
//!
//! Lock order is always control channel first, then link state. The link
//! lock is never held across a control exchange or an endpoint
//! (un)registration, so hooks fired by the sink can take both locks.

use std::sync::{Arc, Weak};

use hid_steam_controller_protocol::{
    ConnectionEvent, DeviceSettings, INPUT_REPORT_SIZE, Orientation, Topology,
    autobuttons_report_id, automouse_params, combined_params, decode, feature_ids,
    orientation_params, parse_serial, serial_request_params,
};
use parking_lot::Mutex;
use sc_hid_common::{ControlChannel, HidDeviceInfo};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::endpoint::{
    EndpointDescriptor, EndpointHandle, EndpointHooks, EndpointIdentity, InputSink,
};
use crate::error::DriverResult;
use crate::feature_client::{FeatureClient, FeatureIo};
use crate::state::{ConnectionMachine, Transition};
use crate::stats::SessionCounters;
use crate::surface::Setting;

/// How far the init sequence has got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InitPhase {
    Down,
    /// Init job running; setting changes are recorded but not pushed.
    Initializing,
    /// Endpoints registered; setting changes go straight to the device.
    Up,
}

pub(crate) struct LinkState {
    pub(crate) machine: ConnectionMachine,
    pub(crate) phase: InitPhase,
    pub(crate) settings: DeviceSettings,
    /// Bumped on every change that reaches the device.
    generation: u64,
    primary: Option<Box<dyn EndpointHandle>>,
    motion: Option<Box<dyn EndpointHandle>>,
    pub(crate) serial: Option<String>,
    /// A job is queued that has not started yet.
    job_queued: bool,
}

impl LinkState {
    fn new(topology: Topology, settings: DeviceSettings) -> Self {
        Self {
            machine: ConnectionMachine::for_topology(topology),
            phase: InitPhase::Down,
            settings,
            generation: 0,
            primary: None,
            motion: None,
            serial: None,
            job_queued: false,
        }
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn has_endpoints(&self) -> bool {
        self.primary.is_some() || self.motion.is_some()
    }
}

/// State shared between the session owner, its worker and endpoint hooks.
pub(crate) struct SessionInner {
    pub(crate) info: HidDeviceInfo,
    pub(crate) topology: Topology,
    pub(crate) config: SessionConfig,
    pub(crate) features: FeatureClient,
    sink: Arc<dyn InputSink>,
    pub(crate) link: Mutex<LinkState>,
    pub(crate) counters: SessionCounters,
}

impl SessionInner {
    pub(crate) fn new(
        info: HidDeviceInfo,
        topology: Topology,
        channel: Arc<dyn ControlChannel>,
        sink: Arc<dyn InputSink>,
        config: SessionConfig,
    ) -> Self {
        let link = LinkState::new(topology, config.initial_settings);
        Self {
            features: FeatureClient::new(channel, config.settle_delay),
            info,
            topology,
            config,
            sink,
            link: Mutex::new(link),
            counters: SessionCounters::new(),
        }
    }

    /// Worker entry point.
    ///
    /// `hint` is the transition that queued the job; the work done follows
    /// the state at the time the job starts, so coalesced or stale jobs
    /// converge on the current connection state.
    pub(crate) fn run_job(self: &Arc<Self>, hint: Transition) {
        let (connected, phase) = {
            let mut link = self.link.lock();
            link.job_queued = false;
            (link.machine.is_connected(), link.phase)
        };
        match (connected, phase) {
            (true, InitPhase::Down) => self.initialize(),
            (false, _) => self.teardown(),
            (true, _) => debug!(
                "{:?} job on {}: already up, nothing to do",
                hint, self.info.path
            ),
        }
        self.counters.inc_jobs_executed();
    }

    /// Claim the single queue slot. Returns `false` if a job is already
    /// waiting; that job will see the newer state when it runs.
    pub(crate) fn claim_job(&self) -> bool {
        let mut link = self.link.lock();
        if link.job_queued {
            self.counters.inc_jobs_coalesced();
            return false;
        }
        link.job_queued = true;
        true
    }

    /// Give the slot back after a submission failed.
    pub(crate) fn release_job(&self) {
        self.link.lock().job_queued = false;
    }

    fn initialize(self: &Arc<Self>) {
        let mut io = self.features.lock();
        let (settings, generation) = {
            let mut link = self.link.lock();
            if !link.machine.is_connected() || link.phase != InitPhase::Down {
                debug!(
                    "Skipping init of {}: connected={} phase={:?}",
                    self.info.path,
                    link.machine.is_connected(),
                    link.phase
                );
                return;
            }
            link.phase = InitPhase::Initializing;
            (link.settings, link.generation)
        };
        info!("Initializing {} controller on {}", self.topology, self.info.path);

        let serial = self.fetch_serial(&mut io);
        self.push_connect_settings(&mut io, &settings);
        drop(io);

        let identity = EndpointIdentity::from_device(&self.info, &serial);
        let primary = self.register(EndpointDescriptor::primary(identity.clone()), None);
        let hooks: Arc<dyn EndpointHooks> = Arc::new(MotionHooks {
            session: Arc::downgrade(self),
        });
        let motion = self.register(
            EndpointDescriptor::motion(identity, self.config.motion_mode),
            Some(hooks),
        );

        let mut io = self.features.lock();
        let changed = {
            let mut link = self.link.lock();
            link.primary = primary;
            link.motion = motion;
            link.serial = Some(serial);
            link.phase = InitPhase::Up;
            (link.generation != generation).then_some(link.settings)
        };
        if let Some(current) = changed {
            debug!("Settings changed during init of {}, reapplying", self.info.path);
            self.push_connect_settings(&mut io, &current);
        }
        drop(io);
        info!("Controller on {} ready", self.info.path);
    }

    /// Unregister endpoints and forget the serial. Safe to repeat.
    pub(crate) fn teardown(&self) {
        let (primary, motion) = {
            let _io = self.features.lock();
            let mut link = self.link.lock();
            if link.phase == InitPhase::Down && !link.has_endpoints() {
                debug!("Nothing to tear down on {}", self.info.path);
                return;
            }
            link.phase = InitPhase::Down;
            link.serial = None;
            // The motion endpoint comes back closed, with the sensors off.
            if link.settings.orientation.contains(Orientation::MOTION_SENSORS) {
                link.settings.orientation.remove(Orientation::MOTION_SENSORS);
                link.bump();
            }
            (link.primary.take(), link.motion.take())
        };
        for handle in [motion, primary].into_iter().flatten() {
            handle.unregister();
        }
        info!("Controller on {} torn down", self.info.path);
    }

    fn fetch_serial(&self, io: &mut FeatureIo<'_>) -> String {
        match io.send_request(feature_ids::GET_SERIAL, &serial_request_params(), true) {
            Ok(Some(answer)) if !answer.is_empty() => parse_serial(&answer),
            Ok(_) => {
                warn!("Empty serial answer from {}", self.info.path);
                String::new()
            }
            Err(e) => {
                warn!("Failed to read serial from {}: {}", self.info.path, e);
                String::new()
            }
        }
    }

    fn push_connect_settings(&self, io: &mut FeatureIo<'_>, settings: &DeviceSettings) {
        self.push(
            io,
            "settings",
            feature_ids::SET_SETTINGS,
            &combined_params(settings),
        );
        self.push(
            io,
            "auto-buttons",
            autobuttons_report_id(settings.autobuttons),
            &[],
        );
    }

    fn push(&self, io: &mut FeatureIo<'_>, what: &str, report_id: u8, params: &[u8]) {
        match io.send_request(report_id, params, false) {
            Ok(_) => {
                self.counters.inc_settings_pushes();
                debug!("Pushed {} to {}", what, self.info.path);
            }
            Err(e) => warn!("Failed to push {} to {}: {}", what, self.info.path, e),
        }
    }

    fn register(
        &self,
        descriptor: EndpointDescriptor,
        hooks: Option<Arc<dyn EndpointHooks>>,
    ) -> Option<Box<dyn EndpointHandle>> {
        let kind = descriptor.kind;
        match self.sink.register(descriptor, hooks) {
            Ok(handle) => {
                debug!("Registered {:?} endpoint for {}", kind, self.info.path);
                Some(handle)
            }
            Err(e) => {
                warn!(
                    "Failed to register {:?} endpoint for {}: {}",
                    kind, self.info.path, e
                );
                None
            }
        }
    }

    /// Power the accelerometer and gyroscope up or down.
    pub(crate) fn set_motion_sensors(&self, on: bool) {
        let mut io = self.features.lock();
        let push = {
            let mut link = self.link.lock();
            if on {
                link.settings.orientation.insert(Orientation::MOTION_SENSORS);
            } else {
                link.settings.orientation.remove(Orientation::MOTION_SENSORS);
            }
            link.bump();
            (link.phase == InitPhase::Up).then_some(link.settings.orientation)
        };
        debug!(
            "Motion sensors {} on {}",
            if on { "enabled" } else { "disabled" },
            self.info.path
        );
        if let Some(orientation) = push {
            self.push(
                &mut io,
                "orientation",
                feature_ids::SET_SETTINGS,
                &orientation_params(orientation),
            );
        }
    }

    /// Store a setting and forward it to the device when it is up.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a rejected token. Push failures are only
    /// logged; the new value is kept either way.
    pub(crate) fn write_setting(&self, setting: Setting, token: &str) -> DriverResult<()> {
        let mut io = self.features.lock();
        let push = {
            let mut link = self.link.lock();
            setting.apply(&mut link.settings, token)?;
            if setting.reaches_device() {
                link.bump();
            }
            (link.phase == InitPhase::Up).then_some(link.settings)
        };
        debug!("{} set to {:?}", setting, token.trim());
        let Some(settings) = push else {
            return Ok(());
        };
        match setting {
            Setting::Automouse => self.push(
                &mut io,
                "automouse",
                feature_ids::SET_SETTINGS,
                &automouse_params(settings.automouse),
            ),
            Setting::Autobuttons => self.push(
                &mut io,
                "auto-buttons",
                autobuttons_report_id(settings.autobuttons),
                &[],
            ),
            Setting::Orientation => self.push(
                &mut io,
                "orientation",
                feature_ids::SET_SETTINGS,
                &orientation_params(settings.orientation),
            ),
            Setting::CenterTouchpads => {}
        }
        Ok(())
    }

    /// Apply a connection event to the state machine.
    ///
    /// Returns the transition to queue, or `None` when the state did not
    /// change or a queued job will pick the change up.
    pub(crate) fn apply_connection_event(&self, event: ConnectionEvent) -> Option<Transition> {
        let mut link = self.link.lock();
        let transition = link.machine.apply(event)?;
        if link.job_queued {
            self.counters.inc_jobs_coalesced();
            debug!("{:?} on {} folded into queued job", transition, self.info.path);
            return None;
        }
        link.job_queued = true;
        Some(transition)
    }

    /// Decode a control state frame and forward it to the endpoints.
    pub(crate) fn deliver_input(&self, report: &[u8; INPUT_REPORT_SIZE]) {
        let link = self.link.lock();
        if !link.has_endpoints() {
            return;
        }
        let input = decode(report, &self.config.decode_options(&link.settings));
        if let Some(primary) = &link.primary {
            primary.emit(&input.primary_events());
        }
        if let Some(motion) = &link.motion {
            motion.emit(&input.motion_events());
        }
    }
}

/// Open/close hooks of the motion endpoint.
struct MotionHooks {
    session: Weak<SessionInner>,
}

impl EndpointHooks for MotionHooks {
    fn on_open(&self) {
        if let Some(session) = self.session.upgrade() {
            session.set_motion_sensors(true);
        }
    }

    fn on_close(&self) {
        if let Some(session) = self.session.upgrade() {
            session.set_motion_sensors(false);
        }
    }
}
