//! In-memory [`InputSink`] that records what a session does with it.

use std::collections::HashMap;
use std::sync::Arc;

use hid_steam_controller_protocol::InputEvent;
use parking_lot::Mutex;

use crate::endpoint::{
    EndpointDescriptor, EndpointHandle, EndpointHooks, EndpointKind, InputSink,
};
use crate::error::{DriverError, DriverResult};

#[derive(Default)]
struct Recorded {
    registrations: Vec<EndpointDescriptor>,
    live: HashMap<EndpointKind, Option<Arc<dyn EndpointHooks>>>,
    events: HashMap<EndpointKind, Vec<Vec<InputEvent>>>,
    unregistered: HashMap<EndpointKind, usize>,
    failing: Vec<EndpointKind>,
}

/// Sink that keeps every registration and emitted batch.
///
/// Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every registration of `kind` fail until cleared.
    pub fn fail_registration(&self, kind: EndpointKind, fail: bool) {
        let mut rec = self.inner.lock();
        rec.failing.retain(|k| *k != kind);
        if fail {
            rec.failing.push(kind);
        }
    }

    /// Descriptors in registration order, including removed endpoints.
    pub fn registrations(&self) -> Vec<EndpointDescriptor> {
        self.inner.lock().registrations.clone()
    }

    pub fn is_registered(&self, kind: EndpointKind) -> bool {
        self.inner.lock().live.contains_key(&kind)
    }

    pub fn unregister_count(&self, kind: EndpointKind) -> usize {
        self.inner.lock().unregistered.get(&kind).copied().unwrap_or(0)
    }

    /// Emitted batches for `kind`, one per report.
    pub fn batches(&self, kind: EndpointKind) -> Vec<Vec<InputEvent>> {
        self.inner.lock().events.get(&kind).cloned().unwrap_or_default()
    }

    pub fn clear_events(&self) {
        self.inner.lock().events.clear();
    }

    /// Simulate a consumer opening the endpoint.
    /// Returns `false` if it is not registered or has no hooks.
    pub fn open(&self, kind: EndpointKind) -> bool {
        self.fire(kind, |hooks| hooks.on_open())
    }

    /// Simulate the last consumer closing the endpoint.
    pub fn close(&self, kind: EndpointKind) -> bool {
        self.fire(kind, |hooks| hooks.on_close())
    }

    fn fire(&self, kind: EndpointKind, f: impl FnOnce(&dyn EndpointHooks)) -> bool {
        // Hooks take the session locks; never call them under ours.
        let hooks = self.inner.lock().live.get(&kind).cloned().flatten();
        match hooks {
            Some(hooks) => {
                f(hooks.as_ref());
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for RecordingSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rec = self.inner.lock();
        f.debug_struct("RecordingSink")
            .field("registrations", &rec.registrations.len())
            .field("live", &rec.live.len())
            .finish_non_exhaustive()
    }
}

impl InputSink for RecordingSink {
    fn register(
        &self,
        descriptor: EndpointDescriptor,
        hooks: Option<Arc<dyn EndpointHooks>>,
    ) -> DriverResult<Box<dyn EndpointHandle>> {
        let kind = descriptor.kind;
        let mut rec = self.inner.lock();
        if rec.failing.contains(&kind) {
            return Err(DriverError::resource(format!(
                "{kind:?} endpoint registration refused"
            )));
        }
        rec.registrations.push(descriptor);
        rec.live.insert(kind, hooks);
        Ok(Box::new(RecordingHandle {
            kind,
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct RecordingHandle {
    kind: EndpointKind,
    inner: Arc<Mutex<Recorded>>,
}

impl EndpointHandle for RecordingHandle {
    fn emit(&self, events: &[InputEvent]) {
        self.inner
            .lock()
            .events
            .entry(self.kind)
            .or_default()
            .push(events.to_vec());
    }

    fn unregister(self: Box<Self>) {
        let mut rec = self.inner.lock();
        rec.live.remove(&self.kind);
        let count = rec.unregistered.entry(self.kind).or_default();
        *count = count.saturating_add(1);
    }
}
