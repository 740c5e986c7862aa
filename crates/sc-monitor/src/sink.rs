//! Input sink that prints what the session publishes.

use std::sync::Arc;

use hid_steam_controller_protocol::InputEvent;
use serde::Serialize;
use steam_controller_driver::{
    DriverResult, EndpointDescriptor, EndpointHandle, EndpointHooks, EndpointKind, InputSink,
};
use tracing::{info, warn};

/// Output line for one report delivered to one endpoint.
#[derive(Debug, Serialize)]
pub struct EventLine<'a> {
    pub endpoint: EndpointKind,
    pub events: &'a [InputEvent],
}

impl EventLine<'_> {
    pub fn render(&self, json: bool) -> anyhow::Result<String> {
        if json {
            return Ok(serde_json::to_string(self)?);
        }
        let events: Vec<String> = self.events.iter().map(ToString::to_string).collect();
        Ok(format!("{:?}: {}", self.endpoint, events.join(" ")))
    }
}

/// Prints every event batch to stdout.
///
/// With `open_motion` set the monitor acts as a consumer of the motion
/// endpoint, which powers the controller's motion sensors.
#[derive(Debug, Clone, Copy)]
pub struct PrintingSink {
    pub json: bool,
    pub open_motion: bool,
}

impl InputSink for PrintingSink {
    fn register(
        &self,
        descriptor: EndpointDescriptor,
        hooks: Option<Arc<dyn EndpointHooks>>,
    ) -> DriverResult<Box<dyn EndpointHandle>> {
        info!(
            "Endpoint '{}' ({:?}) appeared, uniq '{}'",
            descriptor.name, descriptor.kind, descriptor.identity.uniq
        );
        if let Some(hooks) = hooks.filter(|_| self.open_motion) {
            hooks.on_open();
        }
        Ok(Box::new(PrintingHandle {
            kind: descriptor.kind,
            json: self.json,
        }))
    }
}

struct PrintingHandle {
    kind: EndpointKind,
    json: bool,
}

impl EndpointHandle for PrintingHandle {
    fn emit(&self, events: &[InputEvent]) {
        let line = EventLine {
            endpoint: self.kind,
            events,
        };
        match line.render(self.json) {
            Ok(text) => println!("{text}"),
            Err(e) => warn!("Failed to render {:?} events: {}", self.kind, e),
        }
    }

    fn unregister(self: Box<Self>) {
        info!("Endpoint {:?} removed", self.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hid_steam_controller_protocol::{Axis, Button};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn human_line_lists_events() -> TestResult {
        let events = [
            InputEvent::abs(Axis::X, 100),
            InputEvent::key(Button::South, true),
        ];
        let line = EventLine {
            endpoint: EndpointKind::Primary,
            events: &events,
        };
        assert_eq!(line.render(false)?, "Primary: X=100 South down");
        Ok(())
    }

    #[test]
    fn json_line_names_endpoint() -> TestResult {
        let events = [InputEvent::abs(Axis::Rz, -3)];
        let line = EventLine {
            endpoint: EndpointKind::Motion,
            events: &events,
        };
        let value: serde_json::Value = serde_json::from_str(&line.render(true)?)?;
        assert_eq!(value.get("endpoint").and_then(|v| v.as_str()), Some("Motion"));
        assert_eq!(
            value.get("events").and_then(|v| v.as_array()).map(Vec::len),
            Some(1)
        );
        Ok(())
    }
}
