//! Connection state machine.
//!
//! Only connection event reports move the machine. A transition into
//! `Connected` asks for an init job and a transition into `Disconnected` asks
//! for a teardown job; repeated events in the same direction ask for nothing.

use hid_steam_controller_protocol::{ConnectionEvent, Topology};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Deferred work a transition calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Initialize,
    Teardown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionMachine {
    state: ConnectionState,
}

impl ConnectionMachine {
    /// Wired controllers start connected; a receiver starts disconnected
    /// until it reports otherwise.
    pub const fn for_topology(topology: Topology) -> Self {
        let state = match topology {
            Topology::Wired => ConnectionState::Connected,
            Topology::Receiver => ConnectionState::Disconnected,
        };
        Self { state }
    }

    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    pub const fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected)
    }

    /// Apply a connection event. O(1), no side effects beyond the state.
    pub fn apply(&mut self, event: ConnectionEvent) -> Option<Transition> {
        match (self.state, event) {
            (ConnectionState::Connected, ConnectionEvent::Disconnected) => {
                self.state = ConnectionState::Disconnected;
                Some(Transition::Teardown)
            }
            (ConnectionState::Disconnected, ConnectionEvent::Connected) => {
                self.state = ConnectionState::Connected;
                Some(Transition::Initialize)
            }
            _ => None,
        }
    }
}
