//! Valve vendor ID and Steam Controller product IDs.
//!
//! Both topologies expose several HID interfaces (keyboard, mouse and the
//! vendor-defined controller interface). Only the vendor-defined one carries
//! controller data; see [`crate::signature`].

/// Valve Corporation USB vendor ID.
pub const STEAM_VENDOR_ID: u16 = 0x28DE;

pub mod product_ids {
    /// Controller plugged in over USB.
    pub const WIRED: u16 = 0x1102;
    /// Wireless dongle; the controller pairs and unpairs behind it.
    pub const RECEIVER: u16 = 0x1142;
}

/// How the controller reaches the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Topology {
    /// Always connected while the interface exists.
    Wired,
    /// Connection state is reported asynchronously by the receiver.
    Receiver,
}

impl Topology {
    pub const fn from_product_id(product_id: u16) -> Option<Self> {
        match product_id {
            product_ids::WIRED => Some(Self::Wired),
            product_ids::RECEIVER => Some(Self::Receiver),
            _ => None,
        }
    }

    pub const fn product_id(self) -> u16 {
        match self {
            Self::Wired => product_ids::WIRED,
            Self::Receiver => product_ids::RECEIVER,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Wired => "wired",
            Self::Receiver => "receiver",
        }
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_ids_map_to_topologies() {
        assert_eq!(Topology::from_product_id(0x1102), Some(Topology::Wired));
        assert_eq!(Topology::from_product_id(0x1142), Some(Topology::Receiver));
        assert_eq!(Topology::from_product_id(0x1105), None);
    }

    #[test]
    fn topology_round_trips_product_id() {
        for topology in [Topology::Wired, Topology::Receiver] {
            assert_eq!(
                Topology::from_product_id(topology.product_id()),
                Some(topology)
            );
        }
    }
}
