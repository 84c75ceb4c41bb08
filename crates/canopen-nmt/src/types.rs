use core::convert::TryFrom;
use core::fmt;

// --- Primitive Types (Based on CiA 301 Section 7.1) ---
// These aliases ensure compatibility with object dictionary definitions (UNSIGNEDn)

/// Alias for UNSIGNED8 (8-bit unsigned integer)
pub type UNSIGNED8 = u8;
/// Alias for UNSIGNED16 (16-bit unsigned integer)
pub type UNSIGNED16 = u16;
/// Alias for UNSIGNED32 (32-bit unsigned integer)
pub type UNSIGNED32 = u32;

/// Represents a CANopen Node-ID, wrapping a `u8` to ensure type safety.
///
/// Valid Node-IDs are in the range 1-127. The value 0 is the broadcast
/// wildcard in NMT command addressing and must never be assigned to a real
/// device. This newtype pattern prevents accidental use of invalid `u8`
/// values where a `NodeId` is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u8);

// --- Protocol Constants ---

/// Target node id addressing all nodes in an NMT command frame (0).
pub const C_ADR_BROADCAST_NODE_ID: u8 = 0;

/// Maximum Node-ID available for regular devices (127).
pub const C_ADR_MAX_NODE_ID: u8 = 127;

/// Default CAN identifier of the NMT service (000h).
pub const C_COB_ID_NMT_SERVICE: u16 = 0x000;

/// Base CAN identifier of the Heartbeat protocol (700h + Node-ID).
pub const C_COB_ID_HEARTBEAT_BASE: u16 = 0x700;

impl NodeId {
    /// Returns the CAN identifier this node produces Heartbeat frames on.
    pub fn heartbeat_cob_id(&self) -> u16 {
        C_COB_ID_HEARTBEAT_BASE + u16::from(self.0)
    }
}

/// Error type for invalid Node-ID creation.
#[derive(Debug, PartialEq, Eq)]
pub enum NodeIdError {
    /// Node-ID is outside the valid range (1-127).
    InvalidRange(u8),
}

impl fmt::Display for NodeIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeIdError::InvalidRange(value) => write!(
                f,
                "Invalid NodeId value: {}. Valid range is 1-127.",
                value
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NodeIdError {}

impl TryFrom<u8> for NodeId {
    type Error = NodeIdError;

    /// Creates a `NodeId` from a `u8`, returning an error if the value is not
    /// a valid CANopen device address.
    ///
    /// Valid IDs are 1-127. 0 is reserved for broadcast addressing.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=C_ADR_MAX_NODE_ID => Ok(NodeId(value)),
            _ => Err(NodeIdError::InvalidRange(value)),
        }
    }
}

impl From<NodeId> for u8 {
    /// Converts a `NodeId` back into its underlying `u8` representation.
    /// This conversion is infallible.
    fn from(node_id: NodeId) -> Self {
        node_id.0
    }
}
