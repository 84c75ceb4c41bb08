use crate::hal::CanopenError;
use crate::nmt::states::{NmtCommand, NmtState};
use crate::types::C_ADR_BROADCAST_NODE_ID;

/// A trait for objects that can be serialized into and deserialized from a
/// byte buffer.
///
/// Buffers hold the CAN payload only; the CAN identifier is handled by the
/// transport layer.
pub trait Codec: Sized {
    /// Serializes the object into the provided buffer.
    /// Returns the number of bytes written.
    fn serialize(&self, buffer: &mut [u8]) -> Result<usize, CanopenError>;

    /// Deserializes an object from the provided buffer.
    fn deserialize(buffer: &[u8]) -> Result<Self, CanopenError>;
}

/// Payload size of an NMT command frame.
pub const NMT_COMMAND_FRAME_SIZE: usize = 2;
/// Payload size of a Heartbeat frame.
pub const HEARTBEAT_FRAME_SIZE: usize = 1;

/// Represents a complete NMT service frame.
///
/// Byte | Description
/// -----|------------------------------------------
///   0  | Command specifier (`NmtCommand`)
///   1  | Target node id; 0 addresses all nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NmtCommandFrame {
    pub command: NmtCommand,
    /// Raw target address. Deliberately not a `NodeId`: 0 (broadcast) is
    /// valid here and foreign ids pass through untouched.
    pub target: u8,
}

impl NmtCommandFrame {
    /// Creates a command frame addressed to a single node.
    pub fn new(command: NmtCommand, target: u8) -> Self {
        NmtCommandFrame { command, target }
    }

    /// Creates a command frame addressed to all nodes.
    pub fn broadcast(command: NmtCommand) -> Self {
        NmtCommandFrame {
            command,
            target: C_ADR_BROADCAST_NODE_ID,
        }
    }

    /// True when the frame addresses all nodes.
    pub fn is_broadcast(&self) -> bool {
        self.target == C_ADR_BROADCAST_NODE_ID
    }
}

impl Codec for NmtCommandFrame {
    fn serialize(&self, buffer: &mut [u8]) -> Result<usize, CanopenError> {
        if buffer.len() < NMT_COMMAND_FRAME_SIZE {
            return Err(CanopenError::BufferTooShort);
        }
        buffer[0] = self.command.to_byte();
        buffer[1] = self.target;
        Ok(NMT_COMMAND_FRAME_SIZE)
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, CanopenError> {
        if buffer.len() < NMT_COMMAND_FRAME_SIZE {
            return Err(CanopenError::BufferTooShort);
        }
        let command = NmtCommand::from_byte(buffer[0])
            .ok_or(CanopenError::InvalidNmtCommand(buffer[0]))?;
        Ok(NmtCommandFrame {
            command,
            target: buffer[1],
        })
    }
}

/// Represents a Heartbeat frame: a single byte carrying the producer's
/// current operating state. The boot-up message is the same frame carrying
/// the Initializing state (00h).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatFrame {
    pub state: NmtState,
}

impl HeartbeatFrame {
    pub fn new(state: NmtState) -> Self {
        HeartbeatFrame { state }
    }
}

impl Codec for HeartbeatFrame {
    fn serialize(&self, buffer: &mut [u8]) -> Result<usize, CanopenError> {
        if buffer.is_empty() {
            return Err(CanopenError::BufferTooShort);
        }
        buffer[0] = self.state.to_byte();
        Ok(HEARTBEAT_FRAME_SIZE)
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, CanopenError> {
        if buffer.is_empty() {
            return Err(CanopenError::BufferTooShort);
        }
        let state =
            NmtState::from_byte(buffer[0]).ok_or(CanopenError::InvalidNmtState(buffer[0]))?;
        Ok(HeartbeatFrame { state })
    }
}
