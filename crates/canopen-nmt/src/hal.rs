use crate::types::NodeIdError;
use core::fmt;

/// Defines a portable, descriptive Error type for the NMT stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanopenError {
    /// The provided buffer is too small for the operation.
    BufferTooShort,
    /// An underlying I/O error occurred in the CAN driver.
    IoError,
    /// A value in the frame is not a valid NMT command specifier.
    InvalidNmtCommand(u8),
    /// A value in the frame is not a valid NMT state.
    InvalidNmtState(u8),
    /// A value is not a valid NodeId.
    InvalidNodeId(u8),
}

impl fmt::Display for CanopenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooShort => write!(f, "Buffer is too short for the frame"),
            Self::IoError => write!(f, "An underlying I/O error occurred"),
            Self::InvalidNmtCommand(v) => write!(f, "Invalid NMT command specifier: {v:#04x}"),
            Self::InvalidNmtState(v) => write!(f, "Invalid NMT state value: {v:#04x}"),
            Self::InvalidNodeId(v) => write!(f, "Invalid NodeId value: {v}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CanopenError {}

impl From<NodeIdError> for CanopenError {
    fn from(err: NodeIdError) -> Self {
        match err {
            NodeIdError::InvalidRange(val) => CanopenError::InvalidNodeId(val),
        }
    }
}

/// Hardware Abstraction Layer (HAL) for CAN frame transmission.
///
/// This trait abstracts the physical sending of CAN frames, enabling the core
/// NMT logic to remain platform-agnostic (no_std). Transmission is
/// fire-and-forget into the driver's queue; backpressure and arbitration are
/// the driver's concern.
pub trait CanInterface {
    /// Queues a frame for transmission on the bus.
    ///
    /// `cob_id`: The 11-bit CAN identifier of the frame.
    /// `data`: The frame payload (0-8 bytes).
    fn transmit(&mut self, cob_id: u16, data: &[u8]) -> Result<(), CanopenError>;
}

/// A protocol object fed by the driver's receive filter.
///
/// The driver registers one consumer per CAN identifier it filters on and
/// invokes `on_frame` for every matching inbound frame. The call may run in
/// interrupt context, so implementations must run to completion without
/// blocking and without taking locks shared with the cyclic path.
pub trait FrameConsumer {
    /// Called with the payload of each matching inbound frame.
    fn on_frame(&self, data: &[u8]);
}
