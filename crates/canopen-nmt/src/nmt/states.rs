//! Wire-level NMT enumerations.
//!
//! The numeric encodings are interoperability-critical, so they live in
//! explicit `to_byte`/`from_byte` mapping tables rather than in enum
//! discriminants: reordering or extending a variant cannot silently change
//! what goes on the bus.

/// Operating state of the CANopen device, as reported in Heartbeat frames.
///
/// - Initializing: active before the communication layer is brought up.
/// - PreOperational: all services active except PDO transfer.
/// - Operational: process data objects are active too.
/// - Stopped: only Heartbeat producer and NMT consumer remain active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NmtState {
    Initializing,
    Stopped,
    Operational,
    PreOperational,
}

impl NmtState {
    /// Wire encoding carried in the Heartbeat payload.
    pub fn to_byte(self) -> u8 {
        match self {
            NmtState::Initializing => 0,
            NmtState::Stopped => 4,
            NmtState::Operational => 5,
            NmtState::PreOperational => 127,
        }
    }

    /// Decodes a Heartbeat payload byte.
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(NmtState::Initializing),
            4 => Some(NmtState::Stopped),
            5 => Some(NmtState::Operational),
            127 => Some(NmtState::PreOperational),
            _ => None,
        }
    }
}

/// Command specifiers sent by the NMT master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NmtCommand {
    /// Start the addressed device.
    EnterOperational,
    /// Stop the addressed device.
    EnterStopped,
    /// Put the addressed device into PreOperational.
    EnterPreOperational,
    /// Reset the whole device.
    ResetNode,
    /// Reset the communication layer of the device.
    ResetCommunication,
}

impl NmtCommand {
    /// Wire encoding of the command specifier (byte 0 of the NMT frame).
    pub fn to_byte(self) -> u8 {
        match self {
            NmtCommand::EnterOperational => 1,
            NmtCommand::EnterStopped => 2,
            NmtCommand::EnterPreOperational => 128,
            NmtCommand::ResetNode => 129,
            NmtCommand::ResetCommunication => 130,
        }
    }

    /// Decodes a command specifier byte. Any other value is unknown traffic
    /// and must be discarded by the caller.
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            1 => Some(NmtCommand::EnterOperational),
            2 => Some(NmtCommand::EnterStopped),
            128 => Some(NmtCommand::EnterPreOperational),
            129 => Some(NmtCommand::ResetNode),
            130 => Some(NmtCommand::ResetCommunication),
            _ => None,
        }
    }

    /// The operating state this command requests, for the three state-switch
    /// commands. Reset commands carry no target state.
    pub fn requested_state(self) -> Option<NmtState> {
        match self {
            NmtCommand::EnterOperational => Some(NmtState::Operational),
            NmtCommand::EnterStopped => Some(NmtState::Stopped),
            NmtCommand::EnterPreOperational => Some(NmtState::PreOperational),
            NmtCommand::ResetNode | NmtCommand::ResetCommunication => None,
        }
    }
}

/// Return code of the cyclic tick that tells the host what to reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDirective {
    /// Normal return, no action.
    NoAction,
    /// The host must reset the communication layer (rebuild the node).
    CommunicationReset,
    /// The host must perform a complete device reset.
    ApplicationReset,
    /// The host wants to terminate. Never produced by the protocol logic.
    Quit,
}

impl ResetDirective {
    /// Numeric code handed to host glue (0-3).
    pub fn to_byte(self) -> u8 {
        match self {
            ResetDirective::NoAction => 0,
            ResetDirective::CommunicationReset => 1,
            ResetDirective::ApplicationReset => 2,
            ResetDirective::Quit => 3,
        }
    }

    /// Decodes a directive code.
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(ResetDirective::NoAction),
            1 => Some(ResetDirective::CommunicationReset),
            2 => Some(ResetDirective::ApplicationReset),
            3 => Some(ResetDirective::Quit),
            _ => None,
        }
    }
}
