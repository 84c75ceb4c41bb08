//! Defines the NMT service and Heartbeat frame layouts.

pub mod codec;

pub use codec::{Codec, HeartbeatFrame, NmtCommandFrame};
pub use codec::{HEARTBEAT_FRAME_SIZE, NMT_COMMAND_FRAME_SIZE};
