#![cfg_attr(not(feature = "std"), no_std)]

// 'alloc' is used for the shared command mailbox (Arc) and the boxed
// state-change callback.
extern crate alloc;

// --- Foundation Modules ---
pub mod types;
pub mod hal;
pub mod od;

// --- Wire Layer ---
pub mod frame;

// --- Network Management ---
pub mod nmt;

// --- Node Abstraction ---
pub mod node;

// --- Top-level Exports ---
pub use types::NodeId;
pub use hal::{CanInterface, CanopenError, FrameConsumer};
pub use od::{ErrorBehavior, NmtConfig, StartupFlags};
pub use frame::{Codec, HeartbeatFrame, NmtCommandFrame};
pub use nmt::states::{NmtCommand, NmtState, ResetDirective};
pub use node::{NmtNode, NmtReceiver, ProcessResult, StateChangeCallback};
