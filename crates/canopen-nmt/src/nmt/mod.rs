//! Network management: operating states, the state machine driving them, the
//! Heartbeat producer and the cross-context command mailbox.

pub mod heartbeat;
pub mod mailbox;
pub mod state_machine;
pub mod states;

pub use heartbeat::HeartbeatProducer;
pub use mailbox::NmtMailbox;
pub use state_machine::NmtStateMachine;
pub use states::{NmtCommand, NmtState, ResetDirective};
