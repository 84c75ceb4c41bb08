use super::states::NmtState;
use crate::od::{ErrorBehavior, StartupFlags, ERROR_BEHAVIOR_ENTRIES};
use log::{info, warn};

/// Manages the operating state of the node.
///
/// The state machine only decides *which* state is effective; transmitting
/// Heartbeats and notifying the host are the node's job. The requested state
/// always holds the last commanded value, so an error-driven demotion is
/// undone automatically once the error register clears.
#[derive(Debug)]
pub struct NmtStateMachine {
    operating_state: NmtState,
    requested_state: NmtState,
}

impl NmtStateMachine {
    /// Creates a state machine in Initializing, before network boot.
    pub fn new() -> Self {
        NmtStateMachine {
            operating_state: NmtState::Initializing,
            requested_state: NmtState::Initializing,
        }
    }

    /// The currently effective state, as reported in Heartbeat frames.
    pub fn operating_state(&self) -> NmtState {
        self.operating_state
    }

    /// The last commanded state, applied at the next tick.
    pub fn requested_state(&self) -> NmtState {
        self.requested_state
    }

    /// Records a state request from the NMT master.
    pub fn request(&mut self, state: NmtState) {
        self.requested_state = state;
    }

    /// Derives the initial requested state from the startup behaviour object
    /// (0x1F80): self-starting devices go straight to Operational, everything
    /// else waits in PreOperational for the master.
    pub fn boot(&mut self, startup: StartupFlags) {
        self.requested_state = if startup.contains(StartupFlags::START_OPERATIONAL) {
            NmtState::Operational
        } else {
            NmtState::PreOperational
        };
    }

    /// Applies this tick's effective target state.
    ///
    /// `degraded` is the error-policy target for this tick, if any; it
    /// overrides the requested state only when stricter, and only for this
    /// tick. Returns the `(previous, next)` pair when a transition happened
    /// so the caller can notify the host before acting on the new state.
    pub fn apply(&mut self, degraded: Option<NmtState>) -> Option<(NmtState, NmtState)> {
        let mut target = self.requested_state;
        if let Some(degraded) = degraded {
            target = stricter(target, degraded);
        }
        if target == self.operating_state {
            return None;
        }
        let previous = self.operating_state;
        self.operating_state = target;
        info!("[NMT] state change: {:?} -> {:?}", previous, target);
        Some((previous, target))
    }
}

impl Default for NmtStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the autonomous degraded-state target from the error register
/// (0x1001) and the error behaviour table (0x1029).
///
/// Bit `i` of the error register selects table slot `i`. When several bits
/// match, the most restrictive prescribed state wins. Returns `None` when no
/// active error class prescribes a transition.
pub fn degraded_target(
    error_register: u8,
    table: &[u8; ERROR_BEHAVIOR_ENTRIES],
) -> Option<NmtState> {
    let mut target: Option<NmtState> = None;
    for (slot, raw) in table.iter().enumerate() {
        if error_register & (1 << slot) == 0 {
            continue;
        }
        let behavior = ErrorBehavior::from_byte(*raw).unwrap_or_else(|| {
            warn!("[NMT] unknown error behaviour value {raw:#04x} in slot {slot}, treating as no change");
            ErrorBehavior::NoStateChange
        });
        let candidate = match behavior {
            ErrorBehavior::NoStateChange => continue,
            ErrorBehavior::ChangeToPreOperational => NmtState::PreOperational,
            ErrorBehavior::ChangeToStopped => NmtState::Stopped,
        };
        target = Some(match target {
            None => candidate,
            Some(current) => stricter(current, candidate),
        });
    }
    target
}

/// Restrictiveness ordering used by the error policy: Stopped curtails more
/// services than PreOperational, which curtails more than Operational.
fn severity(state: NmtState) -> u8 {
    match state {
        NmtState::Initializing => 0,
        NmtState::Operational => 1,
        NmtState::PreOperational => 2,
        NmtState::Stopped => 3,
    }
}

/// Returns the more restrictive of two states.
pub(crate) fn stricter(a: NmtState, b: NmtState) -> NmtState {
    if severity(b) > severity(a) {
        b
    } else {
        a
    }
}
