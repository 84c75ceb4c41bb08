//! The single synchronization boundary of the subsystem.
//!
//! The receive path (interrupt/callback context) posts into this mailbox; the
//! cyclic path drains it. Both slots are word-sized atomics, so neither side
//! ever takes a lock or disables the other.

use super::states::{NmtState, ResetDirective};
use core::sync::atomic::{AtomicU8, Ordering};

/// Sentinel for an empty requested-state slot. Never a valid state encoding.
const STATE_NONE: u8 = 0xFF;

/// Single-slot mailbox carrying the requested state and the pending reset
/// directive from the receive context to the cyclic context.
///
/// A second post before the cyclic side drains the slot overwrites the first;
/// the bus semantics are "latest command wins".
#[derive(Debug)]
pub struct NmtMailbox {
    requested_state: AtomicU8,
    pending_reset: AtomicU8,
}

impl NmtMailbox {
    pub const fn new() -> Self {
        NmtMailbox {
            requested_state: AtomicU8::new(STATE_NONE),
            pending_reset: AtomicU8::new(0),
        }
    }

    /// Posts a requested operating state from the receive context.
    pub fn post_requested_state(&self, state: NmtState) {
        self.requested_state.store(state.to_byte(), Ordering::Release);
    }

    /// Drains the requested-state slot. Returns at most one state per post.
    pub fn take_requested_state(&self) -> Option<NmtState> {
        match self.requested_state.swap(STATE_NONE, Ordering::AcqRel) {
            STATE_NONE => None,
            value => NmtState::from_byte(value),
        }
    }

    /// Posts a reset directive from the receive context.
    pub fn post_reset(&self, directive: ResetDirective) {
        self.pending_reset.store(directive.to_byte(), Ordering::Release);
    }

    /// Drains the pending reset directive, if any. The swap guarantees the
    /// directive is consumed exactly once.
    pub fn take_reset(&self) -> Option<ResetDirective> {
        match self.pending_reset.swap(0, Ordering::AcqRel) {
            0 => None,
            value => ResetDirective::from_byte(value),
        }
    }
}

impl Default for NmtMailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mailbox_yields_nothing() {
        let mailbox = NmtMailbox::new();
        assert_eq!(mailbox.take_requested_state(), None);
        assert_eq!(mailbox.take_reset(), None);
    }

    #[test]
    fn test_requested_state_is_consumed_once() {
        let mailbox = NmtMailbox::new();
        mailbox.post_requested_state(NmtState::Operational);
        assert_eq!(mailbox.take_requested_state(), Some(NmtState::Operational));
        assert_eq!(mailbox.take_requested_state(), None);
    }

    #[test]
    fn test_latest_command_wins() {
        let mailbox = NmtMailbox::new();
        mailbox.post_requested_state(NmtState::Operational);
        mailbox.post_requested_state(NmtState::Stopped);
        assert_eq!(mailbox.take_requested_state(), Some(NmtState::Stopped));
        assert_eq!(mailbox.take_requested_state(), None);
    }

    #[test]
    fn test_reset_directive_is_consumed_once() {
        let mailbox = NmtMailbox::new();
        mailbox.post_reset(ResetDirective::ApplicationReset);
        assert_eq!(mailbox.take_reset(), Some(ResetDirective::ApplicationReset));
        assert_eq!(mailbox.take_reset(), None);
    }

    #[test]
    fn test_slots_are_independent() {
        let mailbox = NmtMailbox::new();
        mailbox.post_requested_state(NmtState::PreOperational);
        mailbox.post_reset(ResetDirective::CommunicationReset);
        assert_eq!(mailbox.take_reset(), Some(ResetDirective::CommunicationReset));
        assert_eq!(
            mailbox.take_requested_state(),
            Some(NmtState::PreOperational)
        );
    }
}
