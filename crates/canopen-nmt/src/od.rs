//! Read-only view of the object dictionary entries consumed by the NMT layer.
//!
//! The dictionary itself (storage, access control, SDO access) belongs to the
//! host; this module only defines the trait seam and the typed decodings of
//! the four objects the NMT layer reads each cycle.

use crate::types::{UNSIGNED16, UNSIGNED32, UNSIGNED8};
use core::ops::BitOr;

/// Number of slots in the error behaviour object (0x1029).
pub const ERROR_BEHAVIOR_ENTRIES: usize = 6;

/// Read-only access to the dictionary objects driving NMT behaviour.
///
/// Values are re-read on every cyclic tick, so dictionary writes performed by
/// other services take effect without any notification channel.
pub trait NmtConfig {
    /// Producer heartbeat time in milliseconds (object 0x1017).
    /// 0 disables the Heartbeat producer.
    fn heartbeat_time_ms(&self) -> UNSIGNED16;

    /// NMT startup behaviour bitmask (object 0x1F80).
    fn nmt_startup(&self) -> StartupFlags;

    /// Error register (object 0x1001), refreshed by the host.
    fn error_register(&self) -> UNSIGNED8;

    /// Error behaviour table (object 0x1029), raw slot values.
    /// `None` if the object is not present; no autonomous transitions are
    /// computed in that case.
    fn error_behavior(&self) -> Option<[UNSIGNED8; ERROR_BEHAVIOR_ENTRIES]>;
}

/// Represents the NMT startup behaviour from object 0x1F80 as a type-safe
/// bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartupFlags(pub UNSIGNED32);

impl StartupFlags {
    /// When set, the node enters Operational on its own after boot instead of
    /// waiting in PreOperational for an NMT master command.
    pub const START_OPERATIONAL: Self = Self(1 << 2);

    /// Creates a new `StartupFlags` struct from a raw u32 value.
    pub fn from_bits_truncate(bits: UNSIGNED32) -> Self {
        Self(bits)
    }

    /// Checks if all of the specified flags are set.
    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns an empty set of flags.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Inserts the specified flags.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Removes the specified flags.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for StartupFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// One slot of the error behaviour table (object 0x1029).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBehavior {
    /// Enter PreOperational when the corresponding error class is active.
    ChangeToPreOperational,
    /// Keep the current state.
    NoStateChange,
    /// Enter Stopped when the corresponding error class is active.
    ChangeToStopped,
}

impl ErrorBehavior {
    /// Decodes a raw 0x1029 slot value. Unmapped values are `None`; callers
    /// treat them as [`ErrorBehavior::NoStateChange`].
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(ErrorBehavior::ChangeToPreOperational),
            1 => Some(ErrorBehavior::NoStateChange),
            2 => Some(ErrorBehavior::ChangeToStopped),
            _ => None,
        }
    }

    /// Encodes the slot back into its 0x1029 value.
    pub fn to_byte(self) -> u8 {
        match self {
            ErrorBehavior::ChangeToPreOperational => 0,
            ErrorBehavior::NoStateChange => 1,
            ErrorBehavior::ChangeToStopped => 2,
        }
    }
}
