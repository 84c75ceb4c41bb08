use crate::types::{UNSIGNED16, UNSIGNED32};

/// Heartbeat producer timing, driven by the producer heartbeat time object
/// (0x1017).
///
/// The producer only accumulates elapsed time; reading the period fresh from
/// the dictionary every tick is the caller's job, so a period change takes
/// effect immediately.
#[derive(Debug)]
pub struct HeartbeatProducer {
    elapsed_ms: UNSIGNED32,
}

impl HeartbeatProducer {
    pub fn new() -> Self {
        HeartbeatProducer { elapsed_ms: 0 }
    }

    /// Advances the accumulator by the elapsed time since the previous tick.
    /// Returns true when a Heartbeat is due under the given period; a period
    /// of 0 disables the producer.
    pub fn advance(&mut self, time_difference_ms: UNSIGNED32, period_ms: UNSIGNED16) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(time_difference_ms);
        period_ms > 0 && self.elapsed_ms >= UNSIGNED32::from(period_ms)
    }

    /// Restarts the interval after a transmission.
    pub fn mark_sent(&mut self) {
        self.elapsed_ms = 0;
    }

    /// Time until the next Heartbeat is due, used as the host's call-again
    /// hint. `None` when the producer is disabled: no deadline to meet.
    pub fn time_to_next(&self, period_ms: UNSIGNED16) -> Option<UNSIGNED32> {
        if period_ms == 0 {
            None
        } else {
            Some(UNSIGNED32::from(period_ms).saturating_sub(self.elapsed_ms))
        }
    }

    /// Accumulated time since the last transmission.
    pub fn elapsed_ms(&self) -> UNSIGNED32 {
        self.elapsed_ms
    }
}

impl Default for HeartbeatProducer {
    fn default() -> Self {
        Self::new()
    }
}
