use crate::frame::{Codec, HeartbeatFrame, HEARTBEAT_FRAME_SIZE, NmtCommandFrame};
use crate::hal::{CanInterface, CanopenError, FrameConsumer};
use crate::nmt::mailbox::NmtMailbox;
use crate::nmt::state_machine::{degraded_target, NmtStateMachine};
use crate::nmt::states::{NmtCommand, NmtState, ResetDirective};
use crate::nmt::HeartbeatProducer;
use crate::od::NmtConfig;
use crate::types::{NodeId, C_ADR_BROADCAST_NODE_ID};
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::convert::TryFrom;
use log::{debug, info, trace, warn};

/// Host callback invoked on every operating-state transition with the
/// `(previous, requested)` pair, before dependent services see the new state.
///
/// The callback runs while the node is mid-tick and must not call back into
/// it.
pub type StateChangeCallback = Box<dyn FnMut(NmtState, NmtState) + Send>;

/// Outcome of one cyclic tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessResult {
    /// Reset handoff for the host. Anything but `NoAction` means the host
    /// must tear this node down and rebuild it.
    pub directive: ResetDirective,
    /// Upper bound in milliseconds on the delay before the next call, when
    /// the Heartbeat producer imposes a deadline.
    pub next_call_ms: Option<u32>,
}

/// Represents the NMT consumer and Heartbeat producer of a single device.
///
/// The node borrows its configuration source for its whole lifetime and is
/// handed the CAN interface on each tick. A communication reset discards and
/// rebuilds the value; no field survives a reset.
pub struct NmtNode<'a> {
    node_id: NodeId,
    nmt_rx_cob_id: u16,
    config: &'a dyn NmtConfig,
    state_machine: NmtStateMachine,
    heartbeat: HeartbeatProducer,
    mailbox: Arc<NmtMailbox>,
    on_state_change: Option<StateChangeCallback>,
}

impl<'a> NmtNode<'a> {
    /// Creates a new NMT node.
    ///
    /// Must be called in the communication reset section. Fails with
    /// [`CanopenError::InvalidNodeId`] when `node_id` is 0 (the broadcast
    /// wildcard) or above 127; the subsystem must not be brought up in that
    /// case.
    pub fn new(
        node_id: u8,
        config: &'a dyn NmtConfig,
        on_state_change: Option<StateChangeCallback>,
        nmt_rx_cob_id: u16,
    ) -> Result<Self, CanopenError> {
        let node_id = NodeId::try_from(node_id)?;
        info!(
            "[NMT] node {} initialised (rx COB-ID {:#05X}, heartbeat COB-ID {:#05X})",
            node_id.0,
            nmt_rx_cob_id,
            node_id.heartbeat_cob_id()
        );
        Ok(Self {
            node_id,
            nmt_rx_cob_id,
            config,
            state_machine: NmtStateMachine::new(),
            heartbeat: HeartbeatProducer::new(),
            mailbox: Arc::new(NmtMailbox::new()),
            on_state_change,
        })
    }

    /// Returns the bus-side receive handle for this node.
    ///
    /// The host registers it with the driver's receive filter for
    /// [`nmt_rx_cob_id`](Self::nmt_rx_cob_id). Clones share the same mailbox
    /// and may be driven from interrupt context concurrently with
    /// [`process`](Self::process).
    pub fn receiver(&self) -> NmtReceiver {
        NmtReceiver {
            node_id: self.node_id,
            mailbox: Arc::clone(&self.mailbox),
        }
    }

    /// Queries the current operating state.
    pub fn operating_state(&self) -> NmtState {
        self.state_machine.operating_state()
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// The CAN identifier this node consumes NMT commands on.
    pub fn nmt_rx_cob_id(&self) -> u16 {
        self.nmt_rx_cob_id
    }

    /// Processes received NMT commands and produces Heartbeat messages.
    ///
    /// Must be called cyclically by the host with the elapsed time since the
    /// previous call. Runs to completion; a reset directive in the result is
    /// the only way processing stops early.
    pub fn process(&mut self, can: &mut dyn CanInterface, time_difference_ms: u32) -> ProcessResult {
        // A pending reset takes priority over everything else this tick: the
        // host is about to tear the subsystem down.
        if let Some(directive) = self.mailbox.take_reset() {
            info!("[NMT] handing {:?} to the host", directive);
            return ProcessResult {
                directive,
                next_call_ms: None,
            };
        }

        // Drain the command mailbox into the state machine.
        if let Some(state) = self.mailbox.take_requested_state() {
            debug!("[NMT] master requested {:?}", state);
            self.state_machine.request(state);
        }

        // First tick after initialisation: announce ourselves with the
        // boot-up message, then derive the startup state from 0x1F80.
        if self.state_machine.operating_state() == NmtState::Initializing {
            self.send_heartbeat(can);
            self.state_machine.boot(self.config.nmt_startup());
        }

        // Error-register policy, computed fresh each tick so it never
        // outlives the error condition.
        let degraded = self
            .config
            .error_behavior()
            .and_then(|table| degraded_target(self.config.error_register(), &table));

        if let Some((previous, requested)) = self.state_machine.apply(degraded) {
            if let Some(callback) = self.on_state_change.as_mut() {
                callback(previous, requested);
            }
        }

        // Heartbeat production.
        let period_ms = self.config.heartbeat_time_ms();
        if self.heartbeat.advance(time_difference_ms, period_ms) {
            self.send_heartbeat(can);
            self.heartbeat.mark_sent();
        }

        ProcessResult {
            directive: ResetDirective::NoAction,
            next_call_ms: self.heartbeat.time_to_next(period_ms),
        }
    }

    /// Fire-and-forget Heartbeat transmission carrying the current operating
    /// state. Transport failures are the driver's concern; they are logged
    /// and the producer carries on.
    fn send_heartbeat(&self, can: &mut dyn CanInterface) {
        let frame = HeartbeatFrame::new(self.state_machine.operating_state());
        let mut buf = [0u8; HEARTBEAT_FRAME_SIZE];
        match frame.serialize(&mut buf) {
            Ok(len) => {
                trace!(
                    "[NMT] heartbeat: state {:?} on COB-ID {:#05X}",
                    frame.state,
                    self.node_id.heartbeat_cob_id()
                );
                if let Err(e) = can.transmit(self.node_id.heartbeat_cob_id(), &buf[..len]) {
                    warn!("[NMT] heartbeat transmit failed: {}", e);
                }
            }
            Err(e) => warn!("[NMT] could not serialize heartbeat: {}", e),
        }
    }
}

/// The bus-side entry point of the NMT consumer.
///
/// Invoked by the driver's receive filter once per inbound NMT frame,
/// possibly in interrupt context. It only ever decodes, filters by node id
/// and posts into the shared mailbox; everything else happens under the
/// cyclic processor's control.
#[derive(Clone)]
pub struct NmtReceiver {
    node_id: NodeId,
    mailbox: Arc<NmtMailbox>,
}

impl NmtReceiver {
    /// True when the frame addresses this node directly or via broadcast.
    fn addressed_to_us(&self, target: u8) -> bool {
        target == C_ADR_BROADCAST_NODE_ID || target == self.node_id.0
    }
}

impl FrameConsumer for NmtReceiver {
    fn on_frame(&self, data: &[u8]) {
        let frame = match NmtCommandFrame::deserialize(data) {
            Ok(frame) => frame,
            // Malformed and unknown-command frames are expected traffic on a
            // shared bus; drop them quietly.
            Err(e) => {
                trace!("[NMT] ignoring frame: {}", e);
                return;
            }
        };
        if !self.addressed_to_us(frame.target) {
            trace!(
                "[NMT] ignoring command for node {} (we are {})",
                frame.target,
                self.node_id.0
            );
            return;
        }
        match frame.command {
            NmtCommand::ResetNode => self.mailbox.post_reset(ResetDirective::ApplicationReset),
            NmtCommand::ResetCommunication => {
                self.mailbox.post_reset(ResetDirective::CommunicationReset)
            }
            command => {
                if let Some(state) = command.requested_state() {
                    self.mailbox.post_requested_state(state);
                }
            }
        }
        debug!("[NMT] accepted {:?} (target {})", frame.command, frame.target);
    }
}
