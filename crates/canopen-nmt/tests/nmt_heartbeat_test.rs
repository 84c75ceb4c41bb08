// crates/canopen-nmt/tests/nmt_heartbeat_test.rs
//
// End-to-end scenarios driving an NmtNode through its receiver and cyclic
// processor with a recorded bus and a runtime-mutable configuration source.

use canopen_nmt::{
    CanInterface, CanopenError, Codec, FrameConsumer, HeartbeatFrame, NmtCommand, NmtCommandFrame,
    NmtConfig, NmtNode, NmtState, ResetDirective, StartupFlags,
};
use canopen_nmt::od::ERROR_BEHAVIOR_ENTRIES;
use canopen_nmt::types::C_COB_ID_NMT_SERVICE;
use std::cell::Cell;
use std::sync::{Arc, Mutex};

// --- Mock collaborators ---

/// Dictionary view whose values the test can flip between ticks, the way
/// other services write the real dictionary.
struct MockDictionary {
    heartbeat_ms: Cell<u16>,
    startup: Cell<StartupFlags>,
    error_register: Cell<u8>,
    error_behavior: Cell<Option<[u8; ERROR_BEHAVIOR_ENTRIES]>>,
}

impl MockDictionary {
    fn new() -> Self {
        MockDictionary {
            heartbeat_ms: Cell::new(0),
            startup: Cell::new(StartupFlags::empty()),
            error_register: Cell::new(0),
            error_behavior: Cell::new(None),
        }
    }
}

impl NmtConfig for MockDictionary {
    fn heartbeat_time_ms(&self) -> u16 {
        self.heartbeat_ms.get()
    }
    fn nmt_startup(&self) -> StartupFlags {
        self.startup.get()
    }
    fn error_register(&self) -> u8 {
        self.error_register.get()
    }
    fn error_behavior(&self) -> Option<[u8; ERROR_BEHAVIOR_ENTRIES]> {
        self.error_behavior.get()
    }
}

#[derive(Default)]
struct RecordingBus {
    frames: Vec<(u16, Vec<u8>)>,
}

impl RecordingBus {
    fn heartbeat_states(&self) -> Vec<NmtState> {
        self.frames
            .iter()
            .map(|(_, data)| HeartbeatFrame::deserialize(data).unwrap().state)
            .collect()
    }
}

impl CanInterface for RecordingBus {
    fn transmit(&mut self, cob_id: u16, data: &[u8]) -> Result<(), CanopenError> {
        self.frames.push((cob_id, data.to_vec()));
        Ok(())
    }
}

type TransitionLog = Arc<Mutex<Vec<(NmtState, NmtState)>>>;

fn transition_recorder() -> (TransitionLog, canopen_nmt::StateChangeCallback) {
    let log: TransitionLog = Arc::new(Mutex::new(Vec::new()));
    let writer = Arc::clone(&log);
    let callback: canopen_nmt::StateChangeCallback = Box::new(move |previous, requested| {
        writer.lock().unwrap().push((previous, requested));
    });
    (log, callback)
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds the wire payload the master would send.
fn master_command(command: NmtCommand, target: u8) -> [u8; 2] {
    let mut buf = [0u8; 2];
    NmtCommandFrame::new(command, target).serialize(&mut buf).unwrap();
    buf
}

// --- Scenarios ---

#[test]
fn boots_to_preoperational_and_reports_the_transition() {
    init_logger();
    let dictionary = MockDictionary::new();
    let (log, callback) = transition_recorder();
    let mut node = NmtNode::new(10, &dictionary, Some(callback), C_COB_ID_NMT_SERVICE).unwrap();
    let mut bus = RecordingBus::default();

    node.process(&mut bus, 0);

    assert_eq!(node.operating_state(), NmtState::PreOperational);
    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[(NmtState::Initializing, NmtState::PreOperational)]
    );
    // The boot-up message went out before the transition.
    assert_eq!(bus.heartbeat_states(), vec![NmtState::Initializing]);
    assert_eq!(bus.frames[0].0, 0x70A);
}

#[test]
fn boots_straight_to_operational_when_self_starting() {
    init_logger();
    let dictionary = MockDictionary::new();
    dictionary.startup.set(StartupFlags::START_OPERATIONAL);
    let (log, callback) = transition_recorder();
    let mut node = NmtNode::new(10, &dictionary, Some(callback), C_COB_ID_NMT_SERVICE).unwrap();
    let mut bus = RecordingBus::default();

    node.process(&mut bus, 0);

    assert_eq!(node.operating_state(), NmtState::Operational);
    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[(NmtState::Initializing, NmtState::Operational)]
    );
}

#[test]
fn master_commands_take_effect_on_the_next_tick() {
    init_logger();
    let dictionary = MockDictionary::new();
    let (log, callback) = transition_recorder();
    let mut node = NmtNode::new(10, &dictionary, Some(callback), C_COB_ID_NMT_SERVICE).unwrap();
    let receiver = node.receiver();
    let mut bus = RecordingBus::default();
    node.process(&mut bus, 0);
    log.lock().unwrap().clear();

    receiver.on_frame(&master_command(NmtCommand::EnterOperational, 10));
    // Nothing happens until the node's own tick runs.
    assert_eq!(node.operating_state(), NmtState::PreOperational);

    node.process(&mut bus, 0);
    assert_eq!(node.operating_state(), NmtState::Operational);

    receiver.on_frame(&master_command(NmtCommand::EnterStopped, 10));
    node.process(&mut bus, 0);
    assert_eq!(node.operating_state(), NmtState::Stopped);

    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[
            (NmtState::PreOperational, NmtState::Operational),
            (NmtState::Operational, NmtState::Stopped),
        ]
    );
}

#[test]
fn commands_for_other_nodes_are_ignored() {
    init_logger();
    let dictionary = MockDictionary::new();
    let (log, callback) = transition_recorder();
    let mut node = NmtNode::new(10, &dictionary, Some(callback), C_COB_ID_NMT_SERVICE).unwrap();
    let receiver = node.receiver();
    let mut bus = RecordingBus::default();
    node.process(&mut bus, 0);
    log.lock().unwrap().clear();

    receiver.on_frame(&master_command(NmtCommand::EnterOperational, 11));
    receiver.on_frame(&master_command(NmtCommand::ResetNode, 11));
    let result = node.process(&mut bus, 0);

    assert_eq!(node.operating_state(), NmtState::PreOperational);
    assert_eq!(result.directive, ResetDirective::NoAction);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn heartbeats_follow_the_configured_period() {
    init_logger();
    let dictionary = MockDictionary::new();
    dictionary.heartbeat_ms.set(1000);
    let mut node = NmtNode::new(10, &dictionary, None, C_COB_ID_NMT_SERVICE).unwrap();
    let mut bus = RecordingBus::default();
    node.process(&mut bus, 0); // boot-up message
    bus.frames.clear();

    node.process(&mut bus, 400);
    node.process(&mut bus, 400);
    node.process(&mut bus, 400);

    // 1200 ms crossed the 1000 ms period exactly once.
    assert_eq!(bus.heartbeat_states(), vec![NmtState::PreOperational]);

    // The accumulator restarted after the transmission: the next beat needs
    // another full period.
    bus.frames.clear();
    node.process(&mut bus, 999);
    assert!(bus.frames.is_empty());
    node.process(&mut bus, 1);
    assert_eq!(bus.heartbeat_states(), vec![NmtState::PreOperational]);
}

#[test]
fn zero_period_disables_the_heartbeat_producer() {
    init_logger();
    let dictionary = MockDictionary::new();
    let mut node = NmtNode::new(10, &dictionary, None, C_COB_ID_NMT_SERVICE).unwrap();
    let mut bus = RecordingBus::default();
    node.process(&mut bus, 0);
    bus.frames.clear();

    for _ in 0..50 {
        let result = node.process(&mut bus, 10_000);
        assert_eq!(result.next_call_ms, None);
    }
    assert!(bus.frames.is_empty());
}

#[test]
fn reset_node_yields_one_application_reset_directive() {
    init_logger();
    let dictionary = MockDictionary::new();
    let mut node = NmtNode::new(10, &dictionary, None, C_COB_ID_NMT_SERVICE).unwrap();
    let receiver = node.receiver();
    let mut bus = RecordingBus::default();
    node.process(&mut bus, 0);

    receiver.on_frame(&master_command(NmtCommand::ResetNode, 0));
    assert_eq!(
        node.process(&mut bus, 0).directive,
        ResetDirective::ApplicationReset
    );
    assert_eq!(node.process(&mut bus, 0).directive, ResetDirective::NoAction);
}

#[test]
fn reset_communication_rebuilds_the_node() {
    init_logger();
    let dictionary = MockDictionary::new();
    let mut node = NmtNode::new(10, &dictionary, None, C_COB_ID_NMT_SERVICE).unwrap();
    let receiver = node.receiver();
    let mut bus = RecordingBus::default();
    node.process(&mut bus, 0);

    receiver.on_frame(&master_command(NmtCommand::ResetCommunication, 10));
    assert_eq!(
        node.process(&mut bus, 0).directive,
        ResetDirective::CommunicationReset
    );

    // The host reconstructs the node from scratch; the fresh instance runs
    // the full boot sequence again.
    let mut node = NmtNode::new(10, &dictionary, None, C_COB_ID_NMT_SERVICE).unwrap();
    bus.frames.clear();
    node.process(&mut bus, 0);
    assert_eq!(bus.heartbeat_states(), vec![NmtState::Initializing]);
    assert_eq!(node.operating_state(), NmtState::PreOperational);
}

#[test]
fn error_register_demotes_and_recovers() {
    init_logger();
    let dictionary = MockDictionary::new();
    dictionary.startup.set(StartupFlags::START_OPERATIONAL);
    // Bit 0 -> Stopped, bit 1 -> PreOperational.
    dictionary.error_behavior.set(Some([2, 0, 1, 1, 1, 1]));
    let mut node = NmtNode::new(10, &dictionary, None, C_COB_ID_NMT_SERVICE).unwrap();
    let mut bus = RecordingBus::default();
    node.process(&mut bus, 0);
    assert_eq!(node.operating_state(), NmtState::Operational);

    // Both error classes active: the stricter mapping wins.
    dictionary.error_register.set(0b11);
    node.process(&mut bus, 0);
    assert_eq!(node.operating_state(), NmtState::Stopped);

    // Only the pre-operational class remains.
    dictionary.error_register.set(0b10);
    node.process(&mut bus, 0);
    assert_eq!(node.operating_state(), NmtState::PreOperational);

    // Errors cleared: the commanded state returns without a new command.
    dictionary.error_register.set(0);
    node.process(&mut bus, 0);
    assert_eq!(node.operating_state(), NmtState::Operational);
}

#[test]
fn heartbeat_payload_tracks_the_operating_state() {
    init_logger();
    let dictionary = MockDictionary::new();
    dictionary.heartbeat_ms.set(100);
    dictionary.startup.set(StartupFlags::START_OPERATIONAL);
    let mut node = NmtNode::new(10, &dictionary, None, C_COB_ID_NMT_SERVICE).unwrap();
    let receiver = node.receiver();
    let mut bus = RecordingBus::default();
    node.process(&mut bus, 0);
    bus.frames.clear();

    node.process(&mut bus, 100);
    receiver.on_frame(&master_command(NmtCommand::EnterStopped, 10));
    node.process(&mut bus, 100);

    assert_eq!(
        bus.heartbeat_states(),
        vec![NmtState::Operational, NmtState::Stopped]
    );
}

#[test]
fn idle_ticks_are_idempotent() {
    init_logger();
    let dictionary = MockDictionary::new();
    dictionary.heartbeat_ms.set(1000);
    let (log, callback) = transition_recorder();
    let mut node = NmtNode::new(10, &dictionary, Some(callback), C_COB_ID_NMT_SERVICE).unwrap();
    let mut bus = RecordingBus::default();
    node.process(&mut bus, 0);
    bus.frames.clear();
    log.lock().unwrap().clear();

    for _ in 0..100 {
        let result = node.process(&mut bus, 0);
        assert_eq!(result.directive, ResetDirective::NoAction);
        assert_eq!(result.next_call_ms, Some(1000));
    }

    assert_eq!(node.operating_state(), NmtState::PreOperational);
    assert!(bus.frames.is_empty());
    assert!(log.lock().unwrap().is_empty());
}
