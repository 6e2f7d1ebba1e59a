//! The DFP VDM policy engine router.
//!
//! Receives inbound events (delivered messages and timer expirations) and
//! DPM intents, mutates the per-port state, emits outbound messages through
//! the TCPC driver, and reports every transaction resolution to the DPM.
//!
//! The router is single-threaded and event-driven: each event or intent is
//! processed to completion, at most one transaction is outstanding per
//! plane, and a timer is armed on a plane exactly while a transaction is
//! outstanding there.

mod discovery;
mod modes;
mod uvdm;


use heapless::Vec;
use usbpd_vdm_traits::{ControlMessage, SopTarget, Tcpc};

pub use discovery::DiscoveryState;
pub use modes::ModeState;

use crate::counters::{Counter, CounterType};
use crate::dfp::device_policy_manager::DevicePolicyManager;
use crate::dfp::{Capabilities, IntentError, VdmFailure};
use crate::message::header::{VdmCommand, VdmCommandType, VdmHeader, VdmHeaderStructured};
use crate::message::{DecodedVdm, MAX_OBJECTS, ParseError, VdmMessage};
use crate::timers::{TimerBackend, TimerService, TimerType};

/// An inbound event for the policy engine.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PdEvent {
    /// A received PD message whose first object is a VDM header.
    Received {
        /// The plane the message arrived on.
        sop: SopTarget,
        /// The message's data objects in wire order.
        objects: Vec<u32, MAX_OBJECTS>,
    },
    /// An armed timer expired.
    TimerExpired {
        /// The plane whose timer expired.
        sop: SopTarget,
        /// The expired timer.
        timer: TimerType,
    },
}

/// The kind of transaction outstanding on a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionKind {
    /// Discover-Identity request.
    DiscoverIdentity,
    /// Discover-SVIDs request.
    DiscoverSvids,
    /// Discover-Modes request.
    DiscoverModes,
    /// Enter-Mode request.
    EnterMode,
    /// Exit-Mode request.
    ExitMode,
    /// DisplayPort Status-Update request.
    DpStatus,
    /// DisplayPort Configuration request.
    DpConfig,
    /// Unstructured VDM exchange.
    Uvdm,
    /// Cable soft reset, awaiting the sender-response mechanism.
    CableSoftReset,
}

impl TransactionKind {
    /// The timer class that bounds this transaction.
    fn timer(self) -> TimerType {
        match self {
            TransactionKind::DiscoverIdentity
            | TransactionKind::DiscoverSvids
            | TransactionKind::DiscoverModes
            | TransactionKind::DpStatus
            | TransactionKind::DpConfig => TimerType::VdmResponse,
            TransactionKind::EnterMode => TimerType::VdmModeEntry,
            TransactionKind::ExitMode => TimerType::VdmModeExit,
            TransactionKind::Uvdm => TimerType::UvdmResponse,
            TransactionKind::CableSoftReset => TimerType::SenderResponse,
        }
    }

    /// The structured command whose response resolves this transaction.
    fn expected_command(self) -> Option<VdmCommand> {
        match self {
            TransactionKind::DiscoverIdentity => Some(VdmCommand::DiscoverIdentity),
            TransactionKind::DiscoverSvids => Some(VdmCommand::DiscoverSvids),
            TransactionKind::DiscoverModes => Some(VdmCommand::DiscoverModes),
            TransactionKind::EnterMode => Some(VdmCommand::EnterMode),
            TransactionKind::ExitMode => Some(VdmCommand::ExitMode),
            TransactionKind::DpStatus => Some(VdmCommand::DisplayPortStatus),
            TransactionKind::DpConfig => Some(VdmCommand::DisplayPortConfig),
            // Resolved by unstructured responses or timeout only.
            TransactionKind::Uvdm | TransactionKind::CableSoftReset => None,
        }
    }
}

/// Sticky DPM intents towards the cable, cleared as the router satisfies
/// them. They mean "a check is pending", not "the check succeeded".
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DpmFlags {
    /// Check the cable identity.
    pub check_cable_id: bool,
    /// Check the cable identity on DFP-initiated attach.
    pub check_cable_id_dfp: bool,
}

impl DpmFlags {
    fn any(&self) -> bool {
        self.check_cable_id || self.check_cable_id_dfp
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Per-port mutable state, owned exclusively by the policy engine.
#[derive(Debug)]
pub struct PdPort {
    dpm_flags: DpmFlags,
    discover_id_counter: Counter,
    mode_svid: u16,
    mode_obj_pos: u8,
    pd_wait_sender_response: bool,
    outstanding: [Option<TransactionKind>; 2],
}

impl PdPort {
    fn new() -> Self {
        Self {
            dpm_flags: DpmFlags::default(),
            discover_id_counter: Counter::new(CounterType::DiscoverIdentity),
            mode_svid: 0,
            mode_obj_pos: 0,
            pd_wait_sender_response: false,
            outstanding: [None; 2],
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    /// The transaction outstanding on a plane, if any.
    pub fn outstanding(&self, sop: SopTarget) -> Option<TransactionKind> {
        self.outstanding[sop.index()]
    }

    /// The sticky cable-check flags.
    pub fn dpm_flags(&self) -> DpmFlags {
        self.dpm_flags
    }

    /// Whether a cable soft reset awaits the sender-response mechanism.
    pub fn wait_sender_response(&self) -> bool {
        self.pd_wait_sender_response
    }

    /// The (SVID, object position) pair targeted by the mode negotiator.
    pub fn mode_target(&self) -> (u16, u8) {
        (self.mode_svid, self.mode_obj_pos)
    }
}

/// A resolved response, as handed to the per-component resolution handlers.
enum Outcome<'a> {
    /// An ACK with its header and payload VDOs.
    Ack {
        header: VdmHeaderStructured,
        vdos: &'a [u32],
    },
    /// NAK, BSY, timeout or malformed response.
    Fail(VdmFailure),
}

/// Implementation of the DFP VDM policy engine.
#[derive(Debug)]
pub struct Dfp<TCPC: Tcpc, TIMER: TimerBackend, DPM: DevicePolicyManager> {
    tcpc: TCPC,
    timers: TimerService<TIMER>,
    device_policy_manager: DPM,
    capabilities: Capabilities,
    port: PdPort,
    discovery: [DiscoveryState; 2],
    mode: ModeState,
}

impl<TCPC: Tcpc, TIMER: TimerBackend, DPM: DevicePolicyManager> Dfp<TCPC, TIMER, DPM> {
    /// Create a new policy engine with default capabilities.
    pub fn new(tcpc: TCPC, timer_backend: TIMER, device_policy_manager: DPM) -> Self {
        Self::new_with_capabilities(tcpc, timer_backend, device_policy_manager, Capabilities::default())
    }

    /// Create a new policy engine with explicit capabilities.
    pub fn new_with_capabilities(
        tcpc: TCPC,
        timer_backend: TIMER,
        device_policy_manager: DPM,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            tcpc,
            timers: TimerService::new(timer_backend),
            device_policy_manager,
            capabilities,
            port: PdPort::new(),
            discovery: [DiscoveryState::Idle; 2],
            mode: ModeState::Idle,
        }
    }

    /// Access the TCPC driver.
    pub fn tcpc(&mut self) -> &mut TCPC {
        &mut self.tcpc
    }

    /// Access the device policy manager.
    pub fn device_policy_manager(&mut self) -> &mut DPM {
        &mut self.device_policy_manager
    }

    /// The per-port state, for inspection.
    pub fn port(&self) -> &PdPort {
        &self.port
    }

    /// The timer currently armed on a plane, if any.
    pub fn armed_timer(&self, sop: SopTarget) -> Option<TimerType> {
        self.timers.armed(sop)
    }

    /// The mode negotiator's state.
    pub fn mode_state(&self) -> ModeState {
        self.mode
    }

    /// The discovery state of a plane.
    pub fn discovery_state(&self, sop: SopTarget) -> DiscoveryState {
        self.discovery[sop.index()]
    }

    /// Process one inbound event to completion.
    pub fn handle(&mut self, event: PdEvent) {
        match event {
            PdEvent::Received { sop, objects } => self.on_received(sop, &objects),
            PdEvent::TimerExpired { sop, timer } => self.on_timer_expired(sop, timer),
        }
    }

    fn on_received(&mut self, sop: SopTarget, objects: &[u32]) {
        match DecodedVdm::parse(objects) {
            Ok(DecodedVdm::Unstructured { .. }) => self.on_unstructured(sop, objects),
            Ok(DecodedVdm::Structured { header, command, vdos }) => match header.command_type() {
                VdmCommandType::InitiatorReq => self.on_request(sop, header, command, vdos),
                command_type => self.on_response(sop, header, command, command_type, vdos),
            },
            Err(error) => self.on_malformed(sop, objects, error),
        }
    }

    /// A partner-initiated structured command. As a DFP core, the only
    /// request serviced here is Attention; everything else is NAKed.
    fn on_request(&mut self, sop: SopTarget, header: VdmHeaderStructured, command: VdmCommand, vdos: &[u32]) {
        match command {
            VdmCommand::Attention => self.on_attention(sop, header, vdos),
            _ => {
                debug!("unsupported VDM request {:?} on {:?}", command, sop);
                self.nak_unsupported(sop, header);
            }
        }
    }

    /// Reflect an unsupported request as an immediate NAK rather than
    /// silently dropping it.
    fn nak_unsupported(&mut self, sop: SopTarget, header: VdmHeaderStructured) {
        let response = VdmMessage::response(header, VdmCommandType::ResponderNak);
        self.tcpc.transmit_vdm(sop, response.objects());
    }

    /// A structured response (ACK/NAK/BSY) arrived; match it against the
    /// plane's outstanding transaction.
    fn on_response(
        &mut self,
        sop: SopTarget,
        header: VdmHeaderStructured,
        command: VdmCommand,
        command_type: VdmCommandType,
        vdos: &[u32],
    ) {
        let Some(kind) = self.port.outstanding[sop.index()] else {
            warn!("stale VDM response {:?} on {:?}, no outstanding transaction", command, sop);
            return;
        };

        if kind.expected_command() != Some(command) {
            warn!(
                "VDM response {:?} does not match outstanding {:?} on {:?}",
                command, kind, sop
            );
            return;
        }

        self.conclude(sop, kind);

        let outcome = match command_type {
            VdmCommandType::ResponderAck => Outcome::Ack { header, vdos },
            VdmCommandType::ResponderNak => Outcome::Fail(VdmFailure::Nak),
            VdmCommandType::ResponderBusy => Outcome::Fail(VdmFailure::Busy),
            // Filtered out by the caller.
            VdmCommandType::InitiatorReq => unreachable!(),
        };

        self.resolve(sop, kind, outcome);
    }

    /// A message that failed decoding. A malformed response resolves the
    /// outstanding transaction as a failure; a malformed request is NAKed.
    fn on_malformed(&mut self, sop: SopTarget, objects: &[u32], error: ParseError) {
        let Some(&first) = objects.first() else {
            debug!("empty VDM on {:?}, dropped", sop);
            return;
        };

        if let VdmHeader::Structured(header) = VdmHeader::from(first) {
            if header.command_type() == VdmCommandType::InitiatorReq {
                debug!("malformed VDM request on {:?}: {:?}", sop, error);
                self.nak_unsupported(sop, header);
                return;
            }
        }

        let Some(kind) = self.port.outstanding[sop.index()] else {
            debug!("malformed VDM on {:?} with no outstanding transaction: {:?}", sop, error);
            return;
        };

        self.conclude(sop, kind);
        self.resolve(sop, kind, Outcome::Fail(VdmFailure::Malformed(error)));
    }

    fn on_timer_expired(&mut self, sop: SopTarget, timer: TimerType) {
        self.timers.expired(sop, timer);

        let Some(kind) = self.port.outstanding[sop.index()] else {
            debug!("stale timer {:?} on {:?}", timer, sop);
            return;
        };

        if kind.timer() != timer {
            debug!("timer {:?} does not match outstanding {:?} on {:?}", timer, kind, sop);
            return;
        }

        self.port.outstanding[sop.index()] = None;
        self.resolve(sop, kind, Outcome::Fail(VdmFailure::Timeout));
    }

    /// Start a transaction: record it, arm its timer, transmit the request.
    fn begin(&mut self, sop: SopTarget, kind: TransactionKind, message: &VdmMessage) -> Result<(), IntentError> {
        if self.port.outstanding[sop.index()].is_some() {
            return Err(IntentError::PlaneBusy);
        }

        self.port.outstanding[sop.index()] = Some(kind);
        self.timers.arm(sop, kind.timer());
        self.tcpc.transmit_vdm(sop, message.objects());
        Ok(())
    }

    /// Clear a transaction and its timer without resolving it yet.
    fn conclude(&mut self, sop: SopTarget, kind: TransactionKind) {
        self.port.outstanding[sop.index()] = None;
        self.timers.disarm(sop, kind.timer());
    }

    fn resolve(&mut self, sop: SopTarget, kind: TransactionKind, outcome: Outcome<'_>) {
        match kind {
            TransactionKind::DiscoverIdentity | TransactionKind::DiscoverSvids | TransactionKind::DiscoverModes => {
                self.resolve_discovery(sop, kind, outcome)
            }
            TransactionKind::EnterMode | TransactionKind::ExitMode => self.resolve_mode(kind, outcome),
            TransactionKind::DpStatus | TransactionKind::DpConfig => self.resolve_dp(kind, outcome),
            TransactionKind::Uvdm => self.resolve_uvdm(outcome),
            TransactionKind::CableSoftReset => self.resolve_cable_soft_reset(outcome),
        }
    }

    /// Issue a cable soft reset and wait for the sender-response mechanism.
    ///
    /// Capability-gated; refuses without side effects when disabled.
    pub fn reset_cable(&mut self) -> Result<(), IntentError> {
        if !self.capabilities.reset_cable {
            return Err(IntentError::Unsupported);
        }
        if self.port.outstanding[SopTarget::SopPrime.index()].is_some() {
            return Err(IntentError::PlaneBusy);
        }

        self.port.pd_wait_sender_response = true;
        self.port.outstanding[SopTarget::SopPrime.index()] = Some(TransactionKind::CableSoftReset);
        self.timers.arm(SopTarget::SopPrime, TimerType::SenderResponse);
        self.tcpc
            .transmit_control(SopTarget::SopPrime, ControlMessage::CableSoftReset);
        Ok(())
    }

    /// The outer sender-response mechanism resolved the cable soft reset.
    pub fn cable_soft_reset_resolved(&mut self) {
        if self.port.outstanding[SopTarget::SopPrime.index()] == Some(TransactionKind::CableSoftReset) {
            self.conclude(SopTarget::SopPrime, TransactionKind::CableSoftReset);
        }
        self.port.pd_wait_sender_response = false;
    }

    fn resolve_cable_soft_reset(&mut self, outcome: Outcome<'_>) {
        if let Outcome::Fail(failure) = outcome {
            warn!("cable soft reset resolved without response: {:?}", failure);
        }
        self.port.pd_wait_sender_response = false;
    }

    /// Tear down the connection: disarm all timers, discard in-flight
    /// transactions without protocol-result callbacks, reset all state.
    pub fn teardown(&mut self) {
        for sop in [SopTarget::Sop, SopTarget::SopPrime] {
            self.timers.disarm_all(sop);
        }

        self.port.reset();
        self.discovery = [DiscoveryState::Idle; 2];
        self.mode = ModeState::Idle;

        self.device_policy_manager.inform_teardown();
    }
}
