//! Per-plane discovery: Discover-Identity, Discover-SVIDs, Discover-Modes.
//!
//! Steps are never chained automatically; after each resolution the engine
//! waits for the next explicit DPM intent. The SOP and SOP' planes discover
//! independently and may both have a transaction in flight.

use usbpd_vdm_traits::{SopTarget, Tcpc};

use super::{Dfp, Outcome, TransactionKind};
use crate::dfp::device_policy_manager::DevicePolicyManager;
use crate::dfp::{DiscoverKind, IntentError, VdmFailure};
use crate::message::header::{PD_SID, VdmCommand, VdmHeaderStructured};
use crate::message::vdo::{Identity, ModeList, parse_svids};
use crate::message::{ParseError, VdmMessage};
use crate::timers::TimerBackend;

/// Discovery state of one plane.
///
/// `Failed` is terminal for the attempt only; a fresh intent restarts from
/// it, the plane stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiscoveryState {
    /// No discovery transaction in flight.
    Idle,
    /// Discover-Identity sent, awaiting resolution.
    AwaitIdentity,
    /// Discover-SVIDs sent, awaiting resolution.
    AwaitSvids,
    /// Discover-Modes sent, awaiting resolution.
    AwaitModes,
    /// The last discovery step on this plane failed.
    Failed,
}

impl<TCPC: Tcpc, TIMER: TimerBackend, DPM: DevicePolicyManager> Dfp<TCPC, TIMER, DPM> {
    /// Run a discovery step on a plane.
    ///
    /// For Discover-Identity towards the cable, the attempt counter is
    /// charged first; an exhausted budget refuses without side effects.
    pub fn discover(&mut self, sop: SopTarget, kind: DiscoverKind) -> Result<(), IntentError> {
        if self.port.outstanding(sop).is_some() {
            return Err(IntentError::PlaneBusy);
        }

        if sop == SopTarget::SopPrime && kind == DiscoverKind::Identity {
            self.port
                .discover_id_counter
                .increment()
                .map_err(|_| IntentError::AttemptsExhausted)?;
        }

        let (transaction, message, state) = match kind {
            DiscoverKind::Identity => (
                TransactionKind::DiscoverIdentity,
                VdmMessage::request(PD_SID, VdmCommand::DiscoverIdentity, 0),
                DiscoveryState::AwaitIdentity,
            ),
            DiscoverKind::Svids => (
                TransactionKind::DiscoverSvids,
                VdmMessage::request(PD_SID, VdmCommand::DiscoverSvids, 0),
                DiscoveryState::AwaitSvids,
            ),
            DiscoverKind::Modes(svid) => {
                self.port.mode_svid = svid;
                (
                    TransactionKind::DiscoverModes,
                    VdmMessage::request(svid, VdmCommand::DiscoverModes, 0),
                    DiscoveryState::AwaitModes,
                )
            }
        };

        self.begin(sop, transaction, &message)?;
        self.discovery[sop.index()] = state;
        trace!("discovery {:?} started on {:?}", kind, sop);
        Ok(())
    }

    /// Mark a cable identity check as pending. The flag is sticky until the
    /// next SOP' identity resolution, success or not.
    pub fn flag_cable_id_check(&mut self, dfp: bool) {
        if dfp {
            self.port.dpm_flags.check_cable_id_dfp = true;
        } else {
            self.port.dpm_flags.check_cable_id = true;
        }
    }

    /// A cable was connected; start the pending identity check, if any.
    pub fn cable_attached(&mut self) -> Result<(), IntentError> {
        if !self.port.dpm_flags.any() {
            return Ok(());
        }

        self.discover(SopTarget::SopPrime, DiscoverKind::Identity)
    }

    pub(super) fn resolve_discovery(&mut self, sop: SopTarget, kind: TransactionKind, outcome: Outcome<'_>) {
        // The flags mean "a check is pending"; any identity resolution on
        // the cable plane satisfies them.
        if sop == SopTarget::SopPrime && kind == TransactionKind::DiscoverIdentity {
            self.port.dpm_flags.clear();
        }

        match kind {
            TransactionKind::DiscoverIdentity => self.resolve_identity(sop, outcome),
            TransactionKind::DiscoverSvids => self.resolve_svids(sop, outcome),
            TransactionKind::DiscoverModes => self.resolve_modes(sop, outcome),
            _ => unreachable!(),
        }
    }

    fn resolve_identity(&mut self, sop: SopTarget, outcome: Outcome<'_>) {
        let result = match outcome {
            Outcome::Ack { header, vdos } => Self::validate_identity(sop, header, vdos),
            Outcome::Fail(failure) => Err(failure),
        };

        self.discovery[sop.index()] = match result {
            Ok(_) => DiscoveryState::Idle,
            Err(_) => DiscoveryState::Failed,
        };

        if result.is_ok() && sop == SopTarget::SopPrime {
            // A cable answered; further presence probing is unnecessary.
            self.port.discover_id_counter.reset();
        }

        self.device_policy_manager.inform_identity(sop, result);
    }

    /// Conformance checks on an identity ACK. A failed check resolves
    /// exactly like a NAK, carrying the malformed detail for diagnostics.
    fn validate_identity(sop: SopTarget, header: VdmHeaderStructured, vdos: &[u32]) -> Result<Identity, VdmFailure> {
        if header.object_position() != 0 {
            return Err(VdmFailure::Malformed(ParseError::InvalidObjectPosition(
                header.object_position(),
            )));
        }

        let identity = Identity::parse(vdos).map_err(VdmFailure::Malformed)?;

        if sop == SopTarget::Sop && !identity.product_type().acceptable_for_partner() {
            return Err(VdmFailure::Malformed(ParseError::UnsupportedProductType(
                identity.product_type().into(),
            )));
        }

        Ok(identity)
    }

    fn resolve_svids(&mut self, sop: SopTarget, outcome: Outcome<'_>) {
        let result = match outcome {
            Outcome::Ack { vdos, .. } => Ok(parse_svids(vdos)),
            Outcome::Fail(failure) => Err(failure),
        };

        self.discovery[sop.index()] = match result {
            Ok(_) => DiscoveryState::Idle,
            Err(_) => DiscoveryState::Failed,
        };

        self.device_policy_manager.inform_svids(sop, result);
    }

    fn resolve_modes(&mut self, sop: SopTarget, outcome: Outcome<'_>) {
        let result = match outcome {
            Outcome::Ack { vdos, .. } => {
                let mut modes = ModeList::new();
                // At most six mode VDOs follow the header.
                modes.extend_from_slice(vdos).ok();
                Ok(modes)
            }
            Outcome::Fail(failure) => Err(failure),
        };

        self.discovery[sop.index()] = match result {
            Ok(_) => DiscoveryState::Idle,
            Err(_) => DiscoveryState::Failed,
        };

        let svid = self.port.mode_svid;
        self.device_policy_manager.inform_modes(sop, svid, result);
    }
}
