//! Alternate mode entry/exit and the DisplayPort status/configuration
//! cycles that run once a mode is entered.

use usbpd_vdm_traits::{SopTarget, Tcpc};

use super::{Dfp, Outcome, TransactionKind};
use crate::dfp::device_policy_manager::DevicePolicyManager;
use crate::dfp::IntentError;
use crate::message::VdmMessage;
use crate::message::header::{VdmCommand, VdmHeaderStructured};
use crate::message::vdo::{DisplayPortConfig, DisplayPortStatus};
use crate::timers::TimerBackend;

/// State of the mode negotiator. Mode negotiation runs on SOP only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeState {
    /// No mode entered or in negotiation.
    Idle,
    /// Enter-Mode sent, awaiting resolution.
    AwaitEnter,
    /// A mode is active; DP cycles and exit are allowed.
    Entered,
    /// Exit-Mode sent, awaiting resolution.
    AwaitExit,
}

impl<TCPC: Tcpc, TIMER: TimerBackend, DPM: DevicePolicyManager> Dfp<TCPC, TIMER, DPM> {
    /// Enter the mode at `object_position` of `svid` on the partner.
    pub fn enter_mode(&mut self, svid: u16, object_position: u8) -> Result<(), IntentError> {
        if self.mode != ModeState::Idle {
            return Err(IntentError::InvalidState);
        }
        if self.port.outstanding(SopTarget::Sop).is_some() {
            return Err(IntentError::PlaneBusy);
        }

        self.port.mode_svid = svid;
        self.port.mode_obj_pos = object_position;

        let message = VdmMessage::request(svid, VdmCommand::EnterMode, object_position);
        self.begin(SopTarget::Sop, TransactionKind::EnterMode, &message)?;
        self.mode = ModeState::AwaitEnter;
        Ok(())
    }

    /// Exit the currently entered mode.
    pub fn exit_mode(&mut self, svid: u16, object_position: u8) -> Result<(), IntentError> {
        if self.mode != ModeState::Entered {
            return Err(IntentError::InvalidState);
        }
        if self.port.outstanding(SopTarget::Sop).is_some() {
            return Err(IntentError::PlaneBusy);
        }

        self.port.mode_svid = svid;
        self.port.mode_obj_pos = object_position;

        let message = VdmMessage::request(svid, VdmCommand::ExitMode, object_position);
        self.begin(SopTarget::Sop, TransactionKind::ExitMode, &message)?;
        self.mode = ModeState::AwaitExit;
        Ok(())
    }

    pub(super) fn resolve_mode(&mut self, kind: TransactionKind, outcome: Outcome<'_>) {
        match kind {
            TransactionKind::EnterMode => {
                let result = match outcome {
                    Outcome::Ack { .. } => Ok(()),
                    Outcome::Fail(failure) => Err(failure),
                };

                self.mode = match result {
                    Ok(()) => ModeState::Entered,
                    Err(_) => ModeState::Idle,
                };

                self.device_policy_manager.inform_enter_mode(result);
            }
            TransactionKind::ExitMode => {
                // Exit is fail-open: ACK, NAK, BSY and timeout all count as
                // exited, so a stuck exit can never wedge the plane.
                if let Outcome::Fail(failure) = outcome {
                    debug!("exit mode resolved without ACK: {:?}", failure);
                }

                self.mode = ModeState::Idle;
                self.device_policy_manager.inform_exit_mode();
            }
            _ => unreachable!(),
        }
    }

    /// Send a DisplayPort Status-Update with our status `bits`.
    pub fn dp_status_update(&mut self, status: DisplayPortStatus) -> Result<(), IntentError> {
        self.dp_request(TransactionKind::DpStatus, VdmCommand::DisplayPortStatus, status.0)
    }

    /// Send a DisplayPort Configuration for the selected pin assignment.
    pub fn dp_configuration(&mut self, config: DisplayPortConfig) -> Result<(), IntentError> {
        self.dp_request(TransactionKind::DpConfig, VdmCommand::DisplayPortConfig, config.0)
    }

    fn dp_request(&mut self, kind: TransactionKind, command: VdmCommand, vdo: u32) -> Result<(), IntentError> {
        if !self.capabilities.alt_mode_dfp {
            return Err(IntentError::Unsupported);
        }
        if self.mode != ModeState::Entered {
            return Err(IntentError::InvalidState);
        }
        if self.port.outstanding(SopTarget::Sop).is_some() {
            return Err(IntentError::PlaneBusy);
        }

        let (svid, object_position) = self.port.mode_target();
        let message = VdmMessage::request_with_vdo(svid, command, object_position, vdo);
        self.begin(SopTarget::Sop, kind, &message)
    }

    pub(super) fn resolve_dp(&mut self, kind: TransactionKind, outcome: Outcome<'_>) {
        match kind {
            TransactionKind::DpStatus => {
                let result = match outcome {
                    // The object count guarantee puts the partner's status
                    // VDO first after the header.
                    Outcome::Ack { vdos, .. } => Ok(DisplayPortStatus(vdos[0])),
                    Outcome::Fail(failure) => Err(failure),
                };
                self.device_policy_manager.inform_dp_status(result);
            }
            TransactionKind::DpConfig => {
                let result = match outcome {
                    Outcome::Ack { .. } => Ok(()),
                    Outcome::Fail(failure) => Err(failure),
                };
                self.device_policy_manager.inform_dp_config(result);
            }
            _ => unreachable!(),
        }
    }

    /// An unsolicited Attention: no transaction, no timer, forwarded as-is.
    pub(super) fn on_attention(&mut self, sop: SopTarget, header: VdmHeaderStructured, vdos: &[u32]) {
        self.device_policy_manager
            .inform_attention(sop, header.standard_or_vid(), header.object_position(), vdos);
    }
}
