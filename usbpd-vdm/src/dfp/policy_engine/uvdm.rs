//! Unstructured VDM relay: opaque vendor payloads, no interpretation.

use usbpd_vdm_traits::{SopTarget, Tcpc};

use super::{Dfp, Outcome, TransactionKind};
use crate::dfp::device_policy_manager::DevicePolicyManager;
use crate::dfp::IntentError;
use crate::message::VdmMessage;
use crate::timers::TimerBackend;

impl<TCPC: Tcpc, TIMER: TimerBackend, DPM: DevicePolicyManager> Dfp<TCPC, TIMER, DPM> {
    /// Send an unstructured VDM to the partner and await the vendor's
    /// response. `data` fills the vendor-defined low bits of the header,
    /// `payload` the remaining objects.
    pub fn send_uvdm(&mut self, svid: u16, data: u16, payload: &[u32]) -> Result<(), IntentError> {
        if !self.capabilities.uvdm {
            return Err(IntentError::Unsupported);
        }
        if self.port.outstanding(SopTarget::Sop).is_some() {
            return Err(IntentError::PlaneBusy);
        }

        let message = VdmMessage::unstructured(svid, data, payload)?;
        self.begin(SopTarget::Sop, TransactionKind::Uvdm, &message)
    }

    /// An unstructured VDM arrived. With a UVDM exchange outstanding on the
    /// partner plane it is the response; otherwise there is nothing to NAK
    /// (unstructured VDMs have no response framing), so it is dropped.
    pub(super) fn on_unstructured(&mut self, sop: SopTarget, objects: &[u32]) {
        if sop == SopTarget::Sop && self.port.outstanding(sop) == Some(TransactionKind::Uvdm) {
            self.conclude(sop, TransactionKind::Uvdm);
            self.device_policy_manager.inform_uvdm(Ok(objects));
            return;
        }

        debug!("unsolicited unstructured VDM on {:?}, dropped", sop);
    }

    pub(super) fn resolve_uvdm(&mut self, outcome: Outcome<'_>) {
        match outcome {
            // UVDM responses are unstructured and resolve through
            // `on_unstructured`; only failures arrive here.
            Outcome::Ack { .. } => unreachable!(),
            Outcome::Fail(failure) => self.device_policy_manager.inform_uvdm(Err(failure)),
        }
    }
}
