//! The device policy manager (DPM) owns higher-level policy: which SVID and
//! mode to pick, when to fall back to USB-only operation, and so on.
//!
//! The policy engine reports every transaction resolution through the
//! `inform_*` callbacks below and takes its orders as intent calls on
//! [`crate::dfp::policy_engine::Dfp`]. All callbacks default to no-ops so a
//! device only implements what it cares about.

use usbpd_vdm_traits::SopTarget;

use crate::dfp::VdmFailure;
use crate::message::vdo::{DisplayPortStatus, Identity, ModeList, SvidList};

/// Trait for the device policy manager.
pub trait DevicePolicyManager {
    /// A Discover-Identity transaction resolved on `sop`.
    fn inform_identity(&mut self, sop: SopTarget, result: Result<Identity, VdmFailure>) {
        let _ = (sop, result);
    }

    /// A Discover-SVIDs transaction resolved on `sop`.
    fn inform_svids(&mut self, sop: SopTarget, result: Result<SvidList, VdmFailure>) {
        let _ = (sop, result);
    }

    /// A Discover-Modes transaction for `svid` resolved on `sop`.
    fn inform_modes(&mut self, sop: SopTarget, svid: u16, result: Result<ModeList, VdmFailure>) {
        let _ = (sop, svid, result);
    }

    /// An Enter-Mode transaction resolved.
    fn inform_enter_mode(&mut self, result: Result<(), VdmFailure>) {
        let _ = result;
    }

    /// An Exit-Mode transaction resolved. Exit is fail-open: every
    /// resolution, including timeout, reports success.
    fn inform_exit_mode(&mut self) {}

    /// An unsolicited Attention arrived on `sop`.
    fn inform_attention(&mut self, sop: SopTarget, svid: u16, object_position: u8, vdos: &[u32]) {
        let _ = (sop, svid, object_position, vdos);
    }

    /// An unstructured VDM exchange resolved. On success, `result` carries
    /// the partner's raw response objects, header included.
    fn inform_uvdm(&mut self, result: Result<&[u32], VdmFailure>) {
        let _ = result;
    }

    /// A DisplayPort Status-Update cycle resolved.
    fn inform_dp_status(&mut self, result: Result<DisplayPortStatus, VdmFailure>) {
        let _ = result;
    }

    /// A DisplayPort Configuration cycle resolved.
    fn inform_dp_config(&mut self, result: Result<(), VdmFailure>) {
        let _ = result;
    }

    /// The connection was torn down. In-flight transactions are discarded
    /// without protocol-result callbacks; this is the only notification.
    fn inform_teardown(&mut self) {}
}
