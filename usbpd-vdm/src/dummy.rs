//! Implements dummy collaborators for testing: a recording TCPC driver, a
//! recording timer backend, and a device policy manager that captures every
//! inform callback.
use heapless::Vec;
use usbpd_vdm_traits::{ControlMessage, SopTarget, Tcpc};

use crate::dfp::VdmFailure;
use crate::dfp::device_policy_manager::DevicePolicyManager;
use crate::message::MAX_OBJECTS;
use crate::message::vdo::{DisplayPortStatus, Identity, ModeList, SvidList};
use crate::timers::{TimerBackend, TimerType};

/// A dummy TCPC driver that records transmissions for probing.
#[derive(Debug, Default)]
pub struct DummyTcpc {
    vdms: Vec<(SopTarget, Vec<u32, MAX_OBJECTS>), 8>,
    controls: Vec<(SopTarget, ControlMessage), 4>,
}

impl DummyTcpc {
    /// Create a new dummy driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any VDM transmission is waiting to be probed.
    pub fn has_transmitted_vdm(&self) -> bool {
        !self.vdms.is_empty()
    }

    /// Probe the oldest transmitted VDM.
    pub fn probe_transmitted_vdm(&mut self) -> (SopTarget, Vec<u32, MAX_OBJECTS>) {
        self.vdms.remove(0)
    }

    /// Probe the oldest transmitted control message.
    pub fn probe_transmitted_control(&mut self) -> (SopTarget, ControlMessage) {
        self.controls.remove(0)
    }
}

impl Tcpc for DummyTcpc {
    fn transmit_vdm(&mut self, sop: SopTarget, objects: &[u32]) {
        let mut copy = Vec::new();
        copy.extend_from_slice(objects).unwrap();
        self.vdms.push((sop, copy)).unwrap();
    }

    fn transmit_control(&mut self, sop: SopTarget, message: ControlMessage) {
        self.controls.push((sop, message)).unwrap();
    }
}

/// A dummy timer backend that mirrors the armed deadlines.
#[derive(Debug, Default)]
pub struct DummyTimerBackend {
    armed: [Option<TimerType>; 2],
}

impl DummyTimerBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// The deadline currently armed on a plane, as the backend sees it.
    pub fn armed(&self, sop: SopTarget) -> Option<TimerType> {
        self.armed[sop.index()]
    }
}

impl TimerBackend for DummyTimerBackend {
    fn arm(&mut self, sop: SopTarget, timer: TimerType) {
        self.armed[sop.index()] = Some(timer);
    }

    fn disarm(&mut self, sop: SopTarget, timer: TimerType) {
        if self.armed[sop.index()] == Some(timer) {
            self.armed[sop.index()] = None;
        }
    }
}

/// One captured DPM callback.
#[derive(Debug, Clone)]
pub enum Inform {
    /// Captured `inform_identity`.
    Identity {
        /// The resolved plane.
        sop: SopTarget,
        /// The reported result.
        result: Result<Identity, VdmFailure>,
    },
    /// Captured `inform_svids`.
    Svids {
        /// The resolved plane.
        sop: SopTarget,
        /// The reported result.
        result: Result<SvidList, VdmFailure>,
    },
    /// Captured `inform_modes`.
    Modes {
        /// The resolved plane.
        sop: SopTarget,
        /// The discovered SVID.
        svid: u16,
        /// The reported result.
        result: Result<ModeList, VdmFailure>,
    },
    /// Captured `inform_enter_mode`.
    EnterMode(Result<(), VdmFailure>),
    /// Captured `inform_exit_mode`.
    ExitMode,
    /// Captured `inform_attention`.
    Attention {
        /// The plane the attention arrived on.
        sop: SopTarget,
        /// The sender's SVID.
        svid: u16,
        /// The object position from the attention header.
        object_position: u8,
        /// Payload VDOs.
        vdos: Vec<u32, 6>,
    },
    /// Captured `inform_uvdm`.
    Uvdm(Result<Vec<u32, MAX_OBJECTS>, VdmFailure>),
    /// Captured `inform_dp_status`.
    DpStatus(Result<DisplayPortStatus, VdmFailure>),
    /// Captured `inform_dp_config`.
    DpConfig(Result<(), VdmFailure>),
    /// Captured `inform_teardown`.
    Teardown,
}

/// A dummy device that records every policy engine callback.
#[derive(Debug, Default)]
pub struct DummyDevice {
    informs: Vec<Inform, 32>,
}

impl DummyDevice {
    /// Create a new dummy device.
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured callbacks, oldest first.
    pub fn informs(&self) -> &[Inform] {
        &self.informs
    }

    /// Remove and return the oldest captured callback.
    pub fn pop_inform(&mut self) -> Option<Inform> {
        if self.informs.is_empty() {
            None
        } else {
            Some(self.informs.remove(0))
        }
    }

    fn record(&mut self, inform: Inform) {
        self.informs.push(inform).unwrap();
    }
}

impl DevicePolicyManager for DummyDevice {
    fn inform_identity(&mut self, sop: SopTarget, result: Result<Identity, VdmFailure>) {
        self.record(Inform::Identity { sop, result });
    }

    fn inform_svids(&mut self, sop: SopTarget, result: Result<SvidList, VdmFailure>) {
        self.record(Inform::Svids { sop, result });
    }

    fn inform_modes(&mut self, sop: SopTarget, svid: u16, result: Result<ModeList, VdmFailure>) {
        self.record(Inform::Modes { sop, svid, result });
    }

    fn inform_enter_mode(&mut self, result: Result<(), VdmFailure>) {
        self.record(Inform::EnterMode(result));
    }

    fn inform_exit_mode(&mut self) {
        self.record(Inform::ExitMode);
    }

    fn inform_attention(&mut self, sop: SopTarget, svid: u16, object_position: u8, vdos: &[u32]) {
        let mut copy = Vec::new();
        copy.extend_from_slice(vdos).unwrap();
        self.record(Inform::Attention {
            sop,
            svid,
            object_position,
            vdos: copy,
        });
    }

    fn inform_uvdm(&mut self, result: Result<&[u32], VdmFailure>) {
        let result = result.map(|objects| {
            let mut copy = Vec::new();
            copy.extend_from_slice(objects).unwrap();
            copy
        });
        self.record(Inform::Uvdm(result));
    }

    fn inform_dp_status(&mut self, result: Result<DisplayPortStatus, VdmFailure>) {
        self.record(Inform::DpStatus(result));
    }

    fn inform_dp_config(&mut self, result: Result<(), VdmFailure>) {
        self.record(Inform::DpConfig(result));
    }

    fn inform_teardown(&mut self) {
        self.record(Inform::Teardown);
    }
}
