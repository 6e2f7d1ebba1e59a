//! Logical timers for VDM transactions.
//!
//! The engine only decides *which* timer to arm and for what purpose; actual
//! scheduling belongs to the [`TimerBackend`] collaborator. An expired timer
//! comes back to the engine as [`crate::dfp::policy_engine::PdEvent::TimerExpired`].

use usbpd_vdm_traits::SopTarget;

/// Types of timers that bound VDM transactions.
///
/// Default durations follow the USB PD specification, [Table 6.68]. Backends
/// may apply their own, e.g. stretched for debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerType {
    /// Response to a structured VDM request (discovery, DisplayPort).
    VdmResponse,
    /// Alternate mode entry; longer class, modes may need settling time.
    VdmModeEntry,
    /// Alternate mode exit.
    VdmModeExit,
    /// Response to an unstructured VDM.
    UvdmResponse,
    /// Generic sender response, used for the cable soft reset.
    SenderResponse,
}

impl TimerType {
    /// The default timeout for this timer type, in milliseconds.
    pub fn default_timeout_ms(self) -> u64 {
        match self {
            TimerType::VdmResponse => 27,
            TimerType::VdmModeEntry => 25,
            TimerType::VdmModeExit => 25,
            TimerType::UvdmResponse => 30,
            TimerType::SenderResponse => 30,
        }
    }
}

/// The timer scheduling trait to implement by the user application.
///
/// The backend owes the engine exactly one
/// [`crate::dfp::policy_engine::PdEvent::TimerExpired`] event per armed timer
/// that is not disarmed before its deadline.
pub trait TimerBackend {
    /// Start the deadline for `(sop, timer)`.
    fn arm(&mut self, sop: SopTarget, timer: TimerType);

    /// Cancel the deadline for `(sop, timer)`. Disarming a timer that is not
    /// armed must be tolerated.
    fn disarm(&mut self, sop: SopTarget, timer: TimerType);
}

/// Per-plane timer bookkeeping on top of a [`TimerBackend`].
///
/// At most one timer may be armed per plane, because at most one transaction
/// may be outstanding per plane. Arming while a timer is already armed for
/// the plane is a programming error in the engine.
#[derive(Debug)]
pub struct TimerService<BACKEND: TimerBackend> {
    backend: BACKEND,
    armed: [Option<TimerType>; 2],
}

impl<BACKEND: TimerBackend> TimerService<BACKEND> {
    /// Wrap a timer backend.
    pub fn new(backend: BACKEND) -> Self {
        Self {
            backend,
            armed: [None; 2],
        }
    }

    /// The timer currently armed for a plane, if any.
    pub fn armed(&self, sop: SopTarget) -> Option<TimerType> {
        self.armed[sop.index()]
    }

    /// Arm a timer for a plane.
    pub fn arm(&mut self, sop: SopTarget, timer: TimerType) {
        if let Some(current) = self.armed[sop.index()] {
            error!("timer {:?} armed while {:?} still active", timer, current);
            debug_assert!(false, "timer armed while another is active");
            self.backend.disarm(sop, current);
        }

        self.armed[sop.index()] = Some(timer);
        self.backend.arm(sop, timer);
    }

    /// Disarm the timer for a plane.
    pub fn disarm(&mut self, sop: SopTarget, timer: TimerType) {
        if self.armed[sop.index()] == Some(timer) {
            self.armed[sop.index()] = None;
        }
        self.backend.disarm(sop, timer);
    }

    /// Note an expired timer without calling back into the backend.
    pub fn expired(&mut self, sop: SopTarget, timer: TimerType) {
        if self.armed[sop.index()] == Some(timer) {
            self.armed[sop.index()] = None;
        }
    }

    /// Disarm whatever is armed on a plane, e.g. on teardown.
    pub fn disarm_all(&mut self, sop: SopTarget) {
        if let Some(timer) = self.armed[sop.index()].take() {
            self.backend.disarm(sop, timer);
        }
    }

    /// Access the wrapped backend.
    pub fn backend(&mut self) -> &mut BACKEND {
        &mut self.backend
    }
}
