//! USB PD VDM policy engine traits.
//!
//! Provides the TCPC driver trait through which the DFP policy engine sends
//! vendor-defined messages, plus the wire-facing addressing types shared with
//! driver implementations.
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

/// Message addressing: the port partner or the attached cable plug.
///
/// Every transmitted and received message carries its SOP* tag. The two
/// planes run independent transactions and must never be conflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SopTarget {
    /// SOP: the port partner device.
    Sop,
    /// SOP': the cable plug nearest this port.
    SopPrime,
}

impl SopTarget {
    /// Stable index for per-plane bookkeeping tables.
    pub fn index(self) -> usize {
        match self {
            SopTarget::Sop => 0,
            SopTarget::SopPrime => 1,
        }
    }
}

/// Control messages the VDM policy engine may emit.
///
/// The engine only ever originates the cable soft reset; everything else it
/// sends is a vendor-defined data message.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMessage {
    /// Soft reset addressed to the cable plug (SOP').
    CableSoftReset,
}

/// TCPC driver trait, through which the policy engine talks to the port
/// controller.
///
/// Transmission is fire-and-forget: CRC handling and transport-level
/// retransmission are the driver's responsibility. Received messages are fed
/// back into the engine as events by the caller.
pub trait Tcpc {
    /// Transmit a vendor-defined data message on the given plane.
    ///
    /// `objects` holds the data objects in wire order; `objects[0]` is the
    /// VDM header.
    fn transmit_vdm(&mut self, sop: SopTarget, objects: &[u32]);

    /// Transmit a control message on the given plane.
    fn transmit_control(&mut self, sop: SopTarget, message: ControlMessage);
}
