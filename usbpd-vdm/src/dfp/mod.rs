//! The DFP-side VDM implementation.
pub mod device_policy_manager;
pub mod policy_engine;

use crate::message::ParseError;

/// Construction-time capability flags.
///
/// Disabled components are never driven: their intents fail with
/// [`IntentError::Unsupported`] and no message or timer side effects occur.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// Drive DisplayPort status/configuration cycles after mode entry.
    pub alt_mode_dfp: bool,
    /// Relay unstructured (vendor-opaque) VDMs.
    pub uvdm: bool,
    /// Allow issuing a cable soft reset.
    pub reset_cable: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            alt_mode_dfp: true,
            uvdm: true,
            reset_cable: false,
        }
    }
}

/// The discovery step to run on a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiscoverKind {
    /// Discover the responder's identity.
    Identity,
    /// Discover the responder's supported SVIDs.
    Svids,
    /// Discover the modes of the given SVID.
    Modes(u16),
}

/// Why a VDM transaction failed.
///
/// NAK, BSY, timeout and malformed responses resolve to the same
/// device-visible outcome class; the variant is the diagnostic tag.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VdmFailure {
    /// The responder rejected the command.
    #[error("responder NAK")]
    Nak,
    /// The responder is busy.
    #[error("responder busy")]
    Busy,
    /// No response before the transaction deadline.
    #[error("response timeout")]
    Timeout,
    /// The response failed decoding or validation.
    #[error("malformed response: {0}")]
    Malformed(ParseError),
}

/// Why an intent could not start.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntentError {
    /// A transaction is already outstanding on the plane.
    #[error("a transaction is already outstanding on this plane")]
    PlaneBusy,
    /// The required capability is disabled.
    #[error("capability disabled")]
    Unsupported,
    /// The negotiator is not in a state that allows this intent.
    #[error("invalid state for this intent")]
    InvalidState,
    /// The cable identity attempt budget is exhausted.
    #[error("discover identity attempts exhausted")]
    AttemptsExhausted,
    /// The outbound message could not be encoded.
    #[error("encode failure: {0}")]
    Encode(#[from] ParseError),
}
