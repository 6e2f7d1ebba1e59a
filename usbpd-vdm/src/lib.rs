//! USB-PD vendor-defined message (VDM) policy engine for the DFP role.
//!
//! Discovers the identity, SVIDs and alternate modes of an attached partner
//! (SOP) and cable plug (SOP'), negotiates alternate mode entry and exit,
//! relays unstructured vendor messages, and drives the DisplayPort
//! status/configuration exchanges.
//!
//! The engine is sans-io and event-driven: it owns no task, never blocks,
//! and processes one event or intent to completion per call. Transport and
//! timer scheduling live behind the [`usbpd_vdm_traits::Tcpc`] and
//! [`timers::TimerBackend`] traits; timer expirations return to the engine
//! as ordinary events.
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

// This must come first so the logging macros are visible everywhere.
mod fmt;

pub mod counters;
pub mod dfp;
pub mod message;
pub mod timers;

#[cfg(test)]
mod dummy;

pub use usbpd_vdm_traits::{ControlMessage, SopTarget, Tcpc};
