//! Definitions for the 32-bit VDM header, the first data object of every
//! vendor-defined message.
//!
//! See [6.4.4.2].
use core::convert::TryFrom;

use proc_bitfield::bitfield;

use crate::message::ParseError;

/// The standard ID that owns the structured VDM command set.
pub const PD_SID: u16 = 0xFF00;
/// The DisplayPort alternate mode SVID.
pub const DP_SID: u16 = 0xFF01;

/// VDM framing type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VdmType {
    /// Opaque vendor payload, no command/response framing.
    Unstructured,
    /// Structured command set with REQ/ACK/NAK/BSY framing.
    Structured,
}

impl From<VdmType> for bool {
    fn from(value: VdmType) -> Self {
        match value {
            VdmType::Unstructured => false,
            VdmType::Structured => true,
        }
    }
}

impl From<bool> for VdmType {
    fn from(value: bool) -> Self {
        match value {
            true => VdmType::Structured,
            false => VdmType::Unstructured,
        }
    }
}

/// Command type of a structured VDM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VdmCommandType {
    /// Request, sent by the initiator.
    InitiatorReq,
    /// Acknowledge, positive response.
    ResponderAck,
    /// Negative acknowledge, the responder rejects the command.
    ResponderNak,
    /// The responder cannot service the command right now.
    ResponderBusy,
}

impl From<VdmCommandType> for u8 {
    fn from(value: VdmCommandType) -> Self {
        match value {
            VdmCommandType::InitiatorReq => 0,
            VdmCommandType::ResponderAck => 1,
            VdmCommandType::ResponderNak => 2,
            VdmCommandType::ResponderBusy => 3,
        }
    }
}

impl From<u8> for VdmCommandType {
    fn from(value: u8) -> Self {
        // Total over the two-bit field.
        match value & 0b11 {
            0 => VdmCommandType::InitiatorReq,
            1 => VdmCommandType::ResponderAck,
            2 => VdmCommandType::ResponderNak,
            _ => VdmCommandType::ResponderBusy,
        }
    }
}

/// Structured VDM commands handled by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VdmCommand {
    /// Discover the identity of the partner or cable plug.
    DiscoverIdentity,
    /// Discover the SVIDs the responder supports.
    DiscoverSvids,
    /// Discover the modes of one SVID.
    DiscoverModes,
    /// Enter an alternate mode.
    EnterMode,
    /// Exit an alternate mode.
    ExitMode,
    /// Unsolicited notification from the responder.
    Attention,
    /// DisplayPort status update.
    DisplayPortStatus,
    /// DisplayPort configuration.
    DisplayPortConfig,
}

impl From<VdmCommand> for u8 {
    fn from(value: VdmCommand) -> Self {
        match value {
            VdmCommand::DiscoverIdentity => 0x01,
            VdmCommand::DiscoverSvids => 0x02,
            VdmCommand::DiscoverModes => 0x03,
            VdmCommand::EnterMode => 0x04,
            VdmCommand::ExitMode => 0x05,
            VdmCommand::Attention => 0x06,
            VdmCommand::DisplayPortStatus => 0x10,
            VdmCommand::DisplayPortConfig => 0x11,
        }
    }
}

impl TryFrom<u8> for VdmCommand {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(VdmCommand::DiscoverIdentity),
            0x02 => Ok(VdmCommand::DiscoverSvids),
            0x03 => Ok(VdmCommand::DiscoverModes),
            0x04 => Ok(VdmCommand::EnterMode),
            0x05 => Ok(VdmCommand::ExitMode),
            0x06 => Ok(VdmCommand::Attention),
            0x10 => Ok(VdmCommand::DisplayPortStatus),
            0x11 => Ok(VdmCommand::DisplayPortConfig),
            _ => Err(ParseError::InvalidCommand(value)),
        }
    }
}

bitfield! {
    /// Common view of the VDM header, used to discriminate framing.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct VdmHeaderRaw(pub u32): Debug, FromStorage, IntoStorage {
        /// VDM Standard or Vendor ID.
        pub standard_or_vid: u16 @ 16..=31,
        /// VDM Type (Unstructured/Structured).
        pub vdm_type: bool [VdmType] @ 15,
    }
}

bitfield! {
    /// Header of a structured VDM.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct VdmHeaderStructured(pub u32): Debug, FromStorage, IntoStorage {
        /// VDM Standard or Vendor ID.
        pub standard_or_vid: u16 @ 16..=31,
        /// VDM Type (Unstructured/Structured).
        pub vdm_type: bool [VdmType] @ 15,
        /// Structured VDM version, major.
        pub vdm_version_major: u8 @ 13..=14,
        /// Structured VDM version, minor.
        pub vdm_version_minor: u8 @ 11..=12,
        /// Object Position.
        pub object_position: u8 @ 8..=10,
        /// Command Type.
        pub command_type: u8 [VdmCommandType] @ 6..=7,
        /// Command.
        pub command: u8 [try_get VdmCommand, set VdmCommand] @ 0..=4,
    }
}

impl Default for VdmHeaderStructured {
    fn default() -> Self {
        VdmHeaderStructured(0).with_vdm_type(VdmType::Structured)
    }
}

bitfield! {
    /// Header of an unstructured VDM. Everything below the type bit is
    /// vendor-defined.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct VdmHeaderUnstructured(pub u32): Debug, FromStorage, IntoStorage {
        /// VDM Standard or Vendor ID.
        pub standard_or_vid: u16 @ 16..=31,
        /// VDM Type (Unstructured/Structured).
        pub vdm_type: bool [VdmType] @ 15,
        /// Vendor-defined data.
        pub data: u16 @ 0..=14
    }
}

/// Decoded view of the first data object of a vendor-defined message.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VdmHeader {
    /// A structured VDM header.
    Structured(VdmHeaderStructured),
    /// An unstructured VDM header.
    Unstructured(VdmHeaderUnstructured),
}

impl From<u32> for VdmHeader {
    fn from(value: u32) -> Self {
        match VdmHeaderRaw(value).vdm_type() {
            VdmType::Structured => VdmHeader::Structured(VdmHeaderStructured(value)),
            VdmType::Unstructured => VdmHeader::Unstructured(VdmHeaderUnstructured(value)),
        }
    }
}

impl From<VdmHeader> for u32 {
    fn from(value: VdmHeader) -> Self {
        match value {
            VdmHeader::Structured(header) => header.into(),
            VdmHeader::Unstructured(header) => header.into(),
        }
    }
}
