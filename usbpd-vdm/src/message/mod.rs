//! Encoding and decoding of vendor-defined messages.
//!
//! A VDM is a PD data message of one to seven 32-bit objects whose first
//! object is the VDM header. This module is pure framing; retries, timers
//! and state live in the policy engine.

pub mod header;
pub mod vdo;

use byteorder::{ByteOrder, LittleEndian};
use header::{VdmCommand, VdmCommandType, VdmHeader, VdmHeaderStructured, VdmHeaderUnstructured};
use heapless::Vec;

/// The maximum number of data objects in a PD message.
pub const MAX_OBJECTS: usize = 7;

/// Errors that can occur while parsing or validating a VDM.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// The message carries no data objects at all.
    #[error("message carries no data objects")]
    Empty,
    /// Fewer objects than the claimed command requires.
    #[error("too few data objects (minimum {minimum:?}, found {found:?})")]
    ObjectCountTooLow {
        /// The minimum object count for the command.
        minimum: usize,
        /// The actual object count found.
        found: usize,
    },
    /// More objects than fit in a single PD message.
    #[error("too many data objects (maximum {maximum:?}, found {found:?})")]
    TooManyObjects {
        /// The maximum object count.
        maximum: usize,
        /// The actual object count found.
        found: usize,
    },
    /// An unknown or reserved structured command was encountered.
    #[error("unknown or reserved VDM command `{0}`")]
    InvalidCommand(u8),
    /// A response carried a non-zero object position where zero is required.
    #[error("invalid object position `{0}`")]
    InvalidObjectPosition(u8),
    /// The identity declares a product type this port must not accept.
    #[error("unsupported product type `{0}`")]
    UnsupportedProductType(u8),
}

/// The minimum total object count (header included) for a structured
/// command, by direction.
fn min_objects(command: VdmCommand, command_type: VdmCommandType) -> usize {
    match (command, command_type) {
        // Responses carry their payload VDOs.
        (VdmCommand::DiscoverIdentity, VdmCommandType::ResponderAck) => 5,
        (VdmCommand::DiscoverSvids, VdmCommandType::ResponderAck) => 2,
        (VdmCommand::DiscoverModes, VdmCommandType::ResponderAck) => 2,
        (VdmCommand::DisplayPortStatus, VdmCommandType::ResponderAck) => 2,
        // DP requests carry one VDO after the header.
        (VdmCommand::DisplayPortStatus, VdmCommandType::InitiatorReq) => 2,
        (VdmCommand::DisplayPortConfig, VdmCommandType::InitiatorReq) => 2,
        _ => 1,
    }
}

/// An encoded vendor-defined message, ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VdmMessage {
    objects: Vec<u32, MAX_OBJECTS>,
}

impl VdmMessage {
    fn from_header(header: u32) -> Self {
        let mut objects = Vec::new();
        // Always fits, the vector is empty.
        objects.push(header).ok();
        Self { objects }
    }

    /// A structured request carrying only the VDM header.
    pub fn request(svid: u16, command: VdmCommand, object_position: u8) -> Self {
        Self::from_header(
            VdmHeaderStructured::default()
                .with_standard_or_vid(svid)
                .with_command_type(VdmCommandType::InitiatorReq)
                .with_command(command)
                .with_object_position(object_position)
                .into(),
        )
    }

    /// A structured request with one payload VDO, e.g. DP status/config.
    pub fn request_with_vdo(svid: u16, command: VdmCommand, object_position: u8, vdo: u32) -> Self {
        let mut message = Self::request(svid, command, object_position);
        // Always fits, one object is used.
        message.objects.push(vdo).ok();
        message
    }

    /// A response that echoes a received structured header with a new
    /// command type, e.g. the NAK for an unsupported command.
    pub fn response(request: VdmHeaderStructured, command_type: VdmCommandType) -> Self {
        Self::from_header(request.with_command_type(command_type).into())
    }

    /// An unstructured VDM with an opaque payload.
    pub fn unstructured(svid: u16, data: u16, payload: &[u32]) -> Result<Self, ParseError> {
        if payload.len() > MAX_OBJECTS - 1 {
            return Err(ParseError::TooManyObjects {
                maximum: MAX_OBJECTS - 1,
                found: payload.len() + 1,
            });
        }

        let mut message = Self::from_header(
            VdmHeaderUnstructured(0)
                .with_standard_or_vid(svid)
                .with_data(data)
                .into(),
        );
        message.objects.extend_from_slice(payload).ok();
        Ok(message)
    }

    /// The data objects in wire order, header first.
    pub fn objects(&self) -> &[u32] {
        &self.objects
    }

    /// The decoded VDM header.
    pub fn header(&self) -> VdmHeader {
        VdmHeader::from(self.objects[0])
    }

    /// Serialize to little-endian bytes, returning the written length.
    pub fn to_bytes(&self, buf: &mut [u8]) -> usize {
        for (object, chunk) in self.objects.iter().zip(buf.chunks_exact_mut(4)) {
            LittleEndian::write_u32(chunk, *object);
        }
        self.objects.len() * 4
    }
}

/// A received vendor-defined message, decoded and validated.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodedVdm<'a> {
    /// A structured VDM with a known command.
    Structured {
        /// The decoded header.
        header: VdmHeaderStructured,
        /// The header's command, decoded.
        command: VdmCommand,
        /// Payload VDOs following the header.
        vdos: &'a [u32],
    },
    /// An unstructured VDM; the payload is opaque.
    Unstructured {
        /// The decoded header.
        header: VdmHeaderUnstructured,
        /// Payload VDOs following the header.
        vdos: &'a [u32],
    },
}

impl<'a> DecodedVdm<'a> {
    /// Decode the data objects of a received message.
    ///
    /// Fails when the object list is empty, the structured command is
    /// unknown, or the object count is below the command's minimum.
    pub fn parse(objects: &'a [u32]) -> Result<Self, ParseError> {
        let (first, vdos) = objects.split_first().ok_or(ParseError::Empty)?;

        match VdmHeader::from(*first) {
            VdmHeader::Unstructured(header) => Ok(DecodedVdm::Unstructured { header, vdos }),
            VdmHeader::Structured(header) => {
                let command = header.command()?;
                let minimum = min_objects(command, header.command_type());
                if objects.len() < minimum {
                    return Err(ParseError::ObjectCountTooLow {
                        minimum,
                        found: objects.len(),
                    });
                }

                Ok(DecodedVdm::Structured { header, command, vdos })
            }
        }
    }
}
