//! Vendor data objects carried after the VDM header.
//!
//! Identity VDOs per [6.4.4.3.1], SVID/mode responses per [6.4.4.3.2] and
//! [6.4.4.3.3], DisplayPort status/configuration per the DP alt mode
//! standard.
use heapless::Vec;
use proc_bitfield::bitfield;

use crate::message::ParseError;

/// Product type reported in the ID header VDO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProductType {
    /// No product type declared.
    Undefined,
    /// PD USB hub.
    Hub,
    /// PD USB peripheral.
    Peripheral,
    /// Passive cable plug.
    PassiveCable,
    /// Alternate Mode Adapter. Not accepted for SOP identity.
    Ama,
    /// Active cable plug.
    ActiveCable,
    /// VCONN-powered USB device.
    VconnPoweredDevice,
    /// Reserved value. Not accepted for SOP identity.
    Reserved,
}

impl From<u8> for ProductType {
    fn from(value: u8) -> Self {
        // Total over the three-bit field.
        match value & 0b111 {
            0 => ProductType::Undefined,
            1 => ProductType::Hub,
            2 => ProductType::Peripheral,
            3 => ProductType::PassiveCable,
            4 => ProductType::Ama,
            5 => ProductType::ActiveCable,
            6 => ProductType::VconnPoweredDevice,
            _ => ProductType::Reserved,
        }
    }
}

impl From<ProductType> for u8 {
    fn from(value: ProductType) -> Self {
        match value {
            ProductType::Undefined => 0,
            ProductType::Hub => 1,
            ProductType::Peripheral => 2,
            ProductType::PassiveCable => 3,
            ProductType::Ama => 4,
            ProductType::ActiveCable => 5,
            ProductType::VconnPoweredDevice => 6,
            ProductType::Reserved => 7,
        }
    }
}

impl ProductType {
    /// Whether this product type may be accepted for SOP-plane identity.
    ///
    /// AMA and the reserved type are rejected, a conformance rule inherited
    /// from the DFP policy this engine models.
    pub fn acceptable_for_partner(self) -> bool {
        !matches!(self, ProductType::Ama | ProductType::Reserved)
    }
}

bitfield! {
    /// The ID header VDO, first object after the VDM header in a
    /// Discover-Identity response.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct IdHeaderVdo(pub u32): Debug, FromStorage, IntoStorage {
        /// Host data capable.
        pub host_data: bool @ 31,
        /// Device data capable.
        pub device_data: bool @ 30,
        /// Product type.
        pub product_type: u8 [ProductType] @ 27..=29,
        /// Modal operation supported.
        pub modal_supported: bool @ 26,
        /// USB Vendor ID.
        pub vid: u16 @ 0..=15,
    }
}

bitfield! {
    /// The cert stat VDO.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CertStatVdo(pub u32): Debug, FromStorage, IntoStorage {
        /// XID, assigned by USB-IF.
        pub xid: u32 @ 0..=31,
    }
}

bitfield! {
    /// The product VDO.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ProductVdo(pub u32): Debug, FromStorage, IntoStorage {
        /// USB Product ID.
        pub pid: u16 @ 16..=31,
        /// Device release number.
        pub bcd_device: u16 @ 0..=15,
    }
}

/// Decoded Discover-Identity response payload.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Identity {
    /// The ID header VDO.
    pub id_header: IdHeaderVdo,
    /// The cert stat VDO.
    pub cert_stat: CertStatVdo,
    /// The product VDO.
    pub product: ProductVdo,
    /// The first product-type-specific VDO, opaque to this engine.
    pub product_type_vdo: u32,
}

impl Identity {
    /// Decode identity VDOs, the objects following the VDM header.
    pub fn parse(vdos: &[u32]) -> Result<Self, ParseError> {
        if vdos.len() < 4 {
            return Err(ParseError::ObjectCountTooLow {
                minimum: 4,
                found: vdos.len(),
            });
        }

        Ok(Self {
            id_header: IdHeaderVdo(vdos[0]),
            cert_stat: CertStatVdo(vdos[1]),
            product: ProductVdo(vdos[2]),
            product_type_vdo: vdos[3],
        })
    }

    /// The declared product type.
    pub fn product_type(&self) -> ProductType {
        self.id_header.product_type()
    }
}

/// SVIDs from a Discover-SVIDs response.
///
/// Each response VDO packs two SVIDs, high half first; an SVID of zero
/// terminates the list.
pub type SvidList = Vec<u16, 12>;

/// Unpack the SVID list from the objects following the VDM header.
pub fn parse_svids(vdos: &[u32]) -> SvidList {
    let mut svids = SvidList::new();

    'outer: for vdo in vdos {
        for svid in [(vdo >> 16) as u16, *vdo as u16] {
            if svid == 0 {
                break 'outer;
            }
            if svids.push(svid).is_err() {
                break 'outer;
            }
        }
    }

    svids
}

/// Mode VDOs from a Discover-Modes response, opaque to this engine.
pub type ModeList = Vec<u32, 6>;

bitfield! {
    /// The DisplayPort status VDO, exchanged in both directions of a
    /// DP Status Update.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DisplayPortStatus(pub u32): Debug, FromStorage, IntoStorage {
        /// IRQ_HPD, a high-priority HPD pulse was detected.
        pub irq_hpd: bool @ 8,
        /// Current HPD level.
        pub hpd_state: bool @ 7,
        /// The DP device requests to exit DP mode.
        pub exit_dp_request: bool @ 6,
        /// The DP device requests a switch to USB configuration.
        pub usb_config_request: bool @ 5,
        /// Multi-function preferred.
        pub multi_function: bool @ 4,
        /// DP functionality enabled.
        pub enabled: bool @ 3,
        /// Adapter is in a low-power state.
        pub power_low: bool @ 2,
        /// DFP_D/UFP_D connection state.
        pub connected: u8 @ 0..=1,
    }
}

bitfield! {
    /// The DisplayPort configuration VDO, sent with a DP Configure request.
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DisplayPortConfig(pub u32): Debug, FromStorage, IntoStorage {
        /// Pin assignment to configure.
        pub pin_assignment: u8 @ 8..=15,
        /// Signaling rate for DP protocol transport.
        pub signaling: u8 @ 2..=5,
        /// Select USB or DP configuration.
        pub select_configuration: u8 @ 0..=1,
    }
}
