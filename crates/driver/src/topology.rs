//! Endpoint-topology resolution for the two supported variants.
//!
//! The two hardware generations expose incompatible endpoint layouts, so
//! instead of generic descriptor negotiation the resolver matches each
//! alternate interface setting against two explicit signatures. Only
//! settings exposing exactly 4 endpoints are considered; the first setting
//! carrying all endpoints of a signature wins and its pipe bindings become
//! the session's.

use common::{Error, Result};
use protocol::DeviceVariant;
use tracing::debug;

use crate::session::PipeBindings;

/// Endpoint layout of one alternate interface setting.
#[derive(Debug, Clone, Default)]
pub struct AltSetting {
    /// Raw endpoint addresses, direction bit included.
    pub endpoints: Vec<u8>,
}

/// Enumerated USB topology of a candidate device.
#[derive(Debug, Clone)]
pub struct DeviceTopology {
    /// USB vendor id.
    pub vendor_id: u16,
    /// USB product id; cached on the session as its device identity.
    pub product_id: u16,
    /// Alternate interface settings in enumeration order.
    pub settings: Vec<AltSetting>,
}

/// Signature bit of an endpoint address; unrecognized endpoints carry no
/// bit and never disturb a match.
fn endpoint_bit(address: u8) -> u8 {
    match address {
        0x81 => 0x01, // EP1 in
        0x01 => 0x02, // EP1 out
        0x82 => 0x04, // EP2 in
        0x02 => 0x08, // EP2 out
        0x86 => 0x10, // EP6 in
        0x87 => 0x40, // EP7 in
        _ => 0,
    }
}

/// USB2000 layout: EP2 out for commands, EP2 in for spectra, EP7 in for
/// status.
const USB2000_SIGNATURE: u8 = 0x4c;

/// USB2000+ layout: EP1 out for commands, EP2 in for spectra, EP1 in for
/// status, EP6 in unassigned.
const USB2000_PLUS_SIGNATURE: u8 = 0x17;

/// Match a topology against the two variant signatures and derive the pipe
/// bindings.
pub fn resolve(topology: &DeviceTopology) -> Result<(DeviceVariant, PipeBindings)> {
    for (index, setting) in topology.settings.iter().enumerate() {
        if setting.endpoints.len() != 4 {
            continue;
        }

        let mask = setting
            .endpoints
            .iter()
            .fold(0u8, |mask, &endpoint| mask | endpoint_bit(endpoint));

        if mask & USB2000_SIGNATURE == USB2000_SIGNATURE {
            debug!(setting = index, mask, "endpoint layout matches USB2000");
            return Ok((
                DeviceVariant::Usb2000,
                PipeBindings {
                    command_out: 0x02,
                    spectra_in: 0x82,
                    status_in: 0x87,
                    aux_in: None,
                },
            ));
        }

        if mask & USB2000_PLUS_SIGNATURE == USB2000_PLUS_SIGNATURE {
            debug!(setting = index, mask, "endpoint layout matches USB2000+");
            return Ok((
                DeviceVariant::Usb2000Plus,
                PipeBindings {
                    command_out: 0x01,
                    spectra_in: 0x82,
                    status_in: 0x81,
                    aux_in: Some(0x86),
                },
            ));
        }

        debug!(setting = index, mask, "alternate setting matches neither variant");
    }

    Err(Error::TopologyMismatch)
}
