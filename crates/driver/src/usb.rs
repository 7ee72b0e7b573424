//! rusb glue: discovery, topology probing, and the bulk transport.
//!
//! Everything that touches libusb lives here so the rest of the driver
//! stays hardware-free. Opening a device detaches any kernel driver and
//! claims the spectrometer interface; dropping the transport releases the
//! interface and hands the device back to the kernel.

use std::time::Duration;

use common::{Error, Result};
use rusb::{Context, Device, DeviceHandle, UsbContext};
use tracing::{debug, warn};

use crate::topology::{AltSetting, DeviceTopology};
use crate::transport::{BulkTransport, TransportError};

/// Ocean Optics vendor id.
pub const VENDOR_ID: u16 = 0x2457;

/// USB2000 product id.
pub const PRODUCT_USB2000: u16 = 0x1002;

/// USB2000+ product id.
pub const PRODUCT_USB2000_PLUS: u16 = 0x101e;

/// The single interface both variants expose their bulk endpoints on.
const INTERFACE: u8 = 0;

/// List attached spectrometers, in bus enumeration order.
pub fn discover(context: &Context) -> Result<Vec<Device<Context>>> {
    let devices = context.devices().map_err(usb_error)?;

    let mut found = Vec::new();
    for device in devices.iter() {
        let Ok(descriptor) = device.device_descriptor() else {
            continue;
        };
        if descriptor.vendor_id() != VENDOR_ID {
            continue;
        }
        if matches!(
            descriptor.product_id(),
            PRODUCT_USB2000 | PRODUCT_USB2000_PLUS
        ) {
            debug!(
                bus = device.bus_number(),
                address = device.address(),
                product_id = descriptor.product_id(),
                "found spectrometer"
            );
            found.push(device);
        }
    }
    Ok(found)
}

/// Read the endpoint topology of a candidate device from its active
/// configuration descriptor.
pub fn probe_topology(device: &Device<Context>) -> Result<DeviceTopology> {
    let descriptor = device.device_descriptor().map_err(usb_error)?;
    let config = device.active_config_descriptor().map_err(usb_error)?;

    let mut settings = Vec::new();
    for interface in config.interfaces() {
        for alt in interface.descriptors() {
            settings.push(AltSetting {
                endpoints: alt
                    .endpoint_descriptors()
                    .map(|endpoint| endpoint.address())
                    .collect(),
            });
        }
    }

    Ok(DeviceTopology {
        vendor_id: descriptor.vendor_id(),
        product_id: descriptor.product_id(),
        settings,
    })
}

/// Open a device for bulk access: detach any kernel driver and claim the
/// spectrometer interface.
pub fn open_transport(device: &Device<Context>) -> Result<UsbTransport> {
    let handle = device.open().map_err(usb_error)?;

    match handle.kernel_driver_active(INTERFACE) {
        Ok(true) => {
            debug!(interface = INTERFACE, "detaching kernel driver");
            if let Err(e) = handle.detach_kernel_driver(INTERFACE) {
                warn!(interface = INTERFACE, error = %e, "failed to detach kernel driver");
            }
        }
        Ok(false) => {}
        Err(e) => debug!(interface = INTERFACE, error = %e, "kernel driver status unknown"),
    }

    handle.claim_interface(INTERFACE).map_err(usb_error)?;
    debug!(interface = INTERFACE, "claimed spectrometer interface");

    Ok(UsbTransport { handle })
}

/// [`BulkTransport`] backed by a claimed rusb device handle.
pub struct UsbTransport {
    handle: DeviceHandle<Context>,
}

impl BulkTransport for UsbTransport {
    fn write_bulk(
        &self,
        endpoint: u8,
        data: &[u8],
        timeout: Duration,
    ) -> std::result::Result<usize, TransportError> {
        self.handle
            .write_bulk(endpoint, data, timeout)
            .map_err(map_transfer_error)
    }

    fn read_bulk(
        &self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> std::result::Result<usize, TransportError> {
        self.handle
            .read_bulk(endpoint, buf, timeout)
            .map_err(map_transfer_error)
    }
}

impl Drop for UsbTransport {
    fn drop(&mut self) {
        if let Err(e) = self.handle.release_interface(INTERFACE) {
            warn!(interface = INTERFACE, error = %e, "failed to release interface");
        }
        // Hand the device back to the kernel; failing is fine when no
        // driver was attached in the first place.
        if let Err(e) = self.handle.attach_kernel_driver(INTERFACE) {
            debug!(interface = INTERFACE, error = %e, "kernel driver not reattached");
        }
    }
}

/// Map rusb transfer failures onto the transport error kinds. Timeouts
/// stay distinguishable; everything else collapses into an I/O failure.
fn map_transfer_error(err: rusb::Error) -> TransportError {
    match err {
        rusb::Error::Timeout => TransportError::Timeout,
        other => TransportError::Io(other.to_string()),
    }
}

fn usb_error(err: rusb::Error) -> Error {
    Error::DeviceIo(err.to_string())
}
