//! Bulk-transport seam between the engine and the USB stack.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single bulk transfer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The transfer did not complete within its timeout.
    #[error("bulk transfer timed out")]
    Timeout,

    /// The transfer failed outright, typically because the device is gone.
    #[error("bulk transfer failed: {0}")]
    Io(String),
}

/// Synchronous bulk pipe access to one device.
///
/// Transfers block the caller for up to the given timeout and are never
/// retried at this layer. The engine is written against this trait;
/// [`crate::usb::UsbTransport`] is the rusb-backed implementation, and the
/// driver tests script their own.
pub trait BulkTransport: Send + Sync {
    /// Write `data` to an OUT endpoint, blocking up to `timeout`.
    fn write_bulk(&self, endpoint: u8, data: &[u8], timeout: Duration)
    -> Result<usize, TransportError>;

    /// Read into `buf` from an IN endpoint, blocking up to `timeout`.
    ///
    /// Returns the number of bytes actually delivered, which may be short
    /// of `buf.len()` when the device sends a partial packet.
    fn read_bulk(&self, endpoint: u8, buf: &mut [u8], timeout: Duration)
    -> Result<usize, TransportError>;
}
