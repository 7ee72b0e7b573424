//! Shared identity types
//!
//! Small copyable newtypes used across the driver and its consumers.

/// Registry key of an attached spectrometer session.
///
/// Ids are allocated by the surrounding environment (enumeration order,
/// device node slot, test fixture) and passed in; the registry never
/// generates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u32);

/// The two supported hardware generations.
///
/// They differ in endpoint layout, spectrum byte interleaving, and the unit
/// of the integration-time argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceVariant {
    /// First-generation USB2000.
    Usb2000,
    /// USB2000+ firmware with the flat pixel layout.
    Usb2000Plus,
}

impl DeviceVariant {
    /// Integration-time ticks per millisecond.
    ///
    /// The USB2000 takes [`crate::Command::SetIntegrationTime`] arguments in
    /// milliseconds, the USB2000+ in microseconds.
    pub fn integration_ticks_per_ms(self) -> u32 {
        match self {
            DeviceVariant::Usb2000 => 1,
            DeviceVariant::Usb2000Plus => 1_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_equality() {
        assert_eq!(SessionId(7), SessionId(7));
        assert_ne!(SessionId(7), SessionId(8));
    }

    #[test]
    fn test_integration_units() {
        assert_eq!(DeviceVariant::Usb2000.integration_ticks_per_ms(), 1);
        assert_eq!(DeviceVariant::Usb2000Plus.integration_ticks_per_ms(), 1_000);
    }
}
