//! Text output: spectrum rows plus verbosity-selected metadata blocks.
//!
//! The data format is one space-separated row per pixel —
//! `index wavelength raw baseline-corrected` — with optional `#` comment
//! blocks around it, selected by a bitmask.

use std::io::{self, Write};

use chrono::Local;
use protocol::spectrum::{DARK_PIXEL_FIRST, DARK_PIXEL_LAST};

use crate::acquire::Acquisition;

/// Verbosity bits selecting optional metadata blocks.
pub mod verbosity {
    /// Serial number comment.
    pub const SERIAL: u32 = 1;
    /// Date and time of data taking.
    pub const TIMESTAMP: u32 = 2;
    /// Integration time.
    pub const INTEGRATION_TIME: u32 = 4;
    /// Generic column-description header.
    pub const HEADER: u32 = 8;
    /// CCD dark pixel level.
    pub const DARK_LEVEL: u32 = 16;
    /// Stored wavelength coefficients.
    pub const COEFFICIENTS: u32 = 32;
    /// USB device id.
    pub const DEVICE_ID: u32 = 64;
}

/// Write the spectrum and the metadata blocks `mask` selects.
pub fn write_spectrum(
    out: &mut dyn Write,
    acquisition: &Acquisition,
    mask: u32,
) -> io::Result<()> {
    if mask & verbosity::HEADER != 0 {
        writeln!(out, "# output of the ocean optics spectrometer.")?;
        writeln!(out, "# column 1: pixel index, column 2: wavelength in nm")?;
        writeln!(
            out,
            "# column 3: raw amplitude, column 4: baseline-corrected amplitude"
        )?;
        writeln!(out)?;
    }

    // Round half up, as the baseline is never negative.
    let dark = (acquisition.baseline + 0.5) as i64;
    for (index, &raw) in acquisition.values.iter().enumerate() {
        let wavelength = acquisition.coefficients.wavelength(index);
        writeln!(
            out,
            "{index} {wavelength:7.2} {raw} {}",
            i64::from(raw) - dark
        )?;
    }

    if mask & verbosity::HEADER != 0 {
        writeln!(out)?;
    }
    if mask & verbosity::SERIAL != 0
        && let Some(serial) = &acquisition.serial_number
    {
        writeln!(out, "# Serial No. {serial}")?;
    }
    if mask & verbosity::TIMESTAMP != 0 {
        writeln!(out, "# {}", Local::now().format("%a %d %b %Y %H:%M:%S"))?;
    }
    if mask & verbosity::INTEGRATION_TIME != 0 {
        writeln!(
            out,
            "# Integration time: {} ms",
            acquisition.integration_time_ms
        )?;
    }
    if mask & verbosity::DARK_LEVEL != 0 {
        writeln!(
            out,
            "# Black level from blocked pixels ({DARK_PIXEL_FIRST} to {DARK_PIXEL_LAST}): {:8.2}",
            acquisition.baseline
        )?;
    }
    if mask & verbosity::COEFFICIENTS != 0 {
        writeln!(out, "# wavelength conversion coefficients, lam = sum_i c_i index**i")?;
        for (index, coefficient) in acquisition.coefficients.0.iter().enumerate() {
            writeln!(out, "#  c{index} = {coefficient:.6}")?;
        }
    }
    if mask & verbosity::DEVICE_ID != 0 {
        writeln!(out, "# USB device ID: {:#x}", acquisition.device_id)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{DeviceVariant, WavelengthCoefficients};

    fn acquisition() -> Acquisition {
        let mut values = vec![100u16; 2048];
        values[0] = 110;
        Acquisition {
            variant: DeviceVariant::Usb2000Plus,
            device_id: 0x101e,
            serial_number: Some("USB2G1234".to_owned()),
            coefficients: WavelengthCoefficients([0.0, 1.0, 0.0, 0.0]),
            values,
            baseline: 100.4,
            integration_time_ms: 100,
        }
    }

    fn render(mask: u32) -> String {
        let mut buffer = Vec::new();
        write_spectrum(&mut buffer, &acquisition(), mask).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_rows_are_index_wavelength_raw_corrected() {
        let text = render(0);
        let mut lines = text.lines();
        // Baseline 100.4 rounds to 100.
        assert_eq!(lines.next().unwrap(), "0    0.00 110 10");
        assert_eq!(lines.next().unwrap(), "1    1.00 100 0");
        assert_eq!(text.lines().count(), 2048);
    }

    #[test]
    fn test_plain_output_has_no_comments() {
        let text = render(0);
        assert!(!text.contains('#'));
    }

    #[test]
    fn test_header_wraps_rows() {
        let text = render(verbosity::HEADER);
        assert!(text.starts_with("# output of the ocean optics spectrometer.\n"));
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn test_metadata_blocks_follow_mask() {
        let text = render(
            verbosity::SERIAL
                | verbosity::INTEGRATION_TIME
                | verbosity::DARK_LEVEL
                | verbosity::COEFFICIENTS
                | verbosity::DEVICE_ID,
        );
        assert!(text.contains("# Serial No. USB2G1234"));
        assert!(text.contains("# Integration time: 100 ms"));
        assert!(text.contains("# Black level from blocked pixels (6 to 20):   100.40"));
        assert!(text.contains("#  c1 = 1.000000"));
        assert!(text.contains("# USB device ID: 0x101e"));

        let text = render(verbosity::SERIAL);
        assert!(!text.contains("Integration time"));
        assert!(!text.contains("device ID"));
    }

    #[test]
    fn test_missing_serial_is_skipped() {
        let mut acquisition = acquisition();
        acquisition.serial_number = None;
        let mut buffer = Vec::new();
        write_spectrum(&mut buffer, &acquisition, verbosity::SERIAL).unwrap();
        assert!(!String::from_utf8(buffer).unwrap().contains("Serial"));
    }
}
