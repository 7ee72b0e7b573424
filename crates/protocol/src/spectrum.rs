//! Spectrum response decoding.
//!
//! Both variants return 4097 bytes per spectrum: 4096 payload bytes holding
//! 2048 16-bit pixel intensities, plus one byte the firmware appends that
//! the decoder carries opaquely and never interprets. The variants pack the
//! payload differently: the USB2000 separates low and high bytes by a fixed
//! 64-byte block offset (an artifact of its internal packing), the USB2000+
//! uses plain little-endian pairs.

use crate::error::ProtocolError;
use crate::types::DeviceVariant;

/// Raw length of a spectrum response.
pub const SPECTRUM_RESPONSE_LEN: usize = 4097;

/// Pixels per spectrum.
pub const PIXEL_COUNT: usize = 2048;

/// First index of the optically dark pixel range.
pub const DARK_PIXEL_FIRST: usize = 6;

/// Last index (inclusive) of the optically dark pixel range.
pub const DARK_PIXEL_LAST: usize = 20;

/// Decode a raw spectrum response into 2048 ordered pixel intensities.
pub fn decode(variant: DeviceVariant, raw: &[u8]) -> Result<Vec<u16>, ProtocolError> {
    if raw.len() < SPECTRUM_RESPONSE_LEN {
        return Err(ProtocolError::ShortResponse {
            expected: SPECTRUM_RESPONSE_LEN,
            actual: raw.len(),
        });
    }

    let mut values = Vec::with_capacity(PIXEL_COUNT);
    for i in 0..PIXEL_COUNT {
        let (low, high) = match variant {
            DeviceVariant::Usb2000 => {
                let base = (i % 64) + (i / 64) * 128;
                (raw[base], raw[base + 64])
            }
            DeviceVariant::Usb2000Plus => (raw[2 * i], raw[2 * i + 1]),
        };
        values.push(u16::from(high) << 8 | u16::from(low));
    }
    Ok(values)
}

/// Dark baseline: mean intensity of the blocked pixels 6..=20.
///
/// A reporting aid only; it is never applied as a correction to the
/// primary series. Expects a full decoded spectrum.
pub fn baseline(values: &[u16]) -> f64 {
    let dark = &values[DARK_PIXEL_FIRST..=DARK_PIXEL_LAST];
    let sum: u32 = dark.iter().map(|&v| u32::from(v)).sum();
    f64::from(sum) / dark.len() as f64
}
