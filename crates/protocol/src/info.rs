//! Textual information fields and the wavelength mapping.
//!
//! QueryInformation returns an indexed text field: byte 0 echoes the
//! request, byte 1 is the field index, and the printable payload starts at
//! offset 2, NUL-terminated. Field 0 carries the serial number; fields 1
//! through 4 carry the wavelength polynomial coefficients as decimal text.

use crate::error::ProtocolError;

/// Offset where the printable payload of an information field starts.
pub const FIELD_TEXT_OFFSET: usize = 2;

/// QueryInformation field index of the serial number.
pub const SERIAL_NUMBER_FIELD: u8 = 0;

/// QueryInformation field index of the first wavelength coefficient;
/// the remaining three follow consecutively.
pub const WAVELENGTH_FIELD_BASE: u8 = 1;

/// Extract the printable text of an information field response.
pub fn field_text(response: &[u8]) -> Result<String, ProtocolError> {
    if response.len() <= FIELD_TEXT_OFFSET {
        return Err(ProtocolError::ShortResponse {
            expected: FIELD_TEXT_OFFSET + 1,
            actual: response.len(),
        });
    }
    let payload = &response[FIELD_TEXT_OFFSET..];
    let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
    Ok(String::from_utf8_lossy(&payload[..end]).trim().to_owned())
}

/// Parse an information field as a floating-point number, the layout the
/// wavelength coefficient fields use.
pub fn field_f64(response: &[u8]) -> Result<f64, ProtocolError> {
    let text = field_text(response)?;
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| ProtocolError::MalformedField("empty field".to_owned()))?;
    token
        .parse::<f64>()
        .map_err(|_| ProtocolError::MalformedField(format!("not a number: {token:?}")))
}

/// Polynomial index-to-wavelength mapping, four coefficients per device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavelengthCoefficients(pub [f64; 4]);

impl WavelengthCoefficients {
    /// Wavelength in nm of a pixel index: `c0 + i*(c1 + i*(c2 + i*c3))`.
    pub fn wavelength(&self, index: usize) -> f64 {
        let [c0, c1, c2, c3] = self.0;
        let i = index as f64;
        c0 + i * (c1 + i * (c2 + i * c3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::PIXEL_COUNT;

    fn field_response(text: &str) -> Vec<u8> {
        let mut response = vec![0x05, 0x01];
        response.extend_from_slice(text.as_bytes());
        response.push(0);
        response.resize(18, 0xaa);
        response
    }

    #[test]
    fn test_field_text_stops_at_nul() {
        let response = field_response("USB2G12345");
        assert_eq!(field_text(&response).unwrap(), "USB2G12345");
    }

    #[test]
    fn test_field_text_short_response() {
        assert_eq!(
            field_text(&[0x05, 0x01]),
            Err(ProtocolError::ShortResponse {
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_field_f64_scientific_notation() {
        let response = field_response(" 3.123456e-01");
        let value = field_f64(&response).unwrap();
        assert!((value - 0.312_345_6).abs() < 1e-12);
    }

    #[test]
    fn test_field_f64_rejects_garbage() {
        let response = field_response("not-a-number");
        assert!(matches!(
            field_f64(&response),
            Err(ProtocolError::MalformedField(_))
        ));
    }

    #[test]
    fn test_identity_coefficients() {
        let coefficients = WavelengthCoefficients([0.0, 1.0, 0.0, 0.0]);
        for i in 0..PIXEL_COUNT {
            assert!((coefficients.wavelength(i) - i as f64).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_polynomial_expansion() {
        let coefficients = WavelengthCoefficients([350.0, 0.5, -1e-5, 2e-9]);
        let i = 1000.0f64;
        let expected = 350.0 + i * (0.5 + i * (-1e-5 + i * 2e-9));
        assert!((coefficients.wavelength(1000) - expected).abs() < 1e-9);
    }
}
