//! Spectrum acquisition flow.
//!
//! The canonical sequence against a freshly opened session: configure the
//! integration time, initialize, read the wavelength coefficients, drain
//! stale data with a short timeout until the pipe runs dry, then fetch one
//! spectrum under a long timeout.

use anyhow::{Context, Result, ensure};
use common::Error;
use driver::SessionHandle;
use protocol::spectrum::{self, SPECTRUM_RESPONSE_LEN};
use protocol::{Command, DeviceVariant, WavelengthCoefficients, info};
use tracing::debug;

/// Knobs of one acquisition run.
pub struct AcquireSettings {
    /// Integration time in milliseconds.
    pub integration_time_ms: u32,
    /// Session timeout while draining stale spectra.
    pub drain_timeout_ms: u32,
    /// Session timeout for the spectrum read itself.
    pub spectrum_timeout_ms: u32,
    /// Also fetch the serial-number field.
    pub read_serial: bool,
}

/// One acquired spectrum with everything needed to report it.
pub struct Acquisition {
    pub variant: DeviceVariant,
    pub device_id: u32,
    pub serial_number: Option<String>,
    pub coefficients: WavelengthCoefficients,
    pub values: Vec<u16>,
    pub baseline: f64,
    pub integration_time_ms: u32,
}

/// Run one acquisition against an open session.
pub fn acquire(handle: &SessionHandle, settings: &AcquireSettings) -> Result<Acquisition> {
    let variant = handle.variant()?;

    let mut id_bytes = [0u8; 4];
    handle.execute(Command::GetDeviceId, None, &mut id_bytes)?;
    let device_id = u32::from_le_bytes(id_bytes);

    let ticks = settings.integration_time_ms * variant.integration_ticks_per_ms();
    handle
        .execute(Command::SetIntegrationTime, Some(ticks), &mut [])
        .context("setting integration time")?;
    handle
        .execute(Command::InitializeDevice, None, &mut [])
        .context("initializing device")?;

    let mut response = [0u8; 18];
    let mut coefficients = [0f64; 4];
    for (slot, coefficient) in coefficients.iter_mut().enumerate() {
        let field = info::WAVELENGTH_FIELD_BASE + slot as u8;
        let n = handle
            .execute(Command::QueryInformation, Some(u32::from(field)), &mut response)
            .with_context(|| format!("querying information field {field}"))?;
        *coefficient = info::field_f64(&response[..n])
            .with_context(|| format!("parsing wavelength coefficient c{slot}"))?;
    }
    let coefficients = WavelengthCoefficients(coefficients);
    debug!(?coefficients, "wavelength coefficients read");

    let serial_number = if settings.read_serial {
        let n = handle
            .execute(
                Command::QueryInformation,
                Some(u32::from(info::SERIAL_NUMBER_FIELD)),
                &mut response,
            )
            .context("querying serial number")?;
        Some(info::field_text(&response[..n]).context("parsing serial number")?)
    } else {
        None
    };

    // Drain leftovers from an earlier run; only a timeout means empty.
    handle.execute(Command::SetTimeout, Some(settings.drain_timeout_ms), &mut [])?;
    let mut raw = vec![0u8; SPECTRUM_RESPONSE_LEN];
    loop {
        match handle.execute(Command::EmptyPipe, None, &mut raw) {
            Ok(n) => debug!(bytes = n, "drained stale spectrum data"),
            Err(Error::Timeout) => break,
            Err(e) => return Err(e).context("draining spectra pipe"),
        }
    }

    handle.execute(Command::SetTimeout, Some(settings.spectrum_timeout_ms), &mut [])?;
    let n = handle
        .execute(Command::RequestSpectra, None, &mut raw)
        .context("retrieving spectrum")?;
    ensure!(
        n == SPECTRUM_RESPONSE_LEN,
        "short spectrum response: {n} of {SPECTRUM_RESPONSE_LEN} bytes"
    );

    let values = spectrum::decode(variant, &raw)?;
    let baseline = spectrum::baseline(&values);

    Ok(Acquisition {
        variant,
        device_id,
        serial_number,
        coefficients,
        values,
        baseline,
        integration_time_ms: settings.integration_time_ms,
    })
}
