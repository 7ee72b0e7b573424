//! Command protocol engine: logical commands to bulk transactions.
//!
//! One pass, driven entirely by the descriptor table: validate the caller
//! buffer, satisfy local commands from session state, write the frame with
//! the fixed protocol timeout, then read the response with the timeout
//! class the descriptor names. Nothing here retries; the caller owns retry
//! policy, and drain loops rely on `Timeout` surfacing as-is.

use std::ops::RangeInclusive;
use std::time::Duration;

use common::{Error, Result};
use protocol::command::{ArgWidth, Command, ResponsePipe, TimeoutClass};
use protocol::frame;
use tracing::{debug, trace, warn};

use crate::session::Session;
use crate::transport::TransportError;

/// Fixed timeout for outbound command frames.
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// Fixed timeout for short protocol reads.
const SHORT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Fixed timeout for the slow register reads.
const EXTENDED_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Inclusive bounds accepted by [`Command::SetTimeout`], in milliseconds.
pub const TIMEOUT_RANGE_MS: RangeInclusive<u32> = 1..=99_999;

/// Execute a raw-coded command; unmapped codes fail with `NotSupported`.
pub fn execute_code(session: &Session, code: u16, arg: Option<u32>, out: &mut [u8]) -> Result<usize> {
    let command = Command::from_code(code).map_err(|_| Error::NotSupported(code))?;
    execute(session, command, arg, out)
}

/// Execute one logical command against an attached session.
///
/// Returns the number of response bytes delivered into `out`, 0 for
/// commands without a response. The session read timeout is the only state
/// a call may leave behind.
pub fn execute(session: &Session, command: Command, arg: Option<u32>, out: &mut [u8]) -> Result<usize> {
    let descriptor = command.descriptor();

    let arg_value = match (descriptor.arg, arg) {
        (ArgWidth::None, _) => 0,
        (_, Some(value)) => value,
        (_, None) => return Err(Error::InvalidArgument("command requires an argument")),
    };

    // Reject a doomed call before it can touch the device.
    if out.len() < descriptor.response_len {
        return Err(Error::BufferTooSmall {
            needed: descriptor.response_len,
            available: out.len(),
        });
    }

    if descriptor.local {
        return execute_local(session, command, arg_value, out);
    }

    if descriptor.sends_frame {
        let frame = frame::encode(command, arg_value);
        trace!(?command, frame = ?frame.as_bytes(), "sending command frame");
        session
            .transport()
            .write_bulk(session.pipes().command_out, frame.as_bytes(), WRITE_TIMEOUT)
            .map_err(|e| {
                warn!(?command, error = %e, "command frame write failed");
                Error::DeviceIo(e.to_string())
            })?;
    }

    if descriptor.response_len == 0 {
        return Ok(0);
    }

    let endpoint = match descriptor.response_pipe {
        ResponsePipe::Spectra => session.pipes().spectra_in,
        ResponsePipe::Status => session.pipes().status_in,
    };
    let timeout = match descriptor.timeout {
        TimeoutClass::Short => SHORT_READ_TIMEOUT,
        TimeoutClass::Extended => EXTENDED_READ_TIMEOUT,
        TimeoutClass::Session => Duration::from_millis(u64::from(session.timeout_ms())),
    };

    let mut scratch = session.scratch_lock();
    let delivered = session
        .transport()
        .read_bulk(endpoint, &mut scratch[..descriptor.response_len], timeout)
        .map_err(|e| match e {
            TransportError::Timeout => Error::Timeout,
            TransportError::Io(message) => {
                warn!(?command, error = %message, "response read failed");
                Error::DeviceIo(message)
            }
        })?;
    out[..delivered].copy_from_slice(&scratch[..delivered]);

    debug!(?command, bytes = delivered, "response delivered");
    Ok(delivered)
}

/// Commands satisfied from session state, without USB interaction.
fn execute_local(session: &Session, command: Command, arg: u32, out: &mut [u8]) -> Result<usize> {
    match command {
        Command::SetTimeout => {
            if !TIMEOUT_RANGE_MS.contains(&arg) {
                return Err(Error::InvalidArgument("timeout must be within 1..=99999 ms"));
            }
            session.set_timeout_ms(arg);
            debug!(timeout_ms = arg, "session read timeout updated");
            Ok(0)
        }
        Command::GetDeviceId => {
            out[..4].copy_from_slice(&session.device_id().to_le_bytes());
            Ok(4)
        }
        _ => unreachable!("descriptor table marks no other command local"),
    }
}
