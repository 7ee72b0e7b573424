//! Logical command set and the descriptor table driving wire encoding.
//!
//! Each logical command maps to exactly one static [`CommandDescriptor`]
//! describing its argument width, whether it carries a write, the shape of
//! its response, and which timeout governs the read. The engine computes
//! everything from the descriptor; there is no per-command dispatch code.
//!
//! Command codes are 16-bit: the high byte selects one of two command sets
//! and the low byte doubles as the USB command token. The primary set
//! (0xaa) maps one-to-one onto firmware commands; the extended set (0xab)
//! holds driver-local commands and firmware tokens the primary set already
//! uses with different semantics.

use crate::error::ProtocolError;

const SET_PRIMARY: u16 = 0xaa00;
const SET_EXTENDED: u16 = 0xab00;

/// Logical commands accepted by the protocol engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Device handshake after power-up.
    InitializeDevice,
    /// Integration time, 32-bit argument; unit depends on the variant.
    SetIntegrationTime,
    /// 16-bit variant of the integration time command.
    SetIntegrationTimeShort,
    /// External trigger mode.
    SetTriggerMode,
    /// CCD shutdown mode.
    SetShutdownMode,
    /// Strobe output enable.
    SetStrobeEnable,
    /// Indexed text field: serial number, wavelength coefficients.
    QueryInformation,
    /// Raw firmware register read.
    ReadRegister,
    /// PCB temperature sensor read.
    ReadPcbTemperature,
    /// Request a full 4097-byte spectrum.
    RequestSpectra,
    /// 16-byte device status block.
    QueryStatus,
    /// Fire a spectrum request without reading it back.
    TriggerPacket,
    /// Drain stale data from the spectra pipe without sending anything.
    EmptyPipe,
    /// Driver-local: set the session read timeout in milliseconds.
    SetTimeout,
    /// Driver-local: return the cached 4-byte device identity.
    GetDeviceId,
}

/// Argument width of a command, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgWidth {
    /// No argument; the frame is the bare command token.
    None,
    /// One argument byte at frame offset 1.
    U8,
    /// Two argument bytes, little-endian.
    U16,
    /// Four argument bytes, little-endian.
    U32,
}

impl ArgWidth {
    /// Total outbound frame length for this width, command token included.
    pub fn frame_len(self) -> usize {
        match self {
            ArgWidth::None => 1,
            ArgWidth::U8 => 2,
            ArgWidth::U16 => 3,
            ArgWidth::U32 => 5,
        }
    }
}

/// Which inbound pipe a response arrives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsePipe {
    /// The large spectra pipe (4097-byte responses).
    Spectra,
    /// The status pipe (information, status, and register responses).
    Status,
}

/// Which timeout governs a response read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutClass {
    /// Fixed short protocol timeout (100 ms).
    Short,
    /// Fixed 1 s timeout for the slow register reads.
    Extended,
    /// The caller-configured session timeout.
    Session,
}

/// How well a command is validated against real hardware.
///
/// The command set was taken from the USB2000+ OEM description and only
/// partially verified on both devices, so the table records the status per
/// command instead of presenting them all as equally trustworthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// Observed working on hardware.
    Confirmed,
    /// Does something plausible, not fully verified.
    Partial,
    /// Taken from the device description, never verified.
    Unconfirmed,
}

/// Static wire metadata for one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Dispatch code; the low byte is the USB command token.
    pub code: u16,
    /// Argument width.
    pub arg: ArgWidth,
    /// Whether the command writes a frame to the command pipe.
    pub sends_frame: bool,
    /// Expected response length in bytes, 0 for none.
    pub response_len: usize,
    /// Pipe the response arrives on; meaningful only when `response_len > 0`.
    pub response_pipe: ResponsePipe,
    /// Timeout class for the response read.
    pub timeout: TimeoutClass,
    /// Satisfied from session state, no USB interaction.
    pub local: bool,
    /// Hardware-validation status.
    pub confidence: Confidence,
}

impl Command {
    /// Every known command, in code order.
    pub const ALL: [Command; 15] = [
        Command::InitializeDevice,
        Command::SetIntegrationTime,
        Command::SetStrobeEnable,
        Command::SetShutdownMode,
        Command::QueryInformation,
        Command::RequestSpectra,
        Command::SetTriggerMode,
        Command::ReadRegister,
        Command::ReadPcbTemperature,
        Command::QueryStatus,
        Command::EmptyPipe,
        Command::SetTimeout,
        Command::SetIntegrationTimeShort,
        Command::TriggerPacket,
        Command::GetDeviceId,
    ];

    /// Descriptor table entry for this command.
    pub const fn descriptor(self) -> CommandDescriptor {
        use ArgWidth::*;
        use Confidence::*;
        use ResponsePipe::*;
        use TimeoutClass::*;

        const fn entry(
            code: u16,
            arg: ArgWidth,
            sends_frame: bool,
            response_len: usize,
            response_pipe: ResponsePipe,
            timeout: TimeoutClass,
            local: bool,
            confidence: Confidence,
        ) -> CommandDescriptor {
            CommandDescriptor {
                code,
                arg,
                sends_frame,
                response_len,
                response_pipe,
                timeout,
                local,
                confidence,
            }
        }

        match self {
            Command::InitializeDevice => {
                entry(SET_PRIMARY | 0x01, None, true, 0, Status, Short, false, Partial)
            }
            Command::SetIntegrationTime => {
                entry(SET_PRIMARY | 0x02, U32, true, 0, Status, Short, false, Confirmed)
            }
            Command::SetStrobeEnable => {
                entry(SET_PRIMARY | 0x03, U16, true, 0, Status, Short, false, Unconfirmed)
            }
            Command::SetShutdownMode => {
                entry(SET_PRIMARY | 0x04, U16, true, 0, Status, Short, false, Unconfirmed)
            }
            Command::QueryInformation => {
                entry(SET_PRIMARY | 0x05, U8, true, 18, Status, Short, false, Confirmed)
            }
            Command::RequestSpectra => {
                entry(SET_PRIMARY | 0x09, None, true, 4097, Spectra, Session, false, Confirmed)
            }
            Command::SetTriggerMode => {
                entry(SET_PRIMARY | 0x0a, U16, true, 0, Status, Short, false, Unconfirmed)
            }
            Command::ReadRegister => {
                entry(SET_PRIMARY | 0x6b, U8, true, 3, Status, Extended, false, Unconfirmed)
            }
            Command::ReadPcbTemperature => {
                entry(SET_PRIMARY | 0x6c, None, true, 3, Status, Extended, false, Partial)
            }
            Command::QueryStatus => {
                entry(SET_PRIMARY | 0xfe, None, true, 16, Status, Short, false, Partial)
            }
            Command::EmptyPipe => {
                entry(SET_EXTENDED, None, false, 4097, Spectra, Session, false, Confirmed)
            }
            Command::SetTimeout => {
                entry(SET_EXTENDED | 0x01, U32, false, 0, Status, Short, true, Confirmed)
            }
            Command::SetIntegrationTimeShort => {
                entry(SET_EXTENDED | 0x02, U16, true, 0, Status, Short, false, Unconfirmed)
            }
            Command::TriggerPacket => {
                entry(SET_EXTENDED | 0x09, None, true, 0, Status, Short, false, Confirmed)
            }
            Command::GetDeviceId => {
                entry(SET_EXTENDED | 0x99, None, false, 4, Status, Short, true, Confirmed)
            }
        }
    }

    /// Dispatch code of this command.
    pub const fn code(self) -> u16 {
        self.descriptor().code
    }

    /// USB command token: the low byte of the code, byte 0 of every frame.
    pub const fn wire_byte(self) -> u8 {
        (self.code() & 0xff) as u8
    }

    /// Resolve a raw dispatch code; unmapped codes are rejected.
    pub fn from_code(code: u16) -> Result<Command, ProtocolError> {
        Command::ALL
            .into_iter()
            .find(|command| command.code() == code)
            .ok_or(ProtocolError::UnknownCommand(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        for a in Command::ALL {
            for b in Command::ALL {
                if a != b {
                    assert_ne!(a.code(), b.code(), "{a:?} and {b:?} share a code");
                }
            }
        }
    }

    #[test]
    fn test_from_code_roundtrip() {
        for command in Command::ALL {
            assert_eq!(Command::from_code(command.code()), Ok(command));
        }
    }

    #[test]
    fn test_from_code_rejects_unknown() {
        assert_eq!(
            Command::from_code(0x1234),
            Err(ProtocolError::UnknownCommand(0x1234))
        );
        // A bare firmware token without its set byte is not a valid code.
        assert_eq!(
            Command::from_code(0x0009),
            Err(ProtocolError::UnknownCommand(0x0009))
        );
    }

    #[test]
    fn test_shared_wire_tokens() {
        // The trigger command reuses the spectrum-request token; only the
        // read side differs.
        assert_eq!(
            Command::TriggerPacket.wire_byte(),
            Command::RequestSpectra.wire_byte()
        );
        assert_eq!(Command::TriggerPacket.descriptor().response_len, 0);
        assert_eq!(Command::RequestSpectra.descriptor().response_len, 4097);
    }

    #[test]
    fn test_local_commands_stay_off_the_wire() {
        for command in Command::ALL {
            let descriptor = command.descriptor();
            if descriptor.local {
                assert!(!descriptor.sends_frame, "{command:?} is local but writes");
            }
        }
    }

    #[test]
    fn test_spectra_responses_use_spectra_pipe() {
        for command in Command::ALL {
            let descriptor = command.descriptor();
            if descriptor.response_len == 4097 {
                assert_eq!(descriptor.response_pipe, ResponsePipe::Spectra);
                assert_eq!(descriptor.timeout, TimeoutClass::Session);
            }
        }
    }
}
