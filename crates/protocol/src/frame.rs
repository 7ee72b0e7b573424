//! Outbound wire-frame construction.
//!
//! A frame is the command token followed by 0, 1, 2, or 4 argument bytes in
//! little-endian order, as the descriptor width calls for. The largest
//! frame is 5 bytes.

use crate::command::{ArgWidth, Command};

/// Largest frame: command token plus a 4-byte argument.
pub const MAX_FRAME_LEN: usize = 5;

/// An encoded command frame with fixed backing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl Frame {
    /// The bytes that go on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Frame length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// A frame is never empty; this exists for completeness.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Build the outbound frame for `command`.
///
/// Byte 0 is the command token. Argument bytes follow little-endian; a
/// width narrower than 4 bytes transmits only the low part of `arg`.
pub fn encode(command: Command, arg: u32) -> Frame {
    let mut bytes = [0u8; MAX_FRAME_LEN];
    bytes[0] = command.wire_byte();

    let width = command.descriptor().arg;
    let argument = arg.to_le_bytes();
    match width {
        ArgWidth::None => {}
        ArgWidth::U8 => bytes[1] = argument[0],
        ArgWidth::U16 => bytes[1..3].copy_from_slice(&argument[..2]),
        ArgWidth::U32 => bytes[1..5].copy_from_slice(&argument),
    }

    Frame {
        bytes,
        len: width.frame_len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_frames_token_and_width() {
        for command in Command::ALL {
            let descriptor = command.descriptor();
            let frame = encode(command, 0xa1b2_c3d4);
            assert_eq!(frame.as_bytes()[0], command.wire_byte(), "{command:?}");
            assert_eq!(frame.len(), descriptor.arg.frame_len(), "{command:?}");
        }
    }

    #[test]
    fn test_u32_argument_little_endian() {
        let frame = encode(Command::SetIntegrationTime, 0x0403_0201);
        assert_eq!(frame.as_bytes(), &[0x02, 0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_u16_argument() {
        let frame = encode(Command::SetTriggerMode, 0x0102);
        assert_eq!(frame.as_bytes(), &[0x0a, 0x02, 0x01]);
    }

    #[test]
    fn test_u8_argument_truncates() {
        let frame = encode(Command::QueryInformation, 0x0103);
        assert_eq!(frame.as_bytes(), &[0x05, 0x03]);
    }

    #[test]
    fn test_bare_token() {
        assert_eq!(encode(Command::InitializeDevice, 0).as_bytes(), &[0x01]);
        assert_eq!(encode(Command::QueryStatus, 0).as_bytes(), &[0xfe]);
        assert_eq!(encode(Command::TriggerPacket, 0).as_bytes(), &[0x09]);
    }
}
