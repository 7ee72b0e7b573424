//! Wire protocol for Ocean Optics USB2000 / USB2000+ spectrometers.
//!
//! This crate defines the logical command set and the static descriptor
//! table that drives wire encoding, plus the decoding side of the protocol:
//! spectrum de-interleaving, textual information fields, and the
//! wavelength-coefficient mapping. It is deliberately free of any USB
//! dependency so everything here can be exercised byte-for-byte in tests.
//!
//! # Example
//!
//! ```
//! use protocol::{Command, frame};
//!
//! // A spectrum request is a single command token on the wire.
//! let frame = frame::encode(Command::RequestSpectra, 0);
//! assert_eq!(frame.as_bytes(), &[0x09]);
//!
//! // An integration time carries its 32-bit argument little-endian.
//! let frame = frame::encode(Command::SetIntegrationTime, 100_000);
//! assert_eq!(frame.as_bytes(), &[0x02, 0xa0, 0x86, 0x01, 0x00]);
//! ```

pub mod command;
pub mod error;
pub mod frame;
pub mod info;
pub mod spectrum;
pub mod types;

pub use command::{ArgWidth, Command, CommandDescriptor, Confidence, ResponsePipe, TimeoutClass};
pub use error::{ProtocolError, Result};
pub use frame::{Frame, MAX_FRAME_LEN};
pub use info::{WavelengthCoefficients, SERIAL_NUMBER_FIELD, WAVELENGTH_FIELD_BASE};
pub use spectrum::{PIXEL_COUNT, SPECTRUM_RESPONSE_LEN};
pub use types::{DeviceVariant, SessionId};
