//! Session manager and command protocol engine for Ocean Optics
//! USB2000 / USB2000+ spectrometers.
//!
//! The driver multiplexes access to one or more attached spectrometers:
//! a registry tracks sessions keyed by externally assigned ids, a topology
//! resolver matches enumerated endpoints against the two known variant
//! layouts, and the protocol engine translates logical commands into exact
//! byte-level bulk transactions. The two incompatible hardware generations
//! share one engine; only the descriptor table and the pipe bindings
//! differ.
//!
//! Everything except [`usb`] is written against the [`BulkTransport`]
//! trait, so protocol behavior is fully testable without hardware.
//!
//! # Example
//!
//! ```no_run
//! use driver::{DeviceRegistry, usb};
//! use protocol::{Command, SessionId};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let context = rusb::Context::new()?;
//! let registry = DeviceRegistry::new();
//!
//! for (index, device) in usb::discover(&context)?.iter().enumerate() {
//!     let topology = usb::probe_topology(device)?;
//!     let transport = usb::open_transport(device)?;
//!     registry.attach(SessionId(index as u32), &topology, Box::new(transport))?;
//! }
//!
//! let handle = registry.open(SessionId(0))?;
//! handle.execute(Command::InitializeDevice, None, &mut [])?;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod registry;
pub mod session;
pub mod topology;
pub mod transport;
pub mod usb;

pub use engine::{execute, execute_code};
pub use registry::DeviceRegistry;
pub use session::{DEFAULT_TIMEOUT_MS, PipeBindings, Session, SessionHandle};
pub use topology::{AltSetting, DeviceTopology};
pub use transport::{BulkTransport, TransportError};
