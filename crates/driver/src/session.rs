//! Per-device session state and the exclusive open handle.
//!
//! A [`Session`] is created at attach and destroyed at detach. The registry
//! owns it exclusively through an `Arc`; open handles hold a `Weak`
//! reference so detach can drop the session regardless of outstanding
//! handles, accepting a transient race over leaving a dangling session.

use std::sync::{Condvar, Mutex, MutexGuard, Weak};
use std::time::Duration;

use common::{Error, Result};
use protocol::{Command, DeviceVariant, SessionId};
use tracing::debug;

use crate::transport::BulkTransport;

/// Read timeout applied on every open, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u32 = 100;

/// Scratch buffer size; the largest response is the 4097-byte spectrum.
pub(crate) const RESPONSE_BUFFER_LEN: usize = 4100;

/// How long detach waits for an open session to close before tearing it
/// down anyway.
pub(crate) const DETACH_GRACE: Duration = Duration::from_millis(100);

/// Bulk pipe bindings derived from the endpoint topology at attach time.
/// Immutable for the life of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeBindings {
    /// OUT endpoint carrying command frames.
    pub command_out: u8,
    /// IN endpoint delivering 4097-byte spectra.
    pub spectra_in: u8,
    /// IN endpoint delivering status, information, and register responses.
    pub status_in: u8,
    /// Extra IN endpoint present on the USB2000+; bound but not used by any
    /// command in the table.
    pub aux_in: Option<u8>,
}

#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) open: bool,
    pub(crate) timeout_ms: u32,
}

/// Driver state for one attached spectrometer.
pub struct Session {
    id: SessionId,
    variant: DeviceVariant,
    pipes: PipeBindings,
    device_id: u32,
    transport: Box<dyn BulkTransport>,
    pub(crate) state: Mutex<SessionState>,
    pub(crate) closing: Condvar,
    scratch: Mutex<Vec<u8>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("variant", &self.variant)
            .field("pipes", &self.pipes)
            .field("device_id", &self.device_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        variant: DeviceVariant,
        pipes: PipeBindings,
        device_id: u32,
        transport: Box<dyn BulkTransport>,
    ) -> Self {
        Self {
            id,
            variant,
            pipes,
            device_id,
            transport,
            state: Mutex::new(SessionState {
                open: false,
                timeout_ms: DEFAULT_TIMEOUT_MS,
            }),
            closing: Condvar::new(),
            scratch: Mutex::new(vec![0u8; RESPONSE_BUFFER_LEN]),
        }
    }

    /// Registry id of this session.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Hardware variant resolved at attach time.
    pub fn variant(&self) -> DeviceVariant {
        self.variant
    }

    /// Pipe bindings resolved at attach time.
    pub fn pipes(&self) -> PipeBindings {
        self.pipes
    }

    /// Cached numeric device identity (the USB product id).
    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    /// Whether a handle currently holds the session open.
    pub fn is_open(&self) -> bool {
        self.state.lock().unwrap().open
    }

    /// Currently configured read timeout in milliseconds.
    pub fn timeout_ms(&self) -> u32 {
        self.state.lock().unwrap().timeout_ms
    }

    pub(crate) fn set_timeout_ms(&self, timeout_ms: u32) {
        self.state.lock().unwrap().timeout_ms = timeout_ms;
    }

    pub(crate) fn transport(&self) -> &dyn BulkTransport {
        self.transport.as_ref()
    }

    pub(crate) fn scratch_lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.scratch.lock().unwrap()
    }
}

/// Exclusive handle to an open session.
///
/// Dropping the handle closes the session and wakes any detach waiting on
/// it; [`SessionHandle::close`] exists for callers that want the close
/// explicit in their control flow. Using a handle after its session was
/// detached fails with [`Error::NotFound`].
#[derive(Debug)]
pub struct SessionHandle {
    session: Weak<Session>,
    id: SessionId,
}

impl SessionHandle {
    pub(crate) fn new(session: Weak<Session>, id: SessionId) -> Self {
        Self { session, id }
    }

    /// Registry id of the underlying session.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Hardware variant of the underlying session.
    pub fn variant(&self) -> Result<DeviceVariant> {
        Ok(self.session()?.variant())
    }

    /// Execute a logical command on this session.
    ///
    /// See [`crate::engine::execute`] for the full contract.
    pub fn execute(&self, command: Command, arg: Option<u32>, out: &mut [u8]) -> Result<usize> {
        let session = self.session()?;
        crate::engine::execute(&session, command, arg, out)
    }

    /// Execute a raw-coded command; unknown codes fail with `NotSupported`.
    pub fn execute_code(&self, code: u16, arg: Option<u32>, out: &mut [u8]) -> Result<usize> {
        let session = self.session()?;
        crate::engine::execute_code(&session, code, arg, out)
    }

    /// Close the session. Equivalent to dropping the handle.
    pub fn close(self) {}

    fn session(&self) -> Result<std::sync::Arc<Session>> {
        self.session.upgrade().ok_or(Error::NotFound(self.id))
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(session) = self.session.upgrade() {
            let mut state = session.state.lock().unwrap();
            state.open = false;
            session.closing.notify_all();
            debug!(id = self.id.0, "session closed");
        }
    }
}
