//! Session registry: attach, detach, lookup, open.
//!
//! Sessions are keyed by externally assigned [`SessionId`]s in a map under
//! one mutex; that mutex and the per-session state mutex are the only
//! concurrency control in the driver.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use common::{Error, Result};
use protocol::SessionId;
use tracing::{debug, info, warn};

use crate::session::{DEFAULT_TIMEOUT_MS, DETACH_GRACE, Session, SessionHandle};
use crate::topology::{self, DeviceTopology};
use crate::transport::BulkTransport;

/// Registry of attached spectrometer sessions.
#[derive(Default)]
pub struct DeviceRegistry {
    sessions: Mutex<HashMap<SessionId, Arc<Session>>>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session for a newly attached device.
    ///
    /// Fails with [`Error::ResourceExhausted`] when the id slot is taken
    /// and with [`Error::TopologyMismatch`] when the endpoint layout
    /// matches neither variant; no partial session is registered on
    /// failure.
    pub fn attach(
        &self,
        id: SessionId,
        topology: &DeviceTopology,
        transport: Box<dyn BulkTransport>,
    ) -> Result<()> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(&id) {
            return Err(Error::ResourceExhausted(id));
        }

        let (variant, pipes) = topology::resolve(topology)?;
        let session = Arc::new(Session::new(
            id,
            variant,
            pipes,
            u32::from(topology.product_id),
            transport,
        ));
        sessions.insert(id, session);

        info!(id = id.0, ?variant, "attached spectrometer session");
        Ok(())
    }

    /// Unlink a session, unconditionally.
    ///
    /// An open session gets a bounded grace period to close; teardown
    /// completes regardless, with a warning when the session was still
    /// open. Outstanding handles fail with [`Error::NotFound`] afterwards.
    pub fn detach(&self, id: SessionId) {
        let session = self.sessions.lock().unwrap().remove(&id);
        let Some(session) = session else {
            warn!(id = id.0, "detach for unknown session id");
            return;
        };

        let state = session.state.lock().unwrap();
        if state.open {
            debug!(id = id.0, "session open at detach, granting close grace");
            let (state, wait) = session
                .closing
                .wait_timeout_while(state, DETACH_GRACE, |s| s.open)
                .unwrap();
            if wait.timed_out() && state.open {
                warn!(id = id.0, "device detached while session open");
            }
        }

        info!(id = id.0, "detached spectrometer session");
    }

    /// Look up a session by id.
    pub fn lookup(&self, id: SessionId) -> Result<Arc<Session>> {
        self.sessions
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound(id))
    }

    /// Open a session exclusively.
    ///
    /// Fails with [`Error::Busy`] when a handle is already outstanding.
    /// Every open resets the read timeout to [`DEFAULT_TIMEOUT_MS`].
    pub fn open(&self, id: SessionId) -> Result<SessionHandle> {
        let session = self.lookup(id)?;

        let mut state = session.state.lock().unwrap();
        if state.open {
            return Err(Error::Busy(id));
        }
        state.open = true;
        state.timeout_ms = DEFAULT_TIMEOUT_MS;
        drop(state);

        debug!(id = id.0, "session opened");
        Ok(SessionHandle::new(Arc::downgrade(&session), id))
    }

    /// Ids of all registered sessions, in ascending order.
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.lock().unwrap().keys().copied().collect();
        ids.sort_by_key(|id| id.0);
        ids
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().unwrap().is_empty()
    }
}
