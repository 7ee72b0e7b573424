//! Shared test fixtures: a scripted bulk transport and topology builders.

// Each test binary compiles this module; not every binary uses every helper.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use driver::topology::{AltSetting, DeviceTopology};
use driver::transport::{BulkTransport, TransportError};

/// One recorded bulk write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub endpoint: u8,
    pub data: Vec<u8>,
    pub timeout: Duration,
}

/// One recorded bulk read request, before its scripted outcome applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRecord {
    pub endpoint: u8,
    pub requested: usize,
    pub timeout: Duration,
}

/// Scripted outcome of one bulk read.
pub enum ReadScript {
    /// Deliver these bytes (possibly short of the request).
    Data(Vec<u8>),
    /// Expire the timeout.
    Timeout,
    /// Fail outright, as a vanished device would.
    Fail(&'static str),
}

#[derive(Default)]
struct Inner {
    writes: Mutex<Vec<WriteRecord>>,
    reads: Mutex<Vec<ReadRecord>>,
    read_script: Mutex<VecDeque<ReadScript>>,
    fail_next_write: Mutex<Option<&'static str>>,
}

/// Scripted [`BulkTransport`]: records every transfer, plays back queued
/// read outcomes, and reports `Timeout` for unscripted reads like an idle
/// device would.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next unconsumed read.
    pub fn script_read(&self, script: ReadScript) {
        self.inner.read_script.lock().unwrap().push_back(script);
    }

    /// Make the next write fail.
    pub fn fail_next_write(&self, message: &'static str) {
        *self.inner.fail_next_write.lock().unwrap() = Some(message);
    }

    /// Everything written so far.
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.inner.writes.lock().unwrap().clone()
    }

    /// Every read request so far.
    pub fn reads(&self) -> Vec<ReadRecord> {
        self.inner.reads.lock().unwrap().clone()
    }
}

impl BulkTransport for MockTransport {
    fn write_bulk(
        &self,
        endpoint: u8,
        data: &[u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        if let Some(message) = self.inner.fail_next_write.lock().unwrap().take() {
            return Err(TransportError::Io(message.to_owned()));
        }
        self.inner.writes.lock().unwrap().push(WriteRecord {
            endpoint,
            data: data.to_vec(),
            timeout,
        });
        Ok(data.len())
    }

    fn read_bulk(
        &self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        self.inner.reads.lock().unwrap().push(ReadRecord {
            endpoint,
            requested: buf.len(),
            timeout,
        });

        match self.inner.read_script.lock().unwrap().pop_front() {
            Some(ReadScript::Data(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            Some(ReadScript::Timeout) | None => Err(TransportError::Timeout),
            Some(ReadScript::Fail(message)) => Err(TransportError::Io(message.to_owned())),
        }
    }
}

/// Topology of a USB2000: EP2 out, EP2 in, EP7 in, plus its EP1 in.
pub fn usb2000_topology() -> DeviceTopology {
    DeviceTopology {
        vendor_id: 0x2457,
        product_id: 0x1002,
        settings: vec![AltSetting {
            endpoints: vec![0x81, 0x02, 0x82, 0x87],
        }],
    }
}

/// Topology of a USB2000+: EP1 out, EP1 in, EP2 in, EP6 in.
pub fn usb2000_plus_topology() -> DeviceTopology {
    DeviceTopology {
        vendor_id: 0x2457,
        product_id: 0x101e,
        settings: vec![AltSetting {
            endpoints: vec![0x81, 0x01, 0x82, 0x86],
        }],
    }
}

/// A topology matching neither signature.
pub fn bogus_topology() -> DeviceTopology {
    DeviceTopology {
        vendor_id: 0x2457,
        product_id: 0x1002,
        settings: vec![AltSetting {
            endpoints: vec![0x83, 0x03, 0x84, 0x04],
        }],
    }
}
