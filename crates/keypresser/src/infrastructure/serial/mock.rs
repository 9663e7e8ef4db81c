//! Recording transport for tests.
//!
//! `MockTransport` is a cheap clonable handle around shared state, so a test
//! can hand one clone to the driver and keep another to inspect what was
//! written and when.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use super::{Transport, TransportError, READ_BUFFER_CAP};

/// One accepted write.
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub at: Instant,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MockTransportState {
    pub open_port: Option<(String, u32)>,
    pub writes: Vec<RecordedWrite>,
    /// Bytes handed out by `read`, front first.
    pub pending_reads: Vec<u8>,
    pub open_calls: usize,
    pub close_calls: usize,
    /// When set, `open` fails.
    pub fail_open: bool,
    /// When set, `write` fails without recording.
    pub fail_write: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockTransportState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that already reports itself open on `port`.
    pub fn opened(port: &str) -> Self {
        let mock = Self::new();
        mock.state.lock().open_port = Some((port.to_string(), 9600));
        mock
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.state.lock().fail_open = fail;
    }

    pub fn set_fail_write(&self, fail: bool) {
        self.state.lock().fail_write = fail;
    }

    pub fn push_read_bytes(&self, bytes: &[u8]) {
        self.state.lock().pending_reads.extend_from_slice(bytes);
    }

    /// Every accepted write as UTF-8 text.
    pub fn frames(&self) -> Vec<String> {
        self.state
            .lock()
            .writes
            .iter()
            .map(|w| String::from_utf8_lossy(&w.bytes).into_owned())
            .collect()
    }

    /// Timestamps of every accepted write.
    pub fn write_times(&self) -> Vec<Instant> {
        self.state.lock().writes.iter().map(|w| w.at).collect()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().writes.len()
    }

    pub fn open_port(&self) -> Option<(String, u32)> {
        self.state.lock().open_port.clone()
    }

    pub fn open_calls(&self) -> usize {
        self.state.lock().open_calls
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().close_calls
    }
}

impl Transport for MockTransport {
    fn open(&mut self, port_name: &str, baud_rate: u32) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.open_calls += 1;
        state.open_port = None;
        if state.fail_open {
            return Err(TransportError::Simulated);
        }
        state.open_port = Some((port_name.to_string(), baud_rate));
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.lock().open_port.is_some()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.open_port.is_none() {
            return Err(TransportError::NotOpen);
        }
        if state.fail_write {
            return Err(TransportError::Simulated);
        }
        state.writes.push(RecordedWrite {
            at: Instant::now(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    fn read(&mut self, max_bytes: usize) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.lock();
        if state.open_port.is_none() {
            return Err(TransportError::NotOpen);
        }
        let n = max_bytes.min(READ_BUFFER_CAP).min(state.pending_reads.len());
        Ok(state.pending_reads.drain(..n).collect())
    }

    fn close(&mut self) {
        let mut state = self.state.lock();
        if state.open_port.take().is_some() {
            state.close_calls += 1;
        }
    }
}
