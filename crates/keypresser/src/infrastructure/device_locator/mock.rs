//! Probe double that tracks how many ports it holds open at once.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{PortProber, ProbeFailure};

#[derive(Debug, Default)]
struct Counters {
    attempts: AtomicUsize,
    open: AtomicUsize,
    max_open: AtomicUsize,
}

/// Opens only the listed port names; everything else is "not found".
#[derive(Debug, Clone, Default)]
pub struct CountingProber {
    accept: Arc<HashSet<String>>,
    counters: Arc<Counters>,
}

/// Held while a probe is open.
#[derive(Debug)]
pub struct CountingHandle {
    counters: Arc<Counters>,
}

impl Drop for CountingHandle {
    fn drop(&mut self) {
        self.counters.open.fetch_sub(1, Ordering::SeqCst);
    }
}

impl CountingProber {
    pub fn accepting(ports: &[&str]) -> Self {
        Self {
            accept: Arc::new(ports.iter().map(|p| p.to_string()).collect()),
            counters: Arc::default(),
        }
    }

    pub fn attempts(&self) -> usize {
        self.counters.attempts.load(Ordering::SeqCst)
    }

    pub fn currently_open(&self) -> usize {
        self.counters.open.load(Ordering::SeqCst)
    }

    pub fn max_open(&self) -> usize {
        self.counters.max_open.load(Ordering::SeqCst)
    }
}

impl PortProber for CountingProber {
    type Handle = CountingHandle;

    fn try_open(&self, port_name: &str) -> Result<CountingHandle, ProbeFailure> {
        self.counters.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.accept.contains(port_name) {
            return Err(ProbeFailure::NotFound);
        }
        let now_open = self.counters.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_open.fetch_max(now_open, Ordering::SeqCst);
        Ok(CountingHandle {
            counters: Arc::clone(&self.counters),
        })
    }
}
