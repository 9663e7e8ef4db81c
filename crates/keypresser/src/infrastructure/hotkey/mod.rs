//! Trigger hotkey watcher.
//!
//! A dedicated thread polls the state of one virtual key and sends a
//! [`HotkeyEvent::Pressed`] on every up→down transition.  Holding the key
//! down produces a single event.  The receiver decides what a press means;
//! the CLI toggles the scheduler.

#[cfg(target_os = "windows")]
pub mod windows;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Default polling period.
pub const POLL_INTERVAL: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    Pressed(u8),
}

#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("failed to spawn hotkey thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Reports whether a virtual key is currently held.
pub trait KeyStateSource: Send + 'static {
    fn is_down(&self, vk: u8) -> bool;
}

/// Key state driven by a shared flag; used in tests.
#[derive(Debug, Clone, Default)]
pub struct FlagKeyState(pub Arc<AtomicBool>);

impl KeyStateSource for FlagKeyState {
    fn is_down(&self, _vk: u8) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle to a running watcher thread.  Dropping it stops the thread.
pub struct HotkeyWatcher {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl HotkeyWatcher {
    /// Spawns the polling thread.
    ///
    /// # Errors
    ///
    /// Returns [`HotkeyError::Spawn`] if the OS refuses to create the thread.
    pub fn spawn<S: KeyStateSource>(
        source: S,
        vk: u8,
        poll: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<HotkeyEvent>), HotkeyError> {
        let running = Arc::new(AtomicBool::new(true));
        let (tx, rx) = mpsc::unbounded_channel();

        let flag = Arc::clone(&running);
        let thread = std::thread::Builder::new()
            .name("keypresser-hotkey".to_string())
            .spawn(move || watch_loop(source, vk, poll, tx, flag))?;

        info!(vk, "trigger hotkey watcher started");
        Ok((
            Self {
                running,
                thread: Some(thread),
            },
            rx,
        ))
    }

    /// Signals the thread to exit and waits for it.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for HotkeyWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn watch_loop<S: KeyStateSource>(
    source: S,
    vk: u8,
    poll: Duration,
    tx: mpsc::UnboundedSender<HotkeyEvent>,
    running: Arc<AtomicBool>,
) {
    let mut was_down = source.is_down(vk);
    while running.load(Ordering::Relaxed) {
        let down = source.is_down(vk);
        if down && !was_down {
            debug!(vk, "trigger hotkey pressed");
            if tx.send(HotkeyEvent::Pressed(vk)).is_err() {
                break;
            }
        }
        was_down = down;
        std::thread::sleep(poll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_press_edge_sends_one_event() {
        // Arrange
        let key = FlagKeyState::default();
        let (mut watcher, mut rx) =
            HotkeyWatcher::spawn(key.clone(), 0x24, Duration::from_millis(2)).expect("spawn");

        tokio::time::sleep(Duration::from_millis(20)).await;

        // Act: press and hold across several polls.
        key.0.store(true, Ordering::SeqCst);
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("event in time");
        tokio::time::sleep(Duration::from_millis(30)).await;

        // Assert
        assert_eq!(event, Some(HotkeyEvent::Pressed(0x24)));
        assert!(rx.try_recv().is_err(), "held key must not repeat");
        watcher.stop();
    }

    #[tokio::test]
    async fn test_key_held_at_start_is_not_a_press() {
        let key = FlagKeyState(Arc::new(AtomicBool::new(true)));
        let (mut watcher, mut rx) =
            HotkeyWatcher::spawn(key, 0x24, Duration::from_millis(2)).expect("spawn");

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(rx.try_recv().is_err());
        watcher.stop();
    }
}
