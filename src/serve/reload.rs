//! Reload notifications for connected preview clients
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tracing::info;

/// Events sent to reload clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadEvent {
    Reload,
}

/// Fans reload events out to every connected client
#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<ReloadEvent>,
    clients: Arc<AtomicUsize>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self {
            tx,
            clients: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Tell every connected client to reload; returns how many were reached
    pub fn trigger_reload(&self) -> usize {
        info!("Reloading Browser Preview.");
        self.tx.send(ReloadEvent::Reload).unwrap_or(0)
    }

    /// Register a client. It counts as connected until the guard drops.
    pub fn connect(&self) -> (broadcast::Receiver<ReloadEvent>, ClientGuard) {
        self.clients.fetch_add(1, Ordering::SeqCst);
        let guard = ClientGuard {
            clients: Arc::clone(&self.clients),
        };
        (self.tx.subscribe(), guard)
    }

    /// Get the number of currently connected clients
    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::SeqCst)
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ClientGuard {
    clients: Arc<AtomicUsize>,
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        let _ = self
            .clients
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }
}
