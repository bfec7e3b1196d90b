use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

/// The two states of the admin gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

/// Process-wide admin flag shared by every request handler.
///
/// There is exactly one flag per gate (no identity, no expiry). Cloning the gate
/// shares the flag, so the copy held in the router state and any copy held by a
/// caller observe the same value. Concurrent login/logout calls are last-write-wins.
#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    active: Arc<AtomicBool>,
}

impl SessionGate {
    /// A fresh gate, logged out.
    pub fn new() -> Self { Self::default() }

    /// Open the gate. No credential check is performed.
    pub fn login(&self) {
        let was = self.active.swap(true, Ordering::SeqCst);
        info!(target: "filehost::session", was_active = was, "admin login");
    }

    pub fn logout(&self) {
        let was = self.active.swap(false, Ordering::SeqCst);
        info!(target: "filehost::session", was_active = was, "admin logout");
    }

    pub fn is_active(&self) -> bool { self.active.load(Ordering::SeqCst) }

    pub fn state(&self) -> SessionState {
        if self.is_active() { SessionState::LoggedIn } else { SessionState::LoggedOut }
    }
}
