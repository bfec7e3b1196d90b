//! Admin session state for the upload/delete surface.
//! Keep the public surface thin; the gate itself lives in `session`.

mod session;

pub use session::{SessionGate, SessionState};
