// ABOUTME: Error type for layout operations.
// ABOUTME: Contract violations are not represented here; they panic.

use crate::{SessionId, SessionInitError};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Failed to start session: {0}")]
    SessionInit(#[from] SessionInitError),

    #[error("No focused session in tab {0} to split")]
    NoFocusedSession(usize),

    #[error("No tab at position {0}")]
    UnknownTab(usize),

    #[error("Unknown session {0:?}")]
    UnknownSession(SessionId),
}
