// ABOUTME: Interfaces the layout core consumes from its collaborators.
// ABOUTME: Terminal sessions, the session factory, yes/no confirmation, and the host window.

use pt_core::SessionConfig;

use crate::SessionId;

/// A live terminal session placed somewhere in the layout
pub trait TerminalSession {
    fn config(&self) -> &SessionConfig;

    /// Title as currently displayed
    fn title(&self) -> String;

    /// Recompute the displayed title after the session's tab position changed
    fn refresh_title(&mut self, tab_index: usize);

    fn set_focused(&mut self, focused: bool);

    fn is_focused(&self) -> bool;

    /// Ask the session to close and tear down its transport.
    ///
    /// With `cascade` unset the session may prompt on its own and refuse by
    /// returning false. With `cascade` set the close was already confirmed for
    /// a whole tab or window; the session must not prompt and must close.
    fn request_close(&mut self, cascade: bool) -> bool;

    fn resize(&mut self, columns: u16, rows: u16);

    /// Apply changed settings to a running session
    fn reconfigure(&mut self, config: &SessionConfig);

    /// The transport ended without a close request (shell exit, disconnect)
    fn has_exited(&self) -> bool;

    /// Whether the exit was a clean one (status 0). Meaningless before `has_exited`.
    fn exited_cleanly(&self) -> bool;
}

/// Session construction failed before the session was placed anywhere
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SessionInitError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SessionInitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

pub trait SessionFactory {
    type Session: TerminalSession;

    fn create_session(
        &mut self,
        id: SessionId,
        config: &SessionConfig,
    ) -> Result<Self::Session, SessionInitError>;
}

/// Blocking yes/no prompt
pub trait ConfirmationSurface {
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

impl<F> ConfirmationSurface for F
where
    F: FnMut(&str, &str) -> bool,
{
    fn confirm(&mut self, title: &str, message: &str) -> bool {
        self(title, message)
    }
}

/// Window geometry the layout core may adjust. All sizes in pixels.
pub trait HostWindow {
    fn is_maximized(&self) -> bool;
    fn window_size(&self) -> (u32, u32);
    /// Area available to a tab's content
    fn viewport_size(&self) -> (u32, u32);
    fn cell_size(&self) -> (u32, u32);
    fn set_window_size(&mut self, width: u32, height: u32);
}
