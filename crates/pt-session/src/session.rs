// ABOUTME: PTY-backed terminal session placed in the layout, and the factory that starts them.
// ABOUTME: Titles show the tab number and either the remote user@host or the shell's directory.

use std::path::Path;

use pt_core::SessionConfig;
use pt_layout::{SessionFactory, SessionId, SessionInitError, TerminalSession};

use crate::{get_process_cwd, Terminal};

/// Blocking yes/no prompt a session uses before closing on its own
pub type ConfirmFn = fn(&str, &str) -> bool;

pub const SESSION_CLOSE_TITLE: &str = "Close Session?";
pub const SESSION_CLOSE_MESSAGE: &str = "Are you sure you want to close this session?";

pub struct PtySession {
    id: SessionId,
    config: SessionConfig,
    terminal: Terminal,
    title: String,
    focused: bool,
    confirm: Option<ConfirmFn>,
}

impl PtySession {
    pub fn spawn(
        id: SessionId,
        config: &SessionConfig,
        confirm: Option<ConfirmFn>,
    ) -> Result<Self, crate::SessionError> {
        let terminal = Terminal::spawn(config)?;
        tracing::info!(
            "Started {} session {:?} ({})",
            config.protocol.label(),
            id,
            config.display_name()
        );
        Ok(Self {
            id,
            config: config.clone(),
            terminal,
            title: config.display_name(),
            focused: false,
            confirm,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    /// Forward keyboard input to the transport
    pub fn input(&self, bytes: &[u8]) {
        self.terminal.input(bytes);
    }

    fn name(&self) -> String {
        if self.config.protocol.needs_host() {
            return self.config.display_name();
        }
        self.terminal
            .pid()
            .and_then(get_process_cwd)
            .map(|cwd| shorten_home(&cwd, dirs::home_dir().as_deref()))
            .unwrap_or_else(|| self.config.display_name())
    }
}

/// Render `path` with the home directory abbreviated to `~`
fn shorten_home(path: &Path, home: Option<&Path>) -> String {
    match home.and_then(|home| path.strip_prefix(home).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}

impl TerminalSession for PtySession {
    fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn refresh_title(&mut self, tab_index: usize) {
        self.title = format!("{}. {}", tab_index + 1, self.name());
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn request_close(&mut self, cascade: bool) -> bool {
        let ask = !cascade && self.config.warn_on_close && !self.terminal.has_exited();
        if ask {
            if let Some(confirm) = self.confirm {
                if !confirm(SESSION_CLOSE_TITLE, SESSION_CLOSE_MESSAGE) {
                    return false;
                }
            }
        }
        tracing::info!("Closing session {:?}", self.id);
        self.terminal.shutdown();
        true
    }

    fn resize(&mut self, columns: u16, rows: u16) {
        if self.terminal.size() != (columns, rows) {
            self.terminal.resize(columns, rows);
        }
    }

    fn reconfigure(&mut self, config: &SessionConfig) {
        if config.launch_command().ok() != self.config.launch_command().ok() {
            tracing::info!(
                "Connection settings of session {:?} changed; they apply to the next session",
                self.id
            );
        }
        self.config = config.clone();
    }

    fn has_exited(&self) -> bool {
        self.terminal.has_exited()
    }

    fn exited_cleanly(&self) -> bool {
        self.terminal.exited_cleanly()
    }
}

/// Starts PTY sessions for the layout manager
#[derive(Default)]
pub struct PtySessionFactory {
    confirm: Option<ConfirmFn>,
}

impl PtySessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions created by this factory ask `confirm` before closing on their own
    pub fn with_confirmation(confirm: ConfirmFn) -> Self {
        Self {
            confirm: Some(confirm),
        }
    }
}

impl SessionFactory for PtySessionFactory {
    type Session = PtySession;

    fn create_session(
        &mut self,
        id: SessionId,
        config: &SessionConfig,
    ) -> Result<PtySession, SessionInitError> {
        PtySession::spawn(id, config, self.confirm).map_err(|e| {
            SessionInitError::with_source(
                format!("Could not start {} session", config.protocol.label()),
                e,
            )
        })
    }
}
