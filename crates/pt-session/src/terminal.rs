// ABOUTME: PTY transport wrapping alacritty_terminal.
// ABOUTME: Spawns the session's launch command and tracks when the child exits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use alacritty_terminal::event::{Event, WindowSize};
use alacritty_terminal::event_loop::{EventLoop, EventLoopSender, Msg};
use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::sync::FairMutex;
use alacritty_terminal::term::Term;
use alacritty_terminal::tty;
use pt_core::{ConfigError, SessionConfig};

/// Running PTY with its terminal state
pub struct Terminal {
    term: Arc<FairMutex<Term<EventProxy>>>,
    sender: EventLoopSender,
    exit: Arc<AtomicU8>,
    pid: Option<u32>,
}

const RUNNING: u8 = 0;
const EXITED_CLEAN: u8 = 1;
const EXITED_FAILED: u8 = 2;

/// Exit status as reported by the PTY event loop
trait ExitCode {
    fn is_clean(&self) -> bool;
}

impl ExitCode for i32 {
    fn is_clean(&self) -> bool {
        *self == 0
    }
}

impl ExitCode for std::process::ExitStatus {
    fn is_clean(&self) -> bool {
        self.success()
    }
}

#[derive(Clone)]
struct EventProxy {
    exit: Arc<AtomicU8>,
}

impl EventProxy {
    fn record_exit(&self, status: Option<&dyn ExitCode>) {
        match status {
            Some(status) => {
                let state = if status.is_clean() {
                    EXITED_CLEAN
                } else {
                    EXITED_FAILED
                };
                self.exit.store(state, Ordering::SeqCst);
            }
            // Loop shutdown without a child status; keep any status already seen
            None => {
                let _ = self.exit.compare_exchange(
                    RUNNING,
                    EXITED_CLEAN,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                );
            }
        }
    }
}

impl alacritty_terminal::event::EventListener for EventProxy {
    fn send_event(&self, event: Event) {
        match event {
            Event::ChildExit(status) => self.record_exit(Some(&status)),
            Event::Exit => self.record_exit(None),
            _ => {}
        }
    }
}

struct TermSize {
    columns: usize,
    lines: usize,
}

impl Dimensions for TermSize {
    fn columns(&self) -> usize {
        self.columns
    }

    fn screen_lines(&self) -> usize {
        self.lines
    }

    fn total_lines(&self) -> usize {
        self.lines
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to create PTY: {0}")]
    PtyError(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn window_size(columns: u16, rows: u16) -> WindowSize {
    WindowSize {
        num_cols: columns,
        num_lines: rows,
        cell_width: 1,
        cell_height: 1,
    }
}

/// Environment for the child: `TERM` plus the configured `NAME=value` entries
pub(crate) fn child_env(config: &SessionConfig) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert("TERM".to_string(), config.term_type.clone());
    for entry in &config.environment {
        match entry.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                env.insert(name.to_string(), value.to_string());
            }
            _ => tracing::warn!("Ignoring malformed environment entry {:?}", entry),
        }
    }
    env
}

impl Terminal {
    /// Start the session's transport in a new PTY sized to the configured grid
    pub fn spawn(config: &SessionConfig) -> Result<Self, SessionError> {
        let launch = config.launch_command()?;
        tracing::debug!("Launching {} {:?}", launch.program, launch.args);

        let pty_config = tty::Options {
            shell: Some(tty::Shell::new(launch.program, launch.args)),
            working_directory: None,
            drain_on_exit: true,
            env: child_env(config),
        };

        let (columns, rows) = (config.width.max(1), config.height.max(1));
        let pty = tty::new(&pty_config, window_size(columns, rows), 0)?;

        #[cfg(unix)]
        let pid = Some(pty.child().id());
        #[cfg(not(unix))]
        let pid = None;

        let exit = Arc::new(AtomicU8::new(RUNNING));
        let event_proxy = EventProxy {
            exit: Arc::clone(&exit),
        };

        let term_size = TermSize {
            columns: columns as usize,
            lines: rows as usize,
        };
        let term_config = alacritty_terminal::term::Config {
            scrolling_history: config.scrollback_lines as usize,
            ..Default::default()
        };
        let term = Term::new(term_config, &term_size, event_proxy.clone());
        let term = Arc::new(FairMutex::new(term));

        let event_loop = EventLoop::new(Arc::clone(&term), event_proxy, pty, false, false)?;
        let sender = event_loop.channel();
        event_loop.spawn();

        Ok(Self {
            term,
            sender,
            exit,
            pid,
        })
    }

    pub fn has_exited(&self) -> bool {
        self.exit.load(Ordering::SeqCst) != RUNNING
    }

    /// The child exited with a success status
    pub fn exited_cleanly(&self) -> bool {
        self.exit.load(Ordering::SeqCst) == EXITED_CLEAN
    }

    /// Process id of the child, where the platform exposes it
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Send input bytes to the child
    pub fn input(&self, bytes: &[u8]) {
        let _ = self.sender.send(Msg::Input(bytes.to_vec().into()));
    }

    pub fn resize(&self, columns: u16, rows: u16) {
        let (columns, rows) = (columns.max(1), rows.max(1));
        let _ = self.sender.send(Msg::Resize(window_size(columns, rows)));
        self.term.lock().resize(TermSize {
            columns: columns as usize,
            lines: rows as usize,
        });
    }

    /// Grid size as (columns, rows)
    pub fn size(&self) -> (u16, u16) {
        let term = self.term.lock();
        let grid = term.grid();
        (grid.columns() as u16, grid.screen_lines() as u16)
    }

    /// Stop the event loop; the PTY and child are released with it
    pub fn shutdown(&self) {
        let _ = self.sender.send(Msg::Shutdown);
    }
}
