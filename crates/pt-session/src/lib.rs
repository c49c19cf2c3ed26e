// ABOUTME: PTY-backed terminal sessions for paneterm.
// ABOUTME: Wraps alacritty_terminal and plugs sessions into the layout core.

pub mod process_info;
pub mod session;
pub mod terminal;

pub use process_info::get_process_cwd;
pub use session::{ConfirmFn, PtySession, PtySessionFactory};
pub use terminal::{SessionError, Terminal};
