// ABOUTME: Tab and split-pane layout core for paneterm.
// ABOUTME: Owns the split trees, the tab strip, the derived index, focus routing, and close cascades.

mod close;
mod error;
mod focus;
mod index;
mod manager;
mod registry;
mod session;
mod strip;
mod tree;

#[cfg(test)]
mod testing;

pub use close::{
    CloseGranularity, CloseOutcome, CloseState, CONFIRM_CLOSE_PANES, CONFIRM_CLOSE_WINDOW,
    CONFIRM_TITLE,
};
pub use error::LayoutError;
pub use focus::resolve_focused_session;
pub use index::{TabEntry, TabLayoutIndex};
pub use manager::{LayoutManager, SplitType};
pub use registry::SessionRegistry;
pub use session::{
    ConfirmationSurface, HostWindow, SessionFactory, SessionInitError, TerminalSession,
};
pub use strip::{Tab, TabEvent, TabStrip};
pub use tree::{LayoutNode, Orientation, Rect, Removal, SessionId, SplitId, SplitNode, WidgetId};
