// ABOUTME: Adapters between the winit window and the layout core's host seams.
// ABOUTME: Window geometry for the sizing heuristic and native yes/no dialogs.

use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use pt_core::WindowSettings;
use pt_layout::HostWindow;

/// Blocking native yes/no prompt
pub fn confirm_dialog(title: &str, message: &str) -> bool {
    let result = MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::YesNo)
        .show();
    result == MessageDialogResult::Yes
}

/// The main window as seen by the layout manager
pub struct WinitHost<'a> {
    pub window: &'a Window,
    pub cell_size: (u32, u32),
}

impl HostWindow for WinitHost<'_> {
    fn is_maximized(&self) -> bool {
        self.window.is_maximized()
    }

    fn window_size(&self) -> (u32, u32) {
        let size = self.window.outer_size();
        (size.width, size.height)
    }

    fn viewport_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn cell_size(&self) -> (u32, u32) {
        let scale = self.window.scale_factor();
        let scaled = |v: u32| ((v as f64) * scale).round().max(1.0) as u32;
        (scaled(self.cell_size.0), scaled(self.cell_size.1))
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        let (outer_w, outer_h) = self.window_size();
        let (inner_w, inner_h) = self.viewport_size();
        let inner = PhysicalSize::new(
            width.saturating_sub(outer_w.saturating_sub(inner_w)),
            height.saturating_sub(outer_h.saturating_sub(inner_h)),
        );
        let _ = self.window.request_inner_size(inner);
    }
}

/// Capture the window state worth restoring next time. Flags winit cannot
/// query are carried over from `previous`.
pub fn snapshot(window: &Window, previous: &WindowSettings) -> WindowSettings {
    let size = window.inner_size();
    let position = window
        .outer_position()
        .map(|p| (p.x, p.y))
        .unwrap_or(previous.position);
    WindowSettings {
        size: (size.width, size.height),
        position,
        maximized: window.is_maximized(),
        minimized: window.is_minimized().unwrap_or(false),
        fullscreen: window.fullscreen().is_some(),
        always_on_top: previous.always_on_top,
        show_menu_bar: previous.show_menu_bar,
    }
}
