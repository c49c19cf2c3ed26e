// ABOUTME: Main application entry point.
// ABOUTME: Sets up the window and event loop and routes shortcuts and clicks into the layout manager.

mod host;
mod input;

use std::time::{Duration, Instant};

use anyhow::Result;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::ModifiersState;
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId, WindowLevel};

use host::{confirm_dialog, snapshot, WinitHost};
use input::Action;
use pt_core::{AppConfig, TomlSettingsStore, WindowSettings};
use pt_layout::{CloseOutcome, LayoutManager, Rect, SplitType, TerminalSession};
use pt_session::PtySessionFactory;

const APP_NAME: &str = "paneterm";
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

struct App {
    window: Option<Window>,
    config: AppConfig,
    settings: TomlSettingsStore,
    window_settings: WindowSettings,
    layout: LayoutManager<PtySessionFactory>,
    modifiers: ModifiersState,
    mouse_pos: (f64, f64),
}

impl App {
    fn new() -> Self {
        let config = AppConfig::load_or_default();
        let settings = TomlSettingsStore::open_default().unwrap_or_else(|e| {
            tracing::warn!("Failed to open window settings, using defaults: {}", e);
            TomlSettingsStore::in_memory()
        });
        let defaults = WindowSettings {
            size: (config.window_width, config.window_height),
            ..WindowSettings::default()
        };
        let window_settings = WindowSettings::read(&settings, defaults);

        Self {
            window: None,
            config,
            settings,
            window_settings,
            layout: LayoutManager::new(PtySessionFactory::with_confirmation(confirm_dialog)),
            modifiers: ModifiersState::empty(),
            mouse_pos: (0.0, 0.0),
        }
    }

    fn window_attributes(&self) -> WindowAttributes {
        let ws = &self.window_settings;
        let mut attrs = WindowAttributes::default()
            .with_title(APP_NAME)
            .with_inner_size(PhysicalSize::new(ws.size.0, ws.size.1))
            .with_maximized(ws.maximized);
        if ws.position != (0, 0) {
            attrs = attrs.with_position(PhysicalPosition::new(ws.position.0, ws.position.1));
        }
        if ws.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        if ws.always_on_top {
            attrs = attrs.with_window_level(WindowLevel::AlwaysOnTop);
        }
        attrs
    }

    fn cell_size(&self) -> (u32, u32) {
        (self.config.cell_width, self.config.cell_height)
    }

    fn open_session(&mut self, split: SplitType) {
        let Some(window) = &self.window else {
            return;
        };
        let mut host = WinitHost {
            window,
            cell_size: self.cell_size(),
        };
        match self
            .layout
            .open_session(&self.config.session, split, None, &mut host)
        {
            Ok(id) => {
                self.layout.layout_panes(&host);
                tracing::info!(
                    "Opened session {:?}, total sessions: {}",
                    id,
                    self.layout.session_count()
                );
            }
            Err(e) => tracing::error!("Failed to open session: {}", e),
        }
        self.update_title();
    }

    fn relayout(&mut self) {
        if let Some(window) = &self.window {
            let host = WinitHost {
                window,
                cell_size: self.cell_size(),
            };
            self.layout.layout_panes(&host);
        }
    }

    fn update_title(&self) {
        let Some(window) = &self.window else {
            return;
        };
        let title = self
            .layout
            .current_tab()
            .and_then(|tab| self.layout.tabs().title(tab))
            .filter(|title| !title.is_empty());
        match title {
            Some(title) => window.set_title(&format!("{} - {}", title, APP_NAME)),
            None => window.set_title(APP_NAME),
        }
    }

    fn handle_action(&mut self, action: Action, event_loop: &ActiveEventLoop) {
        let current = self.layout.current_tab();
        let count = self.layout.tab_count();
        let mut confirm = confirm_dialog;

        match action {
            Action::NewTab => self.open_session(SplitType::Leaf),
            Action::SplitHorizontal => self.open_session(SplitType::Horizontal),
            Action::SplitVertical => self.open_session(SplitType::Vertical),
            Action::CloseTab => {
                if let Some(tab) = current {
                    if let Err(e) = self.layout.close_tab(tab, &mut confirm) {
                        tracing::error!("Failed to close tab: {}", e);
                    }
                }
            }
            Action::ClosePane => {
                if let Some(id) = self.layout.current_session() {
                    if let Err(e) = self.layout.close_session(id) {
                        tracing::error!("Failed to close session: {}", e);
                    }
                }
            }
            Action::PreviousTab | Action::NextTab if count > 1 => {
                let tab = current.unwrap_or(0);
                let target = if action == Action::NextTab {
                    (tab + 1) % count
                } else {
                    (tab + count - 1) % count
                };
                self.layout.set_current_tab(target);
            }
            Action::MoveTabLeft => {
                if let Some(tab) = current.filter(|tab| *tab > 0) {
                    self.layout.move_tab(tab, tab - 1);
                }
            }
            Action::MoveTabRight => {
                if let Some(tab) = current.filter(|tab| tab + 1 < count) {
                    self.layout.move_tab(tab, tab + 1);
                }
            }
            Action::PreviousPane | Action::NextPane => {
                if let Some(id) = self.layout.cycle_pane(action == Action::NextPane) {
                    tracing::debug!("Pane focus moved to {:?}", id);
                }
            }
            Action::ToggleMenuBar => {
                self.window_settings.show_menu_bar = !self.window_settings.show_menu_bar;
                tracing::info!("Menu bar shown: {}", self.window_settings.show_menu_bar);
            }
            Action::PreviousTab | Action::NextTab => {}
        }

        self.relayout();
        self.update_title();
        self.exit_if_empty(event_loop);
    }

    fn exit_if_empty(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() && self.layout.tab_count() == 0 {
            tracing::info!("All sessions closed, exiting");
            self.close_window(event_loop);
        }
    }

    /// Ask to close everything; on acceptance save window state and exit
    fn close_window(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            self.window_settings = snapshot(window, &self.window_settings);
        }
        let mut confirm = confirm_dialog;
        let outcome =
            self.layout
                .close_window(&mut confirm, &mut self.settings, &self.window_settings);
        match outcome {
            CloseOutcome::Closed(closed) => {
                tracing::info!("Closed {} sessions, exiting", closed.len());
                self.window = None;
                event_loop.exit();
            }
            CloseOutcome::Cancelled => tracing::info!("Window close cancelled"),
        }
    }

    /// Focus the pane of the current tab under the pointer
    fn focus_pane_at_pointer(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        let size = window.inner_size();
        let Some(rects) = self
            .layout
            .current_tab()
            .and_then(|tab| self.layout.tree(tab))
            .map(|tree| tree.pane_rects(Rect::full()))
        else {
            return;
        };
        if let Some(id) = input::pane_at(&rects, (size.width, size.height), self.mouse_pos) {
            if self.layout.current_session() != Some(id) && self.layout.focus_session(id) {
                tracing::info!("Focus changed to session {:?}", id);
                self.update_title();
            }
        }
    }

    fn send_key(&self, event: &winit::event::KeyEvent) {
        let Some(session) = self
            .layout
            .current_session()
            .and_then(|id| self.layout.session(id))
        else {
            return;
        };
        let keyboard = &session.config().keyboard;
        if let Some(bytes) = input::key_bytes(&event.logical_key, self.modifiers, keyboard) {
            session.input(&bytes);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(self.window_attributes()) {
            Ok(window) => window,
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        if self.window_settings.minimized {
            window.set_minimized(true);
        }

        let size = window.inner_size();
        tracing::info!(
            "Window created: {}x{} physical pixels, scale factor: {}",
            size.width,
            size.height,
            window.scale_factor()
        );
        self.window = Some(window);

        self.open_session(SplitType::Leaf);
        if self.layout.tab_count() == 0 {
            tracing::error!("No session could be started, exiting");
            self.window = None;
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                self.close_window(event_loop);
            }
            WindowEvent::Resized(_) => self.relayout(),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_pos = (position.x, position.y);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.focus_pane_at_pointer(),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match input::shortcut(&event.logical_key, self.modifiers) {
                    Some(action) => self.handle_action(action, event_loop),
                    None => self.send_key(&event),
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            return;
        }
        let exited = self.layout.reap_exited();
        if !exited.is_empty() {
            self.relayout();
            self.update_title();
            self.exit_if_empty(event_loop);
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + EXIT_POLL_INTERVAL));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting {}", APP_NAME);

    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
