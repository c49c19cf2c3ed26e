// ABOUTME: Test doubles for the layout core's collaborators.
// ABOUTME: Records close requests so tests can check cascades after sessions are dropped.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use pt_core::SessionConfig;

use crate::{
    ConfirmationSurface, HostWindow, SessionFactory, SessionId, SessionInitError, TerminalSession,
};

pub type CloseLog = Rc<RefCell<Vec<(SessionId, bool)>>>;

pub struct FakeSession {
    pub id: SessionId,
    pub config: SessionConfig,
    pub title: String,
    pub focused: bool,
    pub refuse_close: bool,
    pub exited: bool,
    pub clean_exit: bool,
    pub size: (u16, u16),
    close_log: CloseLog,
}

impl TerminalSession for FakeSession {
    fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn refresh_title(&mut self, tab_index: usize) {
        self.title = format!("{}. session {}", tab_index + 1, self.id.0);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn request_close(&mut self, cascade: bool) -> bool {
        self.close_log.borrow_mut().push((self.id, cascade));
        cascade || !self.refuse_close
    }

    fn resize(&mut self, columns: u16, rows: u16) {
        self.size = (columns, rows);
    }

    fn reconfigure(&mut self, config: &SessionConfig) {
        self.config = config.clone();
    }

    fn has_exited(&self) -> bool {
        self.exited
    }

    fn exited_cleanly(&self) -> bool {
        self.clean_exit
    }
}

#[derive(Default)]
pub struct FakeFactory {
    pub fail_next: bool,
    pub close_log: CloseLog,
}

impl SessionFactory for FakeFactory {
    type Session = FakeSession;

    fn create_session(
        &mut self,
        id: SessionId,
        config: &SessionConfig,
    ) -> Result<FakeSession, SessionInitError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(SessionInitError::new("connection refused"));
        }
        Ok(FakeSession {
            id,
            config: config.clone(),
            title: String::new(),
            focused: false,
            refuse_close: false,
            exited: false,
            clean_exit: true,
            size: (config.width, config.height),
            close_log: Rc::clone(&self.close_log),
        })
    }
}

/// Answers prompts from a script; panics on an unexpected prompt
#[derive(Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<bool>,
    pub prompts: Vec<String>,
}

impl ScriptedConfirm {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            prompts: Vec::new(),
        }
    }
}

impl ConfirmationSurface for ScriptedConfirm {
    fn confirm(&mut self, _title: &str, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.answers
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {}", message))
    }
}

pub struct FakeHost {
    pub maximized: bool,
    pub window: (u32, u32),
    pub viewport: (u32, u32),
    pub cell: (u32, u32),
    pub resizes: Vec<(u32, u32)>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            maximized: false,
            window: (800, 600),
            viewport: (780, 540),
            cell: (8, 16),
            resizes: Vec::new(),
        }
    }
}

impl HostWindow for FakeHost {
    fn is_maximized(&self) -> bool {
        self.maximized
    }

    fn window_size(&self) -> (u32, u32) {
        self.window
    }

    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn cell_size(&self) -> (u32, u32) {
        self.cell
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        let chrome = (self.window.0 - self.viewport.0, self.window.1 - self.viewport.1);
        self.window = (width, height);
        self.viewport = (width - chrome.0, height - chrome.1);
        self.resizes.push((width, height));
    }
}
