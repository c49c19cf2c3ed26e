// ABOUTME: Input handling: window shortcuts, key-to-byte encoding, and pane hit-testing.
// ABOUTME: Pure functions over winit key events so they can be tested without a window.

use std::collections::HashMap;

use pt_core::config::KeyboardSettings;
use pt_layout::{Rect, SessionId};
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// Window-level command bound to a shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NewTab,
    SplitHorizontal,
    SplitVertical,
    CloseTab,
    ClosePane,
    PreviousTab,
    NextTab,
    MoveTabLeft,
    MoveTabRight,
    PreviousPane,
    NextPane,
    ToggleMenuBar,
}

/// Map a key press to a window shortcut
pub fn shortcut(key: &Key, modifiers: ModifiersState) -> Option<Action> {
    let ctrl = modifiers.control_key();
    let shift = modifiers.shift_key();
    if !ctrl || modifiers.alt_key() {
        return None;
    }

    match key {
        Key::Named(NamedKey::PageUp) if shift => Some(Action::MoveTabLeft),
        Key::Named(NamedKey::PageDown) if shift => Some(Action::MoveTabRight),
        Key::Named(NamedKey::PageUp) => Some(Action::PreviousTab),
        Key::Named(NamedKey::PageDown) => Some(Action::NextTab),
        Key::Named(NamedKey::ArrowLeft) if shift => Some(Action::PreviousPane),
        Key::Named(NamedKey::ArrowRight) if shift => Some(Action::NextPane),
        Key::Character(c) if shift => match c.to_ascii_lowercase().as_str() {
            "t" => Some(Action::NewTab),
            "e" => Some(Action::SplitHorizontal),
            "o" => Some(Action::SplitVertical),
            "w" => Some(Action::CloseTab),
            "x" => Some(Action::ClosePane),
            "m" => Some(Action::ToggleMenuBar),
            _ => None,
        },
        _ => None,
    }
}

/// Pane under a pointer at `position` (physical pixels) in a viewport of
/// `viewport` pixels, given the normalized pane rectangles of a tab
pub fn pane_at(
    rects: &HashMap<SessionId, Rect>,
    viewport: (u32, u32),
    position: (f64, f64),
) -> Option<SessionId> {
    if viewport.0 == 0 || viewport.1 == 0 {
        return None;
    }
    let x = (position.0 / f64::from(viewport.0)) as f32;
    let y = (position.1 / f64::from(viewport.1)) as f32;
    rects
        .iter()
        .find(|(_, r)| x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height)
        .map(|(id, _)| *id)
}

/// Bytes a key press sends to the focused session
pub fn key_bytes(
    key: &Key,
    modifiers: ModifiersState,
    keyboard: &KeyboardSettings,
) -> Option<Vec<u8>> {
    let ctrl = modifiers.control_key();
    let alt = modifiers.alt_key();

    match key {
        Key::Character(s) => {
            let mut chars = s.chars();
            let single = match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            };
            let mut bytes = match single {
                Some(c) if ctrl && c.is_ascii_alphabetic() => {
                    vec![c.to_ascii_lowercase() as u8 - b'a' + 1]
                }
                _ => s.as_bytes().to_vec(),
            };
            if alt && (!ctrl || keyboard.ctrl_alt_keys) {
                bytes.insert(0, 0x1b);
            }
            Some(bytes)
        }
        Key::Named(named) => {
            let bytes: &[u8] = match named {
                NamedKey::Enter => b"\r",
                NamedKey::Backspace if keyboard.backspace_is_delete => b"\x7f",
                NamedKey::Backspace => b"\x08",
                NamedKey::Tab => b"\t",
                NamedKey::Escape => b"\x1b",
                NamedKey::Space => b" ",
                NamedKey::ArrowUp => b"\x1b[A",
                NamedKey::ArrowDown => b"\x1b[B",
                NamedKey::ArrowRight => b"\x1b[C",
                NamedKey::ArrowLeft => b"\x1b[D",
                NamedKey::Home if keyboard.rxvt_home_end => b"\x1b[7~",
                NamedKey::End if keyboard.rxvt_home_end => b"\x1b[8~",
                NamedKey::Home => b"\x1b[1~",
                NamedKey::End => b"\x1b[4~",
                NamedKey::Insert => b"\x1b[2~",
                NamedKey::Delete => b"\x1b[3~",
                NamedKey::PageUp => b"\x1b[5~",
                NamedKey::PageDown => b"\x1b[6~",
                NamedKey::F1 => b"\x1b[11~",
                NamedKey::F2 => b"\x1b[12~",
                NamedKey::F3 => b"\x1b[13~",
                NamedKey::F4 => b"\x1b[14~",
                NamedKey::F5 => b"\x1b[15~",
                NamedKey::F6 => b"\x1b[17~",
                NamedKey::F7 => b"\x1b[18~",
                NamedKey::F8 => b"\x1b[19~",
                NamedKey::F9 => b"\x1b[20~",
                NamedKey::F10 => b"\x1b[21~",
                NamedKey::F11 => b"\x1b[23~",
                NamedKey::F12 => b"\x1b[24~",
                _ => return None,
            };
            Some(bytes.to_vec())
        }
        _ => None,
    }
}
