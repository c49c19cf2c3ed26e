// ABOUTME: Ordered tab container holding one layout tree per tab.
// ABOUTME: Queues structural-change events after each mutation and tracks per-tab focus.

use crate::{LayoutNode, WidgetId};

/// Structural change to the tab sequence, queued after the mutation completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    Inserted(usize),
    Removed(usize),
    Moved { from: usize, to: usize },
}

#[derive(Debug, Clone)]
pub struct Tab {
    root: LayoutNode,
    title: String,
    /// Last widget under this tab that held focus
    focus: Option<WidgetId>,
}

impl Tab {
    pub fn root(&self) -> &LayoutNode {
        &self.root
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn focus(&self) -> Option<WidgetId> {
        self.focus
    }
}

#[derive(Debug, Default)]
pub struct TabStrip {
    tabs: Vec<Tab>,
    current: Option<usize>,
    events: Vec<TabEvent>,
}

impl TabStrip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Insert a tab at `position`, or append when `None` or out of range.
    /// Returns the position actually used.
    pub fn insert(&mut self, position: Option<usize>, root: LayoutNode, title: &str) -> usize {
        let position = position
            .filter(|p| *p <= self.tabs.len())
            .unwrap_or(self.tabs.len());
        let focus = Some(root.root_widget());
        self.tabs.insert(
            position,
            Tab {
                root,
                title: title.to_string(),
                focus,
            },
        );
        self.current = match self.current {
            None => Some(position),
            Some(current) if position <= current => Some(current + 1),
            keep => keep,
        };
        self.events.push(TabEvent::Inserted(position));
        position
    }

    pub fn remove(&mut self, position: usize) -> Option<Tab> {
        if position >= self.tabs.len() {
            return None;
        }
        let tab = self.tabs.remove(position);
        self.current = match self.current {
            _ if self.tabs.is_empty() => None,
            Some(current) if position < current => Some(current - 1),
            Some(current) => Some(current.min(self.tabs.len() - 1)),
            None => None,
        };
        self.events.push(TabEvent::Removed(position));
        Some(tab)
    }

    pub fn move_tab(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tabs.len() || to >= self.tabs.len() || from == to {
            return false;
        }
        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);
        self.current = self.current.map(|current| {
            if current == from {
                to
            } else if from < current && current <= to {
                current - 1
            } else if to <= current && current < from {
                current + 1
            } else {
                current
            }
        });
        self.events.push(TabEvent::Moved { from, to });
        true
    }

    pub fn widget_at(&self, position: usize) -> Option<&LayoutNode> {
        self.tabs.get(position).map(|tab| &tab.root)
    }

    pub(crate) fn root_mut(&mut self, position: usize) -> Option<&mut LayoutNode> {
        self.tabs.get_mut(position).map(|tab| &mut tab.root)
    }

    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    pub fn title(&self, position: usize) -> Option<&str> {
        self.tabs.get(position).map(|tab| tab.title.as_str())
    }

    pub fn set_title(&mut self, position: usize, title: &str) {
        if let Some(tab) = self.tabs.get_mut(position) {
            if tab.title != title {
                tab.title = title.to_string();
            }
        }
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn set_current(&mut self, position: usize) -> bool {
        if position < self.tabs.len() {
            self.current = Some(position);
            true
        } else {
            false
        }
    }

    pub fn focus_widget(&self, position: usize) -> Option<WidgetId> {
        self.tabs.get(position)?.focus
    }

    pub fn set_focus_widget(&mut self, position: usize, widget: WidgetId) {
        if let Some(tab) = self.tabs.get_mut(position) {
            tab.focus = Some(widget);
        }
    }

    /// Position of the tab whose tree contains `widget` anywhere
    pub fn find_tab(&self, widget: WidgetId) -> Option<usize> {
        self.tabs
            .iter()
            .position(|tab| tab.root.contains_widget(widget))
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Drain queued structural-change events, oldest first
    pub fn take_events(&mut self) -> Vec<TabEvent> {
        std::mem::take(&mut self.events)
    }
}
