// ABOUTME: Derived widget-to-tab lookup, rebuilt wholesale after every structural change.
// ABOUTME: Also records per tab whether it is a bare session or a split tree.

use std::collections::HashMap;

use crate::{LayoutNode, SessionId, SplitId, TabStrip, WidgetId};

/// Classification of one tab: exactly one of the two is set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TabEntry {
    pub split: Option<SplitId>,
    pub single: Option<SessionId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabLayoutIndex {
    tab_of: HashMap<WidgetId, usize>,
    entries: Vec<TabEntry>,
}

impl TabLayoutIndex {
    /// Build the index from the current tab sequence
    pub fn build(strip: &TabStrip) -> Self {
        let mut index = Self::default();
        for (position, tab) in strip.tabs().enumerate() {
            let root = tab.root();
            index.tab_of.insert(root.root_widget(), position);
            let entry = match root {
                LayoutNode::Leaf(id) => TabEntry {
                    split: None,
                    single: Some(*id),
                },
                LayoutNode::Split(split) => {
                    for id in split.collect_terminals() {
                        index.tab_of.insert(WidgetId::Session(id), position);
                    }
                    TabEntry {
                        split: Some(split.id()),
                        single: None,
                    }
                }
            };
            index.entries.push(entry);
        }
        index
    }

    pub fn tab_of(&self, widget: WidgetId) -> Option<usize> {
        self.tab_of.get(&widget).copied()
    }

    pub fn terminal_tab(&self, session: SessionId) -> Option<usize> {
        self.tab_of(WidgetId::Session(session))
    }

    pub fn entry(&self, position: usize) -> Option<TabEntry> {
        self.entries.get(position).copied()
    }

    /// Number of tabs covered
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of sessions mapped to a tab
    pub fn terminal_count(&self) -> usize {
        self.tab_of
            .keys()
            .filter(|widget| matches!(widget, WidgetId::Session(_)))
            .count()
    }
}
