// ABOUTME: Resolves which session holds input focus within a tab.
// ABOUTME: Uses the tab index when it covers the tab, otherwise queries the tab strip directly.

use crate::{LayoutNode, SessionId, TabLayoutIndex, TabStrip, WidgetId};

/// The session holding focus in tab `tab_index`, if focus rests on a session.
///
/// A tab that is one bare session answers from the index directly. For a
/// split tab the tab's focus widget is consulted; focus on a splitter yields
/// `None`. When `tab_index` is past the end of the index (a tab inserted but
/// not yet indexed) the tab strip is classified on the fly instead.
pub fn resolve_focused_session(
    index: &TabLayoutIndex,
    strip: &TabStrip,
    tab_index: usize,
) -> Option<SessionId> {
    if let Some(entry) = index.entry(tab_index) {
        if let Some(single) = entry.single {
            return Some(single);
        }
        if entry.split.is_none() {
            return None;
        }
        return focused_under_root(strip, tab_index);
    }

    tracing::debug!(
        "Tab {} is not indexed yet, resolving focus from the tab strip",
        tab_index
    );
    match strip.widget_at(tab_index)? {
        LayoutNode::Leaf(id) => Some(*id),
        LayoutNode::Split(_) => focused_under_root(strip, tab_index),
    }
}

fn focused_under_root(strip: &TabStrip, tab_index: usize) -> Option<SessionId> {
    match strip.focus_widget(tab_index)? {
        WidgetId::Session(id) => strip
            .widget_at(tab_index)
            .filter(|root| root.contains(id))
            .map(|_| id),
        WidgetId::Split(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Orientation, SplitId};

    fn split_strip() -> TabStrip {
        let mut strip = TabStrip::new();
        let mut root = LayoutNode::Leaf(SessionId(1));
        root.create_split(SessionId(1), SessionId(2), SplitId(1), Orientation::Horizontal);
        strip.insert(None, root, "");
        strip
    }

    #[test]
    fn split_tab_returns_focused_leaf() {
        let mut strip = split_strip();
        strip.set_focus_widget(0, WidgetId::Session(SessionId(2)));
        let index = TabLayoutIndex::build(&strip);
        assert_eq!(resolve_focused_session(&index, &strip, 0), Some(SessionId(2)));
    }

    #[test]
    fn focus_on_splitter_is_not_a_session() {
        let mut strip = split_strip();
        strip.set_focus_widget(0, WidgetId::Split(SplitId(1)));
        let index = TabLayoutIndex::build(&strip);
        assert_eq!(resolve_focused_session(&index, &strip, 0), None);
    }

    #[test]
    fn focus_outside_the_tab_is_ignored() {
        let mut strip = split_strip();
        strip.set_focus_widget(0, WidgetId::Session(SessionId(42)));
        let index = TabLayoutIndex::build(&strip);
        assert_eq!(resolve_focused_session(&index, &strip, 0), None);
    }

    #[test]
    fn unindexed_tab_uses_strip() {
        let mut strip = split_strip();
        let index = TabLayoutIndex::build(&strip);
        strip.insert(None, LayoutNode::Leaf(SessionId(7)), "");

        assert_eq!(resolve_focused_session(&index, &strip, 1), Some(SessionId(7)));
        assert_eq!(resolve_focused_session(&index, &strip, 5), None);
    }
}
