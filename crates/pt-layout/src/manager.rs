// ABOUTME: Orchestrates session creation, splitting, focus routing, and close cascades.
// ABOUTME: Every structural mutation is followed by a synchronous index rebuild and title refresh.

use pt_core::config::CloseOnExit;
use pt_core::{SessionConfig, SettingsStore, WindowSettings};

use crate::close::{
    CloseCascade, CloseGranularity, CloseOutcome, CloseState, CONFIRM_CLOSE_PANES,
    CONFIRM_CLOSE_WINDOW, CONFIRM_TITLE,
};
use crate::{
    focus, ConfirmationSurface, HostWindow, LayoutError, LayoutNode, Orientation, Rect, Removal,
    SessionFactory, SessionId, SessionRegistry, SplitId, TabEntry, TabLayoutIndex, TabStrip,
    TerminalSession, WidgetId,
};

/// Where a new session goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitType {
    /// A new tab of its own
    Leaf,
    Horizontal,
    Vertical,
}

impl SplitType {
    fn orientation(self) -> Option<Orientation> {
        match self {
            SplitType::Leaf => None,
            SplitType::Horizontal => Some(Orientation::Horizontal),
            SplitType::Vertical => Some(Orientation::Vertical),
        }
    }
}

pub struct LayoutManager<F: SessionFactory> {
    factory: F,
    registry: SessionRegistry<F::Session>,
    tabs: TabStrip,
    index: TabLayoutIndex,
    next_split_id: u64,
    close: CloseCascade,
}

impl<F: SessionFactory> LayoutManager<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            registry: SessionRegistry::new(),
            tabs: TabStrip::new(),
            index: TabLayoutIndex::default(),
            next_split_id: 1,
            close: CloseCascade::default(),
        }
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.count()
    }

    pub fn tabs(&self) -> &TabStrip {
        &self.tabs
    }

    pub fn index(&self) -> &TabLayoutIndex {
        &self.index
    }

    pub fn tree(&self, position: usize) -> Option<&LayoutNode> {
        self.tabs.widget_at(position)
    }

    pub fn current_tab(&self) -> Option<usize> {
        self.tabs.current()
    }

    pub fn session(&self, id: SessionId) -> Option<&F::Session> {
        self.registry.get(id)
    }

    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut F::Session> {
        self.registry.get_mut(id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = (SessionId, &F::Session)> {
        self.registry.iter()
    }

    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    pub fn terminal_tab_index(&self, id: SessionId) -> Option<usize> {
        self.index.terminal_tab(id)
    }

    pub fn close_state(&self) -> CloseState {
        self.close.state()
    }

    /// Open a new session from `config`.
    ///
    /// `Leaf` opens a new tab at `target_tab` (appending when `None`). A split
    /// type splits the focused session of `target_tab`, or of the current tab,
    /// and focuses the new session. With no tabs open every request becomes
    /// `Leaf`. A session that fails to start, or has nowhere to go, is
    /// discarded without touching the layout.
    pub fn open_session(
        &mut self,
        config: &SessionConfig,
        split_type: SplitType,
        target_tab: Option<usize>,
        host: &mut dyn HostWindow,
    ) -> Result<SessionId, LayoutError> {
        let split_type = if self.tabs.is_empty() {
            SplitType::Leaf
        } else {
            split_type
        };

        let id = self.registry.allocate_id();
        let mut session = match self.factory.create_session(id, config) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to create session: {}", e);
                return Err(e.into());
            }
        };

        match split_type.orientation() {
            None => {
                let position = self.tabs.insert(target_tab, LayoutNode::Leaf(id), "");
                self.registry.insert(id, session);
                self.tabs.set_current(position);
                tracing::info!(
                    "Opened session {:?} in tab {} (total: {})",
                    id,
                    position,
                    self.tabs.count()
                );
                self.fit_window_to_first_tab(id, host);
            }
            Some(orientation) => {
                let tab = target_tab.or(self.tabs.current()).unwrap_or(0);
                if tab >= self.tabs.count() {
                    session.request_close(true);
                    return Err(LayoutError::UnknownTab(tab));
                }
                let Some(existing) = self.resolve_focused_session(tab) else {
                    tracing::warn!("No focused session in tab {} to split, discarding {:?}", tab, id);
                    session.request_close(true);
                    return Err(LayoutError::NoFocusedSession(tab));
                };

                let split_id = self.allocate_split_id();
                let inserted = self
                    .tabs
                    .root_mut(tab)
                    .is_some_and(|root| root.create_split(existing, id, split_id, orientation));
                assert!(inserted, "split target {:?} is not in tab {}", existing, tab);

                self.registry.insert(id, session);
                self.tabs.set_focus_widget(tab, WidgetId::Session(id));
                tracing::info!(
                    "Split {:?} {:?} with new session {:?} in tab {}",
                    existing,
                    orientation,
                    id,
                    tab
                );
            }
        }

        self.on_tab_layout_changed();
        self.focus_session(id);
        Ok(id)
    }

    /// The session holding focus within `tab_index`
    pub fn resolve_focused_session(&self, tab_index: usize) -> Option<SessionId> {
        focus::resolve_focused_session(&self.index, &self.tabs, tab_index)
    }

    /// The session that receives keyboard input: the focus widget of the
    /// current tab, if it is a live session.
    pub fn current_session(&self) -> Option<SessionId> {
        let position = self.tabs.current()?;
        match self.tabs.focus_widget(position)? {
            WidgetId::Session(id) if self.registry.contains(id) => Some(id),
            _ => None,
        }
    }

    /// Switch to tab `position` and route input focus to its focused session
    pub fn set_current_tab(&mut self, position: usize) -> Option<SessionId> {
        if !self.tabs.set_current(position) {
            return None;
        }
        match self.resolve_focused_session(position) {
            Some(id) => {
                self.focus_session(id);
                Some(id)
            }
            None => {
                self.clear_session_focus();
                None
            }
        }
    }

    /// Give `id` input focus, switching to its tab
    pub fn focus_session(&mut self, id: SessionId) -> bool {
        let Some(position) = self.locate(WidgetId::Session(id)) else {
            return false;
        };
        self.tabs.set_current(position);
        self.tabs.set_focus_widget(position, WidgetId::Session(id));
        for (sid, session) in self.registry.iter_mut() {
            session.set_focused(sid == id);
        }
        self.refresh_titles(position);
        tracing::debug!("Focus changed to session {:?} in tab {}", id, position);
        true
    }

    /// Put focus on a splitter handle; no session receives input
    pub fn focus_splitter(&mut self, split: SplitId) -> bool {
        let Some(position) = self.locate(WidgetId::Split(split)) else {
            return false;
        };
        self.tabs.set_current(position);
        self.tabs.set_focus_widget(position, WidgetId::Split(split));
        self.clear_session_focus();
        true
    }

    /// Move input focus to the next pane of the current tab, or the
    /// previous one when `forward` is false. Wraps around.
    pub fn cycle_pane(&mut self, forward: bool) -> Option<SessionId> {
        let position = self.tabs.current()?;
        let panes = self.tabs.widget_at(position)?.collect_terminals();
        let focused = self
            .current_session()
            .and_then(|id| panes.iter().position(|pane| *pane == id));
        let target = match focused {
            Some(i) if forward => panes[(i + 1) % panes.len()],
            Some(i) => panes[(i + panes.len() - 1) % panes.len()],
            None => *panes.first()?,
        };
        self.focus_session(target);
        Some(target)
    }

    pub fn move_tab(&mut self, from: usize, to: usize) -> bool {
        if !self.tabs.move_tab(from, to) {
            return false;
        }
        self.on_tab_layout_changed();
        true
    }

    /// Apply new settings to a running session
    pub fn reconfigure_session(
        &mut self,
        id: SessionId,
        config: &SessionConfig,
    ) -> Result<(), LayoutError> {
        let session = self
            .registry
            .get_mut(id)
            .ok_or(LayoutError::UnknownSession(id))?;
        session.reconfigure(config);
        if let Some(position) = self.locate(WidgetId::Session(id)) {
            self.refresh_titles(position);
        }
        Ok(())
    }

    /// Remove a session whose teardown was already requested from its tree
    /// and the registry. A split it leaves behind collapses; a tab it leaves
    /// empty is removed.
    pub fn detach_session(&mut self, id: SessionId) -> Option<F::Session> {
        let position = self.locate(WidgetId::Session(id));
        let session = self.registry.remove(id)?;
        let mut refocus = None;

        if let Some(position) = position {
            let removal = self
                .tabs
                .root_mut(position)
                .map_or(Removal::NotFound, |root| root.remove_leaf(id));
            match removal {
                Removal::Emptied => {
                    self.tabs.remove(position);
                    tracing::info!("Removed tab {} with its last session", position);
                }
                Removal::Removed { promoted } => {
                    let focus_lost = match self.tabs.focus_widget(position) {
                        Some(widget) => !self
                            .tabs
                            .widget_at(position)
                            .is_some_and(|root| root.contains_widget(widget)),
                        None => true,
                    };
                    if focus_lost {
                        self.tabs
                            .set_focus_widget(position, WidgetId::Session(promoted));
                        if self.tabs.current() == Some(position) {
                            refocus = Some(promoted);
                        }
                    }
                }
                Removal::NotFound => {
                    panic!("session {:?} is indexed in tab {} but not in its tree", id, position)
                }
            }
        }

        self.on_tab_layout_changed();
        if let Some(promoted) = refocus {
            self.focus_session(promoted);
        } else if session.is_focused() {
            if let Some(current) = self.tabs.current() {
                self.set_current_tab(current);
            }
        }
        tracing::info!(
            "Detached session {:?}, remaining sessions: {}",
            id,
            self.registry.len()
        );
        Some(session)
    }

    /// Detach every session whose transport ended on its own and whose
    /// `close_on_exit` policy allows closing it
    pub fn reap_exited(&mut self) -> Vec<SessionId> {
        let exited: Vec<SessionId> = self
            .registry
            .iter()
            .filter(|(_, session)| session.has_exited() && closes_on_exit(*session))
            .map(|(id, _)| id)
            .collect();
        for id in &exited {
            tracing::info!("Session {:?} exited", id);
            self.detach_session(*id);
        }
        exited
    }

    /// Close one pane. The session may decline on its own.
    pub fn close_session(&mut self, id: SessionId) -> Result<CloseOutcome, LayoutError> {
        if !self.registry.contains(id) {
            return Err(LayoutError::UnknownSession(id));
        }
        self.close.request(CloseGranularity::Terminal);
        let accepted = self
            .registry
            .get_mut(id)
            .is_some_and(|session| session.request_close(false));

        let outcome = if accepted {
            self.close.begin_closing();
            self.detach_session(id);
            CloseOutcome::Closed(vec![id])
        } else {
            tracing::info!("Session {:?} declined to close", id);
            CloseOutcome::Cancelled
        };
        self.close.finish();
        Ok(outcome)
    }

    /// Close tab `position`. A bare session closes like a single pane; a
    /// split tab asks for confirmation first and then closes every pane.
    pub fn close_tab(
        &mut self,
        position: usize,
        confirm: &mut dyn ConfirmationSurface,
    ) -> Result<CloseOutcome, LayoutError> {
        let entry = self
            .classify(position)
            .ok_or(LayoutError::UnknownTab(position))?;
        if let Some(single) = entry.single {
            return self.close_session(single);
        }

        self.close.request(CloseGranularity::Tab);
        self.close.await_confirmation();
        if !confirm.confirm(CONFIRM_TITLE, CONFIRM_CLOSE_PANES) {
            tracing::info!("Closing tab {} declined", position);
            self.close.finish();
            return Ok(CloseOutcome::Cancelled);
        }

        self.close.begin_closing();
        let closed = self.close_tab_sessions(position);
        self.close.finish();
        Ok(CloseOutcome::Closed(closed))
    }

    /// Close the whole window. Asks for confirmation unless no tabs are open;
    /// on acceptance every session is closed, then `window` is written to
    /// `settings`. Declining leaves everything open.
    pub fn close_window(
        &mut self,
        confirm: &mut dyn ConfirmationSurface,
        settings: &mut dyn SettingsStore,
        window: &WindowSettings,
    ) -> CloseOutcome {
        self.close.request(CloseGranularity::Window);
        if !self.tabs.is_empty() {
            self.close.await_confirmation();
            if !confirm.confirm(CONFIRM_TITLE, CONFIRM_CLOSE_WINDOW) {
                tracing::info!("Closing window declined");
                self.close.finish();
                return CloseOutcome::Cancelled;
            }
        }

        self.close.begin_closing();
        let mut closed = Vec::new();
        for (id, mut session) in self.registry.drain() {
            if !session.request_close(true) {
                tracing::warn!("Session {:?} refused a confirmed close", id);
            }
            closed.push(id);
        }
        while let Some(last) = self.tabs.count().checked_sub(1) {
            self.tabs.remove(last);
        }
        self.on_tab_layout_changed();

        window.write(settings);
        if let Err(e) = settings.sync() {
            tracing::error!("Failed to save window settings: {}", e);
        }
        self.close.finish();
        tracing::info!("Closed window with {} sessions", closed.len());
        CloseOutcome::Closed(closed)
    }

    /// Resize every session to the grid its pane offers inside `host`'s viewport
    pub fn layout_panes(&mut self, host: &dyn HostWindow) {
        let (view_w, view_h) = host.viewport_size();
        let (cell_w, cell_h) = host.cell_size();
        let (cell_w, cell_h) = (cell_w.max(1) as f32, cell_h.max(1) as f32);

        for tab in self.tabs.tabs() {
            for (id, rect) in tab.root().pane_rects(Rect::full()) {
                let columns = ((rect.width * view_w as f32) / cell_w).floor().max(1.0) as u16;
                let rows = ((rect.height * view_h as f32) / cell_h).floor().max(1.0) as u16;
                if let Some(session) = self.registry.get_mut(id) {
                    session.resize(columns, rows);
                }
            }
        }
    }

    /// Handler for tab insert/remove/move and split changes: drains the
    /// queued events and rebuilds the index.
    fn on_tab_layout_changed(&mut self) {
        for event in self.tabs.take_events() {
            tracing::debug!("Tab layout changed: {:?}", event);
        }
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index = TabLayoutIndex::build(&self.tabs);
        for position in 0..self.tabs.count() {
            self.refresh_titles(position);
        }
        tracing::debug!(
            "Rebuilt tab index: {} tabs, {} sessions",
            self.index.len(),
            self.index.terminal_count()
        );
        debug_assert_eq!(self.index.terminal_count(), self.registry.len());
    }

    /// Refresh the titles of every session in a tab, then the tab's own title
    /// from its focused session.
    fn refresh_titles(&mut self, position: usize) {
        let Some(root) = self.tabs.widget_at(position) else {
            return;
        };
        let ids = root.collect_terminals();
        for id in &ids {
            if let Some(session) = self.registry.get_mut(*id) {
                session.refresh_title(position);
            }
        }
        let shown = match self.tabs.focus_widget(position) {
            Some(WidgetId::Session(id)) if ids.contains(&id) => Some(id),
            _ => ids.first().copied(),
        };
        let title = shown
            .and_then(|id| self.registry.get(id))
            .map(|session| session.title())
            .unwrap_or_default();
        self.tabs.set_title(position, &title);
    }

    fn close_tab_sessions(&mut self, position: usize) -> Vec<SessionId> {
        let ids = self
            .tabs
            .widget_at(position)
            .map(LayoutNode::collect_terminals)
            .unwrap_or_default();
        for id in &ids {
            if let Some(session) = self.registry.get_mut(*id) {
                if !session.request_close(true) {
                    tracing::warn!("Session {:?} refused a confirmed close", id);
                }
            }
        }
        let was_focused = ids.iter().any(|id| {
            self.registry
                .get(*id)
                .is_some_and(|session| session.is_focused())
        });
        for id in &ids {
            self.registry.remove(*id);
        }
        self.tabs.remove(position);
        self.on_tab_layout_changed();
        if was_focused {
            if let Some(current) = self.tabs.current() {
                self.set_current_tab(current);
            }
        }
        tracing::info!("Closed tab {} and its {} sessions", position, ids.len());
        ids
    }

    /// Bare-session or split classification of a tab, falling back to the
    /// tab strip when the index does not cover it yet
    fn classify(&self, position: usize) -> Option<TabEntry> {
        if let Some(entry) = self.index.entry(position) {
            return Some(entry);
        }
        match self.tabs.widget_at(position)? {
            LayoutNode::Leaf(id) => Some(TabEntry {
                split: None,
                single: Some(*id),
            }),
            LayoutNode::Split(split) => Some(TabEntry {
                split: Some(split.id()),
                single: None,
            }),
        }
    }

    /// Tab containing `widget`; uses the index unless a structural change is
    /// still pending
    fn locate(&self, widget: WidgetId) -> Option<usize> {
        if !self.tabs.has_pending_events() {
            if let Some(position) = self.index.tab_of(widget) {
                return Some(position);
            }
        }
        self.tabs.find_tab(widget)
    }

    fn clear_session_focus(&mut self) {
        for (_, session) in self.registry.iter_mut() {
            session.set_focused(false);
        }
    }

    fn fit_window_to_first_tab(&mut self, id: SessionId, host: &mut dyn HostWindow) {
        if host.is_maximized() || self.tabs.count() != 1 {
            return;
        }
        let Some(session) = self.registry.get_mut(id) else {
            return;
        };
        let (columns, rows) = (session.config().width, session.config().height);
        let (cell_w, cell_h) = host.cell_size();
        let wanted = (
            u32::from(columns).saturating_mul(cell_w),
            u32::from(rows).saturating_mul(cell_h),
        );
        let viewport = host.viewport_size();
        if viewport.0 >= wanted.0 && viewport.1 >= wanted.1 {
            return;
        }

        let window = host.window_size();
        let width = wanted.0.saturating_add(window.0.saturating_sub(viewport.0));
        let height = wanted.1.saturating_add(window.1.saturating_sub(viewport.1));
        tracing::info!(
            "Resizing window to {}x{} to fit a {}x{} session",
            width,
            height,
            columns,
            rows
        );
        host.set_window_size(width, height);
        session.resize(columns, rows);
    }

    fn allocate_split_id(&mut self) -> SplitId {
        let id = SplitId(self.next_split_id);
        self.next_split_id += 1;
        id
    }
}

fn closes_on_exit<S: TerminalSession>(session: &S) -> bool {
    match session.config().close_on_exit {
        CloseOnExit::Never => false,
        CloseOnExit::Normal => session.exited_cleanly(),
        CloseOnExit::Always => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFactory, FakeHost, ScriptedConfirm};
    use pt_core::TomlSettingsStore;
    use std::rc::Rc;

    fn manager() -> LayoutManager<FakeFactory> {
        LayoutManager::new(FakeFactory::default())
    }

    fn open(manager: &mut LayoutManager<FakeFactory>, split: SplitType) -> SessionId {
        manager
            .open_session(&SessionConfig::default(), split, None, &mut FakeHost::default())
            .unwrap()
    }

    fn assert_consistent(manager: &LayoutManager<FakeFactory>) {
        let leaves: usize = manager.tabs.tabs().map(|tab| tab.root().leaf_count()).sum();
        assert_eq!(leaves, manager.registry.len());
        assert_eq!(manager.index.terminal_count(), manager.registry.len());
        assert!(manager.tabs.tabs().all(|tab| tab.root().is_well_formed()));
        assert_eq!(manager.index, TabLayoutIndex::build(&manager.tabs));
    }

    #[test]
    fn split_request_without_tabs_opens_a_tab() {
        let mut manager = manager();
        let a = open(&mut manager, SplitType::Horizontal);

        assert_eq!(manager.tab_count(), 1);
        assert_eq!(manager.tree(0), Some(&LayoutNode::Leaf(a)));
        assert_consistent(&manager);
    }

    #[test]
    fn vertical_split_of_bare_session() {
        let mut manager = manager();
        let a = open(&mut manager, SplitType::Leaf);
        let b = open(&mut manager, SplitType::Vertical);

        let split = manager.tree(0).and_then(LayoutNode::as_split).unwrap();
        assert_eq!(split.orientation(), Orientation::Vertical);
        assert_eq!(split.collect_terminals(), vec![a, b]);
        assert_eq!(manager.terminal_tab_index(a), Some(0));
        assert_eq!(manager.terminal_tab_index(b), Some(0));
        assert_eq!(manager.current_session(), Some(b));
        assert!(manager.session(b).unwrap().is_focused());
        assert!(!manager.session(a).unwrap().is_focused());
        assert_eq!(manager.tab_count(), 1);
        assert_consistent(&manager);
    }

    #[test]
    fn declined_tab_close_changes_nothing() {
        let factory = FakeFactory::default();
        let log = Rc::clone(&factory.close_log);
        let mut manager = LayoutManager::new(factory);
        let a = open(&mut manager, SplitType::Leaf);
        let b = open(&mut manager, SplitType::Horizontal);
        let before = manager.tree(0).cloned();

        let mut confirm = ScriptedConfirm::answering(&[false]);
        let outcome = manager.close_tab(0, &mut confirm).unwrap();

        assert_eq!(outcome, CloseOutcome::Cancelled);
        assert_eq!(confirm.prompts, vec![CONFIRM_CLOSE_PANES.to_string()]);
        assert_eq!(manager.tab_count(), 1);
        assert_eq!(manager.tree(0).cloned(), before);
        assert!(manager.session(a).is_some() && manager.session(b).is_some());
        assert!(log.borrow().is_empty());
        assert_eq!(manager.close_state(), CloseState::Idle);
    }

    #[test]
    fn accepted_tab_close_cascades() {
        let factory = FakeFactory::default();
        let log = Rc::clone(&factory.close_log);
        let mut manager = LayoutManager::new(factory);
        let keep = open(&mut manager, SplitType::Leaf);
        let a = open(&mut manager, SplitType::Leaf);
        let b = open(&mut manager, SplitType::Horizontal);
        assert_eq!(manager.tab_count(), 2);

        let mut confirm = ScriptedConfirm::answering(&[true]);
        let outcome = manager.close_tab(1, &mut confirm).unwrap();

        assert_eq!(outcome, CloseOutcome::Closed(vec![a, b]));
        assert_eq!(*log.borrow(), vec![(a, true), (b, true)]);
        assert_eq!(manager.tab_count(), 1);
        assert_eq!(manager.session_count(), 1);
        assert_eq!(manager.current_session(), Some(keep));
        assert!(manager.session(keep).unwrap().is_focused());
        assert_eq!(manager.close_state(), CloseState::Idle);
        assert_consistent(&manager);
    }

    #[test]
    fn closing_focused_pane_promotes_sibling() {
        let mut manager = manager();
        let a = open(&mut manager, SplitType::Leaf);
        let b = open(&mut manager, SplitType::Horizontal);
        assert_eq!(manager.resolve_focused_session(0), Some(b));

        let outcome = manager.close_session(b).unwrap();

        assert_eq!(outcome, CloseOutcome::Closed(vec![b]));
        assert_eq!(manager.tree(0), Some(&LayoutNode::Leaf(a)));
        assert_eq!(manager.index.entry(0).unwrap().single, Some(a));
        assert_eq!(manager.resolve_focused_session(0), Some(a));
        assert!(manager.session(a).unwrap().is_focused());
        assert_consistent(&manager);
    }

    #[test]
    fn collapsing_split_under_splitter_focus_focuses_sibling() {
        let mut manager = manager();
        let a = open(&mut manager, SplitType::Leaf);
        let b = open(&mut manager, SplitType::Horizontal);
        let split = manager.tree(0).and_then(LayoutNode::as_split).unwrap().id();
        assert!(manager.focus_splitter(split));

        manager.session_mut(b).unwrap().exited = true;
        assert_eq!(manager.reap_exited(), vec![b]);

        assert_eq!(manager.tabs.focus_widget(0), Some(WidgetId::Session(a)));
        assert_eq!(manager.current_session(), Some(a));
        assert_eq!(manager.resolve_focused_session(0), Some(a));
        assert!(manager.session(a).unwrap().is_focused());
        assert_consistent(&manager);
    }

    #[test]
    fn collapsing_split_in_background_tab_keeps_current_focus() {
        let mut manager = manager();
        let a = open(&mut manager, SplitType::Leaf);
        let b = open(&mut manager, SplitType::Horizontal);
        let split = manager.tree(0).and_then(LayoutNode::as_split).unwrap().id();
        assert!(manager.focus_splitter(split));
        let c = open(&mut manager, SplitType::Leaf);

        manager.detach_session(b);

        assert_eq!(manager.tabs.focus_widget(0), Some(WidgetId::Session(a)));
        assert_eq!(manager.current_session(), Some(c));
        assert!(manager.session(c).unwrap().is_focused());
        assert!(!manager.session(a).unwrap().is_focused());
        assert_consistent(&manager);
    }

    #[test]
    fn pane_cycling_wraps_within_current_tab() {
        let mut manager = manager();
        open(&mut manager, SplitType::Leaf);
        let a = open(&mut manager, SplitType::Leaf);
        let b = open(&mut manager, SplitType::Horizontal);
        let c = open(&mut manager, SplitType::Vertical);
        assert_eq!(manager.current_session(), Some(c));

        assert_eq!(manager.cycle_pane(true), Some(a));
        assert!(manager.session(a).unwrap().is_focused());
        assert_eq!(manager.cycle_pane(false), Some(c));
        assert_eq!(manager.cycle_pane(false), Some(b));
        assert_eq!(manager.current_tab(), Some(1));
        assert!(!manager.session(c).unwrap().is_focused());
    }

    #[test]
    fn pane_cycling_from_splitter_starts_at_first_pane() {
        let mut manager = manager();
        let a = open(&mut manager, SplitType::Leaf);
        open(&mut manager, SplitType::Vertical);
        let split = manager.tree(0).and_then(LayoutNode::as_split).unwrap().id();
        manager.focus_splitter(split);

        assert_eq!(manager.cycle_pane(true), Some(a));
        assert_eq!(manager.current_session(), Some(a));
        assert_eq!(self::manager().cycle_pane(true), None);
    }

    #[test]
    fn unindexed_tab_resolves_through_strip() {
        let mut manager = manager();
        open(&mut manager, SplitType::Leaf);

        // A tab lands in the strip before the index catches up
        let id = manager.registry.allocate_id();
        let session = manager
            .factory
            .create_session(id, &SessionConfig::default())
            .unwrap();
        manager.registry.insert(id, session);
        let position = manager.tabs.insert(None, LayoutNode::Leaf(id), "");
        assert_eq!(manager.index.len(), 1);

        assert_eq!(manager.resolve_focused_session(position), Some(id));
        assert!(manager.focus_session(id));
        assert_eq!(manager.current_tab(), Some(position));
    }

    #[test]
    fn failed_session_leaves_layout_untouched() {
        let mut manager = manager();
        let a = open(&mut manager, SplitType::Leaf);
        manager.factory.fail_next = true;

        let result = manager.open_session(
            &SessionConfig::default(),
            SplitType::Vertical,
            None,
            &mut FakeHost::default(),
        );

        assert!(matches!(result, Err(LayoutError::SessionInit(_))));
        assert_eq!(manager.tree(0), Some(&LayoutNode::Leaf(a)));
        assert_eq!(manager.session_count(), 1);
        assert_consistent(&manager);
    }

    #[test]
    fn split_with_focus_on_splitter_is_discarded() {
        let factory = FakeFactory::default();
        let log = Rc::clone(&factory.close_log);
        let mut manager = LayoutManager::new(factory);
        open(&mut manager, SplitType::Leaf);
        open(&mut manager, SplitType::Horizontal);
        let split = manager.tree(0).and_then(LayoutNode::as_split).unwrap().id();
        assert!(manager.focus_splitter(split));
        assert_eq!(manager.current_session(), None);

        let result = manager.open_session(
            &SessionConfig::default(),
            SplitType::Vertical,
            None,
            &mut FakeHost::default(),
        );

        assert!(matches!(result, Err(LayoutError::NoFocusedSession(0))));
        assert_eq!(manager.session_count(), 2);
        assert_eq!(log.borrow().len(), 1);
        assert_consistent(&manager);
    }

    #[test]
    fn split_into_missing_tab_is_rejected() {
        let mut manager = manager();
        open(&mut manager, SplitType::Leaf);
        let result = manager.open_session(
            &SessionConfig::default(),
            SplitType::Horizontal,
            Some(4),
            &mut FakeHost::default(),
        );
        assert!(matches!(result, Err(LayoutError::UnknownTab(4))));
        assert_eq!(manager.session_count(), 1);
    }

    #[test]
    fn bare_tab_close_needs_no_confirmation() {
        let factory = FakeFactory::default();
        let log = Rc::clone(&factory.close_log);
        let mut manager = LayoutManager::new(factory);
        let a = open(&mut manager, SplitType::Leaf);

        let mut confirm = ScriptedConfirm::default();
        let outcome = manager.close_tab(0, &mut confirm).unwrap();

        assert_eq!(outcome, CloseOutcome::Closed(vec![a]));
        assert!(confirm.prompts.is_empty());
        assert_eq!(*log.borrow(), vec![(a, false)]);
        assert_eq!(manager.tab_count(), 0);
        assert_consistent(&manager);
    }

    #[test]
    fn session_may_refuse_a_single_close() {
        let mut manager = manager();
        let a = open(&mut manager, SplitType::Leaf);
        manager.session_mut(a).unwrap().refuse_close = true;

        let outcome = manager.close_session(a).unwrap();

        assert_eq!(outcome, CloseOutcome::Cancelled);
        assert_eq!(manager.tab_count(), 1);
        assert_eq!(manager.close_state(), CloseState::Idle);
    }

    #[test]
    fn window_close_declined_keeps_everything() {
        let mut manager = manager();
        open(&mut manager, SplitType::Leaf);
        open(&mut manager, SplitType::Vertical);
        let mut store = TomlSettingsStore::in_memory();
        let mut confirm = ScriptedConfirm::answering(&[false]);

        let outcome = manager.close_window(&mut confirm, &mut store, &WindowSettings::default());

        assert_eq!(outcome, CloseOutcome::Cancelled);
        assert_eq!(manager.session_count(), 2);
        assert!(store.value(pt_core::settings::WINDOW_GROUP, "maximized").is_none());
    }

    #[test]
    fn window_close_cascades_and_saves_settings() {
        let factory = FakeFactory::default();
        let log = Rc::clone(&factory.close_log);
        let mut manager = LayoutManager::new(factory);
        let a = open(&mut manager, SplitType::Leaf);
        let b = open(&mut manager, SplitType::Vertical);
        let c = open(&mut manager, SplitType::Leaf);
        let mut store = TomlSettingsStore::in_memory();
        let mut confirm = ScriptedConfirm::answering(&[true]);
        let window = WindowSettings {
            show_menu_bar: false,
            ..WindowSettings::default()
        };

        let outcome = manager.close_window(&mut confirm, &mut store, &window);

        assert_eq!(outcome, CloseOutcome::Closed(vec![a, b, c]));
        assert!(log.borrow().iter().all(|(_, cascade)| *cascade));
        assert_eq!(manager.tab_count(), 0);
        assert_eq!(manager.session_count(), 0);
        assert!(manager.index.is_empty());
        assert_eq!(
            WindowSettings::read(&store, WindowSettings::default()),
            window
        );
    }

    #[test]
    fn empty_window_closes_without_prompt() {
        let mut manager = manager();
        let mut store = TomlSettingsStore::in_memory();
        let mut confirm = ScriptedConfirm::default();
        let outcome = manager.close_window(&mut confirm, &mut store, &WindowSettings::default());
        assert_eq!(outcome, CloseOutcome::Closed(Vec::new()));
        assert!(confirm.prompts.is_empty());
    }

    #[test]
    fn first_tab_grows_small_window() {
        let mut manager = manager();
        let mut host = FakeHost {
            window: (620, 460),
            viewport: (600, 400),
            ..FakeHost::default()
        };
        let a = manager
            .open_session(&SessionConfig::default(), SplitType::Leaf, None, &mut host)
            .unwrap();

        assert_eq!(host.resizes, vec![(660, 540)]);
        assert_eq!(host.viewport, (640, 480));
        assert_eq!(manager.session(a).unwrap().size, (80, 30));

        manager
            .open_session(&SessionConfig::default(), SplitType::Leaf, None, &mut host)
            .unwrap();
        assert_eq!(host.resizes.len(), 1);
    }

    #[test]
    fn oversized_cells_saturate_window_size() {
        let mut manager = manager();
        let mut host = FakeHost {
            cell: (u32::MAX / 2, u32::MAX / 2),
            ..FakeHost::default()
        };
        let a = manager
            .open_session(&SessionConfig::default(), SplitType::Leaf, None, &mut host)
            .unwrap();

        assert_eq!(host.resizes, vec![(u32::MAX, u32::MAX)]);
        assert_eq!(manager.session(a).unwrap().size, (80, 30));
    }

    #[test]
    fn maximized_window_is_not_resized() {
        let mut manager = manager();
        let mut host = FakeHost {
            maximized: true,
            viewport: (100, 100),
            ..FakeHost::default()
        };
        manager
            .open_session(&SessionConfig::default(), SplitType::Leaf, None, &mut host)
            .unwrap();
        assert!(host.resizes.is_empty());
    }

    #[test]
    fn titles_follow_tab_moves() {
        let mut manager = manager();
        let a = open(&mut manager, SplitType::Leaf);
        let b = open(&mut manager, SplitType::Leaf);
        assert_eq!(manager.session(a).unwrap().title, "1. session 1");
        assert_eq!(manager.tabs.title(1), Some("2. session 2"));

        assert!(manager.move_tab(1, 0));

        assert_eq!(manager.terminal_tab_index(b), Some(0));
        assert_eq!(manager.session(a).unwrap().title, "2. session 1");
        assert_eq!(manager.tabs.title(0), Some("1. session 2"));
        assert_consistent(&manager);
    }

    #[test]
    fn switching_tabs_moves_input_focus() {
        let mut manager = manager();
        let a = open(&mut manager, SplitType::Leaf);
        let b = open(&mut manager, SplitType::Leaf);
        let c = open(&mut manager, SplitType::Vertical);
        assert_eq!(manager.current_session(), Some(c));

        assert_eq!(manager.set_current_tab(0), Some(a));
        assert!(manager.session(a).unwrap().is_focused());
        assert!(!manager.session(c).unwrap().is_focused());

        manager.focus_session(b);
        assert_eq!(manager.set_current_tab(0), Some(a));
        assert_eq!(manager.set_current_tab(1), Some(b));
    }

    #[test]
    fn exited_sessions_are_reaped() {
        let mut manager = manager();
        let a = open(&mut manager, SplitType::Leaf);
        let b = open(&mut manager, SplitType::Horizontal);
        manager.session_mut(a).unwrap().exited = true;

        assert_eq!(manager.reap_exited(), vec![a]);
        assert_eq!(manager.tree(0), Some(&LayoutNode::Leaf(b)));
        assert_consistent(&manager);
    }

    #[test]
    fn close_on_exit_policy_decides_reaping() {
        let mut manager = manager();
        let never = SessionConfig {
            close_on_exit: CloseOnExit::Never,
            ..SessionConfig::default()
        };
        let always = SessionConfig {
            close_on_exit: CloseOnExit::Always,
            ..SessionConfig::default()
        };
        let mut host = FakeHost::default();
        let kept = manager
            .open_session(&never, SplitType::Leaf, None, &mut host)
            .unwrap();
        let failed = open(&mut manager, SplitType::Leaf);
        let forced = manager
            .open_session(&always, SplitType::Leaf, None, &mut host)
            .unwrap();
        for id in [kept, failed, forced] {
            let session = manager.session_mut(id).unwrap();
            session.exited = true;
            session.clean_exit = false;
        }

        assert_eq!(manager.reap_exited(), vec![forced]);
        assert!(manager.session(kept).is_some());
        assert!(manager.session(failed).is_some());

        manager.session_mut(failed).unwrap().clean_exit = true;
        assert_eq!(manager.reap_exited(), vec![failed]);
        assert_eq!(manager.session_count(), 1);
        assert_consistent(&manager);
    }

    #[test]
    fn rebuild_twice_is_stable() {
        let mut manager = manager();
        open(&mut manager, SplitType::Leaf);
        open(&mut manager, SplitType::Horizontal);
        open(&mut manager, SplitType::Leaf);
        let first = manager.index.clone();
        manager.rebuild_index();
        assert_eq!(manager.index, first);
    }

    #[test]
    fn panes_get_grid_from_their_share() {
        let mut manager = manager();
        let host = FakeHost {
            viewport: (800, 480),
            cell: (10, 16),
            ..FakeHost::default()
        };
        let a = open(&mut manager, SplitType::Leaf);
        let b = open(&mut manager, SplitType::Horizontal);

        manager.layout_panes(&host);

        assert_eq!(manager.session(a).unwrap().size, (40, 30));
        assert_eq!(manager.session(b).unwrap().size, (40, 30));
    }

    #[test]
    fn reconfigure_updates_session() {
        let mut manager = manager();
        let a = open(&mut manager, SplitType::Leaf);
        let config = SessionConfig {
            host: "changed".to_string(),
            ..SessionConfig::default()
        };
        manager.reconfigure_session(a, &config).unwrap();
        assert_eq!(manager.session(a).unwrap().config.host, "changed");
        assert!(matches!(
            manager.reconfigure_session(SessionId(99), &config),
            Err(LayoutError::UnknownSession(_))
        ));
    }
}
