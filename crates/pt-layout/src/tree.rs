// ABOUTME: Binary split tree holding the sessions of one tab.
// ABOUTME: Supports splitting a leaf, pre-order traversal, leaf removal with collapse, and pane rectangles.

use std::collections::{HashMap, HashSet};

/// Exclusive handle of a live terminal session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/// Identity of a split node (the splitter between two panes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SplitId(pub u64);

/// Anything that can be a tab root or hold focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetId {
    Session(SessionId),
    Split(SplitId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Children side by side
    Horizontal,
    /// Children stacked top to bottom
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    Leaf(SessionId),
    Split(SplitNode),
}

/// A division of space between exactly two children
#[derive(Debug, Clone, PartialEq)]
pub struct SplitNode {
    id: SplitId,
    orientation: Orientation,
    ratio: f32,
    first: Box<LayoutNode>,
    second: Box<LayoutNode>,
}

/// Result of `LayoutNode::remove_leaf`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    NotFound,
    /// The leaf was detached and its sibling promoted; `promoted` is the
    /// first session of the promoted subtree.
    Removed { promoted: SessionId },
    /// The node was the leaf itself; nothing remains.
    Emptied,
}

/// Rectangle in normalized coordinates (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn full() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

impl SplitNode {
    pub fn new(id: SplitId, orientation: Orientation, first: LayoutNode, second: LayoutNode) -> Self {
        Self {
            id,
            orientation,
            ratio: 0.5,
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    pub fn id(&self) -> SplitId {
        self.id
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn first(&self) -> &LayoutNode {
        &self.first
    }

    pub fn second(&self) -> &LayoutNode {
        &self.second
    }

    /// Every session under this split, first child before second
    pub fn collect_terminals(&self) -> Vec<SessionId> {
        let mut result = Vec::new();
        collect_terminals(&self.first, &mut result);
        collect_terminals(&self.second, &mut result);
        result
    }
}

impl LayoutNode {
    pub fn root_widget(&self) -> WidgetId {
        match self {
            LayoutNode::Leaf(id) => WidgetId::Session(*id),
            LayoutNode::Split(split) => WidgetId::Split(split.id),
        }
    }

    pub fn as_split(&self) -> Option<&SplitNode> {
        match self {
            LayoutNode::Leaf(_) => None,
            LayoutNode::Split(split) => Some(split),
        }
    }

    /// Replace the leaf `existing` with a split holding `existing` first and
    /// `new` second. Returns false when `existing` is not in this tree.
    pub fn create_split(
        &mut self,
        existing: SessionId,
        new: SessionId,
        split_id: SplitId,
        orientation: Orientation,
    ) -> bool {
        split_node(self, existing, new, split_id, orientation)
    }

    /// Every session in the tree in pre-order (first child before second)
    pub fn collect_terminals(&self) -> Vec<SessionId> {
        let mut result = Vec::new();
        collect_terminals(self, &mut result);
        result
    }

    /// Detach `session`, promoting its sibling into the parent's slot
    pub fn remove_leaf(&mut self, session: SessionId) -> Removal {
        match self {
            LayoutNode::Leaf(id) if *id == session => Removal::Emptied,
            LayoutNode::Leaf(_) => Removal::NotFound,
            LayoutNode::Split(_) => match close_node(self, session) {
                Some(promoted) => Removal::Removed { promoted },
                None => Removal::NotFound,
            },
        }
    }

    pub fn contains(&self, session: SessionId) -> bool {
        self.contains_widget(WidgetId::Session(session))
    }

    pub fn contains_widget(&self, widget: WidgetId) -> bool {
        match (self, widget) {
            (LayoutNode::Leaf(id), WidgetId::Session(target)) => *id == target,
            (LayoutNode::Leaf(_), WidgetId::Split(_)) => false,
            (LayoutNode::Split(split), _) => {
                widget == WidgetId::Split(split.id)
                    || split.first.contains_widget(widget)
                    || split.second.contains_widget(widget)
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            LayoutNode::Leaf(_) => 1,
            LayoutNode::Split(split) => split.first.leaf_count() + split.second.leaf_count(),
        }
    }

    /// Layout rectangle of every session, starting from `area`
    pub fn pane_rects(&self, area: Rect) -> HashMap<SessionId, Rect> {
        let mut result = HashMap::new();
        collect_rects(self, area, &mut result);
        result
    }

    /// No session or split appears twice and every ratio leaves room for both children
    pub fn is_well_formed(&self) -> bool {
        let mut sessions = HashSet::new();
        let mut splits = HashSet::new();
        check_node(self, &mut sessions, &mut splits)
    }
}

fn collect_rects(node: &LayoutNode, rect: Rect, out: &mut HashMap<SessionId, Rect>) {
    match node {
        LayoutNode::Leaf(id) => {
            out.insert(*id, rect);
        }
        LayoutNode::Split(split) => {
            let ratio = split.ratio;
            let (first_rect, second_rect) = match split.orientation {
                Orientation::Horizontal => (
                    Rect {
                        width: rect.width * ratio,
                        ..rect
                    },
                    Rect {
                        x: rect.x + rect.width * ratio,
                        width: rect.width * (1.0 - ratio),
                        ..rect
                    },
                ),
                Orientation::Vertical => (
                    Rect {
                        height: rect.height * ratio,
                        ..rect
                    },
                    Rect {
                        y: rect.y + rect.height * ratio,
                        height: rect.height * (1.0 - ratio),
                        ..rect
                    },
                ),
            };
            collect_rects(&split.first, first_rect, out);
            collect_rects(&split.second, second_rect, out);
        }
    }
}

fn split_node(
    node: &mut LayoutNode,
    target: SessionId,
    new: SessionId,
    split_id: SplitId,
    orientation: Orientation,
) -> bool {
    match node {
        LayoutNode::Leaf(id) if *id == target => {
            let old_pane = LayoutNode::Leaf(*id);
            let new_pane = LayoutNode::Leaf(new);
            *node = LayoutNode::Split(SplitNode::new(split_id, orientation, old_pane, new_pane));
            true
        }
        LayoutNode::Leaf(_) => false,
        LayoutNode::Split(split) => {
            split_node(&mut split.first, target, new, split_id, orientation)
                || split_node(&mut split.second, target, new, split_id, orientation)
        }
    }
}

fn is_leaf(node: &LayoutNode, target: SessionId) -> bool {
    matches!(node, LayoutNode::Leaf(id) if *id == target)
}

fn close_node(node: &mut LayoutNode, target: SessionId) -> Option<SessionId> {
    let LayoutNode::Split(split) = node else {
        return None;
    };
    // Check if target is a direct child
    if is_leaf(&split.first, target) {
        let sibling = std::mem::replace(split.second.as_mut(), LayoutNode::Leaf(target));
        *node = sibling;
        return Some(find_first_pane(node));
    }
    if is_leaf(&split.second, target) {
        let sibling = std::mem::replace(split.first.as_mut(), LayoutNode::Leaf(target));
        *node = sibling;
        return Some(find_first_pane(node));
    }
    close_node(&mut split.first, target).or_else(|| close_node(&mut split.second, target))
}

fn find_first_pane(node: &LayoutNode) -> SessionId {
    match node {
        LayoutNode::Leaf(id) => *id,
        LayoutNode::Split(split) => find_first_pane(&split.first),
    }
}

fn collect_terminals(node: &LayoutNode, out: &mut Vec<SessionId>) {
    match node {
        LayoutNode::Leaf(id) => out.push(*id),
        LayoutNode::Split(split) => {
            collect_terminals(&split.first, out);
            collect_terminals(&split.second, out);
        }
    }
}

fn check_node(
    node: &LayoutNode,
    sessions: &mut HashSet<SessionId>,
    splits: &mut HashSet<SplitId>,
) -> bool {
    match node {
        LayoutNode::Leaf(id) => sessions.insert(*id),
        LayoutNode::Split(split) => {
            splits.insert(split.id)
                && split.ratio > 0.0
                && split.ratio < 1.0
                && check_node(&split.first, sessions, splits)
                && check_node(&split.second, sessions, splits)
        }
    }
}
