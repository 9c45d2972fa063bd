//! Window-manager layout tree domain entity.
//!
//! A tiling window manager arranges windows in a tree: the root holds
//! outputs, outputs hold workspaces, workspaces hold split containers, and
//! the leaves are application windows.  Every node carries its on-screen
//! rectangle in global pixel coordinates.
//!
//! The tree is a read-only snapshot.  It is fetched fresh from the compositor
//! for every lookup because windows move between events.

use std::collections::VecDeque;

/// A rectangle in global compositor pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner (may be negative on multi-output setups).
    pub x: i32,
    /// Y coordinate of the top-left corner.
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// How a container presents its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Horizontal or vertical split: every child is visible side by side.
    #[default]
    Normal,
    /// Only one child is visible; children overlap under a title stack.
    Stacked,
    /// Only one child is visible; children overlap under a tab bar.
    Tabbed,
    /// Outputs, workspaces without a split, and unknown layouts.
    Other,
}

impl LayoutMode {
    /// Returns `true` if only one child is visible at a time, which makes the
    /// children's rectangles useless for mapping.
    pub fn hides_children(self) -> bool {
        matches!(self, LayoutMode::Stacked | LayoutMode::Tabbed)
    }
}

/// A node of the layout tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowNode {
    /// Wayland app ID of the window, `None` for containers and X11 windows.
    pub app_id: Option<String>,
    pub layout: LayoutMode,
    pub rect: Rect,
    /// Tiled children first, then floating children.
    pub children: Vec<WindowNode>,
}

impl WindowNode {
    /// Creates a container node with no app ID.
    pub fn container(layout: LayoutMode, rect: Rect, children: Vec<WindowNode>) -> Self {
        Self {
            app_id: None,
            layout,
            rect,
            children,
        }
    }

    /// Creates a leaf window node.
    pub fn window(app_id: impl Into<String>, rect: Rect) -> Self {
        Self {
            app_id: Some(app_id.into()),
            layout: LayoutMode::Normal,
            rect,
            children: Vec::new(),
        }
    }
}

/// Locates the target application's window in the layout tree.
///
/// Breadth-first from `root`; the first node whose app ID equals
/// `target_app_id` wins, so a shallower window beats a deeper one and, at
/// equal depth, the earlier sibling wins.  Children of stacked and tabbed
/// containers are never visited.
///
/// The walk uses an explicit queue, so tree depth does not grow the call stack.
///
/// Returns `None` when the target is not shown (or only shown inside a
/// stacked/tabbed container).
pub fn find_target_window<'a>(root: &'a WindowNode, target_app_id: &str) -> Option<&'a WindowNode> {
    let mut queue: VecDeque<&WindowNode> = VecDeque::new();
    queue.push_back(root);

    while let Some(node) = queue.pop_front() {
        if node.app_id.as_deref() == Some(target_app_id) {
            return Some(node);
        }

        if node.layout.hides_children() {
            continue;
        }

        queue.extend(node.children.iter());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "com.github.flxzt.rnote";

    fn split(children: Vec<WindowNode>) -> WindowNode {
        WindowNode::container(LayoutMode::Normal, Rect::new(0, 0, 1920, 1080), children)
    }

    fn leaf(app_id: &str, x: i32) -> WindowNode {
        WindowNode::window(app_id, Rect::new(x, 0, 960, 1080))
    }

    // ── Rect / LayoutMode ─────────────────────────────────────────────────────

    #[test]
    fn test_rect_is_empty_when_width_or_height_is_zero() {
        assert!(Rect::new(0, 0, 0, 10).is_empty());
        assert!(Rect::new(0, 0, 10, 0).is_empty());
        assert!(!Rect::new(0, 0, 10, 10).is_empty());
    }

    #[test]
    fn test_only_stacked_and_tabbed_hide_children() {
        assert!(LayoutMode::Stacked.hides_children());
        assert!(LayoutMode::Tabbed.hides_children());
        assert!(!LayoutMode::Normal.hides_children());
        assert!(!LayoutMode::Other.hides_children());
    }

    // ── find_target_window ────────────────────────────────────────────────────

    #[test]
    fn test_find_returns_target_leaf_in_split_container() {
        let root = split(vec![leaf("foot", 0), leaf(TARGET, 960)]);

        let found = find_target_window(&root, TARGET).expect("target must be found");

        assert_eq!(found.rect, Rect::new(960, 0, 960, 1080));
    }

    #[test]
    fn test_find_returns_none_when_target_absent() {
        let root = split(vec![leaf("foot", 0), leaf("firefox", 960)]);
        assert!(find_target_window(&root, TARGET).is_none());
    }

    #[test]
    fn test_find_returns_root_when_root_matches() {
        let root = leaf(TARGET, 0);
        assert_eq!(find_target_window(&root, TARGET), Some(&root));
    }

    #[test]
    fn test_find_prunes_target_inside_stacked_container() {
        // Arrange: target exists, but only under a stacked container
        let stacked = WindowNode::container(
            LayoutMode::Stacked,
            Rect::new(0, 0, 1920, 1080),
            vec![leaf("foot", 0), leaf(TARGET, 0)],
        );
        let root = split(vec![stacked]);

        // Act
        let found = find_target_window(&root, TARGET);

        // Assert
        assert!(found.is_none(), "stacked children must not be visited");
    }

    #[test]
    fn test_find_prunes_target_nested_deeper_below_tabbed_container() {
        let inner = split(vec![leaf(TARGET, 0)]);
        let tabbed =
            WindowNode::container(LayoutMode::Tabbed, Rect::new(0, 0, 1920, 1080), vec![inner]);
        let root = split(vec![tabbed]);

        assert!(find_target_window(&root, TARGET).is_none());
    }

    #[test]
    fn test_find_still_visits_siblings_of_pruned_container() {
        let stacked = WindowNode::container(
            LayoutMode::Stacked,
            Rect::new(0, 0, 960, 1080),
            vec![leaf(TARGET, 0)],
        );
        let root = split(vec![stacked, leaf(TARGET, 960)]);

        let found = find_target_window(&root, TARGET).expect("visible sibling must be found");

        assert_eq!(found.rect.x, 960);
    }

    #[test]
    fn test_find_prefers_shallower_match() {
        // Arrange: deep match comes first in document order, shallow one later
        let deep = split(vec![split(vec![WindowNode::window(TARGET, Rect::new(1, 1, 10, 10))])]);
        let shallow = WindowNode::window(TARGET, Rect::new(2, 2, 20, 20));
        let root = split(vec![deep, shallow]);

        // Act
        let found = find_target_window(&root, TARGET).expect("target must be found");

        // Assert
        assert_eq!(found.rect, Rect::new(2, 2, 20, 20));
    }

    #[test]
    fn test_find_prefers_earlier_sibling_at_equal_depth() {
        let first = WindowNode::window(TARGET, Rect::new(0, 0, 100, 100));
        let second = WindowNode::window(TARGET, Rect::new(500, 0, 100, 100));
        let root = split(vec![first, second]);

        let found = find_target_window(&root, TARGET).expect("target must be found");

        assert_eq!(found.rect.x, 0);
    }

    #[test]
    fn test_find_descends_into_other_layout_containers() {
        let workspace =
            WindowNode::container(LayoutMode::Other, Rect::default(), vec![leaf(TARGET, 0)]);
        let root = WindowNode::container(LayoutMode::Other, Rect::default(), vec![workspace]);

        assert!(find_target_window(&root, TARGET).is_some());
    }

    #[test]
    fn test_find_handles_very_deep_tree_without_recursion() {
        // Arrange: a 100_000-level chain would overflow a recursive walk
        let mut node = WindowNode::window(TARGET, Rect::new(7, 7, 70, 70));
        for _ in 0..100_000 {
            node = split(vec![node]);
        }

        // Act
        let found = find_target_window(&node, TARGET).map(|n| n.rect);

        // Assert
        assert_eq!(found, Some(Rect::new(7, 7, 70, 70)));

        // Dismantle iteratively: the derived Drop is recursive.
        let mut stack = vec![node];
        while let Some(mut n) = stack.pop() {
            stack.append(&mut n.children);
        }
    }
}
