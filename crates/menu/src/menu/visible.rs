//! Tier-filtered, lazily evaluated view over a tree snapshot.

use std::sync::Arc;

use super::node::{NodeKind, Tier};
use super::tree::{MenuTree, NodeKey, TreeNode};

/// Visible nodes of one snapshot for one entitlement tier.
///
/// Holding a `VisibleMenu` pins the snapshot it was built from; later
/// registry mutations are not observed. Iteration is lazy and can be
/// restarted any number of times with [`VisibleMenu::iter`].
#[derive(Debug, Clone)]
pub struct VisibleMenu {
    tree: Arc<MenuTree>,
    tier: Tier,
}

/// One node yielded by a [`VisibleIter`], in depth-first order.
#[derive(Debug, Clone, Copy)]
pub struct VisibleEntry<'a> {
    /// Nesting level; top-level menus are at depth 0.
    pub depth: usize,
    pub node: &'a TreeNode,
}

impl VisibleMenu {
    pub(crate) fn new(tree: Arc<MenuTree>, tier: Tier) -> Self {
        Self { tree, tier }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Generation of the snapshot this view was built from.
    pub fn generation(&self) -> u64 {
        self.tree.generation()
    }

    pub fn iter(&self) -> VisibleIter<'_> {
        VisibleIter::new(&self.tree, self.tree.roots(), self.tier)
    }

    /// Visible children of the node with the given id.
    pub fn children_of(&self, id: &str) -> VisibleIter<'_> {
        let children = match self.tree.get(id) {
            Some(node) if self.tree.is_visible(node.key(), self.tier) => node.children(),
            _ => &[],
        };
        VisibleIter::new(&self.tree, children, self.tier).top_level_only()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a> IntoIterator for &'a VisibleMenu {
    type Item = VisibleEntry<'a>;
    type IntoIter = VisibleIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
struct Frame<'a> {
    children: &'a [NodeKey],
    next: usize,
    depth: usize,
    /// Something visible was yielded since the last separator in this frame.
    open_group: bool,
}

/// Depth-first iterator over visible nodes.
///
/// Separators are dropped when they would lead, trail, or double up once
/// hidden siblings are filtered out.
#[derive(Debug, Clone)]
pub struct VisibleIter<'a> {
    tree: &'a MenuTree,
    tier: Tier,
    stack: Vec<Frame<'a>>,
    descend: bool,
}

impl<'a> VisibleIter<'a> {
    fn new(tree: &'a MenuTree, children: &'a [NodeKey], tier: Tier) -> Self {
        Self {
            tree,
            tier,
            stack: vec![Frame {
                children,
                next: 0,
                depth: 0,
                open_group: false,
            }],
            descend: true,
        }
    }

    fn top_level_only(mut self) -> Self {
        self.descend = false;
        self
    }

    fn is_content(&self, key: &NodeKey) -> bool {
        self.tree
            .node(*key)
            .is_some_and(|n| n.kind() != NodeKind::Separator)
            && self.tree.is_visible(*key, self.tier)
    }
}

impl<'a> Iterator for VisibleIter<'a> {
    type Item = VisibleEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            let frame = self.stack.last()?;
            if frame.next >= frame.children.len() {
                self.stack.pop();
                continue;
            }
            let (children, index, depth, open_group) =
                (frame.children, frame.next, frame.depth, frame.open_group);
            if let Some(frame) = self.stack.last_mut() {
                frame.next += 1;
            }

            let key = children[index];
            let Some(node) = tree.node(key) else {
                continue;
            };
            if !tree.is_visible(key, self.tier) {
                continue;
            }

            if node.kind() == NodeKind::Separator {
                let followed = children[index + 1..].iter().any(|k| self.is_content(k));
                if !open_group || !followed {
                    continue;
                }
                if let Some(frame) = self.stack.last_mut() {
                    frame.open_group = false;
                }
                return Some(VisibleEntry { depth, node });
            }

            if let Some(frame) = self.stack.last_mut() {
                frame.open_group = true;
            }
            if self.descend && node.kind().is_container() {
                self.stack.push(Frame {
                    children: node.children(),
                    next: 0,
                    depth: depth + 1,
                    open_group: false,
                });
            }
            return Some(VisibleEntry { depth, node });
        }
    }
}
