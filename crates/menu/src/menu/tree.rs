//! Immutable-by-snapshot menu tree.
//!
//! Nodes live in an arena keyed by [`NodeKey`]. Keys are allocated from a
//! monotonic counter, so a key doubles as the node's insertion sequence
//! number: Core nodes get theirs in declaration order, plugin nodes at
//! registration time.
//!
//! The tree itself is not synchronized. [`MenuRegistry`](super::MenuRegistry)
//! wraps it in an `Arc` behind a lock and clones on write.

use std::collections::HashMap;

use crate::command::ActionHandler;
use crate::definition::{MenuDefinition, validate_nodes};
use crate::error::{DefinitionError, MenuError, MenuResult};
use crate::plugin::PluginId;

use super::node::{MenuNode, NodeKind, NodeSource, NodeSpec, Tier};

/// Arena key of a stored node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeKey(u64);

/// A node as stored in the tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    key: NodeKey,
    id: Option<String>,
    label: String,
    kind: NodeKind,
    tier: Tier,
    source: NodeSource,
    enabled: bool,
    checked: bool,
    shortcut: Option<String>,
    tooltip: Option<String>,
    category: Option<String>,
    plugin_anchor: Option<String>,
    handler: Option<ActionHandler>,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl TreeNode {
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Insertion sequence number; lower was inserted earlier.
    pub fn seq(&self) -> u64 {
        self.key.0
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn source(&self) -> &NodeSource {
        &self.source
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn shortcut(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn plugin_anchor(&self) -> Option<&str> {
        self.plugin_anchor.as_deref()
    }

    pub fn handler(&self) -> Option<&ActionHandler> {
        self.handler.as_ref()
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}

/// The canonical menu tree at one point in time.
#[derive(Debug, Clone, Default)]
pub struct MenuTree {
    nodes: HashMap<NodeKey, TreeNode>,
    index: HashMap<String, NodeKey>,
    roots: Vec<NodeKey>,
    next_key: u64,
    generation: u64,
}

impl MenuTree {
    /// Build a Core-only tree from a definition.
    pub fn from_definition(definition: &MenuDefinition) -> Result<Self, DefinitionError> {
        definition.validate()?;

        let mut tree = Self::default();
        for spec in &definition.menus {
            let index = tree.roots.len();
            tree.insert_subtree(spec.clone(), None, index, &NodeSource::Core);
        }
        Ok(tree)
    }

    /// Bumped on every successful mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub(crate) fn bump(&mut self) {
        self.generation += 1;
    }

    /// Number of stored nodes, separators included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level nodes in order.
    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    pub fn node(&self, key: NodeKey) -> Option<&TreeNode> {
        self.nodes.get(&key)
    }

    pub fn key_of(&self, id: &str) -> Option<NodeKey> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.key_of(id).and_then(|key| self.nodes.get(&key))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Every stored node in depth-first declaration order.
    pub fn walk(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack: Vec<NodeKey> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let node = self.nodes.get(&stack.pop()?)?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Owned copy of a node and its subtree.
    pub fn to_menu_node(&self, key: NodeKey) -> Option<MenuNode> {
        let node = self.nodes.get(&key)?;
        Some(MenuNode {
            id: node.id.clone(),
            label: node.label.clone(),
            kind: node.kind,
            tier: node.tier,
            source: node.source.clone(),
            enabled: node.enabled,
            checked: node.checked,
            shortcut: node.shortcut.clone(),
            tooltip: node.tooltip.clone(),
            category: node.category.clone(),
            plugin_anchor: node.plugin_anchor.clone(),
            has_handler: node.handler.is_some(),
            children: node
                .children
                .iter()
                .filter_map(|child| self.to_menu_node(*child))
                .collect(),
        })
    }

    /// Whether `key` survives filtering for `tier`.
    ///
    /// Containers are visible only while at least one actionable descendant
    /// is visible; separators never count towards that.
    pub fn is_visible(&self, key: NodeKey, tier: Tier) -> bool {
        let Some(node) = self.nodes.get(&key) else {
            return false;
        };
        if !tier.permits(node.tier) {
            return false;
        }
        if !node.kind.is_container() {
            return true;
        }
        node.children.iter().any(|child| {
            self.nodes
                .get(child)
                .is_some_and(|c| c.kind != NodeKind::Separator)
                && self.is_visible(*child, tier)
        })
    }

    /// Check that `spec` could be inserted without violating any invariant.
    pub(crate) fn check_insertable(&self, spec: &NodeSpec) -> MenuResult<()> {
        let mut seen = std::collections::HashSet::new();
        validate_nodes(std::slice::from_ref(spec), &mut seen).map_err(|err| match err {
            DefinitionError::DuplicateId { id } => MenuError::duplicate(id),
            other => MenuError::invalid(spec.display_id(), other.to_string()),
        })?;

        if let Some(id) = seen.into_iter().find(|id| self.contains(id)) {
            return Err(MenuError::duplicate(id));
        }
        Ok(())
    }

    /// Check that `spec` may become a direct child of `parent`.
    ///
    /// Radio groups only hold checkable members.
    pub(crate) fn check_placement(&self, parent: NodeKey, spec: &NodeSpec) -> MenuResult<()> {
        let is_radio = self
            .nodes
            .get(&parent)
            .is_some_and(|p| p.kind == NodeKind::RadioGroup);
        if is_radio && spec.kind != NodeKind::Checkable {
            return Err(MenuError::invalid(
                spec.display_id(),
                format!(
                    "radio group members must be checkable, found {}",
                    spec.kind.as_str()
                ),
            ));
        }
        Ok(())
    }

    /// Resolve `parent_id` to a container key.
    pub(crate) fn container_key(&self, parent_id: &str) -> MenuResult<NodeKey> {
        let node = self
            .get(parent_id)
            .ok_or_else(|| MenuError::not_found(parent_id))?;
        if !node.kind.is_container() {
            return Err(MenuError::not_a_container(parent_id));
        }
        Ok(node.key)
    }

    /// Position within `parent`'s children at which a plugin node goes.
    ///
    /// Starting point is just after `anchor` when given, else just after the
    /// parent's plugin anchor, else the end. From there any plugin nodes that
    /// already follow are skipped, so contributions keep registration order
    /// and never land between two Core nodes that were adjacent by design.
    pub(crate) fn insertion_index(&self, parent: NodeKey, anchor: Option<&str>) -> MenuResult<usize> {
        let node = self
            .nodes
            .get(&parent)
            .ok_or_else(|| MenuError::not_found(format!("{parent:?}")))?;
        let children = &node.children;
        let parent_id = node.id.as_deref().unwrap_or_default();

        let position_of = |id: &str| {
            children
                .iter()
                .position(|k| self.nodes.get(k).and_then(|n| n.id.as_deref()) == Some(id))
        };

        let start = match (anchor, node.plugin_anchor.as_deref()) {
            (Some(anchor), _) => {
                position_of(anchor).ok_or_else(|| MenuError::anchor_not_found(anchor, parent_id))? + 1
            }
            (None, Some(region)) => match position_of(region) {
                Some(pos) => pos + 1,
                None => return Ok(children.len()),
            },
            (None, None) => return Ok(children.len()),
        };

        let run = children[start..]
            .iter()
            .take_while(|k| self.nodes.get(*k).is_some_and(|n| !n.source.is_core()))
            .count();
        Ok(start + run)
    }

    /// Insert `spec` and its subtree at `index` under `parent` (or at the top
    /// level). Caller must have validated the spec.
    pub(crate) fn insert_subtree(
        &mut self,
        spec: NodeSpec,
        parent: Option<NodeKey>,
        index: usize,
        source: &NodeSource,
    ) -> NodeKey {
        let key = NodeKey(self.next_key);
        self.next_key += 1;

        let NodeSpec {
            id,
            label,
            kind,
            tier,
            enabled,
            checked,
            shortcut,
            tooltip,
            category,
            plugin_anchor,
            children,
            handler,
        } = spec;

        if let Some(id) = &id {
            self.index.insert(id.clone(), key);
        }
        self.nodes.insert(
            key,
            TreeNode {
                key,
                id,
                label,
                kind,
                tier,
                source: source.clone(),
                enabled,
                checked: checked && kind == NodeKind::Checkable,
                shortcut,
                tooltip,
                category,
                plugin_anchor,
                handler,
                parent,
                children: Vec::with_capacity(children.len()),
            },
        );

        let siblings = match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent_node) => &mut parent_node.children,
            None => &mut self.roots,
        };
        let index = index.min(siblings.len());
        siblings.insert(index, key);

        for (i, child) in children.into_iter().enumerate() {
            self.insert_subtree(child, Some(key), i, source);
        }
        key
    }

    /// Detach `key` from its parent and drop it with all descendants.
    ///
    /// Removing the checked member of a radio group checks the first
    /// remaining member. Returns the number of nodes removed.
    pub(crate) fn remove_subtree(&mut self, key: NodeKey) -> usize {
        let Some((parent, was_selected)) = self
            .nodes
            .get(&key)
            .map(|n| (n.parent, n.checked && self.in_radio_group(key)))
        else {
            return 0;
        };
        let siblings = match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent_node) => &mut parent_node.children,
            None => &mut self.roots,
        };
        siblings.retain(|k| *k != key);

        let mut removed = 0;
        let mut stack = vec![key];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                if let Some(id) = &node.id {
                    self.index.remove(id);
                }
                stack.extend(node.children);
                removed += 1;
            }
        }

        if was_selected
            && let Some(first) = parent
                .and_then(|p| self.nodes.get(&p))
                .and_then(|p| p.children.first().copied())
        {
            self.select_radio(first);
        }
        removed
    }

    /// Topmost nodes contributed by `plugin`: those whose parent is not
    /// itself from the same plugin.
    pub(crate) fn plugin_roots(&self, plugin: &PluginId) -> Vec<NodeKey> {
        self.walk()
            .filter(|node| node.source.is_from(plugin))
            .filter(|node| {
                node.parent
                    .and_then(|p| self.nodes.get(&p))
                    .is_none_or(|parent| !parent.source.is_from(plugin))
            })
            .map(|node| node.key)
            .collect()
    }

    pub(crate) fn set_enabled(&mut self, key: NodeKey, enabled: bool) -> bool {
        match self.nodes.get_mut(&key) {
            Some(node) if node.enabled != enabled => {
                node.enabled = enabled;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_handler(&mut self, key: NodeKey, handler: Option<ActionHandler>) {
        if let Some(node) = self.nodes.get_mut(&key) {
            node.handler = handler;
        }
    }

    /// Whether `key` is a member of a radio group.
    pub(crate) fn in_radio_group(&self, key: NodeKey) -> bool {
        self.nodes
            .get(&key)
            .and_then(|n| n.parent)
            .and_then(|p| self.nodes.get(&p))
            .is_some_and(|p| p.kind == NodeKind::RadioGroup)
    }

    /// Check every member of `key`'s radio group off and `key` on.
    pub(crate) fn select_radio(&mut self, key: NodeKey) {
        let Some(parent) = self.nodes.get(&key).and_then(|n| n.parent) else {
            return;
        };
        let siblings = self
            .nodes
            .get(&parent)
            .map(|p| p.children.clone())
            .unwrap_or_default();
        for sibling in siblings {
            if let Some(node) = self.nodes.get_mut(&sibling) {
                node.checked = sibling == key;
            }
        }
    }

    pub(crate) fn set_checked(&mut self, key: NodeKey, checked: bool) -> bool {
        match self.nodes.get_mut(&key) {
            Some(node) if node.checked != checked => {
                node.checked = checked;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn file_tree() -> MenuTree {
        let definition = MenuDefinition::new(vec![
            NodeSpec::submenu(
                "file",
                "FILE",
                [
                    NodeSpec::action("file.new_book", "New Book"),
                    NodeSpec::action("file.open_book", "Open Book"),
                    NodeSpec::anchor("file.plugins"),
                    NodeSpec::action("file.close_book", "Close Book"),
                ],
            )
            .with_plugin_anchor("file.plugins"),
        ]);
        MenuTree::from_definition(&definition).unwrap()
    }

    fn child_ids(tree: &MenuTree, id: &str) -> Vec<String> {
        tree.get(id)
            .unwrap()
            .children()
            .iter()
            .map(|k| tree.node(*k).unwrap().id().unwrap_or("-").to_string())
            .collect()
    }

    fn plugin(name: &str) -> NodeSource {
        NodeSource::Plugin(PluginId::new(name))
    }

    #[test]
    fn keys_follow_declaration_order() {
        let tree = file_tree();
        let seqs: Vec<u64> = tree.walk().map(TreeNode::seq).collect();
        let mut sorted = seqs.clone();
        sorted.sort_unstable();
        assert_eq!(seqs, sorted);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn insertion_follows_plugin_region() {
        let mut tree = file_tree();
        let file = tree.key_of("file").unwrap();

        let index = tree.insertion_index(file, None).unwrap();
        assert_eq!(index, 3);
        tree.insert_subtree(NodeSpec::action("a", "A"), Some(file), index, &plugin("p"));

        let index = tree.insertion_index(file, None).unwrap();
        assert_eq!(index, 4);
        tree.insert_subtree(NodeSpec::action("b", "B"), Some(file), index, &plugin("q"));

        assert_eq!(
            child_ids(&tree, "file"),
            ["file.new_book", "file.open_book", "file.plugins", "a", "b", "file.close_book"]
        );
    }

    #[test]
    fn explicit_anchor_skips_existing_plugin_run() {
        let mut tree = file_tree();
        let file = tree.key_of("file").unwrap();

        let index = tree.insertion_index(file, Some("file.new_book")).unwrap();
        assert_eq!(index, 1);
        tree.insert_subtree(NodeSpec::action("a", "A"), Some(file), index, &plugin("p"));

        let index = tree.insertion_index(file, Some("file.new_book")).unwrap();
        assert_eq!(index, 2);
    }

    #[test]
    fn unknown_anchor_is_not_found() {
        let tree = file_tree();
        let file = tree.key_of("file").unwrap();
        let err = tree.insertion_index(file, Some("edit.undo")).unwrap_err();
        assert!(matches!(err, MenuError::NotFound { .. }));
    }

    #[test]
    fn remove_subtree_clears_index() {
        let mut tree = file_tree();
        let file = tree.key_of("file").unwrap();
        let index = tree.insertion_index(file, None).unwrap();
        let key = tree.insert_subtree(
            NodeSpec::submenu("p.menu", "P", [NodeSpec::action("p.one", "One")]),
            Some(file),
            index,
            &plugin("p"),
        );

        assert_eq!(tree.remove_subtree(key), 2);
        assert!(!tree.contains("p.menu"));
        assert!(!tree.contains("p.one"));
        assert_eq!(tree.remove_subtree(key), 0);
        assert_eq!(child_ids(&tree, "file").len(), 4);
    }

    #[test]
    fn plugin_roots_skip_nested_nodes() {
        let mut tree = file_tree();
        let file = tree.key_of("file").unwrap();
        let index = tree.insertion_index(file, None).unwrap();
        let menu = tree.insert_subtree(
            NodeSpec::submenu("p.menu", "P", [NodeSpec::action("p.one", "One")]),
            Some(file),
            index,
            &plugin("p"),
        );

        assert_eq!(tree.plugin_roots(&PluginId::new("p")), vec![menu]);
        assert!(tree.plugin_roots(&PluginId::new("other")).is_empty());
    }

    #[test]
    fn check_insertable_rejects_collisions() {
        let tree = file_tree();
        let err = tree
            .check_insertable(&NodeSpec::action("file.close_book", "Close"))
            .unwrap_err();
        assert_eq!(err, MenuError::duplicate("file.close_book"));

        let err = tree
            .check_insertable(&NodeSpec::submenu(
                "p.menu",
                "P",
                [NodeSpec::action("p.x", "X"), NodeSpec::action("p.x", "X again")],
            ))
            .unwrap_err();
        assert_eq!(err, MenuError::duplicate("p.x"));
    }
}
