//! Menu registry - owns the canonical menu tree and serializes its mutation.
//!
//! Readers (the render path) take the lock only long enough to clone an
//! `Arc` of the current tree and then work on that immutable snapshot.
//! Writers (plugin load/unload hooks, renderer state updates) hold the write
//! lock for the whole operation, validate before touching anything, and
//! mutate through `Arc::make_mut`, so a snapshot held by a reader is never
//! changed underneath it.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::command::{ActionHandler, ExecutionOutcome};
use crate::definition::MenuDefinition;
use crate::error::{MenuError, MenuResult};
use crate::plugin::{PluginId, PluginMenus};

use super::node::{MenuNode, NodeKind, NodeSource, NodeSpec, Tier};
use super::tree::{MenuTree, TreeNode};
use super::visible::VisibleMenu;

/// Thread-safe registry of Core and plugin menu nodes.
///
/// Share it between the renderer and the plugin loader with an `Arc`.
#[derive(Debug, Default)]
pub struct MenuRegistry {
    /// Uses `parking_lot::RwLock` rather than `std::sync::RwLock`: a panic
    /// inside a plugin hook must not poison the menu for every renderer.
    tree: RwLock<Arc<MenuTree>>,
}

impl MenuRegistry {
    /// Create an empty registry. Call [`initialize`](Self::initialize) before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry already initialized from `definition`.
    pub fn from_definition(definition: &MenuDefinition) -> MenuResult<Self> {
        let registry = Self::new();
        registry.initialize(definition)?;
        Ok(registry)
    }

    /// Build the Core tree from a static definition.
    ///
    /// Calling this again discards every plugin node and resets runtime state
    /// to what the definition declares. On error the current tree is kept.
    pub fn initialize(&self, definition: &MenuDefinition) -> MenuResult<()> {
        let mut tree = MenuTree::from_definition(definition)?;

        let mut guard = self.tree.write();
        tree.set_generation(guard.generation() + 1);
        let nodes = tree.len();
        *guard = Arc::new(tree);

        info!(
            version = definition.version,
            nodes,
            menus = definition.menus.len(),
            "menu registry initialized"
        );
        Ok(())
    }

    /// Drop every node, Core included.
    pub fn teardown(&self) {
        let mut guard = self.tree.write();
        let mut empty = MenuTree::default();
        empty.set_generation(guard.generation() + 1);
        *guard = Arc::new(empty);
        info!("menu registry torn down");
    }

    /// Current immutable tree.
    pub fn snapshot(&self) -> Arc<MenuTree> {
        Arc::clone(&self.tree.read())
    }

    pub fn generation(&self) -> u64 {
        self.tree.read().generation()
    }

    /// Number of stored nodes, separators included.
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tree.read().contains(id)
    }

    /// Owned copy of a node and its subtree.
    pub fn find(&self, id: &str) -> MenuResult<MenuNode> {
        let tree = self.snapshot();
        tree.key_of(id)
            .and_then(|key| tree.to_menu_node(key))
            .ok_or_else(|| MenuError::not_found(id))
    }

    /// Visible nodes for an entitlement tier, over the current snapshot.
    pub fn resolve_visible(&self, tier: Tier) -> VisibleMenu {
        VisibleMenu::new(self.snapshot(), tier)
    }

    /// Plugin-scoped handle; every node it registers is owned by `plugin`.
    pub fn plugin(&self, plugin: impl Into<PluginId>) -> PluginMenus<'_> {
        PluginMenus::new(self, plugin.into())
    }

    /// Insert `node` (and its subtree) under `parent_id` on behalf of `plugin`.
    ///
    /// With `anchor`, the node goes right after that sibling (past any plugin
    /// nodes already there); otherwise at the end of the parent's plugin
    /// region. A checked member added to a radio group becomes its selection.
    /// The tree is untouched on error.
    pub fn register_node(
        &self,
        plugin: &PluginId,
        parent_id: &str,
        node: NodeSpec,
        anchor: Option<&str>,
    ) -> MenuResult<()> {
        let node_id = node.display_id().to_string();
        let mut guard = self.tree.write();

        let planned = guard.container_key(parent_id).and_then(|parent| {
            guard.check_insertable(&node)?;
            guard.check_placement(parent, &node)?;
            let index = guard.insertion_index(parent, anchor)?;
            Ok((parent, index))
        });
        let (parent, index) = match planned {
            Ok(plan) => plan,
            Err(err) => {
                err.log_rejection(plugin);
                return Err(err);
            }
        };

        let select = node.checked && node.kind == NodeKind::Checkable;
        let tree = Arc::make_mut(&mut guard);
        let key = tree.insert_subtree(node, Some(parent), index, &NodeSource::Plugin(plugin.clone()));
        if select && tree.in_radio_group(key) {
            tree.select_radio(key);
        }
        tree.bump();

        debug!(plugin = %plugin, node = %node_id, parent = %parent_id, index, "menu node registered");
        Ok(())
    }

    /// Remove a plugin node and its subtree.
    ///
    /// Returns `Ok(false)` when the id is unknown, so teardown racing with
    /// another unload is harmless. Core nodes are refused.
    pub fn unregister_node(&self, id: &str) -> MenuResult<bool> {
        let mut guard = self.tree.write();
        let Some(node) = guard.get(id) else {
            debug!(node = %id, "unregister of unknown menu node ignored");
            return Ok(false);
        };
        if node.source().is_core() {
            return Err(MenuError::ProtectedNode { id: id.to_string() });
        }
        let key = node.key();

        let tree = Arc::make_mut(&mut guard);
        let removed = tree.remove_subtree(key);
        tree.bump();

        debug!(node = %id, removed, "menu node unregistered");
        Ok(true)
    }

    /// Remove every node contributed by `plugin`.
    ///
    /// Returns the number of nodes removed, descendants included.
    pub fn unregister_all_from(&self, plugin: &PluginId) -> usize {
        let mut guard = self.tree.write();
        let roots = guard.plugin_roots(plugin);
        if roots.is_empty() {
            return 0;
        }

        let tree = Arc::make_mut(&mut guard);
        let removed: usize = roots.into_iter().map(|key| tree.remove_subtree(key)).sum();
        tree.bump();

        info!(plugin = %plugin, removed, "plugin menu nodes unregistered");
        removed
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) -> MenuResult<()> {
        let mut guard = self.tree.write();
        let key = guard.key_of(id).ok_or_else(|| MenuError::not_found(id))?;
        if guard.node(key).is_some_and(|n| n.enabled() == enabled) {
            return Ok(());
        }

        let tree = Arc::make_mut(&mut guard);
        tree.set_enabled(key, enabled);
        tree.bump();
        Ok(())
    }

    /// Set the check mark of a checkable node.
    ///
    /// Checking a radio group member unchecks its siblings in the same write.
    /// Unchecking a radio group member is ignored: a group is switched by
    /// checking another member, never emptied.
    pub fn set_checked(&self, id: &str, checked: bool) -> MenuResult<()> {
        let mut guard = self.tree.write();
        let node = guard.get(id).ok_or_else(|| MenuError::not_found(id))?;
        if node.kind() != NodeKind::Checkable {
            return Err(MenuError::invalid(
                id,
                format!("{} nodes cannot be checked", node.kind().as_str()),
            ));
        }
        let key = node.key();

        if guard.in_radio_group(key) {
            if !checked {
                debug!(node = %id, "uncheck of radio group member ignored");
                return Ok(());
            }
            let tree = Arc::make_mut(&mut guard);
            tree.select_radio(key);
            tree.bump();
            return Ok(());
        }

        if node.checked() != checked {
            let tree = Arc::make_mut(&mut guard);
            tree.set_checked(key, checked);
            tree.bump();
        }
        Ok(())
    }

    /// Bind (or with `None`, clear) the invocation handler of an actionable node.
    pub fn set_handler(&self, id: &str, handler: Option<ActionHandler>) -> MenuResult<()> {
        let mut guard = self.tree.write();
        let node = guard.get(id).ok_or_else(|| MenuError::not_found(id))?;
        if !node.kind().is_actionable() {
            return Err(MenuError::invalid(
                id,
                format!("{} nodes cannot carry a handler", node.kind().as_str()),
            ));
        }
        let key = node.key();

        let tree = Arc::make_mut(&mut guard);
        tree.set_handler(key, handler);
        tree.bump();
        Ok(())
    }

    /// Invoke the handler bound to `id`.
    ///
    /// The handler is cloned out of the snapshot and runs without any lock
    /// held, so it may itself call back into the registry.
    pub fn execute(&self, id: &str) -> ExecutionOutcome {
        let tree = self.snapshot();
        let Some(node) = tree.get(id) else {
            return ExecutionOutcome::NotFound;
        };
        let Some(handler) = node.handler().cloned() else {
            return ExecutionOutcome::NoHandler;
        };
        if !node.enabled() {
            return ExecutionOutcome::Disabled;
        }
        drop(tree);

        match handler.invoke() {
            Ok(()) => ExecutionOutcome::Success,
            Err(e) => {
                warn!(node = %id, error = %e, "menu command failed");
                ExecutionOutcome::Failed(e.to_string())
            }
        }
    }

    /// Shortcut text and node id of every node that declares a shortcut, in
    /// tree order.
    pub fn shortcut_bindings(&self) -> Vec<(String, String)> {
        let tree = self.snapshot();
        tree.walk()
            .filter_map(|node| Some((node.shortcut()?.to_string(), node.id()?.to_string())))
            .collect()
    }

    /// Distinct command categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        let tree = self.snapshot();
        let categories: BTreeSet<&str> = tree.walk().filter_map(TreeNode::category).collect();
        categories.into_iter().map(str::to_string).collect()
    }

    /// Actionable nodes in `category`, in tree order.
    pub fn commands_in_category(&self, category: &str) -> Vec<MenuNode> {
        let tree = self.snapshot();
        tree.walk()
            .filter(|node| node.kind().is_actionable() && node.category() == Some(category))
            .filter_map(|node| tree.to_menu_node(node.key()))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn registry() -> MenuRegistry {
        let definition = MenuDefinition::new(vec![
            NodeSpec::submenu(
                "file",
                "FILE",
                [
                    NodeSpec::action("file.new_book", "New Book").with_shortcut("Ctrl+N"),
                    NodeSpec::action("file.open_book", "Open Book"),
                    NodeSpec::anchor("file.plugins"),
                    NodeSpec::action("file.close_book", "Close Book"),
                ],
            )
            .with_plugin_anchor("file.plugins"),
            NodeSpec::submenu(
                "view",
                "VIEW",
                [NodeSpec::radio_group(
                    "view.mode",
                    "Mode",
                    [
                        NodeSpec::checkable("view.mode.draft", "Draft").checked(),
                        NodeSpec::checkable("view.mode.page", "Page"),
                        NodeSpec::checkable("view.mode.outline", "Outline"),
                    ],
                )],
            ),
        ]);
        MenuRegistry::from_definition(&definition).unwrap()
    }

    fn checked_modes(registry: &MenuRegistry) -> Vec<String> {
        registry
            .find("view.mode")
            .unwrap()
            .children
            .into_iter()
            .filter(|c| c.checked)
            .filter_map(|c| c.id)
            .collect()
    }

    #[test]
    fn initialize_twice_discards_plugin_nodes() {
        let registry = registry();
        let plugin = PluginId::new("epub");
        registry
            .register_node(&plugin, "file", NodeSpec::action("epub.export", "EPUB"), None)
            .unwrap();
        assert!(registry.contains("epub.export"));

        let before = registry.generation();
        registry
            .initialize(&MenuDefinition::new(vec![NodeSpec::submenu(
                "help",
                "HELP",
                [NodeSpec::action("help.about", "About")],
            )]))
            .unwrap();
        assert!(!registry.contains("epub.export"));
        assert!(!registry.contains("file"));
        assert!(registry.generation() > before);
    }

    #[test]
    fn failed_initialize_keeps_previous_tree() {
        let registry = registry();
        let bad = MenuDefinition::new(vec![
            NodeSpec::action("dup", "One"),
            NodeSpec::action("dup", "Two"),
        ]);
        assert!(matches!(
            registry.initialize(&bad),
            Err(MenuError::Definition(_))
        ));
        assert!(registry.contains("file"));
    }

    #[test]
    fn register_into_leaf_is_not_found() {
        let registry = registry();
        let err = registry
            .register_node(
                &PluginId::new("p"),
                "file.new_book",
                NodeSpec::action("p.x", "X"),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, MenuError::NotFound { .. }));
        assert!(!registry.contains("p.x"));
    }

    #[test]
    fn radio_selection_is_exclusive() {
        let registry = registry();
        assert_eq!(checked_modes(&registry), ["view.mode.draft"]);

        registry.set_checked("view.mode.outline", true).unwrap();
        assert_eq!(checked_modes(&registry), ["view.mode.outline"]);

        registry.set_checked("view.mode.outline", false).unwrap();
        assert_eq!(checked_modes(&registry), ["view.mode.outline"]);
    }

    #[test]
    fn checked_plugin_member_takes_radio_selection() {
        let registry = registry();
        registry
            .register_node(
                &PluginId::new("layout"),
                "view.mode",
                NodeSpec::checkable("layout.mode.split", "Split").checked(),
                None,
            )
            .unwrap();
        assert_eq!(checked_modes(&registry), ["layout.mode.split"]);
    }

    #[test]
    fn radio_group_rejects_non_checkable_member() {
        let registry = registry();
        let before = registry.generation();
        let err = registry
            .register_node(
                &PluginId::new("layout"),
                "view.mode",
                NodeSpec::action("layout.mode.reset", "Reset"),
                None,
            )
            .unwrap_err();

        assert!(matches!(err, MenuError::InvalidNode { .. }));
        assert!(!registry.contains("layout.mode.reset"));
        assert_eq!(registry.generation(), before);
    }

    #[test]
    fn set_checked_on_action_is_invalid() {
        let registry = registry();
        let err = registry.set_checked("file.new_book", true).unwrap_err();
        assert!(matches!(err, MenuError::InvalidNode { .. }));
    }

    #[test]
    fn snapshots_are_isolated_from_writes() {
        let registry = registry();
        let snapshot = registry.snapshot();
        registry.set_enabled("file.open_book", false).unwrap();

        assert!(snapshot.get("file.open_book").unwrap().enabled());
        assert!(!registry.find("file.open_book").unwrap().enabled);
        assert!(registry.generation() > snapshot.generation());
    }

    #[test]
    fn unchanged_enabled_state_does_not_bump_generation() {
        let registry = registry();
        let before = registry.generation();
        registry.set_enabled("file.open_book", true).unwrap();
        assert_eq!(registry.generation(), before);
    }

    #[test]
    fn shortcut_bindings_follow_tree_order() {
        let registry = registry();
        assert_eq!(
            registry.shortcut_bindings(),
            vec![("Ctrl+N".to_string(), "file.new_book".to_string())]
        );
    }

    #[test]
    fn commands_group_by_category() {
        let registry = registry();
        registry
            .register_node(
                &PluginId::new("epub"),
                "file",
                NodeSpec::action("epub.export", "Export to EPUB")
                    .with_category("file")
                    .with_tooltip("Write the book as an EPUB file"),
                None,
            )
            .unwrap();
        registry
            .register_node(
                &PluginId::new("epub"),
                "file",
                NodeSpec::action("epub.check", "Check EPUB").with_category("tools"),
                None,
            )
            .unwrap();

        assert_eq!(registry.categories(), ["file", "tools"]);
        let file: Vec<_> = registry
            .commands_in_category("file")
            .into_iter()
            .filter_map(|n| n.id)
            .collect();
        assert_eq!(file, ["epub.export"]);
        assert_eq!(
            registry.find("epub.export").unwrap().tooltip.as_deref(),
            Some("Write the book as an EPUB file")
        );
        assert!(registry.commands_in_category("format").is_empty());
    }

    #[test]
    fn teardown_empties_registry() {
        let registry = registry();
        registry.teardown();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.find("file"),
            Err(MenuError::NotFound { .. })
        ));
    }
}
