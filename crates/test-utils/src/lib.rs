//! Kalahari menu test utilities.
//!
//! Helpers for integration testing: fixture definitions, handler builders,
//! and assertion utilities for menu tree testing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kalahari_menu::{
    ActionHandler, MenuDefinition, MenuNode, MenuRegistry, NodeSpec, Tier, VisibleMenu,
};

/// Build a registry from `definition`, panicking with the error on failure.
pub fn registry_from(definition: &MenuDefinition) -> MenuRegistry {
    MenuRegistry::from_definition(definition)
        .unwrap_or_else(|e| panic!("fixture definition rejected: {e}"))
}

/// Registry initialized with the bundled Kalahari menu bar.
pub fn kalahari_registry() -> MenuRegistry {
    let definition = MenuDefinition::kalahari()
        .unwrap_or_else(|e| panic!("bundled definition rejected: {e}"));
    registry_from(&definition)
}

/// A handler that counts its invocations.
pub fn counting_handler() -> (ActionHandler, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let handler = ActionHandler::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (handler, calls)
}

/// A handler that always fails with `message`.
pub fn failing_handler(message: &'static str) -> ActionHandler {
    ActionHandler::new(move || Err(anyhow::anyhow!(message)))
}

/// Fixture menu definitions.
pub mod fixtures {
    use super::*;

    /// FILE holding [New Book, Open Book, Separator, Close Book]; the
    /// separator (`file.plugins`) is the plugin anchor.
    pub fn file_menu() -> MenuDefinition {
        MenuDefinition::new(vec![
            NodeSpec::submenu(
                "file",
                "FILE",
                [
                    NodeSpec::action("file.new_book", "New Book").with_shortcut("Ctrl+N"),
                    NodeSpec::action("file.open_book", "Open Book").with_shortcut("Ctrl+O"),
                    NodeSpec::anchor("file.plugins"),
                    NodeSpec::action("file.close_book", "Close Book"),
                ],
            )
            .with_plugin_anchor("file.plugins"),
        ])
    }

    /// TOOLS with a Plugins submenu whose plugin region starts after
    /// `tools.plugins.commands`, plus a Focus Mode radio group.
    pub fn tools_menu() -> MenuDefinition {
        MenuDefinition::new(vec![NodeSpec::submenu(
            "tools",
            "TOOLS",
            [
                NodeSpec::checkable("tools.spellchecker", "Spellchecker").checked(),
                NodeSpec::separator(),
                NodeSpec::submenu(
                    "tools.plugins",
                    "Plugins",
                    [
                        NodeSpec::action("tools.plugins.manager", "Plugin Manager..."),
                        NodeSpec::anchor("tools.plugins.commands"),
                    ],
                )
                .with_plugin_anchor("tools.plugins.commands"),
                NodeSpec::separator(),
                NodeSpec::radio_group(
                    "tools.focus",
                    "Focus Mode",
                    [
                        NodeSpec::checkable("tools.focus.normal", "Normal").checked(),
                        NodeSpec::checkable("tools.focus.focused", "Focused"),
                        NodeSpec::checkable("tools.focus.distraction_free", "Distraction-Free"),
                    ],
                ),
            ],
        )])
    }

    /// ASSISTANT with a submenu that only holds Premium entries.
    pub fn assistant_menu() -> MenuDefinition {
        MenuDefinition::new(vec![NodeSpec::submenu(
            "assistant",
            "ASSISTANT",
            [
                NodeSpec::action("assistant.ask", "Ask Assistant..."),
                NodeSpec::separator(),
                NodeSpec::submenu(
                    "assistant.premium",
                    "Premium Assistants",
                    [
                        NodeSpec::action("assistant.premium.mentor", "Story Mentor").premium(),
                        NodeSpec::anchor("assistant.premium.plugins"),
                    ],
                )
                .with_plugin_anchor("assistant.premium.plugins"),
                NodeSpec::separator(),
                NodeSpec::action("assistant.settings", "Assistant Settings..."),
            ],
        )])
    }

    /// All three fixture menus in one definition.
    pub fn combined() -> MenuDefinition {
        let menus = [file_menu(), tools_menu(), assistant_menu()]
            .into_iter()
            .flat_map(|d| d.menus)
            .collect();
        MenuDefinition::new(menus)
    }
}

/// Assertion helpers for menu trees.
pub mod assert {
    use super::*;

    /// Ids of a node's direct children, with "-" for anonymous separators.
    pub fn child_ids(registry: &MenuRegistry, id: &str) -> Vec<String> {
        let node = registry
            .find(id)
            .unwrap_or_else(|e| panic!("expected node '{id}': {e}"));
        ids_of(&node.children)
    }

    pub fn ids_of(nodes: &[MenuNode]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| n.id.clone().unwrap_or_else(|| "-".to_string()))
            .collect()
    }

    /// Ids of every visible node, depth-first, skipping anonymous separators.
    pub fn visible_ids(menu: &VisibleMenu) -> Vec<String> {
        menu.iter()
            .filter_map(|e| e.node.id().map(str::to_string))
            .collect()
    }

    /// Every id reachable from the top level.
    pub fn all_ids(registry: &MenuRegistry) -> Vec<String> {
        registry
            .snapshot()
            .walk()
            .filter_map(|n| n.id().map(str::to_string))
            .collect()
    }

    /// Panic if any id appears twice in the tree.
    pub fn no_duplicate_ids(registry: &MenuRegistry) {
        let mut ids = all_ids(registry);
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total, "tree contains duplicate ids");
    }

    /// Panic unless exactly one member of `group` is checked.
    pub fn exactly_one_checked(registry: &MenuRegistry, group: &str) {
        let node = registry
            .find(group)
            .unwrap_or_else(|e| panic!("expected radio group '{group}': {e}"));
        let checked: Vec<_> = node.children.iter().filter(|c| c.checked).collect();
        assert_eq!(
            checked.len(),
            1,
            "radio group '{group}' has {} checked members",
            checked.len()
        );
    }

    /// Panic if a Premium node is visible at `tier`.
    pub fn no_premium_visible(menu: &VisibleMenu) {
        if menu.tier() == Tier::Premium {
            return;
        }
        for entry in menu {
            assert_ne!(
                entry.node.tier(),
                Tier::Premium,
                "premium node '{}' visible at standard tier",
                entry.node.label()
            );
        }
    }
}
