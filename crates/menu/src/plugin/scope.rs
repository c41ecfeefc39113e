//! Plugin-scoped access to the registry.

use tracing::{debug, warn};

use crate::error::{MenuError, MenuResult};
use crate::menu::{MenuRegistry, NodeSpec};

use super::{PluginContribution, PluginId};

/// Registry handle bound to one plugin.
///
/// Everything registered through it is stamped with the plugin's id, and
/// [`unregister_all`](Self::unregister_all) removes exactly that set.
#[derive(Debug, Clone)]
pub struct PluginMenus<'a> {
    registry: &'a MenuRegistry,
    plugin: PluginId,
}

impl<'a> PluginMenus<'a> {
    pub(crate) fn new(registry: &'a MenuRegistry, plugin: PluginId) -> Self {
        Self { registry, plugin }
    }

    pub fn plugin_id(&self) -> &PluginId {
        &self.plugin
    }

    /// Append to the plugin region of `parent_id`.
    pub fn register(&self, parent_id: &str, node: NodeSpec) -> MenuResult<()> {
        self.registry
            .register_node(&self.plugin, parent_id, node, None)
    }

    /// Insert right after `anchor` under `parent_id`.
    pub fn register_after(&self, parent_id: &str, anchor: &str, node: NodeSpec) -> MenuResult<()> {
        self.registry
            .register_node(&self.plugin, parent_id, node, Some(anchor))
    }

    pub fn unregister(&self, id: &str) -> MenuResult<bool> {
        self.registry.unregister_node(id)
    }

    pub fn unregister_all(&self) -> usize {
        self.registry.unregister_all_from(&self.plugin)
    }

    /// Register a batch of contributions in order.
    ///
    /// A rejected contribution does not stop the rest; its error is returned
    /// so the host can decide whether to tell the user.
    pub fn apply(&self, contributions: Vec<PluginContribution>) -> Vec<MenuError> {
        let total = contributions.len();
        let failures: Vec<MenuError> = contributions
            .into_iter()
            .filter_map(|c| {
                self.registry
                    .register_node(&self.plugin, &c.parent, c.node, c.anchor.as_deref())
                    .err()
            })
            .collect();

        debug!(
            plugin = %self.plugin,
            applied = total - failures.len(),
            rejected = failures.len(),
            "plugin menu contributions applied"
        );
        failures
    }

    /// Parse a JSON array of contributions and [`apply`](Self::apply) it.
    ///
    /// Malformed JSON registers nothing.
    pub fn apply_json(&self, json: &str) -> serde_json::Result<Vec<MenuError>> {
        let contributions = PluginContribution::parse_list(json).inspect_err(|e| {
            warn!(plugin = %self.plugin, error = %e, "failed to parse plugin menu contributions");
        })?;
        Ok(self.apply(contributions))
    }
}
