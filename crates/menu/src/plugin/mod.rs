//! Plugin-facing surface of the menu registry.
//!
//! Plugins identify themselves with a [`PluginId`] and contribute nodes either
//! one at a time through [`PluginMenus`] or in bulk from a JSON array of
//! [`PluginContribution`] objects.

mod scope;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::menu::NodeSpec;

pub use scope::PluginMenus;

/// Identifier of a loaded plugin (e.g. "org.kalahari.exporter.epub").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(String);

impl PluginId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PluginId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One node a plugin wants inserted, with its target parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginContribution {
    /// Id of the submenu or radio group to insert under.
    pub parent: String,

    /// Existing sibling to insert after; defaults to the parent's plugin region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,

    pub node: NodeSpec,
}

impl PluginContribution {
    pub fn new(parent: impl Into<String>, node: NodeSpec) -> Self {
        Self {
            parent: parent.into(),
            anchor: None,
            node,
        }
    }

    pub fn after(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// Parse a JSON array of contributions.
    pub fn parse_list(json: &str) -> serde_json::Result<Vec<Self>> {
        serde_json::from_str(json)
    }
}
