//! Static Core menu definitions.
//!
//! A definition is a versioned list of top-level [`NodeSpec`]s, read from
//! TOML (the packaged format) or JSON. The Kalahari menu bar ships as a
//! bundled TOML resource, see [`MenuDefinition::kalahari`].

mod validate;

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;
use crate::menu::NodeSpec;

pub(crate) use validate::validate_nodes;

/// Schema version understood by this build.
pub const DEFINITION_VERSION: u32 = 1;

const KALAHARI_MENU: &str = include_str!("../../resources/kalahari_menu.toml");

fn default_version() -> u32 {
    DEFINITION_VERSION
}

/// A parsed static menu definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuDefinition {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Top-level menus in display order.
    #[serde(default)]
    pub menus: Vec<NodeSpec>,
}

impl MenuDefinition {
    pub fn new(menus: Vec<NodeSpec>) -> Self {
        Self {
            version: DEFINITION_VERSION,
            menus,
        }
    }

    /// The built-in Kalahari menu bar: FILE, EDIT, INSERT, FORMAT, TOOLS,
    /// ASSISTANT, VIEW and HELP.
    pub fn kalahari() -> Result<Self, DefinitionError> {
        Self::from_toml_str(KALAHARI_MENU)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, DefinitionError> {
        toml::from_str(content).map_err(|e| DefinitionError::Parse {
            format: "TOML",
            details: e.to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, DefinitionError> {
        serde_json::from_str(content).map_err(|e| DefinitionError::Parse {
            format: "JSON",
            details: e.to_string(),
        })
    }

    /// Read a definition file; `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read menu definition: {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let definition = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };
        definition.with_context(|| format!("invalid menu definition at {}", path.display()))
    }

    /// Check every structural invariant without building a tree.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.version != DEFINITION_VERSION {
            return Err(DefinitionError::UnsupportedVersion {
                found: self.version,
                expected: DEFINITION_VERSION,
            });
        }
        validate_nodes(&self.menus, &mut HashSet::new())
    }

    /// Total number of nodes declared, separators included.
    pub fn node_count(&self) -> usize {
        self.menus.iter().map(NodeSpec::subtree_len).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::menu::{NodeKind, Tier};

    #[test]
    fn bundled_definition_is_valid() {
        let definition = MenuDefinition::kalahari().unwrap();
        definition.validate().unwrap();

        let labels: Vec<&str> = definition.menus.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(
            labels,
            ["FILE", "EDIT", "INSERT", "FORMAT", "TOOLS", "ASSISTANT", "VIEW", "HELP"]
        );
        assert!(definition.menus.iter().all(|m| m.kind == NodeKind::Submenu));
    }

    #[test]
    fn bundled_definition_gates_premium_assistants() {
        let definition = MenuDefinition::kalahari().unwrap();
        let assistant = definition
            .menus
            .iter()
            .find(|m| m.id.as_deref() == Some("assistant"))
            .unwrap();

        fn any_premium(spec: &NodeSpec) -> bool {
            spec.tier == Tier::Premium || spec.children.iter().any(any_premium)
        }
        assert!(any_premium(assistant));
    }

    #[test]
    fn toml_definition_parses() {
        let toml = r#"
            version = 1

            [[menus]]
            id = "file"
            label = "FILE"
            kind = "submenu"
            plugin_anchor = "file.plugins"

            [[menus.children]]
            id = "file.new_book"
            label = "New Book..."
            shortcut = "Ctrl+N"

            [[menus.children]]
            id = "file.plugins"
            kind = "separator"
        "#;

        let definition = MenuDefinition::from_toml_str(toml).unwrap();
        definition.validate().unwrap();
        assert_eq!(definition.node_count(), 3);
        assert_eq!(
            definition.menus[0].children[0].shortcut.as_deref(),
            Some("Ctrl+N")
        );
    }

    #[test]
    fn json_definition_parses() {
        let json = r#"{"menus": [{"id": "help", "label": "HELP", "kind": "submenu",
            "children": [{"id": "help.about", "label": "About Kalahari"}]}]}"#;
        let definition = MenuDefinition::from_json_str(json).unwrap();
        assert_eq!(definition.version, DEFINITION_VERSION);
        assert_eq!(definition.node_count(), 2);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut definition = MenuDefinition::new(vec![]);
        definition.version = 7;
        assert_eq!(
            definition.validate().unwrap_err(),
            DefinitionError::UnsupportedVersion {
                found: 7,
                expected: DEFINITION_VERSION
            }
        );
    }

    #[test]
    fn parse_errors_name_the_format() {
        let err = MenuDefinition::from_toml_str("menus = 3").unwrap_err();
        assert!(matches!(err, DefinitionError::Parse { format: "TOML", .. }));
    }
}
