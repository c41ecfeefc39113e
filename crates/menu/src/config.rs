//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use crate::definition::MenuDefinition;
use crate::menu::Tier;
use crate::shortcut::ShortcutMap;

/// Host configuration for the menu registry.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Menu definition file. When None, the bundled Kalahari menu is used.
    pub definition_path: Option<PathBuf>,

    /// Entitlement tier to resolve menus for (default: standard).
    pub tier: Tier,

    /// JSON file with user shortcut overrides.
    pub shortcuts_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let definition_path = lookup("KALAHARI_MENU_DEFINITION")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let tier = match lookup("KALAHARI_MENU_TIER") {
            Some(value) => value
                .parse::<Tier>()
                .map_err(|e| anyhow!(e))
                .context("KALAHARI_MENU_TIER must be 'standard' or 'premium'")?,
            None => Tier::Standard,
        };

        let shortcuts_path = lookup("KALAHARI_SHORTCUTS_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            definition_path,
            tier,
            shortcuts_path,
        })
    }

    /// Load the configured definition, or the bundled one.
    pub fn load_definition(&self) -> Result<MenuDefinition> {
        match &self.definition_path {
            Some(path) => MenuDefinition::from_path(path),
            None => MenuDefinition::kalahari().context("bundled menu definition is invalid"),
        }
    }

    /// Load user shortcut overrides, if configured and present on disk.
    pub fn load_shortcut_overrides(&self) -> Result<Option<ShortcutMap>> {
        match &self.shortcuts_path {
            Some(path) if path.exists() => ShortcutMap::load(path).map(Some),
            _ => Ok(None),
        }
    }
}
