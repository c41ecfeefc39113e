//! CLI command implementations for inspecting menu definitions.
//!
//! These commands build a registry in-process, exactly as a host
//! application would, and print what a renderer would see.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use kalahari_menu::menu::{NodeKind, VisibleEntry};
use kalahari_menu::{Config, MenuDefinition, MenuRegistry, PluginId, ShortcutMap, Tier};

/// Validate a definition file (or the configured/bundled one).
pub fn cmd_validate(config: &Config, path: Option<&Path>) -> Result<()> {
    let definition = match path {
        Some(path) => MenuDefinition::from_path(path)?,
        None => config.load_definition()?,
    };
    definition.validate().context("menu definition failed validation")?;

    println!(
        "Menu definition OK: {} top-level menus, {} nodes.",
        definition.menus.len(),
        definition.node_count()
    );
    Ok(())
}

/// Print the visible menu tree, optionally with plugin contributions applied.
///
/// Each plugin is given as `NAME=FILE`, where FILE holds a JSON array of
/// contributions.
pub fn cmd_show(config: &Config, tier: Option<Tier>, plugins: &[String]) -> Result<()> {
    let registry = MenuRegistry::from_definition(&config.load_definition()?)
        .context("failed to initialize menu registry")?;

    for spec in plugins {
        let (name, file) = parse_plugin_arg(spec)?;
        let json = std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read plugin contributions: {}", file.display()))?;
        let failures = registry
            .plugin(PluginId::new(name))
            .apply_json(&json)
            .with_context(|| format!("invalid plugin contributions in {}", file.display()))?;
        for failure in failures {
            eprintln!("  rejected ({name}): {failure}");
        }
    }

    let tier = tier.unwrap_or(config.tier);
    let visible = registry.resolve_visible(tier);
    println!("Menu for tier '{}':", tier.as_str());
    for entry in &visible {
        println!("{}", render_entry(&entry));
    }
    Ok(())
}

/// Print effective shortcut bindings, with user overrides applied.
pub fn cmd_shortcuts(config: &Config) -> Result<()> {
    let registry = MenuRegistry::from_definition(&config.load_definition()?)
        .context("failed to initialize menu registry")?;

    let (mut map, conflicts) = ShortcutMap::from_registry(&registry);
    if let Some(overrides) = config.load_shortcut_overrides()? {
        map.merge(&overrides);
    }

    println!("{:<20} {:<12} {}", "SHORTCUT", "CATEGORY", "COMMAND");
    println!("{}", "-".repeat(64));
    for (shortcut, id) in map.iter() {
        let category = registry.find(id).ok().and_then(|node| node.category);
        println!(
            "{:<20} {:<12} {}",
            shortcut.to_string(),
            category.as_deref().unwrap_or("-"),
            id
        );
    }

    for conflict in &conflicts {
        eprintln!("conflict: {conflict}");
    }
    Ok(())
}

fn parse_plugin_arg(spec: &str) -> Result<(&str, PathBuf)> {
    let Some((name, file)) = spec.split_once('=') else {
        bail!("plugin argument '{spec}' must be NAME=FILE");
    };
    if name.is_empty() || file.is_empty() {
        bail!("plugin argument '{spec}' must be NAME=FILE");
    }
    Ok((name, PathBuf::from(file)))
}

fn render_entry(entry: &VisibleEntry<'_>) -> String {
    let indent = "  ".repeat(entry.depth + 1);
    let node = entry.node;

    let mut line = match node.kind() {
        NodeKind::Separator => return format!("{indent}---"),
        NodeKind::Checkable if node.checked() => format!("{indent}[x] {}", node.label()),
        NodeKind::Checkable => format!("{indent}[ ] {}", node.label()),
        NodeKind::Submenu | NodeKind::RadioGroup => format!("{indent}{} >", node.label()),
        NodeKind::Action => format!("{indent}{}", node.label()),
    };
    if node.tier() == Tier::Premium {
        line.push_str(" *");
    }
    if !node.enabled() {
        line.push_str(" (disabled)");
    }
    if let Some(plugin) = node.source().plugin() {
        line.push_str(&format!(" [{plugin}]"));
    }
    if let Some(shortcut) = node.shortcut() {
        line = format!("{line:<48} {shortcut}");
    }
    line
}
