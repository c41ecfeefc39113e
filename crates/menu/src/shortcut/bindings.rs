//! Shortcut-to-command bindings with conflict detection and JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::command::ExecutionOutcome;
use crate::menu::MenuRegistry;

use super::keys::Shortcut;

/// A shortcut is already bound to a different command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("shortcut {shortcut} is already bound to '{existing}', cannot bind it to '{requested}'")]
pub struct ShortcutConflict {
    pub shortcut: Shortcut,
    pub existing: String,
    pub requested: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct BindingFile {
    shortcuts: Vec<BindingEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BindingEntry {
    shortcut: String,
    command_id: String,
}

/// One command per shortcut.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortcutMap {
    bindings: BTreeMap<Shortcut, String>,
}

impl ShortcutMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the shortcuts declared on registry nodes.
    ///
    /// When two nodes declare the same shortcut the first in tree order keeps
    /// it; the rest are returned as conflicts. Unparseable shortcut text is
    /// logged and skipped.
    pub fn from_registry(registry: &MenuRegistry) -> (Self, Vec<ShortcutConflict>) {
        let mut map = Self::new();
        let mut conflicts = Vec::new();

        for (text, id) in registry.shortcut_bindings() {
            let shortcut = match text.parse::<Shortcut>() {
                Ok(shortcut) => shortcut,
                Err(e) => {
                    warn!(node = %id, error = %e, "ignoring invalid shortcut");
                    continue;
                }
            };
            if let Err(conflict) = map.try_bind(shortcut, &id) {
                warn!(error = %conflict, "shortcut conflict");
                conflicts.push(conflict);
            }
        }
        (map, conflicts)
    }

    /// Bind, replacing any existing binding. Returns the displaced command.
    pub fn bind(&mut self, shortcut: Shortcut, command_id: impl Into<String>) -> Option<String> {
        self.bindings.insert(shortcut, command_id.into())
    }

    /// Bind unless the shortcut already belongs to another command.
    pub fn try_bind(&mut self, shortcut: Shortcut, command_id: &str) -> Result<(), ShortcutConflict> {
        match self.bindings.get(&shortcut) {
            Some(existing) if existing != command_id => Err(ShortcutConflict {
                shortcut,
                existing: existing.clone(),
                requested: command_id.to_string(),
            }),
            _ => {
                self.bindings.insert(shortcut, command_id.to_string());
                Ok(())
            }
        }
    }

    /// Remove a binding; unknown shortcuts are ignored.
    pub fn unbind(&mut self, shortcut: &Shortcut) -> Option<String> {
        self.bindings.remove(shortcut)
    }

    pub fn command_for(&self, shortcut: &Shortcut) -> Option<&str> {
        self.bindings.get(shortcut).map(String::as_str)
    }

    /// Every shortcut bound to `command_id`.
    pub fn shortcuts_for(&self, command_id: &str) -> Vec<Shortcut> {
        self.bindings
            .iter()
            .filter(|(_, id)| id.as_str() == command_id)
            .map(|(shortcut, _)| *shortcut)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Shortcut, &str)> {
        self.bindings.iter().map(|(s, id)| (s, id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Execute the command bound to `shortcut` through `registry`.
    pub fn execute(&self, registry: &MenuRegistry, shortcut: &Shortcut) -> ExecutionOutcome {
        match self.command_for(shortcut) {
            Some(id) => {
                debug!(shortcut = %shortcut, node = %id, "dispatching shortcut");
                registry.execute(id)
            }
            None => ExecutionOutcome::NotFound,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let file = BindingFile {
            shortcuts: self
                .bindings
                .iter()
                .map(|(shortcut, id)| BindingEntry {
                    shortcut: shortcut.to_string(),
                    command_id: id.clone(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&file)
    }

    /// Parse a bindings document. Entries with unparseable shortcuts are
    /// logged and skipped; later duplicates override earlier ones.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let file: BindingFile = serde_json::from_str(json)?;
        let mut map = Self::new();
        for entry in file.shortcuts {
            match entry.shortcut.parse::<Shortcut>() {
                Ok(shortcut) => {
                    map.bind(shortcut, entry.command_id);
                }
                Err(e) => warn!(command = %entry.command_id, error = %e, "skipping invalid shortcut binding"),
            }
        }
        Ok(map)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json().context("failed to serialize shortcut bindings")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write shortcut bindings: {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read shortcut bindings: {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("invalid shortcut bindings at {}", path.display()))
    }

    /// Apply `overrides` on top of `self`, user bindings winning.
    pub fn merge(&mut self, overrides: &ShortcutMap) {
        for (shortcut, id) in &overrides.bindings {
            self.bindings.insert(*shortcut, id.clone());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::shortcut::Key;

    fn ctrl(c: char) -> Shortcut {
        Shortcut::new(Key::Char(c)).ctrl()
    }

    #[test]
    fn try_bind_detects_conflicts() {
        let mut map = ShortcutMap::new();
        map.try_bind(ctrl('S'), "file.save").unwrap();
        map.try_bind(ctrl('S'), "file.save").unwrap();

        let conflict = map.try_bind(ctrl('S'), "file.save_all").unwrap_err();
        assert_eq!(conflict.existing, "file.save");
        assert_eq!(conflict.requested, "file.save_all");
        assert!(conflict.to_string().contains("Ctrl+S"));
        assert_eq!(map.command_for(&ctrl('S')), Some("file.save"));
    }

    #[test]
    fn bind_overrides_and_reports_previous() {
        let mut map = ShortcutMap::new();
        assert_eq!(map.bind(ctrl('F'), "edit.find"), None);
        assert_eq!(map.bind(ctrl('F'), "edit.find_in_book"), Some("edit.find".to_string()));
        assert_eq!(map.len(), 1);
        assert_eq!(map.unbind(&ctrl('F')), Some("edit.find_in_book".to_string()));
        assert!(map.is_empty());
    }

    #[test]
    fn json_uses_command_id_field() {
        let mut map = ShortcutMap::new();
        map.bind(ctrl('B'), "format.bold");

        let json = map.to_json().unwrap();
        assert!(json.contains("\"commandId\": \"format.bold\""));
        assert!(json.contains("\"shortcut\": \"Ctrl+B\""));
        assert_eq!(ShortcutMap::from_json(&json).unwrap(), map);
    }

    #[test]
    fn punctuation_keys_survive_json() {
        let mut map = ShortcutMap::new();
        map.bind(ctrl('+'), "view.zoom_in");
        map.bind(ctrl('-'), "view.zoom_out");
        map.bind(Shortcut::new(Key::Char('+')).ctrl().shift(), "view.zoom_reset");

        let back = ShortcutMap::from_json(&map.to_json().unwrap()).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back, map);
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let json = r#"{"shortcuts": [
            {"shortcut": "Ctrl+Nope", "commandId": "x"},
            {"shortcut": "F1", "commandId": "help.manual"}
        ]}"#;
        let map = ShortcutMap::from_json(json).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.shortcuts_for("help.manual"), vec![Shortcut::new(Key::F(1))]);
    }

    #[test]
    fn merge_prefers_overrides() {
        let mut defaults = ShortcutMap::new();
        defaults.bind(ctrl('K'), "insert.link");
        let mut user = ShortcutMap::new();
        user.bind(ctrl('K'), "insert.comment");

        defaults.merge(&user);
        assert_eq!(defaults.command_for(&ctrl('K')), Some("insert.comment"));
    }
}
