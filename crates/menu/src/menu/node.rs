//! Menu node types shared by definitions, plugin contributions and readers.

use serde::{Deserialize, Serialize};

use crate::command::ActionHandler;
use crate::plugin::PluginId;

/// What a menu node is and how it behaves when rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A plain command entry.
    #[default]
    Action,
    /// A nested menu holding further nodes.
    Submenu,
    /// A horizontal rule between groups of entries.
    Separator,
    /// A toggle entry with a check mark.
    Checkable,
    /// A container of mutually exclusive checkable entries.
    RadioGroup,
}

impl NodeKind {
    /// Whether nodes of this kind hold children.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Submenu | Self::RadioGroup)
    }

    /// Whether nodes of this kind can be invoked or toggled.
    pub fn is_actionable(self) -> bool {
        matches!(self, Self::Action | Self::Checkable)
    }

    /// Lowercase name used in messages and definition files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Submenu => "submenu",
            Self::Separator => "separator",
            Self::Checkable => "checkable",
            Self::RadioGroup => "radio_group",
        }
    }
}

/// Entitlement level gating a node's visibility.
///
/// Ordered so that a higher entitlement permits everything a lower one does.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Standard,
    Premium,
}

impl Tier {
    /// Whether an entitlement of `self` may see a node requiring `required`.
    pub fn permits(self, required: Tier) -> bool {
        required <= self
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "free" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            other => Err(format!("unknown tier '{other}', expected 'standard' or 'premium'")),
        }
    }
}

/// Where a node came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSource {
    /// Built from the static definition; never removable by plugins.
    Core,
    /// Contributed at runtime by the named plugin.
    Plugin(PluginId),
}

impl NodeSource {
    pub fn is_core(&self) -> bool {
        matches!(self, Self::Core)
    }

    /// The owning plugin, if any.
    pub fn plugin(&self) -> Option<&PluginId> {
        match self {
            Self::Core => None,
            Self::Plugin(id) => Some(id),
        }
    }

    pub fn is_from(&self, plugin: &PluginId) -> bool {
        self.plugin() == Some(plugin)
    }
}

fn default_true() -> bool {
    true
}

/// Declarative description of a node and its subtree.
///
/// Used both for the static Core definition and for plugin contributions.
/// A node's `source` is not part of its `NodeSpec`; the registry assigns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Stable identifier. Optional only for separators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display text.
    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub kind: NodeKind,

    /// Entitlement required to see the node.
    #[serde(default)]
    pub tier: Tier,

    /// Initial enabled state (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Initial checked state for checkable nodes.
    #[serde(default)]
    pub checked: bool,

    /// Keyboard shortcut text, e.g. "Ctrl+Shift+N".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,

    /// Status bar / hover text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,

    /// Command grouping used by shortcut and command listings, e.g. "file".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Child separator id after which plugin contributions are placed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_anchor: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,

    /// Invocation handler. Never read from or written to definition files.
    #[serde(skip)]
    pub handler: Option<ActionHandler>,
}

impl NodeSpec {
    fn with_kind(id: Option<String>, label: String, kind: NodeKind) -> Self {
        Self {
            id,
            label,
            kind,
            enabled: true,
            ..Self::default()
        }
    }

    /// A plain action entry.
    pub fn action(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(Some(id.into()), label.into(), NodeKind::Action)
    }

    /// A toggle entry.
    pub fn checkable(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(Some(id.into()), label.into(), NodeKind::Checkable)
    }

    /// A submenu with the given children.
    pub fn submenu(
        id: impl Into<String>,
        label: impl Into<String>,
        children: impl IntoIterator<Item = NodeSpec>,
    ) -> Self {
        let mut spec = Self::with_kind(Some(id.into()), label.into(), NodeKind::Submenu);
        spec.children = children.into_iter().collect();
        spec
    }

    /// A radio group; every child must be checkable.
    pub fn radio_group(
        id: impl Into<String>,
        label: impl Into<String>,
        children: impl IntoIterator<Item = NodeSpec>,
    ) -> Self {
        let mut spec = Self::with_kind(Some(id.into()), label.into(), NodeKind::RadioGroup);
        spec.children = children.into_iter().collect();
        spec
    }

    /// An anonymous separator.
    pub fn separator() -> Self {
        Self::with_kind(None, String::new(), NodeKind::Separator)
    }

    /// A separator that can be targeted as an anchor.
    pub fn anchor(id: impl Into<String>) -> Self {
        Self::with_kind(Some(id.into()), String::new(), NodeKind::Separator)
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    pub fn premium(self) -> Self {
        self.with_tier(Tier::Premium)
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_handler(mut self, handler: ActionHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn with_plugin_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.plugin_anchor = Some(anchor.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    /// Id for messages, falling back to the label for anonymous nodes.
    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.label)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(NodeSpec::subtree_len).sum::<usize>()
    }
}

/// An owned copy of a node and its subtree, as returned by
/// [`MenuRegistry::find`](crate::MenuRegistry::find).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    pub id: Option<String>,
    pub label: String,
    pub kind: NodeKind,
    pub tier: Tier,
    pub source: NodeSource,
    pub enabled: bool,
    pub checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_anchor: Option<String>,
    /// Whether an invocation handler is bound.
    pub has_handler: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    /// Ids of the direct children, with `None` for anonymous separators.
    pub fn child_ids(&self) -> Vec<Option<&str>> {
        self.children.iter().map(|c| c.id.as_deref()).collect()
    }
}
