//! Kalahari Menu Registry
//!
//! In-process registry backing the Kalahari menu bar. Core menus come from a
//! static definition; plugins add and remove their own entries at runtime;
//! renderers resolve what is visible for the user's entitlement tier.

pub mod command;
pub mod config;
pub mod definition;
pub mod error;
pub mod menu;
pub mod plugin;
pub mod shortcut;

pub use command::{ActionHandler, ExecutionOutcome};
pub use config::Config;
pub use definition::MenuDefinition;
pub use error::{DefinitionError, MenuError, MenuResult};
pub use menu::{MenuNode, MenuRegistry, NodeKind, NodeSource, NodeSpec, Tier, VisibleMenu};
pub use plugin::{PluginContribution, PluginId, PluginMenus};
pub use shortcut::{Shortcut, ShortcutMap};
