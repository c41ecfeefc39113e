//! Keyboard shortcuts for menu commands.
//!
//! Nodes may declare a shortcut in the menu definition. A [`ShortcutMap`]
//! collects those, accepts user overrides from a JSON file, and dispatches a
//! pressed shortcut to [`MenuRegistry::execute`](crate::MenuRegistry::execute).

mod bindings;
mod keys;

pub use bindings::{ShortcutConflict, ShortcutMap};
pub use keys::{Key, Shortcut, ShortcutParseError};
