//! Menu registry error types with clear, actionable messages.
//!
//! Every error names the node, parent or plugin involved so that a plugin
//! author can find the offending contribution without a debugger.

use thiserror::Error;

use crate::plugin::PluginId;

/// Errors raised while validating a static menu definition.
///
/// Any of these aborts [`MenuRegistry::initialize`](crate::MenuRegistry::initialize)
/// and leaves the registry in its previous state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The definition file could not be parsed.
    #[error("menu definition: failed to parse {format}: {details}")]
    Parse {
        format: &'static str,
        details: String,
    },

    /// The definition declares a schema version this build does not understand.
    #[error("menu definition: unsupported version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Two nodes share the same id.
    #[error("menu definition: duplicate node id '{id}'")]
    DuplicateId { id: String },

    /// A node id is present but empty.
    #[error("menu definition: node labelled '{label}' has an empty id")]
    EmptyId { label: String },

    /// A non-separator node has no id.
    #[error("menu definition: {kind} node labelled '{label}' needs an id")]
    MissingId { kind: &'static str, label: String },

    /// A container names a plugin anchor that is not one of its children.
    #[error("menu definition: '{parent}' declares plugin anchor '{anchor}' which is not one of its children")]
    MissingAnchor { parent: String, anchor: String },

    /// A container names a plugin anchor that is not a separator.
    #[error("menu definition: plugin anchor '{anchor}' of '{parent}' must be a separator")]
    AnchorNotSeparator { parent: String, anchor: String },

    /// A leaf kind (action, checkable, separator) declares children.
    #[error("menu definition: {kind} node '{id}' cannot have children")]
    ChildrenOnLeaf { kind: &'static str, id: String },

    /// A leaf kind declares a plugin anchor.
    #[error("menu definition: {kind} node '{id}' cannot declare a plugin anchor")]
    AnchorOnLeaf { kind: &'static str, id: String },

    /// A radio group contains something other than checkable items.
    #[error("menu definition: radio group '{group}' contains non-checkable node '{member}'")]
    RadioMemberNotCheckable { group: String, member: String },

    /// A radio group starts out with more than one checked member.
    #[error("menu definition: radio group '{group}' has {count} checked members, at most one allowed")]
    MultipleChecked { group: String, count: usize },
}

/// Errors surfaced to plugins and renderers by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    /// The static definition was rejected.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// A referenced node does not exist or cannot hold children.
    #[error("menu node '{id}' not found{reason}")]
    NotFound { id: String, reason: String },

    /// A node id is already present in the tree.
    #[error("menu node id '{id}' is already registered")]
    DuplicateId { id: String },

    /// A Core node cannot be removed through the plugin surface.
    #[error("menu node '{id}' is built in and cannot be removed")]
    ProtectedNode { id: String },

    /// The node spec or requested operation does not fit the node kind.
    #[error("menu node '{id}': {details}")]
    InvalidNode { id: String, details: String },
}

impl MenuError {
    /// A plain missing-node error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            id: id.into(),
            reason: String::new(),
        }
    }

    /// A node exists but is not a submenu or radio group.
    pub fn not_a_container(id: impl Into<String>) -> Self {
        Self::NotFound {
            id: id.into(),
            reason: " as a submenu or radio group".to_string(),
        }
    }

    /// An anchor was given that is not a child of the target parent.
    pub fn anchor_not_found(anchor: impl Into<String>, parent: &str) -> Self {
        Self::NotFound {
            id: anchor.into(),
            reason: format!(" as an anchor under '{parent}'"),
        }
    }

    /// A duplicate id error.
    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// A rejected node spec or kind mismatch.
    pub fn invalid(id: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidNode {
            id: id.into(),
            details: details.into(),
        }
    }

    /// Describe which plugin a rejected contribution came from, for logging.
    pub(crate) fn log_rejection(&self, plugin: &PluginId) {
        tracing::warn!(plugin = %plugin, error = %self, "menu contribution rejected");
    }
}

/// Result type alias using [`MenuError`].
pub type MenuResult<T> = Result<T, MenuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_messages_name_the_context() {
        assert_eq!(
            MenuError::not_found("tools.plugins").to_string(),
            "menu node 'tools.plugins' not found"
        );
        let msg = MenuError::not_a_container("file.save").to_string();
        assert!(msg.contains("file.save"));
        assert!(msg.contains("submenu or radio group"));

        let msg = MenuError::anchor_not_found("edit.sep", "file").to_string();
        assert!(msg.contains("edit.sep"));
        assert!(msg.contains("under 'file'"));
    }

    #[test]
    fn definition_errors_convert_transparently() {
        let err: MenuError = DefinitionError::DuplicateId {
            id: "file.save".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "menu definition: duplicate node id 'file.save'");
    }

    #[test]
    fn anchor_errors_point_at_parent() {
        let err = DefinitionError::MissingAnchor {
            parent: "tools".to_string(),
            anchor: "tools.plugins".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("tools"));
        assert!(msg.contains("tools.plugins"));
    }
}
