//! Structural validation shared by definitions and plugin contributions.

use std::collections::HashSet;

use crate::error::DefinitionError;
use crate::menu::{NodeKind, NodeSpec};

/// Validate `nodes` recursively, collecting every id into `seen`.
///
/// Checks, per node:
/// - ids are present (except on separators), non-empty and unique
/// - only submenus and radio groups have children or a plugin anchor
/// - a plugin anchor names a direct child separator
/// - radio groups hold only checkable nodes, at most one of them checked
pub(crate) fn validate_nodes<'a>(
    nodes: &'a [NodeSpec],
    seen: &mut HashSet<&'a str>,
) -> Result<(), DefinitionError> {
    for node in nodes {
        validate_node(node, seen)?;
    }
    Ok(())
}

fn validate_node<'a>(node: &'a NodeSpec, seen: &mut HashSet<&'a str>) -> Result<(), DefinitionError> {
    match node.id.as_deref() {
        Some("") => {
            return Err(DefinitionError::EmptyId {
                label: node.label.clone(),
            });
        }
        Some(id) => {
            if !seen.insert(id) {
                return Err(DefinitionError::DuplicateId { id: id.to_string() });
            }
        }
        None if node.kind != NodeKind::Separator => {
            return Err(DefinitionError::MissingId {
                kind: node.kind.as_str(),
                label: node.label.clone(),
            });
        }
        None => {}
    }

    if !node.kind.is_container() {
        if !node.children.is_empty() {
            return Err(DefinitionError::ChildrenOnLeaf {
                kind: node.kind.as_str(),
                id: node.display_id().to_string(),
            });
        }
        if node.plugin_anchor.is_some() {
            return Err(DefinitionError::AnchorOnLeaf {
                kind: node.kind.as_str(),
                id: node.display_id().to_string(),
            });
        }
        return Ok(());
    }

    if let Some(anchor) = node.plugin_anchor.as_deref() {
        let target = node
            .children
            .iter()
            .find(|c| c.id.as_deref() == Some(anchor))
            .ok_or_else(|| DefinitionError::MissingAnchor {
                parent: node.display_id().to_string(),
                anchor: anchor.to_string(),
            })?;
        if target.kind != NodeKind::Separator {
            return Err(DefinitionError::AnchorNotSeparator {
                parent: node.display_id().to_string(),
                anchor: anchor.to_string(),
            });
        }
    }

    if node.kind == NodeKind::RadioGroup {
        if let Some(member) = node.children.iter().find(|c| c.kind != NodeKind::Checkable) {
            return Err(DefinitionError::RadioMemberNotCheckable {
                group: node.display_id().to_string(),
                member: member.display_id().to_string(),
            });
        }
        let count = node.children.iter().filter(|c| c.checked).count();
        if count > 1 {
            return Err(DefinitionError::MultipleChecked {
                group: node.display_id().to_string(),
                count,
            });
        }
    }

    validate_nodes(&node.children, seen)
}
