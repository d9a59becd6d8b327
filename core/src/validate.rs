//! Structural validation of command trees.
//!
//! A tree loaded from disk is only trusted when it passes these checks. The
//! store treats any reported error as a corrupt artifact and regenerates
//! the tree instead of surfacing a parse failure.
//!
//! # Examples
//!
//! ```
//! use cli_tree_core::*;
//!
//! let mut root = CommandNode::new(vec!["kubectl".into()]);
//! root.add_subcommand(CommandNode::new(root.child_path("get")));
//! let tree = CliTree::new(root, "v1.28.0");
//! assert!(validate_tree(&tree).is_empty());
//!
//! // A child whose path does not extend its parent's path is rejected.
//! let mut bad = tree.clone();
//! bad.root.subcommands.get_mut("get").unwrap().path = vec!["get".into()];
//! assert!(!validate_tree(&bad).is_empty());
//! ```

use thiserror::Error;

use crate::{CliTree, CommandNode};

/// Tree validation errors.
///
/// Each variant carries the space-joined path of the offending node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The root path is empty.
    #[error("tree root has an empty path")]
    EmptyPath,
    /// A child's path is not its parent's path plus its own key.
    #[error("path mismatch at {0}")]
    PathMismatch(String),
    /// `is_group` disagrees with the presence of subcommands.
    #[error("group flag mismatch at {0}")]
    GroupMismatch(String),
    /// A flag is keyed under a different name than its own.
    #[error("flag key mismatch at {path}: {key}")]
    FlagNameMismatch { path: String, key: String },
    /// A flag name does not start with a dash.
    #[error("invalid flag name at {path}: {name}")]
    InvalidFlagName { path: String, name: String },
    /// The `cli_version` stamp is empty.
    #[error("missing cli version stamp")]
    EmptyCliVersion,
    /// The `schema_version` stamp is empty.
    #[error("missing schema version stamp")]
    EmptySchemaVersion,
}

/// Validates a whole tree, returning every problem found.
pub fn validate_tree(tree: &CliTree) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if tree.cli_version.trim().is_empty() {
        errors.push(ValidationError::EmptyCliVersion);
    }
    if tree.schema_version.trim().is_empty() {
        errors.push(ValidationError::EmptySchemaVersion);
    }
    if tree.root.path.is_empty() {
        errors.push(ValidationError::EmptyPath);
        return errors;
    }

    validate_node(&tree.root, &mut errors);
    errors
}

fn validate_node(node: &CommandNode, errors: &mut Vec<ValidationError>) {
    let joined = node.path.join(" ");

    if node.is_group == node.subcommands.is_empty() {
        errors.push(ValidationError::GroupMismatch(joined.clone()));
    }

    for (key, flag) in &node.flags {
        if *key != flag.name {
            errors.push(ValidationError::FlagNameMismatch {
                path: joined.clone(),
                key: key.clone(),
            });
        }
        if !flag.name.starts_with('-') {
            errors.push(ValidationError::InvalidFlagName {
                path: joined.clone(),
                name: flag.name.clone(),
            });
        }
    }

    for (name, child) in &node.subcommands {
        let expected = node.child_path(name);
        if child.path != expected {
            errors.push(ValidationError::PathMismatch(child.path.join(" ")));
            continue;
        }
        validate_node(child, errors);
    }
}
