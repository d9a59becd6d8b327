//! Core tree types for documented third-party CLI hierarchies.
//!
//! This crate defines the data model produced by the tree generators:
//!
//! - [`CommandNode`]: one command or group, with its help sections, flags,
//!   positionals and child commands.
//! - [`FlagNode`]: a documented flag with its value placeholder and type.
//! - [`PositionalNode`]: a positional argument with an arity descriptor.
//! - [`CliTree`]: a root node stamped with the live tool version and the
//!   artifact format version, used for staleness checks.
//!
//! Validation ([`validate_tree`]) catches structural errors such as path
//! mismatches between a parent and its children, or a group flag that
//! disagrees with the subcommand map.
//!
//! # Example
//!
//! ```
//! use cli_tree_core::*;
//!
//! let mut root = CommandNode::new(vec!["kubectl".into()]);
//! let mut get = CommandNode::new(root.child_path("get"));
//! get.add_flag(FlagNode::with_value("--output", "VALUE").with_description("Output format."));
//! root.add_subcommand(get);
//!
//! let tree = CliTree::new(root, "v1.28.0");
//! assert!(tree.root.find(&["get"]).unwrap().flags.contains_key("--output"));
//! assert!(validate_tree(&tree).is_empty());
//! ```

mod text;
mod types;
mod validate;

pub use text::normalize_space;
pub use types::*;
pub use validate::{ValidationError, validate_tree};
