//! Tree type definitions for command hierarchy modeling.
//!
//! This module defines the data model used to represent the documented
//! command hierarchy of a third-party CLI. The types are designed for
//! serialization with [`serde`]; a [`CliTree`] round-trips through the JSON
//! artifact written for each root command.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::text::normalize_space;

/// Version of the tree artifact format.
///
/// Stamped into every [`CliTree`] as `schema_version`. A cached artifact
/// with a different stamp is considered stale and is regenerated.
pub const TREE_SCHEMA_VERSION: &str = "1";

/// Release tag assigned to every generated node.
pub const DEFAULT_RELEASE: &str = "GA";

/// Value type of a flag.
///
/// # Examples
///
/// ```
/// use cli_tree_core::FlagType;
///
/// assert_eq!(FlagType::default(), FlagType::String);
/// assert_eq!(serde_json::to_string(&FlagType::Bool).unwrap(), "\"bool\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    /// Flag takes a value (the default).
    #[default]
    String,
    /// Presence-only flag.
    Bool,
}

/// One documented flag of a command.
///
/// Use [`boolean`](FlagNode::boolean) or [`with_value`](FlagNode::with_value)
/// to create flags, then chain builder methods. Descriptions are passed
/// through [`normalize_space`] on the way in.
///
/// # Examples
///
/// ```
/// use cli_tree_core::{FlagNode, FlagType};
///
/// let flag = FlagNode::with_value("--output", "VALUE")
///     .with_description("Output   format.")
///     .with_default("json");
/// assert_eq!(flag.flag_type, FlagType::String);
/// assert_eq!(flag.description, "Output format.");
/// assert_eq!(flag.default, "json");
///
/// let quiet = FlagNode::boolean("--quiet");
/// assert!(quiet.value.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagNode {
    /// Canonical name including dashes (e.g. `--verbose`).
    pub name: String,
    /// Dedented, whitespace-collapsed help text.
    pub description: String,
    /// Value placeholder; empty for boolean flags.
    pub value: String,
    /// Documented default, empty when none was found.
    pub default: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    /// Subsection the flag was listed under, if any.
    pub category: String,
    pub is_global: bool,
    pub is_required: bool,
    pub is_hidden: bool,
}

impl FlagNode {
    /// Creates a boolean (presence-only) flag.
    pub fn boolean(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            value: String::new(),
            default: String::new(),
            flag_type: FlagType::Bool,
            category: String::new(),
            is_global: false,
            is_required: false,
            is_hidden: false,
        }
    }

    /// Creates a flag that takes a value shown as `placeholder`.
    pub fn with_value(name: &str, placeholder: &str) -> Self {
        Self {
            value: placeholder.to_string(),
            flag_type: FlagType::String,
            ..Self::boolean(name)
        }
    }

    /// Sets the description, normalizing its whitespace.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = normalize_space(description);
        self
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = default.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// Marks the flag as applying to every command under the root.
    pub fn global(mut self, is_global: bool) -> Self {
        self.is_global = is_global;
        self
    }

    /// Returns `true` if the flag takes no value.
    pub fn is_boolean(&self) -> bool {
        self.flag_type == FlagType::Bool
    }
}

/// One positional argument of a command.
///
/// `nargs` is an arity descriptor: `"1"`, `"?"`, `"*"` or `"+"`.
///
/// # Examples
///
/// ```
/// use cli_tree_core::PositionalNode;
///
/// let file = PositionalNode::new("FILE", "*");
/// assert_eq!(file.nargs, "*");
/// assert!(file.default.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionalNode {
    pub name: String,
    pub description: String,
    pub default: String,
    pub nargs: String,
}

impl PositionalNode {
    pub fn new(name: &str, nargs: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            default: String::new(),
            nargs: nargs.to_string(),
        }
    }

    /// Sets the description, normalizing its whitespace.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = normalize_space(description);
        self
    }
}

/// One node of a command tree.
///
/// A node's `path` lists the command words from the root (`["kubectl",
/// "config", "view"]`). Children are attached with
/// [`add_subcommand`](CommandNode::add_subcommand), which keeps `is_group`
/// in sync with the `subcommands` map.
///
/// # Examples
///
/// ```
/// use cli_tree_core::{CommandNode, FlagNode};
///
/// let mut root = CommandNode::new(vec!["kubectl".into()]);
/// let config = CommandNode::new(root.child_path("config"));
/// root.add_subcommand(config);
/// root.add_flag(FlagNode::boolean("--help"));
///
/// assert!(root.is_group);
/// assert_eq!(root.subcommands["config"].path, vec!["kubectl", "config"]);
/// assert_eq!(root.name(), "kubectl");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandNode {
    /// Command words from the root, inclusive.
    pub path: Vec<String>,
    /// One-line summary.
    pub capsule: String,
    /// Help text sections keyed by heading (`DESCRIPTION`, `EXAMPLES`, ...).
    pub sections: BTreeMap<String, String>,
    /// Flags keyed by canonical name.
    pub flags: BTreeMap<String, FlagNode>,
    pub positionals: Vec<PositionalNode>,
    /// Child commands keyed by their last path word.
    pub subcommands: BTreeMap<String, CommandNode>,
    /// `true` iff `subcommands` is non-empty.
    pub is_group: bool,
    pub is_hidden: bool,
    /// Stability tag.
    pub release: String,
}

impl CommandNode {
    /// Creates an empty node for `path`.
    pub fn new(path: Vec<String>) -> Self {
        Self {
            path,
            capsule: String::new(),
            sections: BTreeMap::new(),
            flags: BTreeMap::new(),
            positionals: Vec::new(),
            subcommands: BTreeMap::new(),
            is_group: false,
            is_hidden: false,
            release: DEFAULT_RELEASE.to_string(),
        }
    }

    /// Returns the last path word, or `""` for an empty path.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Returns the path of a child named `name`.
    pub fn child_path(&self, name: &str) -> Vec<String> {
        let mut path = self.path.clone();
        path.push(name.to_string());
        path
    }

    /// Attaches `child` keyed by its last path word and marks this node as a
    /// group.
    pub fn add_subcommand(&mut self, child: CommandNode) {
        debug_assert_eq!(
            child.path[..child.path.len().saturating_sub(1)],
            self.path[..],
            "child path must extend the parent path"
        );
        let name = child.name().to_string();
        self.subcommands.insert(name, child);
        self.is_group = true;
    }

    /// Registers `flag` under its name, replacing an earlier flag of the same
    /// name.
    pub fn add_flag(&mut self, flag: FlagNode) {
        self.flags.insert(flag.name.clone(), flag);
    }

    /// Sets section `heading` to `text`, replacing any previous content.
    pub fn set_section(&mut self, heading: &str, text: String) {
        self.sections.insert(heading.to_string(), text);
    }

    /// Appends `text` to section `heading`, separated from existing content
    /// by a blank line.
    pub fn append_section(&mut self, heading: &str, text: String) {
        match self.sections.get_mut(heading) {
            Some(existing) => {
                existing.push_str("\n\n");
                existing.push_str(&text);
            }
            None => {
                self.sections.insert(heading.to_string(), text);
            }
        }
    }

    /// Finds the descendant at `path`, relative to this node.
    ///
    /// An empty `path` returns this node.
    pub fn find(&self, path: &[&str]) -> Option<&CommandNode> {
        let mut node = self;
        for word in path {
            node = node.subcommands.get(*word)?;
        }
        Some(node)
    }

    /// Counts this node and all its descendants.
    pub fn node_count(&self) -> usize {
        1 + self
            .subcommands
            .values()
            .map(CommandNode::node_count)
            .sum::<usize>()
    }
}

/// A root command tree with its version stamps.
///
/// Serializes as the root [`CommandNode`] fields plus `cli_version` and
/// `schema_version` at the top level.
///
/// # Examples
///
/// ```
/// use cli_tree_core::{CliTree, CommandNode, TREE_SCHEMA_VERSION};
///
/// let tree = CliTree::new(CommandNode::new(vec!["gsutil".into()]), "5.27");
/// assert_eq!(tree.schema_version, TREE_SCHEMA_VERSION);
/// assert!(tree.is_current("5.27"));
/// assert!(!tree.is_current("5.28"));
///
/// let json = serde_json::to_value(&tree).unwrap();
/// assert_eq!(json["cli_version"], "5.27");
/// assert_eq!(json["path"][0], "gsutil");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliTree {
    #[serde(flatten)]
    pub root: CommandNode,
    /// Version reported by the live tool when the tree was generated.
    pub cli_version: String,
    /// Artifact format version ([`TREE_SCHEMA_VERSION`] at generation time).
    pub schema_version: String,
}

impl CliTree {
    /// Stamps `root` with `cli_version` and the current format version.
    pub fn new(root: CommandNode, cli_version: &str) -> Self {
        Self {
            root,
            cli_version: cli_version.to_string(),
            schema_version: TREE_SCHEMA_VERSION.to_string(),
        }
    }

    /// Root command name.
    pub fn command(&self) -> &str {
        self.root.name()
    }

    /// Returns `true` if both stamps match `live_version` and the current
    /// format version.
    pub fn is_current(&self, live_version: &str) -> bool {
        self.cli_version == live_version && self.schema_version == TREE_SCHEMA_VERSION
    }
}
