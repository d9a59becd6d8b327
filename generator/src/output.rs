//! Output formatting for trees and single command nodes.

use cli_tree_core::{CliTree, CommandNode};
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Markdown,
}

fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> Option<Result<String, String>> {
    match format {
        OutputFormat::Json => Some(
            serde_json::to_string_pretty(value)
                .map_err(|e| format!("JSON serialization failed: {e}")),
        ),
        OutputFormat::Yaml => Some(
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}")),
        ),
        OutputFormat::Markdown => None,
    }
}

/// Formats a whole tree in the requested output format.
pub fn format_tree(tree: &CliTree, format: OutputFormat) -> Result<String, String> {
    serialize(tree, format).unwrap_or_else(|| {
        let mut out = String::new();
        out.push_str(&format!(
            "**CLI version:** {}  **Schema version:** {}\n\n",
            tree.cli_version, tree.schema_version
        ));
        node_to_markdown(&tree.root, &mut out);
        Ok(out)
    })
}

/// Formats one command node and its descendants.
pub fn format_node(node: &CommandNode, format: OutputFormat) -> Result<String, String> {
    serialize(node, format).unwrap_or_else(|| {
        let mut out = String::new();
        node_to_markdown(node, &mut out);
        Ok(out)
    })
}

fn node_to_markdown(node: &CommandNode, out: &mut String) {
    let level = node.path.len().clamp(1, 6);
    out.push_str(&format!("{} {}\n\n", "#".repeat(level), node.path.join(" ")));

    if !node.capsule.is_empty() {
        out.push_str(&format!("{}\n\n", node.capsule));
    }

    for (heading, text) in &node.sections {
        out.push_str(&format!("**{heading}**\n\n{text}\n\n"));
    }

    if !node.positionals.is_empty() {
        out.push_str("| Argument | Arity | Description |\n");
        out.push_str("|----------|-------|-------------|\n");
        for positional in &node.positionals {
            out.push_str(&format!(
                "| `{}` | {} | {} |\n",
                positional.name, positional.nargs, positional.description
            ));
        }
        out.push('\n');
    }

    if !node.flags.is_empty() {
        out.push_str("| Flag | Type | Description |\n");
        out.push_str("|------|------|-------------|\n");
        for flag in node.flags.values() {
            let name = if flag.value.is_empty() {
                flag.name.clone()
            } else {
                format!("{}={}", flag.name, flag.value)
            };
            let scope = if flag.is_global { " (global)" } else { "" };
            out.push_str(&format!(
                "| `{name}` | {:?}{scope} | {} |\n",
                flag.flag_type,
                flag.description.replace('\n', " ")
            ));
        }
        out.push('\n');
    }

    for child in node.subcommands.values() {
        node_to_markdown(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cli_tree_core::FlagNode;

    fn sample() -> CliTree {
        let mut root = CommandNode::new(vec!["kubectl".to_string()]);
        root.add_flag(FlagNode::with_value("--context", "VALUE").global(true));
        let mut get = CommandNode::new(root.child_path("get"));
        get.capsule = "Display one or many resources.".to_string();
        root.add_subcommand(get);
        CliTree::new(root, "v1.28.2")
    }

    #[test]
    fn test_json_is_parseable() {
        let json = format_tree(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["cli_version"], "v1.28.2");
        assert_eq!(value["subcommands"]["get"]["path"][1], "get");
    }

    #[test]
    fn test_yaml_output() {
        let yaml = format_node(&sample().root, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("capsule: Display one or many resources."));
    }

    #[test]
    fn test_markdown_nests_subcommands() {
        let md = format_tree(&sample(), OutputFormat::Markdown).unwrap();
        assert!(md.contains("# kubectl\n"));
        assert!(md.contains("## kubectl get\n"));
        assert!(md.contains("`--context=VALUE`"));
        assert!(md.contains("(global)"));
    }
}
