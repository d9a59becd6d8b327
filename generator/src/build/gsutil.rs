//! `gsutil` pages.

use cli_tree_core::CommandNode;
use tracing::debug;

use super::{Page, TreeBuilder, capsule_text, first_words};
use crate::collect::{GsutilCollector, SectionCollector};
use crate::error::Result;
use crate::flags::add_flags;
use crate::registry::Dialect;

const SYNOPSIS_VALUES: [&str; 4] = ["on", "off", "true", "false"];

/// `gsutil help ...` paths print their page without `--help`.
pub(crate) fn is_help_path(path: &[String]) -> bool {
    path.get(1).is_some_and(|word| word == "help")
}

fn is_upper_heading(heading: &str) -> bool {
    heading.chars().any(char::is_alphabetic) && !heading.chars().any(char::is_lowercase)
}

/// Subcommand names from SYNOPSIS lines of the form `<path> <name> ...`.
fn synopsis_commands(path: &[String], content: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for line in content {
        if line.is_empty() {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() <= path.len() || words[..path.len()] != path[..] {
            continue;
        }
        let name = words[path.len()];
        let candidate = name.chars().next().is_some_and(char::is_lowercase)
            && !SYNOPSIS_VALUES.contains(&name);
        if candidate && !names.iter().any(|seen| seen == name) {
            names.push(name.to_string());
        }
    }
    names
}

pub fn parse_page(path: &[String], text: &str) -> Page {
    let mut page = Page::new(path);
    let help_page = is_help_path(path);
    let mut collector = GsutilCollector::new(text);

    while let Some(section) = collector.collect(false) {
        match section.heading.as_str() {
            "CAPSULE" => {
                if let Some(first) = section.content.first() {
                    page.node.capsule = capsule_text(first);
                }
            }
            "COMMANDS" => {
                if help_page {
                    continue;
                }
                for name in first_words(&section.content) {
                    page.push_child(name);
                }
            }
            "FLAGS" => {
                add_flags(&mut page.node, Dialect::Gsutil, &section.content, false);
            }
            "SYNOPSIS" => {
                let names = synopsis_commands(path, &section.content);
                if names.len() > 1 {
                    for name in &names {
                        page.push_child(name);
                    }
                }
            }
            "TOPICS" => {
                for name in first_words(&section.content) {
                    page.push_topic(name);
                }
            }
            heading if is_upper_heading(heading) => {
                page.copy_section(heading, &section.content);
            }
            heading => {
                debug!(path = ?path, heading, "Dropping section");
            }
        }
    }
    page
}

pub(crate) fn build(builder: &mut TreeBuilder<'_, '_>) -> Result<CommandNode> {
    let generator = builder.generator();
    let mut root = builder.expand(builder.root_path())?;

    let argv = [generator.program(), "help".to_string(), "options".to_string()];
    let text = generator.run(&argv)?;
    let mut collector = GsutilCollector::new(&text);
    while let Some(section) = collector.collect(false) {
        if section.heading == "FLAGS" {
            add_flags(&mut root, Dialect::Gsutil, &section.content, true);
        }
    }

    let topics = builder.take_topics();
    if topics.is_empty() {
        return Ok(root);
    }
    let Some(help) = root.subcommands.get_mut("help") else {
        debug!(topics = topics.len(), "No help command to attach topics to");
        return Ok(root);
    };
    for topic in topics {
        if let Some(node) = builder.expand_child(help.child_path(&topic))? {
            help.add_subcommand(node);
        }
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_root_page_lists_commands_and_topics() {
        let text = "\
Usage: gsutil [-D] [-DD] [-h header]... [-m] [-o] [-q] [command [opts...] args...]
Available commands:
  acl             Get, set, or change bucket and/or object ACLs
  cp              Copy files and objects
  help            Get help about commands and topics
  update          Update to the latest gsutil release

Additional help topics:
  acls            Working With Access Control Lists
  options         Global Command Line Options
";
        let page = parse_page(&path(&["gsutil"]), text);
        assert_eq!(page.children, ["acl", "cp", "help"]);
        assert_eq!(page.topics, ["acls", "options"]);
    }

    #[test]
    fn test_help_page_does_not_reenumerate_commands() {
        let text = "Usage: gsutil\nAvailable commands:\n  cp   Copy\n";
        let page = parse_page(&path(&["gsutil", "help"]), text);
        assert!(page.children.is_empty());
    }

    #[test]
    fn test_command_page_sections() {
        let text = "\
NAME
  acl - Get, set, or change bucket and/or object ACLs

SYNOPSIS
  gsutil acl set [-f] [-r] [-a] file-or-canned_acl_name url...
  gsutil acl get url
  gsutil acl ch [-f] [-r] <grant>... url...

DESCRIPTION
  The acl command has three sub-commands.

SET OPTIONS
  -R, -r      Performs acl set request recursively.
  -f          Normally gsutil stops at the first error.
";
        let page = parse_page(&path(&["gsutil", "acl"]), text);
        assert_eq!(page.node.capsule, "Get, set, or change bucket and/or object ACLs");
        assert_eq!(page.children, ["set", "get", "ch"]);
        assert_eq!(
            page.node.sections["DESCRIPTION"],
            "The acl command has three sub-commands."
        );
        assert!(page.node.flags["-r"].is_boolean());
        assert!(page.node.flags.contains_key("-f"));
    }

    #[test]
    fn test_single_synopsis_name_is_not_a_group() {
        let text = "NAME\n  cp - Copy files\n\nSYNOPSIS\n  gsutil cp [OPTION]... src_url dst_url\n  gsutil cp on\n";
        let page = parse_page(&path(&["gsutil", "cp"]), text);
        assert!(page.children.is_empty());
    }

    #[test]
    fn test_heading_naming_the_command_is_retitled() {
        let text = "NAME\n  cp - Copy files\n\nCP\n  Copies things.\n";
        let page = parse_page(&path(&["gsutil", "cp"]), text);
        assert_eq!(page.node.sections["DESCRIPTION"], "Copies things.");
        assert!(!page.node.sections.contains_key("CP"));
    }
}
