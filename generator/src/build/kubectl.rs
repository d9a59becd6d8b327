//! `kubectl` pages.

use cli_tree_core::CommandNode;

use super::{Page, TreeBuilder, first_words};
use crate::collect::{KubectlCollector, SectionCollector};
use crate::error::Result;
use crate::flags::add_flags;
use crate::registry::Dialect;

/// `kubectl options` omits `--help`, which every command accepts.
const HELP_FLAG_ROW: &str = "  --help=true: List detailed command help.";

pub fn parse_page(path: &[String], text: &str) -> Page {
    let mut page = Page::new(path);
    let mut collector = KubectlCollector::new(text);

    while let Some(section) = collector.collect(false) {
        match section.heading.as_str() {
            "COMMANDS" => {
                for name in first_words(&section.content) {
                    page.push_child(name);
                }
            }
            "FLAGS" => {
                add_flags(&mut page.node, Dialect::Kubectl, &section.content, false);
            }
            heading @ ("DESCRIPTION" | "EXAMPLES" | "USAGE") => {
                page.copy_section(heading, &section.content);
            }
            _ => {}
        }
    }

    if let Some(summary) = page.node.sections.get("DESCRIPTION").and_then(|d| d.lines().next()) {
        page.node.capsule = summary.trim().to_string();
    }
    page
}

pub(crate) fn build(builder: &mut TreeBuilder<'_, '_>) -> Result<CommandNode> {
    let generator = builder.generator();
    let mut root = builder.expand(builder.root_path())?;

    let text = generator.run(&[generator.program(), "options".to_string()])?;
    let mut content = KubectlCollector::new(&text)
        .collect(true)
        .map(|section| section.content)
        .unwrap_or_default();
    content.push(HELP_FLAG_ROW.to_string());
    add_flags(&mut root, Dialect::Kubectl, &content, true);
    Ok(root)
}
