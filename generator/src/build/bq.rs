//! `bq` pages.
//!
//! `bq help` documents every command inline: an unindented lowercase line
//! starts a command (`name  summary`), and the indented paragraphs below it
//! are its description, `Arguments:` and `Examples:`. Global flags come
//! from `bq --help`.

use cli_tree_core::{CommandNode, normalize_space};

use super::{Page, TreeBuilder, is_denylisted};
use crate::collect::{BqCollector, SectionCollector};
use crate::error::Result;
use crate::flags::add_flags;
use crate::registry::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paragraph {
    Description,
    Arguments,
    Examples,
}

fn starts_lowercase(line: &str) -> bool {
    line.chars().next().is_some_and(char::is_lowercase)
}

fn set_paragraph(node: &mut CommandNode, heading: &str, lines: &[String]) {
    let text = normalize_space(&lines.join("\n"));
    if !text.is_empty() {
        node.set_section(heading, text);
    }
}

pub fn parse_page(path: &[String], text: &str) -> Page {
    let mut page = Page::new(path);
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        if !starts_lowercase(line) {
            continue;
        }
        let (name, summary) = line.split_once(' ').unwrap_or((line, ""));
        let summary = summary.trim();

        let mut description = vec![summary.to_string()];
        let mut arguments = Vec::new();
        let mut examples = Vec::new();
        let mut paragraph = Paragraph::Description;
        while let Some(next) = lines.next_if(|next| !starts_lowercase(next)) {
            let next = next.trim();
            match next {
                "Arguments:" => paragraph = Paragraph::Arguments,
                "Examples:" => paragraph = Paragraph::Examples,
                _ => match paragraph {
                    Paragraph::Description => description.push(next.to_string()),
                    Paragraph::Arguments => arguments.push(next.to_string()),
                    Paragraph::Examples => examples.push(next.to_string()),
                },
            }
        }

        if is_denylisted(name) {
            continue;
        }
        let mut command = CommandNode::new(page.node.child_path(name));
        command.capsule = summary.to_string();
        set_paragraph(&mut command, "DESCRIPTION", &description);
        set_paragraph(&mut command, "ARGUMENTS", &arguments);
        set_paragraph(&mut command, "EXAMPLES", &examples);
        page.node.add_subcommand(command);
    }
    page
}

pub(crate) fn build(builder: &mut TreeBuilder<'_, '_>) -> Result<CommandNode> {
    let generator = builder.generator();
    let mut root = builder.expand(builder.root_path())?;

    let text = generator.run(&[generator.program(), "--help".to_string()])?;
    if let Some(section) = BqCollector::new(&text).collect(true) {
        add_flags(&mut root, Dialect::Bq, &section.content, true);
    }
    Ok(root)
}
