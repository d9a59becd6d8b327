//! Recursive command tree construction.
//!
//! Each dialect parses one captured page into a [`Page`], a pure function of
//! the text. [`TreeBuilder`] drives the depth-first traversal: it runs the
//! tool for a path, parses the page and recurses into the discovered
//! children. A visited set keeps any path from being expanded twice and a
//! node budget stops runaway expansion.

pub mod bq;
pub mod gsutil;
pub mod kubectl;
pub mod man;

use std::collections::HashSet;

use cli_tree_core::{CommandNode, normalize_space};
use tracing::debug;

use crate::error::{GenerateError, Result};
use crate::registry::{CliTreeGenerator, Dialect};

/// Default cap on the number of commands expanded for one root.
pub const DEFAULT_MAX_NODES: usize = 4096;

/// Subcommands that are never enumerated.
pub const DENYLIST: &[&str] = &["update"];

/// Returns `true` if `name` must not appear as a subcommand.
pub fn is_denylisted(name: &str) -> bool {
    DENYLIST.contains(&name)
}

/// One parsed help page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// The command described by the page, without expanded children.
    pub node: CommandNode,
    /// Subcommand names to expand, in discovery order.
    pub children: Vec<String>,
    /// Help topic names announced by the page.
    pub topics: Vec<String>,
}

impl Page {
    pub fn new(path: &[String]) -> Self {
        Self {
            node: CommandNode::new(path.to_vec()),
            children: Vec::new(),
            topics: Vec::new(),
        }
    }

    /// Queues `name` for expansion unless it is denylisted or already queued.
    pub(crate) fn push_child(&mut self, name: &str) {
        if is_denylisted(name) {
            debug!(path = ?self.node.path, name, "Skipping denylisted subcommand");
            return;
        }
        if !self.children.iter().any(|child| child == name) {
            self.children.push(name.to_string());
        }
    }

    pub(crate) fn push_topic(&mut self, name: &str) {
        if !is_denylisted(name) && !self.topics.iter().any(|topic| topic == name) {
            self.topics.push(name.to_string());
        }
    }

    /// Copies a section into the node, normalized. A heading that names the
    /// command itself is stored as `DESCRIPTION`.
    pub(crate) fn copy_section(&mut self, heading: &str, content: &[String]) {
        let heading = section_title(&self.node.path, heading);
        self.node
            .append_section(heading, normalize_space(&content.join("\n")));
    }
}

/// Returns `DESCRIPTION` for a heading equal to the last path word, ignoring
/// case; otherwise the heading itself.
pub fn section_title<'a>(path: &[String], heading: &'a str) -> &'a str {
    match path.last() {
        Some(last) if last.eq_ignore_ascii_case(heading) => "DESCRIPTION",
        _ => heading,
    }
}

/// Text after the first `-` of a `name - summary` line.
pub(crate) fn capsule_text(line: &str) -> String {
    line.split_once('-')
        .map_or(line, |(_, summary)| summary)
        .trim()
        .to_string()
}

/// First whitespace-separated word of every non-blank line.
pub(crate) fn first_words(content: &[String]) -> impl Iterator<Item = &str> {
    content
        .iter()
        .filter_map(|line| line.split_whitespace().next())
}

/// Parses one captured page of `dialect` for the command at `path`.
///
/// No subprocess is run; children are returned unexpanded.
pub fn parse_page(dialect: Dialect, path: &[String], text: &str) -> Page {
    match dialect {
        Dialect::Bq => bq::parse_page(path, text),
        Dialect::Gsutil => gsutil::parse_page(path, text),
        Dialect::Kubectl => kubectl::parse_page(path, text),
        Dialect::ManPage => man::parse_page(path, text),
    }
}

/// Depth-first traversal state for one root command.
pub(crate) struct TreeBuilder<'g, 'r> {
    generator: &'g CliTreeGenerator<'r>,
    visited: HashSet<Vec<String>>,
    topics: Vec<String>,
}

impl<'g, 'r> TreeBuilder<'g, 'r> {
    pub(crate) fn new(generator: &'g CliTreeGenerator<'r>) -> Self {
        Self {
            generator,
            visited: HashSet::new(),
            topics: Vec::new(),
        }
    }

    pub(crate) fn generator(&self) -> &'g CliTreeGenerator<'r> {
        self.generator
    }

    /// Builds the complete tree for the generator's root command.
    pub(crate) fn build(mut self) -> Result<CommandNode> {
        match self.generator.dialect() {
            Dialect::Bq => bq::build(&mut self),
            Dialect::Gsutil => gsutil::build(&mut self),
            Dialect::Kubectl => kubectl::build(&mut self),
            Dialect::ManPage => man::build(&mut self),
        }
    }

    /// Topic names collected from every page expanded so far.
    pub(crate) fn take_topics(&mut self) -> Vec<String> {
        std::mem::take(&mut self.topics)
    }

    pub(crate) fn root_path(&self) -> Vec<String> {
        vec![self.generator.cli_name().to_string()]
    }

    /// Command line that prints the help page for `path`.
    fn help_argv(&self, path: &[String]) -> Vec<String> {
        let program = self.generator.program();
        let rest = path.iter().skip(1).cloned();
        match self.generator.dialect() {
            Dialect::Bq => std::iter::once(program)
                .chain(std::iter::once("help".to_string()))
                .chain(rest)
                .collect(),
            Dialect::Gsutil if gsutil::is_help_path(path) => {
                std::iter::once(program).chain(rest).collect()
            }
            Dialect::Gsutil | Dialect::Kubectl => std::iter::once(program)
                .chain(rest)
                .chain(std::iter::once("--help".to_string()))
                .collect(),
            Dialect::ManPage => std::iter::once("man".to_string())
                .chain(path.iter().cloned())
                .collect(),
        }
    }

    /// Expands `path` and every child it announces.
    pub(crate) fn expand(&mut self, path: Vec<String>) -> Result<CommandNode> {
        self.visited.insert(path.clone());
        if self.visited.len() > self.generator.max_nodes() {
            return Err(GenerateError::NodeLimitExceeded {
                command: self.generator.cli_name().to_string(),
                limit: self.generator.max_nodes(),
            });
        }

        debug!(path = ?path, "Expanding command");
        let text = self.generator.run(&self.help_argv(&path))?;
        let page = parse_page(self.generator.dialect(), &path, &text);
        for topic in page.topics {
            if !self.topics.contains(&topic) {
                self.topics.push(topic);
            }
        }

        let mut node = page.node;
        for name in page.children {
            if let Some(child) = self.expand_child(node.child_path(&name))? {
                node.add_subcommand(child);
            }
        }
        Ok(node)
    }

    /// Expands `path` unless it was already expanded in this build.
    pub(crate) fn expand_child(&mut self, path: Vec<String>) -> Result<Option<CommandNode>> {
        if self.visited.contains(&path) {
            debug!(path = ?path, "Skipping already expanded command");
            return Ok(None);
        }
        self.expand(path).map(Some)
    }
}
