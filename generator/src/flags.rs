//! Flag and positional extraction from collected section content.
//!
//! A flags block is first split into entries: a line whose trimmed text
//! starts with `-` and that is indented no deeper than the block's first
//! content line opens an entry; deeper lines continue it. Each entry is then
//! parsed by the dialect's row grammar. An entry that does not fit the
//! grammar is appended to the description of the flag before it.

use std::sync::LazyLock;

use cli_tree_core::{CommandNode, FlagNode, PositionalNode, normalize_space};
use regex::Regex;
use tracing::debug;

use crate::registry::Dialect;

const TAB_WIDTH: usize = 8;
const CATEGORY_MARKER: &str = "### ";

// SAFETY: These regexes are compile-time constants and are validated by tests.
static DEFAULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\(default: (.*)\)\s*$").expect("static regex must compile")
});
static GSUTIL_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *((-[^ ]*,)* *(-[^ ]*) *)(.*)$").expect("static regex must compile")
});
static MAN_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}|\t").expect("static regex must compile"));
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\[)?(<[A-Za-z][\w-]*>|[A-Z][A-Z0-9_]*)(\.\.\.)?(\])?(\.\.\.)?$")
        .expect("static regex must compile")
});

/// One flag row plus its continuation lines.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FlagEntry {
    head: String,
    continuation: Vec<String>,
    category: String,
}

impl FlagEntry {
    /// Description text: the rest of the head row followed by every
    /// continuation line, joined with single spaces.
    fn description(&self, rest: &str) -> String {
        std::iter::once(rest.trim())
            .chain(self.continuation.iter().map(String::as_str))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|ch| ch.is_whitespace())
        .map(|ch| if ch == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

fn split_entries(content: &[String]) -> Vec<FlagEntry> {
    let mut entries: Vec<FlagEntry> = Vec::new();
    let mut base_indent: Option<usize> = None;
    let mut category = String::new();

    for line in content {
        if let Some(marker) = line.strip_prefix(CATEGORY_MARKER) {
            category = marker.trim().to_string();
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let indent = indent_width(line);
        let base = *base_indent.get_or_insert(indent);

        if trimmed.starts_with('-') && indent <= base {
            entries.push(FlagEntry {
                head: trimmed.to_string(),
                continuation: Vec::new(),
                category: category.clone(),
            });
        } else if let Some(entry) = entries.last_mut() {
            entry.continuation.push(trimmed.to_string());
        }
    }
    entries
}

/// Splits a trailing `(default: X)` off `description`.
fn extract_inline_default(description: &str) -> (String, String) {
    match DEFAULT_RE.captures(description) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let default = caps.get(1).map_or("", |m| m.as_str()).to_string();
            let mut stripped = description.to_string();
            stripped.replace_range(whole, "");
            (stripped, default)
        }
        None => (description.to_string(), String::new()),
    }
}

/// Parses every flag row in `content` and registers the flags on `node`.
///
/// Returns the number of flags registered.
pub fn add_flags(
    node: &mut CommandNode,
    dialect: Dialect,
    content: &[String],
    is_global: bool,
) -> usize {
    let mut added = 0;
    let mut previous: Vec<String> = Vec::new();
    for entry in split_entries(content) {
        let flags = match dialect {
            Dialect::Bq => parse_bq_entry(&entry),
            Dialect::Kubectl => parse_kubectl_entry(&entry),
            Dialect::Gsutil => parse_gsutil_entry(&entry),
            Dialect::ManPage => parse_man_entry(&entry),
        };
        if flags.is_empty() {
            merge_into_previous(node, &previous, &entry);
            continue;
        }
        previous.clear();
        for flag in flags {
            previous.push(flag.name.clone());
            node.add_flag(flag.global(is_global));
            added += 1;
        }
    }
    added
}

/// Appends an unparsable row to the description of the flags registered
/// from the preceding row.
fn merge_into_previous(node: &mut CommandNode, previous: &[String], entry: &FlagEntry) {
    if previous.is_empty() {
        debug!(row = %entry.head, "Dropping unparsable flag row before the first flag");
        return;
    }
    debug!(row = %entry.head, into = %previous[0], "Merging unparsable flag row");
    let text = entry.description(&entry.head);
    for name in previous {
        if let Some(flag) = node.flags.get_mut(name) {
            let merged = if flag.description.is_empty() {
                text.clone()
            } else {
                format!("{} {text}", flag.description)
            };
            flag.description = normalize_space(&merged);
        }
    }
}

fn parse_bq_entry(entry: &FlagEntry) -> Vec<FlagNode> {
    let Some((name, rest)) = entry.head.split_once(':') else {
        return Vec::new();
    };
    let (description, default) = extract_inline_default(&entry.description(rest));

    let flag = match name.trim().strip_prefix("--[no]") {
        Some(base) => FlagNode::boolean(&format!("--{base}")),
        None => FlagNode::with_value(name.trim(), "VALUE"),
    };
    vec![flag.with_description(&description).with_default(&default)]
}

/// Byte offset of the first `:` followed by whitespace or end of line.
fn kubectl_separator(head: &str) -> Option<usize> {
    head.match_indices(':')
        .map(|(idx, _)| idx)
        .find(|&idx| head[idx + 1..].chars().next().is_none_or(char::is_whitespace))
}

fn parse_kubectl_entry(entry: &FlagEntry) -> Vec<FlagNode> {
    let Some(split) = kubectl_separator(&entry.head) else {
        return Vec::new();
    };
    let (definition, rest) = (&entry.head[..split], &entry.head[split + 1..]);
    let Some(alias) = definition.split(", ").last().map(str::trim) else {
        return Vec::new();
    };
    let (description, inline_default) = extract_inline_default(&entry.description(rest));

    let flag = match alias.split_once('=') {
        None => FlagNode::boolean(alias),
        Some((name, "true" | "false")) => FlagNode::boolean(name),
        Some((name, value)) => FlagNode::with_value(name, "VALUE")
            .with_default(value.trim_matches(|ch| ch == '\'' || ch == '"')),
    };
    let flag = flag.with_description(&description);
    if inline_default.is_empty() {
        vec![flag]
    } else {
        vec![flag.with_default(&inline_default)]
    }
}

fn parse_gsutil_entry(entry: &FlagEntry) -> Vec<FlagNode> {
    let Some(caps) = GSUTIL_ROW_RE.captures(&entry.head) else {
        return Vec::new();
    };
    let Some(name) = caps.get(3).map(|m| m.as_str()) else {
        return Vec::new();
    };
    let rest = caps.get(4).map_or("", |m| m.as_str());
    vec![FlagNode::boolean(name).with_description(&entry.description(rest))]
}

/// Parses one man-page alias such as `--color[=WHEN]`, `--size=SIZE`,
/// `-n NUM` or `-a`.
fn parse_man_alias(alias: &str) -> Option<FlagNode> {
    let alias = alias.trim();
    if !alias.starts_with('-') {
        return None;
    }
    if let Some((name, meta)) = alias.split_once("[=") {
        return Some(FlagNode::with_value(name, meta.trim_end_matches(']')));
    }
    if let Some((name, meta)) = alias.split_once('=') {
        return Some(FlagNode::with_value(name, meta));
    }
    if let Some((name, meta)) = alias.split_once(' ') {
        return Some(FlagNode::with_value(name, meta.trim()));
    }
    Some(FlagNode::boolean(alias))
}

fn parse_man_entry(entry: &FlagEntry) -> Vec<FlagNode> {
    let (definition, rest) = match MAN_SPLIT_RE.find(&entry.head) {
        Some(m) => (&entry.head[..m.start()], &entry.head[m.end()..]),
        None => (entry.head.as_str(), ""),
    };
    let (description, default) = extract_inline_default(&entry.description(rest));

    let aliases: Vec<FlagNode> = definition.split(", ").filter_map(parse_man_alias).collect();
    // `-w, --width=COLS`: a bare alias takes the metavar of its sibling.
    let metavar = aliases
        .iter()
        .find(|flag| !flag.is_boolean())
        .map(|flag| flag.value.clone());

    aliases
        .into_iter()
        .map(|flag| match &metavar {
            Some(meta) if flag.is_boolean() => FlagNode::with_value(&flag.name, meta),
            _ => flag,
        })
        .map(|flag| {
            flag.with_description(&description)
                .with_default(&default)
                .with_category(&entry.category)
        })
        .collect()
}

/// Extracts positionals from the first line of a man-page SYNOPSIS.
///
/// Leading words matching `path` are skipped. Placeholders are uppercase
/// words or `<angle>` tokens, optionally bracketed and/or followed by `...`.
///
/// ```
/// use cli_tree_generator::flags::synopsis_positionals;
///
/// let path = vec!["cp".to_string()];
/// let lines = vec!["       cp [OPTION]... SOURCE DEST".to_string()];
/// let names: Vec<_> = synopsis_positionals(&path, &lines)
///     .into_iter()
///     .map(|p| (p.name, p.nargs))
///     .collect();
/// assert_eq!(
///     names,
///     vec![
///         ("SOURCE".to_string(), "1".to_string()),
///         ("DEST".to_string(), "1".to_string()),
///     ]
/// );
/// ```
pub fn synopsis_positionals(path: &[String], content: &[String]) -> Vec<PositionalNode> {
    let Some(first) = content.iter().find(|line| !line.trim().is_empty()) else {
        return Vec::new();
    };

    let mut words = first.split_whitespace().peekable();
    for command_word in path {
        if words.peek() == Some(&command_word.as_str()) {
            words.next();
        }
    }

    let mut positionals: Vec<PositionalNode> = Vec::new();
    for word in words {
        let Some(caps) = PLACEHOLDER_RE.captures(word) else {
            continue;
        };
        let optional = caps.get(1).is_some();
        if optional != caps.get(4).is_some() {
            continue;
        }
        let name = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .trim_start_matches('<')
            .trim_end_matches('>');
        if matches!(name, "OPTION" | "OPTIONS") || positionals.iter().any(|p| p.name == name) {
            continue;
        }
        let repeated = caps.get(3).is_some() || caps.get(5).is_some();
        let nargs = match (optional, repeated) {
            (true, true) => "*",
            (false, true) => "+",
            (true, false) => "?",
            (false, false) => "1",
        };
        positionals.push(PositionalNode::new(name, nargs));
    }
    positionals
}
