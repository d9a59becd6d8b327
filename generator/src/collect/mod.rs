//! Section collectors for captured help and man documents.
//!
//! A collector is a small pull-based scanner over one captured document.
//! Each call to [`SectionCollector::collect`] consumes lines up to the next
//! recognized heading and returns the finished [`Section`]; `None` marks the
//! end of the document. Every dialect keeps its parsing state in an explicit
//! mode enum and reads lines through a [`LineCursor`] with a one-slot
//! pushback buffer.

mod bq;
mod gsutil;
mod kubectl;
mod man;

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;

pub use bq::BqCollector;
pub use gsutil::GsutilCollector;
pub use kubectl::KubectlCollector;
pub use man::ManPageCollector;

/// One heading and its content lines, with surrounding blank lines trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub content: Vec<String>,
}

/// Pull-based section scanner over one captured document.
pub trait SectionCollector {
    /// Returns the next section, or `None` at the end of the document.
    ///
    /// With `strip_headings`, dialects that support it keep only indented
    /// content lines.
    fn collect(&mut self, strip_headings: bool) -> Option<Section>;
}

/// Line queue with a single pushback slot.
#[derive(Debug)]
pub(crate) struct LineCursor {
    lines: VecDeque<String>,
    pushed_back: Option<String>,
}

impl LineCursor {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            lines: text
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
                .collect(),
            pushed_back: None,
        }
    }

    pub(crate) fn next_line(&mut self) -> Option<String> {
        self.pushed_back.take().or_else(|| self.lines.pop_front())
    }

    /// Returns `line` to the cursor so the next read yields it again.
    pub(crate) fn push_back(&mut self, line: String) {
        debug_assert!(self.pushed_back.is_none(), "pushback slot already full");
        self.pushed_back = Some(line);
    }
}

/// Returns `true` for lines starting with a space or tab.
pub(crate) fn is_indented(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}

/// Returns `true` for lines whose first character is uppercase.
pub(crate) fn starts_uppercase(line: &str) -> bool {
    line.chars().next().is_some_and(char::is_uppercase)
}

/// Drops the first word of a multi-word heading (`"CHANGING TEMP DIRS"` ->
/// `"TEMP DIRS"`); single words are returned unchanged.
pub(crate) fn heading_without_first_word(line: &str) -> String {
    line.split_once(' ')
        .map_or(line, |(_, rest)| rest)
        .to_string()
}

/// Initial heading for a collector, absent for a blank document.
pub(crate) fn initial_heading(text: &str, heading: &str) -> Option<String> {
    (!text.trim().is_empty()).then(|| heading.to_string())
}

/// Builds a section with leading and trailing blank lines removed.
pub(crate) fn finish_section(heading: String, mut content: Vec<String>) -> Section {
    while content.first().is_some_and(|line| line.is_empty()) {
        content.remove(0);
    }
    while content.last().is_some_and(|line| line.is_empty()) {
        content.pop();
    }
    Section { heading, content }
}

/// Removes ANSI escapes and overstrike sequences from captured output.
pub fn strip_terminal_formatting(raw: &str) -> String {
    // SAFETY: These regexes are compile-time constants and are validated by tests.
    static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("static regex must compile")
    });
    static OVERSTRIKE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r".\x08").expect("static regex must compile"));

    let mut cleaned = ANSI_RE.replace_all(raw, "").into_owned();
    while OVERSTRIKE_RE.is_match(&cleaned) {
        cleaned = OVERSTRIKE_RE.replace_all(&cleaned, "").into_owned();
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_pushback_is_read_first() {
        let mut cursor = LineCursor::new("a\nb");
        let first = cursor.next_line().unwrap();
        cursor.push_back(first);
        assert_eq!(cursor.next_line().as_deref(), Some("a"));
        assert_eq!(cursor.next_line().as_deref(), Some("b"));
        assert_eq!(cursor.next_line(), None);
    }

    #[test]
    fn test_cursor_strips_carriage_returns() {
        let mut cursor = LineCursor::new("a\r\nb");
        assert_eq!(cursor.next_line().as_deref(), Some("a"));
    }

    #[test]
    fn test_finish_section_trims_blank_lines() {
        let section = finish_section(
            "FLAGS".to_string(),
            vec![String::new(), "x".to_string(), String::new(), "y".to_string(), String::new()],
        );
        assert_eq!(section.content, vec!["x", "", "y"]);
    }

    #[test]
    fn test_heading_without_first_word() {
        assert_eq!(heading_without_first_word("CHANGING TEMP DIRECTORIES"), "TEMP DIRECTORIES");
        assert_eq!(heading_without_first_word("AUTHOR"), "AUTHOR");
    }

    #[test]
    fn test_strip_terminal_formatting() {
        assert_eq!(strip_terminal_formatting("\x1b[1mNAME\x1b[0m"), "NAME");
        assert_eq!(strip_terminal_formatting("N\x08NA\x08AM\x08ME\x08E"), "NAME");
        assert_eq!(strip_terminal_formatting("_\x08l_\x08s"), "ls");
    }
}
