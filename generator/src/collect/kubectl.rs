//! `kubectl --help` collector.

use super::{LineCursor, Section, SectionCollector, finish_section, initial_heading, is_indented};

const USAGE_MARKER: &str = "Usage:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    FirstBlock,
    Trailer,
}

/// Splits `kubectl` help into `DESCRIPTION`, `COMMANDS`, `EXAMPLES`,
/// `FLAGS` and `USAGE` sections.
///
/// The text after `Usage:` is carried over as the first line of the `USAGE`
/// section unless headings are stripped.
#[derive(Debug)]
pub struct KubectlCollector {
    cursor: LineCursor,
    heading: Option<String>,
    lookahead: Option<String>,
    mode: Mode,
}

impl KubectlCollector {
    pub fn new(text: &str) -> Self {
        Self {
            cursor: LineCursor::new(text),
            heading: initial_heading(text, "DESCRIPTION"),
            lookahead: None,
            mode: Mode::FirstBlock,
        }
    }
}

impl SectionCollector for KubectlCollector {
    fn collect(&mut self, strip_headings: bool) -> Option<Section> {
        let heading = self.heading.take()?;
        let mut content = Vec::new();
        if let Some(lookahead) = self.lookahead.take() {
            if !strip_headings {
                content.push(lookahead);
            }
        }

        while let Some(line) = self.cursor.next_line() {
            if let Some(rest) = line.strip_prefix(USAGE_MARKER) {
                let rest = rest.trim();
                if !rest.is_empty() {
                    self.lookahead = Some(rest.to_string());
                }
                self.heading = Some("USAGE".to_string());
                break;
            }
            if line.ends_with(':') {
                let next = if line.contains("Commands") {
                    Some("COMMANDS")
                } else if line.contains("Examples") {
                    Some("EXAMPLES")
                } else if line.contains("Options") {
                    Some("FLAGS")
                } else {
                    None
                };
                if let Some(next) = next {
                    self.heading = Some(next.to_string());
                    break;
                }
            }
            if is_indented(&line) || (!strip_headings && self.mode == Mode::FirstBlock) {
                content.push(line.trim_end().to_string());
            }
        }

        self.mode = Mode::Trailer;
        Some(finish_section(heading, content))
    }
}
