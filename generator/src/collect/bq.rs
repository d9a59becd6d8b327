//! `bq help` collector.
//!
//! `bq` prints a single undivided document, so the first call returns
//! everything as `DESCRIPTION` and every later call ends the document.

use super::{LineCursor, Section, SectionCollector, finish_section, initial_heading, is_indented};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Unindented lines still belong to the document body.
    FirstBlock,
    /// The body was returned; unindented trailer lines are ignored.
    Trailer,
}

#[derive(Debug)]
pub struct BqCollector {
    cursor: LineCursor,
    heading: Option<String>,
    mode: Mode,
}

impl BqCollector {
    pub fn new(text: &str) -> Self {
        Self {
            cursor: LineCursor::new(text),
            heading: initial_heading(text, "DESCRIPTION"),
            mode: Mode::FirstBlock,
        }
    }
}

impl SectionCollector for BqCollector {
    fn collect(&mut self, strip_headings: bool) -> Option<Section> {
        let heading = self.heading.take()?;
        let mut content = Vec::new();
        while let Some(line) = self.cursor.next_line() {
            if is_indented(&line) || (!strip_headings && self.mode == Mode::FirstBlock) {
                content.push(line.trim_end().to_string());
            }
        }
        self.mode = Mode::Trailer;
        Some(finish_section(heading, content))
    }
}
