//! Generic `man` page collector.
//!
//! Headings are unindented lines. Content is indented by a common amount,
//! computed from the first indented line; less indented lines inside a
//! section are subsection markers and come back as `### <text>`.

use std::sync::LazyLock;

use regex::Regex;

use super::{
    LineCursor, Section, SectionCollector, finish_section, heading_without_first_word,
    starts_uppercase, strip_terminal_formatting,
};

const CANONICAL_HEADINGS: [&str; 4] = ["SYNOPSIS", "DESCRIPTION", "EXIT STATUS", "SEE ALSO"];

// SAFETY: This regex is a compile-time constant and is validated by tests.
static HYPHENATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\x{2010}|\\u2010)\n *").expect("static regex must compile")
});

#[derive(Debug)]
pub struct ManPageCollector {
    cursor: LineCursor,
    heading: Option<String>,
    content_indent: Option<usize>,
}

impl ManPageCollector {
    pub fn new(text: &str) -> Self {
        let cleaned = strip_terminal_formatting(text);
        let joined = HYPHENATION_RE.replace_all(&cleaned, "");
        Self {
            cursor: LineCursor::new(&joined),
            heading: None,
            content_indent: None,
        }
    }
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

impl SectionCollector for ManPageCollector {
    /// Man pages have no stripped form; `strip_headings` is ignored.
    fn collect(&mut self, _strip_headings: bool) -> Option<Section> {
        let mut heading = self.heading.take();
        let mut content = Vec::new();

        while let Some(mut line) = self.cursor.next_line() {
            if heading.is_none() {
                // No NAME, no man page.
                if line == "NAME" {
                    heading = Some(line);
                }
                continue;
            }
            let current = heading.as_deref().unwrap_or_default();

            if line.is_empty() {
                // Blank lines are kept and trimmed from the block edges.
            } else if line.starts_with(' ') {
                let indent = *self.content_indent.get_or_insert_with(|| leading_spaces(&line));
                if line.len() > indent {
                    if leading_spaces(&line) < indent {
                        line = format!("### {}", line.trim());
                    } else {
                        let indented_char = line[indent..].chars().next().unwrap_or(' ');
                        if current == "DESCRIPTION" && indented_char == '-' {
                            // Flags listed inline in DESCRIPTION, as GNU ls(1) does.
                            self.cursor.push_back(line);
                            self.heading = Some("FLAGS".to_string());
                            break;
                        }
                        if current == "FLAGS" && indented_char != ' ' && indented_char != '-' {
                            self.cursor.push_back(line);
                            self.heading = Some("DESCRIPTION".to_string());
                            break;
                        }
                    }
                }
            } else if CANONICAL_HEADINGS.contains(&line.as_str()) {
                self.heading = Some(line);
                break;
            } else if line.contains("FLAGS") || line.contains("OPTIONS") {
                self.heading = Some("FLAGS".to_string());
                break;
            } else if starts_uppercase(&line) {
                self.heading = Some(heading_without_first_word(&line));
                break;
            }
            content.push(line.trim_end().to_string());
        }

        heading.map(|heading| finish_section(heading, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LS: &str = "\
LS(1)                     User Commands                    LS(1)

NAME
       ls - list directory contents

SYNOPSIS
       ls [OPTION]... [FILE]...

DESCRIPTION
       List information about the FILEs (the current directory by default).

       Mandatory arguments to long options are mandatory for short options too.

       -a, --all
              do not ignore entries starting with .

       --block-size=SIZE
              with -l, scale sizes by SIZE when printing them

   Exit status:
       0      if OK,

AUTHOR
       Written by Richard M. Stallman and David MacKenzie.
";

    fn sections(text: &str) -> Vec<Section> {
        let mut collector = ManPageCollector::new(text);
        std::iter::from_fn(|| collector.collect(false)).collect()
    }

    #[test]
    fn test_empty_input_has_no_sections() {
        assert!(ManPageCollector::new("").collect(false).is_none());
    }

    #[test]
    fn test_no_name_no_man_page() {
        assert!(ManPageCollector::new("No manual entry for frob\n").collect(false).is_none());
    }

    #[test]
    fn test_inline_flags_in_description_are_reclassified() {
        let sections = sections(LS);
        let names: Vec<_> = sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(
            names,
            ["NAME", "SYNOPSIS", "DESCRIPTION", "FLAGS", "DESCRIPTION", "AUTHOR"]
        );
        assert_eq!(sections[0].content, ["       ls - list directory contents"]);

        let flags = &sections[3];
        assert_eq!(flags.content[0], "       -a, --all");
        assert!(flags.content.iter().any(|l| l == "       --block-size=SIZE"));
        assert!(flags.content.iter().any(|l| l == "### Exit status:"));
        assert_eq!(sections[4].content, ["       0      if OK,"]);
    }

    #[test]
    fn test_overstrike_and_hyphenation_are_cleaned() {
        let text = "N\x08NA\x08AM\x08ME\x08E\n       frob - frobnicate the wid\u{2010}\n       gets\n";
        let sections = sections(text);
        assert_eq!(sections[0].heading, "NAME");
        assert_eq!(sections[0].content, ["       frob - frobnicate the widgets"]);
    }

    #[test]
    fn test_options_heading_maps_to_flags() {
        let text = "NAME\n       x - y\nGLOBAL OPTIONS\n       -v     verbose\n";
        let sections = sections(text);
        assert_eq!(sections[1].heading, "FLAGS");
    }
}
