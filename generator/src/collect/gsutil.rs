//! `gsutil` help collector.
//!
//! `gsutil` prints three page layouts: the root command listing, man-style
//! command pages, and man-style topic pages. The layout is fixed by the first
//! marker line and never changes afterwards, except that an `OVERVIEW`
//! heading turns a command page into a topic page.

use super::{
    LineCursor, Section, SectionCollector, finish_section, heading_without_first_word,
    initial_heading, starts_uppercase,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageType {
    Unknown,
    Root,
    Man,
    Topic,
}

#[derive(Debug)]
pub struct GsutilCollector {
    cursor: LineCursor,
    heading: Option<String>,
    page_type: PageType,
}

impl GsutilCollector {
    pub fn new(text: &str) -> Self {
        Self {
            cursor: LineCursor::new(text),
            heading: initial_heading(text, "CAPSULE"),
            page_type: PageType::Unknown,
        }
    }
}

impl SectionCollector for GsutilCollector {
    fn collect(&mut self, strip_headings: bool) -> Option<Section> {
        let mut heading = self.heading.take()?;
        let mut content = Vec::new();

        while let Some(line) = self.cursor.next_line() {
            let indented = line.starts_with(' ');
            match self.page_type {
                PageType::Unknown => {
                    if line.starts_with("Usage:") {
                        self.page_type = PageType::Root;
                        continue;
                    }
                    if line == "NAME" {
                        self.page_type = PageType::Man;
                        heading = "CAPSULE".to_string();
                        continue;
                    }
                    if !indented {
                        continue;
                    }
                }
                PageType::Root => {
                    if line == "Available commands:" {
                        heading = "COMMANDS".to_string();
                        continue;
                    }
                    if line == "Additional help topics:" {
                        self.heading = Some("TOPICS".to_string());
                        break;
                    }
                    if !indented {
                        continue;
                    }
                }
                PageType::Man => {
                    if line == "OVERVIEW" {
                        self.page_type = PageType::Topic;
                        self.heading = Some("DESCRIPTION".to_string());
                        break;
                    }
                    if line == "SYNOPSIS" {
                        self.heading = Some(line);
                        break;
                    }
                    if line.ends_with("OPTIONS") {
                        self.heading = Some("FLAGS".to_string());
                        break;
                    }
                    if starts_uppercase(&line) {
                        self.heading = Some(heading_without_first_word(&line));
                        break;
                    }
                }
                PageType::Topic => {
                    if starts_uppercase(&line) {
                        self.heading = Some(line);
                        break;
                    }
                }
            }
            if indented || !strip_headings {
                content.push(line.trim_end().to_string());
            }
        }

        Some(finish_section(heading, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(text: &str) -> Vec<Section> {
        let mut collector = GsutilCollector::new(text);
        std::iter::from_fn(|| collector.collect(false)).collect()
    }

    #[test]
    fn test_empty_input_has_no_sections() {
        assert!(GsutilCollector::new("").collect(false).is_none());
    }

    #[test]
    fn test_root_page() {
        let text = "\
Usage: gsutil [-D] [-DD] [-h header]... [-m] [-o] [-q] [command [opts...] args...]
Available commands:
  acl             Get, set, or change bucket and/or object ACLs
  cp              Copy files and objects

Additional help topics:
  acls            Working With Access Control Lists
";
        let sections = sections(text);
        assert_eq!(sections[0].heading, "COMMANDS");
        assert_eq!(sections[0].content.len(), 2);
        assert_eq!(sections[1].heading, "TOPICS");
        assert_eq!(
            sections[1].content,
            ["  acls            Working With Access Control Lists"]
        );
    }

    #[test]
    fn test_man_page_headings() {
        let text = "\
NAME
  cp - Copy files and objects

SYNOPSIS
  gsutil cp [OPTION]... src_url dst_url

CHANGING TEMP DIRECTORIES
  gsutil writes data to a temporary directory.

OPTIONS
  -r          Copy recursively.
";
        let sections = sections(text);
        let names: Vec<_> = sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(names, ["CAPSULE", "SYNOPSIS", "TEMP DIRECTORIES", "FLAGS"]);
        assert_eq!(sections[0].content, ["  cp - Copy files and objects"]);
    }

    #[test]
    fn test_overview_switches_to_topic_page() {
        let text = "\
NAME
  acls - Working With Access Control Lists

OVERVIEW
  Access Control Lists let you control access.

Bucket-Level ACLs
  Buckets have ACLs too.
";
        let sections = sections(text);
        let names: Vec<_> = sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(names, ["CAPSULE", "DESCRIPTION", "Bucket-Level ACLs"]);
    }
}
