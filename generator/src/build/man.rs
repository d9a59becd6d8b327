//! Generic man page pages. Only the root command is documented.

use cli_tree_core::CommandNode;
use tracing::debug;

use super::{Page, TreeBuilder, capsule_text, section_title};
use crate::collect::{ManPageCollector, SectionCollector};
use crate::error::{GenerateError, Result};
use crate::flags::{add_flags, synopsis_positionals};
use crate::registry::Dialect;

const KEPT_SECTIONS: [&str; 3] = ["DESCRIPTION", "SEE ALSO", "EXIT STATUS"];

pub fn parse_page(path: &[String], text: &str) -> Page {
    let mut page = Page::new(path);
    let mut collector = ManPageCollector::new(text);

    while let Some(section) = collector.collect(false) {
        let heading = section_title(path, &section.heading);
        match heading {
            "NAME" => {
                if let Some(first) = section.content.first() {
                    page.node.capsule = capsule_text(first);
                }
            }
            "FLAGS" => {
                add_flags(&mut page.node, Dialect::ManPage, &section.content, false);
            }
            "SYNOPSIS" => {
                if page.node.positionals.is_empty() {
                    page.node.positionals = synopsis_positionals(path, &section.content);
                }
            }
            heading if KEPT_SECTIONS.contains(&heading) => {
                page.copy_section(heading, &section.content);
            }
            heading => {
                debug!(path = ?path, heading, "Dropping man page section");
            }
        }
    }
    page
}

pub(crate) fn build(builder: &mut TreeBuilder<'_, '_>) -> Result<CommandNode> {
    let command = builder.generator().cli_name().to_string();
    match builder.expand(builder.root_path()) {
        Ok(root) => Ok(root),
        Err(GenerateError::Subprocess { .. } | GenerateError::Terminated(_)) => {
            Err(GenerateError::UnsupportedCommand(command))
        }
        Err(err) => Err(err),
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
       List  information  about  the FILEs (the current directory by default).

       -a, --all
              do not ignore entries starting with .

       -w, --width=COLS
              set output width to COLS.  0 means no limit

   Exit status:
       0      if OK,

AUTHOR
       Written by Richard M. Stallman and David MacKenzie.

SEE ALSO
       dir(1), vdir(1)
";

    #[test]
    fn test_ls_page() {
        let page = parse_page(&["ls".to_string()], LS);
        let node = &page.node;
        assert!(page.children.is_empty());
        assert_eq!(node.capsule, "list directory contents");
        assert_eq!(node.positionals.len(), 1);
        assert_eq!(node.positionals[0].name, "FILE");
        assert_eq!(node.positionals[0].nargs, "*");

        assert!(node.flags["--all"].is_boolean());
        assert_eq!(node.flags["--width"].value, "COLS");
        assert_eq!(node.flags["-w"].description, "set output width to COLS. 0 means no limit");

        assert_eq!(
            node.sections["DESCRIPTION"],
            "List information about the FILEs (the current directory by default).\n\n0 if OK,"
        );
        assert_eq!(node.sections["SEE ALSO"], "dir(1), vdir(1)");
        assert!(!node.sections.contains_key("AUTHOR"));
    }

    #[test]
    fn test_page_without_name() {
        let page = parse_page(&["frob".to_string()], "No manual entry for frob\n");
        assert_eq!(page.node.capsule, "");
        assert!(page.node.sections.is_empty());
    }
}
