//! Help-text normalization shared by every node constructor.

/// Returns `text` dedented, with runs of two or more spaces after a
/// non-space character collapsed to one, and leading/trailing newlines
/// removed.
///
/// # Examples
///
/// ```
/// use cli_tree_core::normalize_space;
///
/// assert_eq!(normalize_space("    List   the\n    objects.\n"), "List the\nobjects.");
/// assert_eq!(normalize_space(""), "");
/// ```
pub fn normalize_space(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(leading_whitespace)
        .min()
        .unwrap_or(0);

    let dedented = text
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line.chars().skip(indent).collect()
            }
        })
        .collect::<Vec<String>>()
        .join("\n");

    let mut out = String::with_capacity(dedented.len());
    let mut prev: Option<char> = None;
    let mut chars = dedented.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ' ' && prev.is_some_and(|p| p != ' ') {
            while chars.peek() == Some(&' ') {
                chars.next();
            }
            out.push(' ');
            prev = Some(' ');
            continue;
        }
        out.push(ch);
        prev = Some(ch);
    }

    out.trim_matches('\n').to_string()
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|ch| ch.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedent_common_prefix() {
        assert_eq!(normalize_space("  a\n  b"), "a\nb");
        assert_eq!(normalize_space("  a\n    b"), "a\n b");
    }

    #[test]
    fn test_collapse_interior_runs() {
        assert_eq!(normalize_space("word    word  word"), "word word word");
    }

    #[test]
    fn test_single_spaces_untouched() {
        assert_eq!(normalize_space("a b c"), "a b c");
    }

    #[test]
    fn test_strip_outer_newlines() {
        assert_eq!(normalize_space("\n\ntext\n\n"), "text");
    }

    #[test]
    fn test_blank_lines_inside_kept() {
        assert_eq!(normalize_space("a\n   \nb"), "a\n\nb");
    }
}
