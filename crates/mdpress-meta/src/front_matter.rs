//! Front matter block detection.
//!
//! A front matter block starts at byte 0 with a line consisting of exactly
//! `---` and ends at the next line consisting of exactly `---`. Both
//! [`crate::extract_metadata`] and [`strip_front_matter`] go through
//! [`split_front_matter`], so they always agree on where the body begins.

/// The delimiter line that opens and closes a front matter block.
const DELIMITER: &str = "---";

/// A document split into its front matter and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// Lines between the delimiters (without the delimiters themselves).
    pub yaml: &'a str,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
}

/// Split a leading front matter block off `text`.
///
/// Returns `None` when the text does not start with a delimiter line or the
/// block is never closed. Lines may end in `\n` or `\r\n`; the closing
/// delimiter may also be the last line of the text without a line break.
#[must_use]
pub fn split_front_matter(text: &str) -> Option<FrontMatter<'_>> {
    let (first, mut rest_start) = next_line(text, 0)?;
    if first != DELIMITER {
        return None;
    }

    let yaml_start = rest_start;
    while let Some((line, next)) = next_line(text, rest_start) {
        if line == DELIMITER {
            return Some(FrontMatter {
                yaml: &text[yaml_start..rest_start],
                body: &text[next..],
            });
        }
        rest_start = next;
    }

    None
}

/// Remove a leading front matter block, returning the body.
///
/// Text without a front matter block is returned unchanged. Only the first
/// block is removed; a delimited block at the start of the body stays.
#[must_use]
pub fn strip_front_matter(text: &str) -> &str {
    split_front_matter(text).map_or(text, |fm| fm.body)
}

/// Read the line starting at byte `start`.
///
/// Returns the line without its terminator and the offset of the following
/// line, or `None` at end of input.
fn next_line(text: &str, start: usize) -> Option<(&str, usize)> {
    if start >= text.len() {
        return None;
    }
    let rest = &text[start..];
    let (line, consumed) = match rest.find('\n') {
        Some(pos) => (&rest[..pos], pos + 1),
        None => (rest, rest.len()),
    };
    Some((line.strip_suffix('\r').unwrap_or(line), start + consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_basic() {
        let text = "---\ntitle: Report\n---\n# Body\n";
        let fm = split_front_matter(text).unwrap();
        assert_eq!(fm.yaml, "title: Report\n");
        assert_eq!(fm.body, "# Body\n");
    }

    #[test]
    fn test_split_crlf() {
        let text = "---\r\ntitle: Report\r\n---\r\nBody";
        let fm = split_front_matter(text).unwrap();
        assert_eq!(fm.yaml, "title: Report\r\n");
        assert_eq!(fm.body, "Body");
    }

    #[test]
    fn test_split_empty_block() {
        let fm = split_front_matter("---\n---\nBody").unwrap();
        assert_eq!(fm.yaml, "");
        assert_eq!(fm.body, "Body");
    }

    #[test]
    fn test_split_closing_delimiter_at_eof() {
        let fm = split_front_matter("---\ntitle: X\n---").unwrap();
        assert_eq!(fm.yaml, "title: X\n");
        assert_eq!(fm.body, "");
    }

    #[test]
    fn test_no_block_when_not_at_start() {
        assert!(split_front_matter("\n---\ntitle: X\n---\n").is_none());
        assert!(split_front_matter("Intro\n---\ntitle: X\n---\n").is_none());
    }

    #[test]
    fn test_no_block_when_unclosed() {
        assert!(split_front_matter("---\ntitle: X\n# Heading\n").is_none());
    }

    #[test]
    fn test_delimiter_must_be_exact() {
        assert!(split_front_matter("----\ntitle: X\n----\n").is_none());
        assert!(split_front_matter("--- \ntitle: X\n---\n").is_none());
        // A longer rule inside the block does not close it
        let fm = split_front_matter("---\na: 1\n-----\nb: 2\n---\nBody").unwrap();
        assert_eq!(fm.yaml, "a: 1\n-----\nb: 2\n");
    }

    #[test]
    fn test_strip_without_block_is_identity() {
        let text = "# Title\n\nParagraph\n";
        assert_eq!(strip_front_matter(text), text);
        assert_eq!(strip_front_matter(""), "");
    }

    #[test]
    fn test_strip_removes_delimiters_and_interior() {
        let text = "---\ntitle: Secret Title\nauthor: Ann\n---\nVisible body\n";
        let body = strip_front_matter(text);
        assert_eq!(body, "Visible body\n");
        assert!(!body.contains("---"));
        assert!(!body.contains("Secret Title"));
    }

    #[test]
    fn test_strip_is_idempotent() {
        let inputs = [
            "---\ntitle: A\n---\n# Heading\n\nText",
            "No front matter at all",
            "---\nunclosed\n",
            "",
        ];
        for input in inputs {
            let once = strip_front_matter(input);
            assert_eq!(strip_front_matter(once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_strip_removes_only_first_block() {
        // A body that itself opens with a delimited block is body text, so a
        // second strip removes it. Only the leading block is front matter.
        let input = "---\ntitle: A\n---\n---\nnot: metadata\n---\nBody\n";
        let once = strip_front_matter(input);
        assert_eq!(once, "---\nnot: metadata\n---\nBody\n");
        assert_eq!(strip_front_matter(once), "Body\n");
    }

    #[test]
    fn test_horizontal_rule_in_body_untouched() {
        let text = "Paragraph\n\n---\n\nMore";
        assert_eq!(strip_front_matter(text), text);
    }
}
