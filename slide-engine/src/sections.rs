//! Header-delimited section splitting.
//!
//! A section starts at a header line (a line whose first non-blank character
//! is `#`) and runs up to the line before the next header. Lines before the
//! first header form a section of their own. Sections are borrowed slices of
//! the input, and joining them back with `\n` reproduces the input exactly.

/// Split `input` into sections.
pub fn split_sections(input: &str) -> Sections<'_> {
    Sections { rest: Some(input) }
}

/// Lazy iterator over the sections of a document.
#[derive(Debug, Clone)]
pub struct Sections<'a> {
    rest: Option<&'a str>,
}

impl<'a> Iterator for Sections<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let text = self.rest?;

        // The first line always belongs to the current section, header or not.
        let Some(mut newline) = text.find('\n') else {
            self.rest = None;
            return Some(text);
        };

        loop {
            let line_start = newline + 1;
            let line_end = text[line_start..].find('\n').map(|i| line_start + i);
            let line = &text[line_start..line_end.unwrap_or(text.len())];

            if is_header_line(line) {
                self.rest = Some(&text[line_start..]);
                return Some(&text[..newline]);
            }

            match line_end {
                Some(end) => newline = end,
                None => {
                    self.rest = None;
                    return Some(text);
                }
            }
        }
    }
}

/// True if `line` opens a new section.
pub fn is_header_line(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sections(input: &str) -> Vec<&str> {
        split_sections(input).collect()
    }

    #[test]
    fn splits_at_each_header() {
        let input = "## Header 1\n\nThis is a paragraph.\n\n### Header 2\n\nThis is another paragraph.\n";
        assert_eq!(
            sections(input),
            vec![
                "## Header 1\n\nThis is a paragraph.\n",
                "### Header 2\n\nThis is another paragraph.\n",
            ]
        );
    }

    #[test]
    fn no_headers_yields_whole_document() {
        let input = "just some\ntext\n";
        assert_eq!(sections(input), vec![input]);
    }

    #[test]
    fn empty_input_yields_one_empty_section() {
        assert_eq!(sections(""), vec![""]);
    }

    #[test]
    fn preamble_before_first_header_is_its_own_section() {
        let input = "intro\n# Title\nbody";
        assert_eq!(sections(input), vec!["intro", "# Title\nbody"]);
    }

    #[test]
    fn indented_header_still_splits() {
        let input = "a\n   # b\nc";
        assert_eq!(sections(input), vec!["a", "   # b\nc"]);
    }

    #[test]
    fn consecutive_headers_each_get_a_section() {
        let input = "# A\n## B\n## C";
        assert_eq!(sections(input), vec!["# A", "## B", "## C"]);
    }

    #[test]
    fn trailing_header_line_is_emitted() {
        let input = "text\n# Last";
        assert_eq!(sections(input), vec!["text", "# Last"]);
    }

    #[test]
    fn joining_reproduces_input() {
        let input = "\n# A\n\nx\n  ## B\ny\n\n";
        assert_eq!(sections(input).join("\n"), input);
    }
}
