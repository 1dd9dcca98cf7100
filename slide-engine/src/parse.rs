use tracing::debug;

use crate::blocks::{
    BlockParser, BlockquoteParser, BulletListParser, CodeBlockParser, EndLine, HeaderParser,
    HorizontalRuleParser, NumberedListParser, TableParser, TaskListParser, TitleParser,
};
use crate::sections::split_sections;
use crate::types::{BlockKind, TextBlock};
use crate::wrap::wrap_chars;

/// Options for the paragraph fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Wrap plain lines to this many characters. `None` keeps each line whole.
    pub max_line_chars: Option<usize>,
}

/// Parser activation order. Overlapping predicates are resolved by position:
/// `##` before `#`, and `- [ ]` before `- `.
pub const PRIORITY: [BlockKind; 9] = [
    BlockKind::Code,
    BlockKind::Table,
    BlockKind::Header,
    BlockKind::Title,
    BlockKind::TaskList,
    BlockKind::BulletList,
    BlockKind::NumberedList,
    BlockKind::Blockquote,
    BlockKind::HorizontalRule,
];

/// Parse a whole document into one ordered block stream.
///
/// This function never fails: every line lands in some block, with plain
/// paragraphs as the fallback.
pub fn parse(input: &str, options: &ParseOptions) -> Vec<TextBlock> {
    parse_sections(input, options).into_iter().flatten().collect()
}

/// Parse a document into per-section block lists.
pub fn parse_sections(input: &str, options: &ParseOptions) -> Vec<Vec<TextBlock>> {
    // Normalise CRLF → LF.
    let normalised = input.replace("\r\n", "\n");
    let mut assembler = BlockAssembler::new(*options);

    split_sections(&normalised)
        .map(|section| assembler.parse_section(section))
        .collect()
}

/// The full parser set, one instance of each construct.
#[derive(Debug, Default)]
pub struct ParserSet {
    code: CodeBlockParser,
    table: TableParser,
    header: HeaderParser,
    title: TitleParser,
    task_list: TaskListParser,
    bullet_list: BulletListParser,
    numbered_list: NumberedListParser,
    blockquote: BlockquoteParser,
    horizontal_rule: HorizontalRuleParser,
}

impl ParserSet {
    /// The parser responsible for `kind`. Paragraphs have no parser.
    pub fn get_mut(&mut self, kind: BlockKind) -> Option<&mut dyn BlockParser> {
        match kind {
            BlockKind::Code => Some(&mut self.code),
            BlockKind::Table => Some(&mut self.table),
            BlockKind::Header => Some(&mut self.header),
            BlockKind::Title => Some(&mut self.title),
            BlockKind::TaskList => Some(&mut self.task_list),
            BlockKind::BulletList => Some(&mut self.bullet_list),
            BlockKind::NumberedList => Some(&mut self.numbered_list),
            BlockKind::Blockquote => Some(&mut self.blockquote),
            BlockKind::HorizontalRule => Some(&mut self.horizontal_rule),
            BlockKind::Paragraph => None,
        }
    }
}

/// Drives the parser set over the lines of a section.
///
/// At most one parser is active at a time; while one is active no other
/// parser looks at the line.
#[derive(Debug, Default)]
pub struct BlockAssembler {
    parsers: ParserSet,
    active: Option<BlockKind>,
    options: ParseOptions,
}

impl BlockAssembler {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Kind of the currently active parser, if any.
    pub fn active(&self) -> Option<BlockKind> {
        self.active
    }

    /// Parse one section. Any construct still open at the end of the
    /// section is flushed as a (possibly partial) block.
    pub fn parse_section(&mut self, section: &str) -> Vec<TextBlock> {
        let mut blocks = Vec::new();
        for line in section.split('\n') {
            self.feed_line(line, &mut blocks);
        }
        self.flush(&mut blocks);
        blocks
    }

    /// Feed a single line, appending any completed blocks to `out`.
    pub fn feed_line(&mut self, line: &str, out: &mut Vec<TextBlock>) {
        if let Some(kind) = self.active {
            if let Some(parser) = self.parsers.get_mut(kind) {
                if !parser.is_end_line(line) {
                    parser.parse(line);
                    return;
                }

                let end = parser.end_line();
                if end == EndLine::Inclusive {
                    parser.parse(line);
                }
                out.push(parser.get_block());
                parser.reset();
                self.active = None;

                if end == EndLine::Inclusive {
                    return;
                }
            }
            self.active = None;
        }

        self.start_line(line, out);
    }

    /// Emit whatever the active parser holds. No-op when nothing is active.
    pub fn flush(&mut self, out: &mut Vec<TextBlock>) {
        let Some(kind) = self.active.take() else {
            return;
        };
        if let Some(parser) = self.parsers.get_mut(kind) {
            debug!(%kind, "flushing unterminated block at section end");
            out.push(parser.get_block());
            parser.reset();
        }
    }

    /// Classify a line while no parser is active.
    fn start_line(&mut self, line: &str, out: &mut Vec<TextBlock>) {
        for kind in PRIORITY {
            let Some(parser) = self.parsers.get_mut(kind) else {
                continue;
            };
            if !parser.is_start_line(line) {
                continue;
            }

            parser.parse(line);
            // One-line constructs end on the line that opened them.
            if parser.is_end_line(line) {
                out.push(parser.get_block());
                parser.reset();
            } else {
                debug!(kind = %parser.kind(), "opened block");
                self.active = Some(parser.kind());
            }
            return;
        }

        out.extend(
            wrap_chars(line, self.options.max_line_chars)
                .into_iter()
                .map(|text| TextBlock::new(BlockKind::Paragraph, text)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(kind: BlockKind, data: &str) -> TextBlock {
        TextBlock::new(kind, data)
    }

    fn parse_default(input: &str) -> Vec<TextBlock> {
        parse(input, &ParseOptions::default())
    }

    #[test]
    fn every_parser_reports_the_kind_it_is_filed_under() {
        let mut set = ParserSet::default();
        for kind in PRIORITY {
            let parser = set.get_mut(kind).unwrap();
            assert_eq!(parser.kind(), kind);
        }
        assert!(set.get_mut(BlockKind::Paragraph).is_none());
    }

    #[test]
    fn end_to_end_document() {
        let input = "# Title\n\n## Sec\n\nSome text.\n\n- item1\n- item2\n";
        assert_eq!(
            parse_default(input),
            vec![
                block(BlockKind::Title, "Title"),
                block(BlockKind::Header, "Sec"),
                block(BlockKind::Paragraph, "Some text."),
                block(BlockKind::BulletList, "item1\nitem2"),
            ]
        );
    }

    #[test]
    fn sections_are_kept_apart() {
        let input = "## Header 1\n\nThis is a paragraph.\n\n### Header 2\n\nThis is another paragraph.\n\n* Bullet 1\n* Bullet 2\n* Bullet 3\n";
        assert_eq!(
            parse_sections(input, &ParseOptions::default()),
            vec![
                vec![
                    block(BlockKind::Header, "Header 1"),
                    block(BlockKind::Paragraph, "This is a paragraph."),
                ],
                vec![
                    block(BlockKind::Header, "Header 2"),
                    block(BlockKind::Paragraph, "This is another paragraph."),
                    block(BlockKind::BulletList, "Bullet 1\nBullet 2\nBullet 3"),
                ],
            ]
        );
    }

    #[test]
    fn code_block_keeps_fences_and_content() {
        let input = "# Code\n```python\nx = 1\n\n- not a list\n```\nafter";
        assert_eq!(
            parse_default(input),
            vec![
                block(BlockKind::Title, "Code"),
                block(BlockKind::Code, "```python\nx = 1\n\n- not a list\n```"),
                block(BlockKind::Paragraph, "after"),
            ]
        );
    }

    #[test]
    fn header_line_inside_fence_splits_the_section() {
        // The `#` line splits the section, so the fence is flushed first.
        let input = "```\nprint(1)\n# comment\n```";
        let blocks = parse_default(input);
        assert_eq!(blocks[0], block(BlockKind::Code, "```\nprint(1)"));
        assert_eq!(blocks[1], block(BlockKind::Title, "comment"));
    }

    #[test]
    fn table_includes_separator_row() {
        let input = "# Header\n\nHere is a table:\n\n| Column 1 | Column 2 |\n| -------- | -------- |\n| Data 1   | Data 2   |\n";
        let blocks = parse_default(input);
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[2],
            block(
                BlockKind::Table,
                "| Column 1 | Column 2 |\n| -------- | -------- |\n| Data 1   | Data 2   |"
            )
        );
    }

    #[test]
    fn task_list_wins_over_bullet_list() {
        let input = "- [x] Done\n- [ ] Todo";
        assert_eq!(
            parse_default(input),
            vec![block(BlockKind::TaskList, "checked:Done\nunchecked:Todo")]
        );
    }

    #[test]
    fn line_ending_a_list_is_not_dropped() {
        let input = "- a\n- b\nplain\n1. one\n2. two\n> quoted\n---";
        assert_eq!(
            parse_default(input),
            vec![
                block(BlockKind::BulletList, "a\nb"),
                block(BlockKind::Paragraph, "plain"),
                block(BlockKind::NumberedList, "one\ntwo"),
                block(BlockKind::Blockquote, "quoted"),
                block(BlockKind::HorizontalRule, "---"),
            ]
        );
    }

    #[test]
    fn task_line_inside_bullet_list_stays_in_list() {
        let input = "- a\n- [ ] task\n";
        assert_eq!(
            parse_default(input),
            vec![block(BlockKind::BulletList, "a\n[ ] task")]
        );
    }

    #[test]
    fn unterminated_code_block_is_flushed() {
        let input = "```rust\nfn main() {}";
        assert_eq!(
            parse_default(input),
            vec![block(BlockKind::Code, "```rust\nfn main() {}")]
        );
    }

    #[test]
    fn unterminated_list_at_end_of_input_is_flushed() {
        assert_eq!(
            parse_default("1. only"),
            vec![block(BlockKind::NumberedList, "only")]
        );
    }

    #[test]
    fn paragraphs_wrap_to_configured_width() {
        let options = ParseOptions {
            max_line_chars: Some(10),
        };
        assert_eq!(
            parse("the quick brown fox", &options),
            vec![
                block(BlockKind::Paragraph, "the quick"),
                block(BlockKind::Paragraph, "brown fox"),
            ]
        );
    }

    #[test]
    fn crlf_is_normalised() {
        assert_eq!(
            parse_default("# T\r\n- a\r\n- b\r\n"),
            vec![
                block(BlockKind::Title, "T"),
                block(BlockKind::BulletList, "a\nb"),
            ]
        );
    }

    #[test]
    fn assembler_tracks_single_active_parser() {
        let mut assembler = BlockAssembler::default();
        let mut out = Vec::new();

        assembler.feed_line("| a | b |", &mut out);
        assert_eq!(assembler.active(), Some(BlockKind::Table));
        // Looks like a bullet, but the table owns every piped line.
        assembler.feed_line("- | x |", &mut out);
        assert_eq!(assembler.active(), Some(BlockKind::Table));
        assembler.feed_line("", &mut out);
        assert_eq!(assembler.active(), None);
        assert_eq!(out, vec![block(BlockKind::Table, "| a | b |\n- | x |")]);
    }

    #[test]
    fn empty_document_has_no_blocks() {
        assert!(parse_default("").is_empty());
    }
}
