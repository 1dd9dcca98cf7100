//! Property-based tests using proptest.
//!
//! These check the structural guarantees of the parser on arbitrary input:
//! sections are lossless, parsing never panics, and no line is claimed by
//! two constructs at once.

use proptest::prelude::*;
use slide_engine::parse::BlockAssembler;
use slide_engine::{parse, split_sections, BlockKind, ParseOptions};

/// Lines drawn from every construct the parser knows, plus noise.
fn markdown_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z ,.!?]{0,40}",
        "#{1,3} [A-Za-z ?]{0,20}",
        "[-*] [A-Za-z ]{1,20}",
        "[-*] \\[[ xX]\\] [A-Za-z ]{1,20}",
        "[0-9]{1,2}\\. [A-Za-z ]{1,20}",
        "> ?[A-Za-z ]{0,20}",
        "\\| [A-Za-z0-9 ]{1,8} \\| [A-Za-z0-9 ]{1,8} \\|",
        Just("| --- | --- |".to_string()),
        Just("```".to_string()),
        "```[a-z]{1,6}",
        Just("---".to_string()),
        Just(String::new()),
    ]
}

fn markdown_doc() -> impl Strategy<Value = String> {
    prop::collection::vec(markdown_line(), 0..40).prop_map(|lines| lines.join("\n"))
}

proptest! {
    /// Any random string fed to the parser should never cause a panic.
    #[test]
    fn any_input_no_panic(input in "\\PC{0,500}") {
        let blocks = parse(&input, &ParseOptions::default());
        let _ = blocks.len();
    }

    /// Joining sections with `\n` reproduces the input exactly.
    #[test]
    fn sections_are_lossless(input in "[#a-z \n]{0,200}") {
        let sections: Vec<&str> = split_sections(&input).collect();
        prop_assert!(!sections.is_empty());
        prop_assert_eq!(sections.join("\n"), input.clone());
    }

    /// Without header lines the whole input is a single section.
    #[test]
    fn headerless_input_is_one_section(input in "[a-z \n]{0,200}") {
        let sections: Vec<&str> = split_sections(&input).collect();
        prop_assert_eq!(sections, vec![input.as_str()]);
    }

    /// Every section after the first starts with a header line.
    #[test]
    fn later_sections_start_at_headers(input in markdown_doc()) {
        for section in split_sections(&input).skip(1) {
            prop_assert!(section.trim_start().starts_with('#'), "{:?}", section);
        }
    }

    /// At most one parser is active after any line, and the assembler is
    /// idle once a section has been flushed.
    #[test]
    fn at_most_one_active_parser(input in markdown_doc()) {
        let mut assembler = BlockAssembler::new(ParseOptions::default());
        for section in split_sections(&input) {
            let mut out = Vec::new();
            for line in section.split('\n') {
                assembler.feed_line(line, &mut out);
                // Paragraphs are emitted immediately and never hold a line.
                prop_assert_ne!(assembler.active(), Some(BlockKind::Paragraph));
            }
            assembler.flush(&mut out);
            prop_assert_eq!(assembler.active(), None);
        }
    }

    /// Parsing is a pure function of its input.
    #[test]
    fn parsing_is_deterministic(input in markdown_doc()) {
        let options = ParseOptions::default();
        prop_assert_eq!(parse(&input, &options), parse(&input, &options));
    }

    /// Paragraph wrapping never produces a line longer than the limit.
    #[test]
    fn wrapped_paragraphs_respect_width(
        words in prop::collection::vec("[a-z]{1,15}", 1..30),
        width in 5usize..40,
    ) {
        let input = words.join(" ");
        let options = ParseOptions { max_line_chars: Some(width) };
        for block in parse(&input, &options) {
            prop_assert_eq!(block.kind, BlockKind::Paragraph);
            prop_assert!(block.data.chars().count() <= width, "{:?}", block.data);
        }
    }
}
