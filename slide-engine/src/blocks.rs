//! Per-construct line parsers.
//!
//! Each parser is a small two-state machine (inactive / active) that
//! recognises one Markdown construct. The assembler in [`crate::parse`]
//! decides which parser owns a line; a parser only ever sees the lines it
//! was handed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{BlockKind, TaskItem, TextBlock};

static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s").unwrap());

const FENCE: &str = "```";
const TASK_MARKERS: [&str; 6] = ["- [ ]", "- [x]", "- [X]", "* [ ]", "* [x]", "* [X]"];

/// How the line that ends a construct is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndLine {
    /// The end line belongs to the block (closing fences, one-line constructs).
    Inclusive,
    /// The end line is the first line *after* the block and must be
    /// classified again.
    Exclusive,
}

/// The line-parser contract shared by every construct.
pub trait BlockParser {
    /// Kind of block this parser emits.
    fn kind(&self) -> BlockKind;

    /// Does `line` open this construct? May flip the parser to active.
    fn is_start_line(&mut self, line: &str) -> bool;

    /// Does `line` close this construct? May flip the parser to inactive.
    fn is_end_line(&mut self, line: &str) -> bool;

    /// Accumulate `line` into the current block.
    fn parse(&mut self, line: &str);

    /// Emit the accumulated block and clear the accumulation buffer.
    fn get_block(&mut self) -> TextBlock;

    /// Return to the initial inactive state.
    fn reset(&mut self);

    fn end_line(&self) -> EndLine;
}

// ------------------------------------------------------------------
// Title / header
// ------------------------------------------------------------------

/// Strip the leading `#` run and the whitespace after it.
fn strip_heading_marker(line: &str) -> &str {
    line.trim().trim_start_matches('#').trim()
}

/// `# Title`: any line starting with `#`.
#[derive(Debug, Default)]
pub struct TitleParser {
    content: String,
}

impl BlockParser for TitleParser {
    fn kind(&self) -> BlockKind {
        BlockKind::Title
    }

    fn is_start_line(&mut self, line: &str) -> bool {
        line.trim().starts_with('#')
    }

    fn is_end_line(&mut self, _line: &str) -> bool {
        true
    }

    fn parse(&mut self, line: &str) {
        self.content = strip_heading_marker(line).to_string();
    }

    fn get_block(&mut self) -> TextBlock {
        TextBlock::new(BlockKind::Title, std::mem::take(&mut self.content))
    }

    fn reset(&mut self) {
        self.content.clear();
    }

    fn end_line(&self) -> EndLine {
        EndLine::Inclusive
    }
}

/// `## Header`: requires at least two `#`.
#[derive(Debug, Default)]
pub struct HeaderParser {
    content: String,
}

impl BlockParser for HeaderParser {
    fn kind(&self) -> BlockKind {
        BlockKind::Header
    }

    fn is_start_line(&mut self, line: &str) -> bool {
        line.trim().starts_with("##")
    }

    fn is_end_line(&mut self, _line: &str) -> bool {
        true
    }

    fn parse(&mut self, line: &str) {
        self.content = strip_heading_marker(line).to_string();
    }

    fn get_block(&mut self) -> TextBlock {
        TextBlock::new(BlockKind::Header, std::mem::take(&mut self.content))
    }

    fn reset(&mut self) {
        self.content.clear();
    }

    fn end_line(&self) -> EndLine {
        EndLine::Inclusive
    }
}

// ------------------------------------------------------------------
// Code block
// ------------------------------------------------------------------

/// Fenced code. Both fences are kept in the payload; the opening one
/// carries the language tag for the renderer.
#[derive(Debug, Default)]
pub struct CodeBlockParser {
    is_parsing: bool,
    fences_seen: u8,
    content: Vec<String>,
}

impl CodeBlockParser {
    pub fn is_parsing(&self) -> bool {
        self.is_parsing
    }
}

impl BlockParser for CodeBlockParser {
    fn kind(&self) -> BlockKind {
        BlockKind::Code
    }

    fn is_start_line(&mut self, line: &str) -> bool {
        if !self.is_parsing && line.trim().starts_with(FENCE) {
            self.is_parsing = true;
            return true;
        }
        false
    }

    fn is_end_line(&mut self, line: &str) -> bool {
        if !line.trim().starts_with(FENCE) {
            return false;
        }
        // The opening fence is checked too; it only bumps the counter.
        if self.fences_seen > 0 {
            self.is_parsing = false;
            self.fences_seen = 0;
            true
        } else {
            self.fences_seen += 1;
            false
        }
    }

    fn parse(&mut self, line: &str) {
        self.content.push(line.to_string());
    }

    fn get_block(&mut self) -> TextBlock {
        let data = self.content.join("\n");
        self.content.clear();
        TextBlock::new(BlockKind::Code, data)
    }

    fn reset(&mut self) {
        self.is_parsing = false;
        self.fences_seen = 0;
        self.content.clear();
    }

    fn end_line(&self) -> EndLine {
        EndLine::Inclusive
    }
}

// ------------------------------------------------------------------
// Table
// ------------------------------------------------------------------

/// Pipe table. Starts on a pipe row without hyphens, so a bare separator
/// row never opens a table; once open, every piped line is kept verbatim.
#[derive(Debug, Default)]
pub struct TableParser {
    content: Vec<String>,
}

impl BlockParser for TableParser {
    fn kind(&self) -> BlockKind {
        BlockKind::Table
    }

    fn is_start_line(&mut self, line: &str) -> bool {
        line.contains('|') && !line.contains('-')
    }

    fn is_end_line(&mut self, line: &str) -> bool {
        !line.contains('|')
    }

    fn parse(&mut self, line: &str) {
        self.content.push(line.to_string());
    }

    fn get_block(&mut self) -> TextBlock {
        let data = self.content.join("\n");
        self.content.clear();
        TextBlock::new(BlockKind::Table, data)
    }

    fn reset(&mut self) {
        self.content.clear();
    }

    fn end_line(&self) -> EndLine {
        EndLine::Exclusive
    }
}

// ------------------------------------------------------------------
// Lists and quotes
// ------------------------------------------------------------------

fn is_bullet_line(line: &str) -> bool {
    let stripped = line.trim();
    stripped.starts_with("- ") || stripped.starts_with("* ")
}

/// `- item` / `* item`.
#[derive(Debug, Default)]
pub struct BulletListParser {
    items: Vec<String>,
}

impl BlockParser for BulletListParser {
    fn kind(&self) -> BlockKind {
        BlockKind::BulletList
    }

    fn is_start_line(&mut self, line: &str) -> bool {
        is_bullet_line(line)
    }

    fn is_end_line(&mut self, line: &str) -> bool {
        !is_bullet_line(line)
    }

    fn parse(&mut self, line: &str) {
        let stripped = line.trim();
        let item = stripped.get(2..).unwrap_or_default();
        self.items.push(item.to_string());
    }

    fn get_block(&mut self) -> TextBlock {
        let data = self.items.join("\n");
        self.items.clear();
        TextBlock::new(BlockKind::BulletList, data)
    }

    fn reset(&mut self) {
        self.items.clear();
    }

    fn end_line(&self) -> EndLine {
        EndLine::Exclusive
    }
}

/// `1. item`.
#[derive(Debug, Default)]
pub struct NumberedListParser {
    items: Vec<String>,
}

impl BlockParser for NumberedListParser {
    fn kind(&self) -> BlockKind {
        BlockKind::NumberedList
    }

    fn is_start_line(&mut self, line: &str) -> bool {
        NUMBERED_ITEM.is_match(line.trim())
    }

    fn is_end_line(&mut self, line: &str) -> bool {
        !NUMBERED_ITEM.is_match(line.trim())
    }

    fn parse(&mut self, line: &str) {
        let item = NUMBERED_ITEM.replace(line.trim(), "");
        self.items.push(item.into_owned());
    }

    fn get_block(&mut self) -> TextBlock {
        let data = self.items.join("\n");
        self.items.clear();
        TextBlock::new(BlockKind::NumberedList, data)
    }

    fn reset(&mut self) {
        self.items.clear();
    }

    fn end_line(&self) -> EndLine {
        EndLine::Exclusive
    }
}

/// `> quoted`.
#[derive(Debug, Default)]
pub struct BlockquoteParser {
    lines: Vec<String>,
}

impl BlockParser for BlockquoteParser {
    fn kind(&self) -> BlockKind {
        BlockKind::Blockquote
    }

    fn is_start_line(&mut self, line: &str) -> bool {
        line.trim().starts_with('>')
    }

    fn is_end_line(&mut self, line: &str) -> bool {
        !line.trim().starts_with('>')
    }

    fn parse(&mut self, line: &str) {
        let stripped = line.trim();
        let rest = stripped.strip_prefix('>').unwrap_or(stripped);
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        self.lines.push(rest.to_string());
    }

    fn get_block(&mut self) -> TextBlock {
        let data = self.lines.join("\n");
        self.lines.clear();
        TextBlock::new(BlockKind::Blockquote, data)
    }

    fn reset(&mut self) {
        self.lines.clear();
    }

    fn end_line(&self) -> EndLine {
        EndLine::Exclusive
    }
}

// ------------------------------------------------------------------
// Horizontal rule
// ------------------------------------------------------------------

/// `---`, `***`, `___` (three or more of the same character).
#[derive(Debug, Default)]
pub struct HorizontalRuleParser {
    seen: bool,
}

fn is_rule_line(line: &str) -> bool {
    let stripped = line.trim();
    if stripped.len() < 3 || stripped.starts_with(FENCE) {
        return false;
    }
    let mut chars = stripped.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    matches!(first, '-' | '*' | '_') && chars.all(|c| c == first)
}

impl BlockParser for HorizontalRuleParser {
    fn kind(&self) -> BlockKind {
        BlockKind::HorizontalRule
    }

    fn is_start_line(&mut self, line: &str) -> bool {
        is_rule_line(line)
    }

    fn is_end_line(&mut self, _line: &str) -> bool {
        true
    }

    fn parse(&mut self, _line: &str) {
        self.seen = true;
    }

    fn get_block(&mut self) -> TextBlock {
        self.seen = false;
        TextBlock::new(BlockKind::HorizontalRule, "---")
    }

    fn reset(&mut self) {
        self.seen = false;
    }

    fn end_line(&self) -> EndLine {
        EndLine::Inclusive
    }
}

// ------------------------------------------------------------------
// Task list
// ------------------------------------------------------------------

fn task_marker(line: &str) -> Option<&'static str> {
    let stripped = line.trim();
    TASK_MARKERS
        .into_iter()
        .find(|marker| stripped.starts_with(marker))
}

/// `- [ ] todo` / `- [x] done`.
#[derive(Debug, Default)]
pub struct TaskListParser {
    items: Vec<TaskItem>,
}

impl TaskListParser {
    pub fn items(&self) -> &[TaskItem] {
        &self.items
    }
}

impl BlockParser for TaskListParser {
    fn kind(&self) -> BlockKind {
        BlockKind::TaskList
    }

    fn is_start_line(&mut self, line: &str) -> bool {
        task_marker(line).is_some()
    }

    fn is_end_line(&mut self, line: &str) -> bool {
        task_marker(line).is_none()
    }

    fn parse(&mut self, line: &str) {
        let Some(marker) = task_marker(line) else {
            return;
        };
        let stripped = line.trim();
        self.items.push(TaskItem {
            checked: marker.ends_with("[x]") || marker.ends_with("[X]"),
            text: stripped[marker.len()..].trim().to_string(),
        });
    }

    fn get_block(&mut self) -> TextBlock {
        let data = self
            .items
            .drain(..)
            .map(|item| item.encode())
            .collect::<Vec<_>>()
            .join("\n");
        TextBlock::new(BlockKind::TaskList, data)
    }

    fn reset(&mut self) {
        self.items.clear();
    }

    fn end_line(&self) -> EndLine {
        EndLine::Exclusive
    }
}
