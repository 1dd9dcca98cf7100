//! ANSI terminal dump of a block stream.
//!
//! Used by `mdslides --blocks` to show how a document was classified
//! without rasterising anything.

use colored::{ColoredString, Colorize};

use crate::types::{BlockKind, TaskItem, TextBlock};

/// Render `blocks` as ANSI-colored terminal text, one entry per block.
pub fn to_terminal(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| render_block(i + 1, block))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(position: usize, block: &TextBlock) -> String {
    let label = format!("{position:>3} {:<15}", block.kind.as_str());
    let label = kind_color(block.kind, &label);
    let gutter = "\u{2502}".dimmed(); // │

    let body: Vec<String> = match block.kind {
        BlockKind::Title => vec![block.data.bold().to_string()],
        BlockKind::Header => vec![block.data.yellow().to_string()],
        BlockKind::Code => block.data.lines().map(|l| l.green().to_string()).collect(),
        BlockKind::BulletList => block.data.lines().map(|l| format!("\u{2022} {l}")).collect(), // •
        BlockKind::NumberedList => block
            .data
            .lines()
            .enumerate()
            .map(|(n, l)| format!("{}. {l}", n + 1))
            .collect(),
        BlockKind::TaskList => block
            .data
            .lines()
            .map(TaskItem::decode)
            .map(|item| {
                let mark = if item.checked { "[x]".green() } else { "[ ]".normal() };
                format!("{mark} {}", item.text)
            })
            .collect(),
        BlockKind::Blockquote => block.data.lines().map(|l| l.italic().to_string()).collect(),
        BlockKind::HorizontalRule => vec!["\u{2500}".repeat(20).dimmed().to_string()], // ─
        BlockKind::Table | BlockKind::Paragraph => {
            block.data.lines().map(str::to_string).collect()
        }
    };

    let mut lines = Vec::with_capacity(body.len().max(1));
    let mut rows = body.into_iter();
    lines.push(format!("{label} {gutter} {}", rows.next().unwrap_or_default()));
    let pad = " ".repeat(3 + 1 + 15);
    for row in rows {
        lines.push(format!("{pad} {gutter} {row}"));
    }
    lines.join("\n")
}

fn kind_color(kind: BlockKind, label: &str) -> ColoredString {
    match kind {
        BlockKind::Title | BlockKind::Header => label.bold().cyan(),
        BlockKind::Code => label.green(),
        BlockKind::Table => label.magenta(),
        BlockKind::BulletList | BlockKind::NumberedList | BlockKind::TaskList => label.blue(),
        BlockKind::Blockquote => label.italic(),
        BlockKind::HorizontalRule | BlockKind::Paragraph => label.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_block_gets_a_numbered_entry() {
        colored::control::set_override(false);
        let blocks = vec![
            TextBlock::new(BlockKind::Title, "Deck"),
            TextBlock::new(BlockKind::TaskList, "checked:Ship\nunchecked:Test"),
        ];
        let out = to_terminal(&blocks);
        assert!(out.contains("  1 title"));
        assert!(out.contains("  2 task_list"));
        assert!(out.contains("[x] Ship"));
        assert!(out.contains("[ ] Test"));
    }

    #[test]
    fn empty_stream_renders_nothing() {
        assert_eq!(to_terminal(&[]), "");
    }
}
