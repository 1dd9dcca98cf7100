use super::font::TextRole;
use super::{fill_rect, Canvas, SlideRenderer};
use crate::error::RenderError;

/// A pipe table split into a header row and body rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn columns(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Parse the raw rows of a table block. Separator rows are skipped; the
/// first remaining row is the header.
pub(super) fn parse_table(content: &str) -> Result<Table, RenderError> {
    let mut rows = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_table_separator(line))
        .map(split_pipe_row);

    let headers = rows
        .next()
        .ok_or_else(|| RenderError::MalformedTable("no rows".into()))?;
    let table = Table {
        headers,
        rows: rows.collect(),
    };

    let has_cells = std::iter::once(&table.headers)
        .chain(&table.rows)
        .flatten()
        .any(|cell| !cell.is_empty());
    if !has_cells {
        return Err(RenderError::MalformedTable("every cell is empty".into()));
    }
    Ok(table)
}

/// Check whether a line is a markdown table separator (e.g. `|---|---|`).
fn is_table_separator(line: &str) -> bool {
    let stripped = line.trim().trim_matches('|').trim();
    if stripped.is_empty() {
        return false;
    }
    stripped
        .split('|')
        .all(|cell| cell.trim().chars().all(|c| c == '-' || c == ':'))
}

/// Split a pipe-delimited row into trimmed cell strings, stripping leading and
/// trailing pipes.
fn split_pipe_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

pub(super) fn draw_table(
    r: &SlideRenderer,
    canvas: &mut Canvas,
    data: &str,
    top: u32,
) -> Result<u32, RenderError> {
    let table = parse_table(data)?;
    let pen = r.fonts().pen(TextRole::Table)?;
    let style = &r.config().table;

    let columns = table.columns().max(1) as u32;
    let column_width = r.text_width() / columns;
    let row_height = (pen.line_height as f32 * 1.4 * style.scale_factor.max(0.1)).ceil() as u32;
    let padding = (column_width / 12).max(4);
    let text_offset = row_height.saturating_sub(pen.line_height) / 2;

    let rows = std::iter::once((&table.headers, true)).chain(table.rows.iter().map(|row| (row, false)));
    let mut y = top;
    for (cells, is_header) in rows {
        let (bg, fg) = if is_header {
            (style.header_bg_color, style.header_fg_color)
        } else {
            (style.background, style.foreground)
        };
        fill_rect(
            canvas,
            r.left() as i32,
            y as i32,
            column_width * columns,
            row_height,
            bg.to_rgba(),
        );

        for (col, cell) in cells.iter().enumerate() {
            let x = r.left() + col as u32 * column_width + padding;
            let max = column_width.saturating_sub(padding * 2);
            let text = fit_cell(cell, max, |s| pen.width(s));
            pen.draw(canvas, &text, x as i32, (y + text_offset) as i32, fg.to_rgba());
        }
        // 1px grid line between rows.
        y += row_height;
        fill_rect(
            canvas,
            r.left() as i32,
            y as i32,
            column_width * columns,
            1,
            r.config().colors.background.to_rgba(),
        );
        y += 1;
    }

    Ok(y + r.block_gap())
}

/// Truncate `cell` with an ellipsis until it fits in `max` pixels.
fn fit_cell(cell: &str, max: u32, width: impl Fn(&str) -> u32) -> String {
    if width(cell) <= max {
        return cell.to_string();
    }
    let mut chars: Vec<char> = cell.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "…";
        if width(&candidate) <= max {
            return candidate;
        }
    }
    String::new()
}
