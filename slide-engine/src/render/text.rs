use image::Rgba;

use super::font::{Pen, TextRole};
use super::{fill_rect, Canvas, SlideRenderer};
use crate::error::RenderError;
use crate::inline::{parse_formatted_words, SpanStyle};
use crate::wrap::wrap_measured;

const QUOTE_BAR_WIDTH: u32 = 6;
const RULE_THICKNESS: u32 = 3;

pub(super) fn draw_title(
    r: &SlideRenderer,
    canvas: &mut Canvas,
    text: &str,
    top: u32,
) -> Result<u32, RenderError> {
    let pen = r.fonts().pen(TextRole::Title)?;
    let color = r.config().colors.text.to_rgba();
    let mut y = top;

    for line in pen.wrap(text, r.text_width()) {
        let offset = r.text_width().saturating_sub(pen.width(&line)) / 2;
        pen.draw(canvas, &line, (r.left() + offset) as i32, y as i32, color);
        y += pen.line_height;
    }
    Ok(y + r.block_gap())
}

pub(super) fn draw_header(
    r: &SlideRenderer,
    canvas: &mut Canvas,
    text: &str,
    top: u32,
) -> Result<u32, RenderError> {
    let pen = r.fonts().pen(TextRole::Header)?;
    let color = r.config().colors.highlight.to_rgba();
    let mut y = top;

    for line in pen.wrap(text, r.text_width()) {
        pen.draw(canvas, &line, r.left() as i32, y as i32, color);
        y += pen.line_height;
    }
    Ok(y + r.block_gap())
}

pub(super) fn draw_paragraph(
    r: &SlideRenderer,
    canvas: &mut Canvas,
    text: &str,
    top: u32,
) -> Result<u32, RenderError> {
    let pen = r.fonts().pen(TextRole::Body)?;
    let bottom = draw_rich_text(r, canvas, &pen, text, r.left(), top, r.text_width(), None);
    Ok(bottom + r.block_gap())
}

pub(super) fn draw_blockquote(
    r: &SlideRenderer,
    canvas: &mut Canvas,
    text: &str,
    top: u32,
) -> Result<u32, RenderError> {
    let pen = r.fonts().pen(TextRole::Body)?;
    let indent = pen.line_height / 2 + QUOTE_BAR_WIDTH;
    let width = r.text_width().saturating_sub(indent);
    let italic = r.config().colors.italic.to_rgba();

    let mut y = top;
    for line in text.lines() {
        y = draw_rich_text(r, canvas, &pen, line, r.left() + indent, y, width, Some(italic));
    }

    fill_rect(
        canvas,
        r.left() as i32,
        top as i32,
        QUOTE_BAR_WIDTH,
        y - top,
        r.config().colors.highlight.to_rgba(),
    );
    Ok(y + r.block_gap())
}

pub(super) fn draw_rule(r: &SlideRenderer, canvas: &mut Canvas, top: u32) -> u32 {
    let line_height = r.fonts().style(TextRole::Body).line_height;
    let y = top + line_height / 2;
    fill_rect(
        canvas,
        r.left() as i32,
        y as i32,
        r.text_width(),
        RULE_THICKNESS,
        r.config().colors.highlight.to_rgba(),
    );
    top + line_height
}

/// Draw `text` with inline spans, wrapped by pixel width, starting at
/// (`x`, `top`). `base` overrides the colour of unstyled words.
///
/// Returns the y just below the last line.
#[allow(clippy::too_many_arguments)]
pub(super) fn draw_rich_text(
    r: &SlideRenderer,
    canvas: &mut Canvas,
    pen: &Pen<'_>,
    text: &str,
    x: u32,
    top: u32,
    max_width: u32,
    base: Option<Rgba<u8>>,
) -> u32 {
    let words = parse_formatted_words(text);
    let space = pen.space_width();
    let lines = wrap_measured(words, max_width, space, |(word, _)| pen.width(word));

    let mut y = top;
    for line in lines {
        let mut cursor = x;
        for (word, style) in line {
            let color = match (style, base) {
                (SpanStyle::Normal, Some(base)) => base,
                _ => r.span_color(style),
            };
            pen.draw(canvas, &word, cursor as i32, y as i32, color);
            cursor += pen.width(&word) + space;
        }
        y += pen.line_height;
    }
    y
}
