use image::Rgba;
use imageproc::drawing::draw_filled_circle_mut;
use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use super::font::TextRole;
use super::{fill_rect, Canvas, SlideRenderer};
use crate::error::RenderError;

const FENCE: &str = "```";
const TAB: &str = "    ";

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEMES: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// One line of code as coloured runs, left to right.
pub(super) type HighlightedLine = Vec<(Rgba<u8>, String)>;

/// Split a code payload into its language tag and body lines.
///
/// Both fences are dropped; the tag comes from the opening fence.
pub(super) fn split_code(data: &str) -> (Option<&str>, Vec<&str>) {
    let mut lines: Vec<&str> = data.lines().collect();
    let mut lang = None;

    if let Some(first) = lines.first().map(|l| l.trim()) {
        if let Some(tag) = first.strip_prefix(FENCE) {
            let tag = tag.trim();
            lang = (!tag.is_empty()).then_some(tag);
            lines.remove(0);
        }
    }
    if lines.last().is_some_and(|l| l.trim().starts_with(FENCE)) {
        lines.pop();
    }
    (lang, lines)
}

/// Syntax for a fence tag. Untagged blocks are plain text.
fn syntax_for(lang: Option<&str>) -> Result<&'static SyntaxReference, RenderError> {
    let Some(tag) = lang else {
        return Ok(SYNTAXES.find_syntax_plain_text());
    };
    SYNTAXES
        .find_syntax_by_token(tag)
        .ok_or_else(|| RenderError::UnsupportedLanguage(tag.to_string()))
}

fn theme(name: &str) -> Result<&'static Theme, RenderError> {
    THEMES
        .themes
        .get(name)
        .ok_or_else(|| RenderError::UnknownTheme(name.to_string()))
}

fn to_rgba(style: Style) -> Rgba<u8> {
    let c = style.foreground;
    Rgba([c.r, c.g, c.b, c.a])
}

/// Highlight `lines` as `lang` with the named theme. Tabs are expanded
/// first so runs line up with what gets drawn.
pub(super) fn highlight(
    lang: Option<&str>,
    theme_name: &str,
    lines: &[&str],
) -> Result<Vec<HighlightedLine>, RenderError> {
    let mut highlighter = HighlightLines::new(syntax_for(lang)?, theme(theme_name)?);
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        let line = format!("{}\n", line.replace('\t', TAB));
        let ranges = highlighter
            .highlight_line(&line, &SYNTAXES)
            .map_err(RenderError::Highlight)?;
        out.push(
            ranges
                .into_iter()
                .map(|(style, text)| (to_rgba(style), text.trim_end_matches('\n').to_string()))
                .filter(|(_, text)| !text.is_empty())
                .collect(),
        );
    }
    Ok(out)
}

pub(super) fn draw_code(
    r: &SlideRenderer,
    canvas: &mut Canvas,
    data: &str,
    top: u32,
) -> Result<u32, RenderError> {
    let style = &r.config().code_block;
    let (lang, lines) = split_code(data);
    let lines = highlight(lang, &style.theme, &lines)?;
    let pen = r.fonts().pen(TextRole::Code)?;

    let padding = style.top_padding;
    let inner_x = r.left() + padding / 2;
    let height = padding + lines.len() as u32 * pen.line_height + padding / 2;

    fill_rounded_rect(
        canvas,
        r.left() as i32,
        top as i32,
        r.text_width(),
        height,
        style.radius,
        style.background.to_rgba(),
    );

    if let Some(lang) = lang {
        let label = r.fonts().pen(TextRole::PageNumber)?;
        let y = top + padding.saturating_sub(label.line_height) / 2;
        label.draw(canvas, lang, inner_x as i32, y as i32, r.config().colors.italic.to_rgba());
    }

    for (i, runs) in lines.iter().enumerate() {
        let y = (top + padding + i as u32 * pen.line_height) as i32;
        let mut x = inner_x as i32;
        for (color, text) in runs {
            pen.draw(canvas, text, x, y, *color);
            x += pen.width(text) as i32;
        }
    }

    Ok(top + height + r.block_gap())
}

/// Filled rectangle with circular corners of `radius`.
fn fill_rounded_rect(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    w: u32,
    h: u32,
    radius: u32,
    color: Rgba<u8>,
) {
    let radius = radius.min(w / 2).min(h / 2);
    if radius == 0 {
        fill_rect(canvas, x, y, w, h, color);
        return;
    }
    let r = radius as i32;
    let (wi, hi) = (w as i32, h as i32);

    fill_rect(canvas, x + r, y, w - 2 * radius, h, color);
    fill_rect(canvas, x, y + r, w, h - 2 * radius, color);
    for (cx, cy) in [
        (x + r, y + r),
        (x + wi - r - 1, y + r),
        (x + r, y + hi - r - 1),
        (x + wi - r - 1, y + hi - r - 1),
    ] {
        draw_filled_circle_mut(canvas, (cx, cy), r, color);
    }
}
