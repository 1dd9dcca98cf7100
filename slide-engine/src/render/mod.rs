//! Raster renderers.
//!
//! [`BlockRenderer`] is the seam between the paginator and the pixels. The
//! paginator only ever hands a renderer a canvas by value and gets it back
//! with the new cursor, which is what makes speculative measuring cheap to
//! express: render on a clone, keep it or drop it.
//!
//! [`SlideRenderer`] is the production implementation on top of `image`,
//! `imageproc` and `ab_glyph`.

pub mod background;
mod code;
pub mod font;
mod list;
mod table;
mod text;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::config::Config;
use crate::error::RenderError;
use crate::inline::SpanStyle;
use crate::types::{BlockKind, TextBlock};

pub use background::{create_background, BackgroundKind};
pub use font::{FontBook, FontStyle, TextRole};

/// The page surface every renderer draws on.
pub type Canvas = RgbaImage;

/// Draws blocks, backgrounds and page decorations.
pub trait BlockRenderer {
    /// A fresh page canvas.
    fn background(&self, kind: BackgroundKind) -> Result<Canvas, RenderError>;

    /// Stamp the page number on `canvas`.
    fn draw_page_number(&self, canvas: &mut Canvas, number: i64);

    /// Draw `block` with its top edge at `top` and return the canvas with the
    /// y coordinate just below the block.
    ///
    /// Must not touch anything but the canvas it was given.
    fn draw(&self, canvas: Canvas, block: &TextBlock, top: u32)
    -> Result<(Canvas, u32), RenderError>;
}

/// Renderer for every [`BlockKind`], configured once.
#[derive(Debug)]
pub struct SlideRenderer {
    config: Config,
    fonts: FontBook,
}

impl SlideRenderer {
    /// Build a renderer, loading the configured font.
    pub fn new(config: Config) -> Self {
        let fonts = FontBook::load(&config.paths.font, &config);
        Self { config, fonts }
    }

    /// Build a renderer around an already-prepared font book.
    pub fn with_fonts(config: Config, fonts: FontBook) -> Self {
        Self { config, fonts }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Left edge of the content area.
    pub(crate) fn left(&self) -> u32 {
        self.config.page_layout.left_margin
    }

    /// Width of the content area.
    pub(crate) fn text_width(&self) -> u32 {
        self.config.page_layout.text_width()
    }

    /// Space left under every block.
    pub(crate) fn block_gap(&self) -> u32 {
        self.fonts.style(TextRole::Body).line_height / 2
    }

    pub(crate) fn span_color(&self, style: SpanStyle) -> Rgba<u8> {
        let colors = &self.config.colors;
        match style {
            SpanStyle::Normal => colors.text.to_rgba(),
            SpanStyle::Bold => colors.highlight.to_rgba(),
            SpanStyle::Italic => colors.italic.to_rgba(),
            SpanStyle::Link => colors.link.to_rgba(),
            SpanStyle::Code => colors.code.to_rgba(),
        }
    }
}

impl BlockRenderer for SlideRenderer {
    fn background(&self, kind: BackgroundKind) -> Result<Canvas, RenderError> {
        let layout = &self.config.page_layout;
        create_background(&self.config, kind, layout.image_width, layout.image_height)
    }

    fn draw_page_number(&self, canvas: &mut Canvas, number: i64) {
        // Without a font there is nothing to stamp.
        let Ok(pen) = self.fonts.pen(TextRole::PageNumber) else {
            return;
        };
        let layout = &self.config.page_layout;
        let label = number.to_string();
        let x = layout
            .image_width
            .saturating_sub(layout.right_margin)
            .saturating_sub(pen.width(&label));
        let y = layout.image_height.saturating_sub(layout.bottom_margin / 2 + pen.line_height / 2);
        pen.draw(
            canvas,
            &label,
            x as i32,
            y as i32,
            self.config.colors.page_number_font.to_rgba(),
        );
    }

    fn draw(
        &self,
        mut canvas: Canvas,
        block: &TextBlock,
        top: u32,
    ) -> Result<(Canvas, u32), RenderError> {
        if block.data.trim().is_empty() && block.kind != BlockKind::HorizontalRule {
            return Ok((canvas, top));
        }

        let bottom = match block.kind {
            BlockKind::Title => text::draw_title(self, &mut canvas, &block.data, top)?,
            BlockKind::Header => text::draw_header(self, &mut canvas, &block.data, top)?,
            BlockKind::Paragraph => text::draw_paragraph(self, &mut canvas, &block.data, top)?,
            BlockKind::Blockquote => text::draw_blockquote(self, &mut canvas, &block.data, top)?,
            BlockKind::HorizontalRule => text::draw_rule(self, &mut canvas, top),
            BlockKind::Code => code::draw_code(self, &mut canvas, &block.data, top)?,
            BlockKind::Table => table::draw_table(self, &mut canvas, &block.data, top)?,
            BlockKind::BulletList | BlockKind::NumberedList | BlockKind::TaskList => {
                list::draw_list(self, &mut canvas, block.kind, &block.data, top)?
            }
        };
        Ok((canvas, bottom))
    }
}

/// Fill a rectangle, ignoring empty or fully off-canvas ones.
pub(crate) fn fill_rect(canvas: &mut Canvas, x: i32, y: i32, w: u32, h: u32, color: Rgba<u8>) {
    if w == 0 || h == 0 {
        return;
    }
    draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(w, h), color);
}
