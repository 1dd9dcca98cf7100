//! Pagination.
//!
//! Blocks are placed greedily, top to bottom, one page at a time. Each block
//! is first drawn on a copy of the current page to learn how tall it is;
//! the copy is kept when the block fits and thrown away when it does not, in
//! which case the page is sealed and the block is drawn again on a fresh
//! one. Sealed pages are never revisited.

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LayoutError;
use crate::render::{BackgroundKind, BlockRenderer, Canvas};
use crate::types::TextBlock;

/// A single block may use at most this share of the page height.
pub const MAX_BLOCK_FRACTION: f32 = 0.8;

/// One finished output image.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based position in the deck.
    pub index: usize,
    pub canvas: Canvas,
}

/// The page being filled.
struct OpenPage {
    canvas: Canvas,
    cursor: u32,
    numbered: bool,
    has_content: bool,
}

/// Lays a block stream out onto pages using a [`BlockRenderer`].
pub struct Paginator<'r, R: BlockRenderer + ?Sized> {
    renderer: &'r R,
    top_margin: u32,
    content_bottom: u32,
    start_index: i64,
    final_page: bool,
}

impl<'r, R: BlockRenderer + ?Sized> Paginator<'r, R> {
    pub fn new(renderer: &'r R, config: &Config) -> Self {
        Self {
            renderer,
            top_margin: config.page_layout.top_margin,
            content_bottom: config.page_layout.content_bottom(),
            start_index: config.page_layout.start_index,
            final_page: config.paths.final_page.is_some(),
        }
    }

    /// Append a closing page after the content pages.
    pub fn with_final_page(mut self, enabled: bool) -> Self {
        self.final_page = enabled;
        self
    }

    /// Lay out `blocks` in order.
    ///
    /// Fails only on a block taller than [`MAX_BLOCK_FRACTION`] of the page
    /// or a background that cannot be built. A block whose renderer errors
    /// is logged and skipped as if it had no height.
    pub fn paginate(&self, blocks: &[TextBlock]) -> Result<Vec<Page>, LayoutError> {
        let mut pages = Vec::new();
        let mut open: Option<OpenPage> = None;

        for block in blocks {
            let kind = BackgroundKind::for_block(block);
            let mut page = match open.take() {
                Some(page) => page,
                None => self.new_page(kind)?,
            };

            let height = page.canvas.height();
            let Some((trial, bottom)) = self.try_draw(&page.canvas, block, page.cursor) else {
                if !block.is_title() && !page.numbered {
                    self.number(&mut page, pages.len() + 1);
                }
                open = Some(page);
                continue;
            };

            let used = bottom.saturating_sub(page.cursor);
            let limit = (height as f32 * MAX_BLOCK_FRACTION) as u32;
            if used > limit {
                return Err(LayoutError::BlockTooTall {
                    kind: block.kind,
                    height: used,
                    limit,
                });
            }

            // An empty page takes the block even past the bottom margin.
            let fits = bottom <= self.content_bottom;
            if fits || !page.has_content {
                debug!(kind = %block.kind, top = page.cursor, bottom, "placed block");
                page.canvas = trial;
                page.cursor = bottom;
                page.has_content = true;
                if !block.is_title() && !page.numbered {
                    self.number(&mut page, pages.len() + 1);
                }
                open = Some(page);
                continue;
            }

            self.seal(&mut pages, page.canvas);

            let mut fresh = self.new_page(kind)?;
            if !block.is_title() {
                self.number(&mut fresh, pages.len() + 1);
            }
            if let Some((canvas, bottom)) = self.try_draw(&fresh.canvas, block, fresh.cursor) {
                debug!(kind = %block.kind, top = fresh.cursor, bottom, "placed block on new page");
                fresh.canvas = canvas;
                fresh.cursor = bottom;
                fresh.has_content = true;
            }
            open = Some(fresh);
        }

        if let Some(page) = open {
            self.seal(&mut pages, page.canvas);
        }

        if self.final_page {
            let canvas = self
                .renderer
                .background(BackgroundKind::Final)
                .map_err(LayoutError::Background)?;
            self.seal(&mut pages, canvas);
        }

        Ok(pages)
    }

    fn new_page(&self, kind: BackgroundKind) -> Result<OpenPage, LayoutError> {
        let canvas = self
            .renderer
            .background(kind)
            .map_err(LayoutError::Background)?;
        Ok(OpenPage {
            canvas,
            cursor: self.top_margin,
            numbered: false,
            has_content: false,
        })
    }

    fn number(&self, page: &mut OpenPage, index: usize) {
        let number = index as i64 + self.start_index;
        self.renderer.draw_page_number(&mut page.canvas, number);
        page.numbered = true;
    }

    /// Render `block` on a copy of `canvas`. Renderer failures are logged
    /// and reported as `None`.
    fn try_draw(&self, canvas: &Canvas, block: &TextBlock, top: u32) -> Option<(Canvas, u32)> {
        match self.renderer.draw(canvas.clone(), block, top) {
            Ok(drawn) => Some(drawn),
            Err(e) => {
                warn!(kind = %block.kind, "skipping block: {e}");
                None
            }
        }
    }

    fn seal(&self, pages: &mut Vec<Page>, canvas: Canvas) {
        let index = pages.len() + 1;
        debug!(index, "sealed page");
        pages.push(Page { index, canvas });
    }
}
