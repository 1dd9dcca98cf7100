//! Font loading and text metrics.
//!
//! One font file serves every block kind; sizes are derived from the page
//! height so a layout scales with the configured canvas.

use std::fmt;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::Rgba;
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::error;

use crate::config::Config;
use crate::error::RenderError;
use crate::render::Canvas;
use crate::wrap::wrap_measured;

/// What a run of text is used for; picks size and line height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRole {
    Title,
    Header,
    Body,
    Code,
    Table,
    PageNumber,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStyle {
    /// Pixel height of the em square.
    pub size: f32,
    pub line_height: u32,
}

impl FontStyle {
    pub fn for_role(role: TextRole, config: &Config) -> Self {
        let height = config.page_layout.image_height as f32;
        let size = match role {
            TextRole::Title => height / 10.0,
            TextRole::Header => height / 22.0,
            TextRole::Body => height / 30.0,
            TextRole::Code => height / 60.0 * config.code_block.scale_factor,
            TextRole::Table => height / 40.0 * config.table.scale_factor,
            TextRole::PageNumber => height / 40.0,
        }
        .max(1.0);

        FontStyle {
            size,
            line_height: (size * 1.3).ceil() as u32,
        }
    }
}

/// The loaded font plus the per-role styles for one config.
pub struct FontBook {
    path: PathBuf,
    font: Option<FontVec>,
    styles: [(TextRole, FontStyle); 6],
}

impl FontBook {
    /// Load the font at `path`. A missing or unreadable font is reported
    /// once here; afterwards every text draw fails with
    /// [`RenderError::FontUnavailable`].
    pub fn load(path: &Path, config: &Config) -> Self {
        let font = match std::fs::read(path) {
            Ok(bytes) => match FontVec::try_from_vec(bytes) {
                Ok(font) => Some(font),
                Err(e) => {
                    error!(path = %path.display(), "invalid font file: {e}");
                    None
                }
            },
            Err(e) => {
                error!(path = %path.display(), "cannot read font file: {e}");
                None
            }
        };
        Self::with_font(path, font, config)
    }

    /// A book with no font at all; text draws fail, shapes still work.
    pub fn unavailable(path: &Path, config: &Config) -> Self {
        Self::with_font(path, None, config)
    }

    fn with_font(path: &Path, font: Option<FontVec>, config: &Config) -> Self {
        let styles = [
            TextRole::Title,
            TextRole::Header,
            TextRole::Body,
            TextRole::Code,
            TextRole::Table,
            TextRole::PageNumber,
        ]
        .map(|role| (role, FontStyle::for_role(role, config)));

        Self {
            path: path.to_path_buf(),
            font,
            styles,
        }
    }

    pub fn style(&self, role: TextRole) -> FontStyle {
        self.styles
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, style)| *style)
            .unwrap_or(FontStyle {
                size: 16.0,
                line_height: 21,
            })
    }

    /// A pen for `role`, or `FontUnavailable` when no font was loaded.
    pub fn pen(&self, role: TextRole) -> Result<Pen<'_>, RenderError> {
        let font = self.font.as_ref().ok_or_else(|| RenderError::FontUnavailable {
            path: self.path.clone(),
        })?;
        let style = self.style(role);
        Ok(Pen {
            font,
            scale: PxScale::from(style.size),
            line_height: style.line_height,
        })
    }
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBook")
            .field("path", &self.path)
            .field("loaded", &self.font.is_some())
            .finish()
    }
}

/// Measures and draws text at one size.
#[derive(Clone, Copy)]
pub struct Pen<'f> {
    font: &'f FontVec,
    scale: PxScale,
    pub line_height: u32,
}

impl Pen<'_> {
    pub fn width(&self, text: &str) -> u32 {
        text_size(self.scale, self.font, text).0
    }

    pub fn space_width(&self) -> u32 {
        let scaled = self.font.as_scaled(self.scale);
        scaled.h_advance(self.font.glyph_id(' ')).ceil() as u32
    }

    pub fn draw(&self, canvas: &mut Canvas, text: &str, x: i32, y: i32, color: Rgba<u8>) {
        draw_text_mut(canvas, color, x, y, self.scale, self.font, text);
    }

    /// Greedy word wrap of `text` to `max_width` pixels.
    pub fn wrap(&self, text: &str, max_width: u32) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        wrap_measured(words, max_width, self.space_width(), |w| self.width(w))
            .into_iter()
            .map(|line| line.join(" "))
            .collect()
    }
}
