//! Page backgrounds.

use std::path::Path;

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};

use crate::config::Config;
use crate::error::RenderError;
use crate::types::{BlockKind, TextBlock};

/// Which background a page gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackgroundKind {
    Title,
    Normal,
    Final,
    Question,
}

impl BackgroundKind {
    /// Background for the page a block opens: titles get the title page,
    /// headers ending in `?` the question page, everything else the default.
    pub fn for_block(block: &TextBlock) -> Self {
        match block.kind {
            BlockKind::Title => BackgroundKind::Title,
            BlockKind::Header if block.data.trim_end().ends_with('?') => BackgroundKind::Question,
            _ => BackgroundKind::Normal,
        }
    }
}

/// Build a `width` x `height` background for `kind`.
///
/// A configured image wins, then a configured gradient, then the flat
/// background colour. Title, question and final pages without their own
/// image fall back to the default page image.
pub fn create_background(
    config: &Config,
    kind: BackgroundKind,
    width: u32,
    height: u32,
) -> Result<RgbaImage, RenderError> {
    let paths = &config.paths;
    let specific = match kind {
        BackgroundKind::Title => paths.title_page.as_ref(),
        BackgroundKind::Question => paths.question_page.as_ref(),
        BackgroundKind::Final => paths.final_page.as_ref(),
        BackgroundKind::Normal => None,
    };

    if let Some(path) = specific.or(paths.default_page.as_ref()) {
        return load_resized(path, width, height);
    }

    if let Some((start, end)) = config.colors.gradient() {
        return Ok(vertical_gradient(width, height, start, end));
    }

    Ok(RgbaImage::from_pixel(
        width,
        height,
        config.colors.background.to_rgba(),
    ))
}

fn load_resized(path: &Path, width: u32, height: u32) -> Result<RgbaImage, RenderError> {
    let image = image::open(path).map_err(|source| RenderError::BackgroundImage {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image
        .resize_exact(width, height, FilterType::Triangle)
        .to_rgba8())
}

/// Linear top-to-bottom blend from `start` to `end`.
pub fn vertical_gradient(width: u32, height: u32, start: Rgba<u8>, end: Rgba<u8>) -> RgbaImage {
    let span = height.saturating_sub(1).max(1) as f32;
    RgbaImage::from_fn(width, height, |_, y| {
        let t = y as f32 / span;
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba([
            mix(start[0], end[0]),
            mix(start[1], end[1]),
            mix(start[2], end[2]),
            mix(start[3], end[3]),
        ])
    })
}
