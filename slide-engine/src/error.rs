use std::path::PathBuf;

use crate::types::BlockKind;

/// Errors raised while drawing a single block or a page background.
///
/// A failure while drawing a block is not fatal: the layout engine logs it and
/// treats the block as zero height.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("font unavailable: {}", path.display())]
    FontUnavailable { path: PathBuf },

    #[error("malformed table: {0}")]
    MalformedTable(String),

    #[error("no syntax highlighting for language '{0}'")]
    UnsupportedLanguage(String),

    #[error("unknown highlighting theme '{0}'")]
    UnknownTheme(String),

    #[error("syntax highlighting failed: {0}")]
    Highlight(#[source] syntect::Error),

    #[error("failed to load background image {}: {source}", path.display())]
    BackgroundImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Fatal errors that abort pagination of a document.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error(
        "{kind} block needs {height}px but a single block may use at most {limit}px of the page"
    )]
    BlockTooTall {
        kind: BlockKind,
        height: u32,
        limit: u32,
    },

    #[error("could not create page background: {0}")]
    Background(#[source] RenderError),
}

/// Errors found while reading or validating configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(String),

    #[error("invalid colour '{0}': expected #RGB, #RGBA, #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    #[error("invalid page layout: {0}")]
    InvalidLayout(String),
}
