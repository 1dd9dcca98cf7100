//! `slide-engine` — Markdown to paginated slide images.
//!
//! The pipeline has two halves. Parsing splits a document into
//! header-delimited sections and runs a set of small line parsers over each
//! one, producing a flat stream of typed [`TextBlock`]s. Layout then places
//! those blocks greedily onto fixed-size pages through a [`BlockRenderer`],
//! measuring each block on a scratch copy of the page before committing it.
//!
//! # Quick start
//!
//! ```
//! use slide_engine::{parse, BlockKind, ParseOptions};
//!
//! let blocks = parse("# Deck\n\n- one\n- two\n", &ParseOptions::default());
//! assert_eq!(blocks[0].kind, BlockKind::Title);
//! assert_eq!(blocks[1].data, "one\ntwo");
//! ```

pub mod blocks;
pub mod config;
pub mod error;
pub mod inline;
pub mod layout;
pub mod parse;
pub mod render;
#[cfg(feature = "terminal")]
pub mod render_term;
pub mod sections;
pub mod types;
pub mod wrap;

pub use config::{Config, HexColor};
pub use error::*;
pub use inline::{parse_formatted_words, SpanStyle};
pub use layout::{Page, Paginator, MAX_BLOCK_FRACTION};
pub use parse::{parse, parse_sections, ParseOptions};
pub use render::{BackgroundKind, BlockRenderer, Canvas, SlideRenderer};
pub use sections::split_sections;
pub use types::*;

/// Parse `markdown` and lay it out with `renderer`.
///
/// Nothing touches the disk; the caller decides what to do with the pages.
pub fn render_markdown<R: BlockRenderer + ?Sized>(
    markdown: &str,
    config: &Config,
    renderer: &R,
) -> Result<Vec<Page>, LayoutError> {
    let options = ParseOptions {
        max_line_chars: config.page_layout.max_line_chars,
    };
    let blocks = parse(markdown, &options);
    tracing::info!(blocks = blocks.len(), "parsed document");
    Paginator::new(renderer, config).paginate(&blocks)
}
