//! Converting documents and writing their pages to disk.

use anyhow::{Context, Result};
use colored::Colorize;
use image::ImageFormat;
use sha2::{Digest, Sha256};
use slide_engine::{BlockRenderer, Config, Page, SlideRenderer};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Tally of what happened to the page files of one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub documents: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Page files from an earlier, longer render that were deleted.
    pub removed: usize,
}

impl ExportReport {
    pub fn pages(&self) -> usize {
        self.created + self.updated + self.unchanged
    }

    pub fn print_summary(&self, out_dir: &Path) {
        let mut parts = Vec::new();
        if self.created > 0 {
            parts.push(format!("{} created", self.created));
        }
        if self.updated > 0 {
            parts.push(format!("{} updated", self.updated));
        }
        if self.unchanged > 0 {
            parts.push(format!("{} unchanged", self.unchanged));
        }
        if self.removed > 0 {
            parts.push(format!("{} removed", self.removed));
        }

        let docs = if self.documents == 1 {
            "1 document".to_string()
        } else {
            format!("{} documents", self.documents)
        };
        println!(
            "{} {} ({} pages) into {} ({})",
            "Rendered".green().bold(),
            docs,
            self.pages(),
            out_dir.display(),
            if parts.is_empty() {
                "no pages".to_string()
            } else {
                parts.join(", ")
            }
        );
    }
}

/// What happened to a single page file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
    Unchanged,
}

/// File name for the page with 1-based `index`.
pub fn page_file_name(index: usize) -> String {
    format!("page_{index:02}.png")
}

/// Every Markdown file to convert: `input` itself, or all `*.md` files under
/// it when it is a directory, sorted by path.
pub fn collect_inputs(input: &Path) -> Vec<PathBuf> {
    if !input.is_dir() {
        return vec![input.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("md")))
        .collect();
    files.sort();
    files
}

/// Convert every input under `input` into `out_dir`. A directory input
/// gets one subdirectory per document, named after the file stem.
pub fn convert(input: &Path, out_dir: &Path, config: &Config, quiet: bool) -> Result<ExportReport> {
    let renderer = SlideRenderer::new(config.clone());
    convert_with(input, out_dir, config, &renderer, quiet)
}

/// [`convert`] with a caller-supplied renderer.
///
/// Every document is laid out before the first file is written, so a
/// failing document leaves the output directory untouched.
pub fn convert_with<R: BlockRenderer + ?Sized>(
    input: &Path,
    out_dir: &Path,
    config: &Config,
    renderer: &R,
    quiet: bool,
) -> Result<ExportReport> {
    let batch = input.is_dir();
    let mut rendered: Vec<(PathBuf, Vec<Page>)> = Vec::new();

    for file in collect_inputs(input) {
        let markdown = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let pages = slide_engine::render_markdown(&markdown, config, renderer)
            .with_context(|| format!("Failed to lay out {}", file.display()))?;

        let target = if batch {
            let stem = file.file_stem().unwrap_or_default();
            out_dir.join(stem)
        } else {
            out_dir.to_path_buf()
        };
        rendered.push((target, pages));
    }

    let mut report = ExportReport::default();
    for (target, pages) in &rendered {
        write_pages(pages, target, quiet, &mut report)?;
        report.documents += 1;
    }
    Ok(report)
}

/// Write `pages` as PNG files into `dir`, leaving byte-identical files alone.
/// Page files numbered past the end of `pages` are deleted.
pub fn write_pages(pages: &[Page], dir: &Path, quiet: bool, report: &mut ExportReport) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    for page in pages {
        let path = dir.join(page_file_name(page.index));
        let bytes = encode_png(page)?;
        let outcome = write_if_changed(&path, &bytes)?;
        match outcome {
            WriteOutcome::Created => report.created += 1,
            WriteOutcome::Updated => report.updated += 1,
            WriteOutcome::Unchanged => report.unchanged += 1,
        }
        if !quiet && outcome != WriteOutcome::Unchanged {
            let label = match outcome {
                WriteOutcome::Created => "Created".green(),
                _ => "Updated".yellow(),
            };
            println!("  {} {}", label, path.display());
        }
    }

    for stale in stale_pages(dir, pages.len()) {
        std::fs::remove_file(&stale)
            .with_context(|| format!("Failed to remove {}", stale.display()))?;
        report.removed += 1;
        if !quiet {
            println!("  {} {}", "Removed".red(), stale.display());
        }
    }
    Ok(())
}

/// Page index encoded in a `page_NN.png` file name.
fn page_index(name: &str) -> Option<usize> {
    name.strip_prefix("page_")?.strip_suffix(".png")?.parse().ok()
}

/// Page files directly in `dir` whose index is above `count`.
fn stale_pages(dir: &Path, count: usize) -> Vec<PathBuf> {
    let mut stale: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .and_then(page_index)
                .is_some_and(|index| index > count)
        })
        .map(|e| e.into_path())
        .collect();
    stale.sort();
    stale
}

fn encode_png(page: &Page) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    page.canvas
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .with_context(|| format!("Failed to encode page {}", page.index))?;
    Ok(bytes)
}

fn write_if_changed(path: &Path, bytes: &[u8]) -> Result<WriteOutcome> {
    let outcome = if !path.exists() {
        WriteOutcome::Created
    } else if file_hash(path)? == bytes_hash(bytes) {
        return Ok(WriteOutcome::Unchanged);
    } else {
        WriteOutcome::Updated
    };
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(outcome)
}

fn file_hash(path: &Path) -> Result<String> {
    let content = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(bytes_hash(&content))
}

fn bytes_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Open `dir` in the platform's file viewer. Failure is only logged.
pub fn show(dir: &Path) {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    if let Err(e) = std::process::Command::new(opener).arg(dir).spawn() {
        tracing::warn!(dir = %dir.display(), "could not open viewer with {opener}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;
    use slide_engine::{BackgroundKind, BlockKind, Canvas, LayoutError, RenderError, TextBlock};

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("mdslides-export-test").join(name);
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn page(index: usize, shade: u8) -> Page {
        Page {
            index,
            canvas: Canvas::from_pixel(4, 4, Rgba([shade, shade, shade, 255])),
        }
    }

    #[test]
    fn page_names_are_zero_padded() {
        assert_eq!(page_file_name(1), "page_01.png");
        assert_eq!(page_file_name(12), "page_12.png");
        assert_eq!(page_file_name(123), "page_123.png");
    }

    #[test]
    fn rewriting_identical_pages_is_a_no_op() {
        let dir = scratch("unchanged");
        let pages = vec![page(1, 0), page(2, 10)];

        let mut first = ExportReport::default();
        write_pages(&pages, &dir, true, &mut first).unwrap();
        assert_eq!((first.created, first.updated, first.unchanged), (2, 0, 0));

        let mut second = ExportReport::default();
        write_pages(&[page(1, 0), page(2, 99)], &dir, true, &mut second).unwrap();
        assert_eq!((second.created, second.updated, second.unchanged), (0, 1, 1));
        assert_eq!(second.pages(), 2);

        let written = image::open(dir.join("page_02.png")).unwrap().to_rgba8();
        assert_eq!(*written.get_pixel(0, 0), Rgba([99, 99, 99, 255]));
        let _ = std::fs::remove_dir_all(&dir);
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn shorter_render_removes_trailing_pages() {
        let dir = scratch("shrink");
        let mut report = ExportReport::default();
        write_pages(&[page(1, 0), page(2, 0), page(3, 0)], &dir, true, &mut report).unwrap();
        std::fs::write(dir.join("notes.txt"), "keep me").unwrap();

        let mut report = ExportReport::default();
        write_pages(&[page(1, 0)], &dir, true, &mut report).unwrap();
        assert_eq!((report.unchanged, report.removed), (1, 2));
        assert_eq!(listing(&dir), vec!["notes.txt", "page_01.png"]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn page_index_reads_only_page_files() {
        assert_eq!(page_index("page_07.png"), Some(7));
        assert_eq!(page_index("page_123.png"), Some(123));
        assert_eq!(page_index("page_x.png"), None);
        assert_eq!(page_index("cover.png"), None);
    }

    /// Code blocks fill the whole page; everything else is one pixel tall.
    struct Tall;

    impl BlockRenderer for Tall {
        fn background(&self, _kind: BackgroundKind) -> Result<Canvas, RenderError> {
            Ok(Canvas::from_pixel(8, 100, Rgba([0, 0, 0, 255])))
        }

        fn draw_page_number(&self, _canvas: &mut Canvas, _number: i64) {}

        fn draw(
            &self,
            canvas: Canvas,
            block: &TextBlock,
            top: u32,
        ) -> Result<(Canvas, u32), RenderError> {
            let height = if block.kind == BlockKind::Code { 100 } else { 1 };
            Ok((canvas, top + height))
        }
    }

    #[test]
    fn failing_document_leaves_output_untouched() {
        let dir = scratch("all-or-nothing");
        let input = dir.join("in");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("a.md"), "# Good\n\nhello\n").unwrap();
        std::fs::write(input.join("b.md"), "```\nlet x = 1;\n```\n").unwrap();
        let out = dir.join("out");

        let mut config = Config::default();
        config.page_layout.image_height = 100;
        config.page_layout.top_margin = 10;
        config.page_layout.bottom_margin = 10;

        let err = convert_with(&input, &out, &config, &Tall, true).unwrap_err();
        assert!(format!("{err:#}").contains("b.md"), "{err:#}");
        assert!(matches!(
            err.downcast_ref::<LayoutError>(),
            Some(LayoutError::BlockTooTall { .. })
        ));
        assert!(!out.exists());

        std::fs::write(input.join("b.md"), "fixed\n").unwrap();
        let report = convert_with(&input, &out, &config, &Tall, true).unwrap();
        assert_eq!(report.documents, 2);
        assert!(out.join("a/page_01.png").exists());
        assert!(out.join("b/page_01.png").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn directory_inputs_are_walked_and_sorted() {
        let dir = scratch("walk");
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("b.md"), "# B").unwrap();
        std::fs::write(dir.join("nested/a.MD"), "# A").unwrap();
        std::fs::write(dir.join("notes.txt"), "skip").unwrap();

        let files = collect_inputs(&dir);
        assert_eq!(files, vec![dir.join("b.md"), dir.join("nested/a.MD")]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn single_file_input_is_returned_as_is() {
        let path = Path::new("deck.md");
        assert_eq!(collect_inputs(path), vec![path.to_path_buf()]);
    }
}
