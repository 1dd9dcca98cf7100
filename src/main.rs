use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};

mod config;
mod export;
mod watch;

#[derive(Parser)]
#[command(
    name = "mdslides",
    version,
    about = "Turn Markdown documents into paginated slide images"
)]
struct Cli {
    /// Markdown file, or a directory of Markdown files
    input: PathBuf,

    /// Directory for the rendered pages (default: a temporary directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file, created with defaults if it does not exist
    #[arg(short, long, default_value = "mdslides.json")]
    config: PathBuf,

    /// Do not open the rendered pages in the system viewer
    #[arg(long)]
    no_show: bool,

    /// Pre-wrap paragraphs to this many characters
    #[arg(long, value_name = "CHARS")]
    wrap: Option<usize>,

    /// Print the classified blocks instead of rendering
    #[arg(long)]
    blocks: bool,

    /// Re-render whenever the input changes
    #[arg(long)]
    watch: bool,

    /// Suppress non-essential output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log progress details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    if !cli.input.exists() {
        bail!("Input file does not exist: {}", cli.input.display());
    }

    let mut config = config::load_or_create(&cli.config)?;
    if let Some(wrap) = cli.wrap {
        config.page_layout.max_line_chars = Some(wrap);
    }
    config.validate().context("Invalid configuration")?;

    if cli.blocks {
        return print_blocks(&cli.input, &config);
    }

    let out_dir = match &cli.output {
        Some(dir) => dir.clone(),
        None => default_output_dir(&cli.input),
    };
    let show = cli.output.is_none() && !cli.no_show;

    render_once(&cli.input, &out_dir, &config, cli.quiet)?;
    if show {
        export::show(&out_dir);
    }

    if cli.watch {
        watch::watch_and_rerender(&cli.input, cli.quiet, || {
            render_once(&cli.input, &out_dir, &config, cli.quiet)
        })?;
    }

    Ok(())
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn render_once(input: &Path, out_dir: &Path, config: &slide_engine::Config, quiet: bool) -> Result<()> {
    let report = export::convert(input, out_dir, config, quiet)?;
    if !quiet {
        report.print_summary(out_dir);
    }
    Ok(())
}

/// Where pages go when no `--output` was given.
fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "slides".to_string());
    std::env::temp_dir().join("mdslides").join(stem)
}

fn print_blocks(input: &Path, config: &slide_engine::Config) -> Result<()> {
    let options = slide_engine::ParseOptions {
        max_line_chars: config.page_layout.max_line_chars,
    };
    for file in export::collect_inputs(input) {
        let markdown = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let blocks = slide_engine::parse(&markdown, &options);
        println!("{}", file.display().to_string().bold());
        println!("{}", slide_engine::render_term::to_terminal(&blocks));
        println!();
    }
    Ok(())
}
