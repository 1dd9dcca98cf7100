//! `mdslides --watch` — re-render whenever the input changes.

use anyhow::{Context, Result};
use colored::Colorize;
use notify::{EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Block forever, calling `rerender` after every modify/create event that
/// touches `input` (a file, or any file under a directory). Errors from
/// `rerender` are printed and watching continues.
pub fn watch_and_rerender<F>(input: &Path, quiet: bool, mut rerender: F) -> Result<()>
where
    F: FnMut() -> Result<()>,
{
    let input = std::fs::canonicalize(input)
        .with_context(|| format!("Cannot resolve path '{}'", input.display()))?;

    let (watch_dir, mode) = if input.is_dir() {
        (input.clone(), RecursiveMode::Recursive)
    } else {
        let parent = input
            .parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("Cannot determine parent directory of '{}'", input.display()))?;
        (parent, RecursiveMode::NonRecursive)
    };

    if !quiet {
        println!(
            "{} {} for changes (Ctrl+C to stop)",
            "Watching".cyan().bold(),
            input.display()
        );
    }

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;
    watcher.watch(&watch_dir, mode)?;

    let mut last_render = Instant::now();
    let debounce = Duration::from_millis(200);

    loop {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(event) => {
                let relevant = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
                    && event.paths.iter().any(|p| affects(&input, p));

                if relevant && last_render.elapsed() > debounce {
                    // Let the editor finish writing.
                    std::thread::sleep(Duration::from_millis(50));

                    match rerender() {
                        Ok(()) => last_render = Instant::now(),
                        Err(e) => eprintln!("{} {:#}", "Render error:".red().bold(), e),
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

/// Does a change at `changed` concern the watched `input`?
fn affects(input: &Path, changed: &Path) -> bool {
    let changed: PathBuf = changed.canonicalize().unwrap_or_else(|_| changed.to_path_buf());
    if input.is_dir() {
        changed.starts_with(input)
            && changed
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
    } else {
        changed == input
    }
}
