//! `wikimark build`: compile a page directory into a static site.
//!
//! Each page becomes `<out>/<Name>.html`. Outputs whose content did not change
//! are left untouched so file timestamps stay meaningful.

use anyhow::{Context, Result};
use colored::Colorize;
use notify::{EventKind, RecursiveMode, Watcher};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::config::Overrides;
use crate::site::Site;

/// Result status for a single output file.
#[derive(Debug, PartialEq)]
enum FileStatus {
    Created,
    Updated,
    Unchanged,
}

/// Aggregate report from one build.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub warnings: usize,
}

impl BuildReport {
    fn record(&mut self, status: FileStatus) {
        match status {
            FileStatus::Created => self.created += 1,
            FileStatus::Updated => self.updated += 1,
            FileStatus::Unchanged => self.unchanged += 1,
        }
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
        if parts.is_empty() {
            parts.push("no pages".to_string());
        }

        println!(
            "{} {} ({})",
            "Built".green().bold(),
            out_dir.display(),
            parts.join(", ")
        );
        if self.warnings > 0 {
            println!(
                "{} {} diagnostics, run `wikimark check` for details",
                "WARNING:".yellow(),
                self.warnings
            );
        }
    }
}

pub fn handle_build(dir: &Path, out_dir: &Path, overrides: Overrides, quiet: bool) -> Result<BuildReport> {
    let site = Site::load(dir, overrides)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create '{}'", out_dir.display()))?;

    let mut report = BuildReport::default();
    for name in site.output_pages() {
        let text = site.page_text(&name)?;
        let result = site.compile(&text);
        for diag in &result.diagnostics {
            log::debug!("{name}:{}: {}", diag.line, diag.message);
        }
        report.warnings += result
            .diagnostics
            .iter()
            .filter(|d| d.severity != wikimark::Severity::Info)
            .count();

        let html = site.render_page(&name, &result.html);
        let out_path = out_dir.join(format!("{name}.html"));
        let status = write_if_changed(&out_path, &html)?;
        if !quiet && status != FileStatus::Unchanged {
            let label = match status {
                FileStatus::Created => "created".green(),
                _ => "updated".cyan(),
            };
            println!("  {} {}", label, out_path.display());
        }
        report.record(status);
    }

    Ok(report)
}

/// Write `content` unless the file already holds exactly that.
fn write_if_changed(path: &Path, content: &str) -> Result<FileStatus> {
    let status = if !path.exists() {
        FileStatus::Created
    } else if file_hash(path)? == content_hash(content.as_bytes()) {
        return Ok(FileStatus::Unchanged);
    } else {
        FileStatus::Updated
    };
    fs::write(path, content).with_context(|| format!("Failed to write '{}'", path.display()))?;
    Ok(status)
}

/// Compute SHA-256 hash of file contents.
fn file_hash(path: &Path) -> Result<String> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content_hash(&content))
}

fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Watch the page directory for changes and rebuild on each save.
///
/// Debounces rapid events (e.g. editors that write in stages) with a 200ms window.
/// Ctrl+C exits cleanly.
pub fn watch_and_rebuild(dir: &Path, out_dir: &Path, overrides: Overrides, quiet: bool) -> Result<()> {
    let watch_dir = fs::canonicalize(dir)
        .with_context(|| format!("Cannot resolve path '{}'", dir.display()))?;
    // Output may live inside the watched directory; its writes must not retrigger.
    let out_abs = fs::canonicalize(out_dir).unwrap_or_else(|_| out_dir.to_path_buf());

    println!(
        "{} {} for changes (Ctrl+C to stop)",
        "Watching".cyan().bold(),
        dir.display()
    );

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

    let mut last_rebuild = Instant::now();
    let debounce = Duration::from_millis(200);

    loop {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(event) => {
                let relevant_kind = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );
                let affects_pages = event.paths.iter().any(|p| is_source_path(p, &out_abs));

                if relevant_kind && affects_pages && last_rebuild.elapsed() > debounce {
                    // Small delay to let the editor finish writing
                    std::thread::sleep(Duration::from_millis(50));

                    match handle_build(dir, out_dir, overrides, quiet) {
                        Ok(report) => {
                            if !quiet {
                                report.print_summary(out_dir);
                            }
                            last_rebuild = Instant::now();
                        }
                        Err(e) => {
                            eprintln!("{} {:#}", "Build error:".red().bold(), e);
                        }
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}

fn is_source_path(path: &Path, out_dir: &Path) -> bool {
    let path: PathBuf = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if path.starts_with(out_dir) {
        return false;
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == crate::config::CONFIG_FILE || wikimark::wikiname::is_valid(n))
}
