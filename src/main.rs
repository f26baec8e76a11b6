use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use wikimark::WikiName;

mod build;
mod check;
mod config;
mod init;
mod macros;
mod page;
mod site;
mod sitemap;
mod store;

use config::Overrides;
use site::Site;

#[derive(Parser)]
#[command(name = "wikimark", version, about = "Compile wiki markup pages into XHTML")]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log compiler decisions to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Mark external links rel="nofollow"
    #[arg(long, global = true, conflicts_with = "follow")]
    no_follow: bool,

    /// Leave external links followable
    #[arg(long, global = true)]
    follow: bool,

    /// Show external links as [1], [2], ...
    #[arg(long, global = true, conflicts_with = "plain")]
    numbered: bool,

    /// Show external links as their URL
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            no_follow_outlinks: flag_pair(self.no_follow, self.follow),
            numbered_outlinks: flag_pair(self.numbered, self.plain),
        }
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum RenderFormat {
    /// Compiled contents only
    Fragment,
    /// Complete XHTML page
    Page,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile one page file and print it
    Render {
        /// Path to the page file
        file: String,

        /// Output format
        #[arg(long, value_enum, default_value = "fragment")]
        format: RenderFormat,
    },

    /// Compile every page in a directory into a static site
    Build {
        /// Wiki directory (default: current directory)
        #[arg(default_value = ".")]
        dir: String,

        /// Output directory
        #[arg(long, default_value = "site")]
        out: String,

        /// Rebuild when pages change
        #[arg(long)]
        watch: bool,
    },

    /// Report diagnostics for page file(s)
    Check {
        /// Page files
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Scaffold a new wiki
    Init {
        /// Directory to initialize (default: current directory)
        path: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let overrides = cli.overrides();
    match cli.command {
        Commands::Render { file, format } => {
            handle_render(&file, format, overrides)?;
        }
        Commands::Build { dir, out, watch } => {
            let (dir, out) = (Path::new(&dir), Path::new(&out));
            let report = build::handle_build(dir, out, overrides, cli.quiet)?;
            if !cli.quiet {
                report.print_summary(out);
            }
            if watch {
                build::watch_and_rebuild(dir, out, overrides, cli.quiet)?;
            }
        }
        Commands::Check { files } => {
            if check::handle_check(&files, overrides)? {
                std::process::exit(1);
            }
        }
        Commands::Init { path } => {
            init::init_wiki(path.as_deref(), cli.quiet)?;
        }
    }

    Ok(())
}

fn handle_render(file: &str, format: RenderFormat, overrides: Overrides) -> Result<()> {
    let path = PathBuf::from(file);
    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let site = Site::load(&root, overrides)?;

    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read '{}': {}", file, e))?;
    let result = site.compile(&content);

    // Print compile diagnostics to stderr
    for diag in &result.diagnostics {
        if diag.severity != wikimark::Severity::Info {
            eprintln!("{}:{}: {} {}", file, diag.line, "warning:".yellow(), diag.message);
        }
    }

    let output = match format {
        RenderFormat::Fragment => result.html,
        RenderFormat::Page => {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let name: WikiName = file_name
                .parse()
                .with_context(|| format!("Cannot render '{file}' as a page"))?;
            site.render_page(&name, &result.html)
        }
    };

    println!("{output}");
    Ok(())
}
