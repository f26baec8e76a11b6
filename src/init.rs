use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use crate::config::CONFIG_FILE;

/// Scaffold a new wiki at the given path.
///
/// Existing files are never overwritten.
pub fn init_wiki(path: Option<&str>, quiet: bool) -> Result<()> {
    let target = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    let wiki_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "wiki".to_string());

    if !quiet {
        println!(
            "{} {} at {}",
            "Initializing".green().bold(),
            wiki_name,
            target.display()
        );
    }

    fs::create_dir_all(&target)
        .with_context(|| format!("Failed to create {}", target.display()))?;

    let files = [
        (CONFIG_FILE, generate_wiki_json(&wiki_name)),
        ("FrontPage", generate_front_page(&wiki_name)),
    ];
    for (file, content) in files {
        let path = target.join(file);
        if path.exists() {
            if !quiet {
                println!("  {} {} (already exists)", "Skipped".yellow(), file);
            }
            continue;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        if !quiet {
            println!("  {} {}", "Created".green(), file);
        }
    }

    if !quiet {
        println!();
        println!("{}", "Done! Next steps:".bold());
        println!("  1. Edit FrontPage; CamelCase words link to other pages");
        println!("  2. Run `wikimark build {} --out site`", target.display());
    }

    Ok(())
}

fn generate_wiki_json(name: &str) -> String {
    let config = serde_json::json!({
        "frontPage": "FrontPage",
        "title": name,
        "noFollowOutlinks": true,
        "numberedOutlinks": true,
        "autoPages": ["SiteMap"],
        "hrefStyle": "static",
        "baseUrl": "",
    });
    // json! values always serialize
    format!("{}\n", serde_json::to_string_pretty(&config).unwrap_or_default())
}

fn generate_front_page(name: &str) -> String {
    format!(
        "__Welcome to {name}__\n\
         \n\
         This is the FrontPage. Words like NewPage become links; follow the \
         question mark to a page that does not exist yet.\n\
         \n\
         \x20* two quotes make ''emphasis'', three make '''strong''' text\n\
         \x20* indent with spaces for a blockquote, add * or # for lists\n\
         \x20* wrap text in {{{{ and }}}} to keep it preformatted\n\
         \n\
         ----\n\
         See the SiteMap for every page.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;

    #[test]
    fn test_init_creates_config_and_front_page() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("notes");
        init_wiki(target.to_str(), true).unwrap();

        let config = load_config(&target).unwrap();
        assert_eq!(config.front_page, "FrontPage");
        assert_eq!(config.title.as_deref(), Some("notes"));

        let front = fs::read_to_string(target.join("FrontPage")).unwrap();
        assert!(front.starts_with("__Welcome to notes__\n"));
        assert!(front.contains("\n * two quotes"));
        assert!(front.contains("{{ and }}"));
    }

    #[test]
    fn test_init_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("FrontPage"), "mine").unwrap();
        init_wiki(dir.path().to_str(), true).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("FrontPage")).unwrap(), "mine");
        assert!(dir.path().join(CONFIG_FILE).exists());
    }
}
