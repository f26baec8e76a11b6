//! `wikimark check`: report diagnostics for page files.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use wikimark::{Diagnostic, Severity, WikiName};

use crate::config::Overrides;
use crate::site::Site;

/// Check every file; returns true if any file had an error.
pub fn handle_check(files: &[String], overrides: Overrides) -> Result<bool> {
    let mut has_errors = false;

    for file in files {
        let diagnostics = check_file(Path::new(file), overrides)?;

        if diagnostics.is_empty() {
            println!("{}: {}", file, "OK".green());
            continue;
        }
        for diag in &diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => {
                    has_errors = true;
                    format!("{}", "error".red().bold())
                }
                Severity::Warning => format!("{}", "warning".yellow().bold()),
                Severity::Info => format!("{}", "info".cyan().bold()),
            };

            let line_info = if diag.line > 0 {
                format!("{}:{}", file, diag.line)
            } else {
                file.to_string()
            };

            let code_str = match &diag.code {
                Some(c) => format!("[{}] ", c),
                None => String::new(),
            };

            println!("{line_info}: {severity_str}: {code_str}{}", diag.message);
        }
    }

    Ok(has_errors)
}

fn check_file(path: &Path, overrides: Overrides) -> Result<Vec<Diagnostic>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read '{}': {}", path.display(), e))?;

    let mut diagnostics = Vec::new();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if !wikimark::wikiname::is_valid(&file_name) {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message: format!("File name '{file_name}' is not a wiki name, so the page is unreachable"),
            line: 0,
            code: Some("E001".to_string()),
        });
    }

    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let site = Site::load(root, overrides)?;
    diagnostics.extend(site.compile(&text).diagnostics);

    if let Some(name) = WikiName::parse(&file_name) {
        if site.auto_page(&name).is_some() {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                message: format!("'{name}' is generated automatically; this file is ignored"),
                line: 0,
                code: Some("W101".to_string()),
            });
        }
    }

    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().filter_map(|d| d.code.as_deref()).collect()
    }

    #[test]
    fn test_check_reports_compile_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("OtherPage"), "x").unwrap();
        let page = dir.path().join("FrontPage");
        fs::write(&page, "See OtherPage and MissingPage [[Nope]]").unwrap();

        let diagnostics = check_file(&page, Overrides::default()).unwrap();
        assert_eq!(codes(&diagnostics), vec!["I001", "W001"]);
    }

    #[test]
    fn test_bad_file_name_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("notes.txt");
        fs::write(&page, "plain").unwrap();

        let diagnostics = check_file(&page, Overrides::default()).unwrap();
        assert_eq!(codes(&diagnostics), vec!["E001"]);
        assert_eq!(diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_auto_page_file_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("SiteMap");
        fs::write(&page, "mine").unwrap();

        let diagnostics = check_file(&page, Overrides::default()).unwrap();
        assert_eq!(codes(&diagnostics), vec!["W101"]);
    }
}
