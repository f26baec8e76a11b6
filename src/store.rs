//! A directory of page files.
//!
//! Every regular file directly inside the wiki root whose name is a wiki name
//! is a page; everything else (wiki.json, editor backups, subdirectories) is
//! ignored.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use wikimark::scan::{TokenKind, tokens};
use wikimark::{PageIndex, WikiName};

use crate::config::WikiConfig;

pub struct PageStore {
    root: PathBuf,
    pages: BTreeSet<WikiName>,
}

impl PageStore {
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            anyhow::bail!("Wiki directory not found: {}", root.display());
        }

        let mut pages = BTreeSet::new();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry =
                entry.with_context(|| format!("Failed to list {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            match WikiName::parse(&file_name) {
                Some(name) => {
                    pages.insert(name);
                }
                None => log::debug!("skipping non-page file {}", entry.path().display()),
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            pages,
        })
    }

    pub fn pages(&self) -> impl Iterator<Item = &WikiName> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn contains(&self, name: &WikiName) -> bool {
        self.pages.contains(name)
    }

    pub fn path_of(&self, name: &WikiName) -> PathBuf {
        self.root.join(name.as_str())
    }

    pub fn read(&self, name: &WikiName) -> Result<String> {
        let path = self.path_of(name);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Oracle over the stored pages with the configured auto pages and links.
    pub fn index(&self, config: &WikiConfig) -> Result<PageIndex> {
        let auto = config
            .auto_pages()?
            .into_iter()
            .filter_map(|page| page.wiki_name());
        Ok(PageIndex::new()
            .with_hrefs(config.href_style())
            .with_existing(self.pages.iter().cloned())
            .with_auto(auto))
    }
}

/// Page names linked from `text`, in order of first appearance.
///
/// Uses the same scanner as the compiler, so names in heading lines or inside
/// macro calls do not count.
pub fn links_in(text: &str) -> Vec<WikiName> {
    let mut seen = BTreeSet::new();
    let mut links = Vec::new();
    for line in text.lines() {
        for token in tokens(line, true) {
            if token.kind != TokenKind::InternalLink {
                continue;
            }
            if let Some(name) = WikiName::parse(token.text) {
                if seen.insert(name.clone()) {
                    links.push(name);
                }
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wikimark::{PageOracle, PageStatus};

    fn name(s: &str) -> WikiName {
        WikiName::parse(s).unwrap()
    }

    #[test]
    fn test_open_lists_only_pages() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("FrontPage"), "hi").unwrap();
        fs::write(dir.path().join("OtherPage"), "there").unwrap();
        fs::write(dir.path().join("wiki.json"), "{}").unwrap();
        fs::write(dir.path().join("FrontPage~"), "backup").unwrap();
        fs::create_dir(dir.path().join("SubDir")).unwrap();

        let store = PageStore::open(dir.path()).unwrap();
        assert_eq!(
            store.pages().map(WikiName::as_str).collect::<Vec<_>>(),
            vec!["FrontPage", "OtherPage"]
        );
        assert_eq!(store.read(&name("OtherPage")).unwrap(), "there");
    }

    #[test]
    fn test_open_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PageStore::open(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_index_marks_auto_pages() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("FrontPage"), "hi").unwrap();
        let store = PageStore::open(dir.path()).unwrap();
        let index = store.index(&WikiConfig::default()).unwrap();

        assert_eq!(index.status(&name("FrontPage")), PageStatus::Existing);
        assert_eq!(index.status(&name("SiteMap")), PageStatus::Auto);
        assert_eq!(
            index.resolve(&name("SiteMap")).unwrap().href,
            "SiteMap.html"
        );
    }

    #[test]
    fn test_links_in_order_without_duplicates() {
        let text = "See OtherPage and FrontPage.\n__HeadingPage__\n * OtherPage again\n[[MacroPage]]";
        assert_eq!(
            links_in(text),
            vec![name("OtherPage"), name("FrontPage")]
        );
    }
}
