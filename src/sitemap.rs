//! The generated SiteMap page.
//!
//! Written as wiki markup and compiled like any other page: a tree of pages
//! reachable from the front page (each page listed under the first page that
//! links to it), then pages outside the tree and linked pages that do not
//! exist yet, both alphabetical.

use anyhow::Result;
use std::collections::BTreeSet;

use wikimark::{PageIndex, PageStatus, WikiName};

use crate::store::{PageStore, links_in};

const NONE_MARKER: &str = "(none)";

/// Only pages `index` reports as new count as wanted; auto pages never do.
pub fn site_map_markup(store: &PageStore, index: &PageIndex, front_page: &WikiName) -> Result<String> {
    let mut unmapped: BTreeSet<WikiName> = store
        .pages()
        .filter(|name| *name != front_page)
        .cloned()
        .collect();
    let mut wanted = BTreeSet::new();

    let mut text = format!("__Tree of pages, starting from {front_page}__\n *{front_page}\n");
    if store.contains(front_page) {
        map_children(store, index, front_page, 2, &mut unmapped, &mut wanted, &mut text)?;
    } else if index.status(front_page) == PageStatus::New {
        wanted.insert(front_page.clone());
    }

    text.push_str("__Pages outside tree__\n");
    push_list(&mut text, &unmapped);
    text.push_str("__Wanted pages__\n");
    push_list(&mut text, &wanted);
    Ok(text)
}

fn map_children(
    store: &PageStore,
    index: &PageIndex,
    page: &WikiName,
    indent: usize,
    unmapped: &mut BTreeSet<WikiName>,
    wanted: &mut BTreeSet<WikiName>,
    text: &mut String,
) -> Result<()> {
    for child in links_in(&store.read(page)?) {
        if unmapped.remove(&child) {
            text.push_str(&format!("{}*{child}\n", " ".repeat(indent)));
            map_children(store, index, &child, indent + 1, unmapped, wanted, text)?;
        } else if index.status(&child) == PageStatus::New {
            wanted.insert(child);
        }
    }
    Ok(())
}

fn push_list(text: &mut String, names: &BTreeSet<WikiName>) {
    if names.is_empty() {
        text.push_str(&format!(" *{NONE_MARKER}\n"));
    }
    for name in names {
        text.push_str(&format!(" *{name}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    use crate::config::WikiConfig;

    fn markup(dir: &std::path::Path) -> String {
        let store = PageStore::open(dir).unwrap();
        let index = store.index(&WikiConfig::default()).unwrap();
        site_map_markup(&store, &index, &WikiName::parse("FrontPage").unwrap()).unwrap()
    }

    #[test]
    fn test_tree_outside_and_wanted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("FrontPage"), "Go to AboutUs or NewsDesk.").unwrap();
        fs::write(dir.path().join("AboutUs"), "Back to FrontPage, see TeamList.").unwrap();
        fs::write(dir.path().join("TeamList"), "Members.").unwrap();
        fs::write(dir.path().join("LonelyPage"), "Nobody links here.").unwrap();
        assert_eq!(
            markup(dir.path()),
            "__Tree of pages, starting from FrontPage__\n \
             *FrontPage\n  \
             *AboutUs\n   \
             *TeamList\n\
             __Pages outside tree__\n \
             *LonelyPage\n\
             __Wanted pages__\n \
             *NewsDesk\n"
        );
    }

    #[test]
    fn test_missing_front_page_is_wanted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("OtherPage"), "x").unwrap();
        let markup = markup(dir.path());
        assert!(markup.contains("__Pages outside tree__\n *OtherPage\n"), "{markup}");
        assert!(markup.ends_with("__Wanted pages__\n *FrontPage\n"), "{markup}");
    }

    #[test]
    fn test_auto_page_link_is_not_wanted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("FrontPage"), "See SiteMap and MissingPage.").unwrap();

        let markup = markup(dir.path());
        assert!(markup.ends_with("__Wanted pages__\n *MissingPage\n"), "{markup}");
        assert!(!markup.contains(" *SiteMap\n"), "{markup}");
    }
}
