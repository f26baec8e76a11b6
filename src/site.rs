//! A loaded wiki: configuration, stored pages, and everything needed to
//! compile them.

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;

use wikimark::{CompileResult, Compiler, HrefStyle, MacroRegistry, Options, PageIndex, WikiName};

use crate::config::{self, AutoPage, Overrides};
use crate::macros;
use crate::page::PageFrame;
use crate::sitemap::site_map_markup;
use crate::store::PageStore;

pub struct Site {
    pub store: PageStore,
    pub options: Options,
    pub front_page: WikiName,
    pub auto_pages: Vec<AutoPage>,
    hrefs: HrefStyle,
    index: PageIndex,
    macros: MacroRegistry,
    site_title: String,
    site_pages: Vec<WikiName>,
}

impl Site {
    pub fn load(root: &Path, overrides: Overrides) -> Result<Self> {
        let config = config::load_config(root)?;
        let store = PageStore::open(root)?;
        let front_page = config.front_page()?;
        let auto_pages = config.auto_pages()?;
        let hrefs = config.href_style();
        let index = store.index(&config)?;

        let auto_names: Vec<WikiName> = auto_pages.iter().filter_map(|p| p.wiki_name()).collect();
        let all_pages: BTreeSet<WikiName> =
            store.pages().cloned().chain(auto_names.iter().cloned()).collect();
        let all_pages: Vec<WikiName> = all_pages.into_iter().collect();
        let macros = macros::registry(&all_pages, &hrefs);

        let mut site_pages = vec![front_page.clone()];
        site_pages.extend(auto_names.into_iter().filter(|name| *name != front_page));

        log::debug!(
            "loaded wiki at {} with {} pages",
            root.display(),
            store.len()
        );

        Ok(Self {
            options: config.options(overrides),
            site_title: config.site_title(),
            store,
            front_page,
            auto_pages,
            hrefs,
            index,
            macros,
            site_pages,
        })
    }

    pub fn compiler(&self) -> Compiler<'_> {
        Compiler::new(self.options)
            .with_oracle(&self.index)
            .with_macros(&self.macros)
    }

    pub fn compile(&self, text: &str) -> CompileResult {
        self.compiler().compile_with_diagnostics(text)
    }

    pub fn auto_page(&self, name: &WikiName) -> Option<AutoPage> {
        self.auto_pages
            .iter()
            .copied()
            .find(|page| page.name() == name.as_str())
    }

    /// Markup for `name`: generated for auto pages, read from disk otherwise.
    pub fn page_text(&self, name: &WikiName) -> Result<String> {
        match self.auto_page(name) {
            Some(AutoPage::SiteMap) => {
                site_map_markup(&self.store, &self.index, &self.front_page)
            }
            None => self.store.read(name),
        }
    }

    /// Wrap compiled contents in the page skeleton.
    pub fn render_page(&self, name: &WikiName, contents: &str) -> String {
        PageFrame {
            site_title: &self.site_title,
            hrefs: &self.hrefs,
            site_pages: &self.site_pages,
        }
        .render(name, contents)
    }

    /// Every page the build writes: stored pages plus auto pages.
    pub fn output_pages(&self) -> Vec<WikiName> {
        let mut names: BTreeSet<WikiName> = self.store.pages().cloned().collect();
        names.extend(self.auto_pages.iter().filter_map(|p| p.wiki_name()));
        names.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_site_compiles_with_links_and_macros() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("FrontPage"), "Welcome. [[PageCount]] pages, see SiteMap.").unwrap();
        fs::write(dir.path().join("OtherPage"), "Back to FrontPage").unwrap();
        let site = Site::load(dir.path(), Overrides::default()).unwrap();

        let front = WikiName::parse("FrontPage").unwrap();
        let result = site.compile(&site.page_text(&front).unwrap());
        assert!(result.html.contains("Welcome. 3 pages"), "{}", result.html);
        assert!(result.html.contains("href=\"SiteMap.html\">Site Map</a>"), "{}", result.html);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);

        let names: Vec<_> = site.output_pages().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["FrontPage", "OtherPage", "SiteMap"]);
    }

    #[test]
    fn test_auto_page_shadows_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("SiteMap"), "hand written").unwrap();
        let site = Site::load(dir.path(), Overrides::default()).unwrap();

        let text = site.page_text(&WikiName::parse("SiteMap").unwrap()).unwrap();
        assert!(text.starts_with("__Tree of pages"), "{text}");
    }
}
