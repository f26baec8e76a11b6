use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use wikimark::{HrefStyle, Options, WikiName};

pub const CONFIG_FILE: &str = "wiki.json";

/// Top-level wiki.json schema.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiConfig {
    #[serde(default = "default_front_page")]
    pub front_page: String,

    #[serde(default = "default_true")]
    pub no_follow_outlinks: bool,

    #[serde(default = "default_true")]
    pub numbered_outlinks: bool,

    #[serde(default = "default_auto_pages")]
    pub auto_pages: Vec<String>,

    #[serde(default)]
    pub href_style: HrefKind,

    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_script_name")]
    pub script_name: String,

    #[serde(default)]
    pub title: Option<String>,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            front_page: default_front_page(),
            no_follow_outlinks: true,
            numbered_outlinks: true,
            auto_pages: default_auto_pages(),
            href_style: HrefKind::default(),
            base_url: String::new(),
            script_name: default_script_name(),
            title: None,
        }
    }
}

fn default_front_page() -> String {
    "FrontPage".to_string()
}
fn default_true() -> bool {
    true
}
fn default_auto_pages() -> Vec<String> {
    vec![AutoPage::SiteMap.name().to_string()]
}
fn default_script_name() -> String {
    "wiki.cgi".to_string()
}

/// How page links are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HrefKind {
    /// `Name.html` files next to each other.
    #[default]
    Static,
    /// One script serving every page.
    Script,
}

/// Pages generated by the wiki rather than read from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AutoPage {
    SiteMap,
}

impl AutoPage {
    pub fn name(self) -> &'static str {
        match self {
            AutoPage::SiteMap => "SiteMap",
        }
    }

    pub fn wiki_name(self) -> Option<WikiName> {
        WikiName::parse(self.name())
    }
}

impl FromStr for AutoPage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SiteMap" => Ok(AutoPage::SiteMap),
            other => bail!("Unknown auto page '{other}' (known: SiteMap)"),
        }
    }
}

/// Option values given on the command line, overriding wiki.json.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub no_follow_outlinks: Option<bool>,
    pub numbered_outlinks: Option<bool>,
}

impl WikiConfig {
    pub fn front_page(&self) -> Result<WikiName> {
        self.front_page
            .parse()
            .with_context(|| format!("Invalid frontPage in {CONFIG_FILE}"))
    }

    pub fn auto_pages(&self) -> Result<Vec<AutoPage>> {
        let mut pages = self
            .auto_pages
            .iter()
            .map(|name| name.parse())
            .collect::<Result<Vec<AutoPage>>>()
            .with_context(|| format!("Invalid autoPages in {CONFIG_FILE}"))?;
        pages.sort();
        pages.dedup();
        Ok(pages)
    }

    pub fn href_style(&self) -> HrefStyle {
        match self.href_style {
            HrefKind::Static => HrefStyle::Static {
                base_url: self.base_url.clone(),
            },
            HrefKind::Script => HrefStyle::Script {
                script_name: self.script_name.clone(),
            },
        }
    }

    pub fn options(&self, overrides: Overrides) -> Options {
        Options {
            no_follow_outlinks: overrides
                .no_follow_outlinks
                .unwrap_or(self.no_follow_outlinks),
            numbered_outlinks: overrides.numbered_outlinks.unwrap_or(self.numbered_outlinks),
        }
    }

    /// Site title for page headers, falling back to the spaced front page name.
    pub fn site_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => wikimark::wikiname::spacify(&self.front_page),
        }
    }
}

/// Load config from a wiki.json file, or return defaults if missing.
pub fn load_config(wiki_root: &Path) -> Result<WikiConfig> {
    let config_path = wiki_root.join(CONFIG_FILE);

    if config_path.exists() {
        let raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: WikiConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        log::debug!("loaded {}", config_path.display());
        Ok(config)
    } else {
        log::debug!("no {} in {}, using defaults", CONFIG_FILE, wiki_root.display());
        Ok(WikiConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "frontPage": "HomePage",
            "noFollowOutlinks": false,
            "numberedOutlinks": false,
            "autoPages": ["SiteMap"],
            "hrefStyle": "script",
            "scriptName": "/cgi-bin/wiki.py",
            "title": "Team Notes"
        }"#;

        let config: WikiConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.front_page().unwrap().as_str(), "HomePage");
        assert_eq!(config.auto_pages().unwrap(), vec![AutoPage::SiteMap]);
        assert_eq!(
            config.href_style(),
            HrefStyle::Script {
                script_name: "/cgi-bin/wiki.py".to_string()
            }
        );
        assert_eq!(config.site_title(), "Team Notes");
        let options = config.options(Overrides::default());
        assert!(!options.no_follow_outlinks);
        assert!(!options.numbered_outlinks);
    }

    #[test]
    fn test_defaults() {
        let config: WikiConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.front_page, "FrontPage");
        assert_eq!(config.auto_pages, vec!["SiteMap"]);
        assert_eq!(config.href_style, HrefKind::Static);
        assert_eq!(config.script_name, "wiki.cgi");
        assert_eq!(config.site_title(), "Front Page");
        assert_eq!(config.options(Overrides::default()), Options::default());
    }

    #[test]
    fn test_overrides_win() {
        let config = WikiConfig::default();
        let options = config.options(Overrides {
            no_follow_outlinks: Some(false),
            numbered_outlinks: None,
        });
        assert!(!options.no_follow_outlinks);
        assert!(options.numbered_outlinks);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let config: WikiConfig =
            serde_json::from_str(r#"{"frontPage": "home", "autoPages": ["Nope"]}"#).unwrap();
        assert!(config.front_page().is_err());
        assert!(config.auto_pages().is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.front_page, "FrontPage");

        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"), "{err:#}");
    }
}
