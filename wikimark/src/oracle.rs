//! Page-existence lookups.
//!
//! The compiler does not know where pages live. For every internal link it
//! asks a [`PageOracle`] whether the page is generated automatically, exists,
//! or is new, and where the link should point.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::wikiname::WikiName;

/// How a page name resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    /// Generated by the application, e.g. a site map.
    Auto,
    Existing,
    New,
}

impl PageStatus {
    /// Auto and existing pages both render as ordinary wiki links.
    pub fn is_linkable(self) -> bool {
        !matches!(self, PageStatus::New)
    }
}

/// Result of resolving one page name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub status: PageStatus,
    /// Unescaped link target. For new pages this is where the page is created.
    pub href: String,
}

/// Classifies page names and supplies their link targets.
pub trait PageOracle {
    fn resolve(&self, name: &WikiName) -> Result<Resolution, OracleError>;

    /// Link target for a page that could not be resolved.
    fn edit_href(&self, name: &WikiName) -> String {
        format!("?page={name}&action=edit")
    }
}

/// Link layout used by [`PageIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "lowercase")]
pub enum HrefStyle {
    /// Pre-rendered files: `base_url/Name.html`.
    Static { base_url: String },
    /// A single script taking `page` (and `action`) query parameters.
    Script { script_name: String },
}

impl Default for HrefStyle {
    fn default() -> Self {
        HrefStyle::Static {
            base_url: String::new(),
        }
    }
}

impl HrefStyle {
    pub fn goto_href(&self, name: &WikiName) -> String {
        match self {
            HrefStyle::Static { base_url } if base_url.is_empty() => format!("{name}.html"),
            HrefStyle::Static { base_url } => {
                format!("{}/{name}.html", base_url.trim_end_matches('/'))
            }
            HrefStyle::Script { script_name } => format!("{script_name}?page={name}"),
        }
    }

    pub fn edit_href(&self, name: &WikiName) -> String {
        match self {
            // A static site cannot edit; point at where the page would be.
            HrefStyle::Static { .. } => self.goto_href(name),
            HrefStyle::Script { script_name } => {
                format!("{script_name}?page={name}&action=edit")
            }
        }
    }
}

/// In-memory oracle over known page names.
#[derive(Debug, Clone, Default)]
pub struct PageIndex {
    existing: BTreeSet<WikiName>,
    auto: BTreeSet<WikiName>,
    hrefs: HrefStyle,
}

impl PageIndex {
    /// An index with no pages: every name resolves to [`PageStatus::New`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hrefs(mut self, hrefs: HrefStyle) -> Self {
        self.hrefs = hrefs;
        self
    }

    pub fn with_existing<I: IntoIterator<Item = WikiName>>(mut self, names: I) -> Self {
        self.existing.extend(names);
        self
    }

    pub fn with_auto<I: IntoIterator<Item = WikiName>>(mut self, names: I) -> Self {
        self.auto.extend(names);
        self
    }

    pub fn status(&self, name: &WikiName) -> PageStatus {
        if self.auto.contains(name) {
            PageStatus::Auto
        } else if self.existing.contains(name) {
            PageStatus::Existing
        } else {
            PageStatus::New
        }
    }
}

impl PageOracle for PageIndex {
    fn resolve(&self, name: &WikiName) -> Result<Resolution, OracleError> {
        let status = self.status(name);
        let href = if status.is_linkable() {
            self.hrefs.goto_href(name)
        } else {
            self.hrefs.edit_href(name)
        };
        Ok(Resolution { status, href })
    }

    fn edit_href(&self, name: &WikiName) -> String {
        self.hrefs.edit_href(name)
    }
}
