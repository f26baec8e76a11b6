//! Inline handlers: macros, emphasis, links and images.

use crate::compiler::Pass;
use crate::error::{MacroError, Severity};
use crate::macros::MacroCall;
use crate::oracle::{PageStatus, Resolution};
use crate::stack::{Close, Tag};
use crate::wikiname::WikiName;

const AROUND_CENTERED_IMAGE: [Tag; 3] = [Tag::P, Tag::Em, Tag::Strong];

impl Pass<'_> {
    /// `text` is the whole `[[...]]` token.
    pub(crate) fn macro_call(&mut self, text: &str) -> String {
        let inner = &text[2..text.len() - 2];
        let expanded = match self.macros {
            Some(registry) => registry.expand(inner),
            None => MacroCall::parse(inner).and_then(|call| Err(MacroError::Unknown(call.name))),
        };
        match expanded {
            Ok(html) => html,
            Err(err) => {
                log::debug!("line {}: {err}", self.line);
                let code = match &err {
                    MacroError::Unknown(_) => "W001",
                    MacroError::Failed { .. } => "W002",
                    MacroError::Malformed(_) => "W003",
                };
                self.diagnose(Severity::Warning, code, err.to_string());
                self.comment(text)
            }
        }
    }

    /// Render a `[[...]]` token as an XML comment, unless that would be invalid.
    fn comment(&mut self, text: &str) -> String {
        if text.contains("--") {
            self.diagnose(
                Severity::Warning,
                "W004",
                "Macro text contains '--' and cannot become a comment".to_string(),
            );
            return text.to_string();
        }
        format!("<!-- {} -->", &text[2..text.len() - 2])
    }

    /// Two quotes toggle `em`, three toggle `strong`.
    pub(crate) fn emphasis(&mut self, quotes: &str) -> String {
        let (this, other) = if quotes.len() == 2 {
            (Tag::Em, Tag::Strong)
        } else {
            (Tag::Strong, Tag::Em)
        };
        if self.stack.contains(this) {
            let mut out = self
                .stack
                .close(&Close::any().targets(&[this]).recycle(&[other]).limit(1));
            out.push_str(&self.stack.reopen_recycled());
            out
        } else {
            self.stack.open(&[this], false)
        }
    }

    pub(crate) fn internal_link(&mut self, text: &str) -> String {
        let Some(name) = WikiName::parse(text) else {
            return text.to_string();
        };
        let resolution = match self.oracle.resolve(&name) {
            Ok(resolution) => resolution,
            Err(err) => {
                log::warn!("line {}: {err}", self.line);
                self.diagnose(Severity::Warning, "W007", err.to_string());
                Resolution {
                    status: PageStatus::New,
                    href: self.oracle.edit_href(&name),
                }
            }
        };
        let href = html_escape::encode_double_quoted_attribute(&resolution.href);
        if resolution.status.is_linkable() {
            format!(
                "<a class=\"wikilink\" href=\"{href}\">{}</a>",
                name.title()
            )
        } else {
            self.diagnose(
                Severity::Info,
                "I001",
                format!("Link to page '{name}' which does not exist yet"),
            );
            format!("{text}<a class=\"nonexistent\" href=\"{href}\">?</a>")
        }
    }

    /// `text` may carry a `|` on either side, which sets the alignment.
    pub(crate) fn image(&mut self, text: &str) -> String {
        let bare = text.trim_matches('|');
        let src = if bare.starts_with("http://") {
            bare.to_string()
        } else {
            format!("http://{bare}")
        };
        if self.stack.contains(Tag::Pre) {
            return self.url(&src);
        }

        let img = format!("img src=\"{src}\" alt=\"{src}\"");
        match (text.starts_with('|'), text.ends_with('|')) {
            (true, true) => {
                let mut out = self
                    .stack
                    .close(&Close::any().recycle(&AROUND_CENTERED_IMAGE));
                out.push_str(&format!("<div style=\"text-align:center;\"><{img} /></div>"));
                out.push_str(&self.stack.reopen_recycled());
                out
            }
            (true, false) => format!("<{img} style=\"float:right;padding-left:20px;\" />"),
            (false, true) => format!("<{img} style=\"float:left;padding-right:20px;\" />"),
            (false, false) => format!("<{img} style=\"padding-left:20px;padding-right:20px;\" />"),
        }
    }

    /// `href` is already escaped page text and goes into the attribute as is.
    pub(crate) fn url(&mut self, href: &str) -> String {
        let rel = if self.options.no_follow_outlinks {
            " rel=\"nofollow\""
        } else {
            ""
        };
        let display = if self.options.numbered_outlinks {
            let label = format!("[{}]", self.state.linkref);
            self.state.linkref += 1;
            label
        } else {
            href.to_string()
        };
        format!("<a href=\"{href}\"{rel}>{display}</a>")
    }

    pub(crate) fn bare_domain(&mut self, text: &str) -> String {
        self.url(&format!("http://{text}"))
    }

    pub(crate) fn email(&mut self, text: &str) -> String {
        let href = if text.starts_with("mailto:") {
            text.to_string()
        } else {
            format!("mailto:{text}")
        };
        format!("<a href=\"{href}\">{text}</a>")
    }
}
