//! Macros available to pages compiled by the CLI.
//!
//! - `[[PageCount]]`: number of pages in the wiki.
//! - `[[PageList]]`: links to every page, alphabetical.
//! - `[[Version]]`: the wikimark version.

use wikimark::{HrefStyle, MacroError, MacroRegistry, WikiName};

pub fn registry(pages: &[WikiName], hrefs: &HrefStyle) -> MacroRegistry {
    let count = pages.len();
    let list = page_list(pages, hrefs);

    let mut registry = MacroRegistry::new();
    registry
        .register("PageCount", move |call| {
            no_arguments(call)?;
            Ok(count.to_string())
        })
        .register("PageList", move |call| {
            no_arguments(call)?;
            Ok(list.clone())
        })
        .register("Version", |call| {
            no_arguments(call)?;
            Ok(env!("CARGO_PKG_VERSION").to_string())
        });
    registry
}

fn no_arguments(call: &wikimark::MacroCall) -> Result<(), MacroError> {
    if call.args.is_empty() {
        Ok(())
    } else {
        Err(MacroError::Failed {
            name: call.name.clone(),
            message: format!("takes no arguments, got {}", call.args.len()),
        })
    }
}

fn page_list(pages: &[WikiName], hrefs: &HrefStyle) -> String {
    let items: String = pages
        .iter()
        .map(|name| {
            format!(
                "<li><a class=\"wikilink\" href=\"{}\">{}</a></li>",
                html_escape::encode_double_quoted_attribute(&hrefs.goto_href(name)),
                name.title()
            )
        })
        .collect();
    format!("<div class=\"pagelist\"><ul>{items}</ul></div>")
}
