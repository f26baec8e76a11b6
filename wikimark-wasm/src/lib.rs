//! WASM bindings for `wikimark`.
//!
//! Exposes the wiki markup compiler to JavaScript via wasm-bindgen. Options
//! and page lists cross the boundary as JSON strings; malformed JSON falls
//! back to defaults rather than throwing.

use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wikimark::{Compiler, Options, PageIndex, WikiName};

/// Pages known to exist, as sent from JavaScript.
///
/// Accepts either a bare array of names or `{ "existing": [...], "auto": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Pages {
    List(Vec<String>),
    Sets {
        #[serde(default)]
        existing: Vec<String>,
        #[serde(default)]
        auto: Vec<String>,
    },
}

fn valid_names(names: Vec<String>) -> impl Iterator<Item = WikiName> {
    names.into_iter().filter_map(|n| WikiName::try_from(n).ok())
}

fn parse_pages(pages_json: &str) -> PageIndex {
    match serde_json::from_str::<Pages>(pages_json) {
        Ok(Pages::List(existing)) => PageIndex::new().with_existing(valid_names(existing)),
        Ok(Pages::Sets { existing, auto }) => PageIndex::new()
            .with_existing(valid_names(existing))
            .with_auto(valid_names(auto)),
        Err(_) => PageIndex::new(),
    }
}

fn parse_options(options_json: Option<String>) -> Options {
    options_json
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

/// Compile wiki markup to an XHTML fragment.
///
/// Every page link renders as a link to a page that does not exist yet.
/// `options_json` is `{ "noFollowOutlinks": bool, "numberedOutlinks": bool }`,
/// each field optional.
#[wasm_bindgen]
pub fn render_html(input: &str, options_json: Option<String>) -> String {
    wikimark::compile(input, &parse_options(options_json))
}

/// Compile wiki markup, resolving page links against `pages_json`.
///
/// Links to listed pages point at `Name.html`.
#[wasm_bindgen]
pub fn render_html_with_pages(input: &str, pages_json: &str, options_json: Option<String>) -> String {
    let index = parse_pages(pages_json);
    Compiler::new(parse_options(options_json))
        .with_oracle(&index)
        .compile(input)
}

/// Compile wiki markup and return its diagnostics as JSON.
///
/// Returns a JSON array of `{ severity, message, line, code }` objects.
#[wasm_bindgen]
pub fn diagnostics(input: &str, pages_json: &str) -> String {
    let index = parse_pages(pages_json);
    let result = Compiler::new(Options::default())
        .with_oracle(&index)
        .compile_with_diagnostics(input);
    serde_json::to_string(&result.diagnostics).unwrap_or_else(|_| "[]".to_string())
}
