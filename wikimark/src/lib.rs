//! `wikimark`: compiler for a line-oriented wiki markup dialect.
//!
//! Page text goes in, a balanced XHTML fragment comes out. Block structure
//! (paragraphs, nested lists, blockquotes, headings, rules, preformatted
//! blocks) is inferred from how each line starts; inline markup covers
//! emphasis, CamelCase page links, external links, images, e-mail addresses
//! and macro calls. Markup-significant characters in the input are escaped,
//! so only markup the compiler emits reaches the output.
//!
//! # Quick start
//!
//! ```
//! let html = wikimark::compile("Hello ''world''", &wikimark::Options::default());
//! assert_eq!(html, "\n<p>Hello <em>world</em></p>");
//! ```
//!
//! Page links are resolved through a [`PageOracle`]; [`PageIndex`] is an
//! in-memory one:
//!
//! ```
//! use wikimark::{Compiler, Options, PageIndex, WikiName};
//!
//! let index = PageIndex::new().with_existing(WikiName::parse("FrontPage"));
//! let html = Compiler::new(Options::default())
//!     .with_oracle(&index)
//!     .compile("Back to FrontPage");
//! assert!(html.contains(r#"<a class="wikilink" href="FrontPage.html">Front Page</a>"#));
//! ```

pub mod compiler;
pub mod error;
pub mod macros;
pub mod oracle;
pub mod scan;
pub mod stack;
pub mod wikiname;

mod blocks;
mod inline;

pub use compiler::{CompileResult, Compiler, Options, compile};
pub use error::*;
pub use macros::{MacroCall, MacroRegistry};
pub use oracle::{HrefStyle, PageIndex, PageOracle, PageStatus, Resolution};
pub use wikiname::WikiName;
