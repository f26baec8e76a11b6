//! Compile driver.
//!
//! Escapes the page text, feeds it to the scanner one line at a time, and
//! dispatches every token to its handler (see `blocks` and `inline`). All
//! mutable state lives in a [`Pass`] that exists for exactly one call, so a
//! [`Compiler`] can be reused for unrelated pages.

use serde::{Deserialize, Serialize};

use crate::error::{Diagnostic, OracleError, Severity};
use crate::macros::MacroRegistry;
use crate::oracle::{PageOracle, PageStatus, Resolution};
use crate::scan::{Scanner, Segment, Token, TokenKind, is_space};
use crate::stack::{Close, Tag, TagStack};
use crate::wikiname::WikiName;

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Add `rel="nofollow"` to external links.
    pub no_follow_outlinks: bool,
    /// Show external links as `[1]`, `[2]`, ... instead of the URL.
    pub numbered_outlinks: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            no_follow_outlinks: true,
            numbered_outlinks: true,
        }
    }
}

/// Output of [`Compiler::compile_with_diagnostics`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileResult {
    pub html: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Oracle used when none is configured: nothing exists.
struct NoPages;

impl PageOracle for NoPages {
    fn resolve(&self, name: &WikiName) -> Result<Resolution, OracleError> {
        Ok(Resolution {
            status: PageStatus::New,
            href: self.edit_href(name),
        })
    }
}

static NO_PAGES: NoPages = NoPages;

/// A configured compiler. Cheap to build, reusable across pages.
#[derive(Clone, Copy)]
pub struct Compiler<'a> {
    options: Options,
    oracle: &'a dyn PageOracle,
    macros: Option<&'a MacroRegistry>,
}

impl<'a> Compiler<'a> {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            oracle: &NO_PAGES,
            macros: None,
        }
    }

    pub fn with_oracle(mut self, oracle: &'a dyn PageOracle) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_macros(mut self, macros: &'a MacroRegistry) -> Self {
        self.macros = Some(macros);
        self
    }

    /// Compile page text into an XHTML fragment.
    pub fn compile(&self, text: &str) -> String {
        self.compile_with_diagnostics(text).html
    }

    /// Compile page text, also reporting where input degraded.
    ///
    /// Blank input yields an empty fragment and no diagnostics.
    pub fn compile_with_diagnostics(&self, text: &str) -> CompileResult {
        if text.chars().all(is_space) {
            return CompileResult::default();
        }

        let escaped = html_escape::encode_double_quoted_attribute(text);
        let normalised = escaped.replace("\r\n", "\n").replace('\r', "\n");

        let mut pass = Pass::new(self);
        for (idx, line) in normalised.lines().enumerate() {
            pass.line = idx + 1;
            pass.compile_line(line);
        }
        pass.finish()
    }
}

/// Compile with no page oracle and no macros.
pub fn compile(text: &str, options: &Options) -> String {
    Compiler::new(*options).compile(text)
}

/// Deferred flags carried between lines of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParserState {
    /// The next block-opening tag gets a float-clearing style.
    pub clear_margins: bool,
    /// A pre block interrupted an open paragraph.
    pub pre_in_p: bool,
    /// Next number for numbered outlinks.
    pub linkref: usize,
}

impl Default for ParserState {
    fn default() -> Self {
        Self {
            clear_margins: false,
            pre_in_p: false,
            linkref: 1,
        }
    }
}

/// State for one compile call.
pub(crate) struct Pass<'c> {
    pub options: Options,
    pub oracle: &'c dyn PageOracle,
    pub macros: Option<&'c MacroRegistry>,
    pub stack: TagStack,
    pub state: ParserState,
    pub diagnostics: Vec<Diagnostic>,
    pub line: usize,
    out: String,
}

impl<'c> Pass<'c> {
    fn new(compiler: &Compiler<'c>) -> Self {
        Self {
            options: compiler.options,
            oracle: compiler.oracle,
            macros: compiler.macros,
            stack: TagStack::new(),
            state: ParserState::default(),
            diagnostics: Vec::new(),
            line: 0,
            out: String::new(),
        }
    }

    fn compile_line(&mut self, line: &str) {
        // Inside a pre block the line break is kept and block markup is off.
        let in_pre = self.stack.contains(Tag::Pre);
        if in_pre {
            self.out.push('\n');
        }
        for segment in Scanner::new(line, !in_pre) {
            match segment {
                Segment::Literal(text) => self.out.push_str(text),
                Segment::Token(token) => {
                    let html = self.dispatch(token, line);
                    self.out.push_str(&html);
                }
            }
        }
    }

    fn dispatch(&mut self, token: Token<'_>, line: &str) -> String {
        match token.kind {
            TokenKind::EmptyLine => self.empty_line(),
            TokenKind::ListItem => self.list_item(token.text),
            TokenKind::Heading => self.heading(token.text),
            TokenKind::Rule => self.rule(),
            TokenKind::MarginClear => self.margin_clear(),
            TokenKind::LoneMacro => self.lone_macro(token.text.trim_matches(is_space)),
            TokenKind::ParagraphStart => self.paragraph_start(line),
            TokenKind::PreToggle => self.pre_toggle(token.text),
            TokenKind::MacroCall => self.macro_call(token.text),
            TokenKind::Emphasis => self.emphasis(token.text),
            TokenKind::InternalLink => self.internal_link(token.text),
            TokenKind::Image => self.image(token.text),
            TokenKind::Url => self.url(token.text),
            TokenKind::BareDomain => self.bare_domain(token.text),
            TokenKind::Email => self.email(token.text),
        }
    }

    pub(crate) fn diagnose(&mut self, severity: Severity, code: &str, message: String) {
        self.diagnostics
            .push(Diagnostic::new(severity, code, self.line, message));
    }

    /// Attach a pending margin clear to the first opening tag in `html`.
    ///
    /// Stays pending if `html` opens nothing.
    pub(crate) fn apply_clear(&mut self, mut html: String) -> String {
        if !self.state.clear_margins {
            return html;
        }
        let opening = html.match_indices('<').map(|(i, _)| i).find(|&i| {
            html[i + 1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
        });
        let Some(start) = opening else {
            return html;
        };
        let Some(gt) = html[start..].find('>').map(|offset| start + offset) else {
            return html;
        };
        let at = if html[..gt].ends_with(" /") { gt - 2 } else { gt };
        html.insert_str(at, " style=\"clear:both;\"");
        self.state.clear_margins = false;
        html
    }

    fn finish(mut self) -> CompileResult {
        let mut html = std::mem::take(&mut self.out);
        // Toggling emphasis across recycles can leave empty pairs behind.
        loop {
            let cleaned = html.replace("<em></em>", "").replace("<strong></strong>", "");
            if cleaned.len() == html.len() {
                break;
            }
            html = cleaned;
        }
        html.push_str(&self.stack.close(&Close::all()));
        debug_assert!(self.stack.is_empty());
        CompileResult {
            html,
            diagnostics: self.diagnostics,
        }
    }
}
