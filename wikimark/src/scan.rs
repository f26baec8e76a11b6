//! Line scanner.
//!
//! Splits one line of escaped page text into literal runs and tokens. At
//! every offset the token kinds are tried in precedence order and the first
//! match wins; if none matches, one character passes through as literal text.
//!
//! Block kinds are only tried at offset 0, and only when the line is scanned
//! as a line start. Lines inside a preformatted block are scanned without the
//! line-start flag, so lists, headings and rules cannot be recognized there.

use std::ops::Range;

/// Token kinds, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    EmptyLine,
    ListItem,
    Heading,
    Rule,
    MarginClear,
    LoneMacro,
    /// Zero-width fallback block kind; always matches at a line start.
    ParagraphStart,
    PreToggle,
    MacroCall,
    Emphasis,
    InternalLink,
    Image,
    Url,
    BareDomain,
    Email,
}

/// A matched token. `start..end` are byte offsets into the scanned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// One piece of a scanned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Token(Token<'a>),
}

/// A heading line split into its underscore run length and inner text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingParts<'a> {
    pub run: usize,
    pub text: &'a str,
}

/// Iterator over the segments of one line.
pub struct Scanner<'a> {
    line: &'a str,
    pos: usize,
    at_line_start: bool,
    pending: Option<Token<'a>>,
    /// Last e-mail local part that led nowhere. Any offset inside it runs to
    /// the same end, so it cannot start an address either.
    dead_local: Range<usize>,
}

impl<'a> Scanner<'a> {
    pub fn new(line: &'a str, at_line_start: bool) -> Self {
        Self {
            line,
            pos: 0,
            at_line_start,
            pending: None,
            dead_local: 0..0,
        }
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token<'a> {
        Token {
            kind,
            text: &self.line[start..end],
            start,
            end,
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        if let Some(token) = self.pending.take() {
            return Some(Segment::Token(token));
        }

        if self.at_line_start {
            self.at_line_start = false;
            let (kind, end) = match_block(self.line);
            self.pos = end;
            return Some(Segment::Token(self.token(kind, 0, end)));
        }

        let start = self.pos;
        let len = self.line.len();
        while self.pos < len {
            if let Some((kind, end)) = match_inline(self.line, self.pos, &mut self.dead_local) {
                let token = self.token(kind, self.pos, end);
                let literal_end = self.pos;
                self.pos = end;
                if literal_end > start {
                    self.pending = Some(token);
                    return Some(Segment::Literal(&self.line[start..literal_end]));
                }
                return Some(Segment::Token(token));
            }
            self.pos += self.line[self.pos..].chars().next().map_or(1, char::len_utf8);
        }

        (self.pos > start).then(|| Segment::Literal(&self.line[start..self.pos]))
    }
}

/// All tokens of a line, skipping literal text.
pub fn tokens(line: &str, at_line_start: bool) -> impl Iterator<Item = Token<'_>> {
    Scanner::new(line, at_line_start).filter_map(|segment| match segment {
        Segment::Token(token) => Some(token),
        Segment::Literal(_) => None,
    })
}

/// Unicode word character, as used by word boundaries.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn boundary_at(line: &str, pos: usize) -> bool {
    let before = line[..pos].chars().next_back().is_some_and(is_word_char);
    let after = line[pos..].chars().next().is_some_and(is_word_char);
    before != after
}

/// Whitespace as line markup sees it: ASCII only, so a non-breaking space
/// stays text.
pub(crate) fn is_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0b'
}

fn only_whitespace(text: &str) -> bool {
    text.chars().all(is_space)
}

// ------------------------------------------------------------------
// Block kinds
// ------------------------------------------------------------------

/// Match the block kind at the start of `line`. Never fails.
fn match_block(line: &str) -> (TokenKind, usize) {
    let len = line.len();
    if only_whitespace(line) {
        return (TokenKind::EmptyLine, len);
    }
    if let Some(end) = list_marker(line) {
        return (TokenKind::ListItem, end);
    }
    if heading_parts(line).is_some_and(|h| h.run % 2 == 0) {
        return (TokenKind::Heading, len);
    }
    if is_rule(line) {
        return (TokenKind::Rule, len);
    }
    if line.strip_prefix("\\\\").is_some_and(only_whitespace) {
        return (TokenKind::MarginClear, len);
    }
    if is_lone_macro(line) {
        return (TokenKind::LoneMacro, len);
    }
    (TokenKind::ParagraphStart, 0)
}

/// Leading whitespace plus an optional `*` or `#` marker.
fn list_marker(line: &str) -> Option<usize> {
    let indent = line.bytes().take_while(|&b| is_space(char::from(b))).count();
    if indent == 0 {
        return None;
    }
    match line.as_bytes().get(indent) {
        Some(b'*' | b'#') => Some(indent + 1),
        _ => Some(indent),
    }
}

/// Split a heading line: a run of 2 to 6 underscores, some text, and a closing
/// run of the same length followed only by whitespace.
///
/// The longest fitting run wins. Odd runs are reported here but are not
/// accepted as headings by the scanner.
pub fn heading_parts(line: &str) -> Option<HeadingParts<'_>> {
    let leading = line.bytes().take_while(|&b| b == b'_').count();
    if leading < 2 {
        return None;
    }
    let trimmed = line.trim_end_matches(is_space);
    let bytes = trimmed.as_bytes();
    (2..=leading.min(6)).rev().find_map(|run| {
        let len = bytes.len();
        if len < 2 * run + 1 || !bytes[len - run..].iter().all(|&b| b == b'_') {
            return None;
        }
        Some(HeadingParts {
            run,
            text: &trimmed[run..len - run],
        })
    })
}

fn is_rule(line: &str) -> bool {
    let dashes = line.bytes().take_while(|&b| b == b'-').count();
    dashes >= 4 && only_whitespace(&line[dashes..])
}

fn is_lone_macro(line: &str) -> bool {
    let trimmed = line.trim_end_matches(is_space);
    trimmed.len() >= 4 && trimmed.starts_with("[[") && trimmed.ends_with("]]")
}

// ------------------------------------------------------------------
// Inline kinds
// ------------------------------------------------------------------

fn match_inline(line: &str, pos: usize, dead_local: &mut Range<usize>) -> Option<(TokenKind, usize)> {
    let rest = &line[pos..];
    if rest.starts_with("{{") || rest.starts_with("}}") {
        return Some((TokenKind::PreToggle, pos + 2));
    }
    if let Some(close) = rest.strip_prefix("[[").and_then(|after| after.find("]]")) {
        return Some((TokenKind::MacroCall, pos + 2 + close + 2));
    }
    let quotes = rest.bytes().take_while(|&b| b == b'\'').count();
    if quotes >= 2 {
        return Some((TokenKind::Emphasis, pos + quotes.min(3)));
    }
    if let Some(end) = crate::wikiname::match_at(line, pos) {
        return Some((TokenKind::InternalLink, end));
    }
    if let Some(end) = match_image(line, pos) {
        return Some((TokenKind::Image, end));
    }
    if let Some(end) = match_url(line, pos) {
        return Some((TokenKind::Url, end));
    }
    if let Some(end) = rest.strip_prefix("www.").and_then(|_| url_body(line, pos + 4)) {
        return Some((TokenKind::BareDomain, end));
    }
    if let Some(end) = match_email(line, pos, dead_local) {
        return Some((TokenKind::Email, end));
    }
    None
}

const IMAGE_EXTENSIONS: [&str; 8] = [
    ".jpg", ".jpeg", ".JPG", ".JPEG", ".gif", ".GIF", ".png", ".PNG",
];

fn is_image_body_char(c: char) -> bool {
    is_word_char(c) || matches!(c, '-' | '.' | '/' | '~' | '%')
}

fn match_image(line: &str, pos: usize) -> Option<usize> {
    let start = if line[pos..].starts_with('|') {
        pos + 1
    } else if boundary_at(line, pos) {
        pos
    } else {
        return None;
    };

    let rest = &line[start..];
    let body_start = if rest.starts_with("http://") {
        start + 7
    } else if rest.starts_with("www.") {
        start + 4
    } else {
        return None;
    };

    let run_end = body_start
        + line[body_start..]
            .chars()
            .take_while(|&c| is_image_body_char(c))
            .map(char::len_utf8)
            .sum::<usize>();

    // Longest candidate first, mirroring greedy backtracking.
    let mut end = run_end;
    while end > body_start {
        let candidate = &line[body_start..end];
        let fits = IMAGE_EXTENSIONS
            .iter()
            .any(|ext| candidate.len() > ext.len() && candidate.ends_with(ext));
        if fits {
            if line[end..].starts_with('|') {
                return Some(end + 1);
            }
            if boundary_at(line, end) {
                return Some(end);
            }
        }
        end -= line[..end].chars().next_back().map_or(1, char::len_utf8);
    }
    None
}

const URL_SCHEMES: [&str; 5] = ["http://", "https://", "ftp://", "nntp://", "news://"];

fn match_url(line: &str, pos: usize) -> Option<usize> {
    let rest = &line[pos..];
    let scheme = URL_SCHEMES.iter().find(|s| rest.starts_with(*s))?;
    url_body(line, pos + scheme.len())
}

/// URL body: at least two units, ending on a word character or `/`.
///
/// `&amp;` counts as a single unit so escaped query strings stay intact; any
/// other entity ends the body.
fn url_body(line: &str, start: usize) -> Option<usize> {
    let mut pos = start;
    let mut units = 0;
    let mut end = None;
    while pos < line.len() {
        let rest = &line[pos..];
        if rest.starts_with("&amp;") {
            pos += 5;
            units += 1;
            continue;
        }
        let c = rest.chars().next()?;
        if !(is_word_char(c) || matches!(c, '-' | '.' | '/' | '~' | '?' | '=' | '+' | '%' | '#')) {
            break;
        }
        pos += c.len_utf8();
        units += 1;
        if units >= 2 && (is_word_char(c) || c == '/') {
            end = Some(pos);
        }
    }
    end
}

fn match_email(line: &str, pos: usize, dead_local: &mut Range<usize>) -> Option<usize> {
    let local_start = if line[pos..].starts_with("mailto:") {
        pos + 7
    } else if dead_local.contains(&pos) {
        return None;
    } else {
        pos
    };
    let local_len: usize = line[local_start..]
        .chars()
        .take_while(|&c| is_word_char(c) || matches!(c, '-' | '.' | '+'))
        .map(char::len_utf8)
        .sum();
    if local_len == 0 {
        return None;
    }
    let local_end = local_start + local_len;

    let end = line[local_end..]
        .strip_prefix('@')
        .and_then(|_| email_domain_end(line.as_bytes(), local_end + 1));
    if end.is_none() {
        *dead_local = local_start..local_end;
    }
    end
}

/// End of `[A-Za-z0-9.-]*` starting at `start`, cut back to its last letter.
fn email_domain_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut last_letter = None;
    for (offset, b) in bytes[start..].iter().enumerate() {
        if !(b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.')) {
            break;
        }
        if b.is_ascii_alphabetic() {
            last_letter = Some(offset);
        }
    }
    last_letter
        .filter(|&offset| offset >= 1)
        .map(|offset| start + offset + 1)
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------
