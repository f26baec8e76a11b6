//! Wiki page names.
//!
//! A wiki name is a run of capitalized words (`FrontPage`, `WikiWikiWeb`),
//! optionally ending in a number instead of a final word (`Release2`). At
//! least two components are always required, so a lone `Front` is plain text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidWikiName;
use crate::scan::is_word_char;

/// A validated wiki page name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WikiName(String);

impl WikiName {
    /// Validate `text` as a wiki name.
    pub fn parse(text: &str) -> Option<Self> {
        is_valid(text).then(|| Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable title: `FrontPage2` becomes `Front Page 2`.
    pub fn title(&self) -> String {
        spacify(&self.0)
    }
}

impl fmt::Display for WikiName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WikiName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for WikiName {
    type Err = InvalidWikiName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidWikiName(s.to_string()))
    }
}

impl TryFrom<String> for WikiName {
    type Error = InvalidWikiName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidWikiName(value))
        }
    }
}

impl From<WikiName> for String {
    fn from(name: WikiName) -> Self {
        name.0
    }
}

/// True iff the whole of `text` is a wiki name.
pub fn is_valid(text: &str) -> bool {
    !text.is_empty() && match_at(text, 0) == Some(text.len())
}

/// Insert a space between a lowercase letter and a following capital or digit.
pub fn spacify(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c.is_ascii_lowercase() {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_uppercase() || next.is_ascii_digit() {
                    out.push(' ');
                }
            }
        }
    }
    out
}

/// Match a word-bounded wiki name starting at byte offset `pos` of `line`.
///
/// Returns the end offset of the match. `pos` must be a char boundary.
pub(crate) fn match_at(line: &str, pos: usize) -> Option<usize> {
    if line[..pos].chars().next_back().is_some_and(is_word_char) {
        return None;
    }

    let bytes = line.as_bytes();
    let mut end = pos;
    let mut words = 0;
    while let Some(next) = capitalized_word(bytes, end) {
        end = next;
        words += 1;
    }
    if words == 0 {
        return None;
    }

    // Digits are tried before giving the final word back.
    let digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 && boundary_after(line, end + digits) {
        return Some(end + digits);
    }
    if words >= 2 && boundary_after(line, end) {
        return Some(end);
    }
    None
}

/// `[A-Z][a-z]+` at `at`, returning the offset just past it.
fn capitalized_word(bytes: &[u8], at: usize) -> Option<usize> {
    if !bytes.get(at)?.is_ascii_uppercase() {
        return None;
    }
    let lower = bytes[at + 1..]
        .iter()
        .take_while(|b| b.is_ascii_lowercase())
        .count();
    (lower > 0).then_some(at + 1 + lower)
}

fn boundary_after(line: &str, end: usize) -> bool {
    !line[end..].chars().next().is_some_and(is_word_char)
}
