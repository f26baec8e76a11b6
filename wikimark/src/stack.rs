//! Open-tag bookkeeping.
//!
//! The stack holds every element opened and not yet closed, outermost first.
//! Closing always pops from the top, so emitted markup nests correctly no
//! matter what the input looks like. Tags closed only to make room for a
//! structural change can be *recycled*: they go to the recycle queue and are
//! reopened inside the next context that asks for them.

use std::collections::VecDeque;
use std::fmt;

/// Elements the compiler tracks on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    P,
    Blockquote,
    Ul,
    Ol,
    Li,
    Pre,
    Em,
    Strong,
}

impl Tag {
    pub const CONTAINERS: [Tag; 3] = [Tag::Ol, Tag::Ul, Tag::Blockquote];
    pub const EMPHASIS: [Tag; 2] = [Tag::Em, Tag::Strong];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::P => "p",
            Tag::Blockquote => "blockquote",
            Tag::Ul => "ul",
            Tag::Ol => "ol",
            Tag::Li => "li",
            Tag::Pre => "pre",
            Tag::Em => "em",
            Tag::Strong => "strong",
        }
    }

    pub fn open_marker(self) -> String {
        format!("<{}>", self.as_str())
    }

    pub fn close_marker(self) -> String {
        format!("</{}>", self.as_str())
    }

    pub fn is_container(self) -> bool {
        Self::CONTAINERS.contains(&self)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one [`TagStack::close`] call.
///
/// - `targets`: tags to close. Empty means any tag qualifies.
/// - `recycle`: tags that may be closed on the way, and are queued for
///   reopening when they are.
/// - `ruthless`: close whatever is on top, not only listed tags.
/// - `limit`: maximum number of target closures. With non-empty `targets`,
///   closing a tag that is only in `recycle` does not count.
#[derive(Debug, Clone, Default)]
pub struct Close<'a> {
    targets: &'a [Tag],
    recycle: &'a [Tag],
    ruthless: bool,
    limit: Option<usize>,
}

impl<'a> Close<'a> {
    /// Close anything, stopping at the first tag not in `recycle` unless
    /// [`ruthless`](Self::ruthless) is set.
    pub fn any() -> Self {
        Self::default()
    }

    /// Close everything, recycling nothing.
    pub fn all() -> Self {
        Self::any().ruthless()
    }

    pub fn targets(mut self, targets: &'a [Tag]) -> Self {
        self.targets = targets;
        self
    }

    pub fn recycle(mut self, recycle: &'a [Tag]) -> Self {
        self.recycle = recycle;
        self
    }

    pub fn ruthless(mut self) -> Self {
        self.ruthless = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn listed(&self, tag: Tag) -> bool {
        self.targets.contains(&tag) || self.recycle.contains(&tag)
    }
}

/// The stack of open tags plus the recycle queue.
#[derive(Debug, Clone, Default)]
pub struct TagStack {
    open: Vec<Tag>,
    recycled: VecDeque<Tag>,
}

impl TagStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `tags` in order, then (optionally) the whole recycle queue,
    /// returning their opening markers.
    pub fn open(&mut self, tags: &[Tag], reopen_recycled: bool) -> String {
        let mut out = String::new();
        let recycled = if reopen_recycled {
            std::mem::take(&mut self.recycled)
        } else {
            VecDeque::new()
        };
        for &tag in tags.iter().chain(recycled.iter()) {
            out.push_str(&tag.open_marker());
            self.open.push(tag);
        }
        out
    }

    /// Reopen whatever is queued for recycling.
    pub fn reopen_recycled(&mut self) -> String {
        self.open(&[], true)
    }

    /// Pop tags per `how`, returning their closing markers in pop order.
    ///
    /// Never fails: an empty stack or an absent target simply ends the loop.
    pub fn close(&mut self, how: &Close<'_>) -> String {
        let mut out = String::new();
        let mut closed = 0;
        while let Some(&top) = self.open.last() {
            if how.limit.is_some_and(|limit| closed >= limit) {
                break;
            }
            let wanted_below = how.targets.is_empty() || self.open.iter().any(|&t| how.listed(t));
            if !wanted_below || !(how.listed(top) || how.ruthless) {
                break;
            }
            if how.recycle.contains(&top) {
                self.recycled.push_front(top);
            }
            self.open.pop();
            out.push_str(&top.close_marker());
            if how.targets.is_empty() || how.targets.contains(&top) {
                closed += 1;
            }
        }
        out
    }

    /// Queue `tag` to be reopened before anything already queued.
    pub fn recycle_front(&mut self, tag: Tag) {
        self.recycled.push_front(tag);
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.open.contains(&tag)
    }

    /// Number of open list and blockquote containers.
    pub fn container_depth(&self) -> usize {
        self.open.iter().filter(|t| t.is_container()).count()
    }

    pub fn innermost_container(&self) -> Option<Tag> {
        self.open.iter().rev().copied().find(|t| t.is_container())
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn recycled(&self) -> impl Iterator<Item = Tag> + '_ {
        self.recycled.iter().copied()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.open
    }
}
