//! Block handlers: one per line-start token kind.
//!
//! Blocks are inferred from how a line starts. Each handler closes what the
//! new block cannot live inside, recycling open emphasis so it carries over,
//! and opens the new block.

use crate::compiler::Pass;
use crate::error::Severity;
use crate::scan::{heading_parts, is_space};
use crate::stack::{Close, Tag};

const EMPHASIS: &[Tag] = &Tag::EMPHASIS;

impl Pass<'_> {
    /// Close everything, keeping emphasis for the next block.
    fn close_all_recycling(&mut self) -> String {
        self.stack.close(&Close::any().recycle(EMPHASIS).ruthless())
    }

    pub(crate) fn empty_line(&mut self) -> String {
        self.close_all_recycling()
    }

    /// `marker` is the leading whitespace plus an optional `*` or `#`.
    pub(crate) fn list_item(&mut self, marker: &str) -> String {
        let width = marker.chars().count();
        let (container, item, depth) = match marker.chars().last() {
            Some('*') => (Tag::Ul, Tag::Li, width - 1),
            Some('#') => (Tag::Ol, Tag::Li, width - 1),
            _ => (Tag::Blockquote, Tag::P, width),
        };
        let current = self.stack.container_depth();

        // An open paragraph ends, whether in a blockquote or directly in the body.
        let mut out = self
            .stack
            .close(&Close::any().targets(&[Tag::P]).recycle(EMPHASIS));

        if depth > current {
            let delta = depth - current;
            let tags: Vec<Tag> = if container == Tag::Blockquote {
                vec![Tag::Blockquote; delta]
            } else {
                let mut tags = Vec::with_capacity(2 * delta - 1);
                for _ in 1..delta {
                    tags.extend([container, item]);
                }
                tags.push(container);
                tags
            };
            out.push('\n');
            out.push_str(&self.stack.open(&tags, false));
        } else {
            if depth < current {
                out.push_str(
                    &self.stack.close(
                        &Close::any()
                            .targets(&Tag::CONTAINERS)
                            .recycle(EMPHASIS)
                            .ruthless()
                            .limit(current - depth),
                    ),
                );
            }
            out.push_str(
                &self
                    .stack
                    .close(&Close::any().targets(&[item]).recycle(EMPHASIS).limit(1)),
            );
        }

        if self.stack.innermost_container() != Some(container) {
            out.push_str(
                &self.stack.close(
                    &Close::any()
                        .targets(&Tag::CONTAINERS)
                        .recycle(EMPHASIS)
                        .ruthless()
                        .limit(1),
                ),
            );
            out.push('\n');
            out.push_str(&self.stack.open(&[container], false));
        }

        out.push('\n');
        out.push_str(&self.stack.open(&[item], true));
        self.apply_clear(out)
    }

    /// `line` is known to hold a heading with an even underscore run.
    pub(crate) fn heading(&mut self, line: &str) -> String {
        let Some(parts) = heading_parts(line) else {
            return line.to_string();
        };
        let level = parts.run / 2;
        let text = parts
            .text
            .trim_matches(|c: char| c == '_' || is_space(c));
        let mut out = self.close_all_recycling();
        out.push_str(&format!("\n<h{level}>{text}</h{level}>"));
        self.apply_clear(out)
    }

    pub(crate) fn rule(&mut self) -> String {
        let mut out = self.close_all_recycling();
        out.push_str("\n<hr />");
        self.apply_clear(out)
    }

    pub(crate) fn margin_clear(&mut self) -> String {
        self.state.clear_margins = true;
        self.close_all_recycling()
    }

    /// A macro alone on its line manages its own block structure, so a
    /// pending margin clear stays pending.
    pub(crate) fn lone_macro(&mut self, call: &str) -> String {
        let mut out = self.close_all_recycling();
        out.push_str(&self.macro_call(call));
        out
    }

    /// `line` is the whole line, used only to explain an odd heading run.
    pub(crate) fn paragraph_start(&mut self, line: &str) -> String {
        if let Some(parts) = heading_parts(line).filter(|h| h.run % 2 == 1) {
            log::debug!("line {}: odd heading run of {} treated as text", self.line, parts.run);
            self.diagnose(
                Severity::Warning,
                "W005",
                format!(
                    "Heading delimiter run of {} underscores is odd; line rendered as text",
                    parts.run
                ),
            );
        }

        let out = if self.stack.contains(Tag::P) && !self.stack.contains(Tag::Blockquote) {
            "<br />\n".to_string()
        } else {
            let mut out = self.close_all_recycling();
            out.push('\n');
            out.push_str(&self.stack.open(&[Tag::P], true));
            out
        };
        self.apply_clear(out)
    }

    /// `{{` opens a pre block, `}}` closes it; anything else is literal.
    pub(crate) fn pre_toggle(&mut self, marker: &str) -> String {
        let in_pre = self.stack.contains(Tag::Pre);
        match marker {
            "{{" if !in_pre => {
                self.state.pre_in_p = self.stack.contains(Tag::P);
                let mut out = self
                    .stack
                    .close(&Close::any().targets(&[Tag::P]).recycle(EMPHASIS));
                out.push_str(&self.stack.open(&[Tag::Pre], true));
                out
            }
            "}}" if in_pre => {
                let mut out = self
                    .stack
                    .close(&Close::any().targets(&[Tag::Pre]).recycle(EMPHASIS));
                if self.state.pre_in_p {
                    self.stack.recycle_front(Tag::P);
                }
                out.push_str(&self.stack.reopen_recycled());
                out
            }
            _ => {
                log::debug!("line {}: unmatched '{marker}' passed through", self.line);
                self.diagnose(
                    Severity::Warning,
                    "W006",
                    format!("Unmatched preformatted marker '{marker}'"),
                );
                marker.to_string()
            }
        }
    }
}
