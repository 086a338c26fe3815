//! Forward, run-by-run substring search plus the state of one find/replace
//! dialog.
//!
//! Matching never crosses a run boundary: a needle whose characters sit in
//! two adjacent runs is not found even though the visible text contains it.
//! Keyword colors split runs, so a needle spanning a highlighted keyword is
//! missed too.

use tracing::{debug, info};

use crate::document::{Anchor, Direction, Document, PointerContext, Position, TextSpan};
use crate::workspace::TabId;

/// First occurrence of `needle` at or after `from`, or `None`.
pub fn find_next(document: &Document, from: Position, needle: &str) -> Option<TextSpan> {
    if needle.is_empty() {
        return None;
    }
    let needle_len = needle.chars().count();
    let end = document.end();

    let mut cursor = document.cursor(from);
    while cursor.compare(&end).is_lt() {
        if cursor.context(Direction::Forward) == PointerContext::Text {
            let run_text = cursor.text_in_run(Direction::Forward);
            if let Some(byte_idx) = run_text.find(needle) {
                let chars_before = run_text[..byte_idx].chars().count();
                let start = cursor.offset_by(chars_before)?;
                let end = document.cursor(start).offset_by(needle_len)?;
                return Some(TextSpan { start, end });
            }
        }
        cursor = cursor.advance(Direction::Forward)?;
    }
    None
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FindOutcome {
    Found(TextSpan),
    NotFound,
    EmptyNeedle,
}

/// Search state owned by one open find dialog.
#[derive(Clone, Debug)]
pub struct FindSession {
    target: TabId,
    pub needle: String,
    pub replacement: String,
    resume_from: Anchor,
}

impl FindSession {
    pub fn new(target: TabId) -> Self {
        Self {
            target,
            needle: String::new(),
            replacement: String::new(),
            resume_from: Anchor::START,
        }
    }

    pub fn target(&self) -> TabId {
        self.target
    }

    pub fn resume_from(&self) -> Anchor {
        self.resume_from
    }

    pub fn reset(&mut self) {
        self.resume_from = Anchor::START;
    }

    /// Searches from the resume point. A miss rewinds to the document start,
    /// so the following call searches from the top.
    pub fn find_next(&mut self, document: &Document) -> FindOutcome {
        if self.needle.is_empty() {
            return FindOutcome::EmptyNeedle;
        }
        let from = document.position_at(self.resume_from);
        match find_next(document, from, &self.needle) {
            Some(span) => {
                self.resume_from = document.anchor_of(&span.end);
                debug!(needle = %self.needle, at = self.resume_from.0, "match found");
                FindOutcome::Found(span)
            }
            None => {
                debug!(needle = %self.needle, "no match before document end");
                self.reset();
                FindOutcome::NotFound
            }
        }
    }

    /// Overwrites a non-empty `selection` with the replacement, then moves on
    /// to the next match after the inserted text.
    pub fn replace(&mut self, document: &mut Document, selection: Option<&TextSpan>) -> FindOutcome {
        if let Some(selection) = selection.filter(|span| !span.is_empty()) {
            self.resume_from = document.replace(selection, &self.replacement);
        }
        self.find_next(document)
    }

    /// Global leftmost-first replace over the concatenated document text.
    /// The content is reassigned as a whole, so run formatting is discarded.
    pub fn replace_all(&mut self, document: &mut Document) -> usize {
        if self.needle.is_empty() {
            return 0;
        }
        let text = document.plain_text();
        let count = text.matches(self.needle.as_str()).count();
        if count > 0 {
            document.set_text(&text.replace(self.needle.as_str(), &self.replacement));
        }
        self.reset();
        info!(needle = %self.needle, count, "replace all");
        count
    }
}
