use tracing::trace;

use crate::document::{Anchor, CharFormat, Document, TextSpan};
use crate::highlight::{HighlightConfig, highlight};

mod content;
mod cursor;
mod history;
mod styles;

use history::{EditKind, History, Snapshot};

pub use content::{next_word_boundary, previous_word_boundary};

/// Editing state of one open document: caret, selection, undo history and the
/// keyword highlighter that runs after every content change.
#[derive(Debug)]
pub struct DocumentEditor {
    document: Document,
    caret: Anchor,
    selection_anchor: Option<Anchor>,
    preferred_column: Option<usize>,
    highlight: HighlightConfig,
    history: History,
}

impl DocumentEditor {
    pub fn new(document: Document, highlight: HighlightConfig) -> Self {
        let mut editor = Self {
            document,
            caret: Anchor::START,
            selection_anchor: None,
            preferred_column: None,
            highlight,
            history: History::default(),
        };
        editor.content_changed();
        editor
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn highlight_config(&self) -> &HighlightConfig {
        &self.highlight
    }

    pub fn set_highlight_config(&mut self, config: HighlightConfig) {
        self.highlight = config;
        self.content_changed();
    }

    /// Swaps in a freshly loaded document. History is dropped.
    pub fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.history = History::default();
        self.caret = Anchor::START;
        self.selection_anchor = None;
        self.preferred_column = None;
        self.content_changed();
    }

    pub fn caret(&self) -> Anchor {
        self.caret
    }

    /// Paragraph index and column of the caret.
    pub fn caret_location(&self) -> (usize, usize) {
        self.document.paragraph_of(self.caret)
    }

    /// Ordered, non-empty selection.
    pub fn selection(&self) -> Option<(Anchor, Anchor)> {
        let anchor = self.selection_anchor?;
        if anchor == self.caret {
            return None;
        }
        Some(if anchor < self.caret {
            (anchor, self.caret)
        } else {
            (self.caret, anchor)
        })
    }

    pub fn selection_span(&self) -> Option<TextSpan> {
        self.selection()
            .map(|(start, end)| self.document.span(start, end))
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection_span().map(|span| self.document.text(&span))
    }

    /// Selects `span` with the caret at its end.
    pub fn set_selection(&mut self, span: &TextSpan) {
        self.selection_anchor = Some(self.document.anchor_of(&span.start));
        self.caret = self.document.anchor_of(&span.end);
        self.preferred_column = None;
        self.history.break_group();
    }

    pub fn clear_selection(&mut self) {
        self.selection_anchor = None;
    }

    pub fn select_all(&mut self) {
        self.selection_anchor = Some(Anchor::START);
        self.caret = self.document.end_anchor();
        self.history.break_group();
    }

    /// Format new text typed at the caret would get.
    pub fn current_format(&self) -> CharFormat {
        match self.selection() {
            Some((start, _)) => self
                .document
                .formats_in(start, Anchor(start.0 + 1))
                .first()
                .map(|format| (*format).clone())
                .unwrap_or_default(),
            None => self.document.format_at(self.caret),
        }
    }

    /// Runs `edit` against the document as one undoable content change.
    pub fn edit<R>(&mut self, edit: impl FnOnce(&mut Document) -> R) -> R {
        self.record(EditKind::Other);
        let result = edit(&mut self.document);
        self.document.ensure_initialized();
        self.content_changed();
        result
    }

    /// Replaces the whole content; run formatting is not kept.
    pub fn replace_all_text(&mut self, text: &str) {
        self.edit(|document| document.set_text(text));
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        let Some(snapshot) = self.history.undo(current) else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        let Some(snapshot) = self.history.redo(current) else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.document.clone(),
            caret: self.caret,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.document = snapshot.document;
        self.caret = snapshot.caret;
        self.selection_anchor = None;
        self.preferred_column = None;
        self.content_changed();
    }

    fn record(&mut self, kind: EditKind) {
        let snapshot = self.snapshot();
        self.history.record(snapshot, kind);
    }

    /// Keeps the caret inside the document and re-runs the keyword scan.
    fn content_changed(&mut self) {
        self.caret = self.document.clamp_anchor(self.caret);
        if let Some(anchor) = self.selection_anchor {
            self.selection_anchor = Some(self.document.clamp_anchor(anchor));
        }
        if self.highlight.enabled {
            let report = highlight(&mut self.document, &self.highlight);
            trace!(matches = report.matches, "document rehighlighted");
        }
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;

#[cfg(test)]
#[path = "editor/cursor_tests.rs"]
mod cursor_tests;


#[cfg(test)]
#[path = "editor/style_tests.rs"]
mod style_tests;
