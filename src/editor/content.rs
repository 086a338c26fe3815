use super::{DocumentEditor, EditKind};
use crate::document::Anchor;

impl DocumentEditor {
    pub fn insert_char(&mut self, ch: char) -> bool {
        if ch == '\n' {
            return self.insert_paragraph_break();
        }
        let kind = if self.selection().is_some() {
            EditKind::Other
        } else {
            EditKind::Typing
        };
        self.record(kind);
        let at = self.take_selection();
        let mut buf = [0u8; 4];
        self.caret = self.document.insert_text(at, ch.encode_utf8(&mut buf));
        self.after_edit();
        true
    }

    /// Inserts `text` at the caret, replacing the selection if there is one.
    pub fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() && self.selection().is_none() {
            return false;
        }
        self.record(EditKind::Other);
        let at = self.take_selection();
        self.caret = self.document.insert_text(at, text);
        self.after_edit();
        true
    }

    pub fn insert_paragraph_break(&mut self) -> bool {
        self.record(EditKind::Other);
        let at = self.take_selection();
        self.caret = self.document.insert_text(at, "\n");
        self.after_edit();
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.selection().is_some() {
            return self.delete_selection();
        }
        if self.caret.0 == 0 {
            return false;
        }
        self.record(EditKind::Other);
        self.caret = self.document.delete(Anchor(self.caret.0 - 1), self.caret);
        self.after_edit();
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.selection().is_some() {
            return self.delete_selection();
        }
        if self.caret >= self.document.end_anchor() {
            return false;
        }
        self.record(EditKind::Other);
        self.caret = self.document.delete(self.caret, Anchor(self.caret.0 + 1));
        self.after_edit();
        true
    }

    pub fn delete_word_backward(&mut self) -> bool {
        if self.selection().is_some() {
            return self.delete_selection();
        }
        let (paragraph, column) = self.caret_location();
        if column == 0 {
            return self.backspace();
        }
        let text = self.document.paragraphs[paragraph].text();
        let start = previous_word_boundary(&text, column);
        let paragraph_start = self.document.paragraph_start(paragraph);
        self.record(EditKind::Other);
        self.caret = self
            .document
            .delete(Anchor(paragraph_start.0 + start), self.caret);
        self.after_edit();
        true
    }

    pub fn delete_word_forward(&mut self) -> bool {
        if self.selection().is_some() {
            return self.delete_selection();
        }
        let (paragraph, column) = self.caret_location();
        let text = self.document.paragraphs[paragraph].text();
        if column >= text.chars().count() {
            return self.delete();
        }
        let end = next_word_boundary(&text, column);
        let paragraph_start = self.document.paragraph_start(paragraph);
        self.record(EditKind::Other);
        self.caret = self
            .document
            .delete(self.caret, Anchor(paragraph_start.0 + end));
        self.after_edit();
        true
    }

    pub fn delete_selection(&mut self) -> bool {
        if self.selection().is_none() {
            return false;
        }
        self.record(EditKind::Other);
        self.caret = self.take_selection();
        self.after_edit();
        true
    }

    /// Deletes the selection, if any, and returns where new text goes.
    fn take_selection(&mut self) -> Anchor {
        let at = match self.selection() {
            Some((start, end)) => self.document.delete(start, end),
            None => self.caret,
        };
        self.selection_anchor = None;
        at
    }

    fn after_edit(&mut self) {
        self.preferred_column = None;
        self.content_changed();
    }
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub fn previous_word_boundary(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut idx = offset.min(chars.len());
    if idx == 0 {
        return 0;
    }

    while idx > 0 && chars[idx - 1].is_whitespace() {
        idx -= 1;
    }
    if idx == 0 {
        return 0;
    }

    while idx > 0 && is_word_char(chars[idx - 1]) {
        idx -= 1;
    }
    if idx > 0 && !is_word_char(chars[idx - 1]) && !chars[idx - 1].is_whitespace() {
        while idx > 0 && !is_word_char(chars[idx - 1]) && !chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
    }
    idx
}

pub fn next_word_boundary(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut idx = offset.min(len);
    if idx >= len {
        return len;
    }

    if chars[idx].is_whitespace() {
        while idx < len && chars[idx].is_whitespace() {
            idx += 1;
        }
        return idx;
    }

    if is_word_char(chars[idx]) {
        while idx < len && is_word_char(chars[idx]) {
            idx += 1;
        }
    } else {
        while idx < len && !chars[idx].is_whitespace() && !is_word_char(chars[idx]) {
            idx += 1;
        }
    }
    while idx < len && chars[idx].is_whitespace() {
        idx += 1;
    }
    idx
}
