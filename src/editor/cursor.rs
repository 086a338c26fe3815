use super::DocumentEditor;
use super::content::{next_word_boundary, previous_word_boundary};
use crate::document::Anchor;

impl DocumentEditor {
    /// Starts or drops the selection before a caret motion.
    fn prepare_motion(&mut self, extend: bool) {
        if extend {
            if self.selection_anchor.is_none() {
                self.selection_anchor = Some(self.caret);
            }
        } else {
            self.selection_anchor = None;
        }
        self.history.break_group();
    }

    pub fn move_to(&mut self, anchor: Anchor, extend: bool) -> bool {
        self.prepare_motion(extend);
        self.preferred_column = None;
        let target = self.document.clamp_anchor(anchor);
        let moved = target != self.caret;
        self.caret = target;
        moved
    }

    pub fn move_left(&mut self, extend: bool) -> bool {
        if self.caret.0 == 0 {
            self.prepare_motion(extend);
            return false;
        }
        self.move_to(Anchor(self.caret.0 - 1), extend)
    }

    pub fn move_right(&mut self, extend: bool) -> bool {
        self.move_to(Anchor(self.caret.0 + 1), extend)
    }

    pub fn move_word_left(&mut self, extend: bool) -> bool {
        let (paragraph, column) = self.caret_location();
        if column == 0 {
            return self.move_left(extend);
        }
        let text = self.document.paragraphs[paragraph].text();
        let target = previous_word_boundary(&text, column);
        let start = self.document.paragraph_start(paragraph);
        self.move_to(Anchor(start.0 + target), extend)
    }

    pub fn move_word_right(&mut self, extend: bool) -> bool {
        let (paragraph, column) = self.caret_location();
        let text = self.document.paragraphs[paragraph].text();
        if column >= text.chars().count() {
            return self.move_right(extend);
        }
        let target = next_word_boundary(&text, column);
        let start = self.document.paragraph_start(paragraph);
        self.move_to(Anchor(start.0 + target), extend)
    }

    pub fn move_up(&mut self, extend: bool) -> bool {
        let (paragraph, column) = self.caret_location();
        if paragraph == 0 {
            return self.move_to(Anchor::START, extend);
        }
        self.move_to_paragraph(paragraph - 1, column, extend)
    }

    pub fn move_down(&mut self, extend: bool) -> bool {
        let (paragraph, column) = self.caret_location();
        if paragraph + 1 >= self.document.paragraphs.len() {
            return self.move_to(self.document.end_anchor(), extend);
        }
        self.move_to_paragraph(paragraph + 1, column, extend)
    }

    fn move_to_paragraph(&mut self, paragraph: usize, column: usize, extend: bool) -> bool {
        let preferred = self.preferred_column.unwrap_or(column);
        let len = self.document.paragraphs[paragraph].char_len();
        let target = Anchor(self.document.paragraph_start(paragraph).0 + preferred.min(len));
        let moved = self.move_to(target, extend);
        self.preferred_column = Some(preferred);
        moved
    }

    pub fn move_line_start(&mut self, extend: bool) -> bool {
        let (paragraph, _) = self.caret_location();
        let start = self.document.paragraph_start(paragraph);
        self.move_to(start, extend)
    }

    pub fn move_line_end(&mut self, extend: bool) -> bool {
        let (paragraph, _) = self.caret_location();
        let start = self.document.paragraph_start(paragraph);
        let len = self.document.paragraphs[paragraph].char_len();
        self.move_to(Anchor(start.0 + len), extend)
    }

    pub fn move_document_start(&mut self, extend: bool) -> bool {
        self.move_to(Anchor::START, extend)
    }

    pub fn move_document_end(&mut self, extend: bool) -> bool {
        let end = self.document.end_anchor();
        self.move_to(end, extend)
    }
}
