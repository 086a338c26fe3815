use std::cmp::Ordering;

use super::Document;

/// Structural address in a document: `run == runs.len()` is the paragraph end edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub paragraph: usize,
    pub run: usize,
    pub offset: usize,
}

impl Position {
    pub const fn new(paragraph: usize, run: usize, offset: usize) -> Self {
        Self {
            paragraph,
            run,
            offset,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// What lies next to a position in a given direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerContext {
    Text,
    ElementEdge,
    None,
}

/// Read-only traversal over the content positions of a document.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    document: &'a Document,
    position: Position,
}

impl<'a> Cursor<'a> {
    pub(super) fn new(document: &'a Document, position: Position) -> Self {
        Self { document, position }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn compare(&self, other: &Position) -> Ordering {
        self.position.cmp(other)
    }

    fn run_text(&self) -> Option<&'a str> {
        self.document
            .paragraphs
            .get(self.position.paragraph)?
            .runs
            .get(self.position.run)
            .map(|run| run.text.as_str())
    }

    pub fn context(&self, direction: Direction) -> PointerContext {
        let Some(text) = self.run_text() else {
            return if self.is_document_edge(direction) {
                PointerContext::None
            } else {
                PointerContext::ElementEdge
            };
        };
        let len = text.chars().count();
        let has_text = match direction {
            Direction::Forward => self.position.offset < len,
            Direction::Backward => self.position.offset > 0,
        };
        if has_text {
            PointerContext::Text
        } else if self.is_document_edge(direction) {
            PointerContext::None
        } else {
            PointerContext::ElementEdge
        }
    }

    fn is_document_edge(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.position >= self.document.end(),
            Direction::Backward => self.position <= self.document.start(),
        }
    }

    /// Text between the cursor and the end (or start) of its run.
    pub fn text_in_run(&self, direction: Direction) -> &'a str {
        let Some(text) = self.run_text() else {
            return "";
        };
        let byte_idx = char_to_byte_idx(text, self.position.offset);
        match direction {
            Direction::Forward => &text[byte_idx..],
            Direction::Backward => &text[..byte_idx],
        }
    }

    /// Position `chars` characters further into the current run.
    pub fn offset_by(&self, chars: usize) -> Option<Position> {
        let len = self.run_text()?.chars().count();
        let offset = self.position.offset + chars;
        (offset <= len).then(|| Position::new(self.position.paragraph, self.position.run, offset))
    }

    /// Moves past the next symbol: a whole stretch of run text or one element edge.
    pub fn advance(&self, direction: Direction) -> Option<Cursor<'a>> {
        let position = match direction {
            Direction::Forward => self.next_position()?,
            Direction::Backward => self.previous_position()?,
        };
        Some(Cursor::new(self.document, position))
    }

    fn next_position(&self) -> Option<Position> {
        let Position {
            paragraph,
            run,
            offset,
        } = self.position;
        let runs = &self.document.paragraphs.get(paragraph)?.runs;
        if let Some(current) = runs.get(run) {
            let len = current.char_len();
            if offset < len {
                return Some(Position::new(paragraph, run, len));
            }
            return Some(Position::new(paragraph, run + 1, 0));
        }
        if paragraph + 1 < self.document.paragraphs.len() {
            Some(Position::new(paragraph + 1, 0, 0))
        } else {
            None
        }
    }

    fn previous_position(&self) -> Option<Position> {
        let Position {
            paragraph,
            run,
            offset,
        } = self.position;
        let runs = &self.document.paragraphs.get(paragraph)?.runs;
        if run < runs.len() && offset > 0 {
            return Some(Position::new(paragraph, run, 0));
        }
        if run > 0 {
            let previous = run.min(runs.len()) - 1;
            return Some(Position::new(paragraph, previous, runs[previous].char_len()));
        }
        if paragraph == 0 {
            return None;
        }
        let previous_runs = self.document.paragraphs[paragraph - 1].runs.len();
        Some(Position::new(paragraph - 1, previous_runs, 0))
    }
}

pub(crate) fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}
