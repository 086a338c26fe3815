//! Headless rich-text document: paragraphs of formatted runs, addressed either
//! by structural [`Position`]s or by character [`Anchor`]s.

mod cursor;
mod edit;
mod format;

pub use cursor::{Cursor, Direction, PointerContext, Position};
pub use format::{CharFormat, Color, Emphasis, FormatChange, ParseColorError};

/// Font sizes offered by the size picker.
pub const FONT_SIZES: std::ops::RangeInclusive<u16> = 8..=48;
pub const FONT_SIZE_STEP: usize = 2;

pub fn font_sizes() -> impl Iterator<Item = u16> {
    FONT_SIZES.step_by(FONT_SIZE_STEP)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub format: CharFormat,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: CharFormat::default(),
        }
    }

    pub fn with_format(mut self, format: CharFormat) -> Self {
        self.format = format;
        self
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub line_spacing: f32,
}

impl Default for Paragraph {
    fn default() -> Self {
        Self {
            runs: Vec::new(),
            line_spacing: 1.0,
        }
    }
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runs(mut self, runs: Vec<Run>) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_runs(vec![Run::new(text)])
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(Run::char_len).sum()
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Character offset into the logical content stream. A paragraph break counts
/// as one character, so anchors line up with [`Document::plain_text`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Anchor(pub usize);

impl Anchor {
    pub const START: Anchor = Anchor(0);
}

/// A `(start, end)` pair of positions with `start <= end`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSpan {
    pub start: Position,
    pub end: Position,
}

impl TextSpan {
    pub fn new(a: Position, b: Position) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            paragraphs: vec![Paragraph::new()],
        }
    }

    pub fn with_paragraphs(mut self, paragraphs: Vec<Paragraph>) -> Self {
        self.paragraphs = paragraphs;
        self.ensure_initialized();
        self
    }

    /// One unformatted run per line.
    pub fn from_plain_text(text: &str) -> Self {
        let paragraphs = text
            .split('\n')
            .map(|line| {
                let line = line.strip_suffix('\r').unwrap_or(line);
                if line.is_empty() {
                    Paragraph::new()
                } else {
                    Paragraph::new().with_text(line)
                }
            })
            .collect();
        Self::new().with_paragraphs(paragraphs)
    }

    pub(crate) fn ensure_initialized(&mut self) {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::new());
        }
    }

    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Length of the logical stream in characters.
    pub fn char_len(&self) -> usize {
        let text: usize = self.paragraphs.iter().map(Paragraph::char_len).sum();
        text + self.paragraphs.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.char_len() == 0
    }

    pub fn start(&self) -> Position {
        Position::new(0, 0, 0)
    }

    pub fn end(&self) -> Position {
        let last = self.paragraphs.len().saturating_sub(1);
        let runs = self.paragraphs.get(last).map_or(0, |p| p.runs.len());
        Position::new(last, runs, 0)
    }

    pub fn end_anchor(&self) -> Anchor {
        Anchor(self.char_len())
    }

    pub fn cursor(&self, position: Position) -> Cursor<'_> {
        Cursor::new(self, position)
    }

    pub fn span(&self, start: Anchor, end: Anchor) -> TextSpan {
        TextSpan::new(self.position_at(start), self.position_at(end))
    }

    pub fn anchor_of(&self, position: &Position) -> Anchor {
        let mut offset = 0;
        for paragraph in self.paragraphs.iter().take(position.paragraph) {
            offset += paragraph.char_len() + 1;
        }
        if let Some(paragraph) = self.paragraphs.get(position.paragraph) {
            offset += paragraph
                .runs
                .iter()
                .take(position.run)
                .map(Run::char_len)
                .sum::<usize>();
            if let Some(run) = paragraph.runs.get(position.run) {
                offset += position.offset.min(run.char_len());
            }
        }
        Anchor(offset)
    }

    /// Earliest position for `anchor`; anchors past the end clamp to [`Document::end`].
    pub fn position_at(&self, anchor: Anchor) -> Position {
        let mut remaining = anchor.0;
        for (paragraph_index, paragraph) in self.paragraphs.iter().enumerate() {
            let len = paragraph.char_len();
            if remaining <= len {
                for (run_index, run) in paragraph.runs.iter().enumerate() {
                    let run_len = run.char_len();
                    if remaining <= run_len {
                        return Position::new(paragraph_index, run_index, remaining);
                    }
                    remaining -= run_len;
                }
                return Position::new(paragraph_index, paragraph.runs.len(), 0);
            }
            remaining -= len + 1;
        }
        self.end()
    }

    pub fn clamp_anchor(&self, anchor: Anchor) -> Anchor {
        Anchor(anchor.0.min(self.char_len()))
    }

    pub fn is_valid(&self, position: &Position) -> bool {
        match self.paragraphs.get(position.paragraph) {
            Some(paragraph) => match paragraph.runs.get(position.run) {
                Some(run) => position.offset <= run.char_len(),
                None => position.run == paragraph.runs.len() && position.offset == 0,
            },
            None => false,
        }
    }

    /// Text enclosed by `span`, paragraph breaks rendered as `\n`.
    pub fn text(&self, span: &TextSpan) -> String {
        let start = self.anchor_of(&span.start).0;
        let end = self.anchor_of(&span.end).0;
        self.plain_text()
            .chars()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }

    /// Paragraph index and column for an anchor.
    pub fn paragraph_of(&self, anchor: Anchor) -> (usize, usize) {
        let mut remaining = anchor.0;
        for (index, paragraph) in self.paragraphs.iter().enumerate() {
            let len = paragraph.char_len();
            if remaining <= len {
                return (index, remaining);
            }
            remaining -= len + 1;
        }
        let last = self.paragraphs.len().saturating_sub(1);
        (last, self.paragraphs.get(last).map_or(0, Paragraph::char_len))
    }

    pub fn paragraph_start(&self, index: usize) -> Anchor {
        Anchor(
            self.paragraphs
                .iter()
                .take(index)
                .map(|paragraph| paragraph.char_len() + 1)
                .sum(),
        )
    }

    /// Format of the character just before `anchor`, falling back to the one
    /// after it. This is the format new text typed at `anchor` inherits.
    pub fn format_at(&self, anchor: Anchor) -> CharFormat {
        let position = self.position_at(anchor);
        let Some(paragraph) = self.paragraphs.get(position.paragraph) else {
            return CharFormat::default();
        };
        let preceding = if position.offset > 0 {
            paragraph.runs.get(position.run)
        } else if position.run > 0 {
            paragraph.runs.get(position.run - 1)
        } else {
            None
        };
        preceding
            .or_else(|| paragraph.runs.get(position.run))
            .map(|run| run.format.clone())
            .unwrap_or_default()
    }

    /// Runs overlapping `[start, end)` in document order.
    pub fn formats_in(&self, start: Anchor, end: Anchor) -> Vec<&CharFormat> {
        let mut formats = Vec::new();
        let mut offset = 0;
        for paragraph in &self.paragraphs {
            for run in &paragraph.runs {
                let len = run.char_len();
                if len > 0 && offset < end.0 && offset + len > start.0 {
                    formats.push(&run.format);
                }
                offset += len;
            }
            offset += 1;
        }
        formats
    }
}



#[cfg(test)]
#[path = "document/edit_tests.rs"]
mod edit_tests;
