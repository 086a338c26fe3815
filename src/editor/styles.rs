use super::{DocumentEditor, EditKind};
use crate::document::{Color, Emphasis, FormatChange};

impl DocumentEditor {
    /// Sets `emphasis` on the selection, or clears it when every selected run
    /// already carries it.
    pub fn toggle_emphasis(&mut self, emphasis: Emphasis) -> bool {
        let Some((start, end)) = self.selection() else {
            return false;
        };
        let all_set = self
            .document
            .formats_in(start, end)
            .iter()
            .all(|format| emphasis.is_set(format));
        self.apply_to_selection(&emphasis.change(!all_set))
    }

    pub fn set_foreground(&mut self, color: Option<Color>) -> bool {
        self.apply_to_selection(&FormatChange::Foreground(color))
    }

    pub fn set_background(&mut self, color: Option<Color>) -> bool {
        self.apply_to_selection(&FormatChange::Background(color))
    }

    pub fn set_font_family(&mut self, family: &str) -> bool {
        self.apply_to_selection(&FormatChange::FontFamily(Some(family.to_string())))
    }

    pub fn set_font_size(&mut self, size: u16) -> bool {
        self.apply_to_selection(&FormatChange::FontSize(Some(size)))
    }

    /// Applies `change` to the selection. Formatting is not a content change,
    /// so the keyword scan does not run here; the next edit will clear it.
    pub fn apply_to_selection(&mut self, change: &FormatChange) -> bool {
        let Some((start, end)) = self.selection() else {
            return false;
        };
        let mut preview = self.document.clone();
        if !preview.format_range(start, end, change) {
            return false;
        }
        self.record(EditKind::Other);
        self.document = preview;
        true
    }

    /// Line spacing for every paragraph touched by the selection, or the
    /// caret's paragraph.
    pub fn set_line_spacing(&mut self, spacing: f32) -> bool {
        let (first, last) = match self.selection() {
            Some((start, end)) => (
                self.document.paragraph_of(start).0,
                self.document.paragraph_of(end).0,
            ),
            None => {
                let paragraph = self.caret_location().0;
                (paragraph, paragraph)
            }
        };
        let unchanged = self.document.paragraphs[first..=last]
            .iter()
            .all(|paragraph| paragraph.line_spacing == spacing);
        if unchanged {
            return false;
        }
        self.record(EditKind::Other);
        self.document.set_line_spacing(first..=last, spacing);
        true
    }

    pub fn current_line_spacing(&self) -> f32 {
        let paragraph = self.caret_location().0;
        self.document.paragraphs[paragraph].line_spacing
    }
}
