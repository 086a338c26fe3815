use std::ops::RangeInclusive;

use super::cursor::char_to_byte_idx;
use super::{Anchor, CharFormat, Document, FormatChange, Paragraph, Position, Run, TextSpan};

impl Document {
    /// Splits the run containing `position` so the position becomes a run
    /// boundary. Returns the paragraph and the index of the first run after it.
    pub(crate) fn split_at(&mut self, position: Position) -> (usize, usize) {
        let Some(paragraph) = self.paragraphs.get_mut(position.paragraph) else {
            return (position.paragraph, 0);
        };
        let Some(run) = paragraph.runs.get_mut(position.run) else {
            return (position.paragraph, paragraph.runs.len());
        };
        if position.offset == 0 {
            return (position.paragraph, position.run);
        }
        if position.offset >= run.char_len() {
            return (position.paragraph, position.run + 1);
        }
        let byte_idx = char_to_byte_idx(&run.text, position.offset);
        let tail = run.text.split_off(byte_idx);
        let format = run.format.clone();
        paragraph
            .runs
            .insert(position.run + 1, Run { text: tail, format });
        (position.paragraph, position.run + 1)
    }

    fn split_at_anchor(&mut self, anchor: Anchor) -> (usize, usize) {
        let position = self.position_at(anchor);
        self.split_at(position)
    }

    /// Applies `change` to every run overlapping `[start, end)`, splitting runs
    /// at the range boundaries. Returns whether any run changed.
    pub fn format_range(&mut self, start: Anchor, end: Anchor, change: &FormatChange) -> bool {
        let (start, end) = ordered(start, end);
        if start == end {
            return false;
        }
        let (start_paragraph, start_run) = self.split_at_anchor(start);
        let (end_paragraph, end_run) = self.split_at_anchor(end);

        let mut changed = false;
        for paragraph_index in start_paragraph..=end_paragraph {
            let Some(paragraph) = self.paragraphs.get_mut(paragraph_index) else {
                break;
            };
            let from = if paragraph_index == start_paragraph {
                start_run
            } else {
                0
            };
            let to = if paragraph_index == end_paragraph {
                end_run.min(paragraph.runs.len())
            } else {
                paragraph.runs.len()
            };
            for run in paragraph.runs.iter_mut().take(to).skip(from) {
                if run.text.is_empty() {
                    continue;
                }
                let before = run.format.clone();
                run.format.apply(change);
                changed |= before != run.format;
            }
        }
        changed
    }

    pub fn apply_format(&mut self, span: &TextSpan, change: &FormatChange) -> bool {
        let start = self.anchor_of(&span.start);
        let end = self.anchor_of(&span.end);
        self.format_range(start, end, change)
    }

    /// Resets every run to the default format, then joins the runs that
    /// became identical. Returns how many runs carried formatting.
    pub fn clear_formatting(&mut self) -> usize {
        let mut cleared = 0;
        for run in self.paragraphs.iter_mut().flat_map(|p| p.runs.iter_mut()) {
            if !run.format.is_plain() {
                run.format = CharFormat::default();
                cleared += 1;
            }
        }
        self.merge_runs();
        cleared
    }

    /// Removes `[start, end)`, joining paragraphs when the range crosses breaks.
    pub fn delete(&mut self, start: Anchor, end: Anchor) -> Anchor {
        let (start, end) = ordered(self.clamp_anchor(start), self.clamp_anchor(end));
        if start == end {
            return start;
        }
        let (start_paragraph, start_run) = self.split_at_anchor(start);
        let (end_paragraph, end_run) = self.split_at_anchor(end);

        if start_paragraph == end_paragraph {
            if let Some(paragraph) = self.paragraphs.get_mut(start_paragraph) {
                let end_run = end_run.min(paragraph.runs.len());
                paragraph.runs.drain(start_run.min(end_run)..end_run);
            }
        } else if end_paragraph < self.paragraphs.len() {
            let tail: Vec<Run> = {
                let runs = &mut self.paragraphs[end_paragraph].runs;
                let end_run = end_run.min(runs.len());
                runs.drain(end_run..).collect()
            };
            self.paragraphs.drain(start_paragraph + 1..=end_paragraph);
            let runs = &mut self.paragraphs[start_paragraph].runs;
            runs.truncate(start_run);
            runs.extend(tail);
        }
        self.merge_runs();
        start
    }

    /// Inserts `text` at `anchor` with the format of the preceding character.
    /// Returns the anchor just past the inserted text.
    pub fn insert_text(&mut self, anchor: Anchor, text: &str) -> Anchor {
        let anchor = self.clamp_anchor(anchor);
        let format = self.format_at(anchor);
        self.insert_formatted(anchor, text, format)
    }

    pub(crate) fn insert_formatted(&mut self, anchor: Anchor, text: &str, format: CharFormat) -> Anchor {
        let text = text.replace("\r\n", "\n");
        if text.is_empty() {
            return anchor;
        }
        let inserted = text.chars().count();
        let (mut paragraph_index, mut run_index) = self.split_at_anchor(anchor);

        let mut lines = text.split('\n');
        if let Some(first) = lines.next()
            && !first.is_empty()
            && let Some(paragraph) = self.paragraphs.get_mut(paragraph_index)
        {
            paragraph
                .runs
                .insert(run_index, Run::new(first).with_format(format.clone()));
            run_index += 1;
        }

        for line in lines {
            let Some(paragraph) = self.paragraphs.get_mut(paragraph_index) else {
                break;
            };
            let tail = paragraph.runs.split_off(run_index.min(paragraph.runs.len()));
            let mut next = Paragraph {
                runs: Vec::new(),
                line_spacing: paragraph.line_spacing,
            };
            if !line.is_empty() {
                next.runs.push(Run::new(line).with_format(format.clone()));
            }
            run_index = next.runs.len();
            next.runs.extend(tail);
            paragraph_index += 1;
            self.paragraphs.insert(paragraph_index, next);
        }

        self.merge_runs();
        Anchor(anchor.0 + inserted)
    }

    /// Overwrites `[start, end)` with `text`. The replacement takes the format
    /// of the first replaced character. Returns the end of the inserted text.
    pub fn replace_range(&mut self, start: Anchor, end: Anchor, text: &str) -> Anchor {
        let (start, end) = ordered(self.clamp_anchor(start), self.clamp_anchor(end));
        let format = self
            .formats_in(start, end)
            .first()
            .map(|format| (*format).clone())
            .unwrap_or_else(|| self.format_at(start));
        let start = self.delete(start, end);
        self.insert_formatted(start, text, format)
    }

    pub fn replace(&mut self, span: &TextSpan, text: &str) -> Anchor {
        let start = self.anchor_of(&span.start);
        let end = self.anchor_of(&span.end);
        self.replace_range(start, end, text)
    }

    /// Reassigns the whole content as one run per line. Per-run formatting is
    /// lost: every line takes the first run's format and the first
    /// paragraph's properties.
    pub fn set_text(&mut self, text: &str) {
        let format = self
            .paragraphs
            .iter()
            .flat_map(|paragraph| paragraph.runs.iter())
            .find(|run| !run.text.is_empty())
            .map(|run| run.format.clone())
            .unwrap_or_default();
        let line_spacing = self.paragraphs.first().map_or(1.0, |p| p.line_spacing);

        self.paragraphs = text
            .replace("\r\n", "\n")
            .split('\n')
            .map(|line| Paragraph {
                runs: if line.is_empty() {
                    Vec::new()
                } else {
                    vec![Run::new(line).with_format(format.clone())]
                },
                line_spacing,
            })
            .collect();
        self.ensure_initialized();
    }

    pub fn set_line_spacing(&mut self, paragraphs: RangeInclusive<usize>, spacing: f32) -> usize {
        let mut changed = 0;
        for paragraph in self
            .paragraphs
            .iter_mut()
            .skip(*paragraphs.start())
            .take(paragraphs.end().saturating_sub(*paragraphs.start()) + 1)
        {
            if paragraph.line_spacing != spacing {
                paragraph.line_spacing = spacing;
                changed += 1;
            }
        }
        changed
    }

    /// Joins neighbouring runs that share a format and drops empty runs.
    pub fn merge_runs(&mut self) {
        for paragraph in &mut self.paragraphs {
            let mut merged: Vec<Run> = Vec::with_capacity(paragraph.runs.len());
            for run in paragraph.runs.drain(..) {
                if run.text.is_empty() {
                    continue;
                }
                match merged.last_mut() {
                    Some(last) if last.format == run.format => last.text.push_str(&run.text),
                    _ => merged.push(run),
                }
            }
            paragraph.runs = merged;
        }
    }
}

fn ordered(a: Anchor, b: Anchor) -> (Anchor, Anchor) {
    if b < a { (b, a) } else { (a, b) }
}
