//! Naive keyword highlighter.
//!
//! Every pass clears all character formatting in the document, merging the
//! runs that become identical, and then, for each text run, colors the first
//! occurrence of every keyword found inside that run. Matching is case-sensitive and ignores word boundaries, so
//! `"classic"` lights up `"class"`.
//!
//! Known limitations that are kept on purpose:
//!
//! - only the first occurrence of a keyword per run is colored;
//! - a keyword split across two runs is never matched;
//! - manual formatting (bold, colors) is wiped by the next pass, which runs
//!   after every content change.

use tracing::debug;

use crate::document::{Anchor, Color, Direction, Document, FormatChange, PointerContext};

pub const DEFAULT_KEYWORDS: [&str; 10] = [
    "class", "void", "int", "if", "else", "public", "private", "string", "for", "while",
];

#[derive(Clone, Debug, PartialEq)]
pub struct HighlightConfig {
    pub enabled: bool,
    pub keywords: Vec<String>,
    pub color: Color,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keywords: DEFAULT_KEYWORDS.iter().map(|kw| kw.to_string()).collect(),
            color: Color::BLUE,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HighlightReport {
    pub runs_scanned: usize,
    pub matches: usize,
}

pub fn highlight(document: &mut Document, config: &HighlightConfig) -> HighlightReport {
    document.clear_formatting();

    let mut report = HighlightReport::default();
    let mut hits: Vec<(Anchor, Anchor)> = Vec::new();

    let mut cursor = document.cursor(document.start());
    loop {
        if cursor.context(Direction::Forward) == PointerContext::Text {
            report.runs_scanned += 1;
            let run_text = cursor.text_in_run(Direction::Forward);
            for keyword in config.keywords.iter().filter(|kw| !kw.is_empty()) {
                let Some(byte_idx) = run_text.find(keyword.as_str()) else {
                    continue;
                };
                let chars_before = run_text[..byte_idx].chars().count();
                let Some(start) = cursor.offset_by(chars_before) else {
                    continue;
                };
                let start = document.anchor_of(&start);
                hits.push((start, Anchor(start.0 + keyword.chars().count())));
            }
        }
        match cursor.advance(Direction::Forward) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    // Anchors survive the run splits each application causes.
    let change = FormatChange::Foreground(Some(config.color));
    for (start, end) in hits {
        document.format_range(start, end, &change);
        report.matches += 1;
    }

    debug!(
        runs = report.runs_scanned,
        matches = report.matches,
        "keyword highlight pass"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{CharFormat, Paragraph, Run};

    fn config() -> HighlightConfig {
        HighlightConfig::default()
    }

    fn blue_texts(document: &Document) -> Vec<String> {
        document
            .paragraphs
            .iter()
            .flat_map(|p| p.runs.iter())
            .filter(|run| run.format.foreground == Some(Color::BLUE))
            .map(|run| run.text.clone())
            .collect()
    }

    #[test]
    fn highlights_single_occurrence() {
        let mut document = Document::from_plain_text("public void main");
        let report = highlight(&mut document, &config());
        assert_eq!(blue_texts(&document), vec!["public", "void"]);
        assert_eq!(report.matches, 2);
        assert_eq!(document.plain_text(), "public void main");
    }

    #[test]
    fn run_without_keywords_is_untouched() {
        let mut document = Document::from_plain_text("nothing to see");
        let report = highlight(&mut document, &config());
        assert_eq!(report.matches, 0);
        assert_eq!(document.paragraphs[0].runs.len(), 1);
        assert!(document.paragraphs[0].runs[0].format.is_plain());
    }

    #[test]
    fn only_first_occurrence_per_run() {
        let mut document = Document::from_plain_text("while x while y");
        highlight(&mut document, &config());
        let runs = &document.paragraphs[0].runs;
        assert_eq!(runs[0].text, "while");
        assert_eq!(runs[0].format.foreground, Some(Color::BLUE));
        assert_eq!(runs[1].text, " x while y");
        assert_eq!(runs[1].format.foreground, None);
    }

    #[test]
    fn keyword_split_across_paragraphs_is_not_matched() {
        let mut document = Document::from_plain_text("cla\nss");
        let report = highlight(&mut document, &config());
        assert_eq!(report.matches, 0);
        assert_eq!(report.runs_scanned, 2);
        assert!(blue_texts(&document).is_empty());
    }

    #[test]
    fn cleared_runs_are_merged_before_scanning() {
        let bold = CharFormat {
            bold: true,
            ..CharFormat::default()
        };
        let mut document = Document::new().with_paragraphs(vec![
            Paragraph::new().with_runs(vec![Run::new("cla").with_format(bold), Run::new("ss")]),
        ]);
        let report = highlight(&mut document, &config());
        assert_eq!(report.runs_scanned, 1);
        assert_eq!(blue_texts(&document), vec!["class"]);
    }

    #[test]
    fn second_pass_keeps_first_occurrence_rule() {
        let mut document = Document::from_plain_text("while x while y");
        highlight(&mut document, &config());
        let first = document.clone();
        highlight(&mut document, &config());
        assert_eq!(document, first);
        assert_eq!(blue_texts(&document), vec!["while"]);
        let texts: Vec<&str> = document.paragraphs[0]
            .runs
            .iter()
            .map(|run| run.text.as_str())
            .collect();
        assert_eq!(texts, vec!["while", " x while y"]);
    }

    #[test]
    fn ignores_word_boundaries() {
        let mut document = Document::from_plain_text("classic");
        highlight(&mut document, &config());
        assert_eq!(blue_texts(&document), vec!["class"]);
    }

    #[test]
    fn matches_inside_words() {
        let mut document = Document::from_plain_text("print");
        highlight(&mut document, &config());
        assert_eq!(blue_texts(&document), vec!["int"]);
        assert_eq!(document.plain_text(), "print");
    }

    #[test]
    fn overlapping_keywords_both_apply() {
        let mut document = Document::from_plain_text("ifor");
        let report = highlight(&mut document, &config());
        assert_eq!(report.matches, 2);
        assert_eq!(blue_texts(&document).concat(), "ifor");
    }

    #[test]
    fn clears_manual_formatting() {
        let bold = CharFormat {
            bold: true,
            ..CharFormat::default()
        };
        let mut document = Document::new().with_paragraphs(vec![
            Paragraph::new().with_runs(vec![Run::new("plain text").with_format(bold)]),
        ]);
        highlight(&mut document, &config());
        assert!(document.paragraphs[0].runs[0].format.is_plain());
    }

    #[test]
    fn repeated_passes_are_stable() {
        let mut document = Document::from_plain_text("if x else y");
        highlight(&mut document, &config());
        let first = document.clone();
        highlight(&mut document, &config());
        assert_eq!(document, first);
    }

    #[test]
    fn scans_every_paragraph() {
        let mut document = Document::from_plain_text("for\n\nstring s");
        highlight(&mut document, &config());
        assert_eq!(blue_texts(&document), vec!["for", "string"]);
    }

    #[test]
    fn custom_color_and_keywords() {
        let config = HighlightConfig {
            enabled: true,
            keywords: vec!["fn".to_string(), String::new()],
            color: Color::RED,
        };
        let mut document = Document::from_plain_text("pub fn main");
        let report = highlight(&mut document, &config);
        assert_eq!(report.matches, 1);
        let runs = &document.paragraphs[0].runs;
        assert_eq!(runs[1].text, "fn");
        assert_eq!(runs[1].format.foreground, Some(Color::RED));
    }
}
