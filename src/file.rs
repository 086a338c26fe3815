use std::{
    fs,
    io::Cursor,
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use tdoc::{InlineStyle, markdown, parse, writer::Writer};
use tracing::info;

use crate::document::{CharFormat, Color, Document, Paragraph, Run};

/// Background color given to `InlineStyle::Highlight` spans on load.
const LOADED_HIGHLIGHT: Color = Color::YELLOW;
const CODE_FONT: &str = "monospace";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Ftml,
    Markdown,
    PlainText,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("txt") | Some("text") => FileFormat::PlainText,
            Some("md") | Some("markdown") | Some("mkd") | Some("mdown") | Some("mdtxt") => {
                FileFormat::Markdown
            }
            _ => FileFormat::Ftml,
        }
    }

    pub fn is_rich(&self) -> bool {
        !matches!(self, FileFormat::PlainText)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileFormat::Ftml => "FTML",
            FileFormat::Markdown => "Markdown",
            FileFormat::PlainText => "Text",
        }
    }
}

pub fn load(path: &Path) -> Result<(Document, FileFormat)> {
    let format = FileFormat::from_path(path);
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document = parse_str(&content, format)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    info!(path = %path.display(), format = format.label(), "loaded document");
    Ok((document, format))
}

pub fn save(document: &Document, path: &Path, format: FileFormat) -> Result<()> {
    let contents = write_string(document, format)?;
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), format = format.label(), "saved document");
    Ok(())
}

pub fn parse_str(content: &str, format: FileFormat) -> Result<Document> {
    let parsed = match format {
        FileFormat::PlainText => return Ok(Document::from_plain_text(content)),
        FileFormat::Ftml => {
            parse(Cursor::new(content.to_string())).map_err(|err| anyhow!("FTML: {err}"))?
        }
        FileFormat::Markdown => markdown::parse(Cursor::new(content.to_string()))
            .map_err(|err| anyhow!("Markdown: {err}"))?,
    };
    Ok(from_tdoc(&parsed))
}

pub fn write_string(document: &Document, format: FileFormat) -> Result<String> {
    match format {
        FileFormat::PlainText => Ok(document.plain_text()),
        FileFormat::Ftml => Writer::new()
            .write_to_string(&to_tdoc(document))
            .context("failed to render FTML"),
        FileFormat::Markdown => {
            let mut contents = Vec::new();
            markdown::write(&mut contents, &to_tdoc(document))
                .context("failed to render Markdown")?;
            String::from_utf8(contents).context("Markdown output is not UTF-8")
        }
    }
}

/// Flattens quotes, lists and checklists into plain paragraphs.
fn from_tdoc(source: &tdoc::Document) -> Document {
    let mut paragraphs = Vec::new();
    for paragraph in &source.paragraphs {
        collect_paragraph(paragraph, &mut paragraphs);
    }
    let mut document = Document::new().with_paragraphs(paragraphs);
    document.merge_runs();
    document
}

fn collect_paragraph(paragraph: &tdoc::Paragraph, out: &mut Vec<Paragraph>) {
    let kind = paragraph.paragraph_type();
    if kind.is_leaf() {
        let mut base = CharFormat::default();
        match kind {
            tdoc::ParagraphType::Header1
            | tdoc::ParagraphType::Header2
            | tdoc::ParagraphType::Header3 => base.bold = true,
            tdoc::ParagraphType::CodeBlock => base.font_family = Some(CODE_FONT.to_string()),
            _ => {}
        }
        let mut runs = Vec::new();
        for span in paragraph.content() {
            collect_runs(span, &base, &mut runs);
        }
        out.push(Paragraph::new().with_runs(runs));
    }
    for child in paragraph.children() {
        collect_paragraph(child, out);
    }
    for entry in paragraph.entries() {
        for child in entry {
            collect_paragraph(child, out);
        }
    }
    for item in paragraph.checklist_items() {
        collect_checklist_item(item, out);
    }
}

fn collect_checklist_item(item: &tdoc::ChecklistItem, out: &mut Vec<Paragraph>) {
    let mut runs = Vec::new();
    for span in &item.content {
        collect_runs(span, &CharFormat::default(), &mut runs);
    }
    out.push(Paragraph::new().with_runs(runs));
    for child in &item.children {
        collect_checklist_item(child, out);
    }
}

fn collect_runs(span: &tdoc::Span, inherited: &CharFormat, runs: &mut Vec<Run>) {
    let mut format = inherited.clone();
    match span.style {
        InlineStyle::Bold => format.bold = true,
        InlineStyle::Italic => format.italic = true,
        InlineStyle::Underline => format.underline = true,
        InlineStyle::Highlight => format.background = Some(LOADED_HIGHLIGHT),
        InlineStyle::Code => format.font_family = Some(CODE_FONT.to_string()),
        _ => {}
    }
    if !span.text.is_empty() {
        runs.push(Run::new(span.text.as_str()).with_format(format.clone()));
    }
    for child in &span.children {
        collect_runs(child, &format, runs);
    }
}

/// Colors, font family, font size and line spacing have no FTML/Markdown
/// counterpart and are dropped; a background color becomes a highlight.
fn to_tdoc(document: &Document) -> tdoc::Document {
    let paragraphs = document
        .paragraphs
        .iter()
        .map(|paragraph| {
            let spans = paragraph
                .runs
                .iter()
                .filter(|run| !run.text.is_empty())
                .map(run_to_span)
                .collect();
            tdoc::Paragraph::new_text().with_content(spans)
        })
        .collect();
    tdoc::Document::new().with_paragraphs(paragraphs)
}

fn run_to_span(run: &Run) -> tdoc::Span {
    let mut styles = Vec::new();
    if run.format.background.is_some() {
        styles.push(InlineStyle::Highlight);
    }
    if run.format.bold {
        styles.push(InlineStyle::Bold);
    }
    if run.format.italic {
        styles.push(InlineStyle::Italic);
    }
    if run.format.underline {
        styles.push(InlineStyle::Underline);
    }

    // tdoc's writers only emit markup around child spans, never around a
    // styled span's own text.
    let mut span = tdoc::Span::new_text(run.text.as_str());
    while let Some(style) = styles.pop() {
        span = tdoc::Span::new_styled(style).with_children(vec![span]);
    }
    span
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Anchor, FormatChange};
    use std::io::Write;

    #[test]
    fn format_follows_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.TXT")), FileFormat::PlainText);
        assert_eq!(FileFormat::from_path(Path::new("a.md")), FileFormat::Markdown);
        assert_eq!(FileFormat::from_path(Path::new("a.ftml")), FileFormat::Ftml);
        assert_eq!(FileFormat::from_path(Path::new("noext")), FileFormat::Ftml);
        assert!(!FileFormat::PlainText.is_rich());
    }

    #[test]
    fn plain_text_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let document = Document::from_plain_text("first\nsecond");
        save(&document, &path, FileFormat::PlainText).unwrap();

        let (loaded, format) = load(&path).unwrap();
        assert_eq!(format, FileFormat::PlainText);
        assert_eq!(loaded.plain_text(), "first\nsecond");
    }

    #[test]
    fn ftml_keeps_emphasis() {
        let mut document = Document::from_plain_text("bold and italic");
        document.format_range(Anchor(0), Anchor(4), &crate::document::FormatChange::Bold(true));
        document.format_range(Anchor(9), Anchor(15), &crate::document::FormatChange::Italic(true));

        let ftml = write_string(&document, FileFormat::Ftml).unwrap();
        let loaded = parse_str(&ftml, FileFormat::Ftml).unwrap();

        let runs = &loaded.paragraphs[0].runs;
        assert!(runs.iter().any(|run| run.text == "bold" && run.format.bold));
        assert!(runs.iter().any(|run| run.text == "italic" && run.format.italic));
        assert!(runs.iter().all(|run| !(run.format.bold && run.format.italic)));
    }

    fn emphasized(text: &str, change: FormatChange) -> Document {
        let mut document = Document::from_plain_text(&format!("a {text} b"));
        let end = 2 + text.chars().count();
        document.format_range(Anchor(2), Anchor(end), &change);
        document
    }

    #[test]
    fn ftml_round_trips_each_emphasis() {
        let cases: [(FormatChange, fn(&CharFormat) -> bool); 4] = [
            (FormatChange::Bold(true), |f: &CharFormat| f.bold),
            (FormatChange::Italic(true), |f: &CharFormat| f.italic),
            (FormatChange::Underline(true), |f: &CharFormat| f.underline),
            (
                FormatChange::Background(Some(Color::YELLOW)),
                |f: &CharFormat| f.background.is_some(),
            ),
        ];
        for (change, is_set) in cases {
            let document = emphasized("styled", change.clone());
            let ftml = write_string(&document, FileFormat::Ftml).unwrap();
            let loaded = parse_str(&ftml, FileFormat::Ftml).unwrap();
            let runs = &loaded.paragraphs[0].runs;
            assert!(
                runs.iter().any(|run| run.text == "styled" && is_set(&run.format)),
                "{change:?} lost in {ftml}"
            );
            assert!(runs.iter().filter(|run| run.text != "styled").all(|run| !is_set(&run.format)));
            assert_eq!(loaded.plain_text(), "a styled b");
        }
    }

    #[test]
    fn nested_emphasis_survives_ftml() {
        let mut document = emphasized("both", FormatChange::Bold(true));
        document.format_range(Anchor(2), Anchor(6), &FormatChange::Italic(true));
        let ftml = write_string(&document, FileFormat::Ftml).unwrap();
        let loaded = parse_str(&ftml, FileFormat::Ftml).unwrap();
        assert!(
            loaded.paragraphs[0]
                .runs
                .iter()
                .any(|run| run.text == "both" && run.format.bold && run.format.italic)
        );
    }

    #[test]
    fn markdown_keeps_bold_and_italic() {
        let mut document = emphasized("loud", FormatChange::Bold(true));
        document.format_range(Anchor(7), Anchor(8), &FormatChange::Italic(true));
        let markdown = write_string(&document, FileFormat::Markdown).unwrap();
        let loaded = parse_str(&markdown, FileFormat::Markdown).unwrap();
        let runs = &loaded.paragraphs[0].runs;
        assert!(runs.iter().any(|run| run.text == "loud" && run.format.bold));
        assert!(runs.iter().any(|run| run.text == "b" && run.format.italic));
    }

    #[test]
    fn markdown_loads_lists_as_paragraphs() {
        let loaded = parse_str("- one\n- two\n", FileFormat::Markdown).unwrap();
        let texts: Vec<String> = loaded.paragraphs.iter().map(Paragraph::text).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.ftml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn plain_text_file_with_crlf() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "a\r\nb").unwrap();
        let (loaded, _) = load(file.path()).unwrap();
        assert_eq!(loaded.plain_text(), "a\nb");
    }
}
