use super::*;

fn bold() -> CharFormat {
    CharFormat {
        bold: true,
        ..CharFormat::default()
    }
}

fn run_texts(paragraph: &Paragraph) -> Vec<&str> {
    paragraph.runs.iter().map(|run| run.text.as_str()).collect()
}

#[test]
fn format_range_splits_single_run() {
    let mut document = Document::from_plain_text("hello world");
    assert!(document.format_range(Anchor(0), Anchor(5), &FormatChange::Bold(true)));

    let runs = &document.paragraphs[0].runs;
    assert_eq!(run_texts(&document.paragraphs[0]), vec!["hello", " world"]);
    assert!(runs[0].format.bold);
    assert!(!runs[1].format.bold);
}

#[test]
fn format_range_across_runs_and_paragraphs() {
    let mut document = Document::new().with_paragraphs(vec![
        Paragraph::new().with_runs(vec![Run::new("hello "), Run::new("world")]),
        Paragraph::new().with_text("again"),
    ]);
    let change = FormatChange::Underline(true);
    assert!(document.format_range(Anchor(3), Anchor(14), &change));

    assert_eq!(
        run_texts(&document.paragraphs[0]),
        vec!["hel", "lo ", "world"]
    );
    assert_eq!(run_texts(&document.paragraphs[1]), vec!["ag", "ain"]);
    assert!(!document.paragraphs[0].runs[0].format.underline);
    assert!(document.paragraphs[0].runs[1].format.underline);
    assert!(document.paragraphs[0].runs[2].format.underline);
    assert!(document.paragraphs[1].runs[0].format.underline);
    assert!(!document.paragraphs[1].runs[1].format.underline);
    assert_eq!(document.plain_text(), "hello world\nagain");
}

#[test]
fn format_range_reports_no_change_when_already_set() {
    let mut document = Document::new()
        .with_paragraphs(vec![Paragraph::new().with_runs(vec![Run::new("x").with_format(bold())])]);
    assert!(!document.format_range(Anchor(0), Anchor(1), &FormatChange::Bold(true)));
    assert!(!document.format_range(Anchor(1), Anchor(1), &FormatChange::Bold(false)));
}

#[test]
fn clear_formatting_merges_runs() {
    let mut document = Document::new().with_paragraphs(vec![Paragraph::new().with_runs(vec![
        Run::new("cla").with_format(bold()),
        Run::new("ss"),
    ])]);
    assert_eq!(document.clear_formatting(), 1);
    assert_eq!(run_texts(&document.paragraphs[0]), vec!["class"]);
    assert!(document.paragraphs[0].runs[0].format.is_plain());
}

#[test]
fn merge_runs_joins_equal_neighbours_only() {
    let mut document = Document::new().with_paragraphs(vec![Paragraph::new().with_runs(vec![
        Run::new("a"),
        Run::new(""),
        Run::new("b"),
        Run::new("c").with_format(bold()),
        Run::new("d").with_format(bold()),
        Run::new("e"),
    ])]);
    document.merge_runs();
    assert_eq!(run_texts(&document.paragraphs[0]), vec!["ab", "cd", "e"]);
    assert!(document.paragraphs[0].runs[1].format.bold);
}

#[test]
fn typing_char_by_char_extends_one_run() {
    let mut document = Document::new();
    let mut caret = Anchor::START;
    for ch in ["w", "h", "i", "l", "e"] {
        caret = document.insert_text(caret, ch);
    }
    assert_eq!(run_texts(&document.paragraphs[0]), vec!["while"]);
}

#[test]
fn insert_text_inherits_preceding_format() {
    let mut document = Document::new().with_paragraphs(vec![Paragraph::new().with_runs(vec![
        Run::new("bold").with_format(bold()),
        Run::new(" plain"),
    ])]);
    let end = document.insert_text(Anchor(4), "er");
    assert_eq!(end, Anchor(6));
    assert_eq!(document.plain_text(), "bolder plain");
    assert!(document.formats_in(Anchor(4), Anchor(6)).iter().all(|f| f.bold));
}

#[test]
fn insert_text_with_newlines_splits_paragraph() {
    let mut document = Document::from_plain_text("headtail");
    document.paragraphs[0].line_spacing = 2.0;
    let end = document.insert_text(Anchor(4), "\nmiddle\n");
    assert_eq!(document.plain_text(), "head\nmiddle\ntail");
    assert_eq!(document.paragraphs.len(), 3);
    assert_eq!(end, Anchor(12));
    assert!(document.paragraphs.iter().all(|p| p.line_spacing == 2.0));
}

#[test]
fn insert_into_empty_document() {
    let mut document = Document::new();
    let end = document.insert_text(Anchor(0), "a");
    assert_eq!(end, Anchor(1));
    assert_eq!(document.plain_text(), "a");
}

#[test]
fn delete_within_paragraph() {
    let mut document = Document::from_plain_text("hello world");
    assert_eq!(document.delete(Anchor(5), Anchor(11)), Anchor(5));
    assert_eq!(document.plain_text(), "hello");
    assert_eq!(document.paragraphs[0].runs.len(), 1);
}

#[test]
fn delete_joins_paragraphs() {
    let mut document = Document::from_plain_text("one\ntwo\nthree");
    document.delete(Anchor(2), Anchor(9));
    assert_eq!(document.plain_text(), "onhree");
    assert_eq!(document.paragraphs.len(), 1);
}

#[test]
fn delete_paragraph_break_only() {
    let mut document = Document::from_plain_text("one\ntwo");
    document.delete(Anchor(3), Anchor(4));
    assert_eq!(document.plain_text(), "onetwo");
    assert_eq!(run_texts(&document.paragraphs[0]), vec!["onetwo"]);
}

#[test]
fn replace_takes_format_of_replaced_text() {
    let mut document = Document::new().with_paragraphs(vec![Paragraph::new().with_runs(vec![
        Run::new("say "),
        Run::new("foo").with_format(bold()),
        Run::new("!"),
    ])]);
    let span = document.span(Anchor(4), Anchor(7));
    let end = document.replace(&span, "quux");
    assert_eq!(end, Anchor(8));
    assert_eq!(document.plain_text(), "say quux!");
    assert_eq!(run_texts(&document.paragraphs[0]), vec!["say ", "quux", "!"]);
    assert!(document.paragraphs[0].runs[1].format.bold);
}

#[test]
fn replace_with_empty_text_deletes() {
    let mut document = Document::from_plain_text("abc");
    let span = document.span(Anchor(1), Anchor(2));
    assert_eq!(document.replace(&span, ""), Anchor(1));
    assert_eq!(document.plain_text(), "ac");
}

#[test]
fn set_text_discards_run_boundaries() {
    let mut document = Document::new().with_paragraphs(vec![
        Paragraph::new().with_runs(vec![Run::new("a").with_format(bold()), Run::new("b")]),
        Paragraph::new().with_text("c"),
    ]);
    document.paragraphs[0].line_spacing = 1.5;
    document.set_text("ab\nc\n");

    assert_eq!(document.paragraphs.len(), 3);
    assert_eq!(run_texts(&document.paragraphs[0]), vec!["ab"]);
    assert!(document.paragraphs[0].runs[0].format.bold);
    assert!(document.paragraphs[1].runs[0].format.bold);
    assert!(document.paragraphs[2].runs.is_empty());
    assert!(document.paragraphs.iter().all(|p| p.line_spacing == 1.5));
}

#[test]
fn set_line_spacing_touches_inclusive_range() {
    let mut document = Document::from_plain_text("a\nb\nc");
    assert_eq!(document.set_line_spacing(1..=2, 2.0), 2);
    assert_eq!(document.paragraphs[0].line_spacing, 1.0);
    assert_eq!(document.paragraphs[2].line_spacing, 2.0);
    assert_eq!(document.set_line_spacing(1..=2, 2.0), 0);
}
