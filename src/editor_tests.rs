use super::*;
use crate::document::{Color, Paragraph, Run};

fn plain_editor(text: &str) -> DocumentEditor {
    DocumentEditor::new(Document::from_plain_text(text), HighlightConfig::default())
}

fn blue_runs(editor: &DocumentEditor) -> Vec<String> {
    editor
        .document()
        .paragraphs
        .iter()
        .flat_map(|p| p.runs.iter())
        .filter(|run| run.format.foreground == Some(Color::BLUE))
        .map(|run| run.text.clone())
        .collect()
}

#[test]
fn new_editor_highlights_loaded_text() {
    let editor = plain_editor("int x");
    assert_eq!(blue_runs(&editor), vec!["int"]);
    assert_eq!(editor.caret(), Anchor::START);
}

#[test]
fn disabled_highlighter_leaves_formatting_alone() {
    let config = HighlightConfig {
        enabled: false,
        ..HighlightConfig::default()
    };
    let editor = DocumentEditor::new(Document::from_plain_text("int x"), config);
    assert!(blue_runs(&editor).is_empty());
}

#[test]
fn typing_a_keyword_highlights_it() {
    let mut editor = plain_editor("");
    for ch in "if x".chars() {
        editor.insert_char(ch);
    }
    assert_eq!(editor.document().plain_text(), "if x");
    assert_eq!(blue_runs(&editor), vec!["if"]);
}

#[test]
fn typing_a_repeated_keyword_highlights_only_the_first() {
    let mut editor = plain_editor("");
    for ch in "while x while".chars() {
        editor.insert_char(ch);
    }
    assert_eq!(editor.document().plain_text(), "while x while");
    assert_eq!(blue_runs(&editor), vec!["while"]);
}

#[test]
fn typing_without_highlighting_keeps_a_single_run() {
    let config = HighlightConfig {
        enabled: false,
        ..HighlightConfig::default()
    };
    let mut editor = DocumentEditor::new(Document::new(), config);
    for ch in "while".chars() {
        editor.insert_char(ch);
    }
    assert_eq!(editor.document().paragraphs[0].runs.len(), 1);
}

#[test]
fn selection_is_ordered_and_non_empty() {
    let mut editor = plain_editor("hello");
    assert!(editor.move_to(Anchor(4), false));
    assert!(editor.move_to(Anchor(1), true));
    assert_eq!(editor.selection(), Some((Anchor(1), Anchor(4))));
    assert_eq!(editor.selected_text().as_deref(), Some("ell"));

    editor.move_to(Anchor(4), true);
    assert_eq!(editor.selection(), None);
}

#[test]
fn set_selection_places_caret_at_end() {
    let mut editor = plain_editor("find me");
    let span = editor.document().span(Anchor(5), Anchor(7));
    editor.set_selection(&span);
    assert_eq!(editor.caret(), Anchor(7));
    assert_eq!(editor.selected_text().as_deref(), Some("me"));
}

#[test]
fn select_all_covers_every_paragraph() {
    let mut editor = plain_editor("a\nb");
    editor.select_all();
    assert_eq!(editor.selected_text().as_deref(), Some("a\nb"));
}

#[test]
fn replace_all_text_is_undoable_and_rehighlights() {
    let mut editor = plain_editor("x");
    editor.replace_all_text("while");
    assert_eq!(blue_runs(&editor), vec!["while"]);
    assert!(editor.undo());
    assert_eq!(editor.document().plain_text(), "x");
    assert!(editor.redo());
    assert_eq!(editor.document().plain_text(), "while");
}

#[test]
fn caret_is_clamped_after_shrinking_edit() {
    let mut editor = plain_editor("long text");
    editor.move_document_end(false);
    editor.edit(|document| document.set_text("ab"));
    assert_eq!(editor.caret(), Anchor(2));
}

#[test]
fn replace_document_resets_state() {
    let mut editor = plain_editor("old");
    editor.insert_char('x');
    editor.replace_document(Document::new().with_paragraphs(vec![
        Paragraph::new().with_runs(vec![Run::new("void")]),
    ]));
    assert!(!editor.can_undo());
    assert_eq!(editor.caret(), Anchor::START);
    assert_eq!(blue_runs(&editor), vec!["void"]);
}

#[test]
fn current_format_reads_selection_start() {
    let mut editor = plain_editor("ab");
    editor.move_to(Anchor(2), false);
    editor.move_to(Anchor(0), true);
    assert!(editor.toggle_emphasis(crate::document::Emphasis::Bold));
    assert!(editor.current_format().bold);
}
