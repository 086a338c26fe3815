use super::*;
use crate::document::{Color, Emphasis};

fn editor(text: &str, highlight_enabled: bool) -> DocumentEditor {
    let config = HighlightConfig {
        enabled: highlight_enabled,
        ..HighlightConfig::default()
    };
    DocumentEditor::new(Document::from_plain_text(text), config)
}

fn select(editor: &mut DocumentEditor, start: usize, end: usize) {
    editor.move_to(Anchor(start), false);
    editor.move_to(Anchor(end), true);
}

#[test]
fn toggle_bold_sets_then_clears() {
    let mut editor = editor("hello world", false);
    select(&mut editor, 0, 5);
    assert!(editor.toggle_emphasis(Emphasis::Bold));
    let runs = &editor.document().paragraphs[0].runs;
    assert_eq!(runs[0].text, "hello");
    assert!(runs[0].format.bold);
    assert!(!runs[1].format.bold);

    assert!(editor.toggle_emphasis(Emphasis::Bold));
    assert!(editor.document().paragraphs[0].runs.iter().all(|run| !run.format.bold));
}

#[test]
fn toggle_on_mixed_selection_sets_everywhere() {
    let mut editor = editor("hello world", false);
    select(&mut editor, 0, 5);
    editor.toggle_emphasis(Emphasis::Italic);
    select(&mut editor, 0, 11);
    assert!(editor.toggle_emphasis(Emphasis::Italic));
    assert!(editor.document().paragraphs[0].runs.iter().all(|run| run.format.italic));
}

#[test]
fn formatting_without_selection_is_noop() {
    let mut editor = editor("text", false);
    assert!(!editor.toggle_emphasis(Emphasis::Underline));
    assert!(!editor.set_foreground(Some(Color::RED)));
    assert!(!editor.can_undo());
}

#[test]
fn colors_fonts_and_sizes_apply_to_selection() {
    let mut editor = editor("abc", false);
    select(&mut editor, 1, 2);
    assert!(editor.set_foreground(Some(Color::RED)));
    assert!(editor.set_background(Some(Color::YELLOW)));
    assert!(editor.set_font_family("Consolas"));
    assert!(editor.set_font_size(20));
    assert!(!editor.set_font_size(20));

    let run = &editor.document().paragraphs[0].runs[1];
    assert_eq!(run.text, "b");
    assert_eq!(run.format.foreground, Some(Color::RED));
    assert_eq!(run.format.background, Some(Color::YELLOW));
    assert_eq!(run.format.font_family.as_deref(), Some("Consolas"));
    assert_eq!(run.format.font_size, Some(20));
}

#[test]
fn next_edit_wipes_manual_formatting() {
    let mut editor = editor("hello", true);
    select(&mut editor, 0, 5);
    assert!(editor.toggle_emphasis(Emphasis::Bold));
    editor.move_document_end(false);
    editor.insert_char('!');
    assert!(editor.document().paragraphs[0].runs.iter().all(|run| !run.format.bold));
}

#[test]
fn line_spacing_covers_selected_paragraphs() {
    let mut editor = editor("a\nb\nc", false);
    select(&mut editor, 0, 2);
    assert!(editor.set_line_spacing(2.0));
    let spacings: Vec<f32> = editor
        .document()
        .paragraphs
        .iter()
        .map(|p| p.line_spacing)
        .collect();
    assert_eq!(spacings, vec![2.0, 2.0, 1.0]);
    assert!(!editor.set_line_spacing(2.0));
}

#[test]
fn line_spacing_without_selection_uses_caret_paragraph() {
    let mut editor = editor("a\nb", false);
    editor.move_document_end(false);
    assert!(editor.set_line_spacing(1.5));
    assert_eq!(editor.current_line_spacing(), 1.5);
    assert_eq!(editor.document().paragraphs[0].line_spacing, 1.0);
}

#[test]
fn formatting_is_undoable() {
    let mut editor = editor("abc", false);
    select(&mut editor, 0, 3);
    editor.toggle_emphasis(Emphasis::Bold);
    assert!(editor.undo());
    assert!(editor.document().paragraphs[0].runs.iter().all(|run| !run.format.bold));
}
