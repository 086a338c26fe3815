use super::*;

fn editor(text: &str) -> DocumentEditor {
    let config = HighlightConfig {
        enabled: false,
        ..HighlightConfig::default()
    };
    DocumentEditor::new(Document::from_plain_text(text), config)
}

#[test]
fn left_and_right_cross_paragraph_breaks() {
    let mut editor = editor("ab\ncd");
    editor.move_to(Anchor(2), false);
    assert!(editor.move_right(false));
    assert_eq!(editor.caret_location(), (1, 0));
    assert!(editor.move_left(false));
    assert_eq!(editor.caret_location(), (0, 2));
}

#[test]
fn motion_stops_at_document_edges() {
    let mut editor = editor("ab");
    assert!(!editor.move_left(false));
    editor.move_document_end(false);
    assert!(!editor.move_right(false));
    assert_eq!(editor.caret(), Anchor(2));
}

#[test]
fn vertical_motion_keeps_preferred_column() {
    let mut editor = editor("abcdef\nab\nabcdef");
    editor.move_to(Anchor(5), false);
    assert!(editor.move_down(false));
    assert_eq!(editor.caret_location(), (1, 2));
    assert!(editor.move_down(false));
    assert_eq!(editor.caret_location(), (2, 5));
    assert!(editor.move_up(false));
    assert!(editor.move_up(false));
    assert_eq!(editor.caret_location(), (0, 5));
}

#[test]
fn up_on_first_paragraph_goes_to_start() {
    let mut editor = editor("abc\ndef");
    editor.move_to(Anchor(2), false);
    assert!(editor.move_up(false));
    assert_eq!(editor.caret(), Anchor::START);
    editor.move_to(Anchor(5), false);
    assert!(editor.move_down(false));
    assert_eq!(editor.caret(), Anchor(7));
}

#[test]
fn home_and_end_stay_in_paragraph() {
    let mut editor = editor("one\ntwo three");
    editor.move_to(Anchor(6), false);
    editor.move_line_start(false);
    assert_eq!(editor.caret(), Anchor(4));
    editor.move_line_end(false);
    assert_eq!(editor.caret(), Anchor(13));
}

#[test]
fn word_motion_within_paragraph() {
    let mut editor = editor("foo bar baz");
    assert!(editor.move_word_right(false));
    assert_eq!(editor.caret(), Anchor(4));
    editor.move_line_end(false);
    assert!(editor.move_word_left(false));
    assert_eq!(editor.caret(), Anchor(8));
}

#[test]
fn shift_motion_extends_selection() {
    let mut editor = editor("hello world");
    editor.move_word_right(true);
    assert_eq!(editor.selected_text().as_deref(), Some("hello "));
    editor.move_right(false);
    assert_eq!(editor.selection(), None);
}
