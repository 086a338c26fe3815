use crate::document::{Anchor, Document};

const HISTORY_LIMIT: usize = 200;

#[derive(Clone, Debug)]
pub(super) struct Snapshot {
    pub document: Document,
    pub caret: Anchor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum EditKind {
    Typing,
    Other,
}

/// Whole-document snapshots. Consecutive typing collapses into one step until
/// something else (a motion, a different edit) breaks the group.
#[derive(Debug, Default)]
pub(super) struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    open_group: Option<EditKind>,
}

impl History {
    pub fn record(&mut self, before: Snapshot, kind: EditKind) {
        self.redo.clear();
        if kind == EditKind::Typing && self.open_group == Some(EditKind::Typing) {
            return;
        }
        self.undo.push(before);
        if self.undo.len() > HISTORY_LIMIT {
            self.undo.remove(0);
        }
        self.open_group = Some(kind);
    }

    pub fn break_group(&mut self) {
        self.open_group = None;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        self.open_group = None;
        Some(previous)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        self.open_group = None;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(text: &str) -> Snapshot {
        Snapshot {
            document: Document::from_plain_text(text),
            caret: Anchor(text.len()),
        }
    }

    #[test]
    fn typing_coalesces_until_group_breaks() {
        let mut history = History::default();
        history.record(snapshot(""), EditKind::Typing);
        history.record(snapshot("a"), EditKind::Typing);
        history.break_group();
        history.record(snapshot("ab"), EditKind::Typing);
        assert_eq!(history.undo.len(), 2);
    }

    #[test]
    fn undo_then_redo_swaps_stacks() {
        let mut history = History::default();
        history.record(snapshot("a"), EditKind::Other);
        let restored = history.undo(snapshot("ab")).unwrap();
        assert_eq!(restored.document.plain_text(), "a");
        assert!(history.can_redo());
        let again = history.redo(snapshot("a")).unwrap();
        assert_eq!(again.document.plain_text(), "ab");
        assert!(!history.can_redo());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut history = History::default();
        history.record(snapshot("a"), EditKind::Other);
        history.undo(snapshot("ab"));
        history.record(snapshot("a"), EditKind::Other);
        assert!(!history.can_redo());
    }

    #[test]
    fn history_is_bounded() {
        let mut history = History::default();
        for i in 0..HISTORY_LIMIT + 10 {
            history.record(snapshot(&i.to_string()), EditKind::Other);
        }
        assert_eq!(history.undo.len(), HISTORY_LIMIT);
        assert_eq!(history.undo[0].document.plain_text(), "10");
    }
}
