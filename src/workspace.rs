use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::document::Document;
use crate::editor::DocumentEditor;
use crate::file::{self, FileFormat};
use crate::find::{FindOutcome, FindSession};
use crate::highlight::HighlightConfig;

/// Stable identity of a tab. Indexes shift when tabs close, ids don't.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TabId(pub usize);

#[derive(Debug)]
pub struct Tab {
    id: TabId,
    pub title: String,
    pub path: Option<PathBuf>,
    pub format: FileFormat,
    pub editor: DocumentEditor,
    pub dirty: bool,
}

impl Tab {
    pub fn id(&self) -> TabId {
        self.id
    }

    /// Title with a trailing `*` while there are unsaved changes.
    pub fn label(&self) -> String {
        if self.dirty {
            format!("{}*", self.title)
        } else {
            self.title.clone()
        }
    }
}

/// Open tabs plus the one find dialog that may be searching in one of them.
#[derive(Debug)]
pub struct Workspace {
    tabs: Vec<Tab>,
    active: usize,
    find_session: Option<FindSession>,
    highlight: HighlightConfig,
    next_id: usize,
    untitled_count: usize,
}

impl Workspace {
    /// A workspace always holds at least one tab.
    pub fn new(highlight: HighlightConfig) -> Self {
        let mut workspace = Self {
            tabs: Vec::new(),
            active: 0,
            find_session: None,
            highlight,
            next_id: 1,
            untitled_count: 0,
        };
        workspace.new_tab();
        workspace
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Tab {
        &self.tabs[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.active]
    }

    pub fn editor(&self) -> &DocumentEditor {
        &self.active().editor
    }

    pub fn editor_mut(&mut self) -> &mut DocumentEditor {
        &mut self.active_mut().editor
    }

    pub fn new_tab(&mut self) -> TabId {
        self.untitled_count += 1;
        let id = TabId(self.next_id);
        self.next_id += 1;
        self.tabs.push(Tab {
            id,
            title: format!("Document {}", self.untitled_count),
            path: None,
            format: FileFormat::Ftml,
            editor: DocumentEditor::new(Document::new(), self.highlight.clone()),
            dirty: false,
        });
        self.select_tab(self.tabs.len() - 1);
        id
    }

    /// Loads `path` into the current tab, replacing its document.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let (document, format) = file::load(path)?;
        let tab = self.active_mut();
        tab.editor.replace_document(document);
        tab.title = file_title(path);
        tab.path = Some(path.to_path_buf());
        tab.format = format;
        tab.dirty = false;
        self.drop_find_session();
        Ok(())
    }

    /// Like [`Workspace::open`], but a missing file only names the current
    /// tab so the first save creates it. Returns whether a file was loaded.
    pub fn open_or_create(&mut self, path: &Path) -> Result<bool> {
        if path.exists() {
            self.open(path)?;
            return Ok(true);
        }
        let tab = self.active_mut();
        tab.title = file_title(path);
        tab.path = Some(path.to_path_buf());
        tab.format = FileFormat::from_path(path);
        Ok(false)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.tabs.iter().any(|tab| tab.dirty)
    }

    /// Saves the current tab to its path, in the format that path implies.
    pub fn save(&mut self) -> Result<PathBuf> {
        let Some(path) = self.active().path.clone() else {
            bail!("no file name; use Save as");
        };
        self.save_as(&path)?;
        Ok(path)
    }

    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        let format = FileFormat::from_path(path);
        let tab = self.active_mut();
        file::save(tab.editor.document(), path, format)
            .with_context(|| format!("failed to save {}", path.display()))?;
        tab.path = Some(path.to_path_buf());
        tab.format = format;
        tab.title = file_title(path);
        tab.dirty = false;
        Ok(())
    }

    /// Closes the current tab. Closing the last tab leaves a fresh empty one.
    pub fn close_tab(&mut self) {
        self.drop_find_session();
        self.tabs.remove(self.active);
        if self.tabs.is_empty() {
            self.new_tab();
            return;
        }
        if self.active >= self.tabs.len() {
            self.active = self.tabs.len() - 1;
        }
    }

    pub fn select_tab(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        if index != self.active {
            self.drop_find_session();
        }
        self.active = index;
        true
    }

    pub fn next_tab(&mut self) {
        let next = (self.active + 1) % self.tabs.len();
        self.select_tab(next);
    }

    pub fn previous_tab(&mut self) {
        let previous = (self.active + self.tabs.len() - 1) % self.tabs.len();
        self.select_tab(previous);
    }

    pub fn mark_dirty(&mut self) {
        self.active_mut().dirty = true;
    }

    pub fn set_highlight_config(&mut self, config: HighlightConfig) {
        for tab in &mut self.tabs {
            tab.editor.set_highlight_config(config.clone());
        }
        self.highlight = config;
    }

    pub fn find_session(&self) -> Option<&FindSession> {
        self.find_session.as_ref()
    }

    /// Opens (or keeps) the find session bound to the current tab.
    pub fn find_session_mut(&mut self) -> &mut FindSession {
        let target = self.active().id();
        if !matches!(&self.find_session, Some(session) if session.target() == target) {
            self.find_session = Some(FindSession::new(target));
        }
        self.find_session
            .get_or_insert_with(|| FindSession::new(target))
    }

    pub fn drop_find_session(&mut self) {
        if self.find_session.take().is_some() {
            debug!("find session dropped");
        }
    }

    /// Find next in the current tab; a hit becomes the editor selection.
    pub fn find_next(&mut self) -> FindOutcome {
        self.find_session_mut();
        let Some(session) = self.find_session.as_mut() else {
            return FindOutcome::NotFound;
        };
        let tab = &mut self.tabs[self.active];
        let outcome = session.find_next(tab.editor.document());
        if let FindOutcome::Found(span) = &outcome {
            tab.editor.set_selection(span);
        }
        outcome
    }

    /// Replaces the current selection, then selects the following match.
    pub fn replace(&mut self) -> FindOutcome {
        if self.editor().selection().is_none() {
            return self.find_next();
        }
        self.find_session_mut();
        let Some(session) = self.find_session.as_mut() else {
            return FindOutcome::NotFound;
        };
        let tab = &mut self.tabs[self.active];
        let selection = tab.editor.selection_span();
        let mut replaced = false;
        // The highlight pass after the edit splits runs, so the hit is carried
        // out of the edit as anchors and resolved again afterwards.
        let (outcome, hit) = tab.editor.edit(|document| {
            let before = document.plain_text();
            let outcome = session.replace(document, selection.as_ref());
            replaced = document.plain_text() != before;
            let hit = match &outcome {
                FindOutcome::Found(span) => {
                    Some((document.anchor_of(&span.start), document.anchor_of(&span.end)))
                }
                _ => None,
            };
            (outcome, hit)
        });
        if replaced {
            tab.dirty = true;
        }
        match hit {
            Some((start, end)) => {
                let span = tab.editor.document().span(start, end);
                tab.editor.set_selection(&span);
                FindOutcome::Found(span)
            }
            None => {
                tab.editor.clear_selection();
                outcome
            }
        }
    }

    pub fn replace_all(&mut self) -> usize {
        self.find_session_mut();
        let Some(session) = self.find_session.as_mut() else {
            return 0;
        };
        if session.needle.is_empty() {
            return 0;
        }
        let tab = &mut self.tabs[self.active];
        let count = tab.editor.edit(|document| session.replace_all(document));
        if count > 0 {
            tab.dirty = true;
        }
        tab.editor.clear_selection();
        count
    }
}

fn file_title(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
