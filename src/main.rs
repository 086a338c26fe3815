use std::{
    env,
    fs::File,
    io,
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;

use jtype::config::Config;
use jtype::document::{Color, Emphasis, font_sizes};
use jtype::find::FindOutcome;
use jtype::render::{RenderResult, render_document, term_color};
use jtype::theme::Theme;
use jtype::workspace::Workspace;

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const LOG_FILE_ENV: &str = "JTYPE_LOG";
const NOT_FOUND_MESSAGE: &str = "Text not found";

fn main() -> Result<()> {
    init_logging()?;
    run()
}

/// The terminal belongs to the UI, so events only go to a file, and only
/// when `JTYPE_LOG` names one. `RUST_LOG` picks the filter.
fn init_logging() -> Result<()> {
    let Some(path) = env::var_os(LOG_FILE_ENV) else {
        return Ok(());
    };
    let path = PathBuf::from(path);
    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn editor_wrap_configuration(width: usize) -> (usize, usize) {
    if width == 0 {
        return (1, 0);
    }
    if width < 60 {
        let wrap_width = width.saturating_sub(1).max(1);
        return (wrap_width, 0);
    }
    if width < 100 {
        let padding = 2.min(width / 2);
        let wrap_width = width.saturating_sub(padding.saturating_mul(2)).max(1);
        return (wrap_width, padding);
    }
    let mut left_padding = width.saturating_sub(100) / 2 + 4;
    let max_padding = width.saturating_sub(1) / 2;
    if left_padding > max_padding {
        left_padding = max_padding;
    }
    let wrap_width = width.saturating_sub(left_padding.saturating_mul(2)).max(1);
    (wrap_width, left_padding)
}

fn run() -> Result<()> {
    let config = Config::load();
    info!(version = env!("CARGO_PKG_VERSION"), "jtype starting");

    let mut app = App::new(config);
    let paths: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    for (idx, path) in paths.iter().enumerate() {
        if idx > 0 {
            app.workspace.new_tab();
        }
        match app.workspace.open_or_create(path) {
            Ok(true) => {}
            Ok(false) => app.set_status("New document"),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to open file");
                app.message_box = Some(format!("{err:#}"));
            }
        }
    }
    if paths.len() > 1 {
        app.workspace.select_tab(0);
    }

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to initialize terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    if let Err(err) = &res {
        error!(error = %err, "jtype exited with an error");
    }
    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    while !app.should_quit() {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt);
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Submenu {
    TextColor,
    HighlightColor,
    FontFamily,
    FontSize,
    LineSpacing,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum MenuAction {
    NewTab,
    Open,
    Save,
    SaveAs,
    CloseTab,
    NextTab,
    Emphasis(Emphasis),
    Foreground(Option<Color>),
    Background(Option<Color>),
    FontFamily(usize),
    FontSize(u16),
    LineSpacing(f32),
    Find,
    Undo,
    Redo,
    ToggleHighlight,
    Quit,
    Submenu(Submenu),
}

#[derive(Clone, Copy)]
struct MenuShortcut {
    key: char,
}

impl MenuShortcut {
    const fn new(key: char) -> Self {
        Self { key }
    }

    fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char(ch) => {
                ch == self.key
                    && !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
            }
            _ => false,
        }
    }
}

#[derive(Clone)]
struct MenuItem {
    label: String,
    action: Option<MenuAction>,
    shortcut: Option<MenuShortcut>,
    swatch: Option<Color>,
    checked: bool,
}

impl MenuItem {
    fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            action: Some(action),
            shortcut: None,
            swatch: None,
            checked: false,
        }
    }

    fn with_shortcut(mut self, key: char) -> Self {
        self.shortcut = Some(MenuShortcut::new(key));
        self
    }

    fn with_swatch(mut self, color: Option<Color>) -> Self {
        self.swatch = color;
        self
    }

    fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    fn enabled_if(mut self, enabled: bool) -> Self {
        if !enabled {
            self.action = None;
        }
        self
    }

    fn is_enabled(&self) -> bool {
        self.action.is_some()
    }
}

enum MenuEntry {
    Section(&'static str),
    Separator,
    Item(MenuItem),
}

struct ContextMenuState {
    title: &'static str,
    entries: Vec<MenuEntry>,
    selected_index: usize,
}

impl ContextMenuState {
    fn new(title: &'static str, entries: Vec<MenuEntry>) -> Self {
        let selected_index = entries
            .iter()
            .enumerate()
            .find(|(_, entry)| matches!(entry, MenuEntry::Item(item) if item.is_enabled()))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        Self {
            title,
            entries,
            selected_index,
        }
    }

    fn move_selection(&mut self, delta: i32) {
        if self.entries.is_empty() {
            return;
        }

        let len = self.entries.len() as i32;
        let mut idx = self.selected_index as i32;

        for _ in 0..len {
            idx = (idx + delta).rem_euclid(len);
            if matches!(self.entries[idx as usize], MenuEntry::Item(_)) {
                self.selected_index = idx as usize;
                break;
            }
        }
    }

    fn current_action(&self) -> Option<MenuAction> {
        match self.entries.get(self.selected_index) {
            Some(MenuEntry::Item(item)) => item.action,
            _ => None,
        }
    }

    fn shortcut_action(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> (bool, Option<MenuAction>) {
        for (idx, entry) in self.entries.iter().enumerate() {
            if let MenuEntry::Item(item) = entry
                && let Some(shortcut) = item.shortcut
                && shortcut.matches(code, modifiers)
            {
                self.selected_index = idx;
                return (true, item.action);
            }
        }
        (false, None)
    }
}

fn main_menu_entries(
    has_selection: bool,
    highlight_enabled: bool,
    can_undo: bool,
    can_redo: bool,
) -> Vec<MenuEntry> {
    vec![
        MenuEntry::Section("File"),
        MenuEntry::Item(MenuItem::new("New tab", MenuAction::NewTab).with_shortcut('n')),
        MenuEntry::Item(MenuItem::new("Open…", MenuAction::Open).with_shortcut('o')),
        MenuEntry::Item(MenuItem::new("Save", MenuAction::Save).with_shortcut('s')),
        MenuEntry::Item(MenuItem::new("Save as…", MenuAction::SaveAs).with_shortcut('a')),
        MenuEntry::Item(MenuItem::new("Next tab", MenuAction::NextTab).with_shortcut('t')),
        MenuEntry::Item(MenuItem::new("Close tab", MenuAction::CloseTab).with_shortcut('w')),
        MenuEntry::Separator,
        MenuEntry::Section("Format"),
        MenuEntry::Item(
            MenuItem::new("Bold", MenuAction::Emphasis(Emphasis::Bold))
                .with_shortcut('b')
                .enabled_if(has_selection),
        ),
        MenuEntry::Item(
            MenuItem::new("Italic", MenuAction::Emphasis(Emphasis::Italic))
                .with_shortcut('i')
                .enabled_if(has_selection),
        ),
        MenuEntry::Item(
            MenuItem::new("Underline", MenuAction::Emphasis(Emphasis::Underline))
                .with_shortcut('u')
                .enabled_if(has_selection),
        ),
        MenuEntry::Item(
            MenuItem::new("Text color…", MenuAction::Submenu(Submenu::TextColor))
                .with_shortcut('c')
                .enabled_if(has_selection),
        ),
        MenuEntry::Item(
            MenuItem::new("Highlight color…", MenuAction::Submenu(Submenu::HighlightColor))
                .with_shortcut('h')
                .enabled_if(has_selection),
        ),
        MenuEntry::Item(
            MenuItem::new("Font…", MenuAction::Submenu(Submenu::FontFamily))
                .with_shortcut('f')
                .enabled_if(has_selection),
        ),
        MenuEntry::Item(
            MenuItem::new("Font size…", MenuAction::Submenu(Submenu::FontSize))
                .with_shortcut('z')
                .enabled_if(has_selection),
        ),
        MenuEntry::Item(
            MenuItem::new("Line spacing…", MenuAction::Submenu(Submenu::LineSpacing))
                .with_shortcut('l'),
        ),
        MenuEntry::Separator,
        MenuEntry::Section("Edit"),
        MenuEntry::Item(MenuItem::new("Find / Replace", MenuAction::Find).with_shortcut('/')),
        MenuEntry::Item(
            MenuItem::new("Undo", MenuAction::Undo)
                .with_shortcut('<')
                .enabled_if(can_undo),
        ),
        MenuEntry::Item(
            MenuItem::new("Redo", MenuAction::Redo)
                .with_shortcut('>')
                .enabled_if(can_redo),
        ),
        MenuEntry::Item(
            MenuItem::new("Keyword highlighting", MenuAction::ToggleHighlight)
                .with_shortcut('k')
                .checked(highlight_enabled),
        ),
        MenuEntry::Separator,
        MenuEntry::Item(MenuItem::new("Quit", MenuAction::Quit).with_shortcut('q')),
    ]
}

fn color_entries(
    current: Option<Color>,
    action: fn(Option<Color>) -> MenuAction,
) -> Vec<MenuEntry> {
    let mut entries = vec![MenuEntry::Item(
        MenuItem::new("Default", action(None)).checked(current.is_none()),
    )];
    for (name, color) in Color::PALETTE {
        entries.push(MenuEntry::Item(
            MenuItem::new(name, action(Some(color)))
                .with_swatch(Some(color))
                .checked(current == Some(color)),
        ));
    }
    entries
}

fn is_context_menu_shortcut(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('k') => modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::F(2) => true,
        _ => false,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PromptKind {
    Open,
    SaveAs,
}

impl PromptKind {
    fn title(&self) -> &'static str {
        match self {
            PromptKind::Open => "Open file",
            PromptKind::SaveAs => "Save as",
        }
    }
}

struct PathPrompt {
    kind: PromptKind,
    input: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FindField {
    Needle,
    Replacement,
}

/// Modeless find/replace panel. Keys it doesn't use reach the document.
struct FindDialog {
    field: FindField,
}

struct App {
    workspace: Workspace,
    config: Config,
    theme: Theme,
    scroll_top: usize,
    should_quit: bool,
    status_message: Option<(String, Instant)>,
    context_menu: Option<ContextMenuState>,
    prompt: Option<PathPrompt>,
    find_dialog: Option<FindDialog>,
    message_box: Option<String>,
    pending_discard: bool,
    last_view_height: usize,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            workspace: Workspace::new(config.highlight.clone()),
            config,
            theme: Theme::default(),
            scroll_top: 0,
            should_quit: false,
            status_message: None,
            context_menu: None,
            prompt: None,
            find_dialog: None,
            message_box: None,
            pending_discard: false,
            last_view_height: 0,
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    fn show_error(&mut self, err: &anyhow::Error) {
        error!(error = %err, "operation failed");
        self.message_box = Some(format!("{err:#}"));
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let find_height = if self.find_dialog.is_some() { 3 } else { 0 };
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(find_height),
                Constraint::Length(1),
            ])
            .split(area);

        let tab_area = vertical[0];
        let editor_area = vertical[1];
        let find_area = vertical[2];
        let status_area = vertical[3];

        frame.render_widget(Paragraph::new(self.tab_bar_line()), tab_area);

        let (wrap_width, left_padding) = editor_wrap_configuration(editor_area.width as usize);
        let text_area = Rect::new(
            editor_area.x + left_padding as u16,
            editor_area.y,
            editor_area.width.saturating_sub(left_padding as u16),
            editor_area.height,
        );

        let editor = self.workspace.editor();
        let render = render_document(
            editor.document(),
            wrap_width,
            editor.caret(),
            editor.selection(),
            &self.theme,
        );
        let viewport_height = text_area.height as usize;
        self.last_view_height = viewport_height;
        self.adjust_scroll(&render, viewport_height);

        let cursor = render.cursor;
        let paragraph = Paragraph::new(Text::from(render.lines))
            .block(Block::default().borders(Borders::NONE))
            .scroll((self.scroll_top as u16, 0));
        frame.render_widget(paragraph, text_area);

        let overlay_open =
            self.context_menu.is_some() || self.prompt.is_some() || self.message_box.is_some();
        if self.find_dialog.is_none()
            && !overlay_open
            && let Some(cursor) = cursor
            && cursor.line >= self.scroll_top
            && cursor.line < self.scroll_top + viewport_height
            && text_area.width > 0
        {
            let cursor_y = text_area.y + (cursor.line - self.scroll_top) as u16;
            let cursor_x = text_area.x + cursor.column.min(text_area.width - 1);
            frame.set_cursor_position(Position::new(cursor_x, cursor_y));
        }

        if self.find_dialog.is_some() {
            self.render_find_dialog(frame, find_area, !overlay_open);
        }

        let status_line = self.status_line(status_area.width as usize);
        let status_widget = Paragraph::new(status_line)
            .block(Block::default().borders(Borders::NONE))
            .style(self.theme.status_bar_style());
        frame.render_widget(status_widget, status_area);

        if self.context_menu.is_some() {
            self.render_context_menu(frame, area);
        }
        if self.prompt.is_some() {
            self.render_prompt(frame, area);
        }
        if self.message_box.is_some() {
            self.render_message_box(frame, area);
        }
    }

    fn tab_bar_line(&self) -> Line<'static> {
        let spans: Vec<Span<'static>> = self
            .workspace
            .tabs()
            .iter()
            .enumerate()
            .map(|(idx, tab)| {
                let style = if idx == self.workspace.active_index() {
                    self.theme.active_tab_style()
                } else {
                    self.theme.tab_style()
                };
                Span::styled(format!(" {} ", tab.label()), style)
            })
            .collect();
        Line::from(spans).style(self.theme.tab_style())
    }

    fn render_find_dialog(&self, frame: &mut Frame, area: Rect, show_cursor: bool) {
        let Some(dialog) = &self.find_dialog else {
            return;
        };
        let (needle, replacement) = match self.workspace.find_session() {
            Some(session) => (session.needle.clone(), session.replacement.clone()),
            None => (String::new(), String::new()),
        };

        let block = Block::default()
            .title("Find / Replace  Enter:Next ^R:Replace ^A:All Tab:Field Esc:Close")
            .borders(Borders::ALL)
            .border_style(self.theme.dialog_border_style())
            .style(self.theme.menu_style());
        let inner = block.inner(area);
        frame.render_widget(Clear, area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let fields = [
            (FindField::Needle, "Find: ", needle, halves[0]),
            (FindField::Replacement, "Replace: ", replacement, halves[1]),
        ];
        for (field, label, value, field_area) in fields {
            let focused = dialog.field == field;
            let line = Line::from(vec![
                Span::styled(label, self.theme.menu_style().add_modifier(Modifier::BOLD)),
                Span::styled(format!("{value} "), self.theme.input_style(focused)),
            ]);
            frame.render_widget(Paragraph::new(line), field_area);
            if focused && show_cursor {
                let column = (label.width() + value.width()) as u16;
                let cursor_x = field_area.x + column.min(field_area.width.saturating_sub(1));
                frame.set_cursor_position(Position::new(cursor_x, field_area.y));
            }
        }
    }

    fn render_context_menu(&self, frame: &mut Frame, area: Rect) {
        let Some(menu) = &self.context_menu else {
            return;
        };

        if area.width < 3 || area.height < 3 {
            return;
        }

        // Two columns for the check mark, two more for a color swatch.
        let mut max_label_width = 0usize;
        let mut max_section_width = menu.title.width();
        let mut has_shortcuts = false;

        for entry in &menu.entries {
            match entry {
                MenuEntry::Item(item) => {
                    let swatch_width = if item.swatch.is_some() { 2 } else { 0 };
                    max_label_width = max_label_width.max(item.label.width() + swatch_width + 2);
                    has_shortcuts |= item.shortcut.is_some();
                }
                MenuEntry::Section(title) => {
                    max_section_width = max_section_width.max(title.width());
                }
                MenuEntry::Separator => {}
            }
        }

        let item_width = if has_shortcuts {
            max_label_width + 3
        } else {
            max_label_width
        };
        let content_width = item_width.max(max_section_width) as u16;
        let min_width = 10.min(area.width);
        let width = (content_width + 4).min(area.width).max(min_width);
        let desired_height = (menu.entries.len() as u16 + 2).min(area.height);
        let height = desired_height.max(3.min(area.height));

        let popup_area = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, popup_area);

        let separator_width = popup_area.width.saturating_sub(4).max(4) as usize;
        let popup_style = self.theme.menu_style();

        let mut items = Vec::new();
        for entry in &menu.entries {
            match entry {
                MenuEntry::Section(title) => {
                    items.push(ListItem::new(Line::from(Span::styled(
                        *title,
                        popup_style.add_modifier(Modifier::BOLD),
                    ))));
                }
                MenuEntry::Separator => {
                    let line = "─".repeat(separator_width);
                    items.push(ListItem::new(Line::from(Span::styled(
                        line,
                        self.theme.menu_disabled_style(),
                    ))));
                }
                MenuEntry::Item(item) => {
                    let style = if item.is_enabled() {
                        Style::default()
                    } else {
                        self.theme.menu_disabled_style()
                    };
                    let mut spans = vec![Span::styled(
                        if item.checked { "• " } else { "  " },
                        style,
                    )];
                    let mut label_width = item.label.width() + 2;
                    if let Some(color) = item.swatch {
                        spans.push(Span::styled("■ ", Style::default().fg(term_color(color))));
                        label_width += 2;
                    }
                    spans.push(Span::styled(item.label.clone(), style));
                    if let Some(shortcut) = item.shortcut {
                        let padding = max_label_width.saturating_sub(label_width) + 2;
                        spans.push(Span::styled(
                            format!("{}{}", " ".repeat(padding), shortcut.key),
                            self.theme.menu_disabled_style(),
                        ));
                    }
                    items.push(ListItem::new(Line::from(spans)));
                }
            }
        }

        let mut state = ListState::default();
        state.select(Some(menu.selected_index));

        let list = List::new(items)
            .highlight_style(self.theme.menu_selected_style())
            .style(popup_style)
            .block(
                Block::default()
                    .title(menu.title)
                    .borders(Borders::ALL)
                    .style(popup_style)
                    .border_style(self.theme.dialog_border_style()),
            );

        frame.render_stateful_widget(list, popup_area, &mut state);
    }

    fn render_prompt(&self, frame: &mut Frame, area: Rect) {
        let Some(prompt) = &self.prompt else {
            return;
        };
        let width = 60.min(area.width);
        let height = 3.min(area.height);
        let popup_area = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );
        let block = Block::default()
            .title(prompt.kind.title())
            .borders(Borders::ALL)
            .border_style(self.theme.dialog_border_style())
            .style(self.theme.menu_style());
        let inner = block.inner(popup_area);
        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(prompt.input.clone())
                .style(self.theme.input_style(true))
                .block(block),
            popup_area,
        );
        if inner.width > 0 && inner.height > 0 {
            let column = (prompt.input.width() as u16).min(inner.width - 1);
            frame.set_cursor_position(Position::new(inner.x + column, inner.y));
        }
    }

    fn render_message_box(&self, frame: &mut Frame, area: Rect) {
        let Some(message) = &self.message_box else {
            return;
        };
        let width = (message.width() as u16 + 4).clamp(24, 70).min(area.width);
        let height = 5.min(area.height);
        let popup_area = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );
        let text = Text::from(vec![
            Line::from(message.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key",
                self.theme.message_style().remove_modifier(Modifier::BOLD),
            )),
        ]);
        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(text)
                .wrap(Wrap { trim: true })
                .style(self.theme.message_style())
                .block(
                    Block::default()
                        .title("jtype")
                        .borders(Borders::ALL)
                        .style(self.theme.message_style()),
                ),
            popup_area,
        );
    }

    fn open_context_menu(&mut self) {
        let editor = self.workspace.editor();
        let entries = main_menu_entries(
            editor.selection().is_some(),
            self.config.highlight.enabled,
            editor.can_undo(),
            editor.can_redo(),
        );
        self.context_menu = Some(ContextMenuState::new("Menu", entries));
    }

    fn open_submenu(&mut self, submenu: Submenu) {
        let editor = self.workspace.editor();
        let format = editor.current_format();
        let (title, entries) = match submenu {
            Submenu::TextColor => (
                "Text color",
                color_entries(format.foreground, MenuAction::Foreground),
            ),
            Submenu::HighlightColor => (
                "Highlight color",
                color_entries(format.background, MenuAction::Background),
            ),
            Submenu::FontFamily => {
                let current = format
                    .font_family
                    .unwrap_or_else(|| self.config.default_font_family.clone());
                let entries: Vec<MenuEntry> = self
                    .config
                    .font_families
                    .iter()
                    .enumerate()
                    .map(|(idx, family)| {
                        MenuEntry::Item(
                            MenuItem::new(family.clone(), MenuAction::FontFamily(idx))
                                .checked(*family == current),
                        )
                    })
                    .collect();
                ("Font", entries)
            }
            Submenu::FontSize => {
                let current = format.font_size.unwrap_or(self.config.default_font_size);
                let entries: Vec<MenuEntry> = font_sizes()
                    .map(|size| {
                        MenuEntry::Item(
                            MenuItem::new(size.to_string(), MenuAction::FontSize(size))
                                .checked(size == current),
                        )
                    })
                    .collect();
                ("Font size", entries)
            }
            Submenu::LineSpacing => {
                let current = editor.current_line_spacing();
                let entries: Vec<MenuEntry> = self
                    .config
                    .line_spacing_options
                    .iter()
                    .map(|spacing| {
                        MenuEntry::Item(
                            MenuItem::new(format!("{spacing:.1}"), MenuAction::LineSpacing(*spacing))
                                .checked(*spacing == current),
                        )
                    })
                    .collect();
                ("Line spacing", entries)
            }
        };
        let mut menu = ContextMenuState::new(title, entries);
        if let Some(idx) = menu
            .entries
            .iter()
            .position(|entry| matches!(entry, MenuEntry::Item(item) if item.checked))
        {
            menu.selected_index = idx;
        }
        self.context_menu = Some(menu);
    }

    fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    fn handle_context_menu_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.context_menu.is_none() {
            return false;
        }

        match code {
            KeyCode::Esc => {
                self.close_context_menu();
                true
            }
            KeyCode::Up => {
                if let Some(menu) = self.context_menu.as_mut() {
                    menu.move_selection(-1);
                }
                true
            }
            KeyCode::Down => {
                if let Some(menu) = self.context_menu.as_mut() {
                    menu.move_selection(1);
                }
                true
            }
            KeyCode::Enter => {
                if let Some(action) = self
                    .context_menu
                    .as_ref()
                    .and_then(|menu| menu.current_action())
                {
                    self.close_context_menu();
                    self.execute_menu_action(action);
                }
                true
            }
            KeyCode::Char(_) => {
                if let Some(menu) = self.context_menu.as_mut() {
                    let (handled, action) = menu.shortcut_action(code, modifiers);
                    if handled {
                        if let Some(action) = action {
                            self.close_context_menu();
                            self.execute_menu_action(action);
                        }
                        return true;
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn execute_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::NewTab => {
                self.workspace.new_tab();
                self.after_tab_change();
            }
            MenuAction::Open => self.open_prompt(PromptKind::Open),
            MenuAction::Save => self.save(),
            MenuAction::SaveAs => self.open_prompt(PromptKind::SaveAs),
            MenuAction::CloseTab => self.close_tab(),
            MenuAction::NextTab => {
                self.workspace.next_tab();
                self.after_tab_change();
            }
            MenuAction::Emphasis(emphasis) => self.toggle_emphasis(emphasis),
            MenuAction::Foreground(color) => {
                let changed = self.workspace.editor_mut().set_foreground(color);
                self.format_applied(changed);
            }
            MenuAction::Background(color) => {
                let changed = self.workspace.editor_mut().set_background(color);
                self.format_applied(changed);
            }
            MenuAction::FontFamily(idx) => {
                if let Some(family) = self.config.font_families.get(idx).cloned() {
                    let changed = self.workspace.editor_mut().set_font_family(&family);
                    self.format_applied(changed);
                }
            }
            MenuAction::FontSize(size) => {
                let changed = self.workspace.editor_mut().set_font_size(size);
                self.format_applied(changed);
            }
            MenuAction::LineSpacing(spacing) => {
                if self.workspace.editor_mut().set_line_spacing(spacing) {
                    self.workspace.mark_dirty();
                }
            }
            MenuAction::Find => self.open_find_dialog(),
            MenuAction::Undo => self.undo(),
            MenuAction::Redo => self.redo(),
            MenuAction::ToggleHighlight => {
                self.config.highlight.enabled = !self.config.highlight.enabled;
                self.workspace
                    .set_highlight_config(self.config.highlight.clone());
                let message = if self.config.highlight.enabled {
                    "Keyword highlighting enabled"
                } else {
                    "Keyword highlighting disabled"
                };
                self.set_status(message);
            }
            MenuAction::Quit => self.request_quit(),
            MenuAction::Submenu(submenu) => self.open_submenu(submenu),
        }
    }

    fn format_applied(&mut self, changed: bool) {
        if changed {
            self.workspace.mark_dirty();
        } else if self.workspace.editor().selection().is_none() {
            self.set_status("Select some text first");
        }
    }

    fn toggle_emphasis(&mut self, emphasis: Emphasis) {
        let changed = self.workspace.editor_mut().toggle_emphasis(emphasis);
        self.format_applied(changed);
    }

    fn undo(&mut self) {
        if self.workspace.editor_mut().undo() {
            self.workspace.mark_dirty();
        } else {
            self.set_status("Nothing to undo");
        }
    }

    fn redo(&mut self) {
        if self.workspace.editor_mut().redo() {
            self.workspace.mark_dirty();
        } else {
            self.set_status("Nothing to redo");
        }
    }

    fn after_tab_change(&mut self) {
        self.find_dialog = None;
        self.pending_discard = false;
        self.scroll_top = 0;
    }

    /// Closing a tab with unsaved changes needs a second request.
    fn close_tab(&mut self) {
        if self.workspace.active().dirty && !self.pending_discard {
            self.pending_discard = true;
            self.set_status("Unsaved changes. Close again to discard them.");
            return;
        }
        self.workspace.close_tab();
        self.after_tab_change();
    }

    fn request_quit(&mut self) {
        if self.workspace.has_unsaved_changes() && !self.pending_discard {
            self.pending_discard = true;
            self.set_status("Unsaved changes. Quit again to discard them.");
            return;
        }
        self.should_quit = true;
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        let input = match kind {
            PromptKind::Open => String::new(),
            PromptKind::SaveAs => self
                .workspace
                .active()
                .path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
        };
        self.prompt = Some(PathPrompt { kind, input });
    }

    fn handle_prompt_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.submit_prompt(prompt);
                }
            }
            KeyCode::Char(ch)
                if !modifiers.contains(KeyModifiers::CONTROL)
                    && !modifiers.contains(KeyModifiers::ALT) =>
            {
                prompt.input.push(ch);
            }
            _ => {}
        }
    }

    fn submit_prompt(&mut self, prompt: PathPrompt) {
        let input = prompt.input.trim();
        if input.is_empty() {
            return;
        }
        let path = PathBuf::from(input);
        match prompt.kind {
            PromptKind::Open => {
                // Keep unsaved work: open next to it instead of over it.
                if self.workspace.active().dirty {
                    self.workspace.new_tab();
                }
                match self.workspace.open(&path) {
                    Ok(()) => {
                        self.after_tab_change();
                        self.set_status(format!("Opened {}", path.display()));
                    }
                    Err(err) => self.show_error(&err),
                }
            }
            PromptKind::SaveAs => match self.workspace.save_as(&path) {
                Ok(()) => self.set_status(format!("Saved {}", path.display())),
                Err(err) => self.show_error(&err),
            },
        }
    }

    fn open_find_dialog(&mut self) {
        // Binds a session to the current tab.
        let _ = self.workspace.find_session_mut();
        self.find_dialog = Some(FindDialog {
            field: FindField::Needle,
        });
    }

    fn close_find_dialog(&mut self) {
        self.find_dialog = None;
        self.workspace.drop_find_session();
    }

    /// Returns false for keys the panel leaves to the document.
    fn handle_find_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let Some(dialog) = self.find_dialog.as_mut() else {
            return false;
        };
        let control = modifiers.contains(KeyModifiers::CONTROL);
        match code {
            KeyCode::Esc => self.close_find_dialog(),
            KeyCode::Tab | KeyCode::BackTab => {
                dialog.field = match dialog.field {
                    FindField::Needle => FindField::Replacement,
                    FindField::Replacement => FindField::Needle,
                };
            }
            KeyCode::Enter => self.find_next(),
            KeyCode::Char('r') if control => self.replace(),
            KeyCode::Char('a') if control => self.replace_all(),
            KeyCode::Backspace => {
                let field = dialog.field;
                self.find_field_mut(field).pop();
            }
            KeyCode::Char(ch) if !control && !modifiers.contains(KeyModifiers::ALT) => {
                let field = dialog.field;
                self.find_field_mut(field).push(ch);
            }
            _ => return false,
        }
        true
    }

    fn find_field_mut(&mut self, field: FindField) -> &mut String {
        let session = self.workspace.find_session_mut();
        match field {
            FindField::Needle => &mut session.needle,
            FindField::Replacement => &mut session.replacement,
        }
    }

    fn find_next(&mut self) {
        match self.workspace.find_next() {
            FindOutcome::Found(_) => {}
            FindOutcome::NotFound => self.message_box = Some(NOT_FOUND_MESSAGE.to_string()),
            FindOutcome::EmptyNeedle => self.set_status("Enter the text to find"),
        }
    }

    fn replace(&mut self) {
        match self.workspace.replace() {
            FindOutcome::Found(_) => {}
            FindOutcome::NotFound => self.message_box = Some(NOT_FOUND_MESSAGE.to_string()),
            FindOutcome::EmptyNeedle => self.set_status("Enter the text to find"),
        }
    }

    fn replace_all(&mut self) {
        let needle_empty = self
            .workspace
            .find_session()
            .is_none_or(|session| session.needle.is_empty());
        if needle_empty {
            self.set_status("Enter the text to find");
            return;
        }
        match self.workspace.replace_all() {
            0 => self.message_box = Some(NOT_FOUND_MESSAGE.to_string()),
            1 => self.set_status("Replaced 1 occurrence"),
            count => self.set_status(format!("Replaced {count} occurrences")),
        }
    }

    fn save(&mut self) {
        if self.workspace.active().path.is_none() {
            self.open_prompt(PromptKind::SaveAs);
            return;
        }
        match self.workspace.save() {
            Ok(path) => self.set_status(format!("Saved {}", path.display())),
            Err(err) => self.show_error(&err),
        }
    }

    fn status_line(&mut self, terminal_width: usize) -> Line<'static> {
        self.prune_status_message();

        let position = self.cursor_position_text();
        if let Some((message, _)) = &self.status_message {
            return Line::from(vec![
                Span::raw(format!("{} ", position)),
                Span::raw(message.clone()),
            ]);
        }

        let tab = self.workspace.active();
        let filename = tab
            .path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| tab.title.clone());
        let marker = if tab.dirty { "*" } else { "" };
        let format = tab.editor.current_format();
        let family = format
            .font_family
            .unwrap_or_else(|| self.config.default_font_family.clone());
        let size = format.font_size.unwrap_or(self.config.default_font_size);
        let spacing = tab.editor.current_line_spacing();

        // Shortcuts ordered from least to most important
        let all_shortcuts = ["^F:Find", "^K:Menu", "^S:Save", "^Q:Quit"];

        let mut spans = vec![
            Span::styled(position, Style::default().fg(self.theme.status_bar_fg)),
            Span::raw(" "),
            Span::styled(format!("{filename}{marker}"), self.theme.filename_style()),
            Span::raw(format!(
                " [{}] {family} {size}pt, spacing {spacing:.1}",
                tab.format.label()
            )),
        ];

        let left_width: usize = spans.iter().map(|span| span.content.width()).sum();

        let min_padding = 1;
        let mut shortcuts_to_show = Vec::new();
        let mut shortcuts_width = 0;

        // Most important first; stop at the first one that doesn't fit
        for shortcut in all_shortcuts.iter().rev() {
            let test_width = if shortcuts_to_show.is_empty() {
                shortcut.width()
            } else {
                shortcuts_width + 1 + shortcut.width()
            };

            if left_width + min_padding + test_width <= terminal_width {
                shortcuts_to_show.insert(0, *shortcut);
                shortcuts_width = test_width;
            } else {
                break;
            }
        }

        if !shortcuts_to_show.is_empty() {
            let padding = terminal_width
                .saturating_sub(left_width)
                .saturating_sub(shortcuts_width)
                .max(min_padding);
            spans.push(Span::raw(" ".repeat(padding)));
            spans.push(Span::raw(shortcuts_to_show.join(" ")));
        }

        Line::from(spans)
    }

    fn prune_status_message(&mut self) {
        if let Some((_, instant)) = &self.status_message
            && instant.elapsed() > STATUS_TIMEOUT
        {
            self.status_message = None;
        }
    }

    fn cursor_position_text(&self) -> String {
        let (paragraph, column) = self.workspace.editor().caret_location();
        format!("{}:{}", paragraph + 1, column + 1)
    }

    fn adjust_scroll(&mut self, render: &RenderResult, viewport_height: usize) {
        let viewport = viewport_height.max(1);
        let max_scroll = render.total_lines.saturating_sub(viewport);
        if let Some(cursor) = render.cursor {
            if cursor.line < self.scroll_top {
                self.scroll_top = cursor.line;
            } else if cursor.line >= self.scroll_top + viewport {
                self.scroll_top = cursor.line + 1 - viewport;
            }
        }
        if self.scroll_top > max_scroll {
            self.scroll_top = max_scroll;
        }
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        {
            self.handle_key(code, modifiers);
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if self.message_box.take().is_some() {
            return;
        }

        if self.prompt.is_some() {
            self.handle_prompt_key(code, modifiers);
            return;
        }

        if self.handle_context_menu_key(code, modifiers) || self.context_menu.is_some() {
            return;
        }

        if is_context_menu_shortcut(code, modifiers) {
            self.open_context_menu();
            return;
        }

        if self.handle_find_key(code, modifiers) {
            return;
        }

        let discard_armed = self.pending_discard;
        self.handle_document_key(code, modifiers);
        if discard_armed {
            self.pending_discard = false;
        }
    }

    fn handle_document_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let control = modifiers.contains(KeyModifiers::CONTROL);
        let shift = modifiers.contains(KeyModifiers::SHIFT);
        let alt = modifiers.contains(KeyModifiers::ALT);

        let edited = match (code, modifiers) {
            (KeyCode::Char('q'), _) if control => {
                self.request_quit();
                false
            }
            (KeyCode::Char('s'), _) if control => {
                self.save();
                false
            }
            (KeyCode::Char('o'), _) if control => {
                self.open_prompt(PromptKind::Open);
                false
            }
            (KeyCode::Char('t'), _) if control => {
                self.workspace.new_tab();
                self.after_tab_change();
                false
            }
            (KeyCode::Char('w'), _) if control => {
                self.close_tab();
                false
            }
            (KeyCode::Tab, _) if control => {
                self.workspace.next_tab();
                self.after_tab_change();
                false
            }
            (KeyCode::Right, _) if alt => {
                self.workspace.next_tab();
                self.after_tab_change();
                false
            }
            (KeyCode::Left, _) if alt => {
                self.workspace.previous_tab();
                self.after_tab_change();
                false
            }
            (KeyCode::Char('f'), _) if control => {
                self.open_find_dialog();
                false
            }
            (KeyCode::Char('b'), _) if control => {
                self.toggle_emphasis(Emphasis::Bold);
                false
            }
            (KeyCode::Char('i'), _) if control => {
                self.toggle_emphasis(Emphasis::Italic);
                false
            }
            (KeyCode::Char('u'), _) if control => {
                self.toggle_emphasis(Emphasis::Underline);
                false
            }
            (KeyCode::Char('z'), _) if control => {
                self.undo();
                false
            }
            (KeyCode::Char('y'), _) if control => {
                self.redo();
                false
            }
            (KeyCode::Char('a'), _) if control => {
                self.workspace.editor_mut().select_all();
                false
            }
            _ => self.handle_editing_key(code, control, shift, alt),
        };

        if edited {
            self.workspace.mark_dirty();
        }
    }

    /// Caret motion and text input. Returns whether the document changed.
    fn handle_editing_key(&mut self, code: KeyCode, control: bool, shift: bool, alt: bool) -> bool {
        let page = (self.last_view_height / 2).max(1);
        let editor = self.workspace.editor_mut();
        match code {
            KeyCode::Left if control => {
                editor.move_word_left(shift);
                false
            }
            KeyCode::Right if control => {
                editor.move_word_right(shift);
                false
            }
            KeyCode::Left => {
                editor.move_left(shift);
                false
            }
            KeyCode::Right => {
                editor.move_right(shift);
                false
            }
            KeyCode::Up => {
                editor.move_up(shift);
                false
            }
            KeyCode::Down => {
                editor.move_down(shift);
                false
            }
            KeyCode::PageUp => {
                for _ in 0..page {
                    editor.move_up(shift);
                }
                false
            }
            KeyCode::PageDown => {
                for _ in 0..page {
                    editor.move_down(shift);
                }
                false
            }
            KeyCode::Home if control => {
                editor.move_document_start(shift);
                false
            }
            KeyCode::End if control => {
                editor.move_document_end(shift);
                false
            }
            KeyCode::Home => {
                editor.move_line_start(shift);
                false
            }
            KeyCode::End => {
                editor.move_line_end(shift);
                false
            }
            KeyCode::Backspace if control || alt => editor.delete_word_backward(),
            KeyCode::Backspace => editor.backspace(),
            KeyCode::Delete if control || alt => editor.delete_word_forward(),
            KeyCode::Delete => editor.delete(),
            KeyCode::Enter => editor.insert_paragraph_break(),
            KeyCode::Tab => editor.insert_char('\t'),
            KeyCode::Char(ch) if !control && !alt => editor.insert_char(ch),
            _ => false,
        }
    }

    fn on_tick(&mut self) {
        self.prune_status_message();
    }
}
