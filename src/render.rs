use ratatui::{
    style::{Color as TermColor, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::document::{Anchor, CharFormat, Color, Document, Paragraph};
use crate::theme::Theme;

const TAB_WIDTH: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
}

/// Word-wraps `document` to `width` columns. Paragraphs with a line spacing
/// above 1 get `round(spacing) - 1` blank rows after every wrapped line.
pub fn render_document(
    document: &Document,
    width: usize,
    caret: Anchor,
    selection: Option<(Anchor, Anchor)>,
    theme: &Theme,
) -> RenderResult {
    let mut renderer = Renderer::new(width.max(1), caret, selection, theme.selection_style());
    renderer.render_document(document);
    renderer.finish()
}

pub fn term_color(color: Color) -> TermColor {
    TermColor::Rgb(color.r, color.g, color.b)
}

/// Terminal style for a run. Font family and size have no terminal
/// rendition and are only shown in the status line.
pub fn format_style(format: &CharFormat) -> Style {
    let mut style = Style::default();
    if format.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if format.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if format.underline {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if let Some(color) = format.foreground {
        style = style.fg(term_color(color));
    }
    if let Some(color) = format.background {
        style = style.bg(term_color(color));
    }
    style
}

struct Renderer {
    wrap_width: usize,
    caret: Anchor,
    selection: Option<(Anchor, Anchor)>,
    selection_style: Style,
    cursor: Option<CursorVisualPosition>,
    lines: Vec<Line<'static>>,
}

impl Renderer {
    fn new(
        wrap_width: usize,
        caret: Anchor,
        selection: Option<(Anchor, Anchor)>,
        selection_style: Style,
    ) -> Self {
        Self {
            wrap_width,
            caret,
            selection,
            selection_style,
            cursor: None,
            lines: Vec::new(),
        }
    }

    fn render_document(&mut self, document: &Document) {
        let mut start = 0;
        for paragraph in &document.paragraphs {
            self.render_paragraph(paragraph, start);
            start += paragraph.char_len() + 1;
        }
    }

    fn render_paragraph(&mut self, paragraph: &Paragraph, start: usize) {
        let mut fragments = Vec::new();
        let mut offset = start;
        for run in &paragraph.runs {
            self.tokenize_run(&run.text, format_style(&run.format), offset, &mut fragments);
            offset += run.char_len();
        }
        if self.caret.0 == offset {
            fragments.push(Fragment {
                text: String::new(),
                style: Style::default(),
                kind: FragmentKind::Word,
                width: 0,
                events: vec![TextEvent { offset: 0 }],
            });
        }

        let lines = wrap_fragments(&fragments, self.wrap_width);
        let extra_rows = (paragraph.line_spacing.round() as usize).saturating_sub(1);
        self.consume_lines(lines, extra_rows);
    }

    fn is_selected(&self, anchor: usize) -> bool {
        self.selection
            .is_some_and(|(start, end)| start.0 <= anchor && anchor < end.0)
    }

    fn tokenize_run(&self, text: &str, style: Style, start: usize, fragments: &mut Vec<Fragment>) {
        let mut builder: Option<TokenBuilder> = None;
        let mut pending_events: Vec<TextEvent> = Vec::new();

        for (idx, ch) in text.chars().enumerate() {
            let anchor = start + idx;
            if anchor == self.caret.0 {
                pending_events.push(TextEvent { offset: 0 });
            }
            let style = if self.is_selected(anchor) {
                style.patch(self.selection_style)
            } else {
                style
            };
            let (actual, repeat) = if ch == '\t' { (' ', TAB_WIDTH) } else { (ch, 1) };
            let is_whitespace = actual.is_whitespace();

            for _ in 0..repeat {
                if builder
                    .as_ref()
                    .is_some_and(|existing| existing.matches(style, is_whitespace))
                {
                    if let Some(current) = builder.as_mut() {
                        current.add_events(&mut pending_events);
                        current.push_char(actual);
                    }
                } else {
                    if let Some(mut existing) = builder.take() {
                        existing.add_events(&mut pending_events);
                        fragments.push(existing.finish());
                    }
                    let mut new_builder = TokenBuilder::new(style, is_whitespace);
                    new_builder.add_events(&mut pending_events);
                    new_builder.push_char(actual);
                    builder = Some(new_builder);
                }
            }
        }

        if let Some(mut token) = builder {
            token.add_events(&mut pending_events);
            fragments.push(token.finish());
        }
    }

    fn consume_lines(&mut self, outputs: Vec<LineOutput>, extra_rows: usize) {
        for output in outputs {
            let spans: Vec<Span<'static>> = output
                .spans
                .into_iter()
                .map(|segment| Span::styled(segment.text, segment.style))
                .collect();
            if let Some(column) = output.cursor_column {
                self.cursor = Some(CursorVisualPosition {
                    line: self.lines.len(),
                    column,
                });
            }
            self.lines.push(Line::from(spans));
            for _ in 0..extra_rows {
                self.lines.push(Line::from(""));
            }
        }
    }

    fn finish(mut self) -> RenderResult {
        if self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        let total_lines = self.lines.len();
        RenderResult {
            lines: self.lines,
            cursor: self.cursor,
            total_lines,
        }
    }
}

#[derive(Clone)]
struct LineSegment {
    text: String,
    style: Style,
}

struct LineOutput {
    spans: Vec<LineSegment>,
    cursor_column: Option<u16>,
}

#[derive(Clone)]
struct Fragment {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    events: Vec<TextEvent>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FragmentKind {
    Word,
    Whitespace,
}

/// Caret position inside a fragment, in display columns.
#[derive(Clone, Copy)]
struct TextEvent {
    offset: usize,
}

struct TokenBuilder {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    events: Vec<TextEvent>,
}

impl TokenBuilder {
    fn new(style: Style, is_whitespace: bool) -> Self {
        Self {
            text: String::new(),
            style,
            kind: if is_whitespace {
                FragmentKind::Whitespace
            } else {
                FragmentKind::Word
            },
            width: 0,
            events: Vec::new(),
        }
    }

    fn matches(&self, style: Style, is_whitespace: bool) -> bool {
        let kind_matches = matches!(
            (self.kind, is_whitespace),
            (FragmentKind::Whitespace, true) | (FragmentKind::Word, false)
        );
        kind_matches && self.style == style
    }

    fn add_events(&mut self, pending: &mut Vec<TextEvent>) {
        for mut event in pending.drain(..) {
            event.offset = self.width;
            self.events.push(event);
        }
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.width += UnicodeWidthChar::width(ch).unwrap_or(0);
    }

    fn finish(self) -> Fragment {
        Fragment {
            text: self.text,
            style: self.style,
            kind: self.kind,
            width: self.width,
            events: self.events,
        }
    }
}

/// Greedy wrap on word boundaries. A run of whitespace stays on the line it
/// follows; a word wider than the line is never broken.
fn wrap_fragments(fragments: &[Fragment], width: usize) -> Vec<LineOutput> {
    let mut outputs = Vec::new();
    let mut builder = LineBuilder::default();
    let mut pending_whitespace: Vec<Fragment> = Vec::new();

    for fragment in fragments {
        match fragment.kind {
            FragmentKind::Whitespace => pending_whitespace.push(fragment.clone()),
            FragmentKind::Word => {
                let whitespace_width: usize =
                    pending_whitespace.iter().map(|item| item.width).sum();
                if builder.width > 0
                    && fragment.width > 0
                    && builder.width + whitespace_width + fragment.width > width
                {
                    builder.consume_pending(&mut pending_whitespace);
                    outputs.push(builder.build_line());
                    builder = LineBuilder::default();
                }
                builder.consume_pending(&mut pending_whitespace);
                builder.append(fragment.clone());
            }
        }
    }

    builder.consume_pending(&mut pending_whitespace);
    outputs.push(builder.build_line());
    outputs
}

#[derive(Default)]
struct LineBuilder {
    segments: Vec<LineSegment>,
    cursor_column: Option<u16>,
    width: usize,
}

impl LineBuilder {
    fn consume_pending(&mut self, pending_whitespace: &mut Vec<Fragment>) {
        for fragment in pending_whitespace.drain(..) {
            self.append(fragment);
        }
    }

    fn append(&mut self, fragment: Fragment) {
        if let Some(event) = fragment.events.first() {
            self.cursor_column = Some((self.width + event.offset) as u16);
        }
        if !fragment.text.is_empty() {
            self.width += fragment.width;
            self.segments.push(LineSegment {
                text: fragment.text,
                style: fragment.style,
            });
        }
    }

    fn build_line(mut self) -> LineOutput {
        if self.segments.is_empty() {
            self.segments.push(LineSegment {
                text: String::new(),
                style: Style::default(),
            });
        }
        LineOutput {
            spans: self.segments,
            cursor_column: self.cursor_column,
        }
    }
}
