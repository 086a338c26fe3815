use std::fmt;
use std::str::FromStr;

/// 24-bit RGB color attached to a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0x80, 0x00);
    pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xff);
    pub const YELLOW: Color = Color::rgb(0xff, 0xff, 0x00);
    pub const ORANGE: Color = Color::rgb(0xff, 0xa5, 0x00);
    pub const MAGENTA: Color = Color::rgb(0xff, 0x00, 0xff);
    pub const CYAN: Color = Color::rgb(0x00, 0xff, 0xff);
    pub const GRAY: Color = Color::rgb(0x80, 0x80, 0x80);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Named colors offered by the color pickers.
    pub const PALETTE: [(&'static str, Color); 10] = [
        ("Black", Color::BLACK),
        ("White", Color::WHITE),
        ("Red", Color::RED),
        ("Green", Color::GREEN),
        ("Blue", Color::BLUE),
        ("Yellow", Color::YELLOW),
        ("Orange", Color::ORANGE),
        ("Magenta", Color::MAGENTA),
        ("Cyan", Color::CYAN),
        ("Gray", Color::GRAY),
    ];

    pub fn name(&self) -> Option<&'static str> {
        Self::PALETTE
            .iter()
            .find(|(_, color)| color == self)
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color: {}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Accepts a palette name (case-insensitive) or `#rrggbb`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(ParseColorError(value.to_string()));
            }
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&hex[range], 16).map_err(|_| ParseColorError(value.to_string()))
            };
            return Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?));
        }
        Self::PALETTE
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(value))
            .map(|(_, color)| *color)
            .ok_or_else(|| ParseColorError(value.to_string()))
    }
}

/// Character formatting carried by every run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub font_family: Option<String>,
    pub font_size: Option<u16>,
}

impl CharFormat {
    pub fn is_plain(&self) -> bool {
        *self == CharFormat::default()
    }

    pub fn apply(&mut self, change: &FormatChange) {
        match change {
            FormatChange::Bold(value) => self.bold = *value,
            FormatChange::Italic(value) => self.italic = *value,
            FormatChange::Underline(value) => self.underline = *value,
            FormatChange::Foreground(color) => self.foreground = *color,
            FormatChange::Background(color) => self.background = *color,
            FormatChange::FontFamily(family) => self.font_family = family.clone(),
            FormatChange::FontSize(size) => self.font_size = *size,
        }
    }
}

/// A single attribute assignment applied over a range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatChange {
    Bold(bool),
    Italic(bool),
    Underline(bool),
    Foreground(Option<Color>),
    Background(Option<Color>),
    FontFamily(Option<String>),
    FontSize(Option<u16>),
}

/// Toggleable boolean attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    Bold,
    Italic,
    Underline,
}

impl Emphasis {
    pub fn is_set(&self, format: &CharFormat) -> bool {
        match self {
            Emphasis::Bold => format.bold,
            Emphasis::Italic => format.italic,
            Emphasis::Underline => format.underline,
        }
    }

    pub fn change(&self, value: bool) -> FormatChange {
        match self {
            Emphasis::Bold => FormatChange::Bold(value),
            Emphasis::Italic => FormatChange::Italic(value),
            Emphasis::Underline => FormatChange::Underline(value),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Emphasis::Bold => "Bold",
            Emphasis::Italic => "Italic",
            Emphasis::Underline => "Underline",
        }
    }
}
