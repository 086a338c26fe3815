use ratatui::style::{Color, Modifier, Style};

/// Colors of the editor chrome. Document text is styled by its own run
/// formats, not by the theme.
#[derive(Clone, Debug)]
pub struct Theme {
    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for the current file name in the status bar
    pub filename_color: Color,

    /// Foreground color for active selection
    pub selection_fg: Color,

    /// Background color for active selection
    pub selection_bg: Color,

    pub tab_fg: Color,
    pub tab_bg: Color,
    pub tab_active_fg: Color,
    pub tab_active_bg: Color,

    /// Foreground color for menu items
    pub menu_fg: Color,

    /// Background color for menu
    pub menu_bg: Color,

    /// Foreground color for disabled menu items
    pub menu_disabled_fg: Color,

    /// Foreground color for selected menu entry
    pub menu_selected_fg: Color,

    /// Background color for selected menu entry
    pub menu_selected_bg: Color,

    pub dialog_border: Color,

    /// Background of the input field that has focus in a dialog
    pub input_focus_bg: Color,

    pub message_fg: Color,
    pub message_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            filename_color: Color::LightYellow,
            selection_fg: Color::White,
            selection_bg: Color::LightBlue,
            tab_fg: Color::Gray,
            tab_bg: Color::Black,
            tab_active_fg: Color::Black,
            tab_active_bg: Color::White,
            menu_fg: Color::White,
            menu_bg: Color::Black,
            menu_disabled_fg: Color::DarkGray,
            menu_selected_fg: Color::White,
            menu_selected_bg: Color::LightBlue,
            dialog_border: Color::Gray,
            input_focus_bg: Color::DarkGray,
            message_fg: Color::White,
            message_bg: Color::Red,
        }
    }
}

impl Theme {
    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    pub fn filename_style(&self) -> Style {
        Style::default().fg(self.filename_color)
    }

    pub fn selection_style(&self) -> Style {
        Style::default().fg(self.selection_fg).bg(self.selection_bg)
    }

    pub fn tab_style(&self) -> Style {
        Style::default().fg(self.tab_fg).bg(self.tab_bg)
    }

    pub fn active_tab_style(&self) -> Style {
        Style::default()
            .fg(self.tab_active_fg)
            .bg(self.tab_active_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Get the style for the menu/popup
    pub fn menu_style(&self) -> Style {
        Style::default().fg(self.menu_fg).bg(self.menu_bg)
    }

    pub fn menu_disabled_style(&self) -> Style {
        Style::default().fg(self.menu_disabled_fg)
    }

    pub fn menu_selected_style(&self) -> Style {
        Style::default()
            .fg(self.menu_selected_fg)
            .bg(self.menu_selected_bg)
    }

    pub fn dialog_border_style(&self) -> Style {
        Style::default().fg(self.dialog_border)
    }

    pub fn input_style(&self, focused: bool) -> Style {
        if focused {
            self.menu_style().bg(self.input_focus_bg)
        } else {
            self.menu_style()
        }
    }

    pub fn message_style(&self) -> Style {
        Style::default()
            .fg(self.message_fg)
            .bg(self.message_bg)
            .add_modifier(Modifier::BOLD)
    }
}
