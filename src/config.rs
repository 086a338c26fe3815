use std::{
    env, fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::document::{Color, FONT_SIZES};
use crate::highlight::HighlightConfig;

const RC_FILE_NAME: &str = ".jtyperc";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub highlight: HighlightConfig,
    pub font_families: Vec<String>,
    pub default_font_family: String,
    pub default_font_size: u16,
    pub line_spacing_options: Vec<f32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            highlight: HighlightConfig::default(),
            font_families: [
                "Segoe UI",
                "Arial",
                "Calibri",
                "Cambria",
                "Consolas",
                "Courier New",
                "Georgia",
                "Times New Roman",
                "Verdana",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
            default_font_family: "Segoe UI".to_string(),
            default_font_size: 14,
            line_spacing_options: vec![1.0, 1.5, 2.0],
        }
    }
}

impl Config {
    /// Looks for `.jtyperc` in the current directory, then in `$HOME`.
    pub fn rc_path() -> Option<PathBuf> {
        let current = Path::new(RC_FILE_NAME);
        if current.exists() {
            return Some(current.to_path_buf());
        }
        let home = env::var("HOME").ok()?;
        let home_rc = Path::new(&home).join(RC_FILE_NAME);
        home_rc.exists().then_some(home_rc)
    }

    pub fn load() -> Self {
        let mut config = Config::default();
        if let Some(path) = Self::rc_path() {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    debug!(path = %path.display(), "reading configuration");
                    config.apply_rc(&content);
                }
                Err(err) => warn!(path = %path.display(), %err, "cannot read configuration"),
            }
        }
        config
    }

    /// Applies `key = value` lines. Blank lines and `#` comments are skipped;
    /// unknown keys and invalid values are ignored.
    pub fn apply_rc(&mut self, content: &str) {
        for (index, line) in content.lines().enumerate() {
            let line = match line.find('#') {
                Some(pos) if !line[..pos].contains('=') => &line[..pos],
                _ => line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!(line = index + 1, "expected key = value");
                continue;
            };
            if !self.apply_setting(key.trim(), value.trim()) {
                warn!(line = index + 1, key = key.trim(), "ignoring invalid setting");
            }
        }
    }

    fn apply_setting(&mut self, key: &str, value: &str) -> bool {
        match key {
            "highlight" => match parse_bool(value) {
                Some(enabled) => self.highlight.enabled = enabled,
                None => return false,
            },
            "keywords" => self.highlight.keywords = split_list(value),
            "highlight_color" => match value.parse::<Color>() {
                Ok(color) => self.highlight.color = color,
                Err(_) => return false,
            },
            "font_families" => {
                let families = split_list(value);
                if families.is_empty() {
                    return false;
                }
                self.font_families = families;
            }
            "font_family" if !value.is_empty() => self.default_font_family = value.to_string(),
            "font_size" => match value.parse::<u16>() {
                Ok(size) if FONT_SIZES.contains(&size) => self.default_font_size = size,
                _ => return false,
            },
            "line_spacing_options" => {
                let options: Option<Vec<f32>> = split_list(value)
                    .iter()
                    .map(|item| item.parse::<f32>().ok().filter(|v| *v >= 1.0 && *v <= 4.0))
                    .collect();
                match options {
                    Some(options) if !options.is_empty() => self.line_spacing_options = options,
                    _ => return false,
                }
            }
            _ => return false,
        }
        true
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_list_ten_keywords() {
        let config = Config::default();
        assert_eq!(config.highlight.keywords.len(), 10);
        assert_eq!(config.highlight.keywords[0], "class");
        assert_eq!(config.highlight.color, Color::BLUE);
        assert_eq!(config.default_font_size, 14);
        assert_eq!(config.default_font_family, "Segoe UI");
    }

    #[test]
    fn rc_overrides_known_settings() {
        let mut config = Config::default();
        config.apply_rc(
            "# editor settings\n\
             keywords = fn, let , mut\n\
             highlight_color = #ff0000\n\
             highlight = off\n\
             font_size = 18\n\
             line_spacing_options = 1, 1.15, 2\n",
        );
        assert_eq!(config.highlight.keywords, vec!["fn", "let", "mut"]);
        assert_eq!(config.highlight.color, Color::RED);
        assert!(!config.highlight.enabled);
        assert_eq!(config.default_font_size, 18);
        assert_eq!(config.line_spacing_options, vec![1.0, 1.15, 2.0]);
    }

    #[test]
    fn invalid_values_are_ignored() {
        let mut config = Config::default();
        config.apply_rc("font_size = 7\nhighlight_color = plaid\nbogus = 1\nno equals sign\n");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn hash_after_equals_is_a_color_not_a_comment() {
        let mut config = Config::default();
        config.apply_rc("highlight_color = #00ff00\n");
        assert_eq!(config.highlight.color, Color::rgb(0, 0xff, 0));
    }
}
