//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use splitris::{PieceKind, Rgb};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// UI colours plus one colour per piece kind.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Indexed like `PieceKind::ALL`.
    pub pieces: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (key help).
    pub inactive_fg: Color,
    /// Rows being cleared, before they fade out.
    pub flash: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Theme file key for each piece kind.
const PIECE_KEYS: [&str; 7] = [
    "piece_straight",
    "piece_square",
    "piece_l",
    "piece_j",
    "piece_s",
    "piece_t",
    "piece_z",
];

impl Default for Theme {
    fn default() -> Self {
        Self {
            pieces: PieceKind::ALL.map(|kind| rgb(kind.color())),
            // One Dark UI colours.
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
            flash: Color::White,
        }
    }
}

impl Theme {
    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Keys missing from the file keep their default colour.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let s = std::fs::read_to_string(path)?;
        Ok(Self::from_map(&parse_theme_file(&s)))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let defaults = Self::default();
        let mut pieces = defaults.pieces;
        for (color, key) in pieces.iter_mut().zip(PIECE_KEYS) {
            if let Some(c) = get(key) {
                *color = c;
            }
        }
        Self {
            pieces,
            bg: get("meter_bg").unwrap_or(defaults.bg),
            div_line: get("div_line").unwrap_or(defaults.div_line),
            main_fg: get("main_fg").unwrap_or(defaults.main_fg),
            title: get("title").unwrap_or(defaults.title),
            inactive_fg: get("inactive_fg").unwrap_or(defaults.inactive_fg),
            flash: get("hi_fg").unwrap_or(defaults.flash),
        }
    }

    #[inline]
    pub fn piece_color(&self, kind: PieceKind) -> Color {
        let i = PieceKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        self.pieces[i]
    }
}

fn rgb(Rgb(r, g, b): Rgb) -> Color {
    Color::Rgb(r, g, b)
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    if !s.is_ascii() {
        return Err(invalid());
    }
    match s.len() {
        6 => Ok(Color::Rgb(
            channel(&s[0..2])?,
            channel(&s[2..4])?,
            channel(&s[4..6])?,
        )),
        3 => Ok(Color::Rgb(
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        )),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_overrides_piece_colour() {
        let map = parse_theme_file(
            r##"
            # comment
            theme[piece_t]='#010203'
            theme[main_fg]="#FFF"
            "##,
        );
        let theme = Theme::from_map(&map);
        assert_eq!(theme.piece_color(PieceKind::TShape), Color::Rgb(1, 2, 3));
        assert_eq!(theme.main_fg, Color::Rgb(255, 255, 255));
        assert_eq!(theme.piece_color(PieceKind::Square), Color::Rgb(0x58, 0xAF, 0xD1));
    }
}
