//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::game::ColorId;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Theme keys for the piece colours, indexed by `ColorId`.
const PIECE_KEYS: [&str; 7] = [
    "piece_i", "piece_j", "piece_l", "piece_o", "piece_s", "piece_t", "piece_z",
];

/// Neon defaults: I, J, L, O, S, T, Z.
const NEON_PIECES: [Color; 7] = [
    rgb(0xFF007F),
    rgb(0x7B2CBF),
    rgb(0xC9184A),
    rgb(0xFF70A6),
    rgb(0x9D4EDD),
    rgb(0x5A189A),
    rgb(0x3C096C),
];

const HIGH_CONTRAST_PIECES: [Color; 7] = [
    rgb(0x00FFFF),
    rgb(0x0088FF),
    rgb(0xFF8800),
    rgb(0xFFFF00),
    rgb(0x00FF00),
    rgb(0xFF00FF),
    rgb(0xFF0000),
];

/// Okabe-Ito based; no red/green pair relies on hue alone.
const COLORBLIND_PIECES: [Color; 7] = [
    rgb(0x56B4E9),
    rgb(0x0072B2),
    rgb(0xE69F00),
    rgb(0xF0E442),
    rgb(0x009E73),
    rgb(0xCC79A7),
    rgb(0xD55E00),
];

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Piece palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours indexed by `ColorId` (I, J, L, O, S, T, Z).
    pub pieces: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, lines).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (key help).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::neon_default()
    }
}

impl Theme {
    /// Pink/purple neon on slate.
    pub fn neon_default() -> Self {
        Self {
            pieces: NEON_PIECES,
            bg: rgb(0x0F172A),
            div_line: rgb(0x334155),
            main_fg: rgb(0x94A3B8),
            title: rgb(0xEC4899),
            inactive_fg: rgb(0x64748B),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to defaults if path is None or the file is missing.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map)?;
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::neon_default();
        t.apply_palette(palette);
        t
    }

    /// Override piece colours for high-contrast or colorblind.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => self.pieces = HIGH_CONTRAST_PIECES,
            crate::Palette::Colorblind => self.pieces = COLORBLIND_PIECES,
        }
    }

    /// Missing keys keep their default; a present key with a bad value is an error.
    fn from_map(map: &HashMap<String, String>) -> Result<Self, ThemeError> {
        let get = |key: &str, fallback: Color| -> Result<Color, ThemeError> {
            map.get(key).map_or(Ok(fallback), |v| parse_hex(v))
        };
        let defaults = Self::neon_default();
        let mut pieces = defaults.pieces;
        for (slot, key) in pieces.iter_mut().zip(PIECE_KEYS) {
            *slot = get(key, *slot)?;
        }
        Ok(Self {
            pieces,
            bg: get("meter_bg", defaults.bg)?,
            div_line: get("div_line", defaults.div_line)?,
            main_fg: get("main_fg", defaults.main_fg)?,
            title: get("title", defaults.title)?,
            inactive_fg: get("inactive_fg", defaults.inactive_fg)?,
        })
    }

    /// Colour for a locked cell or piece.
    #[inline]
    pub fn piece_color(&self, id: ColorId) -> Color {
        self.pieces[(id.0 as usize) % self.pieces.len()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    if !s.is_ascii() {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&s[range], 16).map_err(|_| invalid())
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#FF007F").unwrap();
        assert!(matches!(c, Color::Rgb(0xFF, 0x00, 0x7F)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(matches!(parse_hex("#12345"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("#GGGGGG"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("#ééé"), Err(ThemeError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_from_map_overrides_only_present_keys() {
        let map = parse_theme_file(
            "# comment\ntheme[piece_o]=\"#00FF00\"\ntheme[title]='#123'\n",
        );
        let theme = Theme::from_map(&map).unwrap();
        assert_eq!(theme.piece_color(ColorId(3)), Color::Rgb(0, 255, 0));
        assert_eq!(theme.title, Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(theme.piece_color(ColorId(0)), NEON_PIECES[0]);
        assert_eq!(theme.bg, Theme::neon_default().bg);
    }

    #[test]
    fn test_from_map_bad_value_is_error() {
        let map = parse_theme_file("theme[piece_i]=\"nope\"");
        assert!(Theme::from_map(&map).is_err());
    }

    #[test]
    fn test_palettes_replace_piece_colours() {
        let mut theme = Theme::default();
        theme.apply_palette(crate::Palette::Colorblind);
        assert_eq!(theme.pieces, COLORBLIND_PIECES);
        theme.apply_palette(crate::Palette::Normal);
        assert_eq!(theme.pieces, COLORBLIND_PIECES);
        assert_eq!(Theme::default_for_palette(crate::Palette::HighContrast).pieces, HIGH_CONTRAST_PIECES);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let theme = Theme::load(
            Some(Path::new("/nonexistent/blockstack.theme")),
            crate::Palette::Normal,
        )
        .unwrap();
        assert_eq!(theme.pieces, NEON_PIECES);
    }
}
