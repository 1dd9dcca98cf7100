//! Rendering configuration.
//!
//! The JSON surface uses upper-case keys grouped under `PATHS`,
//! `PAGE_LAYOUT`, `COLORS`, `TABLE` and `CODE_BLOCK`. Every key is optional
//! and unknown keys are ignored. A `Config` is an immutable value handed to
//! the renderer and paginator at construction time.

use std::fmt;
use std::path::PathBuf;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Full configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Config {
    pub paths: Paths,
    pub page_layout: PageLayout,
    pub colors: Colors,
    pub table: TableStyle,
    pub code_block: CodeBlockStyle,
}

impl Config {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty-printed JSON for this config, as written on first run.
    pub fn to_json_pretty(&self) -> String {
        // Every field is a plain string, number or option; this cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Check that the page geometry leaves room for content.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.page_layout;
        if layout.image_width == 0 || layout.image_height == 0 {
            return Err(ConfigError::InvalidLayout(
                "image width and height must be non-zero".into(),
            ));
        }
        if layout.top_margin + layout.bottom_margin >= layout.image_height {
            return Err(ConfigError::InvalidLayout(format!(
                "top ({}) and bottom ({}) margins leave no room in a {}px tall page",
                layout.top_margin, layout.bottom_margin, layout.image_height
            )));
        }
        if layout.left_margin + layout.right_margin >= layout.image_width {
            return Err(ConfigError::InvalidLayout(format!(
                "left ({}) and right ({}) margins leave no room in a {}px wide page",
                layout.left_margin, layout.right_margin, layout.image_width
            )));
        }
        if layout.max_line_chars == Some(0) {
            return Err(ConfigError::InvalidLayout(
                "MAX_LINE_CHARS must be at least 1".into(),
            ));
        }
        for (name, factor) in [
            ("TABLE.SCALE_FACTOR", self.table.scale_factor),
            ("CODE_BLOCK.SCALE_FACTOR", self.code_block.scale_factor),
        ] {
            if !(factor.is_finite() && factor > 0.0) {
                return Err(ConfigError::InvalidLayout(format!(
                    "{name} must be a positive number, got {factor}"
                )));
            }
        }
        Ok(())
    }
}

/// Background images and the font file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Paths {
    pub default_page: Option<PathBuf>,
    pub title_page: Option<PathBuf>,
    pub final_page: Option<PathBuf>,
    pub question_page: Option<PathBuf>,
    pub font: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            default_page: None,
            title_page: None,
            final_page: None,
            question_page: None,
            font: PathBuf::from(DEFAULT_FONT),
        }
    }
}

pub const DEFAULT_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

/// Page geometry in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct PageLayout {
    pub image_width: u32,
    pub image_height: u32,
    pub top_margin: u32,
    pub bottom_margin: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    pub list_line_height: u32,
    /// Added to the 1-based page index when drawing page numbers.
    pub start_index: i64,
    /// Pre-wrap plain paragraphs to this many characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_line_chars: Option<usize>,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            image_width: 1080,
            image_height: 1080,
            top_margin: 250,
            bottom_margin: 250,
            left_margin: 80,
            right_margin: 80,
            list_line_height: 20,
            start_index: 0,
            max_line_chars: None,
        }
    }
}

impl PageLayout {
    /// Width available for content between the side margins.
    pub fn text_width(&self) -> u32 {
        self.image_width
            .saturating_sub(self.left_margin)
            .saturating_sub(self.right_margin)
    }

    /// Lowest y a committed block may reach.
    pub fn content_bottom(&self) -> u32 {
        self.image_height.saturating_sub(self.bottom_margin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Colors {
    pub text: HexColor,
    pub background: HexColor,
    pub highlight: HexColor,
    pub page_number_font: HexColor,
    pub link: HexColor,
    pub italic: HexColor,
    pub code: HexColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_start: Option<HexColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_end: Option<HexColor>,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            text: HexColor::rgb(0xFF, 0xFF, 0xFF),
            background: HexColor::rgb(0x00, 0x00, 0x00),
            highlight: HexColor::rgb(0xFF, 0xB8, 0x00),
            page_number_font: HexColor::rgb(0x29, 0x29, 0x29),
            link: HexColor::rgb(0x4E, 0xA1, 0xFF),
            italic: HexColor::rgb(0xB0, 0xB0, 0xB0),
            code: HexColor::rgb(0x7E, 0xE7, 0x87),
            gradient_start: None,
            gradient_end: None,
        }
    }
}

impl Colors {
    /// Both gradient stops, when configured.
    pub fn gradient(&self) -> Option<(Rgba<u8>, Rgba<u8>)> {
        match (&self.gradient_start, &self.gradient_end) {
            (Some(start), Some(end)) => Some((start.to_rgba(), end.to_rgba())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct TableStyle {
    pub scale_factor: f32,
    pub foreground: HexColor,
    pub background: HexColor,
    pub header_bg_color: HexColor,
    pub header_fg_color: HexColor,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            foreground: HexColor::rgb(0xFF, 0xFF, 0xFF),
            background: HexColor::rgb(0x29, 0x29, 0x29),
            header_bg_color: HexColor::rgb(0x40, 0x40, 0x40),
            header_fg_color: HexColor::rgb(0xFF, 0xB8, 0x00),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct CodeBlockStyle {
    pub scale_factor: f32,
    pub background: HexColor,
    pub radius: u32,
    pub top_padding: u32,
    /// Name of a bundled syntax highlighting theme.
    pub theme: String,
}

impl Default for CodeBlockStyle {
    fn default() -> Self {
        Self {
            scale_factor: 2.0,
            background: HexColor::rgb(0x1E, 0x1E, 0x1E),
            radius: 20,
            top_padding: 50,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

// ------------------------------------------------------------------
// Colours
// ------------------------------------------------------------------

/// An RGBA colour written as `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor([u8; 4]);

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        HexColor([r, g, b, 0xFF])
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        HexColor([r, g, b, a])
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba(self.0)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidColor(raw.to_string());
        let digits = raw.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).map(|n| n * 0x11);
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);

        let channels = match digits.len() {
            3 => [nibble(0), nibble(1), nibble(2), Ok(0xFF)],
            4 => [nibble(0), nibble(1), nibble(2), nibble(3)],
            6 => [byte(0), byte(2), byte(4), Ok(0xFF)],
            8 => [byte(0), byte(2), byte(4), byte(6)],
            _ => return Err(invalid()),
        };

        let mut rgba = [0u8; 4];
        for (slot, channel) in rgba.iter_mut().zip(channels) {
            *slot = channel.map_err(|_| invalid())?;
        }
        Ok(HexColor(rgba))
    }
}

impl TryFrom<String> for HexColor {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexColor::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 0xFF {
            write!(f, "#{r:02X}{g:02X}{b:02X}")
        } else {
            write!(f, "#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.page_layout.image_width, 1080);
        assert_eq!(config.page_layout.top_margin, 250);
        assert_eq!(config.code_block.scale_factor, 2.0);
        assert_eq!(config.code_block.theme, "base16-ocean.dark");
    }

    #[test]
    fn partial_groups_keep_other_defaults() {
        let raw = r##"{
            "PAGE_LAYOUT": { "IMAGE_WIDTH": 800, "IMAGE_HEIGHT": 600, "TOP_MARGIN": 50, "BOTTOM_MARGIN": 50 },
            "COLORS": { "TEXT": "#333", "GRADIENT_START": "#000000", "GRADIENT_END": "#ffffff80" },
            "PATHS": { "TITLE_PAGE": "title.png" },
            "SOMETHING_ELSE": true
        }"##;
        let config = Config::from_json_str(raw).unwrap();

        assert_eq!(config.page_layout.image_width, 800);
        assert_eq!(config.page_layout.left_margin, 80);
        assert_eq!(config.colors.text, HexColor::rgb(0x33, 0x33, 0x33));
        assert_eq!(config.colors.highlight, Colors::default().highlight);
        assert_eq!(
            config.colors.gradient(),
            Some((Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 0x80])))
        );
        assert_eq!(config.paths.title_page, Some(PathBuf::from("title.png")));
        assert_eq!(config.paths.font, PathBuf::from(DEFAULT_FONT));
    }

    #[test]
    fn hex_colour_forms() {
        assert_eq!(HexColor::parse("#fff").unwrap(), HexColor::rgb(255, 255, 255));
        assert_eq!(HexColor::parse("#1234").unwrap(), HexColor::rgba(0x11, 0x22, 0x33, 0x44));
        assert_eq!(HexColor::parse("#292929").unwrap(), HexColor::rgb(0x29, 0x29, 0x29));
        assert_eq!(
            HexColor::parse("#0000007F").unwrap().to_rgba(),
            Rgba([0, 0, 0, 0x7F])
        );
    }

    #[test]
    fn invalid_colours_are_rejected() {
        for raw in ["fff", "#ff", "#12345", "#gggggg", "#", "#ééé"] {
            assert_eq!(
                HexColor::parse(raw),
                Err(ConfigError::InvalidColor(raw.to_string())),
                "{raw}"
            );
        }
        let err = Config::from_json_str(r#"{"COLORS": {"TEXT": "red"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(msg) if msg.contains("red")));
    }

    #[test]
    fn colour_display_round_trips() {
        for raw in ["#FFB800", "#00000080"] {
            assert_eq!(HexColor::parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn validate_rejects_impossible_layouts() {
        let mut config = Config::default();
        config.page_layout.top_margin = 600;
        config.page_layout.bottom_margin = 600;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLayout(_))));

        let mut config = Config::default();
        config.page_layout.image_width = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.table.scale_factor = 0.0;
        assert!(config.validate().is_err());

        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn defaults_serialise_with_upper_case_keys() {
        let json = Config::default().to_json_pretty();
        assert!(json.contains("\"PAGE_LAYOUT\""));
        assert!(json.contains("\"IMAGE_WIDTH\": 1080"));
        assert!(json.contains("\"HEADER_BG_COLOR\""));
        assert!(!json.contains("GRADIENT_START"));
        let reparsed = Config::from_json_str(&json).unwrap();
        assert_eq!(reparsed, Config::default());
    }
}
