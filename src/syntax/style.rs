//! Style types for highlighted text
//!
//! Colors are true-color RGBA, font styles are a small bit set, and
//! a [`StyleRange`] ties a resolved [`Style`] to a byte range of the
//! highlighted text.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// An RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    /// Fully transparent; used when a theme has no background
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match digits.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(digits.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 16 + v;
                }
                Some(Color::rgb(out[0], out[1], out[2]))
            }
            6 => Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Color {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => None,
        }
    }

    /// Pack as `0xRRGGBBAA`
    pub fn to_rgba(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// Unpack from `0xRRGGBBAA`
    pub fn from_rgba(rgba: u32) -> Self {
        let [r, g, b, a] = rgba.to_be_bytes();
        Self { r, g, b, a }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Font style bits, combinable with `|`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FontStyle(u32);

impl FontStyle {
    pub const NORMAL: FontStyle = FontStyle(0);
    pub const BOLD: FontStyle = FontStyle(1);
    pub const ITALIC: FontStyle = FontStyle(2);
    pub const UNDERLINE: FontStyle = FontStyle(4);

    const ALL: u32 = 1 | 2 | 4;

    /// Raw bit value, as handed across the C boundary
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build from raw bits, dropping unknown ones
    pub const fn from_bits_truncate(bits: u32) -> Self {
        FontStyle(bits & Self::ALL)
    }

    pub const fn contains(self, other: FontStyle) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_normal(self) -> bool {
        self.0 == 0
    }

    /// Parse a theme font style such as `"bold italic"`
    ///
    /// Words may be separated by spaces or commas; an empty string or
    /// `"normal"` is [`FontStyle::NORMAL`]. Unknown words yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut style = FontStyle::NORMAL;
        for word in s.split(|c: char| c.is_whitespace() || c == ',') {
            match word.to_ascii_lowercase().as_str() {
                "" | "normal" | "regular" => {}
                "bold" => style |= FontStyle::BOLD,
                "italic" => style |= FontStyle::ITALIC,
                "underline" => style |= FontStyle::UNDERLINE,
                _ => return None,
            }
        }
        Some(style)
    }
}

impl BitOr for FontStyle {
    type Output = FontStyle;

    fn bitor(self, rhs: FontStyle) -> FontStyle {
        FontStyle(self.0 | rhs.0)
    }
}

impl BitOrAssign for FontStyle {
    fn bitor_assign(&mut self, rhs: FontStyle) {
        self.0 |= rhs.0;
    }
}

/// A fully resolved text style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub foreground: Color,
    pub background: Color,
    pub font_style: FontStyle,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            foreground: Color::BLACK,
            background: Color::TRANSPARENT,
            font_style: FontStyle::NORMAL,
        }
    }
}

impl Style {
    /// Create a style with foreground and background
    pub fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
            font_style: FontStyle::NORMAL,
        }
    }

    /// Builder: set foreground color
    pub fn with_fg(mut self, color: Color) -> Self {
        self.foreground = color;
        self
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Builder: add font style bits
    pub fn with_font_style(mut self, font_style: FontStyle) -> Self {
        self.font_style |= font_style;
        self
    }

    /// Apply a theme rule's modifier on top of this style
    pub fn apply(self, modifier: &StyleModifier) -> Self {
        Self {
            foreground: modifier.foreground.unwrap_or(self.foreground),
            background: modifier.background.unwrap_or(self.background),
            font_style: modifier.font_style.unwrap_or(self.font_style),
        }
    }
}

/// The partial style a theme rule sets; unset fields inherit the default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleModifier {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub font_style: Option<FontStyle>,
}

impl StyleModifier {
    /// Modifier that only sets the foreground
    pub fn fg(color: Color) -> Self {
        Self {
            foreground: Some(color),
            ..Default::default()
        }
    }

    /// Builder: set font style
    pub fn with_font_style(mut self, font_style: FontStyle) -> Self {
        self.font_style = Some(font_style);
        self
    }

    /// Check if this modifier changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A styled byte range of the highlighted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleRange {
    /// Byte offset where this range starts (inclusive)
    pub start: usize,
    /// Byte offset where this range ends (exclusive)
    pub end: usize,
    /// Style to apply to this range
    pub style: Style,
}

impl StyleRange {
    /// Create a new range
    pub fn new(start: usize, end: usize, style: Style) -> Self {
        Self { start, end, style }
    }

    /// Check if this range contains a byte position
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Get the length of this range in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if range is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(0xff, 0x80, 0x00)));
        assert_eq!(Color::from_hex("ff8000"), Some(Color::rgb(0xff, 0x80, 0x00)));
        assert_eq!(Color::from_hex("#f80"), Some(Color::rgb(0xff, 0x88, 0x00)));
        assert_eq!(
            Color::from_hex("#11223344"),
            Some(Color { r: 0x11, g: 0x22, b: 0x33, a: 0x44 })
        );
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
        assert_eq!(Color::from_hex(""), None);
    }

    #[test]
    fn test_color_rgba_packing() {
        let color = Color { r: 0x12, g: 0x34, b: 0x56, a: 0x78 };
        assert_eq!(color.to_rgba(), 0x1234_5678);
        assert_eq!(Color::from_rgba(0x1234_5678), color);
        assert_eq!(Color::WHITE.to_rgba(), 0xffff_ffff);
    }

    #[test]
    fn test_font_style_bits() {
        let style = FontStyle::BOLD | FontStyle::UNDERLINE;
        assert_eq!(style.bits(), 5);
        assert!(style.contains(FontStyle::BOLD));
        assert!(!style.contains(FontStyle::ITALIC));
        assert_eq!(FontStyle::from_bits_truncate(0xff).bits(), 7);
    }

    #[test]
    fn test_font_style_parse() {
        assert_eq!(FontStyle::parse(""), Some(FontStyle::NORMAL));
        assert_eq!(FontStyle::parse("bold"), Some(FontStyle::BOLD));
        assert_eq!(
            FontStyle::parse("italic, Underline"),
            Some(FontStyle::ITALIC | FontStyle::UNDERLINE)
        );
        assert_eq!(FontStyle::parse("blink"), None);
    }

    #[test]
    fn test_style_apply_modifier() {
        let base = Style::new(Color::BLACK, Color::WHITE);
        let styled = base.apply(&StyleModifier::fg(Color::rgb(1, 2, 3)).with_font_style(FontStyle::BOLD));
        assert_eq!(styled.foreground, Color::rgb(1, 2, 3));
        assert_eq!(styled.background, Color::WHITE);
        assert_eq!(styled.font_style, FontStyle::BOLD);

        assert_eq!(base.apply(&StyleModifier::default()), base);
    }

    #[test]
    fn test_range_contains() {
        let range = StyleRange::new(5, 10, Style::default());
        assert!(!range.contains(4));
        assert!(range.contains(5));
        assert!(range.contains(9));
        assert!(!range.contains(10));
        assert_eq!(range.len(), 5);
    }
}
