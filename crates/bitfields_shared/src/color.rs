//! # Palette Colors
//!
//! Palettes arrive as hex strings from the catalog. They are parsed once per
//! build into [`Color`] values; position in the [`Palette`] is the palette
//! index written into the color-id volume.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Black, used for unused GPU palette slots.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Creates a color from 8-bit channels.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`, `#rgb`, or either form without the leading `#`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidColor`] for any other shape.
    pub fn parse_hex(text: &str) -> ConfigResult<Self> {
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let invalid = || ConfigError::InvalidColor(text.to_owned());

        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match digits.len() {
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                // #abc expands to #aabbcc
                let r = channel(&digits[0..1])?;
                let g = channel(&digits[1..2])?;
                let b = channel(&digits[2..3])?;
                Ok(Self::rgb(r * 17, g * 17, b * 17))
            }
            _ => Err(invalid()),
        }
    }

    /// Lowercase `#rrggbb` form.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels in `[0, 1]`, still sRGB encoded.
    #[inline]
    #[must_use]
    pub fn to_srgb_f32(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    /// Linear-light channels.
    ///
    /// The ray marcher gamma-encodes its output with `1/2.2`, so palette
    /// uploads are decoded with the matching `2.2` power.
    #[inline]
    #[must_use]
    pub fn to_linear_f32(self) -> [f32; 3] {
        self.to_srgb_f32().map(|c| c.powf(2.2))
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A named, ordered list of colors.
///
/// Index `i` colors every cell whose state is `transparent + i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Catalog name, used in stats and export file names.
    pub name: String,
    /// Colors in palette-index order.
    pub colors: Vec<Color>,
}

impl Palette {
    /// Creates a palette from parsed colors.
    #[must_use]
    pub fn new(name: impl Into<String>, colors: Vec<Color>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// Parses a palette from catalog hex strings.
    ///
    /// # Errors
    ///
    /// Fails on the first color that is not valid hex.
    pub fn from_hex<S: AsRef<str>>(name: impl Into<String>, colors: &[S]) -> ConfigResult<Self> {
        let colors = colors
            .iter()
            .map(|c| Color::parse_hex(c.as_ref()))
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self::new(name, colors))
    }

    /// Number of colors.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns true when the palette has no colors.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Clamps a raw palette offset (`state - transparent`) into
    /// `[0, len - 1]`. An empty palette clamps to 0.
    #[inline]
    #[must_use]
    pub fn clamp_index(&self, raw: i64) -> u8 {
        let last = self.colors.len().saturating_sub(1);
        let last = i64::try_from(last).unwrap_or(i64::MAX);
        u8::try_from(raw.clamp(0, last)).unwrap_or(u8::MAX)
    }

    /// Color at a palette index, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, index: u8) -> Option<Color> {
        self.colors.get(usize::from(index)).copied()
    }

    /// Colors joined as `#rrggbb,#rrggbb,...`.
    #[must_use]
    pub fn joined_hex(&self) -> String {
        self.colors
            .iter()
            .map(|c| c.to_hex())
            .collect::<Vec<_>>()
            .join(",")
    }
}
