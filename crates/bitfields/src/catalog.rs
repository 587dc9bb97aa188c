//! # Palette Catalog
//!
//! Named palettes grouped by color count. JSON form:
//!
//! ```json
//! {
//!   "3": [ { "name": "ember", "colors": ["#ff4400", "cc2200", "#331100"] } ],
//!   "5": [ ... ]
//! }
//! ```
//!
//! Color strings may omit the leading `#`.

use std::collections::BTreeMap;
use std::path::Path;

use bitfields_shared::Palette;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One named palette as stored in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Display name.
    pub name: String,
    /// Hex colors, in palette order.
    pub colors: Vec<String>,
}

impl PaletteEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(name: impl Into<String>, colors: &[&str]) -> Self {
        Self {
            name: name.into(),
            colors: colors.iter().map(|&c| c.to_owned()).collect(),
        }
    }

    /// Parses the colors into a [`Palette`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyPalette`] for an entry with no colors, or
    /// [`EngineError::Config`] for a malformed color string.
    pub fn to_palette(&self) -> EngineResult<Palette> {
        if self.colors.is_empty() {
            return Err(EngineError::EmptyPalette {
                name: self.name.clone(),
            });
        }
        Ok(Palette::from_hex(self.name.clone(), &self.colors)?)
    }
}

/// Source of palettes by filled-state count.
pub trait PaletteCatalog: Send + Sync {
    /// Palettes with exactly `filled` colors. Empty if there are none.
    fn palettes(&self, filled: u32) -> &[PaletteEntry];
}

/// Catalog held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryCatalog {
    entries: BTreeMap<u32, Vec<PaletteEntry>>,
}

impl MemoryCatalog {
    /// Empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a palette under `filled`.
    pub fn insert(&mut self, filled: u32, entry: PaletteEntry) {
        self.entries.entry(filled).or_default().push(entry);
    }

    /// Adds a palette under its own color count.
    #[must_use]
    pub fn with(mut self, entry: PaletteEntry) -> Self {
        let filled = u32::try_from(entry.colors.len()).unwrap_or(u32::MAX);
        self.insert(filled, entry);
        self
    }

    /// Parses a JSON catalog.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Json`] for malformed JSON, or
    /// [`EngineError::PaletteSizeMismatch`] when a palette's color count
    /// differs from the key it is listed under.
    pub fn from_json_str(text: &str) -> EngineResult<Self> {
        let catalog: Self = serde_json::from_str(text)?;
        for (&filled, list) in &catalog.entries {
            if let Some(entry) = list.iter().find(|e| e.colors.len() != filled as usize) {
                return Err(EngineError::PaletteSizeMismatch {
                    name: entry.name.clone(),
                    listed: filled,
                    colors: entry.colors.len(),
                });
            }
        }
        tracing::debug!(palettes = catalog.len(), "palette catalog parsed");
        Ok(catalog)
    }

    /// Reads a JSON catalog from disk.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Total number of palettes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Returns true if the catalog holds no palettes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PaletteCatalog for MemoryCatalog {
    fn palettes(&self, filled: u32) -> &[PaletteEntry] {
        self.entries.get(&filled).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitfields_shared::Color;

    const JSON: &str = r##"{
        "2": [ { "name": "duo", "colors": ["#000000", "ffffff"] } ],
        "3": [
            { "name": "rgb", "colors": ["#f00", "#0f0", "#00f"] },
            { "name": "ember", "colors": ["ff4400", "cc2200", "331100"] }
        ]
    }"##;

    #[test]
    fn test_json_keys_are_filled_counts() {
        let catalog = MemoryCatalog::from_json_str(JSON).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.palettes(2).len(), 1);
        assert_eq!(catalog.palettes(3)[1].name, "ember");
        assert!(catalog.palettes(7).is_empty());
    }

    #[test]
    fn test_colors_without_hash_parse() {
        let catalog = MemoryCatalog::from_json_str(JSON).unwrap();
        let palette = catalog.palettes(2)[0].to_palette().unwrap();
        assert_eq!(palette.colors, vec![Color::BLACK, Color::rgb(255, 255, 255)]);
        assert_eq!(palette.joined_hex(), "#000000,#ffffff");
    }

    #[test]
    fn test_empty_entry_rejected() {
        let entry = PaletteEntry::new("nothing", &[]);
        assert!(matches!(
            entry.to_palette(),
            Err(EngineError::EmptyPalette { name }) if name == "nothing"
        ));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            MemoryCatalog::from_json_str("{ \"2\": [ { \"name\": 1 } ] }"),
            Err(EngineError::Json(_))
        ));
    }

    #[test]
    fn test_mismatched_key_rejected() {
        let json = r##"{ "3": [ { "name": "short", "colors": ["#000", "#fff"] } ] }"##;
        assert!(matches!(
            MemoryCatalog::from_json_str(json),
            Err(EngineError::PaletteSizeMismatch { name, listed: 3, colors: 2 }) if name == "short"
        ));
    }

    #[test]
    fn test_with_keys_by_color_count() {
        let catalog = MemoryCatalog::new().with(PaletteEntry::new("rg", &["#ff0000", "#00ff00"]));
        assert_eq!(catalog.palettes(2)[0].name, "rg");
    }
}
