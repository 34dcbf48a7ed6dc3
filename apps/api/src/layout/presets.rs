//! Contact-sheet grid presets.
//!
//! A preset is selected by a short key naming how many images go on one page.
//! Unrecognized keys resolve to the 4-image grid.

use serde::{Deserialize, Serialize};

/// The fixed set of grid layouts a contact sheet can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutPreset {
    /// 1 column × 1 row.
    Single,
    /// 2 columns × 1 row.
    Pair,
    /// 2 columns × 2 rows. Default for unknown keys.
    Quad,
    /// 2 columns × 3 rows.
    Six,
    /// 2 columns × 4 rows.
    Eight,
}

impl LayoutPreset {
    pub const DEFAULT: LayoutPreset = LayoutPreset::Quad;

    pub const ALL: [LayoutPreset; 5] = [
        LayoutPreset::Single,
        LayoutPreset::Pair,
        LayoutPreset::Quad,
        LayoutPreset::Six,
        LayoutPreset::Eight,
    ];

    /// Parses an exact preset key. Returns `None` for anything else.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "1" => Some(LayoutPreset::Single),
            "2" => Some(LayoutPreset::Pair),
            "4" => Some(LayoutPreset::Quad),
            "6" => Some(LayoutPreset::Six),
            "8" => Some(LayoutPreset::Eight),
            _ => None,
        }
    }

    /// Resolves a key, falling back to [`LayoutPreset::DEFAULT`].
    pub fn from_key(key: &str) -> Self {
        Self::parse(key).unwrap_or(Self::DEFAULT)
    }

    pub fn key(self) -> &'static str {
        match self {
            LayoutPreset::Single => "1",
            LayoutPreset::Pair => "2",
            LayoutPreset::Quad => "4",
            LayoutPreset::Six => "6",
            LayoutPreset::Eight => "8",
        }
    }

    pub fn columns(self) -> usize {
        match self {
            LayoutPreset::Single => 1,
            LayoutPreset::Pair | LayoutPreset::Quad | LayoutPreset::Six | LayoutPreset::Eight => 2,
        }
    }

    pub fn rows(self) -> usize {
        match self {
            LayoutPreset::Single | LayoutPreset::Pair => 1,
            LayoutPreset::Quad => 2,
            LayoutPreset::Six => 3,
            LayoutPreset::Eight => 4,
        }
    }

    pub fn images_per_page(self) -> usize {
        self.columns() * self.rows()
    }
}

impl Default for LayoutPreset {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_resolve() {
        assert_eq!(LayoutPreset::from_key("1"), LayoutPreset::Single);
        assert_eq!(LayoutPreset::from_key("2"), LayoutPreset::Pair);
        assert_eq!(LayoutPreset::from_key("4"), LayoutPreset::Quad);
        assert_eq!(LayoutPreset::from_key("6"), LayoutPreset::Six);
        assert_eq!(LayoutPreset::from_key("8"), LayoutPreset::Eight);
    }

    #[test]
    fn test_unknown_keys_fall_back_to_quad() {
        for key in ["99", "", "3", " 4", "four"] {
            assert_eq!(LayoutPreset::from_key(key), LayoutPreset::Quad, "key {key:?}");
            assert!(LayoutPreset::parse(key).is_none());
        }
    }

    #[test]
    fn test_grid_matches_images_per_page() {
        for preset in LayoutPreset::ALL {
            assert_eq!(preset.columns() * preset.rows(), preset.images_per_page());
            assert_eq!(preset.key().parse::<usize>().ok(), Some(preset.images_per_page()));
            assert_eq!(LayoutPreset::from_key(preset.key()), preset);
        }
    }

    #[test]
    fn test_grid_shapes() {
        let shapes: Vec<(usize, usize)> = LayoutPreset::ALL
            .iter()
            .map(|p| (p.columns(), p.rows()))
            .collect();
        assert_eq!(shapes, vec![(1, 1), (2, 1), (2, 2), (2, 3), (2, 4)]);
    }
}
