use serde::{Deserialize, Serialize};

/// Terrain category assigned to a cell by the classifier.
///
/// The set is fixed; which noise bands map to which category is configured
/// separately through a threshold table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Water,
    Plains,
    Forest,
    Pines,
    Mountain,
}

impl Terrain {
    /// Every category, ordered from lowest to highest band.
    pub const ALL: [Terrain; 5] = [
        Terrain::Water,
        Terrain::Plains,
        Terrain::Forest,
        Terrain::Pines,
        Terrain::Mountain,
    ];

    /// Default sprite identifier for this category.
    pub fn sprite(self) -> &'static str {
        match self {
            Terrain::Water => "sprites/Water.png",
            Terrain::Plains => "sprites/g.png",
            Terrain::Forest => "sprites/s.png",
            Terrain::Pines => "sprites/bush.png",
            Terrain::Mountain => "sprites/t.png",
        }
    }

    /// Single character used by text renderers.
    pub fn glyph(self) -> char {
        match self {
            Terrain::Water => '~',
            Terrain::Plains => '.',
            Terrain::Forest => '"',
            Terrain::Pines => '^',
            Terrain::Mountain => 'A',
        }
    }

    /// Flat RGBA colour used when no sprite art is available.
    pub fn swatch(self) -> [u8; 4] {
        match self {
            Terrain::Water => [38, 92, 196, 255],
            Terrain::Plains => [124, 184, 72, 255],
            Terrain::Forest => [46, 122, 46, 255],
            Terrain::Pines => [24, 84, 52, 255],
            Terrain::Mountain => [128, 120, 112, 255],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Water => "water",
            Terrain::Plains => "plains",
            Terrain::Forest => "forest",
            Terrain::Pines => "pines",
            Terrain::Mountain => "mountain",
        }
    }
}

impl std::fmt::Display for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn glyphs_and_sprites_are_distinct() {
        let glyphs: HashSet<char> = Terrain::ALL.iter().map(|t| t.glyph()).collect();
        let sprites: HashSet<&str> = Terrain::ALL.iter().map(|t| t.sprite()).collect();
        assert_eq!(glyphs.len(), Terrain::ALL.len());
        assert_eq!(sprites.len(), Terrain::ALL.len());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Terrain::Mountain).unwrap();
        assert_eq!(json, "\"mountain\"");
        let back: Terrain = serde_json::from_str("\"pines\"").unwrap();
        assert_eq!(back, Terrain::Pines);
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(Terrain::Water.to_string(), "water");
    }
}
