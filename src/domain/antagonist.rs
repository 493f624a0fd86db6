/// Antagonists: the four obstacles flashed on screen whenever the ladder
/// escapes. Each maps to a label and an image asset.

use rand::Rng;

use super::assets::AssetId;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AntagonistKind {
    InterestRates,
    Banks,
    HouseBuilders,
    Inflation,
}

impl AntagonistKind {
    pub const ALL: [AntagonistKind; 4] = [
        AntagonistKind::InterestRates,
        AntagonistKind::Banks,
        AntagonistKind::HouseBuilders,
        AntagonistKind::Inflation,
    ];

    /// Text shown above the image.
    pub fn label(self) -> &'static str {
        match self {
            AntagonistKind::InterestRates => "Interest Rates",
            AntagonistKind::Banks => "Banks",
            AntagonistKind::HouseBuilders => "House Builders",
            AntagonistKind::Inflation => "Inflation",
        }
    }

    pub fn asset(self) -> AssetId {
        match self {
            AntagonistKind::InterestRates => AssetId::InterestRates,
            AntagonistKind::Banks => AssetId::Bankers,
            AntagonistKind::HouseBuilders => AssetId::HouseBuilders,
            AntagonistKind::Inflation => AssetId::Joker,
        }
    }

    /// Uniform pick over all four kinds.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> AntagonistKind {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}
