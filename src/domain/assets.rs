/// Asset manifest: named sprite identifiers mapped to file paths.
///
/// The terminal renderer cannot draw the image files themselves, so every
/// asset also carries a small piece of built-in art. The manifest still
/// records (and checks) the configured paths so a graphical front end
/// could pick them up unchanged.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AssetId {
    Player,
    Ladder,
    BrickWall,
    Key,
    InterestRates,
    Bankers,
    Joker,
    HouseBuilders,
    Logo,
}

impl AssetId {
    pub const ALL: [AssetId; 9] = [
        AssetId::Player,
        AssetId::Ladder,
        AssetId::BrickWall,
        AssetId::Key,
        AssetId::InterestRates,
        AssetId::Bankers,
        AssetId::Joker,
        AssetId::HouseBuilders,
        AssetId::Logo,
    ];

    /// Identifier used in `[assets]` of config.toml.
    pub fn name(self) -> &'static str {
        match self {
            AssetId::Player => "player",
            AssetId::Ladder => "ladder",
            AssetId::BrickWall => "brickwall",
            AssetId::Key => "key",
            AssetId::InterestRates => "interestrates",
            AssetId::Bankers => "bankers",
            AssetId::Joker => "joker",
            AssetId::HouseBuilders => "houseBuilders",
            AssetId::Logo => "logo",
        }
    }

    pub fn from_name(s: &str) -> Option<AssetId> {
        Self::ALL.iter().copied().find(|a| a.name().eq_ignore_ascii_case(s))
    }

    pub fn default_path(self) -> &'static str {
        match self {
            AssetId::Player => "assets/player.png",
            AssetId::Ladder => "assets/ladder.png",
            AssetId::BrickWall => "assets/brickwall.png",
            AssetId::Key => "assets/key.png",
            AssetId::InterestRates => "assets/interestrates.jpg",
            AssetId::Bankers => "assets/bankers.jpg",
            AssetId::Joker => "assets/joker.webp",
            AssetId::HouseBuilders => "assets/HouseBuilders.jpg",
            AssetId::Logo => "assets/logo.png",
        }
    }

    /// Built-in terminal art, one string per row.
    pub fn art(self) -> &'static [&'static str] {
        match self {
            AssetId::Player => &[" o ", "/|\\", "/ \\"],
            AssetId::Ladder => &["|-|", "|-|", "|-|", "|-|"],
            AssetId::BrickWall => &["[__]"],
            AssetId::Key => &["o-m"],
            AssetId::InterestRates => &[
                "  %%%%%%%  ",
                " %  ^ ^  % ",
                " %   7%  % ",
                "  %%%%%%%  ",
            ],
            AssetId::Bankers => &[
                "  _[$$]_  ",
                " ( -  - ) ",
                "  \\ == /  ",
                "  /|$$|\\  ",
            ],
            AssetId::Joker => &[
                "  /\\/\\/\\  ",
                " ( O  O ) ",
                "  \\ \\_/ / ",
                "   \\___/  ",
            ],
            AssetId::HouseBuilders => &[
                "    /\\    ",
                "   /  \\   ",
                "  | [] |  ",
                "  |_##_|  ",
            ],
            AssetId::Logo => &["KK"],
        }
    }
}

/// Resolved asset paths.
#[derive(Clone, Debug)]
pub struct AssetManifest {
    paths: HashMap<AssetId, PathBuf>,
}

impl AssetManifest {
    /// Defaults for every id, overridden by any recognised entries.
    /// Unknown names are returned so the caller can report them.
    pub fn with_overrides<'a>(
        overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> (Self, Vec<String>) {
        let mut paths: HashMap<AssetId, PathBuf> = AssetId::ALL
            .iter()
            .map(|&id| (id, PathBuf::from(id.default_path())))
            .collect();
        let mut unknown = Vec::new();
        for (name, path) in overrides {
            match AssetId::from_name(name) {
                Some(id) => { paths.insert(id, PathBuf::from(path)); }
                None => unknown.push(name.to_string()),
            }
        }
        (AssetManifest { paths }, unknown)
    }

    pub fn path(&self, id: AssetId) -> &Path {
        // Every id is inserted at construction.
        self.paths.get(&id).map(PathBuf::as_path).unwrap_or_else(|| Path::new(id.default_path()))
    }

    /// Ids whose file cannot be found relative to `base`.
    pub fn missing(&self, base: &Path) -> Vec<AssetId> {
        AssetId::ALL
            .iter()
            .copied()
            .filter(|&id| {
                let p = self.path(id);
                let full = if p.is_absolute() { p.to_path_buf() } else { base.join(p) };
                !full.is_file()
            })
            .collect()
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::with_overrides(std::iter::empty()).0
    }
}
