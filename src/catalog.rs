//! Static data packaged with the app: bundled headshots and highlight
//! clips, the NBA team list and the featured hosted highlights.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use std::collections::HashMap;

use crate::models::{MediaKind, Player, PlayerRecord};

/// A media file packaged with the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BundledAsset {
    pub kind: MediaKind,
    /// Name stored on player records
    pub file_name: &'static str,
    /// Location inside the app bundle
    pub path: &'static str,
}

const fn headshot(file_name: &'static str, path: &'static str) -> BundledAsset {
    BundledAsset {
        kind: MediaKind::Photo,
        file_name,
        path,
    }
}

const fn clip(file_name: &'static str, path: &'static str) -> BundledAsset {
    BundledAsset {
        kind: MediaKind::Video,
        file_name,
        path,
    }
}

pub const BUNDLED_HEADSHOTS: &[BundledAsset] = &[
    headshot("Terry_Dalen.png", "assets/HEADSHOTS/Terry_Dalen.png"),
    headshot("Essengue_Noa.png", "assets/HEADSHOTS/Essengue_Noa.png"),
    headshot("Jones_Tre.png", "assets/HEADSHOTS/Jones_Tre.png"),
    headshot("Phillips_Julian.png", "assets/HEADSHOTS/Phillips_Julian.png"),
    headshot("Smith_Jalen.png", "assets/HEADSHOTS/Smith_Jalen.png"),
    headshot("Collins_Zach.png", "assets/HEADSHOTS/Collins_Zach.png"),
    headshot("Dosunmu_Ayo.png", "assets/HEADSHOTS/Dosunmu_Ayo.png"),
    headshot("Giddey_Josh.png", "assets/HEADSHOTS/Giddey_Josh.png"),
    headshot("White_Coby.png", "assets/HEADSHOTS/White_Coby.png"),
    headshot("Vucevic_Nikola.png", "assets/HEADSHOTS/Vucevic_Nikola.png"),
];

pub const BUNDLED_CLIPS: &[BundledAsset] = &[
    clip("dalenTerry.mp4", "assets/videos/dalenTerry.mp4"),
    clip("Ayo_Dosunmu.mp4", "assets/videos/Ayo_Dosunmu.mp4"),
    clip("jalenSmith.mp4", "assets/videos/jalenSmith.mp4"),
    clip("julianPhillips.mp4", "assets/videos/julianPhillips.mp4"),
    clip("noaEssengue.mp4", "assets/videos/noaEssengue.mp4"),
    clip("treJones.mp4", "assets/videos/treJones.mp4"),
    clip("Coby_White.mp4", "assets/videos/Coby_White.mp4"),
];

/// Shown in place of a headshot when a record has no usable photo.
pub const PLACEHOLDER_HEADSHOT: &str = "assets/logo.png";

/// Lookup table over the bundled media, keyed by kind and file name.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    entries: HashMap<(MediaKind, &'static str), &'static BundledAsset>,
}

impl AssetRegistry {
    pub fn new(assets: impl IntoIterator<Item = &'static BundledAsset>) -> Self {
        let entries = assets
            .into_iter()
            .map(|asset| ((asset.kind, asset.file_name), asset))
            .collect();
        Self { entries }
    }

    /// The registry of everything packaged with the app.
    pub fn bundled() -> &'static AssetRegistry {
        static REGISTRY: Lazy<AssetRegistry> =
            Lazy::new(|| AssetRegistry::new(BUNDLED_HEADSHOTS.iter().chain(BUNDLED_CLIPS)));
        &REGISTRY
    }

    /// Exact, case-sensitive file name match.
    pub fn lookup(&self, kind: MediaKind, file_name: &str) -> Option<&'static BundledAsset> {
        self.entries.get(&(kind, file_name)).copied()
    }

    pub fn contains(&self, kind: MediaKind, file_name: &str) -> bool {
        self.lookup(kind, file_name).is_some()
    }

    /// File names of one kind, sorted, for the local picker list.
    pub fn names(&self, kind: MediaKind) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .entries
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| *name)
            .collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team {
    pub name: &'static str,
    pub logo: &'static str,
}

const fn team(name: &'static str, logo: &'static str) -> Team {
    Team { name, logo }
}

pub const NBA_TEAMS: &[Team] = &[
    team("Atlanta Hawks", "assets/fotos/logos/atlanta.png"),
    team("Boston Celtics", "assets/fotos/logos/boston.png"),
    team("Brooklyn Nets", "assets/fotos/logos/brooklyn.png"),
    team("Charlotte Hornets", "assets/fotos/logos/charlote.png"),
    team("Chicago Bulls", "assets/fotos/logos/chicago.png"),
    team("Cleveland Cavaliers", "assets/fotos/logos/cleveland.png"),
    team("Dallas Mavericks", "assets/fotos/logos/mavericks.png"),
    team("Denver Nuggets", "assets/fotos/logos/denver.png"),
    team("Detroit Pistons", "assets/fotos/logos/detroit.png"),
    team("Golden State Warriors", "assets/fotos/logos/golden.png"),
    team("Houston Rockets", "assets/fotos/logos/houston.png"),
    team("Indiana Pacers", "assets/fotos/logos/indiana.png"),
    team("LA Clippers", "assets/fotos/logos/clippers.png"),
    team("Los Angeles Lakers", "assets/fotos/logos/lakers.png"),
    team("Memphis Grizzlies", "assets/fotos/logos/memphis.png"),
    team("Miami Heat", "assets/fotos/logos/miami.png"),
    team("Milwaukee Bucks", "assets/fotos/logos/mil.png"),
    team("Minnesota Timberwolves", "assets/fotos/logos/minnesota.png"),
    team("New Orleans Pelicans", "assets/fotos/logos/pelicans.png"),
    team("New York Knicks", "assets/fotos/logos/knicks.png"),
    team("Oklahoma City Thunder", "assets/fotos/logos/okc.png"),
    team("Orlando Magic", "assets/fotos/logos/orlando.png"),
    team("Philadelphia 76ers", "assets/fotos/logos/76.png"),
    team("Phoenix Suns", "assets/fotos/logos/phoenix.png"),
    team("Portland Trail Blazers", "assets/fotos/logos/portland.png"),
    team("Sacramento Kings", "assets/fotos/logos/sacramento.png"),
    team("San Antonio Spurs", "assets/fotos/logos/spurs.png"),
    team("Toronto Raptors", "assets/fotos/logos/toronto.png"),
    team("Utah Jazz", "assets/fotos/logos/jazz.png"),
    team("Washington Wizards", "assets/fotos/logos/wizards.png"),
];

/// Case-insensitive lookup by full team name.
pub fn find_team(name: &str) -> Option<&'static Team> {
    let name = name.trim();
    NBA_TEAMS.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub title: &'static str,
    pub url: &'static str,
}

pub const FEATURED_HIGHLIGHTS: &[Highlight] = &[
    Highlight {
        title: "Nuggets highlights",
        url: "https://www.youtube.com/watch?v=iqunnO8BtHM",
    },
    Highlight {
        title: "Lakers highlights",
        url: "https://www.youtube.com/watch?v=q5WhqF-5vq8",
    },
    Highlight {
        title: "Warriors highlights",
        url: "https://www.youtube.com/watch?v=PDX4-KigsB8",
    },
];

pub fn random_highlight() -> &'static Highlight {
    FEATURED_HIGHLIGHTS
        .choose(&mut rand::thread_rng())
        .unwrap_or(&FEATURED_HIGHLIGHTS[0])
}

/// Bulls roster used to seed the in-memory backend.
pub fn demo_roster() -> Vec<Player> {
    const ROWS: &[(&str, &str, &str, &str, i64, &str, &str)] = &[
        ("demo-ayo", "Ayo", "Dosunmu", "Guard", 25, "Dosunmu_Ayo.png", "Ayo_Dosunmu.mp4"),
        ("demo-coby", "Coby", "White", "Guard", 25, "White_Coby.png", "Coby_White.mp4"),
        ("demo-dalen", "Dalen", "Terry", "Guard", 23, "Terry_Dalen.png", "dalenTerry.mp4"),
        ("demo-jalen", "Jalen", "Smith", "Forward", 25, "Smith_Jalen.png", "jalenSmith.mp4"),
        ("demo-josh", "Josh", "Giddey", "Guard", 22, "Giddey_Josh.png", ""),
        ("demo-julian", "Julian", "Phillips", "Forward", 21, "Phillips_Julian.png", "julianPhillips.mp4"),
        ("demo-nikola", "Nikola", "Vucevic", "Center", 34, "Vucevic_Nikola.png", ""),
        ("demo-noa", "Noa", "Essengue", "Forward", 18, "Essengue_Noa.png", "noaEssengue.mp4"),
        ("demo-tre", "Tre", "Jones", "Guard", 25, "Jones_Tre.png", "treJones.mp4"),
        ("demo-zach", "Zach", "Collins", "Center", 27, "Collins_Zach.png", ""),
    ];

    ROWS.iter()
        .map(|&(id, name, last_name, position, age, headshot, video)| {
            let initials: String = [name, last_name]
                .iter()
                .filter_map(|part| part.chars().next())
                .collect();
            Player::new(
                id,
                PlayerRecord {
                    name: name.to_string(),
                    last_name: last_name.to_string(),
                    position: position.to_string(),
                    age,
                    teams: "Chicago Bulls".to_string(),
                    initials,
                    headshot: headshot.to_string(),
                    video: video.to_string(),
                    ..Default::default()
                },
            )
        })
        .collect()
}
