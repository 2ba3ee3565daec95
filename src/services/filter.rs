use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Player;
use crate::utils::errors::RosterError;

/// Field the roster search box matches against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCriterion {
    #[default]
    Name,
    Position,
    Age,
}

impl FilterCriterion {
    /// Text of the player's field this criterion compares.
    pub fn field_text(&self, player: &Player) -> String {
        match self {
            FilterCriterion::Name => player.record.full_name(),
            FilterCriterion::Position => player.record.position.clone(),
            FilterCriterion::Age => player.record.age.to_string(),
        }
    }

    pub fn matches(&self, player: &Player, needle: &str) -> bool {
        needle.is_empty() || self.field_text(player).to_lowercase().contains(needle)
    }
}

impl fmt::Display for FilterCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterCriterion::Name => write!(f, "Name"),
            FilterCriterion::Position => write!(f, "Position"),
            FilterCriterion::Age => write!(f, "Age"),
        }
    }
}

impl FromStr for FilterCriterion {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" | "nombre" => Ok(FilterCriterion::Name),
            "position" | "posicion" | "posición" => Ok(FilterCriterion::Position),
            "age" | "edad" => Ok(FilterCriterion::Age),
            other => Err(RosterError::InvalidInput(format!(
                "unknown filter criterion: {}",
                other
            ))),
        }
    }
}

/// Case-insensitive substring filter over a loaded roster.
///
/// Keeps the input order. Empty text returns every player.
pub fn filter_players(players: &[Player], criterion: FilterCriterion, text: &str) -> Vec<Player> {
    let needle = text.to_lowercase();
    players
        .iter()
        .filter(|player| criterion.matches(player, &needle))
        .cloned()
        .collect()
}
