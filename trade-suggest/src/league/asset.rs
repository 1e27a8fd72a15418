// Tradeable asset representation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fantasy football positions recognized by the trade engine.
///
/// Anything the roster provider reports outside the skill positions and draft
/// picks (K, DEF, IDP slots, blanks) collapses to `Other`, which never
/// qualifies for a position premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    Pick,
    Other,
}

impl Position {
    /// Parse a position string into a Position enum.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Unknown strings map to `Position::Other` rather than failing, since
    /// the roster provider's position vocabulary is wider than ours.
    pub fn from_str_pos(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "QB" => Position::Quarterback,
            "RB" => Position::RunningBack,
            "WR" => Position::WideReceiver,
            "TE" => Position::TightEnd,
            "PICK" => Position::Pick,
            _ => Position::Other,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Pick => "PICK",
            Position::Other => "--",
        }
    }

    /// Whether this is an offensive skill position (QB/RB/WR/TE).
    pub fn is_skill(&self) -> bool {
        matches!(
            self,
            Position::Quarterback | Position::RunningBack | Position::WideReceiver | Position::TightEnd
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Whether an asset is a rostered player or a future draft pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Player,
    Pick,
}

/// A single tradeable unit held by exactly one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Stable identifier from the roster provider.
    pub id: String,
    pub display_name: String,
    pub position: Position,
    pub kind: AssetKind,
    /// NFL team abbreviation. Empty for free agents and picks.
    #[serde(default)]
    pub nfl_team: String,
    /// League member currently holding the asset.
    pub owning_team: String,
    /// Externally supplied base value; 0 when the source had no value.
    pub valuation: u32,
}

impl Asset {
    /// Build a player asset. Convenience for callers that already hold
    /// validated fields.
    pub fn player(
        id: &str,
        display_name: &str,
        position: Position,
        owning_team: &str,
        valuation: u32,
    ) -> Self {
        let kind = if position == Position::Pick {
            AssetKind::Pick
        } else {
            AssetKind::Player
        };
        Asset {
            id: id.to_string(),
            display_name: display_name.to_string(),
            position,
            kind,
            nfl_team: String::new(),
            owning_team: owning_team.to_string(),
            valuation,
        }
    }

    pub fn is_quarterback(&self) -> bool {
        self.position == Position::Quarterback
    }
}
