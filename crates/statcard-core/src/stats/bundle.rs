// Typed stat bundle: the read-only input record for card derivation.
//
// Field names follow the MLB stats payload (camelCase) so bundles can be
// deserialized straight from a provider's export. Every counting stat that
// may be missing defaults to 0; the few stats whose absence means something
// else are `Option`s and document their default at the point of use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position code the stats provider assigns to pitchers.
pub const PITCHER_POSITION_CODE: &str = "1";

// ---------------------------------------------------------------------------
// Handedness
// ---------------------------------------------------------------------------

/// Batting or throwing side. Serialized as the provider's single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Handedness {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "S")]
    Switch,
}

impl Handedness {
    /// Parse a side code. Accepts "L", "R" and "S" (switch) in any case,
    /// ignoring surrounding whitespace. "B" (both) is an alias for switch.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "L" => Some(Handedness::Left),
            "R" => Some(Handedness::Right),
            "S" | "B" => Some(Handedness::Switch),
            _ => None,
        }
    }

    /// The single-letter code printed on the card.
    pub fn code(&self) -> char {
        match self {
            Handedness::Left => 'L',
            Handedness::Right => 'R',
            Handedness::Switch => 'S',
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Roster position descriptor as reported by the stats provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub abbreviation: String,
}

impl Position {
    pub fn new(code: &str, name: &str, kind: &str, abbreviation: &str) -> Self {
        Position {
            code: code.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            abbreviation: abbreviation.to_string(),
        }
    }

    /// A player is a pitcher when the provider codes them "1" or names the
    /// position "Pitcher". Two-way players carry their own code and are not
    /// pitchers here.
    pub fn is_pitcher(&self) -> bool {
        self.code.trim() == PITCHER_POSITION_CODE || self.name.trim().eq_ignore_ascii_case("Pitcher")
    }

    /// True when the provider sent no position at all.
    pub fn is_unset(&self) -> bool {
        self.code.trim().is_empty() && self.name.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Rate values
// ---------------------------------------------------------------------------

/// A rate stat that providers send either as a number or as text
/// (e.g. `".750"`, or `"-.--"` when undefined).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateValue {
    Number(f64),
    Text(String),
}

impl RateValue {
    /// Parse into a finite real number. Returns `None` for unparsable text
    /// and for NaN or infinite values.
    pub fn parse(&self) -> Option<f64> {
        let value = match self {
            RateValue::Number(v) => *v,
            RateValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// The value as the provider sent it, for diagnostics.
    pub fn raw(&self) -> String {
        match self {
            RateValue::Number(v) => v.to_string(),
            RateValue::Text(s) => s.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Stat groups
// ---------------------------------------------------------------------------

/// Season hitting line. Missing counting stats are 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HittingStats {
    /// Defaults to a full 162-game season when absent (see durability).
    pub games_played: Option<u32>,
    /// Required for slot allocation; absent or 0 means no hitting card.
    pub plate_appearances: Option<u32>,
    pub hits: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub runs: u32,
    /// Unintentional walks. Some exports send `walks` instead; when both
    /// keys are present `baseOnBalls` wins.
    pub base_on_balls: Option<u32>,
    pub walks: Option<u32>,
    pub intentional_walks: u32,
    pub hit_by_pitch: u32,
    pub strike_outs: u32,
    pub sac_bunts: u32,
    /// Missing or unparsable means 0.0.
    pub stolen_base_percentage: Option<RateValue>,
}

impl HittingStats {
    /// Doubles + triples + home runs.
    pub fn extra_base_hits(&self) -> u32 {
        self.doubles
            .saturating_add(self.triples)
            .saturating_add(self.home_runs)
    }

    /// `baseOnBalls`, falling back to `walks`, then 0.
    pub fn unintentional_walks(&self) -> u32 {
        self.base_on_balls.or(self.walks).unwrap_or(0)
    }

    /// Hits + walks + hit-by-pitch + intentional walks.
    pub fn times_on_base(&self) -> u32 {
        self.hits
            .saturating_add(self.unintentional_walks())
            .saturating_add(self.hit_by_pitch)
            .saturating_add(self.intentional_walks)
    }

    /// Unintentional plus intentional walks, as the slot table counts them.
    pub fn total_walks(&self) -> u32 {
        self.unintentional_walks().saturating_add(self.intentional_walks)
    }
}

/// Season fielding line. Carried with the bundle for downstream tooling;
/// no card rating reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldingStats {
    pub games_played: u32,
    pub games_started: u32,
    pub assists: u32,
    pub put_outs: u32,
    pub errors: u32,
    pub chances: u32,
}

/// Season pitching line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PitchingStats {
    pub games_played: u32,
    pub games_started: u32,
    pub strike_outs: u32,
    pub base_on_balls: u32,
    /// Throwing hand code ("L"/"R").
    pub throws: Option<String>,
}

// ---------------------------------------------------------------------------
// StatBundle
// ---------------------------------------------------------------------------

/// Everything the derivation engine knows about one player-season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatBundle {
    #[serde(rename = "id")]
    pub player_id: u64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub position: Position,
    /// Batting side code from the secondary person lookup.
    #[serde(rename = "batSide", default)]
    pub handedness: Option<String>,
    #[serde(default)]
    pub hitting: Option<HittingStats>,
    #[serde(default)]
    pub fielding: Option<FieldingStats>,
    #[serde(default)]
    pub pitching: Option<PitchingStats>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
