// Power/hand class and bunt rating.

use crate::diagnostics::Diagnostic;
use crate::stats::{Handedness, HittingStats, StatBundle};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Home runs needed for the power class.
pub const POWER_HOME_RUN_THRESHOLD: u32 = 15;

/// Card marker used in place of a hand/power class for pitchers.
pub const PITCHER_MARKER: &str = "P";

// ---------------------------------------------------------------------------
// Power/hand class
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerClass {
    Power,
    NonPower,
}

impl PowerClass {
    pub fn from_home_runs(home_runs: u32) -> Self {
        if home_runs >= POWER_HOME_RUN_THRESHOLD {
            PowerClass::Power
        } else {
            PowerClass::NonPower
        }
    }

    pub fn code(&self) -> char {
        match self {
            PowerClass::Power => 'P',
            PowerClass::NonPower => 'N',
        }
    }
}

/// Batting side plus power class ("RP", "LN", ...), or the pitcher marker.
///
/// Serialized as its card code so stored cards stay human readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PowerHandClass {
    Pitcher,
    Batter { side: Handedness, power: PowerClass },
}

impl PowerHandClass {
    pub fn code(&self) -> String {
        match self {
            PowerHandClass::Pitcher => PITCHER_MARKER.to_string(),
            PowerHandClass::Batter { side, power } => format!("{}{}", side.code(), power.code()),
        }
    }

    /// Parse a card code back into a class.
    pub fn from_code(code: &str) -> Option<Self> {
        if code == PITCHER_MARKER {
            return Some(PowerHandClass::Pitcher);
        }
        let mut chars = code.chars();
        let side = Handedness::from_code(&chars.next()?.to_string())?;
        let power = match chars.next()? {
            'P' => PowerClass::Power,
            'N' => PowerClass::NonPower,
            _ => return None,
        };
        if chars.next().is_some() {
            return None;
        }
        Some(PowerHandClass::Batter { side, power })
    }

    pub fn is_pitcher(&self) -> bool {
        matches!(self, PowerHandClass::Pitcher)
    }

    /// The batting side, which decides the pull field. Pitchers have none.
    pub fn batting_side(&self) -> Option<Handedness> {
        match self {
            PowerHandClass::Pitcher => None,
            PowerHandClass::Batter { side, .. } => Some(*side),
        }
    }
}

impl fmt::Display for PowerHandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl From<PowerHandClass> for String {
    fn from(class: PowerHandClass) -> Self {
        class.code()
    }
}

impl TryFrom<String> for PowerHandClass {
    type Error = String;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        PowerHandClass::from_code(&code).ok_or_else(|| format!("invalid power/hand class {code:?}"))
    }
}

/// Resolve the power/hand class.
///
/// Pitchers get the pitcher marker regardless of their batting line. Other
/// players need the batting side from the handedness lookup; without a usable
/// code the class is unknown and a diagnostic is recorded.
pub fn power_hand_class(bundle: &StatBundle, notes: &mut Vec<Diagnostic>) -> Option<PowerHandClass> {
    let hitting = bundle.hitting.as_ref()?;
    if bundle.position.is_pitcher() {
        return Some(PowerHandClass::Pitcher);
    }

    let Some(code) = bundle.handedness.as_deref() else {
        notes.push(Diagnostic::missing("batSide", "power/hand class unknown"));
        return None;
    };
    let Some(side) = Handedness::from_code(code) else {
        warn!(
            "unrecognized batSide code {code:?} for player {}",
            bundle.player_id
        );
        notes.push(Diagnostic::malformed("batSide", code, "power/hand class unknown"));
        return None;
    };

    Some(PowerHandClass::Batter {
        side,
        power: PowerClass::from_home_runs(hitting.home_runs),
    })
}

// ---------------------------------------------------------------------------
// Bunt rating
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuntRating {
    AA,
    BB,
    CC,
    DD,
}

impl BuntRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuntRating::AA => "AA",
            BuntRating::BB => "BB",
            BuntRating::CC => "CC",
            BuntRating::DD => "DD",
        }
    }
}

impl fmt::Display for BuntRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bunt rating from sacrifice bunts. A player with no hitting line is DD,
/// never unknown.
pub fn bunt_rating(hitting: Option<&HittingStats>) -> BuntRating {
    let Some(hitting) = hitting else {
        return BuntRating::DD;
    };
    match hitting.sac_bunts {
        8.. => BuntRating::AA,
        5..=7 => BuntRating::BB,
        2..=4 => BuntRating::CC,
        _ => BuntRating::DD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Position;

    fn batter(side: Option<&str>, home_runs: u32) -> StatBundle {
        StatBundle {
            player_id: 7,
            position: Position::new("8", "Outfielder", "Outfielder", "CF"),
            handedness: side.map(str::to_string),
            hitting: Some(HittingStats {
                home_runs,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn power_threshold_is_fifteen_home_runs() {
        let mut notes = Vec::new();
        let power = power_hand_class(&batter(Some("R"), 15), &mut notes).unwrap();
        let contact = power_hand_class(&batter(Some("R"), 14), &mut notes).unwrap();
        assert_eq!(power.code(), "RP");
        assert_eq!(contact.code(), "RN");
        assert!(notes.is_empty());
    }

    #[test]
    fn switch_hitter_keeps_switch_code() {
        let mut notes = Vec::new();
        let class = power_hand_class(&batter(Some("S"), 3), &mut notes).unwrap();
        assert_eq!(class.code(), "SN");
        assert_eq!(class.batting_side(), Some(Handedness::Switch));
    }

    #[test]
    fn pitcher_gets_marker_even_with_power() {
        let mut bundle = batter(Some("L"), 20);
        bundle.position = Position::new("1", "Pitcher", "Pitcher", "P");
        let mut notes = Vec::new();
        let class = power_hand_class(&bundle, &mut notes).unwrap();
        assert!(class.is_pitcher());
        assert_eq!(class.code(), PITCHER_MARKER);
        assert_eq!(class.batting_side(), None);
    }

    #[test]
    fn no_hitting_line_is_unknown() {
        let bundle = StatBundle {
            position: Position::new("1", "Pitcher", "Pitcher", "P"),
            ..Default::default()
        };
        let mut notes = Vec::new();
        assert_eq!(power_hand_class(&bundle, &mut notes), None);
        assert!(notes.is_empty());
    }

    #[test]
    fn missing_or_bad_side_is_noted() {
        let mut notes = Vec::new();
        assert_eq!(power_hand_class(&batter(None, 30), &mut notes), None);
        assert!(matches!(notes[0], Diagnostic::MissingData { .. }));

        notes.clear();
        assert_eq!(power_hand_class(&batter(Some("Q"), 30), &mut notes), None);
        assert!(matches!(notes[0], Diagnostic::MalformedValue { .. }));
    }

    #[test]
    fn codes_round_trip_through_strings() {
        for code in ["P", "RP", "RN", "LP", "LN", "SP", "SN"] {
            let class = PowerHandClass::from_code(code).unwrap();
            assert_eq!(class.code(), code);
        }
        assert_eq!(PowerHandClass::from_code("RX"), None);
        assert_eq!(PowerHandClass::from_code("RPN"), None);
        assert_eq!(PowerHandClass::from_code(""), None);
    }

    #[test]
    fn bunt_bands() {
        let with_bunts = |sac_bunts| HittingStats {
            sac_bunts,
            ..Default::default()
        };
        assert_eq!(bunt_rating(Some(&with_bunts(12))), BuntRating::AA);
        assert_eq!(bunt_rating(Some(&with_bunts(8))), BuntRating::AA);
        assert_eq!(bunt_rating(Some(&with_bunts(7))), BuntRating::BB);
        assert_eq!(bunt_rating(Some(&with_bunts(5))), BuntRating::BB);
        assert_eq!(bunt_rating(Some(&with_bunts(4))), BuntRating::CC);
        assert_eq!(bunt_rating(Some(&with_bunts(2))), BuntRating::CC);
        assert_eq!(bunt_rating(Some(&with_bunts(1))), BuntRating::DD);
        assert_eq!(bunt_rating(Some(&with_bunts(0))), BuntRating::DD);
    }

    #[test]
    fn no_hitting_line_bunts_dd() {
        assert_eq!(bunt_rating(None), BuntRating::DD);
    }
}
