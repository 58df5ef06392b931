// Rating derivation engine: categorical card ratings from a stat bundle.
//
// Each rating is a pure function of the bundle. A missing stat group yields
// `None` ("unknown"), which callers must keep distinct from the lowest grade.
// The one exception is the bunt rating, which falls back to DD.

pub mod baserunning;
pub mod batting;
pub mod durability;

pub use baserunning::{on_base_aggressiveness, speed};
pub use batting::{bunt_rating, power_hand_class, BuntRating, PowerClass, PowerHandClass};
pub use durability::{durability, Durability};

use crate::diagnostics::Diagnostic;
use crate::stats::{Handedness, PitchingStats, StatBundle};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Five-step letter grade, A best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All ratings printed on one player's card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSet {
    pub on_base: Grade,
    pub speed: Option<Grade>,
    pub power_hand: Option<PowerHandClass>,
    pub durability: Option<Durability>,
    pub bunt: BuntRating,
    pub arm: Option<Handedness>,
}

/// Derive every rating for `bundle`. Power/hand class is resolved first
/// because durability depends on it.
pub fn derive_ratings(bundle: &StatBundle, notes: &mut Vec<Diagnostic>) -> RatingSet {
    let hitting = bundle.hitting.as_ref();
    let power_hand = power_hand_class(bundle, notes);
    let durability = durability(hitting, power_hand.as_ref());

    RatingSet {
        on_base: on_base_aggressiveness(hitting, notes),
        speed: speed(hitting, notes),
        power_hand,
        durability,
        bunt: bunt_rating(hitting),
        arm: arm(bundle.pitching.as_ref(), notes),
    }
}

/// Throwing hand copied from the pitching line. Position players without
/// pitching stats have no arm rating.
pub fn arm(pitching: Option<&PitchingStats>, notes: &mut Vec<Diagnostic>) -> Option<Handedness> {
    let pitching = pitching?;
    let Some(code) = pitching.throws.as_deref() else {
        notes.push(Diagnostic::missing("pitching.throws", "arm rating unknown"));
        return None;
    };
    let hand = Handedness::from_code(code);
    if hand.is_none() {
        warn!("unrecognized throwing hand code {code:?}");
        notes.push(Diagnostic::malformed("pitching.throws", code, "arm rating unknown"));
    }
    hand
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{HittingStats, Position};

    fn position_player() -> StatBundle {
        StatBundle {
            player_id: 1,
            full_name: "Test Hitter".into(),
            position: Position::new("6", "Shortstop", "Infielder", "SS"),
            handedness: Some("L".into()),
            hitting: Some(HittingStats {
                games_played: Some(150),
                plate_appearances: Some(600),
                hits: 160,
                home_runs: 20,
                runs: 90,
                base_on_balls: Some(50),
                sac_bunts: 3,
                ..Default::default()
            }),
            fielding: None,
            pitching: None,
        }
    }

    #[test]
    fn position_player_rating_set() {
        let mut notes = Vec::new();
        let ratings = derive_ratings(&position_player(), &mut notes);

        // 90 / 210 = 0.43
        assert_eq!(ratings.on_base, Grade::B);
        // no steal percentage reported
        assert_eq!(ratings.speed, Some(Grade::E));
        assert_eq!(ratings.power_hand.map(|p| p.code()), Some("LP".to_string()));
        // 12 games missed
        assert_eq!(ratings.durability.map(Durability::value), Some(5));
        assert_eq!(ratings.bunt, BuntRating::CC);
        assert_eq!(ratings.arm, None);
        assert!(notes.is_empty());
    }

    #[test]
    fn bundle_without_stats_is_unknown_except_bunt_and_obr() {
        let bundle = StatBundle {
            player_id: 2,
            position: Position::new("1", "Pitcher", "Pitcher", "P"),
            ..Default::default()
        };
        let mut notes = Vec::new();
        let ratings = derive_ratings(&bundle, &mut notes);

        assert_eq!(ratings.on_base, Grade::E);
        assert_eq!(ratings.speed, None);
        assert_eq!(ratings.power_hand, None);
        assert_eq!(ratings.durability, None);
        assert_eq!(ratings.bunt, BuntRating::DD);
        assert_eq!(ratings.arm, None);
    }

    #[test]
    fn arm_copied_from_pitching_line() {
        let pitching = PitchingStats {
            throws: Some("L".into()),
            ..Default::default()
        };
        let mut notes = Vec::new();
        assert_eq!(arm(Some(&pitching), &mut notes), Some(Handedness::Left));
        assert!(notes.is_empty());
    }

    #[test]
    fn arm_without_throws_code_is_noted() {
        let mut notes = Vec::new();
        assert_eq!(arm(Some(&PitchingStats::default()), &mut notes), None);
        assert_eq!(notes.len(), 1);

        let bad = PitchingStats {
            throws: Some("?".into()),
            ..Default::default()
        };
        notes.clear();
        assert_eq!(arm(Some(&bad), &mut notes), None);
        assert!(matches!(notes[0], Diagnostic::MalformedValue { .. }));
    }

    #[test]
    fn derivation_is_deterministic() {
        let bundle = position_player();
        let mut first_notes = Vec::new();
        let mut second_notes = Vec::new();
        let first = derive_ratings(&bundle, &mut first_notes);
        let second = derive_ratings(&bundle, &mut second_notes);
        assert_eq!(first, second);
        assert_eq!(first_notes, second_notes);
    }
}
