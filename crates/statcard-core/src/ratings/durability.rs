// Durability (injury) rating from games missed.

use super::PowerHandClass;
use crate::stats::HittingStats;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Games in a full season; also the default when games played is absent.
pub const FULL_SEASON_GAMES: u32 = 162;

/// Pitchers log far fewer games than position players; their games played is
/// scaled by this factor before computing games missed.
pub const PITCHER_GAMES_SCALE: f64 = 3.5;

/// Durability rating, 0 (never misses) through 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Durability(u8);

impl Durability {
    pub fn value(self) -> u8 {
        self.0
    }

    /// Band games missed into a rating. Anything past 80 rates 8.
    pub fn from_games_missed(games_missed: u32) -> Self {
        let rating = match games_missed {
            0 => 0,
            1 => 1,
            2..=3 => 2,
            4..=5 => 3,
            6..=10 => 4,
            11..=20 => 5,
            21..=30 => 6,
            31..=80 => 7,
            _ => 8,
        };
        Durability(rating)
    }
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Games missed out of a full season.
///
/// Pitcher scaling can produce a fractional count; it is rounded half away
/// from zero. Scaled games beyond a full season would give a negative count,
/// which is clamped to 0 (a workhorse pitcher rates as fully durable).
pub fn games_missed(games_played: u32, pitcher: bool) -> u32 {
    let mut scaled = f64::from(games_played);
    if pitcher {
        scaled *= PITCHER_GAMES_SCALE;
    }
    let missed = (f64::from(FULL_SEASON_GAMES) - scaled).round();
    if missed < 0.0 {
        debug!("scaled games played {scaled} exceeds a full season, games missed clamped to 0");
        return 0;
    }
    missed as u32
}

/// Durability rating, or `None` when there is no hitting line.
pub fn durability(
    hitting: Option<&HittingStats>,
    power_hand: Option<&PowerHandClass>,
) -> Option<Durability> {
    let hitting = hitting?;
    let games_played = hitting.games_played.unwrap_or(FULL_SEASON_GAMES);
    let pitcher = power_hand.is_some_and(PowerHandClass::is_pitcher);
    Some(Durability::from_games_missed(games_missed(games_played, pitcher)))
}
