// Stat bundle model plus the collaborators that supply bundles and rosters.

pub mod bundle;
pub mod roster;
pub mod source;

pub use bundle::{
    FieldingStats, Handedness, HittingStats, PitchingStats, Position, RateValue, StatBundle,
};
pub use roster::{load_team, CsvRosterFile, RosterEntry, RosterSource, Team};
pub use source::{
    collect_team_bundles, RejectedEntry, SourceError, StatsFile, StatsProvider, TeamBundles,
};
