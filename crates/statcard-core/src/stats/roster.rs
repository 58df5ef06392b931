// Team rosters: who is on a team for a season, split into fielders and
// pitchers by position code.

use super::bundle::Position;
use super::source::SourceError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One rostered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_id: u64,
    pub full_name: String,
    pub position: Position,
}

/// A team's season roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub abbreviation: String,
    pub season: u16,
    pub fielders: Vec<RosterEntry>,
    pub pitchers: Vec<RosterEntry>,
}

impl Team {
    /// Split roster entries into fielders and pitchers, keeping roster order.
    pub fn from_roster(abbreviation: &str, season: u16, entries: Vec<RosterEntry>) -> Self {
        let (pitchers, fielders) = entries
            .into_iter()
            .partition(|entry| entry.position.is_pitcher());
        Team {
            abbreviation: abbreviation.to_ascii_uppercase(),
            season,
            fielders,
            pitchers,
        }
    }

    /// Fielders first, then pitchers.
    pub fn players(&self) -> impl Iterator<Item = &RosterEntry> {
        self.fielders.iter().chain(self.pitchers.iter())
    }

    pub fn len(&self) -> usize {
        self.fielders.len() + self.pitchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Roster sources
// ---------------------------------------------------------------------------

pub trait RosterSource {
    fn season_roster(&self, team: &str, season: u16) -> Result<Vec<RosterEntry>, SourceError>;
}

/// Load a team through any roster source. An empty roster is an error: it
/// almost always means a wrong abbreviation or season.
pub fn load_team(source: &dyn RosterSource, team: &str, season: u16) -> Result<Team, SourceError> {
    let entries = source.season_roster(team, season)?;
    if entries.is_empty() {
        return Err(SourceError::Validation(format!(
            "no roster entries for team '{team}' in {season}"
        )));
    }
    let team = Team::from_roster(team, season, entries);
    info!(
        "loaded {} roster: {} fielders, {} pitchers",
        team.abbreviation,
        team.fielders.len(),
        team.pitchers.len()
    );
    Ok(team)
}

/// Roster export in CSV form, one row per player-season:
///
/// ```text
/// team,season,player_id,full_name,position_code,position_name,position_type,position_abbreviation
/// ```
///
/// The file is read on each lookup.
#[derive(Debug, Clone)]
pub struct CsvRosterFile {
    path: PathBuf,
}

impl CsvRosterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvRosterFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterSource for CsvRosterFile {
    fn season_roster(&self, team: &str, season: u16) -> Result<Vec<RosterEntry>, SourceError> {
        let file = std::fs::File::open(&self.path).map_err(|e| SourceError::Io {
            path: self.path.display().to_string(),
            source: e,
        })?;
        load_roster_from_reader(file, team, season).map_err(|e| SourceError::Csv {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawRosterRow {
    team: String,
    season: u16,
    player_id: u64,
    full_name: String,
    #[serde(default)]
    position_code: String,
    #[serde(default)]
    position_name: String,
    #[serde(default)]
    position_type: String,
    #[serde(default)]
    position_abbreviation: String,
}

fn load_roster_from_reader<R: Read>(
    rdr: R,
    team: &str,
    season: u16,
) -> Result<Vec<RosterEntry>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut entries: Vec<RosterEntry> = Vec::new();
    for result in reader.deserialize::<RawRosterRow>() {
        match result {
            Ok(raw) => {
                if raw.season != season || !raw.team.trim().eq_ignore_ascii_case(team.trim()) {
                    continue;
                }
                if entries.iter().any(|e| e.player_id == raw.player_id) {
                    warn!(
                        "duplicate roster row for '{}' ({}), keeping first",
                        raw.full_name.trim(),
                        raw.player_id
                    );
                    continue;
                }
                entries.push(RosterEntry {
                    player_id: raw.player_id,
                    full_name: raw.full_name.trim().to_string(),
                    position: Position::new(
                        raw.position_code.trim(),
                        raw.position_name.trim(),
                        raw.position_type.trim(),
                        raw.position_abbreviation.trim(),
                    ),
                });
            }
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
            }
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = "\
team,season,player_id,full_name,position_code,position_name,position_type,position_abbreviation
CHC,2016,1,Anthony Rizzo,3,First Base,Infielder,1B
CHC,2016,2,Jon Lester,1,Pitcher,Pitcher,P
CHC,2016,3,Kris Bryant,5,Third Base,Infielder,3B
CHC,2015,4,Old Timer,7,Left Field,Outfielder,LF
STL,2016,5,Other Club,2,Catcher,Catcher,C
CHC,2016,not-a-number,Broken Row,6,Shortstop,Infielder,SS
";

    struct FixedRoster(Vec<RosterEntry>);

    impl RosterSource for FixedRoster {
        fn season_roster(&self, _team: &str, _season: u16) -> Result<Vec<RosterEntry>, SourceError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn roster_filters_team_and_season() {
        let entries = load_roster_from_reader(ROSTER.as_bytes(), "chc", 2016).unwrap();
        let ids: Vec<u64> = entries.iter().map(|e| e.player_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(entries[0].position.abbreviation, "1B");
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let entries = load_roster_from_reader(ROSTER.as_bytes(), "CHC", 2016).unwrap();
        assert!(entries.iter().all(|e| e.full_name != "Broken Row"));
    }

    #[test]
    fn duplicate_rows_keep_first() {
        let csv_data = "\
team,season,player_id,full_name,position_code,position_name,position_type,position_abbreviation
CHC,2016,1,Anthony Rizzo,3,First Base,Infielder,1B
CHC,2016,1,Anthony Rizzo,2,Catcher,Catcher,C
";
        let entries = load_roster_from_reader(csv_data.as_bytes(), "CHC", 2016).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].position.code, "3");
    }

    #[test]
    fn team_splits_pitchers_by_position() {
        let entries = load_roster_from_reader(ROSTER.as_bytes(), "CHC", 2016).unwrap();
        let team = Team::from_roster("chc", 2016, entries);
        assert_eq!(team.abbreviation, "CHC");
        assert_eq!(team.fielders.len(), 2);
        assert_eq!(team.pitchers.len(), 1);
        assert_eq!(team.pitchers[0].full_name, "Jon Lester");

        let order: Vec<u64> = team.players().map(|e| e.player_id).collect();
        assert_eq!(order, vec![1, 3, 2]);
    }

    #[test]
    fn empty_roster_is_a_validation_error() {
        let err = load_team(&FixedRoster(Vec::new()), "XXX", 2016).unwrap_err();
        assert!(matches!(err, SourceError::Validation(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let source = CsvRosterFile::new("/nonexistent/rosters.csv");
        let err = source.season_roster("CHC", 2016).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
