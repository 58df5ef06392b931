// Stats provider seam and the TOML-file provider.
//
// Derivation never fetches anything: callers pull bundles through a
// `StatsProvider` first and hand finished bundles to the engine.

use super::bundle::StatBundle;
use super::roster::{RosterEntry, Team};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },

    #[error("stats entry for player {player_id} is malformed: {message}")]
    InvalidEntry { player_id: u64, message: String },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Supplies a player's season stat bundle. `Ok(None)` means the provider has
/// no record for that player-season.
pub trait StatsProvider {
    fn stat_bundle(&self, player_id: u64, season: u16) -> Result<Option<StatBundle>, SourceError>;
}

// ---------------------------------------------------------------------------
// TOML file provider
// ---------------------------------------------------------------------------

/// Raw layout of a stats export: one season, many `[[players]]` tables.
/// Players stay untyped here so one bad entry cannot sink the file.
#[derive(Debug, Deserialize)]
struct RawStatsFile {
    season: u16,
    #[serde(default)]
    players: Vec<toml::Value>,
}

/// Stat bundles for one season, read from a TOML export.
#[derive(Debug, Clone)]
pub struct StatsFile {
    season: u16,
    players: HashMap<u64, StatBundle>,
    /// Entries that failed to deserialize, keyed by their `id`.
    rejected: HashMap<u64, String>,
}

impl StatsFile {
    /// Read and index a stats export. Duplicate player ids keep the last entry.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path).map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&text).map_err(|e| SourceError::Toml {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Parse a stats export. Only a broken document or `season` is an error;
    /// a malformed `[[players]]` entry is logged and kept out of the index.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let raw: RawStatsFile = toml::from_str(text)?;
        let mut players = HashMap::with_capacity(raw.players.len());
        let mut rejected = HashMap::new();
        for (index, value) in raw.players.into_iter().enumerate() {
            let id = value
                .get("id")
                .and_then(toml::Value::as_integer)
                .and_then(|id| u64::try_from(id).ok());
            match value.try_into::<StatBundle>() {
                Ok(bundle) => {
                    if players.contains_key(&bundle.player_id)
                        || rejected.remove(&bundle.player_id).is_some()
                    {
                        warn!(
                            "duplicate stats entry for player {}, using latest",
                            bundle.player_id
                        );
                    }
                    players.insert(bundle.player_id, bundle);
                }
                Err(e) => {
                    let message = e.message().trim().to_string();
                    match id {
                        Some(id) => {
                            warn!("skipping malformed stats entry for player {id}: {message}");
                            players.remove(&id);
                            rejected.insert(id, message);
                        }
                        None => {
                            warn!(
                                "skipping stats entry #{} without a usable id: {message}",
                                index + 1
                            );
                        }
                    }
                }
            }
        }
        Ok(StatsFile {
            season: raw.season,
            players,
            rejected,
        })
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Player ids whose entries were present but malformed.
    pub fn rejected_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.rejected.keys().copied()
    }
}

impl StatsProvider for StatsFile {
    fn stat_bundle(&self, player_id: u64, season: u16) -> Result<Option<StatBundle>, SourceError> {
        if season != self.season {
            return Ok(None);
        }
        if let Some(message) = self.rejected.get(&player_id) {
            return Err(SourceError::InvalidEntry {
                player_id,
                message: message.clone(),
            });
        }
        Ok(self.players.get(&player_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Team gathering
// ---------------------------------------------------------------------------

/// A rostered player whose stats the provider could not supply.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedEntry {
    pub player_id: u64,
    pub full_name: String,
    pub error: String,
}

/// Everything [`collect_team_bundles`] found for a team, in roster order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeamBundles {
    pub bundles: Vec<StatBundle>,
    /// Rostered players the provider has no record for.
    pub missing: Vec<RosterEntry>,
    pub rejected: Vec<RejectedEntry>,
}

/// Fetch a bundle for every rostered player.
///
/// The roster is authoritative for identity: a bundle without a position or
/// name takes them from the roster entry. A player with no record, or whose
/// record the provider fails on, is reported without failing the team.
pub fn collect_team_bundles(provider: &dyn StatsProvider, team: &Team) -> TeamBundles {
    let mut out = TeamBundles {
        bundles: Vec::with_capacity(team.len()),
        ..TeamBundles::default()
    };
    for entry in team.players() {
        match provider.stat_bundle(entry.player_id, team.season) {
            Ok(Some(mut bundle)) => {
                if bundle.position.is_unset() {
                    bundle.position = entry.position.clone();
                }
                if bundle.full_name.trim().is_empty() {
                    bundle.full_name = entry.full_name.clone();
                }
                out.bundles.push(bundle);
            }
            Ok(None) => {
                warn!(
                    "no stats found for {} ({}) in {}",
                    entry.full_name, entry.player_id, team.season
                );
                out.missing.push(entry.clone());
            }
            Err(e) => {
                warn!("skipping {} ({}): {}", entry.full_name, entry.player_id, e);
                out.rejected.push(RejectedEntry {
                    player_id: entry.player_id,
                    full_name: entry.full_name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    out
}
