// Card assembly: one stat bundle in, one finished player card out.
//
// `derive_card` runs the rating engine and the slot allocator for a single
// player. `derive_batch` fans a team's bundles out across the rayon pool;
// players are independent, so one bad bundle never sinks the rest.

use crate::config::TableConfig;
use crate::diagnostics::{DataQualityReport, Diagnostic};
use crate::ratings::{derive_ratings, RatingSet};
use crate::slots::{allocate_slots, SlotLayout};
use crate::stats::StatBundle;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    #[error("invalid stat bundle for player {player_id}: {reason}")]
    InvalidBundle { player_id: u64, reason: String },
}

/// A finished card: ratings, outcome-slot layout, and any data-quality
/// findings raised while building it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCard {
    pub player_id: u64,
    pub full_name: String,
    /// Position abbreviation as printed on the card ("SS", "P", ...).
    pub position: String,
    pub ratings: RatingSet,
    pub layout: SlotLayout,
    #[serde(default)]
    pub notes: Vec<Diagnostic>,
}

impl PlayerCard {
    /// False when no hitting card could be made (ratings are still valid).
    pub fn has_layout(&self) -> bool {
        !self.layout.is_empty()
    }

    /// Flatten the card into field -> value pairs.
    ///
    /// Keys are fixed: every rating key is always present, with an empty
    /// value when the rating is unknown. Slot keys appear only for funded
    /// categories. The map is ordered, so the output is deterministic.
    pub fn to_flat_map(&self) -> BTreeMap<String, String> {
        fn or_blank<T: ToString>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        let r = &self.ratings;
        let mut map = BTreeMap::new();
        map.insert("player_id".to_string(), self.player_id.to_string());
        map.insert("full_name".to_string(), self.full_name.clone());
        map.insert("position".to_string(), self.position.clone());
        map.insert("on_base".to_string(), r.on_base.to_string());
        map.insert("speed".to_string(), or_blank(r.speed));
        map.insert("power_hand".to_string(), or_blank(r.power_hand.as_ref()));
        map.insert("durability".to_string(), or_blank(r.durability));
        map.insert("bunt".to_string(), r.bunt.to_string());
        map.insert("arm".to_string(), or_blank(r.arm));
        for (category, range) in self.layout.iter() {
            map.insert(format!("slot_{}", category.key()), range.to_string());
        }
        map
    }
}

/// Reject bundles whose counting stats contradict each other.
pub fn validate_bundle(bundle: &StatBundle) -> Result<(), CardError> {
    let Some(hitting) = bundle.hitting.as_ref() else {
        return Ok(());
    };
    let invalid = |reason: String| CardError::InvalidBundle {
        player_id: bundle.player_id,
        reason,
    };

    let extra_base = hitting.extra_base_hits();
    if extra_base > hitting.hits {
        return Err(invalid(format!(
            "extra-base hits ({extra_base}) exceed hits ({})",
            hitting.hits
        )));
    }
    if let Some(pa) = hitting.plate_appearances {
        if hitting.hits > pa {
            return Err(invalid(format!(
                "hits ({}) exceed plate appearances ({pa})",
                hitting.hits
            )));
        }
    }
    Ok(())
}

/// Derive one player's card. Pure apart from logging.
pub fn derive_card(bundle: &StatBundle, table: &TableConfig) -> Result<PlayerCard, CardError> {
    validate_bundle(bundle)?;

    let mut notes = Vec::new();
    let ratings = derive_ratings(bundle, &mut notes);
    let layout = allocate_slots(
        bundle.hitting.as_ref(),
        ratings.power_hand.as_ref(),
        table.max_slot,
        &mut notes,
    );

    Ok(PlayerCard {
        player_id: bundle.player_id,
        full_name: bundle.full_name.clone(),
        position: bundle.position.abbreviation.clone(),
        ratings,
        layout,
        notes,
    })
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

/// A player whose bundle was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardFailure {
    pub player_id: u64,
    pub full_name: String,
    pub error: String,
}

/// Result of deriving a batch: cards and failures both in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub cards: Vec<PlayerCard>,
    pub failures: Vec<CardFailure>,
    pub quality: DataQualityReport,
}

pub fn derive_batch(bundles: &[StatBundle], table: &TableConfig) -> BatchReport {
    let results: Vec<Result<PlayerCard, CardError>> = bundles
        .par_iter()
        .map(|bundle| derive_card(bundle, table))
        .collect();

    let mut report = BatchReport::default();
    for (bundle, result) in bundles.iter().zip(results) {
        match result {
            Ok(card) => {
                report.quality.record(&card.notes);
                report.cards.push(card);
            }
            Err(e) => {
                warn!("skipping {} ({}): {}", bundle.full_name, bundle.player_id, e);
                report.failures.push(CardFailure {
                    player_id: bundle.player_id,
                    full_name: bundle.full_name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let with_layout = report.cards.iter().filter(|c| c.has_layout()).count();
    info!(
        "derived {} cards ({} with hitting layouts), {} rejected",
        report.cards.len(),
        with_layout,
        report.failures.len()
    );
    report.quality.log_summary();
    report
}
