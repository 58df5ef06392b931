// SQLite persistence for derived cards.

use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::card::PlayerCard;
use crate::slots::SlotCategory;

/// One derivation run as listed by [`CardStore::list_runs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub team: String,
    pub season: u16,
    pub created_at: String,
    pub cards: usize,
}

/// SQLite-backed store of card runs. Every `derive` invocation writes one
/// run; cards are never updated in place.
pub struct CardStore {
    conn: Mutex<Connection>,
}

impl CardStore {
    /// Open (or create) the card database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS runs (
                run_id     TEXT PRIMARY KEY,
                team       TEXT NOT NULL,
                season     INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE IF NOT EXISTS cards (
                run_id     TEXT NOT NULL REFERENCES runs(run_id),
                player_id  INTEGER NOT NULL,
                seq        INTEGER NOT NULL,
                full_name  TEXT NOT NULL,
                position   TEXT NOT NULL,
                on_base    TEXT NOT NULL,
                speed      TEXT,
                power_hand TEXT,
                durability INTEGER,
                bunt       TEXT NOT NULL,
                arm        TEXT,
                payload    TEXT NOT NULL,
                PRIMARY KEY (run_id, player_id)
            );

            CREATE TABLE IF NOT EXISTS card_slots (
                run_id     TEXT NOT NULL,
                player_id  INTEGER NOT NULL,
                category   TEXT NOT NULL,
                first_slot INTEGER NOT NULL,
                last_slot  INTEGER NOT NULL,
                PRIMARY KEY (run_id, player_id, category),
                FOREIGN KEY (run_id, player_id) REFERENCES cards(run_id, player_id)
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Panics if the mutex is poisoned.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// New run ID from the current UTC time, e.g. `cards_20260228_143022_123`.
    pub fn generate_run_id() -> String {
        let now = chrono::Utc::now();
        now.format("cards_%Y%m%d_%H%M%S_%3f").to_string()
    }

    /// Write a run and all of its cards in a single transaction. Fails if
    /// `run_id` already exists.
    pub fn save_cards(
        &self,
        run_id: &str,
        team: &str,
        season: u16,
        cards: &[PlayerCard],
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin save transaction")?;

        tx.execute(
            "INSERT INTO runs (run_id, team, season) VALUES (?1, ?2, ?3)",
            params![run_id, team, season],
        )
        .with_context(|| format!("failed to create run {run_id}"))?;

        for (seq, card) in cards.iter().enumerate() {
            let payload = serde_json::to_string(card).context("failed to serialize card")?;
            let r = &card.ratings;
            tx.execute(
                "INSERT INTO cards
                    (run_id, player_id, seq, full_name, position, on_base, speed,
                     power_hand, durability, bunt, arm, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    run_id,
                    card.player_id,
                    seq,
                    card.full_name,
                    card.position,
                    r.on_base.as_str(),
                    r.speed.map(|g| g.as_str()),
                    r.power_hand.as_ref().map(|c| c.code()),
                    r.durability.map(|d| d.value()),
                    r.bunt.as_str(),
                    r.arm.map(|h| h.code().to_string()),
                    payload,
                ],
            )
            .with_context(|| format!("failed to save card for player {}", card.player_id))?;

            for (category, range) in card.layout.iter() {
                tx.execute(
                    "INSERT INTO card_slots (run_id, player_id, category, first_slot, last_slot)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![run_id, card.player_id, category.key(), range.first, range.last],
                )
                .context("failed to save slot range")?;
            }
        }

        tx.commit().context("failed to commit card run")?;
        Ok(())
    }

    /// Load one player's card from a run.
    pub fn load_card(&self, run_id: &str, player_id: u64) -> Result<Option<PlayerCard>> {
        let conn = self.conn();
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM cards WHERE run_id = ?1 AND player_id = ?2",
                params![run_id, player_id],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query card")?;

        payload
            .map(|json| serde_json::from_str(&json).context("failed to deserialize card"))
            .transpose()
    }

    /// All cards of a run, in the order they were saved.
    pub fn load_run(&self, run_id: &str) -> Result<Vec<PlayerCard>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT payload FROM cards WHERE run_id = ?1 ORDER BY seq")
            .context("failed to prepare load_run query")?;

        let payloads = stmt
            .query_map(params![run_id], |row| row.get::<_, String>(0))
            .context("failed to query cards")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map card rows")?;

        payloads
            .iter()
            .map(|json| serde_json::from_str(json).context("failed to deserialize card"))
            .collect()
    }

    /// Runs, newest first, with their card counts.
    pub fn list_runs(&self) -> Result<Vec<RunSummary>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT r.run_id, r.team, r.season, r.created_at, COUNT(c.player_id)
                 FROM runs r LEFT JOIN cards c ON c.run_id = r.run_id
                 GROUP BY r.run_id
                 ORDER BY r.created_at DESC, r.run_id DESC",
            )
            .context("failed to prepare list_runs query")?;

        let runs = stmt
            .query_map([], |row| {
                Ok(RunSummary {
                    run_id: row.get(0)?,
                    team: row.get(1)?,
                    season: row.get(2)?,
                    created_at: row.get(3)?,
                    cards: row.get(4)?,
                })
            })
            .context("failed to query runs")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map run rows")?;

        Ok(runs)
    }

    /// Resolve a roll result against a stored card. `None` when the slot
    /// is unassigned or the card has no layout.
    pub fn outcome_for_roll(
        &self,
        run_id: &str,
        player_id: u64,
        slot: u32,
    ) -> Result<Option<SlotCategory>> {
        let conn = self.conn();
        let key: Option<String> = conn
            .query_row(
                "SELECT category FROM card_slots
                 WHERE run_id = ?1 AND player_id = ?2 AND ?3 BETWEEN first_slot AND last_slot",
                params![run_id, player_id, slot],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query slot")?;

        match key {
            None => Ok(None),
            Some(key) => match SlotCategory::from_key(&key) {
                Some(category) => Ok(Some(category)),
                None => bail!("unknown slot category '{key}' in run {run_id}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::derive_card;
    use crate::config::TableConfig;
    use crate::stats::{HittingStats, PitchingStats, Position, StatBundle};

    const RUN: &str = "cards_test_001";
    const TABLE: TableConfig = TableConfig { max_slot: 4000 };

    fn test_store() -> CardStore {
        CardStore::open(":memory:").expect("in-memory database should open")
    }

    fn sample_cards() -> Vec<PlayerCard> {
        let hitter = StatBundle {
            player_id: 10,
            full_name: "Lefty Slugger".into(),
            position: Position::new("9", "Outfielder", "Outfielder", "RF"),
            handedness: Some("L".into()),
            hitting: Some(HittingStats {
                plate_appearances: Some(600),
                hits: 180,
                doubles: 36,
                triples: 4,
                home_runs: 30,
                strike_outs: 120,
                base_on_balls: Some(70),
                ..Default::default()
            }),
            ..Default::default()
        };
        let pitcher = StatBundle {
            player_id: 20,
            full_name: "Starter".into(),
            position: Position::new("1", "Pitcher", "Pitcher", "P"),
            pitching: Some(PitchingStats {
                throws: Some("R".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        vec![
            derive_card(&hitter, &TABLE).unwrap(),
            derive_card(&pitcher, &TABLE).unwrap(),
        ]
    }

    #[test]
    fn open_creates_tables() {
        let store = test_store();
        let conn = store.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('runs', 'cards', 'card_slots')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn save_and_load_round_trip() {
        let store = test_store();
        let cards = sample_cards();
        store.save_cards(RUN, "NYY", 2016, &cards).unwrap();

        assert_eq!(store.load_card(RUN, 10).unwrap().as_ref(), Some(&cards[0]));
        assert_eq!(store.load_run(RUN).unwrap(), cards);
        assert!(store.load_card(RUN, 99).unwrap().is_none());
        assert!(store.load_card("other", 10).unwrap().is_none());
    }

    #[test]
    fn rating_columns_are_queryable() {
        let store = test_store();
        store.save_cards(RUN, "NYY", 2016, &sample_cards()).unwrap();
        let conn = store.conn();
        let (power_hand, arm): (Option<String>, Option<String>) = conn
            .query_row(
                "SELECT power_hand, arm FROM cards WHERE run_id = ?1 AND player_id = 10",
                params![RUN],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(power_hand.as_deref(), Some("LP"));
        assert_eq!(arm, None);
    }

    #[test]
    fn roll_lookup_matches_layout() {
        let store = test_store();
        let cards = sample_cards();
        store.save_cards(RUN, "NYY", 2016, &cards).unwrap();

        for slot in [11, 12, 500, 1000, 3999, 4000] {
            assert_eq!(
                store.outcome_for_roll(RUN, 10, slot).unwrap(),
                cards[0].layout.outcome_for(slot),
                "slot {slot}"
            );
        }
        assert_eq!(
            store.outcome_for_roll(RUN, 10, 11).unwrap(),
            Some(SlotCategory::InfieldSingle)
        );
        assert_eq!(store.outcome_for_roll(RUN, 10, 5).unwrap(), None);
        // pitcher has no layout
        assert_eq!(store.outcome_for_roll(RUN, 20, 11).unwrap(), None);
    }

    #[test]
    fn list_runs_counts_cards() {
        let store = test_store();
        store.save_cards("cards_a", "NYY", 2016, &sample_cards()).unwrap();
        store.save_cards("cards_b", "BOS", 2015, &[]).unwrap();

        let runs = store.list_runs().unwrap();
        assert_eq!(runs.len(), 2);
        let a = runs.iter().find(|r| r.run_id == "cards_a").unwrap();
        assert_eq!((a.team.as_str(), a.season, a.cards), ("NYY", 2016, 2));
        let b = runs.iter().find(|r| r.run_id == "cards_b").unwrap();
        assert_eq!(b.cards, 0);
    }

    #[test]
    fn duplicate_run_id_is_rejected_atomically() {
        let store = test_store();
        let cards = sample_cards();
        store.save_cards(RUN, "NYY", 2016, &cards[..1]).unwrap();
        assert!(store.save_cards(RUN, "NYY", 2016, &cards).is_err());
        assert_eq!(store.load_run(RUN).unwrap().len(), 1);
    }

    #[test]
    fn generate_run_id_format() {
        let id = CardStore::generate_run_id();
        assert!(id.starts_with("cards_"), "run ID should start with 'cards_': {id}");
        // cards_YYYYMMDD_HHMMSS_SSS
        assert_eq!(id.len(), 25, "unexpected run ID length: {id}");
    }
}
