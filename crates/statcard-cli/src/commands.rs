// Subcommand implementations.

use anyhow::{Context, Result};
use clap::Args;
use statcard_core::card::{derive_batch, PlayerCard};
use statcard_core::db::CardStore;
use statcard_core::stats::{collect_team_bundles, load_team, CsvRosterFile, StatsFile};
use tracing::info;

use crate::AppContext;

// ---------------------------------------------------------------------------
// derive
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct Derive {
    /// Team abbreviation as it appears in the roster file (e.g. CHC)
    #[arg(long)]
    team: String,

    /// Season to derive; defaults to the configured season
    #[arg(long)]
    season: Option<u16>,

    /// Print the full batch report as JSON instead of a summary table
    #[arg(long)]
    json: bool,
}

impl Derive {
    pub fn execute(&self, ctx: &AppContext) -> Result<()> {
        let season = self.season.unwrap_or(ctx.config.season);
        let paths = &ctx.config.data_paths;

        let rosters = CsvRosterFile::new(ctx.data_path(&paths.rosters));
        let team = load_team(&rosters, &self.team, season)
            .with_context(|| format!("failed to load roster for {} {season}", self.team))?;

        let stats_path = ctx.data_path(&paths.stats);
        let stats = StatsFile::load(&stats_path).context("failed to load stats")?;
        info!("loaded {} stat bundles for {}", stats.len(), stats.season());

        let found = collect_team_bundles(&stats, &team);
        let report = derive_batch(&found.bundles, &ctx.config.table);

        let run_id = CardStore::generate_run_id();
        ctx.store
            .save_cards(&run_id, &team.abbreviation, season, &report.cards)
            .context("failed to save cards")?;
        info!("saved run {run_id}");

        if self.json {
            let out = serde_json::json!({
                "run_id": run_id,
                "team": team.abbreviation,
                "season": season,
                "report": report,
                "missing": found.missing,
                "rejected_stats": found.rejected,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }

        println!("run {run_id}: {} {season}", team.abbreviation);
        for card in &report.cards {
            print_summary_line(card);
        }
        for failure in &report.failures {
            println!("  rejected {} ({}): {}", failure.full_name, failure.player_id, failure.error);
        }
        for entry in &found.rejected {
            println!("  bad stats {} ({}): {}", entry.full_name, entry.player_id, entry.error);
        }
        for entry in &found.missing {
            println!("  no stats {} ({})", entry.full_name, entry.player_id);
        }
        Ok(())
    }
}

fn print_summary_line(card: &PlayerCard) {
    let flat = card.to_flat_map();
    let field = |key: &str| flat.get(key).map(String::as_str).unwrap_or("").to_string();
    let dash = |value: String| if value.is_empty() { "-".to_string() } else { value };
    println!(
        "  {:>8} {:<24} {:<3} ob={} spd={} ph={} dur={} bunt={} arm={}{}",
        card.player_id,
        card.full_name,
        card.position,
        field("on_base"),
        dash(field("speed")),
        dash(field("power_hand")),
        dash(field("durability")),
        field("bunt"),
        dash(field("arm")),
        if card.has_layout() { "" } else { " (no hitting card)" },
    );
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct Show {
    /// Run ID printed by `derive`
    #[arg(long)]
    run: String,

    /// Player ID
    #[arg(long)]
    player: u64,

    /// Print the card as JSON
    #[arg(long)]
    json: bool,
}

impl Show {
    pub fn execute(&self, ctx: &AppContext) -> Result<()> {
        let card = ctx
            .store
            .load_card(&self.run, self.player)?
            .with_context(|| format!("no card for player {} in run {}", self.player, self.run))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&card)?);
            return Ok(());
        }
        for (key, value) in card.to_flat_map() {
            println!("{key:<16} {value}");
        }
        for note in &card.notes {
            println!("note             {note}");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// roll
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct Roll {
    /// Run ID printed by `derive`
    #[arg(long)]
    run: String,

    /// Player ID
    #[arg(long)]
    player: u64,

    /// Roll result to resolve
    #[arg(long)]
    slot: u32,
}

impl Roll {
    pub fn execute(&self, ctx: &AppContext) -> Result<()> {
        match ctx.store.outcome_for_roll(&self.run, self.player, self.slot)? {
            Some(category) => println!("{category}"),
            None => println!("unassigned"),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// runs
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct Runs {
    /// Print runs as JSON
    #[arg(long)]
    json: bool,
}

impl Runs {
    pub fn execute(&self, ctx: &AppContext) -> Result<()> {
        let runs = ctx.store.list_runs()?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&runs)?);
            return Ok(());
        }
        for run in &runs {
            println!(
                "{}  {} {}  {} cards  {}",
                run.run_id, run.team, run.season, run.cards, run.created_at
            );
        }
        Ok(())
    }
}
