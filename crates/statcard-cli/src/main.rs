// statcard entry point.
//
// Logs go to stderr so stdout carries only card output.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Derive, Roll, Runs, Show};
use statcard_core::config::{self, Config};
use statcard_core::db::CardStore;

/// Derive tabletop player cards from season stats
#[derive(Parser)]
#[command(name = "statcard")]
#[command(about = "Derive tabletop baseball player cards from season stats", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding config/ (and defaults/ for first-run setup)
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Derive cards for a team roster and store them as a new run
    Derive(Derive),

    /// Print one stored card
    Show(Show),

    /// Resolve a roll result against a stored card
    Roll(Roll),

    /// List stored runs
    Runs(Runs),
}

/// Loaded configuration plus the opened store, shared by every command.
pub struct AppContext {
    pub base_dir: PathBuf,
    pub config: Config,
    pub store: CardStore,
}

impl AppContext {
    fn open(base_dir: PathBuf) -> Result<Self> {
        if let Some(path) =
            config::init_config(&base_dir).context("failed to initialize configuration")?
        {
            tracing::info!("created {} from defaults", path.display());
        }
        let config = config::load_config_from(&base_dir).context("failed to load configuration")?;

        let db_path = base_dir.join(&config.db_path);
        let db_path = db_path.to_string_lossy();
        let store = CardStore::open(&db_path).context("failed to open card store")?;

        Ok(AppContext {
            base_dir,
            config,
            store,
        })
    }

    /// Resolve a configured data path against the base directory.
    pub fn data_path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    let ctx = AppContext::open(cli.base_dir)?;

    match cli.command {
        Command::Derive(cmd) => cmd.execute(&ctx),
        Command::Show(cmd) => cmd.execute(&ctx),
        Command::Roll(cmd) => cmd.execute(&ctx),
        Command::Runs(cmd) => cmd.execute(&ctx),
    }
}

fn init_tracing() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("statcard=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
