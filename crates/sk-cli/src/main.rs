//! CLI frontend for the Skirmish ECS runtime.

mod commands;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[allow(missing_docs)]
#[derive(Parser)]
#[command(
    name = "skirmish",
    about = "Skirmish: a turn-based tactics game on a small ECS runtime",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. debug, sk_core=trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[allow(missing_docs)]
#[derive(Subcommand)]
enum Commands {
    /// Play a headless match
    Run {
        /// Frame cap (0 = until the match is decided)
        #[arg(short, long, default_value = "200")]
        frames: u64,

        /// RNG seed for deterministic spawn placement
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Regular enemies in the first level
        #[arg(short, long, default_value = "5")]
        enemies: i64,

        /// Number of levels to clear
        #[arg(short, long, default_value = "3")]
        levels: i64,

        /// Turns between two spawns
        #[arg(long, default_value = "5")]
        spawn_interval: i64,

        /// Starting hit points of the player
        #[arg(long, default_value = "30")]
        player_health: i64,

        /// Print one row per frame instead of the final frame only
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the declared component schemas
    Schema {
        /// Show a single component
        tag: Option<String>,

        /// One `tag.field = default` line per field, without a table
        #[arg(long)]
        plain: bool,
    },
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Commands::Run {
            frames,
            seed,
            enemies,
            levels,
            spawn_interval,
            player_health,
            verbose,
        } => {
            let config = sk_game::MatchConfig::default()
                .with_max_frames(frames)
                .with_seed(seed)
                .with_enemy_count(enemies)
                .with_levels(levels)
                .with_spawn_interval(spawn_interval)
                .with_player_health(player_health);
            commands::run::run(&config, verbose)
        }
        Commands::Schema { tag, plain } => commands::schema::run(tag.as_deref(), plain),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
