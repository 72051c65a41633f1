use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use sk_game::components::Game;
use sk_game::{FrameSummary, HeadlessDriver, MatchConfig, build_match, run_loop};
use tracing::info;

pub fn run(config: &MatchConfig, verbose: bool) -> Result<(), String> {
    let mut group = build_match(config).map_err(|e| format!("match setup failed: {e}"))?;
    let mut driver = HeadlessDriver::new();
    let frames = run_loop(&mut group, &mut driver, config.max_frames)
        .map_err(|e| format!("match aborted: {e}"))?;
    info!(frames, clips = driver.clips_played(), "match finished");

    println!(
        "  {} {}",
        "Match".bold(),
        format!(
            "(seed={}, enemies={}, levels={}, spawn interval={})",
            config.seed, config.enemy_count, config.levels, config.spawn_interval
        )
        .dimmed()
    );
    println!(
        "  {frames} frames played, {} clips played",
        driver.clips_played()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Frame", "Turn", "Level", "Entities", "Enemies", "Player HP", "State"]);

    let rows: &[FrameSummary] = if verbose {
        driver.frames()
    } else {
        driver.frames().last().map(std::slice::from_ref).unwrap_or_default()
    };
    for summary in rows {
        table.add_row(vec![
            summary.frame.to_string(),
            summary.turn.to_string(),
            summary.level.to_string(),
            summary.entities.to_string(),
            summary.enemies.to_string(),
            summary.player_health.to_string(),
            state_name(summary.game_state).to_string(),
        ]);
    }
    println!("{table}");
    println!();

    let outcome = driver.last().map(|s| s.game_state);
    match outcome {
        Some(Game::STATE_WIN) => println!("  {}", "VICTORY".green().bold()),
        Some(Game::STATE_GAME_OVER) => println!("  {}", "DEFEAT".red().bold()),
        _ => println!("  {}", "UNDECIDED".yellow().bold()),
    }
    Ok(())
}

fn state_name(state: i64) -> &'static str {
    match state {
        Game::STATE_START_SCREEN => "start screen",
        Game::STATE_PLAYING => "playing",
        Game::STATE_GAME_OVER => "game over",
        Game::STATE_WIN => "win",
        _ => "unknown",
    }
}
