//! TETRS core - headless versus demo
//!
//! Two bots play a versus match against each other on the shared-seed
//! boards, then the match summary is printed as JSON.
//!
//! Usage: `tetrs-core [seed]`

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::io;
use tetrs_core::controller::ControllerState;
use tetrs_core::versus::SideStats;
use tetrs_core::{Command, GameConfig, Side, VersusMatch};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Upper bound on simulated frames before the match is called a draw
const MAX_FRAMES: u32 = 20_000;
/// Moves a bot makes before dropping
const MAX_BOT_MOVES: u32 = 5;

#[derive(Debug, Serialize)]
struct PlayerSummary {
    side: Side,
    state: ControllerState,
    score: u64,
    lines: u32,
    level: u32,
    blocks: u32,
    stats: SideStats,
}

#[derive(Debug, Serialize)]
struct MatchSummary {
    seed: u64,
    frames: u32,
    winner: Option<Side>,
    players: Vec<PlayerSummary>,
}

/// Get the tetrs temp directory, creating it if needed
fn tetrs_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("tetrs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Random shuffles and rotations, then a hard drop
fn bot_turn(game: &mut VersusMatch, side: Side, rng: &mut ChaCha8Rng) {
    const MOVES: [Command; 3] = [Command::MoveLeft, Command::MoveRight, Command::Rotate];
    for _ in 0..rng.gen_range(0..=MAX_BOT_MOVES) {
        if let Some(&command) = MOVES.choose(rng) {
            game.command(side, command);
        }
    }
    game.command(side, Command::HardDrop);
}

fn summarize(game: &VersusMatch, frames: u32) -> MatchSummary {
    let players = [Side::Left, Side::Right]
        .into_iter()
        .map(|side| {
            let player = game.player(side);
            let snapshot = player.snapshot();
            PlayerSummary {
                side,
                state: player.state(),
                score: snapshot.score(),
                lines: snapshot.total_lines_cleared(),
                level: snapshot.current_level(),
                blocks: snapshot.blocks_spawned(),
                stats: game.stats(side),
            }
        })
        .collect();
    MatchSummary {
        seed: game.player(Side::Left).seed(),
        frames,
        winner: game.winner(),
        players,
    }
}

fn main() -> io::Result<()> {
    let session_id: u32 = rand::random();

    let tetrs_dir = tetrs_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&tetrs_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = match "tetrs_core=debug".parse::<Directive>() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    tracing::info!(
        "TETRS core starting up, session={:08x}, log={}",
        session_id,
        tetrs_dir.join(&log_file).display()
    );

    let mut config = GameConfig::load();
    if let Some(arg) = std::env::args().nth(1) {
        match arg.parse::<u64>() {
            Ok(seed) => config.seed = Some(seed),
            Err(e) => tracing::warn!("Ignoring seed argument {:?}: {}", arg, e),
        }
    }
    tracing::info!("Config: {:?}", config);

    let mut game = VersusMatch::new(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(game.player(Side::Left).seed());
    game.start();

    let mut frames = 0;
    while !game.is_over() && frames < MAX_FRAMES {
        for side in [Side::Left, Side::Right] {
            if !game.player(side).is_animating() && rng.gen_bool(0.5) {
                bot_turn(&mut game, side, &mut rng);
            }
        }
        let delta = game.player(Side::Left).drop_interval_ms() / 4;
        game.tick(delta);
        game.take_events();
        frames += 1;
    }

    let summary = summarize(&game, frames);
    tracing::info!("Match finished after {} frames, winner {:?}", frames, summary.winner);
    let json = serde_json::to_string_pretty(&summary).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}
