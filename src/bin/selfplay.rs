//! Native AI-vs-AI games. Prints one JSON summary line per game.
//!
//! ```text
//! cargo run --release --bin selfplay --features selfplay -- --games 10 --seed 42
//! ```

use clap::Parser;
use crosschess_wasm::pieces::PlayerColor;
use crosschess_wasm::{AiSelection, EngineConfig, GameState, play_ai_turn};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "selfplay", about = "Four zero-depth AIs playing each other")]
struct Args {
    /// Number of games to play
    #[arg(short, long, default_value_t = 1)]
    games: u32,

    /// Base RNG seed. Game `i` uses `seed + i`.
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Stop a game after this many turns
    #[arg(long, default_value_t = 800)]
    max_turns: u32,

    /// Uniform pick inside the best bucket instead of weighted buckets
    #[arg(long)]
    best_only: bool,

    /// Remove defeated armies instead of freezing them
    #[arg(long)]
    no_frozen_army: bool,

    /// Log timings and every move to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct GameSummary {
    game: u32,
    seed: u64,
    winner: Option<PlayerColor>,
    turns: u32,
    plies: usize,
    scores: Vec<(PlayerColor, u32)>,
    defeated: Vec<PlayerColor>,
}

fn play_game(args: &Args, index: u32) -> GameSummary {
    let seed = args.seed.wrapping_add(index as u64);
    let config = EngineConfig {
        ai_seed: Some(seed),
        cpu_players: PlayerColor::ALL.to_vec(),
        ai_selection: if args.best_only { AiSelection::BestOnly } else { AiSelection::Weighted },
        frozen_army: !args.no_frozen_army,
        show_log: args.verbose,
        ..EngineConfig::default()
    };
    let mut game = GameState::new(config);
    let mut plies = 0;

    while game.winner().is_none() && game.turn_number <= args.max_turns {
        let turn = play_ai_turn(&mut game);
        plies += turn.plies.len();
        if !game.is_ai_turn() && game.winner().is_none() {
            break;
        }
    }

    GameSummary {
        game: index,
        seed,
        winner: game.winner(),
        turns: game.turn_number,
        plies,
        scores: game.players.iter().map(|p| (p.color, p.score)).collect(),
        defeated: game.players.iter().filter(|p| p.is_defeat).map(|p| p.color).collect(),
    }
}

fn main() {
    let args = Args::parse();
    for i in 0..args.games {
        let summary = play_game(&args, i);
        match serde_json::to_string(&summary) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("failed to encode game {i}: {e}"),
        }
    }
}
