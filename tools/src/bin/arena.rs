use anyhow::bail;
use clap::Parser;
use rayon::prelude::*;
use uttt::environment::{GameResult, GameState};
use uttt::game::core::Player;
use uttt::game::Position;
use uttt::mcts;
use uttt::util::seeded_rng;

/// Plays engine-vs-engine games between two simulation budgets to compare
/// their strength. Colours alternate between games.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of games to play.
    #[arg(long, default_value_t = 100)]
    games: usize,
    /// Simulations per move of the first engine.
    #[arg(long, default_value_t = 5_000)]
    first: usize,
    /// Simulations per move of the second engine.
    #[arg(long, default_value_t = 1_000)]
    second: usize,
    /// Base seed, game `i` uses `seed + i`.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Size of the thread pool, all cores are used by default.
    #[arg(long)]
    threads: Option<usize>,
}

/// Plays a single game and returns the outcome for the first engine.
fn play_game(first_plays_x: bool, first: usize, second: usize, seed: u64) -> GameResult {
    let mut rng = seeded_rng(Some(seed));
    let mut position = Position::starting();
    let first_player = if first_plays_x { Player::X } else { Player::O };
    while !position.is_game_over() {
        let simulations = if position.us() == first_player {
            first
        } else {
            second
        };
        let ranking = mcts::get_top_actions(&position, simulations, &mut rng);
        match ranking.first() {
            Some(best) => position.apply(&best.action),
            None => break,
        }
    }
    position.result(first_player)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.games == 0 {
        bail!("at least one game has to be played");
    }
    if args.first == 0 || args.second == 0 {
        bail!("both engines need a non-zero simulation budget");
    }
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    println!(
        "Playing {} games: {} vs {} simulations per move",
        args.games, args.first, args.second
    );

    let results: Vec<GameResult> = (0..args.games)
        .into_par_iter()
        .map(|game| {
            play_game(
                game % 2 == 0,
                args.first,
                args.second,
                args.seed + game as u64,
            )
        })
        .collect();

    let count = |expected: GameResult| results.iter().filter(|&&result| result == expected).count();
    let (wins, draws, losses) = (
        count(GameResult::Win),
        count(GameResult::Draw),
        count(GameResult::Loss),
    );
    let score = results.iter().map(|result| result.reward()).sum::<f64>() / results.len() as f64;
    println!("First engine: +{wins} ={draws} -{losses} (score {score:.3})");

    Ok(())
}
