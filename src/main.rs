use std::io;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use uttt::{mcts, Config, Engine, Mode};

/// How many simulations the engine spends on every move.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Effort {
    Less,
    Normal,
    More,
}

impl Effort {
    const fn simulations(self) -> usize {
        match self {
            Self::Less => 5_000,
            Self::Normal => 20_000,
            Self::More => 50_000,
        }
    }
}

/// Play Ultimate Tic-Tac-Toe against a Monte Carlo Tree Search engine.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Two humans play against each other.
    #[arg(long, conflicts_with = "ai_only")]
    no_ai: bool,
    /// The engine plays against itself.
    #[arg(long)]
    ai_only: bool,
    /// Thinking effort of the engine.
    #[arg(long, value_enum, default_value_t = Effort::Normal)]
    effort: Effort,
    /// Exact number of simulations per move, overrides `--effort`.
    #[arg(long)]
    simulations: Option<usize>,
    /// Number of independent search trees to grow in parallel.
    #[arg(long, default_value_t = 1)]
    threads: usize,
    /// Upper bound on the thinking time per move, in milliseconds.
    #[arg(long)]
    movetime: Option<u64>,
    /// Seed for reproducible engine play.
    #[arg(long)]
    seed: Option<u64>,
    /// Print the ranking of explored moves before every engine move.
    #[arg(long)]
    show_ranking: bool,
    /// Print version and build information on startup.
    #[arg(long)]
    info: bool,
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn config(&self) -> Config {
        let mode = if self.no_ai {
            Mode::HumanVsHuman
        } else if self.ai_only {
            Mode::EngineVsEngine
        } else {
            Mode::HumanVsEngine
        };
        Config {
            mode,
            search: mcts::Config {
                simulations: self
                    .simulations
                    .unwrap_or_else(|| self.effort.simulations()),
                threads: self.threads,
                time_limit: self.movetime.map(Duration::from_millis),
                ..mcts::Config::default()
            },
            seed: self.seed,
            show_ranking: self.show_ranking,
        }
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    if cli.info {
        uttt::print_engine_info();
        uttt::print_binary_info();
    }

    let mut engine = Engine::new(io::stdin().lock(), io::stdout().lock(), cli.config());
    engine.play()
}
