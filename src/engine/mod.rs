//! The engine puts all pieces together: it runs an interactive game session
//! between a human and the search (or between two humans or two engines),
//! reading moves from the input stream and writing the board to the output.
//!
//! [`Engine::play`] is the "main loop" of the program.

use std::io::{BufRead, Write};

use rand::RngCore;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::engine::command::Command;
use crate::environment::GameState;
use crate::game::core::Move;
use crate::game::Position;
use crate::mcts::{self, RankedAction};
use crate::util;

mod command;

/// Who makes the moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// The human plays X, the engine answers with O.
    HumanVsEngine,
    /// The human enters moves for both sides.
    HumanVsHuman,
    /// The engine plays both sides.
    EngineVsEngine,
}

/// Session parameters.
#[derive(Clone, Debug)]
pub struct Config {
    #[allow(missing_docs)]
    pub mode: Mode,
    /// Parameters of every engine search.
    pub search: mcts::Config,
    /// Seed of the random generator, entropy is used if it is not set.
    pub seed: Option<u64>,
    /// Print the ranking of all explored moves before each engine move.
    pub show_ranking: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::HumanVsEngine,
            search: mcts::Config::default(),
            seed: None,
            show_ranking: false,
        }
    }
}

/// The Engine connects everything together and handles the commands sent by
/// the human, including I/O.
pub struct Engine<R: BufRead, W: Write> {
    position: Position,
    input: R,
    output: W,
    config: Config,
    rng: ChaCha8Rng,
}

impl<R: BufRead, W: Write> Engine<R, W> {
    /// Creates a new instance of the engine with starting position and provided
    /// I/O.
    #[must_use]
    pub fn new(input: R, output: W, config: Config) -> Self {
        let rng = util::seeded_rng(config.seed);
        Self {
            position: Position::starting(),
            input,
            output,
            config,
            rng,
        }
    }

    /// Current position of the game.
    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Plays the game until it is over, the human quits or the input stream
    /// ends.
    ///
    /// Human moves are squares in the four-digit notation (see
    /// [`crate::game::core::Square`]). Unparseable input and unavailable
    /// squares are reported and asked for again.
    pub fn play(&mut self) -> anyhow::Result<()> {
        info!(mode = ?self.config.mode, simulations = self.config.search.simulations, "new game");
        if self.config.mode != Mode::EngineVsEngine {
            self.print_instructions()?;
        }
        self.print_turn()?;

        while !self.position.is_game_over() {
            if self.config.mode != Mode::EngineVsEngine {
                writeln!(self.output)?;
                writeln!(self.output, "Choose a free space.")?;
                if !self.read_human_move()? {
                    info!("game abandoned");
                    return Ok(());
                }
                writeln!(self.output)?;
            }
            if self.config.mode != Mode::HumanVsHuman {
                self.make_engine_move()?;
            }
            if self.position.is_game_over() {
                break;
            }
            writeln!(self.output)?;
            self.print_turn()?;
        }
        self.announce_result()
    }

    fn print_instructions(&mut self) -> anyhow::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Greetings, human!")?;
        writeln!(self.output)?;
        writeln!(
            self.output,
            "The format for identifying spaces is four digits, 0 - 2, representing:"
        )?;
        writeln!(
            self.output,
            "1. number of rows down from top the relevant mini-board is,"
        )?;
        writeln!(
            self.output,
            "2. number of columns across from left the relevant mini-board is,"
        )?;
        writeln!(
            self.output,
            "3. number of rows down from top the space on the relevant mini-board is, and"
        )?;
        writeln!(
            self.output,
            "4. number of columns across from left the space on the relevant mini-board is."
        )?;
        writeln!(
            self.output,
            "For example, the top-left corner of the full board is 0000, and the center is 1111."
        )?;
        writeln!(
            self.output,
            "Spaces marked with ! are available. Type `board` to see the board again or `quit` to leave."
        )?;
        writeln!(self.output)?;
        Ok(())
    }

    fn print_turn(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "Current player: {}", self.position.us())?;
        writeln!(self.output)?;
        writeln!(self.output, "{}", self.position)?;
        Ok(())
    }

    /// Reads lines until a legal move is entered. Returns `false` if the human
    /// quits or the input ends.
    fn read_human_move(&mut self) -> anyhow::Result<bool> {
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            match Command::parse(&line) {
                Command::Play(square) => match self.position.try_make_move(square) {
                    Ok(played) => {
                        info!(%played, "human move");
                        return Ok(true);
                    },
                    Err(e) => {
                        debug!("rejected move: {e:#}");
                        writeln!(
                            self.output,
                            "That space is not available. Please try again."
                        )?;
                    },
                },
                Command::Board => writeln!(self.output, "{}", self.position)?,
                Command::Help => self.print_instructions()?,
                Command::Quit => return Ok(false),
                Command::Unknown(input) => {
                    debug!(%input, "unparseable input");
                    writeln!(
                        self.output,
                        "This input could not be parsed. Please try again."
                    )?;
                },
            }
        }
    }

    /// Searches the current position and plays the top-ranked move. Does
    /// nothing if the game is already over.
    fn make_engine_move(&mut self) -> anyhow::Result<()> {
        let ranking = if self.config.search.threads > 1 {
            let seed = self.rng.next_u64();
            mcts::search_parallel(&self.position, &self.config.search, seed)
        } else {
            mcts::search(&self.position, &self.config.search, &mut self.rng)
        };
        if self.config.show_ranking && !ranking.is_empty() {
            self.print_ranking(&ranking)?;
        }
        let Some(best) = ranking.first() else {
            return Ok(());
        };
        info!(
            played = %best.action,
            wins = best.wins,
            runs = best.runs,
            "engine move"
        );
        self.position.apply(&best.action);
        writeln!(self.output)?;
        writeln!(self.output, "Computer plays {}.", best.action)?;
        Ok(())
    }

    fn print_ranking(
        &mut self,
        ranking: &[RankedAction<Move>],
    ) -> anyhow::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Computer's ranked plays:")?;
        for ranked in ranking {
            writeln!(
                self.output,
                "\t{}\t{}/{} ({:.3})",
                ranked.action,
                ranked.wins,
                ranked.runs,
                ranked.win_rate()
            )?;
        }
        Ok(())
    }

    fn announce_result(&mut self) -> anyhow::Result<()> {
        writeln!(self.output)?;
        match self.position.winner() {
            Some(winner) => {
                info!(%winner, plies = self.position.plies(), "game over");
                writeln!(self.output, "{winner} has won!")?;
            },
            None => {
                info!(plies = self.position.plies(), "game drawn");
                writeln!(
                    self.output,
                    "Interestingly, the game seems to have ended in a stalemate."
                )?;
                writeln!(self.output, "How strange.")?;
            },
        }
        writeln!(self.output)?;
        writeln!(self.output, "{}", self.position)?;
        Ok(())
    }
}
