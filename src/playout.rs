//! DuelChess - Random Playout Module
//!
//! Plays a game out with uniformly random legal moves from a seeded RNG.
//! Runs are reproducible from the seed, which makes playouts useful for
//! smoke-testing the state machine far from the opening.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::board::Move;
use crate::game::{Game, GameStatus};
use crate::types::Color;

/// Default ply limit for a playout
pub const DEFAULT_MAX_PLIES: usize = 200;

/// How a playout ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayoutReport {
    pub seed: u64,
    pub moves: Vec<Move>,
    /// Status of the side to move when the playout stopped
    pub status: GameStatus,
    pub side_to_move: Color,
    pub final_fen: String,
}

impl PlayoutReport {
    pub fn plies(&self) -> usize {
        self.moves.len()
    }
}

/// Seeded random mover
pub struct Playout {
    rng: StdRng,
    seed: u64,
}

impl Playout {
    pub fn new(seed: u64) -> Self {
        Playout {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Pick one legal move for the side to move, if there is any
    pub fn choose_move(&mut self, game: &Game) -> Option<Move> {
        let moves = game.legal_moves(game.turn());
        moves.choose(&mut self.rng).copied()
    }

    /// Play random legal moves on `game` until a side has no legal move or
    /// `max_plies` moves have been made
    pub fn run(&mut self, game: &mut Game, max_plies: usize) -> PlayoutReport {
        let mut moves = Vec::new();

        while moves.len() < max_plies {
            let Some(mv) = self.choose_move(game) else {
                break;
            };
            if let Err(err) = game.make_move(mv) {
                // Moves come from legal_moves, so this is a generator bug
                debug!(%mv, %err, "playout move refused");
                break;
            }
            moves.push(mv);
        }

        let status = game.status();
        info!(
            seed = self.seed,
            plies = moves.len(),
            %status,
            "playout finished"
        );

        PlayoutReport {
            seed: self.seed,
            moves,
            status,
            side_to_move: game.turn(),
            final_fen: game.to_fen(),
        }
    }
}
