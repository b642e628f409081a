//! DuelChess - Perft Module
//!
//! Counts the move paths of a given length from a position. The totals are
//! well known for the opening position, which makes perft the standard way
//! to validate a move generator. The parallel runner hands root moves out
//! to worker threads; every worker owns its own copy of the game.

use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::board::Move;
use crate::game::Game;

/// Result of a perft run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PerftReport {
    pub depth: usize,
    pub nodes: u64,
    /// Node count below each root move, in generation order
    pub divide: Vec<(Move, u64)>,
    pub elapsed: Duration,
}

impl PerftReport {
    /// Nodes per second, 0 for runs too short to time
    pub fn nps(&self) -> u64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.nodes as f64 / secs) as u64
        } else {
            0
        }
    }
}

/// Count leaf nodes `depth` plies below `game`
pub fn perft(game: &Game, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = game.legal_moves(game.turn());

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for mv in moves {
        let mut child = game.clone();
        if child.make_move(mv).is_ok() {
            nodes += perft(&child, depth - 1);
        }
    }

    nodes
}

/// Perft split by root move
pub fn divide(game: &Game, depth: usize) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }

    game.legal_moves(game.turn())
        .into_iter()
        .filter_map(|mv| {
            let mut child = game.clone();
            child.make_move(mv).ok()?;
            Some((mv, perft(&child, depth - 1)))
        })
        .collect()
}

/// Multi-threaded perft over the root moves
pub struct ParallelPerft {
    pub num_threads: usize,
}

impl ParallelPerft {
    /// `num_threads == 0` means one worker per logical CPU
    pub fn new(num_threads: usize) -> Self {
        let mut runner = ParallelPerft { num_threads: 1 };
        runner.set_threads(num_threads);
        runner
    }

    pub fn set_threads(&mut self, threads: usize) {
        self.num_threads = if threads == 0 {
            num_cpus::get()
        } else {
            threads.max(1)
        };
    }

    pub fn run(&self, game: &Game, depth: usize) -> PerftReport {
        let start = Instant::now();

        if depth == 0 {
            return PerftReport {
                depth,
                nodes: 1,
                divide: Vec::new(),
                elapsed: start.elapsed(),
            };
        }

        let root_moves = Arc::new(game.legal_moves(game.turn()));
        let next = Arc::new(AtomicUsize::new(0));
        let workers = self.num_threads.min(root_moves.len()).max(1);

        let handles: Vec<_> = (0..workers)
            .map(|worker_id| {
                let root_moves = Arc::clone(&root_moves);
                let next = Arc::clone(&next);
                let game = game.clone();

                thread::spawn(move || {
                    let mut results = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(&mv) = root_moves.get(index) else {
                            break;
                        };
                        let mut child = game.clone();
                        if child.make_move(mv).is_ok() {
                            results.push((index, mv, perft(&child, depth - 1)));
                        }
                    }
                    debug!(worker_id, finished = results.len(), "perft worker done");
                    results
                })
            })
            .collect();

        let mut collected = join_workers(handles);
        collected.sort_by_key(|&(index, _, _)| index);

        let divide: Vec<(Move, u64)> = collected.into_iter().map(|(_, mv, n)| (mv, n)).collect();
        let nodes: u64 = divide.iter().map(|&(_, n)| n).sum();

        let report = PerftReport {
            depth,
            nodes,
            divide,
            elapsed: start.elapsed(),
        };
        info!(
            depth,
            nodes = report.nodes,
            threads = workers,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "perft complete"
        );
        report
    }
}

type WorkerResults = Vec<(usize, Move, u64)>;

/// Merge every worker's results. A panicked worker is re-raised here, since
/// its root moves would otherwise be missing from the total.
fn join_workers(handles: Vec<JoinHandle<WorkerResults>>) -> WorkerResults {
    let mut collected = Vec::new();
    for handle in handles {
        match handle.join() {
            Ok(results) => collected.extend(results),
            Err(payload) => {
                error!("perft worker panicked");
                panic::resume_unwind(payload);
            }
        }
    }
    collected
}

impl Default for ParallelPerft {
    fn default() -> Self {
        ParallelPerft::new(0)
    }
}
