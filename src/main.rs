//! DuelChess - rules engine console
//!
//! Usage:
//!     duel_chess [--threads N] [--seed S] [--max-plies P] [--log-level LEVEL]
//!     duel_chess --perft DEPTH
//!
//! Without `--perft` the program reads console commands from stdin and
//! writes replies to stdout. Logs go to stderr.

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use duel_chess::console::{Console, ConsoleConfig};
use duel_chess::game::Game;
use duel_chess::perft::ParallelPerft;
use duel_chess::playout::DEFAULT_MAX_PLIES;

#[derive(Parser, Debug)]
#[command(name = "duel_chess", version, about = "Chess rules engine console")]
struct Cli {
    /// Perft worker threads (0 = one per CPU)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Seed for random playouts
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Ply limit for random playouts
    #[arg(long, default_value_t = DEFAULT_MAX_PLIES)]
    max_plies: usize,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Run perft from the opening position to this depth and exit
    #[arg(long)]
    perft: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Some(depth) = cli.perft {
        let report = ParallelPerft::new(cli.threads).run(&Game::new(), depth);
        for (mv, nodes) in &report.divide {
            println!("{}: {}", mv, nodes);
        }
        println!("Nodes: {}", report.nodes);
        return Ok(());
    }

    let config = ConsoleConfig {
        threads: cli.threads,
        seed: cli.seed,
        max_plies: cli.max_plies,
        debug: false,
    };

    let stdin = io::stdin();
    let mut console = Console::new(config, io::stdout());
    console.run(stdin.lock())?;
    Ok(())
}
