//! DuelChess - Console Protocol Module
//!
//! A line-oriented text protocol for driving a [`Game`] from a terminal or
//! a script. One command per line; replies go to the writer given to
//! [`Console::new`].
//!
//! ```text
//! new                         start a fresh game
//! position <fen> [w|b]        load a placement and side to move
//! d                           draw the board and status
//! moves <square>              legal moves of the piece on a square
//! move <e2e4|e7e8q>           play a move for the side to move
//! status                      check / checkmate / stalemate for both sides
//! perft <depth> | divide <depth>
//! playout [plies]             finish the game with random moves
//! setoption name <Name> value <v>
//! debug on|off
//! quit
//! ```

use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::game::Game;
use crate::perft::ParallelPerft;
use crate::playout::{Playout, DEFAULT_MAX_PLIES};
use crate::types::{Color, Position};

/// A console option, modelled on UCI spin/check options
#[derive(Clone, Debug)]
pub enum ConsoleOption {
    Spin {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
    Check {
        name: &'static str,
        value: bool,
    },
}

impl ConsoleOption {
    pub fn name(&self) -> &'static str {
        match self {
            ConsoleOption::Spin { name, .. } | ConsoleOption::Check { name, .. } => *name,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ConsoleOption::Spin {
                name,
                value,
                min,
                max,
            } => format!("option name {} type spin value {} min {} max {}", name, value, min, max),
            ConsoleOption::Check { name, value } => {
                format!("option name {} type check value {}", name, value)
            }
        }
    }

    /// Returns false if the value is out of range or not understood
    pub fn set_value(&mut self, value_str: &str) -> bool {
        match self {
            ConsoleOption::Spin {
                value, min, max, ..
            } => match value_str.parse::<u64>() {
                Ok(v) if v >= *min && v <= *max => {
                    *value = v;
                    true
                }
                _ => false,
            },
            ConsoleOption::Check { value, .. } => match value_str.to_lowercase().as_str() {
                "true" | "on" => {
                    *value = true;
                    true
                }
                "false" | "off" => {
                    *value = false;
                    true
                }
                _ => false,
            },
        }
    }

    pub fn get_int(&self) -> u64 {
        match self {
            ConsoleOption::Spin { value, .. } => *value,
            ConsoleOption::Check { value, .. } => *value as u64,
        }
    }

    pub fn get_bool(&self) -> bool {
        match self {
            ConsoleOption::Spin { value, .. } => *value != 0,
            ConsoleOption::Check { value, .. } => *value,
        }
    }
}

/// Startup settings for a console session
#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    /// Perft worker threads, 0 for one per CPU
    pub threads: usize,
    pub seed: u64,
    pub max_plies: usize,
    pub debug: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            threads: 0,
            seed: 0,
            max_plies: DEFAULT_MAX_PLIES,
            debug: false,
        }
    }
}

/// Console protocol handler
pub struct Console<W: Write> {
    game: Game,
    perft: ParallelPerft,
    out: W,
    running: bool,
    options: Vec<ConsoleOption>,
}

impl<W: Write> Console<W> {
    pub fn new(config: ConsoleConfig, out: W) -> Self {
        let perft = ParallelPerft::new(config.threads);
        let options = vec![
            ConsoleOption::Spin {
                name: "Threads",
                value: perft.num_threads as u64,
                min: 1,
                max: 256,
            },
            ConsoleOption::Spin {
                name: "Seed",
                value: config.seed,
                min: 0,
                max: u64::MAX,
            },
            ConsoleOption::Spin {
                name: "MaxPlies",
                value: config.max_plies as u64,
                min: 1,
                max: 10_000,
            },
            ConsoleOption::Check {
                name: "Debug",
                value: config.debug,
            },
        ];

        Console {
            game: Game::new(),
            perft,
            out,
            running: true,
            options,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn option(&self, name: &str) -> Option<&ConsoleOption> {
        self.options.iter().find(|opt| opt.name() == name)
    }

    fn debug_mode(&self) -> bool {
        self.option("Debug").map(|o| o.get_bool()).unwrap_or(false)
    }

    fn apply_options(&mut self) {
        if let Some(threads) = self.option("Threads").map(|o| o.get_int() as usize) {
            self.perft.set_threads(threads);
        }
    }

    /// Read commands until `quit` or end of input
    pub fn run<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if !line.is_empty() {
                self.process_command(line)?;
            }
            if !self.running {
                break;
            }
        }
        Ok(())
    }

    pub fn process_command(&mut self, line: &str) -> io::Result<()> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            return Ok(());
        };

        match command {
            "new" => self.cmd_new(),
            "position" => self.cmd_position(args),
            "d" => self.cmd_display(args),
            "moves" => self.cmd_moves(args),
            "move" => self.cmd_move(args),
            "status" => self.cmd_status(),
            "perft" => self.cmd_perft(args, false),
            "divide" => self.cmd_perft(args, true),
            "playout" => self.cmd_playout(args),
            "setoption" => self.cmd_setoption(args),
            "options" => self.cmd_options(),
            "debug" => self.cmd_debug(args),
            "quit" => {
                self.running = false;
                Ok(())
            }
            _ => {
                warn!(command, "unknown command");
                self.send(&format!("error unknown command: {}", command))
            }
        }
    }

    fn send(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message)?;
        self.out.flush()
    }

    fn cmd_new(&mut self) -> io::Result<()> {
        self.game = Game::new();
        self.send("ok")
    }

    fn cmd_position(&mut self, args: &[&str]) -> io::Result<()> {
        if args.is_empty() {
            return self.send("error usage: position <placement> [w|b]");
        }
        match Game::from_fen(&args.join(" ")) {
            Ok(game) => {
                self.game = game;
                self.send("ok")
            }
            Err(err) => self.send(&format!("error {}", err)),
        }
    }

    fn cmd_display(&mut self, args: &[&str]) -> io::Result<()> {
        let perspective = match args.first().map(|s| s.parse::<Color>()) {
            Some(Ok(side)) => side,
            Some(Err(_)) => return self.send("error usage: d [w|b]"),
            None => Color::White,
        };
        let board = self.game.board().render(perspective);
        self.send(&board)?;
        let fen = self.game.to_fen();
        self.send(&format!("FEN: {}", fen))?;
        let turn = self.game.turn();
        self.send(&format!("Turn: {}", turn))?;
        let status = self.game.status();
        self.send(&format!("Status: {}", status))?;
        let count = self.game.legal_moves(turn).len();
        self.send(&format!("Legal moves: {}", count))
    }

    fn cmd_moves(&mut self, args: &[&str]) -> io::Result<()> {
        let square = match args.first().map(|s| s.parse::<Position>()) {
            Some(Ok(pos)) => pos,
            Some(Err(err)) => return self.send(&format!("error {}", err)),
            None => return self.send("error usage: moves <square>"),
        };

        match self.game.valid_moves(square) {
            None => self.send(&format!("error no piece at {}", square)),
            Some(moves) => {
                let list: Vec<String> = moves.iter().map(|mv| mv.to_string()).collect();
                self.send(&format!("moves {}", list.join(" ")))
            }
        }
    }

    fn cmd_move(&mut self, args: &[&str]) -> io::Result<()> {
        let Some(text) = args.first() else {
            return self.send("error usage: move <e2e4>");
        };

        let mv = match self.game.parse_move(text) {
            Ok(mv) => mv,
            Err(err) => return self.send(&format!("error {}", err)),
        };

        if let Err(err) = self.game.make_move(mv) {
            return self.send(&format!("error {}", err));
        }

        let status = self.game.status();
        let turn = self.game.turn();
        self.send(&format!("ok {} {} {}", mv, turn, status))
    }

    fn cmd_status(&mut self) -> io::Result<()> {
        for color in [Color::White, Color::Black] {
            let line = format!(
                "{} check {} checkmate {} stalemate {}",
                color,
                self.game.is_in_check(color),
                self.game.is_in_checkmate(color),
                self.game.is_in_stalemate(color)
            );
            self.send(&line)?;
        }
        Ok(())
    }

    fn cmd_perft(&mut self, args: &[&str], split: bool) -> io::Result<()> {
        let depth = match args.first().map(|s| s.parse::<usize>()) {
            Some(Ok(depth)) => depth,
            Some(Err(_)) => {
                let command = if split { "divide" } else { "perft" };
                return self.send(&format!("error usage: {} <depth>", command));
            }
            None => 1,
        };

        let report = self.perft.run(&self.game, depth);
        if split {
            for (mv, nodes) in &report.divide {
                let line = format!("{}: {}", mv, nodes);
                self.send(&line)?;
            }
        }
        self.send(&format!("Nodes: {}", report.nodes))?;
        if self.debug_mode() {
            let line = format!(
                "info time {} nps {}",
                report.elapsed.as_millis(),
                report.nps()
            );
            self.send(&line)?;
        }
        Ok(())
    }

    fn cmd_playout(&mut self, args: &[&str]) -> io::Result<()> {
        let default_plies = self
            .option("MaxPlies")
            .map(|o| o.get_int() as usize)
            .unwrap_or(DEFAULT_MAX_PLIES);
        let plies = match args.first().map(|s| s.parse::<usize>()) {
            Some(Ok(plies)) => plies,
            Some(Err(_)) => return self.send("error usage: playout [plies]"),
            None => default_plies,
        };
        let seed = self.option("Seed").map(|o| o.get_int()).unwrap_or(0);

        let report = Playout::new(seed).run(&mut self.game, plies);
        let moves: Vec<String> = report.moves.iter().map(|mv| mv.to_string()).collect();
        self.send(&format!("playout {}", moves.join(" ")))?;
        self.send(&format!(
            "result {} plies {} {} {}",
            report.seed,
            report.plies(),
            report.side_to_move,
            report.status
        ))
    }

    fn cmd_setoption(&mut self, args: &[&str]) -> io::Result<()> {
        if args.len() < 2 || args[0] != "name" {
            return self.send("error usage: setoption name <Name> value <v>");
        }

        let mut name_parts = Vec::new();
        let mut value_str = None;
        let mut i = 1;

        while i < args.len() {
            if args[i] == "value" {
                if i + 1 < args.len() {
                    value_str = Some(args[i + 1..].join(" "));
                }
                break;
            }
            name_parts.push(args[i]);
            i += 1;
        }

        let name = name_parts.join(" ");
        let Some(value) = value_str else {
            return self.send(&format!("error no value for {}", name));
        };

        let Some(index) = self.options.iter().position(|opt| opt.name() == name) else {
            return self.send(&format!("error unknown option: {}", name));
        };

        if !self.options[index].set_value(&value) {
            return self.send(&format!("error bad value for {}: {}", name, value));
        }

        self.apply_options();
        self.send("ok")
    }

    fn cmd_options(&mut self) -> io::Result<()> {
        let lines: Vec<String> = self.options.iter().map(|o| o.describe()).collect();
        for line in lines {
            self.send(&line)?;
        }
        Ok(())
    }

    fn cmd_debug(&mut self, args: &[&str]) -> io::Result<()> {
        let on = args.first().map(|a| *a == "on").unwrap_or(true);
        if let Some(opt) = self.options.iter_mut().find(|o| o.name() == "Debug") {
            opt.set_value(if on { "true" } else { "false" });
        }
        self.send("ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(script: &str) -> String {
        let mut console = Console::new(ConsoleConfig::default(), Vec::new());
        console.run(script.as_bytes()).unwrap();
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn move_and_reject() {
        let out = session("move e2e4\nmove e2e4\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ok e2e4 black ongoing");
        assert_eq!(lines[1], "error no piece at e2");
    }

    #[test]
    fn bad_arguments_get_usage() {
        let out = session("perft abc\ndivide -1\nd xyz\nplayout many\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "error usage: perft <depth>",
                "error usage: divide <depth>",
                "error usage: d [w|b]",
                "error usage: playout [plies]",
            ]
        );
    }

    #[test]
    fn quit_stops_reading() {
        let out = session("quit\nnew\n");
        assert!(out.is_empty());
    }

    #[test]
    fn spin_option_range() {
        let mut opt = ConsoleOption::Spin {
            name: "Threads",
            value: 1,
            min: 1,
            max: 8,
        };
        assert!(!opt.set_value("0"));
        assert!(!opt.set_value("many"));
        assert!(opt.set_value("4"));
        assert_eq!(opt.get_int(), 4);
    }

    #[test]
    fn setoption_updates_threads() {
        let mut console = Console::new(ConsoleConfig::default(), Vec::new());
        console
            .process_command("setoption name Threads value 2")
            .unwrap();
        assert_eq!(console.perft.num_threads, 2);
        let out = String::from_utf8(console.into_inner()).unwrap();
        assert_eq!(out, "ok\n");
    }
}
