/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    sync::{atomic::AtomicBool, Arc},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::{
    init, parallel_perft, perft, splitperft, LogDebug, LogInfo, MaterialEvaluator, Position,
    Search, SearchConfig, TTable, MAX_DEPTH,
};

/// Command-line arguments to the engine.
#[derive(Debug, Clone, Parser)]
#[command(version, about, rename_all = "lower")]
pub struct Cli {
    /// Position to operate on, as a FEN string. Defaults to the standard starting position.
    #[arg(short, long, global = true)]
    pub fen: Option<String>,

    /// What to do with the position.
    #[command(subcommand)]
    pub command: EngineCommand,
}

/// A command to be executed by the engine.
#[derive(Debug, Clone, Subcommand)]
#[command(rename_all = "lower")]
pub enum EngineCommand {
    /// Performs a perft on the position at the supplied depth, printing total node count.
    Perft {
        depth: usize,

        /// Number of worker threads to split the root moves across.
        #[arg(short, long, default_value_t = 1)]
        threads: usize,
    },

    /// Performs a split perft on the position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },

    /// Search the position for the best move, printing UCI `info` lines along the way.
    #[command(alias = "go")]
    Search {
        /// Maximum depth to search to.
        #[arg(short, long)]
        depth: Option<u8>,

        /// Maximum number of nodes to search.
        #[arg(short, long)]
        nodes: Option<u64>,

        /// Maximum time to search, in milliseconds.
        #[arg(short, long)]
        movetime: Option<u64>,

        /// Size of the transposition table, in megabytes.
        #[arg(long, default_value_t = TTable::DEFAULT_SIZE)]
        hash: usize,

        /// If set, search limits and transposition table statistics are printed too.
        #[arg(long, default_value = "false")]
        debug: bool,
    },

    /// Shows all legal moves in the position.
    Moves {
        /// If set, moves will be printed using their debug formatter, which displays what kind of move it is (capture, en passant, etc.).
        #[arg(short, long, default_value = "false")]
        debug: bool,

        /// If set, moves will be sorted in alphabetical order.
        ///
        /// By default, moves are printed in generation order.
        #[arg(short, long, default_value = "false")]
        sort: bool,
    },

    /// Print the FEN string of the position, after parsing.
    Fen,

    /// Print a visual representation of the position.
    #[command(alias = "d")]
    Display,
}

impl Cli {
    /// Parses the position and executes the command on it.
    pub fn run(self) -> Result<()> {
        let position = match &self.fen {
            Some(fen) => Position::from_fen(fen)
                .with_context(|| format!("Failed to parse FEN {fen:?}"))?,
            None => Position::default(),
        };

        match self.command {
            EngineCommand::Perft { depth, threads } => run_perft(&position, depth, threads),

            EngineCommand::Splitperft { depth } => {
                let nodes = splitperft(&position, depth);
                println!("\n{nodes}");
            }

            EngineCommand::Search {
                depth,
                nodes,
                movetime,
                hash,
                debug,
            } => {
                let mut config = match movetime {
                    Some(ms) => SearchConfig::with_movetime(Duration::from_millis(ms)),
                    None => SearchConfig::default(),
                };
                config.max_depth = depth.unwrap_or(MAX_DEPTH).min(MAX_DEPTH);
                config.max_nodes = nodes.unwrap_or(u64::MAX);

                run_search(&position, config, hash, debug);
            }

            EngineCommand::Moves { debug, sort } => {
                let mut moves = position.legal_moves();
                if sort {
                    moves.sort_by_key(|mv| mv.to_string());
                }

                let moves_string = if debug {
                    moves
                        .iter()
                        .map(|mv| format!("{mv:?}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                } else {
                    moves
                        .iter()
                        .map(|mv| mv.to_string())
                        .collect::<Vec<_>>()
                        .join(" ")
                };

                println!("{moves_string}");
            }

            EngineCommand::Fen => println!("{position}"),

            EngineCommand::Display => println!("{position:?}"),
        }

        Ok(())
    }
}

/// Executes the `perft` command, printing the node count and speed.
fn run_perft(position: &Position, depth: usize, threads: usize) {
    // Don't count table construction towards the time
    init();

    let now = Instant::now();
    let nodes = if threads > 1 {
        parallel_perft(position, depth, threads)
    } else {
        perft(position, depth)
    };
    let elapsed = now.elapsed();

    let nps = (nodes as f32 / elapsed.as_secs_f32()) as u64;
    let ms = elapsed.as_millis();
    println!("{nodes} nodes in {ms}ms ({nps} nps)");
}

/// Executes the `search` command, blocking until it completes.
fn run_search(position: &Position, config: SearchConfig, hash: usize, debug: bool) {
    let mut ttable = TTable::new(hash);
    let is_searching = Arc::new(AtomicBool::new(true));

    if debug {
        Search::<LogDebug, _>::new(is_searching, config, &mut ttable, MaterialEvaluator)
            .start(position);
    } else {
        Search::<LogInfo, _>::new(is_searching, config, &mut ttable, MaterialEvaluator)
            .start(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_command() {
        let fen = "8/8/8/8/8/8/8/K1k5 w - - 0 1";
        let cli = Cli::try_parse_from(["newt", "search", "--depth", "5", "--fen", fen]).unwrap();

        assert_eq!(cli.fen.as_deref(), Some(fen));
        assert!(matches!(
            cli.command,
            EngineCommand::Search {
                depth: Some(5),
                nodes: None,
                debug: false,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_perft_threads() {
        let cli = Cli::try_parse_from(["newt", "perft", "4", "-t", "8"]).unwrap();
        assert!(cli.fen.is_none());
        assert!(matches!(
            cli.command,
            EngineCommand::Perft {
                depth: 4,
                threads: 8
            }
        ));
    }

    #[test]
    fn test_bad_fen_is_an_error() {
        let cli = Cli::try_parse_from(["newt", "fen", "--fen", "not a fen"]).unwrap();
        assert!(cli.run().is_err());
    }
}
