/* =======================================================================
Rustic is a chess playing engine.
Copyright (C) 2019-2024, Marcel Vanthoor
https://rustic-chess.org/

Rustic is written in the Rust programming language. It is an original
work, not derived from any engine that came before it. However, it does
use a lot of concepts which are well-known and are in use by most if not
all classical alpha/beta-based chess engines.

Rustic is free software: you can redistribute it and/or modify it under
the terms of the GNU General Public License version 3 as published by
the Free Software Foundation.

Rustic is distributed in the hope that it will be useful, but WITHOUT
ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License
for more details.

You should have received a copy of the GNU General Public License along
with this program.  If not, see <http://www.gnu.org/licenses/>.
======================================================================= */

mod about;
pub mod defs;
pub mod transposition;

use self::{
    defs::{EngineOptionDefaults, ErrNormal, Settings},
    transposition::{PawnTable, PerftTable, TT},
};
use crate::{
    board::Board,
    comm::{
        defs::{GoCommand, UciCommand},
        Uci,
    },
    defs::FEN_KIWIPETE_POSITION,
    misc::cmdline::CmdLine,
    movegen::{defs::Move, MoveGenerator},
    search::{defs::SearchRefs, time::allocate_game_time, Search},
};
use std::{panic::AssertUnwindSafe, sync::Arc, time::Instant};

// The engine object glues everything together: one board, the shared
// precomputed tables, the hash tables, and the search. Commands are
// processed synchronously on the calling thread; the only other thread
// that ever exists is the search's sleeper.
pub struct Engine {
    settings: Settings,
    cmdline: CmdLine,
    board: Board,
    mg: Arc<MoveGenerator>,
    tt: TT,
    pawn_table: PawnTable,
    search: Search,
    uci: Uci,
    quit: bool,
}

impl Engine {
    pub fn new() -> Self {
        let cmdline = CmdLine::new();
        let settings = Settings {
            tt_size: cmdline
                .hash()
                .clamp(EngineOptionDefaults::HASH_MIN, EngineOptionDefaults::HASH_MAX),
            quiet: cmdline.quiet(),
        };

        let mg = Arc::new(MoveGenerator::new());
        let mut board = Board::new();
        let startup_fen = if cmdline.kiwipete() {
            Some(FEN_KIWIPETE_POSITION.to_string())
        } else {
            cmdline.fen()
        };
        if let Err(error) = board.fen_read(startup_fen.as_deref(), &mg) {
            eprintln!("{}: {error}", ErrNormal::FEN_FAILED);
            board.fen_read(None, &mg).expect("start position is valid");
        }

        let mut search = Search::new();
        search.quiet = settings.quiet;

        Self {
            tt: TT::new(settings.tt_size),
            pawn_table: PawnTable::new(),
            settings,
            cmdline,
            board,
            mg,
            search,
            uci: Uci::new(),
            quit: false,
        }
    }

    pub fn run(&mut self) {
        self.print_ascii_logo();
        self.print_about();

        // One-shot perft from the command line, then exit.
        let perft_depth = self.cmdline.perft();
        if perft_depth > 0 {
            self.run_perft(perft_depth as u8, true);
            return;
        }

        while !self.quit {
            let line = self.uci.read_line();
            if line.is_empty() {
                continue;
            }
            let command = Uci::parse(&line);

            // The loop survives anything a command handler does wrong;
            // the failure is reported and the engine stays live.
            let outcome =
                std::panic::catch_unwind(AssertUnwindSafe(|| self.execute(command)));
            if outcome.is_err() {
                self.uci
                    .respond(&format!("{}: '{line}'", ErrNormal::COMMAND_FAILED));
            }
        }
    }

    fn execute(&mut self, command: UciCommand) {
        match command {
            UciCommand::Uci => self.uci.identify(),
            UciCommand::IsReady => self.uci.respond("readyok"),
            UciCommand::Debug(enabled) => self.search.debug = enabled,
            UciCommand::Print => {
                let display = self.board.as_display_string();
                self.uci.respond(&display);
            }
            UciCommand::Quit => self.quit = true,
            UciCommand::NewGame => {
                self.board
                    .fen_read(None, &self.mg)
                    .expect("start position is valid");
                self.tt.clear();
                self.pawn_table.clear();
            }
            UciCommand::SetOption { name, value } => self.set_option(&name, &value),
            UciCommand::Position { fen, moves } => self.set_position(fen, moves),
            UciCommand::Go(go) => self.go(go),
            UciCommand::Unknown(line) => {
                self.uci.respond(&format!("Unknown command: '{line}'."));
            }
        }
    }

    fn set_option(&mut self, name: &str, value: &str) {
        match name {
            "hash" => match value.parse::<usize>() {
                Ok(megabytes) => {
                    let megabytes = megabytes
                        .clamp(EngineOptionDefaults::HASH_MIN, EngineOptionDefaults::HASH_MAX);
                    self.settings.tt_size = megabytes;
                    let exponent = self.tt.resize(megabytes);
                    self.uci
                        .respond(&format!("Number of hash table entries: 2^{exponent}"));
                }
                Err(_) => self.uci.respond(ErrNormal::SETOPTION_FAILED),
            },
            "maxsearchtime" => match value.parse::<u128>() {
                Ok(seconds) => {
                    self.search.time_pkg.max_thinking_time = seconds.clamp(
                        EngineOptionDefaults::MAX_SEARCH_TIME_MIN,
                        EngineOptionDefaults::MAX_SEARCH_TIME_MAX,
                    ) * 1_000;
                }
                Err(_) => self.uci.respond(ErrNormal::SETOPTION_FAILED),
            },
            _ => self
                .uci
                .respond(&format!("{}: '{name}'", ErrNormal::UNKNOWN_OPTION)),
        }
    }

    // Load a position and replay the given move list, keeping the
    // repetition counts in step (and resetting them across every
    // irreversible move).
    fn set_position(&mut self, fen: Option<String>, moves: Vec<String>) {
        if self.board.fen_read(fen.as_deref(), &self.mg).is_err() {
            self.uci.respond(ErrNormal::FEN_FAILED);
            return;
        }
        self.search.repetitions.clear();

        let mut next = Board::new();
        for move_string in &moves {
            let parsed = Move::from_uci(move_string, self.board.us())
                .map(|m| self.board.complete_implicit_promotion(m));

            let legal = match parsed {
                Some(m) if self.board.move_list.contains(m) => m,
                _ => {
                    self.uci
                        .respond(&format!("{} ({move_string})", ErrNormal::NOT_LEGAL));
                    return;
                }
            };

            if self.board.is_irreversible_move(legal) {
                self.search.repetitions.clear();
            }
            self.board.make_move(legal, &self.mg, &mut next);
            self.board = next;
            self.search.repetitions.push(self.board.game_state.zobrist_key);
        }
    }

    fn go(&mut self, go: GoCommand) {
        let best_move = match go {
            GoCommand::Perft(depth) => {
                let nodes = self.run_perft(depth, false);
                self.uci.respond(&format!("Nodes searched: {nodes}"));
                return;
            }
            GoCommand::Depth(depth) => self.run_search(SearchLimit::Depth(depth)),
            GoCommand::Infinite => {
                self.run_search(SearchLimit::Timed(self.search.time_pkg.max_thinking_time))
            }
            GoCommand::MoveTime(movetime) => self.run_search(SearchLimit::Timed(movetime)),
            GoCommand::GameTime {
                wtime,
                btime,
                winc,
                binc,
            } => {
                let (clock, increment) = if self.board.us() == crate::defs::Sides::WHITE {
                    (wtime, winc)
                } else {
                    (btime, binc)
                };
                self.run_search(SearchLimit::Timed(allocate_game_time(clock, increment)))
            }
        };

        self.uci
            .respond(&format!("bestmove {}", best_move.as_string()));
    }

    fn run_search(&mut self, limit: SearchLimit) -> Move {
        let mut refs = SearchRefs {
            mg: &self.mg,
            tt: &mut self.tt,
            pawn_table: &mut self.pawn_table,
        };
        match limit {
            SearchLimit::Depth(depth) => self.search.depth_search(&self.board, &mut refs, depth),
            SearchLimit::Timed(ms) => self.search.timed_search(&self.board, &mut refs, ms),
        }
    }

    // Perft borrows the transposition table's memory: the search table
    // is dropped to a stub, the perft table allocated in its place, and
    // everything restored afterwards.
    fn run_perft(&mut self, depth: u8, report_speed: bool) -> u64 {
        self.tt = TT::new(1);
        let mut perft_table = PerftTable::new(self.settings.tt_size);

        let started = Instant::now();
        let nodes = self.mg.perft(&self.board, depth, &mut perft_table);
        let elapsed_ms = started.elapsed().as_millis().max(1);

        drop(perft_table);
        self.tt = TT::new(self.settings.tt_size);

        if report_speed {
            self.uci.respond(&format!(
                "Number of moves at depth {depth}: {nodes} ({} kN/s)",
                nodes as u128 / elapsed_ms
            ));
        }
        nodes
    }
}

enum SearchLimit {
    Depth(i8),
    Timed(u128),
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
