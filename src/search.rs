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

mod alpha_beta;
pub mod defs;
mod qsearch;
mod sorting;
pub mod time;

use self::{
    defs::{
        KillerMoves, SearchRefs, SearchStats, SortedMove, CHECKMATE_THRESHOLD, INF,
        MAX_KILLER_MOVES, MAX_SEARCH_DEPTH,
    },
    time::TimePackage,
};
use crate::{
    board::{history::History, Board},
    defs::{NrOf, MAX_PLY},
    evaluation,
    movegen::defs::Move,
};
use std::time::Instant;

// The search drives the generator, make-move and evaluator in a
// depth-first recursion: iterative deepening on top, a principal
// variation search at the root and in the tree, quiescence at the
// horizon. One instance lives in the engine and is reused between
// searches; the per-search state is reset on entry.
pub struct Search {
    pub time_pkg: TimePackage,
    pub repetitions: History,
    pub stats: SearchStats,
    pub debug: bool,
    pub quiet: bool,
    best_moves: Vec<SortedMove>,
    killer_moves: KillerMoves,
    history_heuristic: [[i16; NrOf::SQUARES]; NrOf::PIECE_IDS],
    start_depth: i8,
}

impl Search {
    pub fn new() -> Self {
        Self {
            time_pkg: TimePackage::new(),
            repetitions: History::new(),
            stats: SearchStats::default(),
            debug: false,
            quiet: false,
            best_moves: Vec::new(),
            killer_moves: [[Move::none(); MAX_KILLER_MOVES]; MAX_PLY as usize],
            history_heuristic: [[0; NrOf::SQUARES]; NrOf::PIECE_IDS],
            start_depth: 0,
        }
    }

    // Search to a fixed depth ("go depth N"). Time is not checked.
    pub fn depth_search(&mut self, board: &Board, refs: &mut SearchRefs, depth: i8) -> Move {
        self.search_reset();
        self.time_pkg.reset();

        let target = depth.clamp(1, MAX_SEARCH_DEPTH);
        let started = Instant::now();
        for current in 2..=target.max(2) {
            self.start_depth = current;
            let iteration_start_nodes = self.stats.nodes;
            self.root_search(board, refs, -INF, INF);
            self.report_iteration(current, started, iteration_start_nodes);
        }

        self.best_root_move()
    }

    // Search against the wall clock: a sleeper raises the stop flag
    // when the budget runs out, and each completed iteration checks
    // whether the remaining budget could plausibly pay for another.
    pub fn timed_search(
        &mut self,
        board: &Board,
        refs: &mut SearchRefs,
        time_allocated: u128,
    ) -> Move {
        self.search_reset();
        self.time_pkg.reset();
        let _canceller = self.time_pkg.start_sleeper(time_allocated);

        let started = Instant::now();
        let mut remaining = time_allocated as i128;
        let mut iteration_mark = Instant::now();

        for current in 2..=MAX_SEARCH_DEPTH {
            self.start_depth = current;
            let iteration_start_nodes = self.stats.nodes;
            self.root_search(board, refs, -INF, INF);

            let spent = iteration_mark.elapsed().as_millis() as i128;
            remaining -= spent;
            iteration_mark = Instant::now();

            if self.time_pkg.stopped() {
                break;
            }
            self.report_iteration(current, started, iteration_start_nodes);
            if remaining < spent * 3 {
                break;
            }
        }

        self.best_root_move()
    }

    // One root iteration: the previous iteration's best moves first, in
    // their score order, then the rest of the legal moves. If the clock
    // ran out mid-iteration the partial results are discarded and the
    // previous iteration's snapshot is restored.
    fn root_search(&mut self, board: &Board, refs: &mut SearchRefs, mut alpha: i16, beta: i16) {
        if self.time_pkg.stopped() || board.move_list.is_empty() {
            return;
        }

        let snapshot = std::mem::take(&mut self.best_moves);

        for sorted in &snapshot {
            self.root_move_search(board, refs, sorted.m, &mut alpha, beta);
        }
        for m in board.move_list.iter() {
            if snapshot.iter().any(|sorted| sorted.m == *m) {
                continue;
            }
            self.root_move_search(board, refs, *m, &mut alpha, beta);
        }

        self.best_moves
            .sort_unstable_by(|a, b| b.score.cmp(&a.score));

        if self.time_pkg.stopped() || self.best_moves.is_empty() {
            self.best_moves = snapshot;
        }
    }

    fn root_move_search(
        &mut self,
        board: &Board,
        refs: &mut SearchRefs,
        m: Move,
        alpha: &mut i16,
        beta: i16,
    ) {
        let mut child = Board::new();
        board.make_move(m, refs.mg, &mut child);

        let score = if self.is_repetition_draw(&child, refs) {
            defs::DRAW
        } else if *alpha > -INF {
            // Null-window probe; full re-search on fail-high.
            let mut score =
                -self.negamax(&mut child, refs, -*alpha - 1, -*alpha, self.start_depth - 1);
            if score > *alpha && score < beta {
                score = -self.negamax(&mut child, refs, -beta, -*alpha, self.start_depth - 1);
            }
            score
        } else {
            -self.negamax(&mut child, refs, -beta, -*alpha, self.start_depth - 1)
        };

        if score > *alpha {
            *alpha = score;
            self.best_moves.push(SortedMove { m, score });
        }
    }

    // A move that lands on a position already seen twice on the game
    // path is a draw. In the "double-two" configuration (two distinct
    // positions at two occurrences each) any reply can force the third
    // repetition, so a one-ply lookahead treats those children as
    // drawn as well, unless the mover is better off anyway.
    fn is_repetition_draw(&mut self, child: &Board, refs: &mut SearchRefs) -> bool {
        if self.repetitions.count(child.game_state.zobrist_key) >= 2 {
            return true;
        }

        if self.repetitions.has_double_repetition() {
            if evaluation::evaluate_position(child, refs.mg, refs.pawn_table) > 0 {
                return false;
            }
            let mut grandchild = Board::new();
            for m in child.move_list.iter() {
                child.make_move(*m, refs.mg, &mut grandchild);
                if self.repetitions.count(grandchild.game_state.zobrist_key) >= 2 {
                    return true;
                }
            }
        }

        false
    }

    pub fn best_root_move(&self) -> Move {
        self.best_moves.first().map(|sorted| sorted.m).unwrap_or_else(Move::none)
    }

    pub fn best_root_score(&self) -> i16 {
        self.best_moves.first().map(|sorted| sorted.score).unwrap_or(0)
    }

    fn search_reset(&mut self) {
        self.best_moves.clear();
        self.stats.reset();
        self.killer_moves = [[Move::none(); MAX_KILLER_MOVES]; MAX_PLY as usize];
        self.history_heuristic = [[0; NrOf::SQUARES]; NrOf::PIECE_IDS];
    }

    // One UCI info line per completed iteration; the extended counters
    // only when debug mode is on.
    fn report_iteration(&mut self, depth: i8, started: Instant, iteration_start_nodes: u64) {
        let iteration_nodes = self.stats.nodes - iteration_start_nodes;
        if self.quiet {
            self.stats.last_iteration_nodes = iteration_nodes;
            return;
        }
        let Some(best) = self.best_moves.first() else {
            return;
        };

        let elapsed = started.elapsed().as_millis().max(1);
        let nps = (self.stats.nodes as u128 * 1000 / elapsed) as u64;

        let score = if best.score.abs() > CHECKMATE_THRESHOLD {
            let plies = (INF - best.score.abs()) as i32;
            let mate_in = (plies + 1) / 2;
            format!("mate {}", if best.score > 0 { mate_in } else { -mate_in })
        } else {
            format!("cp {}", best.score)
        };

        println!(
            "info depth {} score {} nodes {} nps {} time {} pv {}",
            depth,
            score,
            self.stats.nodes,
            nps,
            elapsed,
            best.m.as_string()
        );

        if self.debug {
            println!(
                "info string qnodes {} tthits {} ebf {:.2}",
                self.stats.qnodes,
                self.stats.tt_hits,
                self.stats.branching_factor(iteration_nodes)
            );
        }
        self.stats.last_iteration_nodes = iteration_nodes;
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::transposition::{PawnTable, TT},
        movegen::MoveGenerator,
    };

    fn search_fen(fen: &str, depth: i8) -> (Move, i16) {
        let mg = MoveGenerator::new();
        let mut board = Board::new();
        board.fen_read(Some(fen), &mg).unwrap();

        let mut tt = TT::new(16);
        let mut pawn_table = PawnTable::new();
        let mut refs = SearchRefs {
            mg: &mg,
            tt: &mut tt,
            pawn_table: &mut pawn_table,
        };

        let mut search = Search::new();
        let best = search.depth_search(&board, &mut refs, depth);
        (best, search.best_root_score())
    }

    #[test]
    fn finds_a_mate_in_one() {
        // Back-rank mate: Ra8#.
        let (best, score) = search_fen("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1", 3);
        assert_eq!(best.as_string(), "a1a8");
        assert!(score > CHECKMATE_THRESHOLD, "score {score}");
    }

    #[test]
    fn finds_a_mate_in_two() {
        // A classic two-rook ladder: white mates in two.
        let (best, score) = search_fen("7k/8/8/8/8/8/R7/1R4K1 w - - 0 1", 5);
        assert!(score > CHECKMATE_THRESHOLD, "score {score}");
        // The mating sequence starts by confining the king.
        assert!(
            best.as_string() == "a2a7" || best.as_string() == "b1b7",
            "unexpected move {}",
            best.as_string()
        );
    }

    #[test]
    fn search_is_deterministic_at_fixed_depth() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 1";
        let (first, _) = search_fen(fen, 5);
        let (second, _) = search_fen(fen, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn returns_a_legal_move_from_the_startpos() {
        let (best, _) = search_fen(crate::defs::FEN_START_POSITION, 4);
        let mg = MoveGenerator::new();
        let mut board = Board::new();
        board.fen_read(None, &mg).unwrap();
        assert!(board.move_list.contains(best));
    }

    #[test]
    fn up_a_rook_endgame_scores_well_for_white() {
        let (_, score) = search_fen("8/8/8/8/8/6k1/4K2R/8 w - - 0 1", 6);
        assert!(score > 200, "score {score}");
    }

    #[test]
    fn prefers_not_to_repeat_when_ahead() {
        let mg = MoveGenerator::new();
        let mut board = Board::new();
        // White is up a queen; a repetition would throw the win away.
        board
            .fen_read(Some("7k/1Q6/8/8/8/8/8/K7 w - - 0 1"), &mg)
            .unwrap();

        let mut tt = TT::new(16);
        let mut pawn_table = PawnTable::new();
        let mut refs = SearchRefs {
            mg: &mg,
            tt: &mut tt,
            pawn_table: &mut pawn_table,
        };

        let mut search = Search::new();
        // Pretend the current position has already been seen twice;
        // every quiet continuation is fine, only the repetition of a
        // child position would be drawn.
        let mut child = Board::new();
        let first = board.move_list.get_move(0);
        board.make_move(first, &mg, &mut child);
        search.repetitions.push(child.game_state.zobrist_key);
        search.repetitions.push(child.game_state.zobrist_key);

        let best = search.depth_search(&board, &mut refs, 4);
        assert_ne!(best, first, "search walked into the drawn repetition");
        assert!(search.best_root_score() > 0);
    }
}
