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

use super::{
    defs::{SearchRefs, INF, NULL_MOVE_REDUCTION, QUIESCENCE_DEPTH, STALEMATE},
    Search,
};
use crate::{
    board::{defs::Pieces, Board},
    engine::transposition::{HashFlag, SearchData},
    evaluation,
    movegen::defs::Move,
};

impl Search {
    // Negamax with principal-variation windows. The board arrives with
    // its legal move list already generated by make_move, so terminal
    // positions are detected for free.
    pub(super) fn negamax(
        &mut self,
        board: &mut Board,
        refs: &mut SearchRefs,
        mut alpha: i16,
        beta: i16,
        mut depth: i8,
    ) -> i16 {
        self.stats.nodes += 1;

        // The stop flag is polled at every node entry; an aborted
        // branch just returns the static eval, and the root discards
        // the whole partial iteration anyway.
        if self.time_pkg.stopped() {
            return evaluation::evaluate_position(board, refs.mg, refs.pawn_table);
        }

        if board.move_list.is_empty() {
            if board.in_check() {
                // Mate: prefer the shortest one by penalizing distance
                // from the root.
                return -INF + (self.start_depth - depth) as i16;
            }
            return STALEMATE;
        }

        // Check extension.
        if board.in_check() {
            depth += 1;
        }

        if depth <= 1 {
            return self.quiescence(board, refs, alpha, beta, QUIESCENCE_DEPTH);
        }

        let mut child = Board::new();

        // Null move: if handing the opponent a free tempo still fails
        // high at reduced depth, the real position surely would.
        if !board.game_state.null_move && !board.in_check() {
            board.make_null_move(refs.mg, &mut child);
            let score = -self.negamax(&mut child, refs, -beta, -beta + 1, depth - NULL_MOVE_REDUCTION);
            if score >= beta {
                return beta;
            }
        }

        let entry = refs.tt.read(board.game_state.zobrist_key);
        let tt_hit = entry.is_match(board.game_state.zobrist_key);
        if tt_hit {
            self.stats.tt_hits += 1;
            // Quiescence entries never satisfy a regular probe.
            if !entry.is_quiescent() && entry.depth() >= depth {
                match entry.node_type() {
                    HashFlag::Exact => return entry.score,
                    HashFlag::Alpha if entry.score <= alpha => return alpha,
                    HashFlag::Beta if entry.score >= beta => return beta,
                    _ => {}
                }
            }
        }

        let moves = self.sort_moves(board, entry.best_move(), tt_hit, depth, true);

        let mut node_type = HashFlag::Alpha;
        let mut best_score = -INF;
        let mut best_move = Move::none();

        for sorted in &moves {
            let m = sorted.m;
            board.make_move(m, refs.mg, &mut child);

            let score = if node_type == HashFlag::Exact {
                // Alpha was raised: probe the rest with a null window,
                // re-search on a fail-high inside the window.
                let mut score = -self.negamax(&mut child, refs, -alpha - 1, -alpha, depth - 1);
                if score > alpha && score < beta {
                    score = -self.negamax(&mut child, refs, -beta, -alpha, depth - 1);
                }
                score
            } else {
                -self.negamax(&mut child, refs, -beta, -alpha, depth - 1)
            };

            if score >= beta {
                // Quiet cutoff movers become killers for this depth.
                if board.piece_list[m.to()] == Pieces::NONE {
                    self.store_killer(m, depth);
                }
                refs.tt.store(SearchData::create(
                    board.game_state.zobrist_key,
                    HashFlag::Beta,
                    depth,
                    false,
                    beta,
                    m,
                ));
                return beta;
            }

            if score > alpha {
                if board.piece_list[m.to()] == Pieces::NONE {
                    let piece = board.piece_list[m.from()];
                    self.history_heuristic[piece][m.to()] =
                        self.history_heuristic[piece][m.to()].saturating_add(depth as i16);
                }
                alpha = score;
                node_type = HashFlag::Exact;
                best_score = score;
                best_move = m;
            } else if score > best_score {
                best_score = score;
                best_move = m;
            }
        }

        // The fallthrough store keeps deeper existing data.
        if !tt_hit || entry.depth() <= depth {
            refs.tt.store(SearchData::create(
                board.game_state.zobrist_key,
                node_type,
                depth,
                false,
                alpha,
                best_move,
            ));
        }

        alpha
    }

    fn store_killer(&mut self, m: Move, depth: i8) {
        let slot = &mut self.killer_moves[depth as usize];
        if slot[0] != m {
            slot[1] = slot[0];
            slot[0] = m;
        }
    }
}
