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
    defs::{SortedMove, FIRST_KILLER_SCORE, SECOND_KILLER_SCORE, TT_MOVE_SCORE},
    Search,
};
use crate::{
    board::{defs::Pieces, Board},
    evaluation::defs::{ATTACKER_RANKS, VICTIM_WEIGHTS},
    movegen::defs::Move,
};

impl Search {
    // Assign each legal move its sort key and order descending: the
    // hash-table move, then captures by most-valuable-victim with a
    // small least-valuable-attacker tiebreak, then (in the regular
    // search) the two killers for this depth, then history counters.
    pub(super) fn sort_moves(
        &self,
        board: &Board,
        tt_move: Move,
        tt_hit: bool,
        depth: i8,
        regular_search: bool,
    ) -> Vec<SortedMove> {
        let mut sorted = Vec::with_capacity(board.move_list.len() as usize);

        for &m in board.move_list.iter() {
            if tt_hit && m == tt_move {
                sorted.push(SortedMove {
                    m,
                    score: TT_MOVE_SCORE,
                });
                continue;
            }

            let victim = board.piece_list[m.to()];
            if victim != Pieces::NONE {
                let attacker = board.piece_list[m.from()];
                sorted.push(SortedMove {
                    m,
                    score: VICTIM_WEIGHTS[victim] - ATTACKER_RANKS[attacker],
                });
                continue;
            }

            let score = if regular_search {
                let killers = &self.killer_moves[depth as usize];
                if m == killers[0] {
                    FIRST_KILLER_SCORE
                } else if m == killers[1] {
                    SECOND_KILLER_SCORE
                } else {
                    self.history_heuristic[board.piece_list[m.from()]][m.to()]
                }
            } else {
                self.history_heuristic[board.piece_list[m.from()]][m.to()]
            };
            sorted.push(SortedMove { m, score });
        }

        sorted.sort_unstable_by(|a, b| b.score.cmp(&a.score));
        sorted
    }
}
