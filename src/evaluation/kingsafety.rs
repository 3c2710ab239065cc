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

use crate::{
    board::{defs::Pieces, Board},
    defs::{Side, Sides, Square},
    movegen::MoveGenerator,
};

const SHIELD_PAWN_BONUS: i16 = 8;
const SHIELD_FORWARD_BONUS: i16 = 6;
const STORM_PAWN_PENALTY: i16 = 8;

// Pawn cover in front of the king: friendly pawns directly ahead score
// the most, pawns one rank further a bit less, and enemy pawns rolling
// in over the storm zone count against. Called by the move generator
// while it emits the king's moves, for the side to move only; the term
// therefore lives in the middlegame extras, not in the base.
pub fn pawn_shield_score(
    mg: &MoveGenerator,
    board: &Board,
    side: Side,
    king_square: Square,
) -> i16 {
    let own_pawns = board.get_pieces(Pieces::PAWN, side);
    let enemy_pawns = board.get_pieces(Pieces::PAWN, side ^ 1);
    let king_pawns = mg.king_pawns[side][king_square];

    let shield_forward = if side == Sides::WHITE {
        king_pawns.shield << 8
    } else {
        king_pawns.shield >> 8
    };

    let mut score = (king_pawns.shield & own_pawns).count_ones() as i16 * SHIELD_PAWN_BONUS;
    score += (shield_forward & own_pawns).count_ones() as i16 * SHIELD_FORWARD_BONUS;
    score -= (king_pawns.storm & enemy_pawns).count_ones() as i16 * STORM_PAWN_PENALTY;
    score
}
