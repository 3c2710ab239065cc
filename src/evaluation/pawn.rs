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
    board::{
        defs::{Pieces, NOT_FILE_A, NOT_FILE_H},
        Board,
    },
    defs::{Bitboard, Sides},
    engine::transposition::PawnTable,
    misc::bits,
    movegen::{MoveGenerator, PawnStructure},
};

const DOUBLED_CONTESTED_TWICE: i16 = -5;
const DOUBLED_CONTESTED_ONCE: i16 = -10;
const DOUBLED_FREE: i16 = -15;
const PASSED_BONUS: i16 = 10;
const ISOLATED_PENALTY: i16 = -3;
const BACKWARD_PENALTY: i16 = -2;

// Pawn-structure score from white's point of view, cached by the pawn
// hash. Pawn configurations repeat massively across a search tree, so
// the 2^20-entry table soaks up nearly all of the scan cost.
pub fn cached_pawn_structure_score(
    board: &Board,
    mg: &MoveGenerator,
    pawn_table: &mut PawnTable,
) -> i16 {
    let key = board.game_state.pawn_zobrist_key;
    if let Some(score) = pawn_table.probe(key) {
        return score;
    }

    let score = pawn_structure_score(board, mg);
    pawn_table.store(key, score);
    score
}

pub fn pawn_structure_score(board: &Board, mg: &MoveGenerator) -> i16 {
    let white_pawns = board.get_pieces(Pieces::PAWN, Sides::WHITE);
    let black_pawns = board.get_pieces(Pieces::PAWN, Sides::BLACK);

    // Attack "shadows": the squares one rank beyond each side's pawn
    // attacks. A pawn whose advance square falls in the enemy shadow
    // cannot step forward safely; that is the backward-pawn test.
    let white_shadow =
        (((white_pawns << 7) & NOT_FILE_H) | ((white_pawns << 9) & NOT_FILE_A)) << 8;
    let black_shadow =
        (((black_pawns >> 9) & NOT_FILE_H) | ((black_pawns >> 7) & NOT_FILE_A)) >> 8;

    let white_score = score_side(
        white_pawns,
        black_pawns,
        black_shadow,
        &mg.pawn_structure[Sides::WHITE],
    );
    let black_score = score_side(
        black_pawns,
        white_pawns,
        white_shadow,
        &mg.pawn_structure[Sides::BLACK],
    );

    white_score - black_score
}

fn score_side(
    own_pawns: Bitboard,
    enemy_pawns: Bitboard,
    enemy_shadow: Bitboard,
    masks: &[PawnStructure; 64],
) -> i16 {
    let mut score = 0;
    let mut rest = own_pawns;

    while rest > 0 {
        let square = bits::next(&mut rest);
        let pawn_masks = &masks[square];

        if own_pawns & pawn_masks.forward_file > 0 {
            // Doubled pawn: the penalty shrinks when enemy pawns contest
            // the adjacent forward files anyway.
            score += match (enemy_pawns & pawn_masks.adjacent_forward).count_ones() {
                0 => DOUBLED_FREE,
                1 => DOUBLED_CONTESTED_ONCE,
                _ => DOUBLED_CONTESTED_TWICE,
            };
        } else if enemy_pawns & (pawn_masks.forward_file | pawn_masks.adjacent_forward) == 0 {
            score += PASSED_BONUS;
        } else if own_pawns & pawn_masks.adjacent_back == 0 {
            if own_pawns & pawn_masks.adjacent_files == 0 {
                score += ISOLATED_PENALTY;
            } else if enemy_shadow & (1u64 << square) > 0 {
                score += BACKWARD_PENALTY;
            }
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::movegen::MoveGenerator;

    fn setup(fen: &str) -> (Board, MoveGenerator) {
        let mg = MoveGenerator::new();
        let mut board = Board::new();
        board.fen_read(Some(fen), &mg).unwrap();
        (board, mg)
    }

    #[test]
    fn startpos_is_balanced() {
        let (board, mg) = setup(crate::defs::FEN_START_POSITION);
        assert_eq!(pawn_structure_score(&board, &mg), 0);
    }

    #[test]
    fn doubled_pawns_are_penalized() {
        // White pawns doubled on the e-file, no enemy pressure.
        let (board, mg) = setup("4k3/8/8/8/8/4P3/4P3/4K3 w - - 0 1");
        assert_eq!(pawn_structure_score(&board, &mg), DOUBLED_FREE + PASSED_BONUS);
    }

    #[test]
    fn passed_pawn_is_rewarded() {
        // A lone white e-pawn against a lone black a-pawn: both passed.
        let (board, mg) = setup("4k3/p7/8/8/8/8/4P3/4K3 w - - 0 1");
        assert_eq!(pawn_structure_score(&board, &mg), 0);
    }

    #[test]
    fn isolated_pawn_is_penalized() {
        // White pawns a2 + e2 (e isolated from a, a isolated from e) vs
        // black pawns a7 + b7 holding the white a-pawn back.
        let (board, mg) = setup("4k3/pp6/8/8/8/8/P3P3/4K3 w - - 0 1");
        let score = pawn_structure_score(&board, &mg);
        // White: e2 passed (+10), a2 isolated (-3). Black: a7 and b7
        // both have the white a-pawn on their forward span and support
        // each other, so neither term fires.
        assert_eq!(score, PASSED_BONUS + ISOLATED_PENALTY);
    }

    #[test]
    fn cache_returns_the_computed_score() {
        let (board, mg) = setup("4k3/8/8/8/8/8/PPP5/4K3 w - - 0 1");
        let mut table = PawnTable::new();
        let direct = pawn_structure_score(&board, &mg);
        let first = cached_pawn_structure_score(&board, &mg, &mut table);
        let second = cached_pawn_structure_score(&board, &mg, &mut table);
        assert_eq!(direct, first);
        assert_eq!(first, second);
    }
}
