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
    defs::{is_pawn, Castling, Occupancies, Pieces, BB_SQUARES, CASTLING_PERMISSIONS},
    Board,
};
use crate::{
    defs::{Bitboard, Sides, Square},
    evaluation::{
        defs::{PHASE_WEIGHTS, PIECE_VALUES_EG, PIECE_VALUES_MG},
        psqt::{PSQT_EG, PSQT_MG},
    },
    movegen::{
        defs::Move,
        sides::{Black, SideSpec, White},
        MoveGenerator,
    },
};

impl Board {
    // Apply a move by copying this position into the caller's slot and
    // mutating the copy: the recursion owns one slot per stack frame
    // and never heap-allocates a child. The child comes back with its
    // keys, accumulators, pin data and full legal move list up to date.
    pub fn make_move(&self, m: Move, mg: &MoveGenerator, child: &mut Board) {
        if self.us() == Sides::WHITE {
            self.make::<White>(m, mg, child, true);
        } else {
            self.make::<Black>(m, mg, child, true);
        }
    }

    // Board-state-only variant: everything except the move generation
    // pass. Quiescence uses it to take a cheap static look at a capture
    // before deciding whether the child is worth generating for.
    pub fn make_move_board_only(&self, m: Move, mg: &MoveGenerator, child: &mut Board) {
        if self.us() == Sides::WHITE {
            self.make::<White>(m, mg, child, false);
        } else {
            self.make::<Black>(m, mg, child, false);
        }
    }

    // Pass the turn: flip side, drop the ep-target, fix the keys and
    // the accumulator viewpoint, regenerate. Pieces stay put.
    pub fn make_null_move(&self, mg: &MoveGenerator, child: &mut Board) {
        *child = *self;
        child.game_state.active_color ^= 1;
        child.game_state.null_move = true;
        child.game_state.en_passant = 0;
        child.game_state.zobrist_key ^=
            mg.zr.side() ^ mg.zr.en_passant(self.game_state.en_passant, self.us());
        child.game_state.mg_base = -self.game_state.mg_base;
        child.game_state.eg_base = -self.game_state.eg_base;
        mg.generate_moves(child);
    }

    fn make<S: SideSpec>(&self, m: Move, mg: &MoveGenerator, child: &mut Board, generate: bool) {
        *child = *self;
        child.game_state.active_color = S::THEM as u8;
        child.game_state.null_move = false;

        let from = m.from();
        let to = m.to();
        let from_bb = BB_SQUARES[from];
        let to_bb = BB_SQUARES[to];
        let piece = self.piece_list[from];
        let victim = self.piece_list[to];

        // Move the mover and lift any victim. The victim id is 12 for a
        // quiet move, in which case the "victim" xor toggles the empty
        // aggregate, which is recomputed right below anyway; no branch
        // needed.
        child.piece_list[from] = Pieces::NONE;
        child.piece_list[to] = piece;
        child.bb_pieces[piece] ^= from_bb | to_bb;
        child.bb_pieces[victim] ^= to_bb;
        child.bb_pieces[Occupancies::WHITE + S::US] ^= from_bb | to_bb;
        child.bb_pieces[Occupancies::WHITE + S::THEM] &= !to_bb;
        let empty = child.bb_pieces[Occupancies::EMPTY] | from_bb;
        child.bb_pieces[Occupancies::EMPTY] = empty;
        child.bb_pieces[Occupancies::ALL] = !empty;

        // White-perspective evaluation delta; the sign is applied when
        // the accumulators flip viewpoint at the end.
        let mut delta_mg =
            PSQT_MG[piece][to] - PSQT_MG[piece][from] - PSQT_MG[victim][to] - PIECE_VALUES_MG[victim];
        let mut delta_eg =
            PSQT_EG[piece][to] - PSQT_EG[piece][from] - PSQT_EG[victim][to] - PIECE_VALUES_EG[victim];
        child.game_state.phase -= PHASE_WEIGHTS[victim];

        // Incremental keys. The victim key is zero for the empty id.
        let zr = &mg.zr;
        let mut key = self.game_state.zobrist_key;
        key ^= zr.piece(piece, from) ^ zr.piece(piece, to) ^ zr.piece(victim, to);
        key ^= zr.side();
        key ^= zr.castling(self.game_state.castling);
        key ^= zr.en_passant(self.game_state.en_passant, S::US);

        let mut pawn_key = self.game_state.pawn_zobrist_key;
        if is_pawn(piece) {
            pawn_key ^= zr.piece(piece, from) ^ zr.piece(piece, to);
        }
        if is_pawn(victim) {
            pawn_key ^= zr.piece(victim, to);
        }

        // Castling rights survive a move only when neither endpoint
        // touches a king or rook home square.
        let old_castling = self.game_state.castling;
        child.game_state.castling = (old_castling
            & Castling::ALL_RIGHTS
            & CASTLING_PERMISSIONS[from]
            & CASTLING_PERMISSIONS[to])
            | (old_castling & (Castling::WHITE_CASTLED | Castling::BLACK_CASTLED));

        // Special move shapes.
        let mut new_ep: Bitboard = 0;
        if is_pawn(piece) {
            if (to as i8 - from as i8).abs() == 16 {
                new_ep = S::up(from_bb);
            } else if to_bb == self.game_state.en_passant {
                // The captured pawn stands behind the ep-target.
                let victim_sq = (to as i8 + S::PUSH_OFFSET) as Square;
                let victim_bb = BB_SQUARES[victim_sq];
                let victim_pawn = Pieces::PAWN + S::THEM;

                child.piece_list[victim_sq] = Pieces::NONE;
                child.bb_pieces[victim_pawn] ^= victim_bb;
                child.bb_pieces[Occupancies::WHITE + S::THEM] ^= victim_bb;
                let empty = child.bb_pieces[Occupancies::EMPTY] | victim_bb;
                child.bb_pieces[Occupancies::EMPTY] = empty;
                child.bb_pieces[Occupancies::ALL] = !empty;

                key ^= zr.piece(victim_pawn, victim_sq);
                pawn_key ^= zr.piece(victim_pawn, victim_sq);
                delta_mg -= PSQT_MG[victim_pawn][victim_sq] + PIECE_VALUES_MG[victim_pawn];
                delta_eg -= PSQT_EG[victim_pawn][victim_sq] + PIECE_VALUES_EG[victim_pawn];
            } else if m.promoted() != 0 {
                let promotion = m.promoted();
                child.piece_list[to] = promotion;
                child.bb_pieces[piece] ^= to_bb;
                child.bb_pieces[promotion] |= to_bb;

                key ^= zr.piece(piece, to) ^ zr.piece(promotion, to);
                pawn_key ^= zr.piece(piece, to);
                delta_mg +=
                    PSQT_MG[promotion][to] - PSQT_MG[piece][to] + PIECE_VALUES_MG[promotion]
                        - PIECE_VALUES_MG[piece];
                delta_eg +=
                    PSQT_EG[promotion][to] - PSQT_EG[piece][to] + PIECE_VALUES_EG[promotion]
                        - PIECE_VALUES_EG[piece];
                child.game_state.phase += PHASE_WEIGHTS[promotion];
            }
        } else if piece == Pieces::KING + S::US && (to as i8 - from as i8).abs() == 2 {
            // Castling is the king's two-square move; relocate the rook
            // across the king.
            let short = to > from;
            let (rook_from, rook_to) = if short { (to + 1, to - 1) } else { (to - 2, to + 1) };
            let rook = Pieces::ROOK + S::US;
            let rook_mask = BB_SQUARES[rook_from] | BB_SQUARES[rook_to];

            child.piece_list[rook_from] = Pieces::NONE;
            child.piece_list[rook_to] = rook;
            child.bb_pieces[rook] ^= rook_mask;
            child.bb_pieces[Occupancies::WHITE + S::US] ^= rook_mask;
            let empty = (child.bb_pieces[Occupancies::EMPTY] | BB_SQUARES[rook_from])
                & !BB_SQUARES[rook_to];
            child.bb_pieces[Occupancies::EMPTY] = empty;
            child.bb_pieces[Occupancies::ALL] = !empty;

            key ^= zr.piece(rook, rook_from) ^ zr.piece(rook, rook_to);
            delta_mg += PSQT_MG[rook][rook_to] - PSQT_MG[rook][rook_from];
            delta_eg += PSQT_EG[rook][rook_to] - PSQT_EG[rook][rook_from];
            child.game_state.castling |= S::CASTLED_FLAG;
        }

        key ^= zr.castling(child.game_state.castling);
        key ^= zr.en_passant(new_ep, S::THEM);
        child.game_state.en_passant = new_ep;
        child.game_state.zobrist_key = key;
        child.game_state.pawn_zobrist_key = pawn_key;

        // Flip the accumulators to the new mover's viewpoint, then fold
        // in the white-perspective delta with the matching sign.
        let sign: i16 = if S::THEM == Sides::WHITE { 1 } else { -1 };
        child.game_state.mg_base = -self.game_state.mg_base + sign * delta_mg;
        child.game_state.eg_base = -self.game_state.eg_base + sign * delta_eg;

        // Regenerate: sets in_check, the pin data, the eval extras and
        // the child's complete legal move list. Generation may still
        // invalidate the ep-target; it patches the key itself when it
        // does.
        if generate {
            mg.generate_moves(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{FEN_KIWIPETE_POSITION, FEN_START_POSITION};

    fn setup(fen: &str) -> (Board, MoveGenerator) {
        let mg = MoveGenerator::new();
        let mut board = Board::new();
        board.fen_read(Some(fen), &mg).unwrap();
        (board, mg)
    }

    fn find_move(board: &Board, uci: &str) -> Move {
        let wanted = Move::from_uci(uci, board.us()).unwrap();
        for m in board.move_list.iter() {
            if *m == wanted {
                return *m;
            }
        }
        panic!("move {uci} not legal here");
    }

    // Play a move and verify that every piece of incremental state
    // matches a from-scratch rebuild of the resulting position.
    fn make_and_verify(board: &Board, mg: &MoveGenerator, uci: &str) -> Board {
        let mut child = Board::new();
        board.make_move(find_move(board, uci), mg, &mut child);
        child.validate().unwrap();

        let mut rebuilt = child;
        rebuilt.recalc_zobrist(mg);
        assert_eq!(
            child.game_state.zobrist_key, rebuilt.game_state.zobrist_key,
            "zobrist drifted after {uci}"
        );
        assert_eq!(
            child.game_state.pawn_zobrist_key, rebuilt.game_state.pawn_zobrist_key,
            "pawn zobrist drifted after {uci}"
        );

        rebuilt.full_eval();
        assert_eq!(
            child.game_state.mg_base, rebuilt.game_state.mg_base,
            "mg accumulator drifted after {uci}"
        );
        assert_eq!(
            child.game_state.eg_base, rebuilt.game_state.eg_base,
            "eg accumulator drifted after {uci}"
        );
        assert_eq!(child.game_state.phase, rebuilt.game_state.phase);

        child
    }

    #[test]
    fn quiet_moves_and_captures_stay_consistent() {
        let (board, mg) = setup(FEN_START_POSITION);
        let b1 = make_and_verify(&board, &mg, "e2e4");
        let b2 = make_and_verify(&b1, &mg, "d7d5");
        let b3 = make_and_verify(&b2, &mg, "e4d5");
        let b4 = make_and_verify(&b3, &mg, "d8d5");
        assert_eq!(b4.piece_list[35], Pieces::QUEEN + 1); // queen on d5
    }

    #[test]
    fn double_push_sets_and_clears_the_ep_square() {
        let (board, mg) = setup(FEN_START_POSITION);
        let b1 = make_and_verify(&board, &mg, "e2e4");
        assert_eq!(b1.game_state.en_passant, BB_SQUARES[20]); // e3
        let b2 = make_and_verify(&b1, &mg, "g8f6");
        assert_eq!(b2.game_state.en_passant, 0);
    }

    #[test]
    fn en_passant_capture_removes_the_right_pawn() {
        let (board, mg) = setup("4k3/8/8/8/5p2/8/4P3/4K3 w - - 0 1");
        let b1 = make_and_verify(&board, &mg, "e2e4");
        let b2 = make_and_verify(&b1, &mg, "f4e3");
        assert_eq!(b2.piece_list[28], Pieces::NONE); // e4 emptied
        assert_eq!(b2.piece_list[20], Pieces::PAWN + 1); // black pawn e3
    }

    #[test]
    fn castling_moves_the_rook_and_sets_the_flag() {
        let (board, mg) = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let b1 = make_and_verify(&board, &mg, "e1g1");
        assert_eq!(b1.piece_list[5], Pieces::ROOK); // f1
        assert_eq!(b1.piece_list[7], Pieces::NONE); // h1
        assert!(b1.game_state.castling & Castling::WHITE_CASTLED != 0);
        assert_eq!(b1.game_state.castling & (Castling::WK | Castling::WQ), 0);

        let b2 = make_and_verify(&b1, &mg, "e8c8");
        assert_eq!(b2.piece_list[59], Pieces::ROOK + 1); // d8
        assert!(b2.game_state.castling & Castling::BLACK_CASTLED != 0);
    }

    #[test]
    fn promotion_swaps_the_pawn_for_the_piece() {
        let (board, mg) = setup("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let b1 = make_and_verify(&board, &mg, "a7a8q");
        assert_eq!(b1.piece_list[56], Pieces::QUEEN);
        assert_eq!(b1.bb_pieces[Pieces::PAWN], 0);

        let (board, mg) = setup("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let b2 = make_and_verify(&board, &mg, "a7a8n");
        assert_eq!(b2.piece_list[56], Pieces::KNIGHT);
    }

    #[test]
    fn rook_capture_on_the_corner_drops_the_right() {
        let (board, mg) = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let b1 = make_and_verify(&board, &mg, "a1a8");
        // White gave up its own long right by moving the a-rook, and
        // black lost its long right to the capture on a8.
        assert_eq!(b1.game_state.castling & Castling::WQ, 0);
        assert_eq!(b1.game_state.castling & Castling::BQ, 0);
        assert!(b1.game_state.castling & Castling::BK != 0);
    }

    #[test]
    fn null_move_flips_the_side_and_keeps_the_key_consistent() {
        let (board, mg) = setup(FEN_KIWIPETE_POSITION);
        let mut child = Board::new();
        board.make_null_move(&mg, &mut child);
        assert_eq!(child.us(), Sides::BLACK);
        assert!(child.game_state.null_move);

        let mut rebuilt = child;
        rebuilt.recalc_zobrist(&mg);
        assert_eq!(child.game_state.zobrist_key, rebuilt.game_state.zobrist_key);
        assert_eq!(
            child.game_state.mg_base + board.game_state.mg_base,
            0,
            "null move must only flip the accumulator viewpoint"
        );
    }

    #[test]
    fn make_move_matches_a_fresh_load_of_the_child_fen() {
        let (board, mg) = setup(FEN_KIWIPETE_POSITION);
        let mut child = Board::new();
        board.make_move(find_move(&board, "e2a6"), &mg, &mut child);

        let mut reloaded = Board::new();
        reloaded.fen_read(Some(&child.as_fen()), &mg).unwrap();

        assert_eq!(child.game_state.zobrist_key, reloaded.game_state.zobrist_key);
        assert_eq!(child.game_state.mg_base, reloaded.game_state.mg_base);
        assert_eq!(child.game_state.eg_base, reloaded.game_state.eg_base);
        assert_eq!(child.game_state.mg_extra, reloaded.game_state.mg_extra);
        assert_eq!(child.move_list.len(), reloaded.move_list.len());
    }
}
