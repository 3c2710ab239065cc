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

pub mod defs;
pub mod fen;
pub mod gamestate;
pub mod history;
mod playmove;
mod utils;
pub mod zobrist;

use self::{
    defs::{side_of, Occupancies, Pieces, BB_SQUARES},
    gamestate::GameState,
    zobrist::ZobristKey,
};
use crate::{
    defs::{Bitboard, NrOf, Piece, Side, Sides, Square, EMPTY},
    evaluation::{
        defs::{PHASE_WEIGHTS, PIECE_VALUES_EG, PIECE_VALUES_MG},
        psqt::{PSQT_EG, PSQT_MG},
    },
    movegen::{defs::MoveList, MoveGenerator},
};

// The board is a plain value object: bitboards, the redundant per-square
// piece list, the game state, the pin bookkeeping pass A writes, and the
// move buffer pass B fills. Making a move copies the whole thing into a
// caller-provided slot and mutates the copy, so the search recursion
// never touches the parent and never heap-allocates.
#[derive(Clone, Copy)]
pub struct Board {
    pub bb_pieces: [Bitboard; NrOf::BB_SLOTS],
    pub piece_list: [Piece; NrOf::SQUARES],
    pub game_state: GameState,
    // Index into the generator's line table for each pinned piece;
    // 0 doubles as "no pin", aliasing the full-board sentinel line.
    pub pinned_lines: [u8; NrOf::SQUARES],
    pub pinned_pawns: Bitboard,
    pub move_list: MoveList,
}

impl Board {
    pub fn new() -> Self {
        Self {
            bb_pieces: [EMPTY; NrOf::BB_SLOTS],
            piece_list: [Pieces::NONE; NrOf::SQUARES],
            game_state: GameState::new(),
            pinned_lines: [0; NrOf::SQUARES],
            pinned_pawns: EMPTY,
            move_list: MoveList::new(),
        }
    }

    // Return a bitboard with locations of a certain piece type for one
    // of the sides; the side is baked into bit 0 of the id.
    pub fn get_pieces(&self, piece: Piece, side: Side) -> Bitboard {
        self.bb_pieces[piece + side]
    }

    pub fn occupancy(&self) -> Bitboard {
        self.bb_pieces[Occupancies::ALL]
    }

    pub fn us(&self) -> Side {
        self.game_state.active_color as Side
    }

    pub fn opponent(&self) -> Side {
        (self.game_state.active_color ^ 1) as Side
    }

    pub fn king_square(&self, side: Side) -> Square {
        self.bb_pieces[Pieces::KING + side].trailing_zeros() as Square
    }

    pub fn in_check(&self) -> bool {
        self.game_state.in_check
    }

    // A capture, any pawn move, or a move that gives up castling rights
    // resets the repetition history: no earlier position can recur.
    pub fn is_irreversible_move(&self, m: crate::movegen::defs::Move) -> bool {
        if self.piece_list[m.to()] != Pieces::NONE {
            return true;
        }

        let from = m.from();
        let piece = self.piece_list[from];
        if defs::is_pawn(piece) {
            return true;
        }

        let rights = self.game_state.castling;
        if piece == Pieces::KING {
            rights & (defs::Castling::WK | defs::Castling::WQ) != 0
        } else if piece == Pieces::KING + 1 {
            rights & (defs::Castling::BK | defs::Castling::BQ) != 0
        } else if piece == Pieces::ROOK {
            (from == defs::Squares::A1 && rights & defs::Castling::WQ != 0)
                || (from == defs::Squares::H1 && rights & defs::Castling::WK != 0)
        } else if piece == Pieces::ROOK + 1 {
            (from == defs::Squares::A8 && rights & defs::Castling::BQ != 0)
                || (from == defs::Squares::H8 && rights & defs::Castling::BK != 0)
        } else {
            false
        }
    }

    // GUIs may send a bare "e7e8" for a promotion; complete it to the
    // queen, as the protocol's implicit default.
    pub fn complete_implicit_promotion(&self, m: crate::movegen::defs::Move) -> crate::movegen::defs::Move {
        use crate::movegen::defs::Move;
        let last_ranks = defs::BB_RANKS[defs::Ranks::R1] | defs::BB_RANKS[defs::Ranks::R8];
        if m.promoted() == 0
            && defs::is_pawn(self.piece_list[m.from()])
            && BB_SQUARES[m.to()] & last_ranks != 0
        {
            return Move::new_promotion(m.from(), m.to(), Pieces::QUEEN + self.us());
        }
        m
    }
}

// Private board functions (for initializating on startup)
impl Board {
    // Resets/wipes the board. Used by the FEN reader function.
    pub(crate) fn reset(&mut self) {
        self.bb_pieces = [EMPTY; NrOf::BB_SLOTS];
        self.piece_list = [Pieces::NONE; NrOf::SQUARES];
        self.game_state = GameState::new();
        self.pinned_lines = [0; NrOf::SQUARES];
        self.pinned_pawns = EMPTY;
        self.move_list.clear();
    }

    // Derive all sixteen bitboards from the piece list. The FEN reader
    // fills the piece list and then calls this.
    pub(crate) fn derive_bitboards(&mut self) {
        self.bb_pieces = [EMPTY; NrOf::BB_SLOTS];
        for (square, &piece) in self.piece_list.iter().enumerate() {
            let square_bb = BB_SQUARES[square];
            self.bb_pieces[piece] |= square_bb;
            if piece != Pieces::NONE {
                self.bb_pieces[Occupancies::WHITE + side_of(piece)] |= square_bb;
                self.bb_pieces[Occupancies::ALL] |= square_bb;
            }
        }
        self.bb_pieces[Occupancies::EMPTY] = !self.bb_pieces[Occupancies::ALL];
    }

    // Recompute both hash keys from scratch. Used at load time; after
    // that, make_move maintains them incrementally. The en-passant key
    // depends on the side to move because the ep-square lives on rank 6
    // when white moves and on rank 3 when black does.
    pub(crate) fn recalc_zobrist(&mut self, mg: &MoveGenerator) {
        let mut key: ZobristKey = 0;
        let mut pawn_key: ZobristKey = 0;

        for (square, &piece) in self.piece_list.iter().enumerate() {
            key ^= mg.zr.piece(piece, square);
            if defs::is_pawn(piece) {
                pawn_key ^= mg.zr.piece(piece, square);
            }
        }

        if self.us() == Sides::BLACK {
            key ^= mg.zr.side();
        }
        key ^= mg.zr.castling(self.game_state.castling);
        key ^= mg.zr.en_passant(self.game_state.en_passant, self.us());

        self.game_state.zobrist_key = key;
        self.game_state.pawn_zobrist_key = pawn_key;
    }

    // Recompute the base evaluation accumulators and the material phase
    // from scratch. The piece-square tables and piece values are signed
    // from white's point of view, so the sum is flipped when black is
    // to move: the accumulators are always side-to-move relative.
    pub(crate) fn full_eval(&mut self) {
        let mut mg_base: i16 = 0;
        let mut eg_base: i16 = 0;
        let mut phase: u16 = 0;

        for (square, &piece) in self.piece_list.iter().enumerate() {
            mg_base += PSQT_MG[piece][square] + PIECE_VALUES_MG[piece];
            eg_base += PSQT_EG[piece][square] + PIECE_VALUES_EG[piece];
            phase += PHASE_WEIGHTS[piece];
        }

        if self.us() == Sides::BLACK {
            mg_base = -mg_base;
            eg_base = -eg_base;
        }

        self.game_state.mg_base = mg_base;
        self.game_state.eg_base = eg_base;
        self.game_state.phase = phase;
    }

    // Consistency check between the bitboards, the aggregates and the
    // piece list; exercised by the tests after move sequences.
    #[allow(dead_code)]
    pub(crate) fn validate(&self) -> Result<(), String> {
        let mut white: Bitboard = 0;
        let mut black: Bitboard = 0;
        for piece in 0..NrOf::PIECE_IDS {
            let bb = self.bb_pieces[piece];
            if side_of(piece) == Sides::WHITE {
                white |= bb;
            } else {
                black |= bb;
            }
        }

        if white != self.bb_pieces[Occupancies::WHITE] {
            return Err("white occupancy aggregate out of sync".into());
        }
        if black != self.bb_pieces[Occupancies::BLACK] {
            return Err("black occupancy aggregate out of sync".into());
        }
        if white | black != self.bb_pieces[Occupancies::ALL] {
            return Err("all-pieces aggregate out of sync".into());
        }
        if !self.bb_pieces[Occupancies::ALL] != self.bb_pieces[Occupancies::EMPTY] {
            return Err("empty aggregate out of sync".into());
        }

        for square in 0..NrOf::SQUARES {
            let piece = self.piece_list[square];
            if self.bb_pieces[piece] & BB_SQUARES[square] == 0 {
                return Err(format!("piece list out of sync on square {square}"));
            }
        }

        for side in [Sides::WHITE, Sides::BLACK] {
            if self.bb_pieces[Pieces::KING + side].count_ones() != 1 {
                return Err("side must have exactly one king".into());
            }
        }

        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
