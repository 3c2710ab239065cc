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

use super::zobrist::ZobristKey;
use crate::defs::Bitboard;

// All the position state besides the piece placement itself. Plain data;
// the whole struct is copied when a child position is made.
//
// The evaluation accumulators are stored from the side-to-move's point of
// view and split in two parts: the base (material + piece-square terms)
// is maintained incrementally by make_move, while the extras (mobility
// and the king pawn-shield term) are cleared and re-accumulated by the
// move generator at every node.
#[derive(Clone, Copy)]
pub struct GameState {
    pub active_color: u8,
    // Four castling rights in the low nibble plus one has-castled flag
    // per side; see board::defs::Castling.
    pub castling: u8,
    // Single-bit bitboard of the ep-target square, or 0.
    pub en_passant: Bitboard,
    pub zobrist_key: ZobristKey,
    pub pawn_zobrist_key: ZobristKey,
    pub mg_base: i16,
    pub eg_base: i16,
    pub mg_extra: i16,
    pub eg_extra: i16,
    // Material phase counter; clamped to 256 when blending.
    pub phase: u16,
    pub in_check: bool,
    pub null_move: bool,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            active_color: 0,
            castling: 0,
            en_passant: 0,
            zobrist_key: 0,
            pawn_zobrist_key: 0,
            mg_base: 0,
            eg_base: 0,
            mg_extra: 0,
            eg_extra: 0,
            phase: 0,
            in_check: false,
            null_move: false,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
