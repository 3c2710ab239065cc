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

use crate::defs::{Bitboard, NrOf, Piece, Side, Sides, Square};
use rand::Rng;
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng;

pub type ZobristKey = u64;

// Fixed seed: the keys must be identical on every run, or transposition
// tables and repetition detection could not be tested deterministically.
const RNG_SEED: [u8; 32] = [125; 32];

// One random key per (piece id, square), 16 keys for the castling rights
// nibble, one key for the side to move, and the en-passant file keys.
//
// The piece table has a 13th all-zero row for Pieces::NONE, so hashing a
// "captured piece" on a quiet move is a no-op instead of a branch. The
// en-passant array is indexed by the trailing-zero count of the ep
// bitboard shifted down to its file: 0..7 for a live ep-square, 64 when
// there is none. Every slot above 7 is zero, which makes the "no ep"
// case hash to nothing.
pub struct ZobristRandoms {
    rnd_pieces: [[ZobristKey; NrOf::SQUARES]; NrOf::PIECE_IDS + 1],
    rnd_castling: [ZobristKey; NrOf::CASTLING_PERMISSIONS],
    rnd_side: ZobristKey,
    rnd_en_passant: [ZobristKey; NrOf::EP_KEYS],
}

impl ZobristRandoms {
    pub fn new() -> Self {
        let mut random = ChaChaRng::from_seed(RNG_SEED);
        let mut zobrist_randoms = Self {
            rnd_pieces: [[0; NrOf::SQUARES]; NrOf::PIECE_IDS + 1],
            rnd_castling: [0; NrOf::CASTLING_PERMISSIONS],
            rnd_side: random.gen::<u64>(),
            rnd_en_passant: [0; NrOf::EP_KEYS],
        };

        for piece in 0..NrOf::PIECE_IDS {
            for square in 0..NrOf::SQUARES {
                zobrist_randoms.rnd_pieces[piece][square] = random.gen::<u64>();
            }
        }

        for permission in 0..NrOf::CASTLING_PERMISSIONS {
            zobrist_randoms.rnd_castling[permission] = random.gen::<u64>();
        }

        for file in 0..NrOf::FILES {
            zobrist_randoms.rnd_en_passant[file] = random.gen::<u64>();
        }

        zobrist_randoms
    }

    pub fn piece(&self, piece: Piece, square: Square) -> ZobristKey {
        self.rnd_pieces[piece][square]
    }

    pub fn castling(&self, castling: u8) -> ZobristKey {
        self.rnd_castling[(castling & 0b1111) as usize]
    }

    // XORed into the key when black is to move.
    pub fn side(&self) -> ZobristKey {
        self.rnd_side
    }

    // The ep-square sits on rank 6 when white is to move and on rank 3
    // when black is, so shifting by 40 or 16 puts its file in the low
    // byte. An empty ep bitboard yields index 64, which hashes to zero.
    pub fn en_passant(&self, en_passant: Bitboard, side_to_move: Side) -> ZobristKey {
        let shift = if side_to_move == Sides::BLACK { 16 } else { 40 };
        self.rnd_en_passant[(en_passant >> shift).trailing_zeros() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::defs::{Pieces, BB_SQUARES};

    #[test]
    fn keys_are_reproducible() {
        let a = ZobristRandoms::new();
        let b = ZobristRandoms::new();
        assert_eq!(a.piece(Pieces::KING, 4), b.piece(Pieces::KING, 4));
        assert_eq!(a.castling(0b1011), b.castling(0b1011));
        assert_eq!(a.side(), b.side());
    }

    #[test]
    fn empty_piece_and_ep_keys_hash_to_zero() {
        let zr = ZobristRandoms::new();
        assert_eq!(zr.piece(Pieces::NONE, 33), 0);
        assert_eq!(zr.en_passant(0, Sides::WHITE), 0);
        assert_eq!(zr.en_passant(0, Sides::BLACK), 0);
    }

    #[test]
    fn ep_keys_depend_on_file_only_through_the_rank_shift() {
        let zr = ZobristRandoms::new();
        // e6 seen by white, e3 seen by black: same file, same key.
        let e6 = BB_SQUARES[44];
        let e3 = BB_SQUARES[20];
        assert_eq!(
            zr.en_passant(e6, Sides::WHITE),
            zr.en_passant(e3, Sides::BLACK)
        );
        assert_ne!(zr.en_passant(e6, Sides::WHITE), 0);
    }
}
