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

use super::{KingPawns, Line, MoveGenerator, PawnStructure, QueenLine, NR_OF_LINES};
use crate::{
    board::defs::{Files, Ranks, BB_FILES, BB_RANKS, BB_SQUARES},
    defs::{Bitboard, NrOf, Sides, EMPTY, FULL_BOARD},
    misc::bits::{pdep, pext, vmirror},
};

// Wrap-around trim masks for the quadrant-expanded jump tables.
const NOT_AB12: Bitboard = !(BB_FILES[Files::A] | BB_FILES[Files::B] | BB_RANKS[Ranks::R1] | BB_RANKS[Ranks::R2]);
const NOT_AB78: Bitboard = !(BB_FILES[Files::A] | BB_FILES[Files::B] | BB_RANKS[Ranks::R7] | BB_RANKS[Ranks::R8]);
const NOT_HG12: Bitboard = !(BB_FILES[Files::H] | BB_FILES[Files::G] | BB_RANKS[Ranks::R1] | BB_RANKS[Ranks::R2]);
const NOT_HG78: Bitboard = !(BB_FILES[Files::H] | BB_FILES[Files::G] | BB_RANKS[Ranks::R7] | BB_RANKS[Ranks::R8]);

// Base attack patterns anchored on d4/e4/d5/e5; all 64 squares are
// reached by shifting these four quadrant seeds outward.
const KNIGHT_ATTACKS_LD: Bitboard = 0x0000_1422_0022_1400;
const KING_ATTACKS_LD: Bitboard = 0x0000_001C_141C_0000;
const PAWN_ATTACKS_LD: Bitboard = 0x0000_0014_0000_0000;
const PAWN_SHIELD_LD: Bitboard = 0x0000_001C_0000_0000;

const NOT_EDGES: Bitboard =
    !(BB_FILES[Files::A] | BB_FILES[Files::H] | BB_RANKS[Ranks::R1] | BB_RANKS[Ranks::R8]);

// A single base pattern (for the piece standing on d4) is shifted to
// every square of the board, one quadrant at a time, and the bits that
// wrapped around the board edge are trimmed off. Much cheaper to reason
// about than a per-square direction walk, and it reuses the exact same
// machinery for king, knight, pawn and pawn-shield patterns.
fn jump_table(attacks: Bitboard) -> [Bitboard; NrOf::SQUARES] {
    let mut table = [EMPTY; NrOf::SQUARES];

    let start_ld: Bitboard = BB_SQUARES[27]; // d4
    let start_lu: Bitboard = BB_SQUARES[35]; // d5
    let start_rd: Bitboard = BB_SQUARES[28]; // e4
    let start_ru: Bitboard = BB_SQUARES[36]; // e5

    let attacks_ld = attacks;
    let attacks_lu = attacks << 8;
    let attacks_rd = attacks << 1;
    let attacks_ru = attacks << 9;

    for i in 0..4 {
        for j in 0..4 {
            table[(start_ld >> (i * 8 + j)).trailing_zeros() as usize] =
                (attacks_ld >> (i * 8 + j)) & NOT_HG78;
            table[(start_lu >> j << (i * 8)).trailing_zeros() as usize] =
                (attacks_lu >> j << (i * 8)) & NOT_HG12;
            table[(start_rd << j >> (i * 8)).trailing_zeros() as usize] =
                (attacks_rd << j >> (i * 8)) & NOT_AB78;
            table[(start_ru << (i * 8 + j)).trailing_zeros() as usize] =
                (attacks_ru << (i * 8 + j)) & NOT_AB12;
        }
    }

    table
}

// Mirror the occupied bits of one rank left-to-right: extract the rank
// byte, reverse it with the classic multiply trick, deposit it back.
fn hmirror_rank(bb: Bitboard, rank_bb: Bitboard) -> Bitboard {
    let byte = pext(bb, rank_bb);
    let mirrored = (byte.wrapping_mul(0x0202_0202_02) & 0x010884422010) % 1023;
    pdep(mirrored, rank_bb)
}

// The o^(o-2r) identity: on one line, subtracting twice the slider bit
// from the occupied set borrows through every empty square up to the
// first blocker, and the xor exposes exactly the attacked squares in
// the positive ray direction.
fn o_xor_o_2r(block_mask: Bitboard, line_bb: Bitboard, piece_x2: Bitboard) -> Bitboard {
    let line_block = block_mask & line_bb;
    (line_block.wrapping_sub(piece_x2) ^ line_block) & line_bb
}

// Rook attacks for one blocker configuration (which includes the rook's
// own square). Positive rays come straight from o^(o-2r); negative rays
// by mirroring the board (vertically for the file, horizontally within
// the rank), running the same identity, and mirroring back.
fn rook_attacks_for_blockers(
    block_mask: Bitboard,
    file_bb: Bitboard,
    rank_bb: Bitboard,
    piece_x2: Bitboard,
    piece_x2_file_mirror: Bitboard,
    piece_x2_rank_mirror: Bitboard,
) -> Bitboard {
    let file_attacks_pos = o_xor_o_2r(block_mask, file_bb, piece_x2);
    let rank_attacks_pos = o_xor_o_2r(block_mask, rank_bb, piece_x2);

    let file_attacks_neg = vmirror(o_xor_o_2r(vmirror(block_mask), file_bb, piece_x2_file_mirror));
    let rank_attacks_neg = hmirror_rank(
        o_xor_o_2r(hmirror_rank(block_mask, rank_bb), rank_bb, piece_x2_rank_mirror),
        rank_bb,
    );

    file_attacks_pos | file_attacks_neg | rank_attacks_pos | rank_attacks_neg
}

fn diag_bitboards() -> ([Bitboard; 15], [Bitboard; 15]) {
    let mut diags = [EMPTY; 15];
    let mut anti_diags = [EMPTY; 15];
    for square in 0..NrOf::SQUARES {
        let rank = square / 8;
        let file = square % 8;
        diags[rank + 7 - file] |= BB_SQUARES[square];
        anti_diags[rank + file] |= BB_SQUARES[square];
    }
    (diags, anti_diags)
}

// Rotate a bishop blocker mask into rook space: the diagonal becomes the
// piece's rank and the anti-diagonal its file. The shift corrections
// line the short diagonals up so every square maps onto itself.
#[allow(clippy::too_many_arguments)]
fn rotate_bishop_to_rook(
    bishop_mask: Bitboard,
    diag_bb: Bitboard,
    adiag_bb: Bitboard,
    rank_bb: Bitboard,
    file_bb: Bitboard,
    diag_index: usize,
    adiag_index: usize,
) -> Bitboard {
    let mut pext_diag = pext(bishop_mask, diag_bb);
    let mut pext_adiag = pext(bishop_mask, adiag_bb);
    if diag_index < 7 {
        pext_diag <<= 8 - diag_bb.count_ones();
    }
    if adiag_index > 7 {
        pext_adiag <<= 8 - adiag_bb.count_ones();
    }
    pdep(pext_diag, rank_bb) | pdep(pext_adiag, file_bb)
}

#[allow(clippy::too_many_arguments)]
fn rotate_rook_to_bishop(
    rook_mask: Bitboard,
    diag_bb: Bitboard,
    adiag_bb: Bitboard,
    rank_bb: Bitboard,
    file_bb: Bitboard,
    diag_index: usize,
    adiag_index: usize,
) -> Bitboard {
    let mut pext_rank = pext(rook_mask, rank_bb);
    let mut pext_file = pext(rook_mask, file_bb);
    if diag_index < 7 {
        pext_rank >>= 8 - diag_bb.count_ones();
    }
    if adiag_index > 7 {
        pext_file >>= 8 - adiag_bb.count_ones();
    }
    pdep(pext_rank, diag_bb) | pdep(pext_file, adiag_bb)
}

impl MoveGenerator {
    pub(super) fn init_jump_tables(&mut self) {
        self.king = jump_table(KING_ATTACKS_LD);
        self.knight = jump_table(KNIGHT_ATTACKS_LD);

        let white_pawns = jump_table(PAWN_ATTACKS_LD);
        self.pawn_attacks[Sides::WHITE] = white_pawns;
        for square in 0..NrOf::SQUARES {
            self.pawn_attacks[Sides::BLACK][square ^ 56] = vmirror(white_pawns[square]);
        }
    }

    // For every square: compute the blocker mask, enumerate all its
    // subsets with pdep, and store the true attack set at
    // offset[square] + pext(subset, mask). Lookup later uses the same
    // pext on the live occupancy.
    pub(super) fn init_rook_table(&mut self) {
        let mut offset = 0;
        for square in 0..NrOf::SQUARES {
            let rank_bb = BB_RANKS[square / 8];
            let file_bb = BB_FILES[square % 8];
            let piece_bb = BB_SQUARES[square];

            let rank_mask = rank_bb & !(BB_FILES[Files::A] | BB_FILES[Files::H]);
            let file_mask = file_bb & !(BB_RANKS[Ranks::R1] | BB_RANKS[Ranks::R8]);
            let mask = (rank_mask | file_mask) & !piece_bb;

            let permutations = 1u64 << mask.count_ones();
            self.rook_masks[square] = mask;
            self.rook_offsets[square] = offset;

            let piece_x2 = piece_bb << 1;
            let piece_x2_file_mirror = vmirror(piece_bb) << 1;
            let piece_x2_rank_mirror = hmirror_rank(piece_bb, rank_bb) << 1;

            for subset in 0..permutations {
                let block_mask = pdep(subset, mask) | piece_bb;
                self.rook[offset + subset as usize] = rook_attacks_for_blockers(
                    block_mask,
                    file_bb,
                    rank_bb,
                    piece_x2,
                    piece_x2_file_mirror,
                    piece_x2_rank_mirror,
                );
            }

            offset += permutations as usize;
        }
        assert_eq!(offset, super::ROOK_TABLE_SIZE, "rook table size mismatch");
    }

    // Bishops reuse the rook machinery: the blocker mask is rotated so
    // that the diagonal lies on the piece's rank and the anti-diagonal
    // on its file, the rook attacks are computed there, and the result
    // is rotated back.
    pub(super) fn init_bishop_table(&mut self) {
        let (diags, anti_diags) = diag_bitboards();
        let mut offset = 0;

        for square in 0..NrOf::SQUARES {
            let rank = square / 8;
            let file = square % 8;
            let diag_index = rank + 7 - file;
            let adiag_index = rank + file;

            let diag_bb = diags[diag_index];
            let adiag_bb = anti_diags[adiag_index];
            let rank_bb = BB_RANKS[rank];
            let file_bb = BB_FILES[file];
            let piece_bb = BB_SQUARES[square];

            let mask = (diag_bb ^ adiag_bb) & NOT_EDGES;
            let permutations = 1u64 << mask.count_ones();
            self.bishop_masks[square] = mask;
            self.bishop_offsets[square] = offset;

            let piece_x2 = piece_bb << 1;
            let piece_x2_file_mirror = vmirror(piece_bb) << 1;
            let piece_x2_rank_mirror = hmirror_rank(piece_bb, rank_bb) << 1;

            for subset in 0..permutations {
                let block_mask = pdep(subset, mask) | piece_bb;
                let rotated = rotate_bishop_to_rook(
                    block_mask, diag_bb, adiag_bb, rank_bb, file_bb, diag_index, adiag_index,
                );
                let rook_attacks = rook_attacks_for_blockers(
                    rotated,
                    file_bb,
                    rank_bb,
                    piece_x2,
                    piece_x2_file_mirror,
                    piece_x2_rank_mirror,
                );
                self.bishop[offset + subset as usize] = rotate_rook_to_bishop(
                    rook_attacks, diag_bb, adiag_bb, rank_bb, file_bb, diag_index, adiag_index,
                );
            }

            offset += permutations as usize;
        }
        assert_eq!(offset, super::BISHOP_TABLE_SIZE, "bishop table size mismatch");
    }

    pub(super) fn init_queen_lines(&mut self) {
        for square in 0..NrOf::SQUARES {
            let rook = self.get_rook_attacks(square, EMPTY);
            let bishop = self.get_bishop_attacks(square, EMPTY);
            self.queen_lines[square] = QueenLine {
                queen: rook | bishop,
                rook,
                bishop,
            };
        }
    }

    // ALL_LINES layout: [0] full-board sentinel, [1..=8] ranks,
    // [9..=16] files, [17..=31] diagonals, [32..=46] anti-diagonals.
    pub(super) fn init_lines(&mut self) {
        let (diags, anti_diags) = diag_bitboards();

        self.all_lines[0] = FULL_BOARD;
        for i in 0..8 {
            self.all_lines[1 + i] = BB_RANKS[i];
            self.all_lines[9 + i] = BB_FILES[i];
        }
        for i in 0..15 {
            self.all_lines[17 + i] = diags[i];
            self.all_lines[32 + i] = anti_diags[i];
        }
        debug_assert_eq!(17 + 15 + 15, NR_OF_LINES);

        for from in 0..NrOf::SQUARES {
            let (from_rank, from_file) = (from / 8, from % 8);
            for to in 0..NrOf::SQUARES {
                let (to_rank, to_file) = (to / 8, to % 8);

                let index = if from_rank == to_rank {
                    1 + from_rank
                } else if from_file == to_file {
                    9 + from_file
                } else if from_rank + 7 - from_file == to_rank + 7 - to_file {
                    17 + from_rank + 7 - from_file
                } else if from_rank + from_file == to_rank + to_file {
                    32 + from_rank + from_file
                } else {
                    0
                };

                let full = self.all_lines[index];
                let partial = if index == 0 {
                    EMPTY
                } else {
                    // The rectangle spanned by the two squares cuts the
                    // half-open ray from `from` toward `to` out of the
                    // full line.
                    let mut rectangle = EMPTY;
                    for rank in from_rank.min(to_rank)..=from_rank.max(to_rank) {
                        if from_rank != to_rank {
                            rectangle |= BB_RANKS[rank];
                        }
                    }
                    for file in from_file.min(to_file)..=from_file.max(to_file) {
                        if from_file != to_file {
                            rectangle |= BB_FILES[file];
                        }
                    }
                    full & rectangle & !BB_SQUARES[from]
                };

                self.lines[(from << 6) + to] = Line {
                    full,
                    partial,
                    index: index as u8,
                };
            }
        }
    }

    pub(super) fn init_king_pawns(&mut self) {
        let shields = jump_table(PAWN_SHIELD_LD);
        for square in 0..NrOf::SQUARES {
            let shield = shields[square];
            let storm = (shield << 8) | (shield << 16);
            self.king_pawns[Sides::WHITE][square] = KingPawns { shield, storm };
            self.king_pawns[Sides::BLACK][square ^ 56] = KingPawns {
                shield: vmirror(shield),
                storm: vmirror(storm),
            };
        }
    }

    pub(super) fn init_pawn_structure(&mut self) {
        for square in 0..NrOf::SQUARES {
            let file = square % 8;
            let file_bb = BB_FILES[file];

            // Rays toward each back rank, excluding the square itself.
            let top = 56 + file;
            let bottom = file;
            let upper_line = self.lines[(square << 6) + top].partial;
            let bottom_line = self.lines[(square << 6) + bottom].partial;

            let mut white = PawnStructure {
                file: file_bb,
                forward_file: upper_line,
                ..Default::default()
            };
            let mut black = PawnStructure {
                file: file_bb,
                forward_file: bottom_line,
                ..Default::default()
            };

            if file != Files::A {
                white.adjacent_files |= file_bb >> 1;
                white.adjacent_forward |= upper_line >> 1;
                white.adjacent_back |= bottom_line >> 1;
                black.adjacent_files |= file_bb >> 1;
                black.adjacent_forward |= bottom_line >> 1;
                black.adjacent_back |= upper_line >> 1;
            }
            if file != Files::H {
                white.adjacent_files |= file_bb << 1;
                white.adjacent_forward |= upper_line << 1;
                white.adjacent_back |= bottom_line << 1;
                black.adjacent_files |= file_bb << 1;
                black.adjacent_forward |= bottom_line << 1;
                black.adjacent_back |= upper_line << 1;
            }

            self.pawn_structure[Sides::WHITE][square] = white;
            self.pawn_structure[Sides::BLACK][square] = black;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A slow, obviously-correct ray walk to pin the table contents.
    fn ray_attacks(square: usize, occupancy: Bitboard, directions: &[(i32, i32)]) -> Bitboard {
        let mut attacks = EMPTY;
        let (rank, file) = ((square / 8) as i32, (square % 8) as i32);
        for &(dr, df) in directions {
            let (mut r, mut f) = (rank + dr, file + df);
            while (0..8).contains(&r) && (0..8).contains(&f) {
                let bit = BB_SQUARES[(r * 8 + f) as usize];
                attacks |= bit;
                if occupancy & bit != 0 {
                    break;
                }
                r += dr;
                f += df;
            }
        }
        attacks
    }

    #[test]
    fn sliding_tables_match_ray_walks() {
        let mg = MoveGenerator::new();
        let rook_dirs = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        let bishop_dirs = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

        // A handful of occupancies exercising edges, corners and dense
        // blockage.
        let occupancies: [Bitboard; 5] = [
            EMPTY,
            0x00FF_0000_0000_FF00,
            0x0000_0018_1800_0000,
            0x8100_0000_0000_0081,
            0x55AA_55AA_55AA_55AA,
        ];

        for square in 0..NrOf::SQUARES {
            for &occ in &occupancies {
                assert_eq!(
                    mg.get_rook_attacks(square, occ),
                    ray_attacks(square, occ, &rook_dirs),
                    "rook attacks differ on square {square}"
                );
                assert_eq!(
                    mg.get_bishop_attacks(square, occ),
                    ray_attacks(square, occ, &bishop_dirs),
                    "bishop attacks differ on square {square}"
                );
            }
        }
    }

    #[test]
    fn jump_tables_match_hand_checked_squares() {
        let mg = MoveGenerator::new();
        // Knight on a1 reaches b3 and c2 only.
        assert_eq!(mg.get_knight_attacks(0), BB_SQUARES[17] | BB_SQUARES[10]);
        // King on h8.
        assert_eq!(
            mg.get_king_attacks(63),
            BB_SQUARES[62] | BB_SQUARES[55] | BB_SQUARES[54]
        );
        // White pawn on a2 attacks b3 only; black pawn on h7 attacks g6.
        assert_eq!(mg.get_pawn_attacks(Sides::WHITE, 8), BB_SQUARES[17]);
        assert_eq!(mg.get_pawn_attacks(Sides::BLACK, 55), BB_SQUARES[46]);
    }

    #[test]
    fn lines_hold_partial_rays() {
        let mg = MoveGenerator::new();
        // e1 -> e8: the e-file minus e1.
        let line = mg.lines[(4 << 6) + 60];
        assert_eq!(line.full, BB_FILES[4]);
        assert_eq!(line.partial, BB_FILES[4] & !BB_SQUARES[4]);
        // a1 -> h8 diagonal.
        let diag = mg.lines[63];
        assert_eq!(diag.full & BB_SQUARES[27], BB_SQUARES[27]);
        // Not collinear: sentinel index 0.
        let none = mg.lines[(0 << 6) + 12];
        assert_eq!(none.index, 0);
        assert_eq!(none.full, FULL_BOARD);
    }

    #[test]
    fn king_pawn_masks_mirror_between_sides() {
        let mg = MoveGenerator::new();
        // White king on e1: shield is d2/e2/f2.
        let white = mg.king_pawns[Sides::WHITE][4];
        assert_eq!(white.shield, BB_SQUARES[11] | BB_SQUARES[12] | BB_SQUARES[13]);
        // Black king on e8: shield is d7/e7/f7.
        let black = mg.king_pawns[Sides::BLACK][60];
        assert_eq!(black.shield, BB_SQUARES[51] | BB_SQUARES[52] | BB_SQUARES[53]);
        assert_eq!(black.storm, vmirror(white.storm));
    }
}
