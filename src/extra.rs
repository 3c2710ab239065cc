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

// Full-depth perft regression suite: the standard positions with their
// published node counts. The whole run takes minutes, which is why it
// sits behind the "extra" feature and an #[ignore] in the tests.

use crate::{
    board::Board,
    defs::{FEN_KIWIPETE_POSITION, FEN_START_POSITION},
    engine::transposition::PerftTable,
    movegen::MoveGenerator,
};
use std::time::Instant;

pub const PERFT_SUITE: [(&str, u8, u64); 5] = [
    (FEN_START_POSITION, 7, 3_195_901_860),
    (FEN_KIWIPETE_POSITION, 5, 193_690_690),
    ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 7, 178_633_661),
    (
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        6,
        706_045_033,
    ),
    (
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        5,
        89_941_194,
    ),
];

// Run the whole suite, print per-position results, and return whether
// every count matched.
pub fn run_perft_suite() -> bool {
    let mg = MoveGenerator::new();
    let mut all_correct = true;

    for &(fen, depth, expected) in &PERFT_SUITE {
        let mut board = Board::new();
        board.fen_read(Some(fen), &mg).expect("suite FEN is valid");
        let mut table = PerftTable::new(256);

        let started = Instant::now();
        let nodes = mg.perft(&board, depth, &mut table);
        let seconds = started.elapsed().as_secs_f64();

        let correct = nodes == expected;
        all_correct &= correct;
        let verdict = if correct {
            "ok".to_string()
        } else {
            format!("EXPECTED {expected}")
        };
        println!("perft {depth} {fen}: {nodes} ({verdict}, {seconds:.1}s)");
    }

    all_correct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "takes minutes; run with --ignored --features extra"]
    fn full_depth_perft_suite() {
        assert!(run_perft_suite());
    }
}
