use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hyperbola::{
    board::Board,
    defs::FEN_START_POSITION,
    engine::transposition::PawnTable,
    evaluation::evaluate_position,
    movegen::MoveGenerator,
};

// Test positions with different characteristics
const TEST_POSITIONS: &[(&str, &str)] = &[
    (FEN_START_POSITION, "Starting Position"),
    (
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        "After 1.e4",
    ),
    (
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 4 4",
        "Italian Game",
    ),
    (
        "r1bq1rk1/pppp1ppp/2n2n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQ1RK1 w - - 6 7",
        "Castled Position",
    ),
    (
        "r2q1rk1/ppp2ppp/2np1n2/2b1p1B1/2B1P3/3P1N2/PPP2PPP/RN1Q1RK1 w - - 0 9",
        "Complex Middlegame",
    ),
    (
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "Rook Endgame",
    ),
];

fn setup_position(fen: &str, mg: &MoveGenerator) -> Board {
    let mut board = Board::new();
    board.fen_read(Some(fen), mg).expect("Valid FEN");
    board
}

/// Benchmark evaluation across different positions
fn bench_evaluation_positions(c: &mut Criterion) {
    let mg = MoveGenerator::new();
    let mut group = c.benchmark_group("evaluation_positions");

    for (fen, name) in TEST_POSITIONS {
        let board = setup_position(fen, &mg);
        let mut pawn_table = PawnTable::new();

        group.bench_with_input(BenchmarkId::new("evaluate_position", name), fen, |b, _| {
            b.iter(|| black_box(evaluate_position(&board, &mg, &mut pawn_table)));
        });
    }

    group.finish();
}

/// Benchmark the pawn-hash table's effect: first call computes the pawn
/// structure, repeated calls hit the cache.
fn bench_evaluation_caching(c: &mut Criterion) {
    let mg = MoveGenerator::new();
    let mut group = c.benchmark_group("evaluation_caching");

    let board = setup_position(TEST_POSITIONS[4].0, &mg);

    group.bench_function("cold_pawn_table", |b| {
        b.iter_batched(
            PawnTable::new,
            |mut pawn_table| black_box(evaluate_position(&board, &mg, &mut pawn_table)),
            criterion::BatchSize::SmallInput,
        );
    });

    let mut warm_table = PawnTable::new();
    evaluate_position(&board, &mg, &mut warm_table);
    group.bench_function("warm_pawn_table", |b| {
        b.iter(|| black_box(evaluate_position(&board, &mg, &mut warm_table)));
    });

    group.finish();
}

/// Benchmark full legal move generation, the other half of a node visit.
fn bench_move_generation(c: &mut Criterion) {
    let mg = MoveGenerator::new();
    let mut group = c.benchmark_group("move_generation");

    for (fen, name) in TEST_POSITIONS {
        let board = setup_position(fen, &mg);
        group.bench_with_input(BenchmarkId::new("generate_moves", name), fen, |b, _| {
            b.iter(|| {
                let mut scratch = board;
                mg.generate_moves(&mut scratch);
                black_box(scratch.move_list.len())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_evaluation_positions,
    bench_evaluation_caching,
    bench_move_generation
);
criterion_main!(benches);
