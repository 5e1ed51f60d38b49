//! Connectivity check benchmarks.
//!
//! Run with: `cargo bench -p hex-core`
//!
//! The check runs once per simulated ply, so its cost bounds rollout
//! throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hex_core::{Board, ConnectivityScratch, Move, Side};

/// Board filled in a fixed pseudo-random order, no rand dependency needed.
fn filled_board(size: usize, fraction: f64) -> Board {
    let mut board = Board::new(size);
    let cells = size * size;
    let target = (cells as f64 * fraction) as usize;
    let mut side = Side::Red;
    let mut idx = 0usize;
    for _ in 0..target {
        // 37 is coprime with every size we bench
        idx = (idx + 37) % cells;
        let mv = Move::place((idx / size) as u8, (idx % size) as u8);
        if board.play(mv, side).is_ok() {
            side = side.opponent();
        }
    }
    board
}

fn bench_has_connected(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_connected");

    for fraction in [0.25, 0.5, 1.0] {
        let board = filled_board(11, fraction);
        group.bench_with_input(
            BenchmarkId::new("fresh", fraction),
            &board,
            |b, board| b.iter(|| black_box(board.has_connected(Side::Red))),
        );

        let mut scratch = ConnectivityScratch::new(11);
        group.bench_with_input(
            BenchmarkId::new("scratch", fraction),
            &board,
            |b, board| b.iter(|| black_box(board.has_connected_with(Side::Red, &mut scratch))),
        );
    }

    group.finish();
}

fn bench_rotate(c: &mut Criterion) {
    let board = filled_board(11, 0.5);
    c.bench_function("rotated", |b| b.iter(|| black_box(board.rotated())));
}

criterion_group!(benches, bench_has_connected, bench_rotate);
criterion_main!(benches);
