use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use deadpos::game_state::chess_types::Color;
use deadpos::game_state::game_state::GameState;
use deadpos::search::analysis::Analyzer;
use deadpos::search::search_state::{Search, SearchResult};

#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    fen: &'static str,
    winner: Color,
    expected: SearchResult,
}

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "queen_mate_in_one",
        fen: "7k/5K2/6Q1/8/8/8/8/8 w - - 0 1",
        winner: Color::White,
        expected: SearchResult::Winnable,
    },
    BenchCase {
        name: "rook_mate_in_one",
        fen: "4k3/R7/4K3/8/8/8/8/8 w - - 0 1",
        winner: Color::White,
        expected: SearchResult::Winnable,
    },
    BenchCase {
        name: "knight_vs_bare_king",
        fen: "7k/8/8/8/8/8/8/5K1N w - - 0 1",
        winner: Color::White,
        expected: SearchResult::Unwinnable,
    },
    BenchCase {
        name: "blocked_pawn_chain",
        fen: "8/8/8/2k3p1/p1p1p1P1/P1P1P1P1/3K4/8 w - - 11 60",
        winner: Color::White,
        expected: SearchResult::Unwinnable,
    },
    BenchCase {
        name: "lone_bishop",
        fen: "8/8/8/8/2k5/8/2K5/2B5 w - - 0 1",
        winner: Color::White,
        expected: SearchResult::Unwinnable,
    },
];

fn bench_full_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_analysis");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(20);

    let mut analyzer = Analyzer::new();
    let mut search = Search::new();
    search.set_limit(500_000);

    for case in CASES {
        let game = GameState::from_fen(case.fen).expect("benchmark FEN should parse");

        // Correctness guard before benchmarking.
        search.set_winner(case.winner);
        let warmup = analyzer
            .full_analysis(&game, &mut search)
            .expect("analysis should run");
        assert_eq!(warmup, case.expected, "verdict mismatch for {}", case.name);

        group.bench_with_input(BenchmarkId::from_parameter(case.name), &game, |b, game| {
            b.iter(|| {
                search.set_winner(case.winner);
                let verdict = analyzer
                    .full_analysis(black_box(game), &mut search)
                    .expect("analysis should run");
                black_box(verdict)
            });
        });
    }

    group.finish();
}

fn bench_saturation(c: &mut Criterion) {
    let mut group = c.benchmark_group("quick_analysis");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(20);

    let mut analyzer = Analyzer::new();
    let mut search = Search::new();
    search.set_limit(5_000_000);

    for case in CASES {
        let game = GameState::from_fen(case.fen).expect("benchmark FEN should parse");

        group.bench_with_input(BenchmarkId::from_parameter(case.name), &game, |b, game| {
            b.iter(|| {
                search.set_winner(case.winner);
                let verdict = analyzer
                    .quick_analysis(black_box(game), &mut search)
                    .expect("analysis should run");
                black_box(verdict)
            });
        });
    }

    group.finish();
}

criterion_group!(analysis_benches, bench_full_analysis, bench_saturation);
criterion_main!(analysis_benches);
