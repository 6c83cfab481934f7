use minimaxer::games::mancala::{self, Mancala};
use minimaxer::games::tictactoe::{Board, TicTacToe};
use minimaxer::negamax::Negamax;
use minimaxer::search::{PruningType, Search, SearchMethod, SearchOpts};
use minimaxer::tree::{SortMethod, Tree};

use criterion::{criterion_group, criterion_main, Criterion};

const DEPTH: usize = 6;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("tictactoe full tree", |b| b.iter(tictactoe_full_tree));
    c.bench_function("tictactoe negamax alpha beta", |b| {
        b.iter(tictactoe_alpha_beta)
    });

    let variants = vec![
        ("mancala negamax", SearchOpts::new()),
        (
            "mancala negamax alpha beta",
            SearchOpts::new().with_pruning(PruningType::AlphaBeta),
        ),
        (
            "mancala negamax alpha beta gen",
            SearchOpts::new()
                .with_pruning(PruningType::AlphaBeta)
                .with_gen_based(true),
        ),
        (
            "mancala negamax alpha beta gen presort",
            SearchOpts::new()
                .with_pruning(PruningType::AlphaBeta)
                .with_gen_based(true)
                .with_presort(true)
                .with_sort_method(SortMethod::BubbleEfficient),
        ),
    ];
    for (name, opts) in variants {
        let opts = opts
            .with_method(SearchMethod::Deepening)
            .with_depth(DEPTH);
        c.bench_function(name, |b| b.iter(|| mancala_search(opts.clone(), false)));
    }

    let opts = SearchOpts::new()
        .with_method(SearchMethod::Deepening)
        .with_depth(DEPTH);
    c.bench_function("mancala negamax optimal", |b| {
        b.iter(|| mancala_search(opts.clone(), true))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn tictactoe_full_tree() -> usize {
    let mut tree = Tree::new(TicTacToe, TicTacToe::root(Board::new()));
    tree.create_full_tree();
    tree.node_count()
}

fn tictactoe_alpha_beta() -> f64 {
    let opts = SearchOpts::new()
        .with_depth(9)
        .with_pruning(PruningType::AlphaBeta);
    let mut negamax = Negamax::new(TicTacToe, TicTacToe::root(Board::new()), opts);
    negamax.evaluate().map_or(f64::NAN, |result| result.value)
}

fn mancala_search(opts: SearchOpts, optimal: bool) -> f64 {
    let root = Mancala::root(mancala::Board::new(false));
    let mut negamax = Negamax::new(Mancala, root, opts);
    negamax.set_optimal(optimal);
    negamax.evaluate().map_or(f64::NAN, |result| result.value)
}
