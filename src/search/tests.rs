//! Tests for the state shared by every search algorithm and for the pass scheduling.
//!
//! Test coverage:
//! - Cutoff and improvement rules, with and without path-length tiebreaks
//! - Child preparation (eager, generator, presort)
//! - Best child selection over stale and current results
//! - Random root selection
//! - Expiry and node removal policies
//! - Deepening schedule, callbacks and aborted passes
//! - Option and tree accessors from generic code

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use super::*;
use crate::error::SearchError;
use crate::games::tictactoe::{Board, TicTacToe};
use crate::negamax::Negamax;
use crate::tree::{Game, NodeId, SortMethod, SortOrder};

fn search_tree(opts: SearchOpts) -> SearchTree<TicTacToe> {
    let _ = env_logger::builder().is_test(true).try_init();
    SearchTree::new(TicTacToe, TicTacToe::root(Board::new()), opts)
}

/// Expands the root and returns its children in move order.
fn root_children(search: &mut SearchTree<TicTacToe>) -> Vec<NodeId> {
    let root = search.tree.root();
    search.tree.create_children(root);
    search.tree.node(root).children().to_vec()
}

fn stamp(search: &mut SearchTree<TicTacToe>, id: NodeId, value: f64, depth: usize) {
    let node = search.tree.node_mut(id);
    node.inherited_value = value;
    node.inherited_depth = Some(depth);
    node.path_length = 1;
}

#[test]
fn test_cuts_off() {
    let plain = search_tree(SearchOpts::new());
    assert!(plain.cuts_off(1.0, 0, 0.0, 0));
    assert!(!plain.cuts_off(0.0, 0, 1.0, 0));
    assert!(plain.cuts_off(0.5, 3, 0.5, 5));

    let random = search_tree(SearchOpts::new().with_random_best(true));
    assert!(random.cuts_off(1.0, 0, 0.0, 0));
    assert!(!random.cuts_off(0.5, 3, 0.5, 5));

    let by_path = search_tree(SearchOpts::new().with_prune_by_path_length(true));
    assert!(by_path.cuts_off(1.0, 3, 1.0, 5));
    assert!(by_path.cuts_off(1.0, 4, 1.0, 4));
    assert!(!by_path.cuts_off(1.0, 5, 1.0, 3));
    assert!(by_path.cuts_off(-1.0, 5, -1.0, 3));
    assert!(!by_path.cuts_off(-1.0, 3, -1.0, 5));
    assert!(by_path.cuts_off(0.0, 3, 0.0, 5));
    assert!(by_path.cuts_off(2.0, 5, 1.0, 3));
}

#[test]
fn test_improves() {
    let plain = search_tree(SearchOpts::new());
    assert!(plain.improves(1.0, 9, 0.0, 1));
    assert!(!plain.improves(1.0, 1, 1.0, 9));
    assert!(!plain.improves(0.0, 1, 1.0, 1));

    let by_path = search_tree(SearchOpts::new().with_prune_by_path_length(true));
    assert!(by_path.improves(1.0, 3, 1.0, 5));
    assert!(!by_path.improves(1.0, 5, 1.0, 3));
    assert!(by_path.improves(-1.0, 5, -1.0, 3));
    assert!(!by_path.improves(-1.0, 3, -1.0, 5));
    assert!(!by_path.improves(0.0, 1, 0.0, 5));
    assert!(!by_path.improves(1.0, 3, 1.0, 3));
}

#[test]
fn test_eager_children() {
    let mut search = search_tree(SearchOpts::new());
    let root = search.tree.root();
    let mut cursor = search.get_children(root, SortOrder::Descending);
    assert_eq!(search.tree.node_count(), 9);

    let mut seen = 0;
    while cursor.next(&mut search.tree).is_some() {
        seen += 1;
    }
    assert_eq!(seen, 9);
    assert_eq!(search.tree.node_count(), 9);
}

#[test]
fn test_generated_children() {
    let mut search = search_tree(SearchOpts::new().with_gen_based(true));
    let root = search.tree.root();
    let mut cursor = search.get_children(root, SortOrder::Descending);
    assert_eq!(search.tree.node_count(), 0);
    assert_eq!(search.tree.node(root).moves().len(), 9);

    let first = cursor.next(&mut search.tree).unwrap();
    assert_eq!(search.tree.node(first).game_move, 0);
    assert_eq!(search.tree.node_count(), 1);
    cursor.next(&mut search.tree).unwrap();
    assert_eq!(search.tree.node_count(), 2);
}

#[test]
fn test_presort_uses_last_results() {
    for &gen_based in &[false, true] {
        let opts = SearchOpts::new()
            .with_gen_based(gen_based)
            .with_presort(true)
            .with_sort_method(SortMethod::Bubble);
        let mut search = search_tree(opts);
        let root = search.tree.root();
        let children = root_children(&mut search);
        for (index, &child) in children.iter().enumerate() {
            let value = match index {
                4 => 1.0,
                2 => -1.0,
                _ => 0.0,
            };
            stamp(&mut search, child, value, 1);
        }

        let mut cursor = search.get_children(root, SortOrder::Descending);
        let first = cursor.next(&mut search.tree).unwrap();
        assert_eq!(search.tree.node(first).game_move, 4);

        let mut cursor = search.get_children(root, SortOrder::Ascending);
        let first = cursor.next(&mut search.tree).unwrap();
        assert_eq!(search.tree.node(first).game_move, 2);
        assert_eq!(search.tree.node_count(), 9);
    }
}

#[test]
fn test_select_best_child_ignores_stale_results() {
    let mut search = search_tree(SearchOpts::new());
    let children = root_children(&mut search);
    let root = search.tree.root();
    search.begin_pass(2);
    stamp(&mut search, children[0], 5.0, 1);
    stamp(&mut search, children[1], 1.0, 2);
    stamp(&mut search, children[2], 0.5, 2);
    stamp(&mut search, children[3], 1.0, 2);

    assert_eq!(
        search.select_best_child(root, SortOrder::Descending),
        Some(children[1])
    );
    assert_eq!(
        search.select_best_child(root, SortOrder::Ascending),
        Some(children[2])
    );

    search.begin_pass(3);
    assert_eq!(search.select_best_child(root, SortOrder::Descending), None);
}

#[test]
fn test_select_best_child_prefers_short_wins() {
    let mut search = search_tree(SearchOpts::new().with_prune_by_path_length(true));
    let children = root_children(&mut search);
    let root = search.tree.root();
    search.begin_pass(1);
    stamp(&mut search, children[0], 1.0, 1);
    stamp(&mut search, children[1], 1.0, 1);
    search.tree.node_mut(children[0]).path_length = 3;
    search.tree.node_mut(children[1]).path_length = 2;
    assert_eq!(
        search.select_best_child(root, SortOrder::Descending),
        Some(children[1])
    );
}

#[test]
fn test_resolve_best_child() {
    let mut search = search_tree(SearchOpts::new());
    let children = root_children(&mut search);
    let root = search.tree.root();
    search.begin_pass(1);
    assert_eq!(
        search.resolve_best_child(root, SortOrder::Descending, None),
        Err(SearchError::MissingBestChild)
    );

    stamp(&mut search, children[5], 1.0, 1);
    assert_eq!(
        search.resolve_best_child(root, SortOrder::Descending, Some(children[0])),
        Ok(children[0])
    );
    assert_eq!(
        search.resolve_best_child(root, SortOrder::Descending, None),
        Ok(children[5])
    );

    search.opts.postsort = true;
    stamp(&mut search, children[0], 0.0, 1);
    assert_eq!(
        search.resolve_best_child(root, SortOrder::Descending, Some(children[0])),
        Ok(children[5])
    );
    assert_eq!(search.tree.node(root).children()[0], children[5]);
}

#[test]
fn test_pick_root_child() {
    let opts = SearchOpts::new().with_random_best(true).with_random_seed(3);
    let mut search = search_tree(opts);
    search.start();
    let children = root_children(&mut search);
    let root = search.tree.root();
    search.begin_pass(1);
    for (index, &child) in children.iter().enumerate() {
        let value = if index == 0 || index == 3 { 1.0 } else { 0.0 };
        stamp(&mut search, child, value, 1);
    }
    search.tree.node_mut(root).best_child = Some(children[0]);

    let mut picked = Vec::new();
    for _ in 0..50 {
        picked.push(search.pick_root_child(SortOrder::Descending).unwrap());
    }
    assert!(picked.iter().all(|id| *id == children[0] || *id == children[3]));
    assert!(picked.contains(&children[0]));
    assert!(picked.contains(&children[3]));

    search.tree.node_mut(children[3]).pruned = true;
    for _ in 0..10 {
        assert_eq!(
            search.pick_root_child(SortOrder::Descending),
            Some(children[0])
        );
    }

    search.opts.random_best = false;
    search.tree.node_mut(root).best_child = Some(children[3]);
    assert_eq!(
        search.pick_root_child(SortOrder::Descending),
        Some(children[3])
    );
}

#[test]
fn test_node_limit_expiry() {
    let mut search = search_tree(SearchOpts::new().with_node_limit(9));
    search.start();
    assert_eq!(search.check_expiry(), None);
    root_children(&mut search);
    assert_eq!(search.check_expiry(), Some(SearchExit::NodeLimit));

    search.opts.node_limit = 10;
    assert_eq!(search.check_expiry(), Some(SearchExit::NodeLimit));
    search.start();
    assert_eq!(search.check_expiry(), None);
}

#[test]
fn test_timeout_expiry_sticks() {
    let opts = SearchOpts::new()
        .with_method(SearchMethod::Time)
        .with_timeout(1);
    let mut search = search_tree(opts);
    search.start();
    thread::sleep(Duration::from_millis(5));
    assert_eq!(search.check_expiry(), Some(SearchExit::Time));
    search.opts.timeout = 0;
    assert_eq!(search.check_expiry(), Some(SearchExit::Time));
}

#[test]
fn test_build_result() {
    let mut search = search_tree(SearchOpts::new());
    let children = root_children(&mut search);
    search.begin_pass(2);
    search.outcomes = 17;
    let result = search.build_result(SearchExit::Depth, Some(children[6]), 0.5, 2);
    assert_eq!(
        result,
        SearchResult {
            exit: SearchExit::Depth,
            best_move: Some(6),
            value: 0.5,
            depth: 2,
            outcomes: 17,
            nodes: 9,
            path_length: 2,
        }
    );
    assert!(!result.is_aborted());
}

#[test]
fn test_removal_policies() {
    let cases = vec![
        (RemovalMethod::None, 0, 1, false),
        (RemovalMethod::Always, 0, 1, true),
        (RemovalMethod::Depth, 2, 1, false),
        (RemovalMethod::Depth, 2, 2, true),
        (RemovalMethod::Count, 17, 1, false),
        (RemovalMethod::Count, 16, 1, true),
    ];
    for (method, value, depth, removes) in cases {
        let mut search = search_tree(SearchOpts::new().with_removal(method, value));
        let children = root_children(&mut search);
        search.tree.create_children(children[0]);
        let grandchild = search.tree.node(children[0]).children()[2];
        search.tree.node_mut(children[0]).best_child = Some(grandchild);
        assert_eq!(search.tree.node_count(), 17);

        search.apply_removal(depth);
        let expected = if removes { 10 } else { 17 };
        assert_eq!(search.tree.node_count(), expected, "{:?} {}", method, value);
        assert_eq!(search.tree.node(search.tree.root()).children().len(), 9);
        let root = search.tree.root();
        assert_eq!(search.tree.validate_descendants(root), Ok(expected + 1));
    }
}

#[test]
fn test_remove_nodes_on_demand() {
    let mut search = search_tree(SearchOpts::new());
    let children = root_children(&mut search);
    search.tree.create_children(children[4]);
    let grandchild = search.tree.node(children[4]).children()[0];
    search.tree.node_mut(children[4]).best_child = Some(grandchild);

    assert_eq!(search.remove_nodes(), 7);
    assert_eq!(search.remove_nodes(), 0);
    assert_eq!(search.tree.node_count(), 10);
}

#[test]
fn test_deepening_starts_at_initial_depth() {
    let depths = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&depths);
    let opts = SearchOpts::new()
        .with_method(SearchMethod::Deepening)
        .with_initial_depth(3)
        .with_depth(5);
    let mut negamax = Negamax::new(TicTacToe, TicTacToe::root(Board::new()), opts);
    negamax
        .search_tree_mut()
        .set_depth_callback(move |_, result| seen.borrow_mut().push(result.depth));
    let result = negamax.evaluate().unwrap();
    assert_eq!(result.depth, 5);
    assert_eq!(result.exit, SearchExit::Depth);
    assert_eq!(*depths.borrow(), vec![3, 4, 5]);
}

#[test]
fn test_depth_search_calls_back_once() {
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let opts = SearchOpts::new().with_depth(2);
    let mut negamax = Negamax::new(TicTacToe, TicTacToe::root(Board::new()), opts);
    negamax
        .search_tree_mut()
        .set_depth_callback(move |_, _| *counter.borrow_mut() += 1);
    negamax.evaluate().unwrap();
    assert_eq!(*calls.borrow(), 1);

    negamax.search_tree_mut().clear_depth_callback();
    negamax.evaluate().unwrap();
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn test_node_limit_keeps_last_completed_pass() {
    let opts = SearchOpts::new()
        .with_method(SearchMethod::Deepening)
        .with_node_limit(1);
    let mut negamax = Negamax::new(TicTacToe, TicTacToe::root(Board::new()), opts);
    let result = negamax.evaluate().unwrap();
    assert_eq!(result.exit, SearchExit::NodeLimit);
    assert_eq!(result.depth, 1);
    assert_eq!(result.nodes, 9);
    assert_eq!(result.best_move, Some(0));
}

/// Reads and updates options through the trait alone.
fn deepen_by_one<G: Game, S: Search<G>>(search: &mut S) -> usize {
    let depth = search.opts().depth + 1;
    search.opts_mut().depth = depth;
    search.tree().node_count() + depth
}

#[test]
fn test_accessors_through_generic_search() {
    let opts = SearchOpts::new().with_depth(2);
    let mut negamax = Negamax::new(TicTacToe, TicTacToe::root(Board::new()), opts);
    assert_eq!(deepen_by_one(&mut negamax), 3);
    assert_eq!(negamax.opts().depth, 3);
}

#[test]
fn test_aborted_pass_route_keeps_root_choice() {
    // The second pass finishes the first two openings, then stops entering the third.
    let opts = SearchOpts::new()
        .with_method(SearchMethod::Deepening)
        .with_node_limit(20);
    let mut negamax = Negamax::new(TicTacToe, TicTacToe::root(Board::new()), opts);
    let result = negamax.evaluate().unwrap();
    assert_eq!(result.exit, SearchExit::NodeLimit);
    assert_eq!(result.depth, 1);
    assert_eq!(result.nodes, 25);
    assert_eq!(result.best_move, Some(0));
    assert_eq!(result.path_length, 1);
    assert_eq!(negamax.optimal_moves(), vec![0, 1]);
}

#[test]
fn test_aborted_first_pass() {
    let opts = SearchOpts::new()
        .with_method(SearchMethod::Deepening)
        .with_node_limit(1);
    let mut negamax = Negamax::new(TicTacToe, TicTacToe::root(Board::new()), opts);
    let tree = negamax.search_tree_mut().tree_mut();
    let root = tree.root();
    tree.create_children(root);

    let result = negamax.evaluate().unwrap();
    assert_eq!(result.exit, SearchExit::NodeLimit);
    assert_eq!(result.best_move, None);
    assert!(result.value.is_nan());
    assert!(result.is_aborted());
}
